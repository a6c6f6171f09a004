use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::node::KnowledgeNode;
use super::tree::KnowledgeTree;
use super::universe::UniverseId;

const BUNDLED_KNOWLEDGEVERSE: &str = include_str!("../../data/knowledgeverse.json");
const BUNDLED_PROFILEVERSE: &str = include_str!("../../data/profileverse.json");
const BUNDLED_DEVVERSE: &str = include_str!("../../data/devverse.json");

pub type UniverseTrees = HashMap<UniverseId, KnowledgeTree>;

/// Accepts either a dataset array (first entry is the root) or a bare root object.
pub fn parse_tree(raw: &str) -> Result<KnowledgeNode> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in knowledge tree")?;

    let root = match parsed {
        Value::Array(mut entries) => {
            if entries.is_empty() {
                return Err(anyhow!("knowledge tree dataset is empty"));
            }
            entries.swap_remove(0)
        }
        object @ Value::Object(_) => object,
        _ => return Err(anyhow!("unexpected JSON type for knowledge tree")),
    };

    serde_json::from_value(root).context("invalid knowledge node in tree")
}

fn bundled_tree(universe: UniverseId) -> Option<&'static str> {
    match universe {
        UniverseId::Lobby => None,
        UniverseId::KnowledgeVerse => Some(BUNDLED_KNOWLEDGEVERSE),
        UniverseId::ProfileVerse => Some(BUNDLED_PROFILEVERSE),
        UniverseId::DevVerse => Some(BUNDLED_DEVVERSE),
    }
}

pub fn load_universe_tree(universe: UniverseId, data_dir: Option<&Path>) -> Result<KnowledgeTree> {
    let override_path = data_dir
        .map(|dir| dir.join(format!("{}.json", universe.key())))
        .filter(|path| path.is_file());

    let root = if let Some(path) = override_path {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        tracing::info!(universe = universe.key(), path = %path.display(), "loading tree from data dir");
        parse_tree(&raw).with_context(|| format!("failed to parse {}", path.display()))?
    } else {
        let raw = bundled_tree(universe)
            .ok_or_else(|| anyhow!("{} has no knowledge tree", universe.label()))?;
        parse_tree(raw).with_context(|| format!("bundled {} tree is invalid", universe.key()))?
    };

    let tree = KnowledgeTree::from_root(root);
    let duplicates = tree.duplicate_ids();
    if !duplicates.is_empty() {
        tracing::warn!(
            universe = universe.key(),
            ?duplicates,
            "duplicate node ids in knowledge tree; keeping first"
        );
    }
    Ok(tree)
}

pub fn load_universe_trees(data_dir: Option<&Path>) -> Result<UniverseTrees> {
    let mut trees = HashMap::with_capacity(UniverseId::GRAPHS.len());
    for universe in UniverseId::GRAPHS {
        let tree = load_universe_tree(universe, data_dir)?;
        tracing::debug!(universe = universe.key(), nodes = tree.len(), "tree loaded");
        trees.insert(universe, tree);
    }
    Ok(trees)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_and_object_roots() {
        let from_array = parse_tree(r#"[{"id":"r","label":"R","type":"domain"}]"#).unwrap();
        let from_object = parse_tree(r#"{"id":"r","label":"R","type":"domain"}"#).unwrap();
        assert_eq!(from_array.id, "r");
        assert_eq!(from_object.id, "r");
    }

    #[test]
    fn rejects_empty_and_malformed_datasets() {
        assert!(parse_tree("[]").is_err());
        assert!(parse_tree("42").is_err());
        assert!(parse_tree("{not json").is_err());
        assert!(parse_tree(r#"{"id":"r","label":"R","type":"planet"}"#).is_err());
    }

    #[test]
    fn bundled_trees_load_with_unique_ids() {
        let trees = load_universe_trees(None).unwrap();
        assert_eq!(trees.len(), UniverseId::GRAPHS.len());
        for (universe, tree) in &trees {
            assert!(tree.len() > 1, "{} tree is trivial", universe.key());
            assert!(
                tree.duplicate_ids().is_empty(),
                "{} has duplicate ids: {:?}",
                universe.key(),
                tree.duplicate_ids()
            );
            for (_, entry) in tree.iter() {
                for prerequisite in &entry.node.prerequisites {
                    assert!(
                        tree.get(prerequisite).is_some(),
                        "{} references unknown prerequisite {prerequisite}",
                        entry.node.id
                    );
                }
            }
        }
    }

    #[test]
    fn data_dir_overrides_bundled_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("devverse.json"),
            r#"[{"id":"custom","label":"Custom","type":"domain"}]"#,
        )
        .unwrap();

        let trees = load_universe_trees(Some(dir.path())).unwrap();
        assert_eq!(trees[&UniverseId::DevVerse].root().node.id, "custom");
        assert_ne!(trees[&UniverseId::KnowledgeVerse].root().node.id, "custom");
    }

    #[test]
    fn unparseable_override_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("profileverse.json"), "nope").unwrap();
        assert!(load_universe_trees(Some(dir.path())).is_err());
    }
}
