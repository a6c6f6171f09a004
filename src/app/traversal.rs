use std::collections::HashMap;

use glam::Vec3;

use crate::knowledge::{KnowledgeTree, UniverseId};

/// What the camera should do after a path transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraCommand {
    FlyTo { target: Vec3, size: f32 },
    Overview,
}

/// Framing size used for the viewing distance at a given path depth.
pub fn framing_size(depth: usize) -> f32 {
    match depth {
        0 => 5.0,
        1 => 3.0,
        2 => 2.0,
        _ => 1.0,
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraversalState {
    path: Vec<String>,
    camera_target: Option<Vec3>,
}

impl TraversalState {
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn camera_target(&self) -> Option<Vec3> {
        self.camera_target
    }

    pub fn focused_id(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// Re-selecting a node on the path collapses below it; anything else descends.
    pub fn activate(&mut self, id: &str, position: Vec3) -> CameraCommand {
        match self.path.iter().position(|entry| entry == id) {
            Some(index) => self.path.truncate(index + 1),
            None => self.path.push(id.to_owned()),
        }
        self.camera_target = Some(position);

        CameraCommand::FlyTo {
            target: position,
            size: framing_size(self.path.len()),
        }
    }

    pub fn jump_to_depth(&mut self, depth: usize) -> Option<CameraCommand> {
        self.path.truncate(depth);
        self.path.is_empty().then_some(CameraCommand::Overview)
    }

    pub fn reset(&mut self) -> CameraCommand {
        self.path.clear();
        CameraCommand::Overview
    }

    /// Replaces the path with a chain taken from the tree, e.g. to reveal a search hit.
    pub fn focus_chain(&mut self, chain: Vec<String>, position: Vec3) -> CameraCommand {
        self.path = chain;
        if self.path.is_empty() {
            return CameraCommand::Overview;
        }
        self.camera_target = Some(position);
        CameraCommand::FlyTo {
            target: position,
            size: framing_size(self.path.len()),
        }
    }

    /// Drops the path suffix starting at the first entry that no longer hangs off
    /// its predecessor in `tree`. The first entry may also be the root itself.
    /// Returns true when anything was removed.
    pub fn prune_to(&mut self, tree: &KnowledgeTree) -> bool {
        let root_id = tree.root().node.id.as_str();
        let valid = self
            .path
            .iter()
            .enumerate()
            .take_while(|(index, id)| match index.checked_sub(1) {
                None => id.as_str() == root_id || tree.is_child_of(id, root_id),
                Some(previous) => tree.is_child_of(id, self.path[previous].as_str()),
            })
            .count();

        let pruned = valid < self.path.len();
        if pruned {
            tracing::warn!(
                kept = valid,
                dropped = self.path.len() - valid,
                "traversal path no longer matches the tree; pruning"
            );
            self.path.truncate(valid);
            if self.path.is_empty() {
                self.camera_target = None;
            }
        }
        pruned
    }
}

/// One traversal state per graph universe, created up front.
#[derive(Clone, Debug)]
pub struct UniverseStates {
    states: HashMap<UniverseId, TraversalState>,
}

impl Default for UniverseStates {
    fn default() -> Self {
        Self {
            states: UniverseId::GRAPHS
                .into_iter()
                .map(|universe| (universe, TraversalState::default()))
                .collect(),
        }
    }
}

impl UniverseStates {
    pub fn get(&self, universe: UniverseId) -> Option<&TraversalState> {
        self.states.get(&universe)
    }

    pub fn get_mut(&mut self, universe: UniverseId) -> Option<&mut TraversalState> {
        self.states.get_mut(&universe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::parse_tree;

    fn state_with(path: &[&str]) -> TraversalState {
        TraversalState {
            path: path.iter().map(|id| id.to_string()).collect(),
            camera_target: None,
        }
    }

    #[test]
    fn activating_an_ancestor_truncates() {
        let mut state = state_with(&["a", "b", "c"]);
        let command = state.activate("b", Vec3::X);
        assert_eq!(state.path(), ["a", "b"]);
        assert_eq!(state.camera_target(), Some(Vec3::X));
        assert_eq!(
            command,
            CameraCommand::FlyTo {
                target: Vec3::X,
                size: 2.0
            }
        );
    }

    #[test]
    fn activating_a_new_node_appends() {
        let mut state = state_with(&["a", "b", "c"]);
        state.activate("d", Vec3::Y);
        assert_eq!(state.path(), ["a", "b", "c", "d"]);
        assert_eq!(state.focused_id(), Some("d"));
    }

    #[test]
    fn reactivating_the_tip_is_idempotent() {
        let mut state = TraversalState::default();
        state.activate("A", Vec3::Z);
        state.activate("A", Vec3::Z);
        assert_eq!(state.path(), ["A"]);
    }

    #[test]
    fn breadcrumb_jump_keeps_camera_target() {
        let mut state = state_with(&["a", "b", "c"]);
        state.camera_target = Some(Vec3::ONE);

        assert_eq!(state.jump_to_depth(1), None);
        assert_eq!(state.path(), ["a"]);
        assert_eq!(state.camera_target(), Some(Vec3::ONE));

        assert_eq!(state.jump_to_depth(0), Some(CameraCommand::Overview));
        assert!(state.path().is_empty());
    }

    #[test]
    fn reset_empties_path_and_requests_overview() {
        let mut state = state_with(&["a", "b"]);
        assert_eq!(state.reset(), CameraCommand::Overview);
        assert!(state.path().is_empty());
    }

    #[test]
    fn framing_size_by_depth() {
        assert_eq!(framing_size(0), 5.0);
        assert_eq!(framing_size(1), 3.0);
        assert_eq!(framing_size(2), 2.0);
        assert_eq!(framing_size(3), 1.0);
        assert_eq!(framing_size(9), 1.0);
    }

    #[test]
    fn prune_drops_ids_missing_from_tree() {
        let tree = KnowledgeTree::from_root(
            parse_tree(
                r#"{"id":"r","label":"R","type":"domain","children":[
                    {"id":"a","label":"A","type":"topic","children":[
                        {"id":"a1","label":"A1","type":"subtopic"}
                    ]},
                    {"id":"b","label":"B","type":"topic"}
                ]}"#,
            )
            .unwrap(),
        );

        let mut valid = state_with(&["a", "a1"]);
        assert!(!valid.prune_to(&tree));
        assert_eq!(valid.path(), ["a", "a1"]);

        let mut stale = state_with(&["a", "gone", "a1"]);
        assert!(stale.prune_to(&tree));
        assert_eq!(stale.path(), ["a"]);

        let mut wrong_parent = state_with(&["b", "a1"]);
        assert!(wrong_parent.prune_to(&tree));
        assert_eq!(wrong_parent.path(), ["b"]);
    }

    #[test]
    fn prune_keeps_paths_that_start_at_the_root() {
        let tree = KnowledgeTree::from_root(
            parse_tree(
                r#"{"id":"r","label":"R","type":"domain","children":[
                    {"id":"a","label":"A","type":"topic","children":[
                        {"id":"a1","label":"A1","type":"subtopic"}
                    ]}
                ]}"#,
            )
            .unwrap(),
        );

        let mut from_root = state_with(&["r", "a", "a1"]);
        assert!(!from_root.prune_to(&tree));
        assert_eq!(from_root.path(), ["r", "a", "a1"]);

        let mut root_only = state_with(&["r"]);
        assert!(!root_only.prune_to(&tree));
        assert_eq!(root_only.path(), ["r"]);

        let mut root_then_stale = state_with(&["r", "gone"]);
        assert!(root_then_stale.prune_to(&tree));
        assert_eq!(root_then_stale.path(), ["r"]);
    }

    #[test]
    fn every_graph_universe_has_independent_state() {
        let mut states = UniverseStates::default();
        for universe in UniverseId::GRAPHS {
            assert!(states.get(universe).is_some());
        }
        assert!(states.get(UniverseId::Lobby).is_none());

        states
            .get_mut(UniverseId::KnowledgeVerse)
            .unwrap()
            .activate("x", Vec3::ZERO);
        assert_eq!(states.get(UniverseId::KnowledgeVerse).unwrap().path(), ["x"]);
        assert!(states.get(UniverseId::ProfileVerse).unwrap().path().is_empty());
    }
}
