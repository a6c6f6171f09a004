use std::collections::{HashMap, HashSet};

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::node::KnowledgeNode;

#[derive(Clone, Debug)]
pub struct TreeNode {
    /// The node's own data; `children` is always empty here, use `TreeNode::children`.
    pub node: KnowledgeNode,
    pub parent: Option<usize>,
    pub depth: usize,
    pub children: Vec<usize>,
}

/// Flat arena over one universe's tree, indexed in pre-order.
#[derive(Clone, Debug)]
pub struct KnowledgeTree {
    nodes: Vec<TreeNode>,
    index_by_id: HashMap<String, usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub index: usize,
    pub score: i64,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl KnowledgeTree {
    pub const ROOT: usize = 0;

    pub fn from_root(root: KnowledgeNode) -> Self {
        let mut nodes: Vec<TreeNode> = Vec::new();
        let mut index_by_id = HashMap::new();
        // (node, parent, depth); children pushed in reverse to keep pre-order.
        let mut stack = vec![(root, None::<usize>, 0usize)];

        while let Some((mut node, parent, depth)) = stack.pop() {
            let index = nodes.len();
            let children = std::mem::take(&mut node.children);

            index_by_id.entry(node.id.clone()).or_insert(index);

            if let Some(parent_index) = parent
                && let Some(parent_node) = nodes.get_mut(parent_index)
            {
                parent_node.children.push(index);
            }

            nodes.push(TreeNode {
                node,
                parent,
                depth,
                children: Vec::with_capacity(children.len()),
            });

            for child in children.into_iter().rev() {
                stack.push((child, Some(index), depth + 1));
            }
        }

        Self { nodes, index_by_id }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, index: usize) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.index_of(id).and_then(|index| self.nodes.get(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &TreeNode)> {
        self.nodes.iter().enumerate()
    }

    /// Root-first chain of indices ending at `index`.
    pub fn ancestors(&self, index: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut cursor = Some(index).filter(|&value| value < self.nodes.len());
        while let Some(current) = cursor {
            chain.push(current);
            cursor = self.nodes[current].parent;
        }
        chain.reverse();
        chain
    }

    /// Ids forming a valid traversal path that ends on `id`; the root is not part of it.
    pub fn chain_from_root(&self, id: &str) -> Option<Vec<String>> {
        let index = self.index_of(id)?;
        Some(
            self.ancestors(index)
                .into_iter()
                .skip(1)
                .map(|index| self.nodes[index].node.id.clone())
                .collect(),
        )
    }

    pub fn is_child_of(&self, child_id: &str, parent_id: &str) -> bool {
        match (self.get(child_id), self.index_of(parent_id)) {
            (Some(child), Some(parent)) => child.parent == Some(parent),
            _ => false,
        }
    }

    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = self
            .nodes
            .iter()
            .filter(|entry| !seen.insert(entry.node.id.as_str()))
            .map(|entry| entry.node.id.clone())
            .collect::<Vec<_>>();
        duplicates.sort();
        duplicates.dedup();
        duplicates
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let matcher = SkimMatcherV2::default();
        let mut hits = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let by_label = fuzzy_match_score(&matcher, &entry.node.label, query);
                let by_id = fuzzy_match_score(&matcher, &entry.node.id, query);
                by_label.max(by_id).map(|score| SearchHit { index, score })
            })
            .collect::<Vec<_>>();

        hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.index.cmp(&b.index)));
        hits.truncate(limit);
        hits
    }
}
