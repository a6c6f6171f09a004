use std::collections::HashSet;

use glam::Vec3;

use crate::knowledge::KnowledgeTree;
use crate::layout::{child_position, shell_radius};
use crate::progress::ProgressStore;

pub(in crate::app) const ROOT_SIZE: f32 = 5.0;
pub(in crate::app) const FADED_OPACITY: f32 = 0.2;
const EDGE_OPACITY_THRESHOLD: f32 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderNode {
    pub index: usize,
    pub id: String,
    pub position: Vec3,
    pub size: f32,
    pub opacity: f32,
    pub is_locked: bool,
    pub progress: f32,
    pub completed: bool,
    pub depth: usize,
    pub expanded: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderEdge {
    pub parent: usize,
    pub child: usize,
    pub from: Vec3,
    pub to: Vec3,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

impl Projection {
    pub fn node(&self, id: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

struct ProjectionInput<'a> {
    tree: &'a KnowledgeTree,
    path: &'a [String],
    on_path: HashSet<&'a str>,
    progress: &'a ProgressStore,
    ready: bool,
}

/// Computes every visible node and connector for one universe.
///
/// The result depends only on the arguments: positions come from the
/// deterministic shell layout, so repeated calls yield identical projections.
pub fn project(
    tree: &KnowledgeTree,
    path: &[String],
    progress: &ProgressStore,
    ready: bool,
) -> Projection {
    let input = ProjectionInput {
        tree,
        path,
        on_path: path.iter().map(String::as_str).collect(),
        progress,
        ready,
    };

    let mut projection = Projection::default();
    if !tree.is_empty() {
        visit(&input, KnowledgeTree::ROOT, Vec3::ZERO, 0, None, &mut projection);
    }
    projection
}

fn visit(
    input: &ProjectionInput<'_>,
    index: usize,
    position: Vec3,
    depth: usize,
    parent_id: Option<&str>,
    out: &mut Projection,
) {
    let Some(entry) = input.tree.node(index) else {
        return;
    };
    if depth > input.path.len() + 1 {
        return;
    }

    let node = &entry.node;
    let is_root = depth == 0;
    let in_path = input.on_path.contains(node.id.as_str());

    let base_size = if is_root {
        ROOT_SIZE
    } else {
        node.kind.base_size()
    };
    let size = base_size * node.difficulty_modifier();

    let mut opacity = 1.0;
    if let Some(active_id) = input.path.last() {
        if !in_path && depth <= input.path.len() && parent_id != Some(active_id.as_str()) {
            opacity = FADED_OPACITY;
        }
    }

    let progress = input.progress.progress_for(node);
    let expanded = input.ready && (is_root || in_path);

    out.nodes.push(RenderNode {
        index,
        id: node.id.clone(),
        position,
        size,
        opacity,
        is_locked: input.progress.is_locked(&node.prerequisites),
        progress: progress.progress,
        completed: progress.completed,
        depth,
        expanded,
    });

    if !expanded {
        return;
    }

    let total = entry.children.len();
    let radius = shell_radius(depth);
    for (order, &child) in entry.children.iter().enumerate() {
        let child_pos = child_position(position, order, total, radius);
        if opacity > EDGE_OPACITY_THRESHOLD {
            out.edges.push(RenderEdge {
                parent: index,
                child,
                from: position,
                to: child_pos,
            });
        }
        visit(input, child, child_pos, depth + 1, Some(node.id.as_str()), out);
    }
}

/// World position of any node, following the same shell placement as `project`.
pub fn node_position(tree: &KnowledgeTree, index: usize) -> Option<Vec3> {
    let chain = tree.ancestors(index);
    if chain.is_empty() {
        return None;
    }

    let mut position = Vec3::ZERO;
    for pair in chain.windows(2) {
        let [parent, child] = pair else {
            continue;
        };
        let parent_entry = tree.node(*parent)?;
        let order = parent_entry.children.iter().position(|entry| entry == child)?;
        position = child_position(
            position,
            order,
            parent_entry.children.len(),
            shell_radius(parent_entry.depth),
        );
    }
    Some(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::parse_tree;
    use crate::progress::ProgressUpdate;

    fn tree() -> KnowledgeTree {
        KnowledgeTree::from_root(
            parse_tree(
                r#"{"id":"root","label":"Root","type":"domain","children":[
                    {"id":"A","label":"A","type":"topic","difficulty":5,"children":[
                        {"id":"A1","label":"A1","type":"subtopic","children":[
                            {"id":"A1x","label":"A1x","type":"concept","children":[
                                {"id":"A1xy","label":"A1xy","type":"blog"}
                            ]}
                        ]},
                        {"id":"A2","label":"A2","type":"interactive","prerequisites":["A1"]}
                    ]},
                    {"id":"B","label":"B","type":"topic","children":[
                        {"id":"B1","label":"B1","type":"project"}
                    ]}
                ]}"#,
            )
            .unwrap(),
        )
    }

    fn path(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn ids(projection: &Projection) -> Vec<&str> {
        projection.nodes.iter().map(|node| node.id.as_str()).collect()
    }

    #[test]
    fn initial_projection_shows_root_and_first_ring() {
        let tree = tree();
        let progress = ProgressStore::in_memory();
        let projection = project(&tree, &[], &progress, true);

        assert_eq!(ids(&projection), ["root", "A", "B"]);
        assert_eq!(projection.edges.len(), 2);
        assert!(projection.nodes.iter().all(|node| node.opacity == 1.0));
    }

    #[test]
    fn not_ready_keeps_only_the_root() {
        let tree = tree();
        let progress = ProgressStore::in_memory();
        let projection = project(&tree, &path(&["A"]), &progress, false);

        assert_eq!(ids(&projection), ["root"]);
        assert!(projection.edges.is_empty());
        assert!(!projection.nodes[0].expanded);
    }

    #[test]
    fn visibility_stops_one_level_past_the_frontier() {
        let tree = tree();
        let progress = ProgressStore::in_memory();
        let route = path(&["A", "A1"]);
        let projection = project(&tree, &route, &progress, true);

        // A1x sits at depth 3 = path.len() + 1; its child at depth 4 is never emitted.
        assert!(projection.node("A1x").is_some());
        assert!(projection.node("A1xy").is_none());
        for node in &projection.nodes {
            assert!(node.depth <= route.len() + 1);
        }

        let deeper = path(&["A", "A1", "A1x"]);
        assert!(project(&tree, &deeper, &progress, true).node("A1xy").is_some());
    }

    #[test]
    fn off_path_siblings_fade_and_lose_connectors() {
        let tree = tree();
        let progress = ProgressStore::in_memory();
        let projection = project(&tree, &path(&["A"]), &progress, true);

        let opacity = |id: &str| projection.node(id).unwrap().opacity;
        assert_eq!(opacity("root"), FADED_OPACITY);
        assert_eq!(opacity("A"), 1.0);
        assert_eq!(opacity("B"), FADED_OPACITY);
        assert_eq!(opacity("A1"), 1.0);
        assert_eq!(opacity("A2"), 1.0);

        // B is faded and collapsed, and a faded root draws no connectors.
        assert!(projection.node("B1").is_none());
        let root_index = KnowledgeTree::ROOT;
        assert!(projection.edges.iter().all(|edge| edge.parent != root_index));
        assert_eq!(projection.edges.len(), 2);
    }

    #[test]
    fn sizes_follow_type_table_and_difficulty() {
        let tree = tree();
        let progress = ProgressStore::in_memory();
        let projection = project(&tree, &path(&["A"]), &progress, true);

        assert_eq!(projection.node("root").unwrap().size, ROOT_SIZE);
        assert_eq!(projection.node("A").unwrap().size, 2.0 * 1.5);
        assert_eq!(projection.node("B").unwrap().size, 2.0);
        assert_eq!(projection.node("A2").unwrap().size, 1.2);
    }

    #[test]
    fn locks_follow_the_progress_store() {
        let tree = tree();
        let mut progress = ProgressStore::in_memory();
        let route = path(&["A"]);

        assert!(project(&tree, &route, &progress, true).node("A2").unwrap().is_locked);
        progress.update_progress("A1", ProgressUpdate::progress(100.0));
        let projection = project(&tree, &route, &progress, true);
        assert!(!projection.node("A2").unwrap().is_locked);
        assert!(projection.node("A1").unwrap().completed);
    }

    #[test]
    fn projection_is_repeatable() {
        let tree = tree();
        let progress = ProgressStore::in_memory();
        let route = path(&["A", "A1"]);
        assert_eq!(
            project(&tree, &route, &progress, true),
            project(&tree, &route, &progress, true)
        );
    }

    #[test]
    fn node_position_matches_projected_geometry() {
        let tree = tree();
        let progress = ProgressStore::in_memory();
        let projection = project(&tree, &path(&["A", "A1"]), &progress, true);

        for node in &projection.nodes {
            assert_eq!(node_position(&tree, node.index), Some(node.position));
        }
        assert_eq!(node_position(&tree, KnowledgeTree::ROOT), Some(Vec3::ZERO));
        assert_eq!(node_position(&tree, 999), None);
    }

    #[test]
    fn child_order_drives_geometry() {
        let tree = tree();
        let swapped = KnowledgeTree::from_root(
            parse_tree(
                r#"{"id":"root","label":"Root","type":"domain","children":[
                    {"id":"B","label":"B","type":"topic"},
                    {"id":"A","label":"A","type":"topic"}
                ]}"#,
            )
            .unwrap(),
        );
        let progress = ProgressStore::in_memory();
        let original = project(&tree, &[], &progress, true);
        let reordered = project(&swapped, &[], &progress, true);
        assert_ne!(
            original.node("A").unwrap().position,
            reordered.node("A").unwrap().position
        );
    }
}
