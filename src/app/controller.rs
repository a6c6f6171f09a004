use glam::Vec3;

use crate::knowledge::{KnowledgeTree, TreeNode, UniverseId, UniverseTrees};
use crate::progress::{ProgressData, ProgressStore, ProgressUpdate};

use super::camera::CameraDirector;
use super::graph::project::{Projection, node_position, project};
use super::settle::SettleTimer;
use super::traversal::{CameraCommand, TraversalState, UniverseStates, framing_size};

#[derive(Clone, Debug, PartialEq)]
struct ProjectionKey {
    universe: UniverseId,
    path: Vec<String>,
    progress_revision: u64,
    ready: bool,
}

struct CachedProjection {
    key: ProjectionKey,
    projection: Projection,
}

/// Owns everything that changes while a user travels through the universes.
///
/// All time-dependent operations take `now` in seconds on the egui clock, so the
/// whole flow can be driven from tests without a window.
pub struct UniverseController {
    trees: UniverseTrees,
    states: UniverseStates,
    active: UniverseId,
    progress: ProgressStore,
    camera: CameraDirector,
    settle: SettleTimer,
    settle_delay_secs: f64,
    projection_cache: Option<CachedProjection>,
}

impl UniverseController {
    pub fn new(trees: UniverseTrees, progress: ProgressStore, settle_delay_secs: f64) -> Self {
        Self {
            trees,
            states: UniverseStates::default(),
            active: UniverseId::Lobby,
            progress,
            camera: CameraDirector::default(),
            settle: SettleTimer::default(),
            settle_delay_secs,
            projection_cache: None,
        }
    }

    pub fn active(&self) -> UniverseId {
        self.active
    }

    pub fn tree(&self) -> Option<&KnowledgeTree> {
        self.trees.get(&self.active)
    }

    pub fn tree_for(&self, universe: UniverseId) -> Option<&KnowledgeTree> {
        self.trees.get(&universe)
    }

    fn state(&self) -> Option<&TraversalState> {
        self.states.get(self.active)
    }

    pub fn path(&self) -> &[String] {
        self.state().map(TraversalState::path).unwrap_or_default()
    }

    pub fn is_ready(&self) -> bool {
        self.settle.is_ready(self.active)
    }

    pub fn camera(&self) -> &CameraDirector {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraDirector {
        &mut self.camera
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn progress_of(&self, id: &str) -> Option<ProgressData> {
        let entry = self.tree()?.get(id)?;
        Some(self.progress.progress_for(&entry.node))
    }

    /// The last node on the path, or the root when nothing is selected.
    pub fn focused_node(&self) -> Option<&TreeNode> {
        let tree = self.tree()?;
        match self.state().and_then(TraversalState::focused_id) {
            Some(id) => tree.get(id),
            None => Some(tree.root()),
        }
    }

    /// Swaps in freshly loaded trees and drops path entries they no longer contain.
    pub fn replace_trees(&mut self, trees: UniverseTrees) {
        self.trees = trees;
        for universe in UniverseId::GRAPHS {
            if let (Some(tree), Some(state)) = (self.trees.get(&universe), self.states.get_mut(universe)) {
                state.prune_to(tree);
            }
        }
        self.projection_cache = None;
    }

    fn apply(&mut self, command: CameraCommand, now: f64) {
        match command {
            CameraCommand::FlyTo { target, size } => self.camera.fly_to(target, size, now),
            CameraCommand::Overview => self
                .camera
                .return_to_overview(self.active.overview_position(), now),
        }
    }

    pub fn switch_universe(&mut self, universe: UniverseId, now: f64) {
        if universe == self.active {
            return;
        }
        tracing::info!(from = self.active.key(), to = universe.key(), "switching universe");
        self.active = universe;

        if universe.is_lobby() {
            self.settle.cancel();
            self.apply(CameraCommand::Overview, now);
            return;
        }

        self.settle.arm(universe, now, self.settle_delay_secs);
        let command = match self.state() {
            Some(state) => match (state.path().is_empty(), state.camera_target()) {
                (false, Some(target)) => CameraCommand::FlyTo {
                    target,
                    size: framing_size(state.path().len()),
                },
                _ => CameraCommand::Overview,
            },
            None => CameraCommand::Overview,
        };
        self.apply(command, now);
    }

    /// Selects a node in the active universe. Returns false when the id is unknown.
    pub fn activate_node(&mut self, id: &str, now: f64) -> bool {
        let projected = self.projection().node(id).map(|node| node.position);
        let Some(tree) = self.trees.get(&self.active) else {
            return false;
        };
        let Some(index) = tree.index_of(id) else {
            tracing::warn!(id, universe = self.active.key(), "activation of unknown node ignored");
            return false;
        };
        let Some(position) = projected.or_else(|| node_position(tree, index)) else {
            return false;
        };
        let Some(state) = self.states.get_mut(self.active) else {
            return false;
        };

        let command = state.activate(id, position);
        tracing::debug!(id, depth = state.path().len(), "node activated");
        self.apply(command, now);
        true
    }

    pub fn jump_to_depth(&mut self, depth: usize, now: f64) {
        let Some(state) = self.states.get_mut(self.active) else {
            return;
        };
        if let Some(command) = state.jump_to_depth(depth) {
            self.apply(command, now);
        }
    }

    pub fn reset_to_root(&mut self, now: f64) {
        let Some(state) = self.states.get_mut(self.active) else {
            return;
        };
        let command = state.reset();
        self.apply(command, now);
    }

    /// Opens the whole chain down to `id` and flies to it, e.g. for a search hit.
    pub fn reveal(&mut self, id: &str, now: f64) -> bool {
        let Some(tree) = self.trees.get(&self.active) else {
            return false;
        };
        let (Some(index), Some(chain)) = (tree.index_of(id), tree.chain_from_root(id)) else {
            return false;
        };
        let position = node_position(tree, index).unwrap_or(Vec3::ZERO);
        let Some(state) = self.states.get_mut(self.active) else {
            return false;
        };

        let command = state.focus_chain(chain, position);
        self.apply(command, now);
        true
    }

    /// Records a finished lesson; failures leave progress untouched.
    pub fn complete_lesson(&mut self, id: &str, passed: bool) {
        if !passed {
            tracing::debug!(id, "lesson attempt failed");
            return;
        }
        self.progress.update_progress(id, ProgressUpdate::mastered());
    }

    /// Advances timers and camera; returns true while another frame is needed.
    pub fn tick(&mut self, now: f64) -> bool {
        let settled = self.settle.poll(now);
        let moving = self.camera.tick(now);
        settled || moving || self.settle.is_pending()
    }

    pub fn projection(&mut self) -> &Projection {
        let key = ProjectionKey {
            universe: self.active,
            path: self.path().to_vec(),
            progress_revision: self.progress.revision(),
            ready: self.is_ready(),
        };

        let cached = match self.projection_cache.take() {
            Some(cached) if cached.key == key => cached,
            _ => {
                let projection = match self.trees.get(&self.active) {
                    Some(tree) if !self.active.is_lobby() => {
                        project(tree, &key.path, &self.progress, key.ready)
                    }
                    _ => Projection::default(),
                };
                tracing::trace!(
                    nodes = projection.nodes.len(),
                    edges = projection.edges.len(),
                    "projection rebuilt"
                );
                CachedProjection { key, projection }
            }
        };

        &self.projection_cache.insert(cached).projection
    }
}
