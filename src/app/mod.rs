use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use glam::Vec3;

use crate::config::AppConfig;
use crate::knowledge::{UniverseId, UniverseTrees, load_universe_trees};
use crate::progress::{FileStore, ProgressStore};
use crate::stats::{GithubSource, StatsCache, StatsSource};

mod camera;
mod controller;
mod graph;
mod lesson;
mod render_utils;
mod settle;
mod theme;
mod traversal;
mod ui;

pub use theme::ThemeMode;

use controller::UniverseController;
use lesson::LessonPanel;

type LoadResult = Result<UniverseTrees, String>;

pub struct UniverseApp {
    config: AppConfig,
    stats_source: Option<Arc<dyn StatsSource>>,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    controller: UniverseController,
    stats: Option<StatsCache>,
    theme_mode: ThemeMode,
    search: String,
    lesson: Option<LessonPanel>,
    star_fields: HashMap<UniverseId, Vec<Vec3>>,
    visible_node_count: usize,
    visible_edge_count: usize,
}

impl UniverseApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let stats_source = match GithubSource::new(&config.github_api, config.github_token.as_deref()) {
            Ok(source) => Some(Arc::new(source) as Arc<dyn StatsSource>),
            Err(error) => {
                tracing::warn!(%error, "repository stats disabled");
                None
            }
        };

        let theme = theme::Theme::resolve(config.theme, UniverseId::Lobby);
        cc.egui_ctx.set_visuals(theme.visuals());

        let state = Self::start_load(&config);
        Self {
            config,
            stats_source,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(config: &AppConfig) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();
        let data_dir = config.data_dir.clone();

        thread::spawn(move || {
            let result =
                load_universe_trees(data_dir.as_deref()).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(config: &AppConfig) -> AppState {
        tracing::info!(data_dir = ?config.data_dir, "loading knowledge trees");
        AppState::Loading {
            rx: Self::spawn_load(config),
        }
    }

    fn open_progress(&self) -> ProgressStore {
        tracing::info!(path = %self.config.progress_file.display(), "opening progress store");
        ProgressStore::load(Box::new(FileStore::new(&self.config.progress_file)))
    }

    fn ready_state(&self, trees: UniverseTrees) -> AppState {
        let controller = UniverseController::new(
            trees,
            self.open_progress(),
            self.config.settle_delay.as_secs_f64(),
        );
        let stats = self
            .stats_source
            .as_ref()
            .map(|source| StatsCache::new(Arc::clone(source), self.config.stats_ttl));
        AppState::Ready(Box::new(ViewModel::new(controller, stats, self.config.theme)))
    }
}

impl eframe::App for UniverseApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(trees)) => transition = Some(Ok(trees)),
                    Ok(Err(error)) => transition = Some(Err(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading knowledge universes...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load knowledge trees");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        self.reload_rx = Some(Self::spawn_load(&self.config));
                    }
                });

                if let Some(rx) = self.reload_rx.take() {
                    self.state = AppState::Loading { rx };
                }
                return;
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    tracing::info!("reloading knowledge trees");
                    self.reload_rx = Some(Self::spawn_load(&self.config));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(trees)) => {
                            tracing::info!("knowledge trees reloaded");
                            model.controller.replace_trees(trees);
                        }
                        Ok(Err(error)) => transition = Some(Err(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(trees) => self.ready_state(trees),
                Err(error) => {
                    tracing::error!(%error, "knowledge tree load failed");
                    AppState::Error(error)
                }
            };
        }
    }
}
