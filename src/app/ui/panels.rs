use std::collections::HashMap;
use std::time::{Duration, Instant};

use eframe::egui::{self, Align, Context, Layout, RichText};

use crate::knowledge::UniverseId;
use crate::stats::StatsCache;

use super::super::ViewModel;
use super::super::controller::UniverseController;
use super::super::theme::{Theme, ThemeMode};

const STATS_POLL_INTERVAL: Duration = Duration::from_millis(100);

impl ViewModel {
    pub(in crate::app) fn new(
        controller: UniverseController,
        stats: Option<StatsCache>,
        theme_mode: ThemeMode,
    ) -> Self {
        Self {
            controller,
            stats,
            theme_mode,
            search: String::new(),
            lesson: None,
            star_fields: HashMap::new(),
            visible_node_count: 0,
            visible_edge_count: 0,
        }
    }

    pub(in crate::app) fn theme(&self) -> Theme {
        Theme::resolve(self.theme_mode, self.controller.active())
    }

    pub(in crate::app) fn now(ctx: &Context) -> f64 {
        ctx.input(|input| input.time)
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        let now = Self::now(ctx);
        let mut needs_repaint = self.controller.tick(now);
        if let Some(stats) = self.stats.as_mut() {
            needs_repaint |= stats.poll(Instant::now());
            if stats.is_pending() {
                ctx.request_repaint_after(STATS_POLL_INTERVAL);
            }
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("DevVerse");
                    ui.separator();
                    ui.label(RichText::new(self.controller.active().label()).strong());
                    if let Some(tree) = self.controller.tree() {
                        ui.label(format!("nodes: {}", tree.len()));
                    }
                    ui.label(format!("mastered: {}", self.completed_count()));
                    let reload_button =
                        ui.add_enabled(!is_reloading, egui::Button::new("Reload trees"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let toggle = format!("{} mode", self.theme_mode.toggled().label());
                        if ui.button(toggle).clicked() {
                            self.toggle_theme(ui.ctx());
                        }
                        if !self.controller.active().is_lobby() {
                            ui.label(format!(
                                "visible: {} nodes / {} links",
                                self.visible_node_count, self.visible_edge_count
                            ));
                        }
                    });
                });
            });

        if !self.controller.active().is_lobby() {
            egui::TopBottomPanel::bottom("breadcrumb")
                .resizable(false)
                .show(ctx, |ui| self.draw_breadcrumb(ui, now));
        }

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if self.controller.active().is_lobby() {
                    self.draw_lobby(ui);
                } else {
                    self.draw_graph(ui);
                }
            });

        self.show_lesson(ctx);

        if needs_repaint {
            ctx.request_repaint();
        }
    }

    fn draw_breadcrumb(&mut self, ui: &mut egui::Ui, now: f64) {
        ui.horizontal_centered(|ui| {
            if ui.button("Lobby").clicked() {
                self.controller.switch_universe(UniverseId::Lobby, now);
                return;
            }
            ui.weak("|");

            let path = self.controller.path().to_vec();
            if ui.selectable_label(path.is_empty(), "Home").clicked() {
                self.controller.reset_to_root(now);
            }
            for (index, id) in path.iter().enumerate() {
                ui.weak("/");
                let is_tip = index + 1 == path.len();
                if ui.selectable_label(is_tip, id.as_str()).clicked() {
                    self.controller.jump_to_depth(index + 1, now);
                }
            }
        });
    }

    pub(in crate::app) fn toggle_theme(&mut self, ctx: &Context) {
        self.theme_mode = self.theme_mode.toggled();
        tracing::debug!(mode = self.theme_mode.label(), "theme toggled");
        ctx.set_visuals(self.theme().visuals());
    }

    pub(in crate::app) fn open_lesson(&mut self, id: &str) {
        let Some(entry) = self.controller.tree().and_then(|tree| tree.get(id)) else {
            return;
        };
        self.lesson = Some(super::super::LessonPanel::open(&entry.node));
    }

    fn show_lesson(&mut self, ctx: &Context) {
        let Some(panel) = self.lesson.as_mut() else {
            return;
        };

        if let Some(outcome) = panel.show(ctx) {
            self.controller.complete_lesson(&outcome.node_id, outcome.passed);
        }
        if !panel.is_open() {
            tracing::debug!(node = panel.node_id(), "lesson closed");
            self.lesson = None;
        }
    }

    fn completed_count(&self) -> usize {
        self.mastery_summary(self.controller.active())
            .map_or(0, |(done, _)| done)
    }
}
