use std::time::Instant;

use eframe::egui::{self, RichText, Ui};

use crate::stats::{StatsState, validate_repo};
use crate::util::{format_count, short_date};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Focus");
        ui.add_space(6.0);

        if self.controller.active().is_lobby() {
            ui.label("Pick a universe in the lobby or from the list on the left.");
            return;
        }

        let Some(entry) = self.controller.focused_node() else {
            ui.label("This universe has no knowledge tree.");
            return;
        };
        let node = entry.node.clone();
        let depth = entry.depth;
        let child_count = entry.children.len();
        let progress = self.controller.progress_of(&node.id).unwrap_or_default();
        let missing_prerequisites = node
            .prerequisites
            .iter()
            .filter(|id| !self.controller.progress().is_completed(id))
            .map(|id| {
                self.controller
                    .tree()
                    .and_then(|tree| tree.get(id))
                    .map_or_else(|| id.clone(), |entry| entry.node.label.clone())
            })
            .collect::<Vec<_>>();

        ui.label(RichText::new(node.label.as_str()).strong().size(18.0));
        ui.small(format!("{}  \u{2022}  {}", node.kind.label(), node.id));
        ui.add_space(6.0);

        if let Some(difficulty) = node.difficulty {
            ui.label(format!("Difficulty: {difficulty}/5"));
        }
        ui.label(format!("Depth: {depth}"));
        ui.label(format!("Children: {child_count}"));
        if !node.tags.is_empty() {
            ui.label(format!("Tags: {}", node.tags.join(", ")));
        }
        if let Some(description) = &node.description {
            ui.add_space(4.0);
            ui.label(description.as_str());
        }

        ui.separator();
        ui.label(RichText::new("Progress").strong());
        ui.add(
            egui::ProgressBar::new(progress.progress / 100.0)
                .show_percentage()
                .desired_width(ui.available_width()),
        );
        if progress.completed {
            ui.label("Mastered");
        }

        if !missing_prerequisites.is_empty() {
            ui.add_space(4.0);
            ui.label(RichText::new("Locked").strong());
            for label in &missing_prerequisites {
                ui.label(format!("- requires {label}"));
            }
        }

        if node.is_interactive() || node.content_type.is_some() {
            ui.add_space(8.0);
            let enabled = self.lesson.is_none();
            if ui.add_enabled(enabled, egui::Button::new("Open lesson")).clicked() {
                self.open_lesson(&node.id);
            }
        }

        if let Some(repo) = node.repo_link.as_deref() {
            ui.separator();
            self.draw_repo_stats(ui, repo);
        }
    }

    fn draw_repo_stats(&mut self, ui: &mut Ui, repo: &str) {
        ui.label(RichText::new("Repository").strong());
        ui.hyperlink_to(repo, format!("https://github.com/{repo}"));

        if validate_repo(repo).is_err() {
            ui.weak("Not an owner/name repository link.");
            return;
        }
        let Some(stats) = self.stats.as_mut() else {
            ui.weak("Repository stats are unavailable.");
            return;
        };

        stats.request(repo, Instant::now());
        match stats.state(repo) {
            Some(StatsState::Ready(repo_stats)) => {
                ui.label(format!(
                    "\u{2605} {}   forks {}   open issues {}",
                    format_count(repo_stats.stars),
                    format_count(repo_stats.forks),
                    format_count(repo_stats.open_issues)
                ));
                if !repo_stats.last_commit_date.is_empty() {
                    ui.label(format!("Last push: {}", short_date(&repo_stats.last_commit_date)));
                }
            }
            Some(StatsState::NotFound) => {
                ui.weak("Repository not found.");
            }
            Some(StatsState::Unavailable) => {
                ui.weak("Stats unavailable right now.");
            }
            Some(StatsState::Loading) | None => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.weak("Fetching stats...");
                });
            }
        }
    }
}
