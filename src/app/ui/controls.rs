use eframe::egui::{self, RichText, Ui};

use crate::knowledge::UniverseId;

use super::super::ViewModel;
use super::super::theme::universe_color;

const SEARCH_RESULT_LIMIT: usize = 12;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        let now = Self::now(ui.ctx());

        ui.heading("Universes");
        ui.add_space(4.0);
        let active = self.controller.active();
        for universe in std::iter::once(UniverseId::Lobby).chain(UniverseId::GRAPHS) {
            let mut text = RichText::new(universe.label());
            if !universe.is_lobby() {
                text = text.color(universe_color(universe));
            }
            let response = ui.selectable_label(active == universe, text);
            let response = match self.mastery_summary(universe) {
                Some((done, total)) => response.on_hover_text(format!("{done}/{total} mastered")),
                None => response,
            };
            if response.clicked() {
                self.controller.switch_universe(universe, now);
            }
        }

        ui.separator();
        ui.heading("Search");
        ui.add_space(4.0);

        if active.is_lobby() {
            ui.label("Enter a universe to search its nodes.");
            return;
        }

        let search_response = ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("node label or id")
                .desired_width(f32::INFINITY),
        );
        let submit = search_response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));

        let Some(tree) = self.controller.tree() else {
            return;
        };
        let hits = tree
            .search(&self.search, SEARCH_RESULT_LIMIT)
            .into_iter()
            .filter_map(|hit| tree.node(hit.index))
            .map(|entry| (entry.node.id.clone(), entry.node.label.clone(), entry.depth))
            .collect::<Vec<_>>();

        if self.search.trim().is_empty() {
            ui.weak("Fuzzy-matches labels and ids in the current universe.");
            return;
        }
        if hits.is_empty() {
            ui.label("No matching nodes.");
            return;
        }

        let mut reveal = hits.first().filter(|_| submit).map(|(id, _, _)| id.clone());
        egui::ScrollArea::vertical()
            .id_salt("search_results_scroll")
            .max_height(360.0)
            .show(ui, |ui| {
                for (id, label, depth) in &hits {
                    let text = format!("{label}  (depth {depth})");
                    if ui.link(text).on_hover_text(id.as_str()).clicked() {
                        reveal = Some(id.clone());
                    }
                }
            });

        if let Some(id) = reveal {
            tracing::debug!(id, "revealing search hit");
            self.controller.reveal(&id, now);
        }
    }

    pub(in crate::app) fn mastery_summary(&self, universe: UniverseId) -> Option<(usize, usize)> {
        let tree = self.controller.tree_for(universe)?;
        let progress = self.controller.progress();
        let done = tree
            .iter()
            .filter(|(_, entry)| progress.progress_for(&entry.node).completed)
            .count();
        Some((done, tree.len()))
    }
}
