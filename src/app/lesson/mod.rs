use eframe::egui::{self, Context, RichText};

use crate::knowledge::{ContentType, KnowledgeNode};

mod quiz;
mod simulation;

pub use quiz::QuizState;
pub use simulation::Simulation;

/// Lets a lesson outcome through at most once per panel session.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompletionLatch {
    reported: bool,
}

impl CompletionLatch {
    /// A pass is forwarded once; failures never latch so a retry can still pass.
    pub fn report(&mut self, passed: bool) -> Option<bool> {
        if self.reported {
            return None;
        }
        if passed {
            self.reported = true;
        }
        Some(passed)
    }

    pub fn has_reported(&self) -> bool {
        self.reported
    }
}

#[derive(Clone, Debug)]
enum LessonBody {
    Reading {
        description: Option<String>,
        resources: Vec<String>,
    },
    Quiz(QuizState),
    Simulation(Simulation),
}

#[derive(Clone, Debug)]
pub struct LessonOutcome {
    pub node_id: String,
    pub passed: bool,
}

pub struct LessonPanel {
    node_id: String,
    label: String,
    heading: String,
    body: LessonBody,
    latch: CompletionLatch,
    open: bool,
}

impl LessonPanel {
    pub fn open(node: &KnowledgeNode) -> Self {
        let level = node
            .difficulty
            .map(|difficulty| format!("Level {difficulty}"))
            .unwrap_or_else(|| "Concept".to_owned());
        let body = match node.content_type {
            Some(ContentType::Quiz) => LessonBody::Quiz(QuizState::new(&node.label)),
            Some(ContentType::Simulation) => {
                LessonBody::Simulation(Simulation::for_content(node.content_id.as_deref()))
            }
            _ => LessonBody::Reading {
                description: node.description.clone(),
                resources: node.resources.clone(),
            },
        };

        tracing::debug!(node = %node.id, "lesson opened");
        Self {
            node_id: node.id.clone(),
            label: node.label.clone(),
            heading: format!("{} \u{2022} {level}", node.kind.label().to_uppercase()),
            body,
            latch: CompletionLatch::default(),
            open: true,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Draws the panel; returns an outcome on the frame a lesson finishes.
    pub(in crate::app) fn show(&mut self, ctx: &Context) -> Option<LessonOutcome> {
        let mut open = self.open;
        let mut return_clicked = false;
        let mut finished = None;

        egui::Window::new(RichText::new(&self.label).strong())
            .id(egui::Id::new(("lesson", self.node_id.as_str())))
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_width(560.0)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.small(self.heading.as_str());
                ui.separator();

                egui::ScrollArea::vertical()
                    .max_height(420.0)
                    .show(ui, |ui| {
                        finished = match &mut self.body {
                            LessonBody::Quiz(quiz) => quiz.show(ui),
                            LessonBody::Simulation(simulation) => simulation.show(ui),
                            LessonBody::Reading {
                                description,
                                resources,
                            } => {
                                ui.label(
                                    description
                                        .as_deref()
                                        .unwrap_or("No description available for this node."),
                                );
                                if !resources.is_empty() {
                                    ui.add_space(10.0);
                                    ui.label(RichText::new("DEEP LEARNING RESOURCES").small().strong());
                                    for resource in resources.iter() {
                                        ui.hyperlink(resource);
                                    }
                                }
                                None
                            }
                        };
                    });

                ui.separator();
                ui.vertical_centered(|ui| {
                    if self.latch.has_reported() {
                        ui.weak("Progress saved.");
                    }
                    if ui.button("Return to Graph").clicked() {
                        return_clicked = true;
                    }
                });
            });

        if !open || return_clicked {
            self.close();
        }

        let passed = self.latch.report(finished?)?;
        tracing::info!(node = %self.node_id, passed, "lesson finished");
        Some(LessonOutcome {
            node_id: self.node_id.clone(),
            passed,
        })
    }
}
