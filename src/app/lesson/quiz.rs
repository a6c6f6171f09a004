use eframe::egui::{self, Button, RichText, Ui, vec2};

#[derive(Clone, Debug, PartialEq)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: [&'static str; 4],
    pub correct: usize,
}

/// Two mastery questions phrased around the node label.
pub fn questions_for(label: &str) -> Vec<QuizQuestion> {
    vec![
        QuizQuestion {
            prompt: format!("What is the primary characteristic of {label}?"),
            options: [
                "Performance focus",
                "Spatial organization",
                "Hierarchical structure",
                "Data independence",
            ],
            correct: 2,
        },
        QuizQuestion {
            prompt: format!(
                "In the context of the KnowledgeVerse, how does {label} interact with its neighbors?"
            ),
            options: [
                "Direct pointer links",
                "Hierarchical parent-child shells",
                "Random orbital patterns",
                "Fixed grid placement",
            ],
            correct: 1,
        },
    ]
}

#[derive(Clone, Debug)]
pub struct QuizState {
    questions: Vec<QuizQuestion>,
    step: usize,
    selected: Option<usize>,
    score: usize,
    finished: bool,
}

impl QuizState {
    pub fn new(label: &str) -> Self {
        Self {
            questions: questions_for(label),
            step: 0,
            selected: None,
            score: 0,
            finished: false,
        }
    }

    pub fn current(&self) -> Option<&QuizQuestion> {
        if self.finished {
            return None;
        }
        self.questions.get(self.step)
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn passed(&self) -> bool {
        self.finished && self.score == self.questions.len()
    }

    pub fn select(&mut self, option: usize) {
        if let Some(question) = self.current()
            && option < question.options.len()
        {
            self.selected = Some(option);
        }
    }

    /// Scores the selected answer and advances. On the last question the quiz
    /// finishes and the pass/fail outcome is returned.
    pub fn submit(&mut self) -> Option<bool> {
        let question = self.current()?;
        let selected = self.selected?;
        if selected == question.correct {
            self.score += 1;
        }

        self.selected = None;
        if self.step + 1 < self.questions.len() {
            self.step += 1;
            return None;
        }

        self.finished = true;
        Some(self.passed())
    }

    pub fn retry(&mut self) {
        self.step = 0;
        self.selected = None;
        self.score = 0;
        self.finished = false;
    }

    pub(in crate::app) fn show(&mut self, ui: &mut Ui) -> Option<bool> {
        if self.is_finished() {
            let passed = self.passed();
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(if passed {
                    "Mastery Achieved!"
                } else {
                    "Keep Practicing"
                });
                ui.label(format!(
                    "You scored {} out of {} questions correctly.",
                    self.score(),
                    self.questions.len()
                ));
                if !passed {
                    ui.add_space(8.0);
                    if ui.button("Try Again").clicked() {
                        self.retry();
                    }
                }
            });
            return None;
        }

        let question = self.current().cloned()?;

        let step = self.step();
        ui.small(format!("QUESTION {}/{}", step + 1, self.questions.len()));
        ui.add_space(6.0);
        ui.label(RichText::new(&question.prompt).size(17.0).strong());
        ui.add_space(10.0);

        for (index, option) in question.options.iter().enumerate() {
            let is_selected = self.selected() == Some(index);
            let text = if is_selected {
                RichText::new(*option).strong()
            } else {
                RichText::new(*option)
            };
            let button = Button::new(text)
                .selected(is_selected)
                .min_size(vec2(ui.available_width(), 30.0));
            if ui.add(button).clicked() {
                self.select(index);
            }
        }

        ui.add_space(12.0);
        let submit_label = if step + 1 < self.questions.len() {
            "Next Question"
        } else {
            "Submit Quiz"
        };
        let submit = ui.add_enabled(
            self.selected().is_some(),
            egui::Button::new(submit_label).min_size(vec2(ui.available_width(), 34.0)),
        );
        if submit.clicked() {
            return self.submit();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn questions_mention_the_label() {
        let questions = questions_for("Ownership");
        assert_eq!(questions.len(), 2);
        assert!(questions.iter().all(|question| question.prompt.contains("Ownership")));
        assert_eq!(questions[0].correct, 2);
        assert_eq!(questions[1].correct, 1);
    }

    #[test]
    fn all_correct_passes() {
        let mut quiz = QuizState::new("Traits");
        quiz.select(2);
        assert_eq!(quiz.submit(), None);
        assert_eq!(quiz.step(), 1);
        quiz.select(1);
        assert_eq!(quiz.submit(), Some(true));
        assert!(quiz.passed());
        assert_eq!(quiz.score(), 2);
    }

    #[test]
    fn one_wrong_answer_fails_and_retry_resets() {
        let mut quiz = QuizState::new("Traits");
        quiz.select(0);
        quiz.submit();
        quiz.select(1);
        assert_eq!(quiz.submit(), Some(false));
        assert_eq!(quiz.score(), 1);

        quiz.retry();
        assert!(!quiz.is_finished());
        assert_eq!(quiz.step(), 0);
        assert_eq!(quiz.score(), 0);
    }

    #[test]
    fn submit_requires_a_selection() {
        let mut quiz = QuizState::new("Traits");
        assert_eq!(quiz.submit(), None);
        assert_eq!(quiz.step(), 0);

        quiz.select(9);
        assert_eq!(quiz.selected(), None);
    }

    #[test]
    fn finished_quiz_ignores_input() {
        let mut quiz = QuizState::new("Traits");
        quiz.select(2);
        quiz.submit();
        quiz.select(1);
        quiz.submit();

        quiz.select(0);
        assert_eq!(quiz.selected(), None);
        assert_eq!(quiz.submit(), None);
        assert!(quiz.current().is_none());
    }
}
