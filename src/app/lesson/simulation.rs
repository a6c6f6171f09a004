use eframe::egui::{self, Color32, RichText, Ui};
use rand::Rng;

const INITIAL_FILES: [&str; 2] = ["index.html", "styles.css"];
const COMMITS_FOR_MASTERY: usize = 2;
const COMMIT_ID_LEN: usize = 7;
const COMMIT_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    pub id: String,
    pub message: String,
    pub files: Vec<String>,
}

fn random_commit_id() -> String {
    let mut rng = rand::thread_rng();
    (0..COMMIT_ID_LEN)
        .map(|_| char::from(COMMIT_ID_ALPHABET[rng.gen_range(0..COMMIT_ID_ALPHABET.len())]))
        .collect()
}

/// Working directory, staging area and history of a toy repository.
#[derive(Clone, Debug)]
pub struct CommitSimulation {
    working: Vec<String>,
    staged: Vec<String>,
    /// Newest first.
    commits: Vec<Commit>,
    new_file: String,
    message: String,
}

impl Default for CommitSimulation {
    fn default() -> Self {
        Self {
            working: INITIAL_FILES.iter().map(|file| file.to_string()).collect(),
            staged: Vec::new(),
            commits: Vec::new(),
            new_file: String::new(),
            message: String::new(),
        }
    }
}

impl CommitSimulation {
    pub fn working(&self) -> &[String] {
        &self.working
    }

    pub fn staged(&self) -> &[String] {
        &self.staged
    }

    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn add_file(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.working.iter().any(|file| file == name) {
            return false;
        }
        self.working.push(name.to_owned());
        true
    }

    pub fn stage(&mut self, file: &str) {
        if self.working.iter().any(|entry| entry == file) && !self.staged.iter().any(|entry| entry == file) {
            self.staged.push(file.to_owned());
        }
    }

    pub fn unstage(&mut self, file: &str) {
        self.staged.retain(|entry| entry != file);
    }

    pub fn can_commit(&self, message: &str) -> bool {
        !self.staged.is_empty() && !message.trim().is_empty()
    }

    /// Records a commit of everything staged. Returns `Some(true)` once the
    /// history holds enough commits to count as mastered.
    pub fn commit(&mut self, message: &str) -> Option<bool> {
        if !self.can_commit(message) {
            return None;
        }

        let commit = Commit {
            id: random_commit_id(),
            message: message.trim().to_owned(),
            files: std::mem::take(&mut self.staged),
        };
        tracing::debug!(id = %commit.id, files = commit.files.len(), "simulated commit");
        self.commits.insert(0, commit);

        self.objective_met().then_some(true)
    }

    pub fn objective_met(&self) -> bool {
        self.commits.len() >= COMMITS_FOR_MASTERY
    }

    fn show(&mut self, ui: &mut Ui) -> Option<bool> {
        let mut outcome = None;
        let mut to_stage = None;
        let mut to_unstage = None;

        ui.columns(3, |columns| {
            columns[0].label(RichText::new("WORKING DIRECTORY").small().strong());
            for file in &self.working {
                columns[0].horizontal(|ui| {
                    ui.label(file.as_str());
                    if !self.staged.contains(file) && ui.small_button("Stage").clicked() {
                        to_stage = Some(file.clone());
                    }
                });
            }
            columns[0].horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut self.new_file)
                        .hint_text("new_file.js")
                        .desired_width(110.0),
                );
                if ui.button("+").clicked() {
                    let name = std::mem::take(&mut self.new_file);
                    if !self.add_file(&name) {
                        self.new_file = name;
                    }
                }
            });

            columns[1].label(
                RichText::new("STAGING AREA")
                    .small()
                    .strong()
                    .color(Color32::from_rgb(74, 222, 128)),
            );
            if self.staged.is_empty() {
                columns[1].weak("Stage files to see them here");
            }
            for file in &self.staged {
                columns[1].horizontal(|ui| {
                    ui.colored_label(Color32::from_rgb(74, 222, 128), file.as_str());
                    if ui.small_button("Unstage").clicked() {
                        to_unstage = Some(file.clone());
                    }
                });
            }

            columns[2].label(
                RichText::new("COMMIT HISTORY")
                    .small()
                    .strong()
                    .color(Color32::from_rgb(96, 165, 250)),
            );
            if self.commits.is_empty() {
                columns[2].weak("No commits yet");
            }
            for commit in &self.commits {
                columns[2].group(|ui| {
                    ui.monospace(commit.id.as_str());
                    ui.label(RichText::new(commit.message.as_str()).strong());
                    ui.weak(format!("{} files changed", commit.files.len()));
                });
            }
        });

        if let Some(file) = to_stage {
            self.stage(&file);
        }
        if let Some(file) = to_unstage {
            self.unstage(&file);
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.message)
                    .hint_text("Ex: Add landing page structural components")
                    .desired_width(ui.available_width() - 90.0),
            );
            let enabled = self.can_commit(&self.message);
            if ui.add_enabled(enabled, egui::Button::new("Commit")).clicked() {
                let message = std::mem::take(&mut self.message);
                outcome = self.commit(&message);
            }
        });

        if self.objective_met() {
            ui.vertical_centered(|ui| {
                ui.colored_label(
                    Color32::from_rgb(74, 222, 128),
                    "Objective Met: You've mastered basic commits!",
                );
            });
        }
        outcome
    }
}

#[derive(Clone, Debug)]
pub enum Simulation {
    Commit(CommitSimulation),
    /// A lab that is not built yet and can be skipped straight to mastery.
    Placeholder {
        title: &'static str,
        blurb: &'static str,
    },
    Missing(String),
}

impl Simulation {
    pub fn for_content(content_id: Option<&str>) -> Self {
        match content_id {
            Some("git-commit") => Self::Commit(CommitSimulation::default()),
            Some("git-branch") => Self::Placeholder {
                title: "Branching Visualizer",
                blurb: "Learn to manage multiple lines of development. Implementation in progress.",
            },
            Some("git-conflict") => Self::Placeholder {
                title: "Merge Conflict Lab",
                blurb: "Master the art of resolving conflicting changes. Implementation in progress.",
            },
            other => Self::Missing(other.unwrap_or_default().to_owned()),
        }
    }

    pub(in crate::app) fn show(&mut self, ui: &mut Ui) -> Option<bool> {
        match self {
            Self::Commit(simulation) => simulation.show(ui),
            Self::Placeholder { title, blurb } => {
                let mut outcome = None;
                ui.vertical_centered(|ui| {
                    ui.add_space(16.0);
                    ui.heading(*title);
                    ui.label(*blurb);
                    ui.add_space(10.0);
                    if ui.button("Skip to Mastery").clicked() {
                        outcome = Some(true);
                    }
                });
                outcome
            }
            Self::Missing(id) => {
                ui.vertical_centered(|ui| {
                    ui.add_space(16.0);
                    ui.weak(format!("Simulation \"{id}\" not found."));
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_two_untracked_files() {
        let simulation = CommitSimulation::default();
        assert_eq!(simulation.working(), ["index.html", "styles.css"]);
        assert!(simulation.staged().is_empty());
        assert!(simulation.commits().is_empty());
    }

    #[test]
    fn add_file_rejects_blank_and_duplicate_names() {
        let mut simulation = CommitSimulation::default();
        assert!(simulation.add_file("app.js"));
        assert!(!simulation.add_file("app.js"));
        assert!(!simulation.add_file("   "));
        assert_eq!(simulation.working().len(), 3);
    }

    #[test]
    fn staging_is_idempotent_and_reversible() {
        let mut simulation = CommitSimulation::default();
        simulation.stage("index.html");
        simulation.stage("index.html");
        simulation.stage("missing.txt");
        assert_eq!(simulation.staged(), ["index.html"]);

        simulation.unstage("index.html");
        assert!(simulation.staged().is_empty());
    }

    #[test]
    fn commit_needs_staged_files_and_a_message() {
        let mut simulation = CommitSimulation::default();
        assert_eq!(simulation.commit("initial"), None);
        simulation.stage("index.html");
        assert_eq!(simulation.commit("  "), None);
        assert!(simulation.commits().is_empty());
        assert_eq!(simulation.staged(), ["index.html"]);
    }

    #[test]
    fn second_commit_completes_the_lesson() {
        let mut simulation = CommitSimulation::default();
        simulation.stage("index.html");
        assert_eq!(simulation.commit("add page"), None);
        assert!(simulation.staged().is_empty());

        simulation.stage("styles.css");
        assert_eq!(simulation.commit("add styles"), Some(true));
        assert!(simulation.objective_met());

        let history = simulation.commits();
        assert_eq!(history[0].message, "add styles");
        assert_eq!(history[1].files, ["index.html"]);
        assert_eq!(history[0].id.len(), COMMIT_ID_LEN);
    }

    #[test]
    fn content_ids_map_to_simulations() {
        assert!(matches!(
            Simulation::for_content(Some("git-commit")),
            Simulation::Commit(_)
        ));
        assert!(matches!(
            Simulation::for_content(Some("git-branch")),
            Simulation::Placeholder { title: "Branching Visualizer", .. }
        ));
        assert!(matches!(
            Simulation::for_content(Some("git-conflict")),
            Simulation::Placeholder { .. }
        ));
        assert!(matches!(
            Simulation::for_content(Some("rebase")),
            Simulation::Missing(id) if id == "rebase"
        ));
    }
}
