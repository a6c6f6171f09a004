use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Domain,
    Topic,
    Subtopic,
    Blog,
    Concept,
    Interactive,
    Project,
}

impl NodeType {
    pub fn base_size(self) -> f32 {
        match self {
            Self::Domain => 3.0,
            Self::Topic => 2.0,
            Self::Subtopic => 1.0,
            Self::Blog => 0.5,
            Self::Concept => 0.8,
            Self::Interactive => 1.2,
            Self::Project => 1.5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Topic => "topic",
            Self::Subtopic => "subtopic",
            Self::Blog => "blog",
            Self::Concept => "concept",
            Self::Interactive => "interactive",
            Self::Project => "project",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Video,
    Quiz,
    Simulation,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub difficulty: Option<f32>,
    #[serde(default)]
    pub progress: Option<f32>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub repo_link: Option<String>,
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub content_id: Option<String>,
    #[serde(default)]
    pub children: Vec<KnowledgeNode>,
}

impl KnowledgeNode {
    /// Whether selecting this node can open a lesson panel.
    pub fn is_interactive(&self) -> bool {
        matches!(self.kind, NodeType::Interactive | NodeType::Concept)
            || matches!(
                self.content_type,
                Some(ContentType::Quiz | ContentType::Simulation)
            )
    }

    /// Difficulty scales size linearly from 1.0 at level 1 to 1.5 at level 5.
    pub fn difficulty_modifier(&self) -> f32 {
        let difficulty = self.difficulty.unwrap_or(1.0).clamp(1.0, 5.0);
        1.0 + (difficulty - 1.0) * 0.125
    }
}
