use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniverseId {
    Lobby,
    KnowledgeVerse,
    ProfileVerse,
    DevVerse,
}

impl UniverseId {
    pub const GRAPHS: [UniverseId; 3] = [Self::KnowledgeVerse, Self::ProfileVerse, Self::DevVerse];

    pub fn is_lobby(self) -> bool {
        self == Self::Lobby
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Lobby => "lobby",
            Self::KnowledgeVerse => "knowledgeverse",
            Self::ProfileVerse => "profileverse",
            Self::DevVerse => "devverse",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Lobby => "Lobby",
            Self::KnowledgeVerse => "KnowledgeVerse",
            Self::ProfileVerse => "ProfileVerse",
            Self::DevVerse => "DevVerse",
        }
    }

    pub fn overview_position(self) -> Vec3 {
        Vec3::new(0.0, 0.0, 100.0)
    }

    /// Where the universe's portal sphere floats in the lobby.
    pub fn lobby_anchor(self) -> Vec3 {
        match self {
            Self::Lobby => Vec3::ZERO,
            Self::KnowledgeVerse => Vec3::new(-20.0, 0.0, 0.0),
            Self::ProfileVerse => Vec3::new(20.0, 0.0, 0.0),
            Self::DevVerse => Vec3::new(0.0, -24.0, 0.0),
        }
    }
}
