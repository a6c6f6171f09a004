use clap::ValueEnum;
use eframe::egui::Color32;

use crate::knowledge::UniverseId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ThemeMode {
    Day,
    #[default]
    Night,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Day => Self::Night,
            Self::Night => Self::Day,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Night => "Night",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub mode: ThemeMode,
    pub background: Color32,
    pub fog: Color32,
    pub ambient: f32,
    pub primary: Color32,
    pub secondary: Color32,
    pub glow: Color32,
    pub star_count: usize,
}

struct UniverseAccent {
    color: Color32,
    glow: Color32,
    stars: usize,
}

fn accent(universe: UniverseId) -> UniverseAccent {
    match universe {
        UniverseId::Lobby => UniverseAccent {
            color: Color32::WHITE,
            glow: Color32::WHITE,
            stars: 5000,
        },
        UniverseId::KnowledgeVerse => UniverseAccent {
            color: Color32::from_rgb(0x4A, 0x90, 0xE2),
            glow: Color32::from_rgb(0x00, 0xFF, 0xFF),
            stars: 8000,
        },
        UniverseId::ProfileVerse => UniverseAccent {
            color: Color32::from_rgb(0xFF, 0x69, 0xB4),
            glow: Color32::WHITE,
            stars: 3000,
        },
        UniverseId::DevVerse => UniverseAccent {
            color: Color32::from_rgb(0x00, 0xFF, 0x41),
            glow: Color32::from_rgb(0x00, 0xFF, 0x41),
            stars: 10000,
        },
    }
}

/// Portal color of a universe in the lobby, independent of day/night.
pub fn universe_color(universe: UniverseId) -> Color32 {
    accent(universe).color
}

impl Theme {
    /// Base palette for the mode, with the universe accent layered on top.
    pub fn resolve(mode: ThemeMode, universe: UniverseId) -> Self {
        let accent = accent(universe);
        let (background, ambient, secondary) = match mode {
            ThemeMode::Day => (
                Color32::from_rgb(0xEA, 0xF6, 0xFF),
                1.5,
                Color32::from_rgb(0x82, 0xC1, 0xFF),
            ),
            ThemeMode::Night => (
                Color32::from_rgb(0x05, 0x0B, 0x14),
                0.5,
                Color32::from_rgb(0x00, 0x33, 0x66),
            ),
        };

        Self {
            mode,
            background,
            fog: background,
            ambient,
            primary: accent.color,
            secondary,
            glow: accent.glow,
            star_count: accent.stars,
        }
    }

    pub fn shows_stars(&self) -> bool {
        self.mode == ThemeMode::Night
    }

    pub fn text(&self) -> Color32 {
        match self.mode {
            ThemeMode::Day => Color32::from_rgb(0x1B, 0x26, 0x36),
            ThemeMode::Night => Color32::from_gray(235),
        }
    }

    pub fn visuals(&self) -> eframe::egui::Visuals {
        match self.mode {
            ThemeMode::Day => eframe::egui::Visuals::light(),
            ThemeMode::Night => eframe::egui::Visuals::dark(),
        }
    }
}
