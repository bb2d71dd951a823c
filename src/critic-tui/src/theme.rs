//! Color palettes for the two accent themes.

use critic_common::ThemeName;
use ratatui::style::{Color, Modifier, Style};

// Shared base colors
const VOID: Color = Color::Rgb(2, 6, 23); // #020617
const SURFACE: Color = Color::Rgb(17, 24, 39); // #111827
const SURFACE_ALT: Color = Color::Rgb(31, 41, 55); // #1F2937
const TEXT: Color = Color::Rgb(243, 244, 246); // #F3F4F6
const TEXT_DIM: Color = Color::Rgb(156, 163, 175); // #9CA3AF
const TEXT_MUTED: Color = Color::Rgb(107, 114, 128); // #6B7280
const SUCCESS: Color = Color::Rgb(74, 222, 128); // #4ADE80
const ERROR: Color = Color::Rgb(248, 113, 113); // #F87171

/// Resolved colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub accent_dim: Color,
    pub background: Color,
    pub surface: Color,
    pub surface_alt: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_muted: Color,
    pub success: Color,
    pub error: Color,
}

impl Palette {
    pub fn for_theme(theme: ThemeName) -> Self {
        let (accent, accent_dim) = match theme {
            // #67E8F9 / #0891B2
            ThemeName::Cyan => (Color::Rgb(103, 232, 249), Color::Rgb(8, 145, 178)),
            // #D8B4FE / #9333EA
            ThemeName::Purple => (Color::Rgb(216, 180, 254), Color::Rgb(147, 51, 234)),
        };
        Self {
            accent,
            accent_dim,
            background: VOID,
            surface: SURFACE,
            surface_alt: SURFACE_ALT,
            text: TEXT,
            text_dim: TEXT_DIM,
            text_muted: TEXT_MUTED,
            success: SUCCESS,
            error: ERROR,
        }
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.accent_dim)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.text_dim)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.background)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}
