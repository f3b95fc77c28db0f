//! Colors and styles

use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    pub const FG: Color = Color::White;
    pub const DIM: Color = Color::DarkGray;
    pub const BORDER: Color = Color::Rgb(80, 80, 80);
    pub const BORDER_FOCUSED: Color = Color::Rgb(100, 149, 237); // Cornflower blue
    pub const SELECTED_BG: Color = Color::Rgb(30, 58, 138); // Blue-900
    pub const HIGHLIGHT: Color = Color::Rgb(251, 191, 36); // Amber-400
    pub const FAVORITE: Color = Color::Rgb(250, 204, 21); // Yellow-400
    pub const ERROR: Color = Color::Rgb(248, 113, 113); // Red-400
    pub const SUCCESS: Color = Color::Rgb(74, 222, 128); // Green-400
    pub const LINK: Color = Color::Rgb(96, 165, 250); // Blue-400

    pub fn text() -> Style {
        Style::default().fg(Self::FG)
    }

    pub fn dim() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn border(focused: bool) -> Style {
        if focused {
            Style::default().fg(Self::BORDER_FOCUSED)
        } else {
            Style::default().fg(Self::BORDER)
        }
    }

    /// Matched part of a title
    pub fn highlight() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected() -> Style {
        Style::default().bg(Self::SELECTED_BG)
    }

    pub fn favorite(active: bool) -> Style {
        if active {
            Style::default().fg(Self::FAVORITE)
        } else {
            Self::dim()
        }
    }

    pub fn link() -> Style {
        Style::default()
            .fg(Self::LINK)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn error() -> Style {
        Style::default()
            .fg(Self::ERROR)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::BORDER_FOCUSED)
            .add_modifier(Modifier::BOLD)
    }

    pub fn keybind_key() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }
}
