use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

/// Configured theme selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
    /// Follows the platform preference; terminals resolve to dark
    System,
}

impl ThemeKind {
    pub fn resolve(self) -> Theme {
        match self {
            Self::Dark | Self::System => Theme::dark(),
            Self::Light => Theme::light(),
        }
    }
}

/// Color theme for the panel
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub fg_dim: Color,
    pub primary: Color,
    pub highlight: Color,
    pub error: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            fg_dim: Color::DarkGray,
            primary: Color::Cyan,
            highlight: Color::Yellow,
            error: Color::Red,
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            fg_dim: Color::Gray,
            primary: Color::Blue,
            highlight: Color::Magenta,
            error: Color::Red,
        }
    }

    // Border styles
    pub fn border(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.primary)
    }

    // Text styles
    pub fn title(&self) -> Style {
        Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn text_dim(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    pub fn text_highlight(&self) -> Style {
        Style::default().fg(self.highlight).add_modifier(Modifier::BOLD)
    }

    // Status bar
    pub fn status_bar(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(Color::DarkGray)
    }

    pub fn status_bar_key(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    // Search hit inside a log line
    pub fn search_hit(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }
}
