//! Colors and styles for the TUI

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,

    pub primary: Color,
    pub accent: Color,

    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    pub border: Color,
    pub border_focused: Color,
    pub selection: Color,

    /// Generated and hand-written SQL
    pub sql: Color,
    pub table_header: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(22, 22, 30),
            foreground: Color::Rgb(230, 230, 240),
            muted: Color::Rgb(120, 120, 140),

            primary: Color::Rgb(130, 170, 255),
            accent: Color::Rgb(255, 180, 100),

            success: Color::Rgb(130, 255, 170),
            warning: Color::Rgb(255, 220, 100),
            error: Color::Rgb(255, 130, 130),
            info: Color::Rgb(100, 200, 255),

            border: Color::Rgb(60, 60, 80),
            border_focused: Color::Rgb(130, 170, 255),
            selection: Color::Rgb(50, 60, 90),

            sql: Color::Rgb(180, 255, 200),
            table_header: Color::Rgb(255, 200, 140),
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default().bg(self.background).fg(self.foreground)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn primary_style(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn info_style(&self) -> Style {
        Style::default().fg(self.info)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    pub fn selection_style(&self) -> Style {
        Style::default().bg(self.selection)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn sql_style(&self) -> Style {
        Style::default().fg(self.sql)
    }

    pub fn table_header_style(&self) -> Style {
        Style::default()
            .fg(self.table_header)
            .add_modifier(Modifier::BOLD)
    }

    pub fn shortcut_key_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn shortcut_desc_style(&self) -> Style {
        Style::default().fg(self.muted)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

pub struct Icons;

impl Icons {
    pub const ERROR: &'static str = "✗";

    pub const POINTER: &'static str = "›";
    pub const CHOSEN: &'static str = "◆";
    pub const LOCK: &'static str = "🔒";
    pub const MIC: &'static str = "🎙";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_styles() {
        let theme = Theme::dark();
        let style = theme.base_style();
        assert!(style.bg.is_some());
        assert!(style.fg.is_some());
        assert_ne!(theme.border_style(true), theme.border_style(false));
    }

    #[test]
    fn test_default_is_dark() {
        let theme = Theme::default();
        assert_eq!(theme, Theme::dark());
        assert_ne!(theme.error, theme.success);
        assert_ne!(theme.border, theme.border_focused);
    }
}
