//! Screen geometry and the single-line text input

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use super::theme::Theme;

/// Areas of the main (logged in) screen
#[derive(Debug, Clone, Copy)]
pub struct MainAreas {
    pub header: Rect,
    pub databases: Rect,
    pub schemas: Rect,
    pub tables: Rect,
    pub columns: Rect,
    pub question: Rect,
    pub answer: Rect,
    pub results: Rect,
    pub editor: Option<Rect>,
    pub status: Rect,
}

impl MainAreas {
    pub fn split(area: Rect, editor_visible: bool) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(1),
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
            .split(rows[1]);

        let sidebar = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ])
            .split(columns[0]);

        let mut constraints = vec![
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(5),
        ];
        if editor_visible {
            constraints.push(Constraint::Length(5));
        }
        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(columns[1]);

        Self {
            header: rows[0],
            databases: sidebar[0],
            schemas: sidebar[1],
            tables: sidebar[2],
            columns: sidebar[3],
            question: main[0],
            answer: main[1],
            results: main[2],
            editor: editor_visible.then(|| main[3]),
            status: rows[2],
        }
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Bordered one-line input
pub struct TextInput<'a> {
    title: &'a str,
    content: &'a str,
    placeholder: &'a str,
    focused: bool,
    masked: bool,
    theme: &'a Theme,
}

impl<'a> TextInput<'a> {
    pub fn new(title: &'a str, content: &'a str, theme: &'a Theme) -> Self {
        Self {
            title,
            content,
            placeholder: "",
            focused: false,
            masked: false,
            theme,
        }
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let display_text = if self.content.is_empty() {
            Span::styled(self.placeholder.to_string(), self.theme.muted_style())
        } else if self.masked {
            Span::styled(
                "*".repeat(self.content.chars().count()),
                self.theme.accent_style(),
            )
        } else {
            Span::styled(self.content.to_string(), self.theme.base_style())
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused))
            .border_type(if self.focused {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .title(Span::styled(
                format!(" {} ", self.title),
                if self.focused {
                    self.theme.primary_style()
                } else {
                    self.theme.muted_style()
                },
            ));

        let input = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            display_text,
            if self.focused {
                Span::styled("▎", self.theme.accent_style())
            } else {
                Span::raw("")
            },
        ]))
        .block(block);

        frame.render_widget(input, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(50, 50, area);

        assert!(centered.x > 0);
        assert!(centered.y > 0);
        assert!(centered.width < area.width);
        assert!(centered.height < area.height);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30), "30s");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(3661), "1h 1m");
    }

    #[test]
    fn test_editor_area_only_when_visible() {
        let area = Rect::new(0, 0, 120, 40);
        assert!(MainAreas::split(area, false).editor.is_none());

        let areas = MainAreas::split(area, true);
        let editor = areas.editor.unwrap();
        assert_eq!(editor.height, 5);
        assert!(editor.y > areas.results.y);
    }
}
