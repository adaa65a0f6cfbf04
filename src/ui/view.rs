//! What the screen shows, built up from render commands
//!
//! Kept apart from the terminal so the command → view mapping can be tested
//! without a TTY.

use crate::error::ErrorKind;
use crate::session::RenderCommand;
use crate::warehouse::RowSet;

/// A scrollable list with a cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Picker {
    pub items: Vec<String>,
    pub cursor: usize,
}

impl Picker {
    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.cursor = 0;
    }

    pub fn clear(&mut self) {
        self.set_items(Vec::new());
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.items.get(self.cursor).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Banner {
    Success(String),
    Notice(String),
    Error { kind: ErrorKind, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub show_login: bool,
    pub logged_in_as: Option<String>,
    pub databases: Picker,
    pub schemas: Picker,
    pub tables: Picker,
    pub columns: Vec<String>,
    pub transcript: Option<String>,
    pub extracted_sql: Option<String>,
    pub results: Option<RowSet>,
    pub banner: Option<Banner>,
    pub editor_visible: bool,
    pub editor: String,
    last_prefill: Option<String>,
}

impl ViewState {
    pub fn login() -> Self {
        Self {
            show_login: true,
            ..Self::default()
        }
    }

    pub fn apply_all(&mut self, commands: impl IntoIterator<Item = RenderCommand>) {
        for command in commands {
            self.apply(command);
        }
    }

    pub fn apply(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::ShowLogin => *self = Self::login(),
            RenderCommand::LoggedIn(account) => {
                self.show_login = false;
                self.logged_in_as = Some(account);
            }
            RenderCommand::Databases(items) => self.databases.set_items(items),
            RenderCommand::Schemas(items) => self.schemas.set_items(items),
            RenderCommand::Tables(items) => self.tables.set_items(items),
            RenderCommand::Columns(columns) => self.columns = columns,
            RenderCommand::ClearResults => {
                self.transcript = None;
                self.extracted_sql = None;
                self.results = None;
            }
            RenderCommand::Transcript(text) => {
                self.transcript = Some(text);
                self.extracted_sql = None;
                self.results = None;
            }
            RenderCommand::ExtractedSql(sql) => self.extracted_sql = Some(sql),
            RenderCommand::Table(rows) => self.results = Some(rows),
            RenderCommand::Success(message) => self.banner = Some(Banner::Success(message)),
            RenderCommand::Notice(message) => self.banner = Some(Banner::Notice(message)),
            RenderCommand::Error { kind, message } => {
                self.banner = Some(Banner::Error { kind, message })
            }
            RenderCommand::ManualEditor { visible, prefill } => {
                self.editor_visible = visible;
                // User edits survive until a different statement is offered
                if prefill.is_some() && prefill != self.last_prefill {
                    self.editor = prefill.clone().unwrap_or_default();
                    self.last_prefill = prefill;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_picker_cursor_stays_in_bounds() {
        let mut picker = Picker::default();
        picker.move_down();
        assert_eq!(picker.current(), None);

        picker.set_items(vec!["A".to_string(), "B".to_string()]);
        picker.move_up();
        assert_eq!(picker.current(), Some("A"));
        picker.move_down();
        picker.move_down();
        assert_eq!(picker.current(), Some("B"));
    }

    #[test]
    fn test_login_then_databases() {
        let mut view = ViewState::login();
        view.apply_all([
            RenderCommand::LoggedIn("xy12345".to_string()),
            RenderCommand::Databases(vec!["SALES_DB".to_string()]),
        ]);
        assert!(!view.show_login);
        assert_eq!(view.logged_in_as.as_deref(), Some("xy12345"));
        assert_eq!(view.databases.current(), Some("SALES_DB"));
    }

    #[test]
    fn test_new_transcript_replaces_previous_answer() {
        let mut view = ViewState::default();
        view.apply_all([
            RenderCommand::Transcript("first".to_string()),
            RenderCommand::ExtractedSql("SELECT 1".to_string()),
            RenderCommand::Table(RowSet::new(vec!["1".to_string()], vec![vec![json!("1")]])),
            RenderCommand::Transcript("second".to_string()),
        ]);
        assert_eq!(view.transcript.as_deref(), Some("second"));
        assert!(view.extracted_sql.is_none());
        assert!(view.results.is_none());
    }

    #[test]
    fn test_error_after_show_login_keeps_banner() {
        let mut view = ViewState::default();
        view.logged_in_as = Some("acct".to_string());
        view.apply_all([
            RenderCommand::ShowLogin,
            RenderCommand::Error {
                kind: ErrorKind::ConnectionFailed,
                message: "bad password".to_string(),
            },
        ]);
        assert!(view.show_login);
        assert!(view.logged_in_as.is_none());
        assert!(matches!(
            view.banner,
            Some(Banner::Error { kind: ErrorKind::ConnectionFailed, .. })
        ));
    }

    #[test]
    fn test_manual_editor_keeps_user_edits() {
        let mut view = ViewState::default();
        view.apply(RenderCommand::ManualEditor {
            visible: true,
            prefill: Some("SELECT 1".to_string()),
        });
        assert_eq!(view.editor, "SELECT 1");

        view.editor = "SELECT 2".to_string();
        view.apply(RenderCommand::ManualEditor {
            visible: true,
            prefill: Some("SELECT 1".to_string()),
        });
        assert_eq!(view.editor, "SELECT 2");

        view.apply(RenderCommand::ManualEditor {
            visible: true,
            prefill: Some("SELECT 3".to_string()),
        });
        assert_eq!(view.editor, "SELECT 3");

        view.apply(RenderCommand::ManualEditor {
            visible: false,
            prefill: None,
        });
        assert!(!view.editor_visible);
    }
}
