//! Inputs to and outputs from the controller

use crate::error::ErrorKind;
use crate::warehouse::{Credentials, RowSet};

/// Something the user did
#[derive(Debug, Clone)]
pub enum Event {
    Login(Credentials),
    Logout,
    /// Clear selections, transcript and failure flag
    Refresh,
    SelectDatabase(String),
    SelectSchema(String),
    SelectTable(String),
    /// A capture finished; `None` when nothing was recorded
    Transcript(Option<String>),
    /// The "Execute" toggle gating the manual editor
    SetManualExecution(bool),
    ExecuteManual(String),
}

impl Event {
    /// Short name for logs, never includes credentials
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login(_) => "login",
            Self::Logout => "logout",
            Self::Refresh => "refresh",
            Self::SelectDatabase(_) => "select_database",
            Self::SelectSchema(_) => "select_schema",
            Self::SelectTable(_) => "select_table",
            Self::Transcript(_) => "transcript",
            Self::SetManualExecution(_) => "set_manual_execution",
            Self::ExecuteManual(_) => "execute_manual",
        }
    }
}

/// Something the UI should show
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    ShowLogin,
    /// Logged in to this account
    LoggedIn(String),
    Databases(Vec<String>),
    Schemas(Vec<String>),
    Tables(Vec<String>),
    Columns(Vec<String>),
    /// Drop any transcript, SQL and result currently on screen
    ClearResults,
    Transcript(String),
    ExtractedSql(String),
    Table(RowSet),
    Success(String),
    /// Informational, not an error banner
    Notice(String),
    ManualEditor {
        visible: bool,
        prefill: Option<String>,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl RenderCommand {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}
