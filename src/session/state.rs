//! Per-user navigation state
//!
//! `Session` is a plain value: the controller takes one, applies an event and
//! hands a new one back. It never holds the warehouse connection, so it can be
//! serialized and inspected freely.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ManualPrefill;
use crate::error::{Result, VoiceQueryError};

/// Where the user is in the database → schema → table walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavState {
    LoggedOut,
    NoSelection,
    DatabaseSelected,
    SchemaSelected,
    TableSelected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub is_logged_in: bool,
    pub account: Option<String>,
    pub selected_database: Option<String>,
    pub selected_schema: Option<String>,
    pub selected_table: Option<String>,
    pub last_transcript: String,
    /// Last statement that executed successfully
    pub last_generated_sql: Option<String>,
    /// Last statement sent to the executor, successful or not
    pub last_attempted_sql: Option<String>,
    pub last_execution_failed: bool,
    pub manual_execution_enabled: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            is_logged_in: false,
            account: None,
            selected_database: None,
            selected_schema: None,
            selected_table: None,
            last_transcript: String::new(),
            last_generated_sql: None,
            last_attempted_sql: None,
            last_execution_failed: false,
            manual_execution_enabled: false,
        }
    }

    pub fn nav_state(&self) -> NavState {
        if !self.is_logged_in {
            NavState::LoggedOut
        } else if self.selected_table.is_some() {
            NavState::TableSelected
        } else if self.selected_schema.is_some() {
            NavState::SchemaSelected
        } else if self.selected_database.is_some() {
            NavState::DatabaseSelected
        } else {
            NavState::NoSelection
        }
    }

    pub fn log_in(&mut self, account: impl Into<String>) {
        self.is_logged_in = true;
        self.account = Some(account.into());
    }

    /// Back to a fresh, logged-out session keeping the same id
    pub fn log_out(&mut self) {
        let id = self.id;
        *self = Self::new();
        self.id = id;
    }

    /// Clear every selection, the transcript and the failure flag
    pub fn refresh(&mut self) {
        self.selected_database = None;
        self.selected_schema = None;
        self.selected_table = None;
        self.invalidate();
    }

    /// Returns whether the selection actually changed
    pub fn select_database(&mut self, database: impl Into<String>) -> Result<bool> {
        self.require_logged_in()?;
        let database = database.into();
        if self.selected_database.as_deref() == Some(database.as_str()) {
            return Ok(false);
        }

        self.selected_database = Some(database);
        self.selected_schema = None;
        self.selected_table = None;
        self.invalidate();
        Ok(true)
    }

    pub fn select_schema(&mut self, schema: impl Into<String>) -> Result<bool> {
        self.require_logged_in()?;
        if self.selected_database.is_none() {
            return Err(VoiceQueryError::InvalidState(
                "Select a database before choosing a schema".to_string(),
            ));
        }

        let schema = schema.into();
        if self.selected_schema.as_deref() == Some(schema.as_str()) {
            return Ok(false);
        }

        self.selected_schema = Some(schema);
        self.selected_table = None;
        self.invalidate();
        Ok(true)
    }

    pub fn select_table(&mut self, table: impl Into<String>) -> Result<bool> {
        self.require_logged_in()?;
        if self.selected_schema.is_none() {
            return Err(VoiceQueryError::InvalidState(
                "Select a schema before choosing a table".to_string(),
            ));
        }

        let table = table.into();
        if self.selected_table.as_deref() == Some(table.as_str()) {
            return Ok(false);
        }

        self.selected_table = Some(table);
        self.invalidate();
        Ok(true)
    }

    /// Statement to pre-fill the manual editor with
    pub fn manual_prefill(&self, policy: ManualPrefill) -> Option<String> {
        match policy {
            ManualPrefill::LastGenerated => self.last_generated_sql.clone(),
            ManualPrefill::OnFailure if self.last_execution_failed => {
                self.last_attempted_sql.clone()
            }
            ManualPrefill::OnFailure | ManualPrefill::Never => None,
        }
    }

    pub fn require_logged_in(&self) -> Result<()> {
        if self.is_logged_in {
            Ok(())
        } else {
            Err(VoiceQueryError::InvalidState("Log in first".to_string()))
        }
    }

    /// The table question box is available once a schema is chosen
    pub fn require_schema(&self) -> Result<()> {
        self.require_logged_in()?;
        if self.selected_schema.is_none() {
            return Err(VoiceQueryError::InvalidState(
                "Select a database and schema before asking a question".to_string(),
            ));
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.last_transcript.clear();
        self.last_execution_failed = false;
    }
}
