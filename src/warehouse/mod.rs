//! Warehouse client capability
//!
//! `Warehouse::execute` is the only call the pipeline makes against the
//! database. The Snowflake implementation lives in [`snowflake`]; tests
//! plug in their own.

pub mod snowflake;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use snowflake::{SnowflakeConnector, SnowflakeWarehouse};

/// Driver failure, carrying the driver's own message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct WarehouseError(pub String);

impl WarehouseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Login details collected from the user
#[derive(Clone, Default)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub account: String,
}

impl Credentials {
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            account: account.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.user.trim().is_empty()
            && !self.password.is_empty()
            && !self.account.trim().is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

/// Ordered rows plus their column names
///
/// The Snowflake driver only exposes column metadata through returned rows, so
/// a query that matches nothing comes back with `columns` empty as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<serde_json::Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// "0 rows", "1 row", "12 rows"
    pub fn row_count_label(&self) -> String {
        match self.rows.len() {
            1 => "1 row".to_string(),
            n => format!("{} rows", n),
        }
    }

    /// Values of one column, by case-insensitive name
    pub fn column_values(&self, name: &str) -> Vec<&serde_json::Value> {
        match self
            .columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
        {
            Some(idx) => self.rows.iter().filter_map(|row| row.get(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// String cells of one column, skipping nulls and non-strings
    pub fn column_strings(&self, name: &str) -> Vec<String> {
        self.column_values(name)
            .into_iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    }
}

/// An open warehouse connection
#[async_trait]
pub trait Warehouse: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<RowSet, WarehouseError>;
}

/// Opens connections from credentials
#[async_trait]
pub trait WarehouseConnector: Send + Sync {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn Warehouse>, WarehouseError>;
}

/// Render a cell for display
pub fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_count_label() {
        assert_eq!(RowSet::default().row_count_label(), "0 rows");
        let one = RowSet::new(vec!["ID".to_string()], vec![vec![json!(1)]]);
        assert_eq!(one.row_count_label(), "1 row");
        let two = RowSet::new(vec!["ID".to_string()], vec![vec![json!(1)], vec![json!(2)]]);
        assert_eq!(two.row_count_label(), "2 rows");
    }

    #[test]
    fn test_column_strings_case_insensitive() {
        let rows = RowSet::new(
            vec!["created_on".to_string(), "name".to_string()],
            vec![
                vec![json!("2024-01-01"), json!("SALES_DB")],
                vec![json!("2024-01-02"), json!(null)],
                vec![json!("2024-01-03"), json!("HR_DB")],
            ],
        );
        assert_eq!(rows.column_strings("NAME"), vec!["SALES_DB", "HR_DB"]);
        assert!(rows.column_strings("missing").is_empty());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("alice", "hunter2", "xy12345");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));
        assert!(creds.is_complete());
        assert!(!Credentials::new("alice", "", "xy12345").is_complete());
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&json!(null)), "NULL");
        assert_eq!(cell_to_string(&json!("abc")), "abc");
        assert_eq!(cell_to_string(&json!(42)), "42");
    }
}
