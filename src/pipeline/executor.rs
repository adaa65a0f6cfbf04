//! Runs a statement and classifies the result

use crate::error::{Result, VoiceQueryError};
use crate::session::Session;
use crate::warehouse::{RowSet, Warehouse};

/// What a successful execution produced
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// A SELECT: rows and column names for rendering
    Rows(RowSet),
    /// Anything else (DDL, DML, USE ...)
    NoRows,
}

pub struct QueryExecutor;

impl QueryExecutor {
    /// Whether the statement's result should be rendered as a table
    pub fn is_select(sql: &str) -> bool {
        sql.trim().to_uppercase().starts_with("SELECT")
    }

    /// Execute `sql`, updating the session's last query and failure flag
    pub async fn run(
        warehouse: &dyn Warehouse,
        sql: &str,
        session: &mut Session,
    ) -> Result<QueryOutcome> {
        let statement = sql.trim().trim_end_matches(';').trim_end();
        session.last_attempted_sql = Some(statement.to_string());

        if statement.is_empty() {
            session.last_execution_failed = true;
            return Err(VoiceQueryError::ExecutionFailed(
                "empty SQL statement".to_string(),
            ));
        }

        tracing::info!(sql = %statement, "executing statement");

        match warehouse.execute(statement).await {
            Ok(rows) => {
                session.last_generated_sql = Some(statement.to_string());
                session.last_execution_failed = false;

                if Self::is_select(statement) {
                    tracing::debug!(rows = rows.rows.len(), "statement returned rows");
                    Ok(QueryOutcome::Rows(rows))
                } else {
                    Ok(QueryOutcome::NoRows)
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "statement failed");
                session.last_execution_failed = true;
                Err(VoiceQueryError::ExecutionFailed(e.to_string()))
            }
        }
    }
}
