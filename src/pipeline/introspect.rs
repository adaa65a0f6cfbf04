//! Database, schema, table and column discovery

use crate::error::{Result, VoiceQueryError};
use crate::warehouse::Warehouse;

/// Quote an identifier for Snowflake, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub struct SchemaIntrospector<'a> {
    warehouse: &'a dyn Warehouse,
}

impl<'a> SchemaIntrospector<'a> {
    pub fn new(warehouse: &'a dyn Warehouse) -> Self {
        Self { warehouse }
    }

    pub async fn list_databases(&self) -> Result<Vec<String>> {
        self.names("SHOW DATABASES").await
    }

    /// Switches the session to `database` first
    pub async fn list_schemas(&self, database: &str) -> Result<Vec<String>> {
        self.use_database(database).await?;
        self.names("SHOW SCHEMAS").await
    }

    pub async fn list_tables(&self, database: &str, schema: &str) -> Result<Vec<String>> {
        self.use_database(database).await?;
        self.use_schema(schema).await?;
        self.names("SHOW TABLES").await
    }

    /// Column names in table order, read from table metadata only
    pub async fn list_columns(
        &self,
        database: &str,
        schema: &str,
        table: &str,
    ) -> Result<Vec<String>> {
        self.use_database(database).await?;
        self.use_schema(schema).await?;
        self.names(&format!("DESCRIBE TABLE {}", quote_identifier(table)))
            .await
    }

    async fn use_database(&self, database: &str) -> Result<()> {
        self.run(&format!("USE DATABASE {}", quote_identifier(database)))
            .await
            .map(|_| ())
    }

    async fn use_schema(&self, schema: &str) -> Result<()> {
        self.run(&format!("USE SCHEMA {}", quote_identifier(schema)))
            .await
            .map(|_| ())
    }

    async fn names(&self, sql: &str) -> Result<Vec<String>> {
        Ok(self.run(sql).await?.column_strings("name"))
    }

    async fn run(&self, sql: &str) -> Result<crate::warehouse::RowSet> {
        tracing::debug!(sql, "metadata query");
        self.warehouse.execute(sql).await.map_err(|e| {
            tracing::warn!(sql, error = %e, "metadata query failed");
            VoiceQueryError::MetadataFetchFailed(e)
        })
    }
}
