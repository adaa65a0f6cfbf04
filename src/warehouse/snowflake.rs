//! Snowflake implementation of the warehouse capability

use async_trait::async_trait;
use snowflake_connector_rs::{
    SnowflakeAuthMethod, SnowflakeClient, SnowflakeClientConfig, SnowflakeRow, SnowflakeSession,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::{Credentials, RowSet, Warehouse, WarehouseConnector, WarehouseError};
use crate::config::WarehouseConfig;

/// Logs in with user/password against an account
#[derive(Debug, Clone, Default)]
pub struct SnowflakeConnector {
    config: WarehouseConfig,
}

impl SnowflakeConnector {
    pub fn new(config: WarehouseConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl WarehouseConnector for SnowflakeConnector {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn Warehouse>, WarehouseError> {
        let warehouse = SnowflakeWarehouse::connect(credentials, &self.config).await?;
        Ok(Box::new(warehouse))
    }
}

/// One logged-in Snowflake session
pub struct SnowflakeWarehouse {
    session: Arc<SnowflakeSession>,
    account: String,
}

impl fmt::Debug for SnowflakeWarehouse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeWarehouse")
            .field("account", &self.account)
            .finish()
    }
}

impl SnowflakeWarehouse {
    pub async fn connect(
        credentials: &Credentials,
        config: &WarehouseConfig,
    ) -> Result<Self, WarehouseError> {
        let client = SnowflakeClient::new(
            &credentials.user,
            SnowflakeAuthMethod::Password(credentials.password.clone()),
            SnowflakeClientConfig {
                account: credentials.account.clone(),
                role: config.role.clone(),
                warehouse: config.warehouse.clone(),
                database: None,
                schema: None,
                timeout: Some(Duration::from_secs(config.timeout_secs)),
            },
        )
        .map_err(|e| WarehouseError::new(e.to_string()))?;

        let session = client
            .create_session()
            .await
            .map_err(|e| WarehouseError::new(e.to_string()))?;

        Ok(Self {
            session: Arc::new(session),
            account: credentials.account.clone(),
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}

#[async_trait]
impl Warehouse for SnowflakeWarehouse {
    async fn execute(&self, sql: &str) -> Result<RowSet, WarehouseError> {
        let results = self
            .session
            .query(sql)
            .await
            .map_err(|e| WarehouseError::new(e.to_string()))?;

        Ok(rows_to_row_set(results))
    }
}

fn rows_to_row_set(results: Vec<SnowflakeRow>) -> RowSet {
    let columns: Vec<String> = results.first().map_or(vec![], |first_row| {
        first_row
            .column_types()
            .into_iter()
            .map(|col| col.name().to_string())
            .collect()
    });

    let rows = results
        .into_iter()
        .map(|row| {
            columns
                .iter()
                .map(|name| match row.get::<String>(name) {
                    Ok(s) => serde_json::Value::String(s),
                    Err(_) => serde_json::Value::Null,
                })
                .collect()
        })
        .collect();

    RowSet { columns, rows }
}
