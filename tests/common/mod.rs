//! In-memory warehouse and LLM doubles shared by the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use voicequery::config::{AppConfig, LlmProvider};
use voicequery::llm::{LlmClient, LlmError, LlmResponse};
use voicequery::session::Controller;
use voicequery::warehouse::{Credentials, RowSet, Warehouse, WarehouseConnector, WarehouseError};

type Rule = (String, Result<RowSet, WarehouseError>);

/// Answers statements by prefix match; unmatched statements succeed with no rows
#[derive(Clone, Default)]
pub struct FakeWarehouse {
    rules: Arc<Mutex<Vec<Rule>>>,
    executed: Arc<Mutex<Vec<String>>>,
}

impl FakeWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sample account: SALES_DB.PUBLIC.ORDERS with columns ID, SALES
    pub fn sample() -> Self {
        let warehouse = Self::new();
        warehouse.respond("SHOW DATABASES", names(&["SALES_DB", "HR_DB"]));
        warehouse.respond("SHOW SCHEMAS", names(&["INFORMATION_SCHEMA", "PUBLIC"]));
        warehouse.respond("SHOW TABLES", names(&["ORDERS", "CUSTOMERS"]));
        warehouse.respond("DESCRIBE TABLE", names(&["ID", "SALES"]));
        warehouse.respond(
            "SELECT SUM(SALES)",
            RowSet::new(vec!["SUM(SALES)".to_string()], vec![vec![json!("1234.50")]]),
        );
        warehouse
    }

    pub fn respond(&self, prefix: &str, rows: RowSet) {
        self.push_rule(prefix, Ok(rows));
    }

    pub fn fail(&self, prefix: &str, message: &str) {
        self.push_rule(prefix, Err(WarehouseError::new(message)));
    }

    fn push_rule(&self, prefix: &str, result: Result<RowSet, WarehouseError>) {
        // Later rules win
        self.rules
            .lock()
            .unwrap()
            .insert(0, (prefix.to_uppercase(), result));
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    /// Statements that were not metadata lookups
    pub fn user_statements(&self) -> Vec<String> {
        self.executed()
            .into_iter()
            .filter(|sql| {
                let upper = sql.to_uppercase();
                !["SHOW ", "USE ", "DESCRIBE "]
                    .iter()
                    .any(|prefix| upper.starts_with(prefix))
            })
            .collect()
    }
}

#[async_trait]
impl Warehouse for FakeWarehouse {
    async fn execute(&self, sql: &str) -> Result<RowSet, WarehouseError> {
        self.executed.lock().unwrap().push(sql.to_string());

        let upper = sql.trim().to_uppercase();
        let rules = self.rules.lock().unwrap();
        rules
            .iter()
            .find(|(prefix, _)| upper.starts_with(prefix.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| Ok(RowSet::default()))
    }
}

/// Hands out clones of one warehouse, or refuses to connect
#[derive(Clone, Default)]
pub struct FakeConnector {
    warehouse: FakeWarehouse,
    refuse: Option<String>,
}

impl FakeConnector {
    pub fn new(warehouse: FakeWarehouse) -> Self {
        Self {
            warehouse,
            refuse: None,
        }
    }

    pub fn refusing(message: &str) -> Self {
        Self {
            warehouse: FakeWarehouse::new(),
            refuse: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl WarehouseConnector for FakeConnector {
    async fn connect(&self, _credentials: &Credentials) -> Result<Box<dyn Warehouse>, WarehouseError> {
        match &self.refuse {
            Some(message) => Err(WarehouseError::new(message.clone())),
            None => Ok(Box::new(self.warehouse.clone())),
        }
    }
}

/// Replays canned replies and records every prompt it was given
#[derive(Clone, Default)]
pub struct StubLlm {
    replies: Arc<Mutex<Vec<Result<String, String>>>>,
    prompts: Arc<Mutex<Vec<(String, String)>>>,
}

impl StubLlm {
    pub fn replying(reply: &str) -> Self {
        let llm = Self::default();
        llm.push_reply(reply);
        llm
    }

    pub fn failing(message: &str) -> Self {
        let llm = Self::default();
        llm.replies.lock().unwrap().push(Err(message.to_string()));
        llm
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push(Ok(reply.to_string()));
    }

    /// (system, user) pairs in call order
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<LlmResponse, LlmError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.len() > 1 {
            replies.remove(0)
        } else {
            replies
                .first()
                .cloned()
                .unwrap_or_else(|| Ok("I cannot help with that.".to_string()))
        };

        match reply {
            Ok(content) => Ok(LlmResponse {
                content,
                model: "stub".to_string(),
                finish_reason: Some("stop".to_string()),
            }),
            Err(message) => Err(LlmError::ConnectionError(message)),
        }
    }

    fn model_name(&self) -> &str {
        "stub"
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::OpenAI
    }
}

pub fn names(values: &[&str]) -> RowSet {
    RowSet::new(
        vec!["created_on".to_string(), "name".to_string()],
        values
            .iter()
            .map(|name| vec![json!("2024-01-01 00:00:00"), json!(name)])
            .collect(),
    )
}

pub fn credentials() -> Credentials {
    Credentials::new("analyst", "secret", "xy12345")
}

pub fn controller(warehouse: &FakeWarehouse, llm: &StubLlm) -> Controller {
    controller_with(AppConfig::default(), warehouse, llm)
}

pub fn controller_with(config: AppConfig, warehouse: &FakeWarehouse, llm: &StubLlm) -> Controller {
    Controller::new(
        &config,
        Box::new(FakeConnector::new(warehouse.clone())),
        Box::new(llm.clone()),
    )
}
