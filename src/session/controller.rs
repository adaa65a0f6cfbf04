//! Event handling: one event in, a new session and render commands out
//!
//! The controller owns the capabilities (warehouse connection, LLM client)
//! and the column list of the selected table. Every error is caught here and
//! turned into a [`RenderCommand::Error`]; the session stays navigable.

use crate::config::{AppConfig, ManualPrefill};
use crate::error::{Result, VoiceQueryError};
use crate::llm::LlmClient;
use crate::pipeline::{
    ExtractionResult, PromptBuilder, QueryExecutor, QueryOutcome, SchemaIntrospector, SqlExtractor,
};
use crate::warehouse::{Credentials, Warehouse, WarehouseConnector};

use super::events::{Event, RenderCommand};
use super::state::Session;

pub struct Controller {
    connector: Box<dyn WarehouseConnector>,
    warehouse: Option<Box<dyn Warehouse>>,
    llm: Box<dyn LlmClient>,
    prompt: PromptBuilder,
    extractor: SqlExtractor,
    manual_prefill: ManualPrefill,
    columns: Vec<String>,
}

impl Controller {
    pub fn new(
        config: &AppConfig,
        connector: Box<dyn WarehouseConnector>,
        llm: Box<dyn LlmClient>,
    ) -> Self {
        Self {
            connector,
            warehouse: None,
            llm,
            prompt: PromptBuilder::new(config.system_prompt.clone()),
            extractor: SqlExtractor::new(config.extraction),
            manual_prefill: config.manual_prefill,
            columns: Vec::new(),
        }
    }

    /// Columns of the selected table, empty when none is selected
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_connected(&self) -> bool {
        self.warehouse.is_some()
    }

    pub fn llm(&self) -> &dyn LlmClient {
        self.llm.as_ref()
    }

    pub async fn handle(&mut self, event: Event, session: Session) -> (Session, Vec<RenderCommand>) {
        let mut session = session;
        let mut out = Vec::new();
        let name = event.name();

        tracing::debug!(event = name, session = %session.id, "handling event");

        if let Err(e) = self.dispatch(event, &mut session, &mut out).await {
            tracing::warn!(event = name, error = %e, "event failed");
            out.push(error_command(&e));
        }

        (session, out)
    }

    async fn dispatch(
        &mut self,
        event: Event,
        session: &mut Session,
        out: &mut Vec<RenderCommand>,
    ) -> Result<()> {
        match event {
            Event::Login(credentials) => self.login(credentials, session, out).await,
            Event::Logout => {
                self.warehouse = None;
                self.columns.clear();
                session.log_out();
                out.push(RenderCommand::ShowLogin);
                Ok(())
            }
            Event::Refresh => {
                session.require_logged_in()?;
                session.refresh();
                self.columns.clear();
                out.push(RenderCommand::ClearResults);
                out.push(RenderCommand::Schemas(Vec::new()));
                out.push(RenderCommand::Tables(Vec::new()));
                out.push(RenderCommand::Columns(Vec::new()));
                let databases = self.introspector()?.list_databases().await?;
                out.push(RenderCommand::Databases(databases));
                out.push(self.manual_editor(session));
                Ok(())
            }
            Event::SelectDatabase(database) => {
                if session.select_database(database.as_str())? {
                    self.columns.clear();
                    out.push(RenderCommand::ClearResults);
                    out.push(RenderCommand::Tables(Vec::new()));
                    out.push(RenderCommand::Columns(Vec::new()));
                }
                let schemas = self.introspector()?.list_schemas(&database).await?;
                out.push(RenderCommand::Schemas(schemas));
                Ok(())
            }
            Event::SelectSchema(schema) => {
                if session.select_schema(schema.as_str())? {
                    self.columns.clear();
                    out.push(RenderCommand::ClearResults);
                    out.push(RenderCommand::Columns(Vec::new()));
                }
                let database = selected(&session.selected_database)?;
                let tables = self.introspector()?.list_tables(database, &schema).await?;
                out.push(RenderCommand::Tables(tables));
                Ok(())
            }
            Event::SelectTable(table) => {
                if session.select_table(table.as_str())? {
                    out.push(RenderCommand::ClearResults);
                }
                self.columns.clear();
                let database = selected(&session.selected_database)?;
                let schema = selected(&session.selected_schema)?;
                let columns = self
                    .introspector()?
                    .list_columns(database, schema, &table)
                    .await?;
                self.columns = columns;
                out.push(RenderCommand::Columns(self.columns.clone()));
                Ok(())
            }
            Event::Transcript(None) => Ok(()),
            Event::Transcript(Some(transcript)) => {
                let result = self.ask(transcript, session, out).await;
                out.push(self.manual_editor(session));
                result
            }
            Event::SetManualExecution(enabled) => {
                session.require_logged_in()?;
                session.manual_execution_enabled = enabled;
                out.push(self.manual_editor(session));
                Ok(())
            }
            Event::ExecuteManual(sql) => {
                session.require_logged_in()?;
                if !session.manual_execution_enabled {
                    return Err(VoiceQueryError::InvalidState(
                        "Enable manual execution first".to_string(),
                    ));
                }
                let result = self.execute(&sql, session, out).await;
                out.push(self.manual_editor(session));
                result
            }
        }
    }

    async fn login(
        &mut self,
        credentials: Credentials,
        session: &mut Session,
        out: &mut Vec<RenderCommand>,
    ) -> Result<()> {
        if session.is_logged_in {
            return Err(VoiceQueryError::InvalidState("Already logged in".to_string()));
        }
        if !credentials.is_complete() {
            out.push(RenderCommand::ShowLogin);
            return Err(VoiceQueryError::ConnectionFailed(
                "username, password and account are required".to_string(),
            ));
        }

        tracing::info!(account = %credentials.account, user = %credentials.user, "connecting to Snowflake");

        match self.connector.connect(&credentials).await {
            Ok(warehouse) => {
                self.warehouse = Some(warehouse);
                session.log_in(credentials.account.clone());
                out.push(RenderCommand::LoggedIn(credentials.account));
                let databases = self.introspector()?.list_databases().await?;
                out.push(RenderCommand::Databases(databases));
                Ok(())
            }
            Err(e) => {
                out.push(RenderCommand::ShowLogin);
                Err(VoiceQueryError::ConnectionFailed(e.to_string()))
            }
        }
    }

    /// Transcript → instruction → LLM → extraction → execution
    async fn ask(
        &mut self,
        transcript: String,
        session: &mut Session,
        out: &mut Vec<RenderCommand>,
    ) -> Result<()> {
        session.require_schema()?;

        let transcript = transcript.trim().to_string();
        if transcript.is_empty() {
            return Ok(());
        }

        session.last_transcript = transcript.clone();
        out.push(RenderCommand::Success("Audio transcription completed.".to_string()));
        out.push(RenderCommand::Transcript(transcript.clone()));

        let instruction = self.prompt.instruction(&self.columns, &transcript);
        tracing::info!(
            model = self.llm.model_name(),
            provider = %self.llm.provider(),
            columns = self.columns.len(),
            "requesting SQL from model"
        );

        let response = self
            .llm
            .complete(&instruction.system, &instruction.user)
            .await?;
        tracing::debug!(reply = %response.content, "model reply");

        let sql = match self.extractor.extract(&response.content) {
            ExtractionResult {
                found: true,
                sql: Some(sql),
            } => sql,
            _ => {
                tracing::info!("no SQL marker in model reply");
                out.push(RenderCommand::Notice(
                    VoiceQueryError::ExtractionNotFound.to_string(),
                ));
                return Ok(());
            }
        };

        out.push(RenderCommand::ExtractedSql(sql.clone()));
        self.execute(&sql, session, out).await
    }

    async fn execute(
        &self,
        sql: &str,
        session: &mut Session,
        out: &mut Vec<RenderCommand>,
    ) -> Result<()> {
        let warehouse = self.connection()?;
        match QueryExecutor::run(warehouse, sql, session).await? {
            QueryOutcome::Rows(rows) => out.push(RenderCommand::Table(rows)),
            QueryOutcome::NoRows => {
                out.push(RenderCommand::Success("SQL query executed successfully.".to_string()))
            }
        }
        Ok(())
    }

    fn manual_editor(&self, session: &Session) -> RenderCommand {
        RenderCommand::ManualEditor {
            visible: session.manual_execution_enabled,
            prefill: session.manual_prefill(self.manual_prefill),
        }
    }

    fn connection(&self) -> Result<&dyn Warehouse> {
        self.warehouse
            .as_deref()
            .ok_or_else(|| VoiceQueryError::InvalidState("Not connected to Snowflake".to_string()))
    }

    fn introspector(&self) -> Result<SchemaIntrospector<'_>> {
        Ok(SchemaIntrospector::new(self.connection()?))
    }
}

fn selected(value: &Option<String>) -> Result<&str> {
    value
        .as_deref()
        .ok_or_else(|| VoiceQueryError::InvalidState("Selection missing".to_string()))
}

fn error_command(error: &VoiceQueryError) -> RenderCommand {
    RenderCommand::Error {
        kind: error.kind(),
        message: error.to_string(),
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("connected", &self.is_connected())
            .field("model", &self.llm.model_name())
            .field("extraction", &self.extractor.strategy())
            .field("columns", &self.columns)
            .finish()
    }
}
