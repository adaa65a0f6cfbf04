//! End-to-end controller tests against in-memory doubles
//!
//! Each test drives `Controller::handle` the way the UI does: one event, a
//! new session and a batch of render commands back.

mod common;

use common::{controller, controller_with, credentials, FakeConnector, FakeWarehouse, StubLlm};
use serde_json::json;
use voicequery::config::{AppConfig, ManualPrefill};
use voicequery::error::ErrorKind;
use voicequery::session::{Controller, Event, NavState, RenderCommand, Session};
use voicequery::speech::{ScriptedCapture, SpeechCapture};
use voicequery::warehouse::RowSet;

const SALES_REPLY: &str = "Here is the query:\nsql\nSELECT SUM(SALES) FROM T;";

async fn send(controller: &mut Controller, session: Session, event: Event) -> (Session, Vec<RenderCommand>) {
    println!("\n🧪 Event: {}", event.name());
    let (session, commands) = controller.handle(event, session).await;
    for command in &commands {
        println!("   → {:?}", command);
    }
    (session, commands)
}

/// Logged in with SALES_DB.PUBLIC.ORDERS selected
async fn at_orders(controller: &mut Controller) -> Session {
    let (session, _) = send(controller, Session::new(), Event::Login(credentials())).await;
    let (session, _) = send(controller, session, Event::SelectDatabase("SALES_DB".into())).await;
    let (session, _) = send(controller, session, Event::SelectSchema("PUBLIC".into())).await;
    let (session, commands) = send(controller, session, Event::SelectTable("ORDERS".into())).await;
    assert!(!commands.iter().any(RenderCommand::is_error));
    assert_eq!(session.nav_state(), NavState::TableSelected);
    session
}

fn errors(commands: &[RenderCommand]) -> Vec<ErrorKind> {
    commands
        .iter()
        .filter_map(|c| match c {
            RenderCommand::Error { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_login_lists_databases() {
    let warehouse = FakeWarehouse::sample();
    let mut controller = controller(&warehouse, &StubLlm::default());

    let (session, commands) = send(&mut controller, Session::new(), Event::Login(credentials())).await;

    assert!(session.is_logged_in);
    assert_eq!(session.account.as_deref(), Some("xy12345"));
    assert_eq!(session.nav_state(), NavState::NoSelection);
    assert!(commands.contains(&RenderCommand::LoggedIn("xy12345".to_string())));
    assert!(commands.contains(&RenderCommand::Databases(vec![
        "SALES_DB".to_string(),
        "HR_DB".to_string()
    ])));
    println!("✅ logged in");
}

#[tokio::test]
async fn test_login_failure_keeps_login_form() {
    let mut controller = Controller::new(
        &AppConfig::default(),
        Box::new(FakeConnector::refusing("Incorrect username or password was specified.")),
        Box::new(StubLlm::default()),
    );

    let (session, commands) = send(&mut controller, Session::new(), Event::Login(credentials())).await;

    assert!(!session.is_logged_in);
    assert!(!controller.is_connected());
    assert_eq!(commands.first(), Some(&RenderCommand::ShowLogin));
    assert_eq!(errors(&commands), vec![ErrorKind::ConnectionFailed]);
}

#[tokio::test]
async fn test_incomplete_credentials_never_connect() {
    let warehouse = FakeWarehouse::sample();
    let mut controller = controller(&warehouse, &StubLlm::default());

    let blank = voicequery::warehouse::Credentials::new("analyst", "", "xy12345");
    let (session, commands) = send(&mut controller, Session::new(), Event::Login(blank)).await;

    assert!(!session.is_logged_in);
    assert_eq!(errors(&commands), vec![ErrorKind::ConnectionFailed]);
    assert!(warehouse.executed().is_empty());
}

#[tokio::test]
async fn test_table_selection_loads_columns() {
    let warehouse = FakeWarehouse::sample();
    let mut controller = controller(&warehouse, &StubLlm::default());

    let _session = at_orders(&mut controller).await;

    assert_eq!(controller.columns(), ["ID".to_string(), "SALES".to_string()]);
    let executed = warehouse.executed();
    assert!(executed.contains(&"USE DATABASE \"SALES_DB\"".to_string()));
    assert!(executed.contains(&"USE SCHEMA \"PUBLIC\"".to_string()));
    assert!(executed.contains(&"DESCRIBE TABLE \"ORDERS\"".to_string()));
    // Column discovery never reads table data
    assert!(!executed.iter().any(|sql| sql.starts_with("SELECT *")));
}

#[tokio::test]
async fn test_spoken_question_runs_generated_sql() {
    let warehouse = FakeWarehouse::sample();
    let llm = StubLlm::replying(SALES_REPLY);
    let mut controller = controller(&warehouse, &llm);
    let session = at_orders(&mut controller).await;

    let mut capture = ScriptedCapture::new(["show total sales"]);
    let transcript = capture.record().await.unwrap();
    let (session, commands) = send(&mut controller, session, Event::Transcript(transcript)).await;

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].0, "You are a helpful SQL assistant.");
    assert_eq!(prompts[0].1, "ID, SALESshow total sales");

    assert!(commands.contains(&RenderCommand::Transcript("show total sales".to_string())));
    assert!(commands.contains(&RenderCommand::ExtractedSql(
        "SELECT SUM(SALES) FROM T".to_string()
    )));
    assert!(commands.contains(&RenderCommand::Table(RowSet::new(
        vec!["SUM(SALES)".to_string()],
        vec![vec![json!("1234.50")]],
    ))));

    assert_eq!(warehouse.user_statements(), vec!["SELECT SUM(SALES) FROM T"]);
    assert_eq!(session.last_transcript, "show total sales");
    assert_eq!(session.last_generated_sql.as_deref(), Some("SELECT SUM(SALES) FROM T"));
    assert!(!session.last_execution_failed);
    println!("✅ question answered");
}

#[tokio::test]
async fn test_reply_without_sql_never_executes() {
    let warehouse = FakeWarehouse::sample();
    let llm = StubLlm::replying("I'm not sure which table holds revenue, could you clarify?");
    let mut controller = controller(&warehouse, &llm);
    let session = at_orders(&mut controller).await;

    let (session, commands) = send(
        &mut controller,
        session,
        Event::Transcript(Some("how much did we make".to_string())),
    )
    .await;

    assert!(warehouse.user_statements().is_empty());
    assert!(errors(&commands).is_empty());
    assert!(commands.contains(&RenderCommand::Transcript("how much did we make".to_string())));
    assert!(!commands
        .iter()
        .any(|c| matches!(c, RenderCommand::ExtractedSql(_) | RenderCommand::Table(_))));
    assert!(commands.iter().any(|c| matches!(c, RenderCommand::Notice(_))));
    assert!(!session.last_execution_failed);
}

#[tokio::test]
async fn test_driver_error_sets_failure_flag() {
    let warehouse = FakeWarehouse::sample();
    warehouse.fail("SELECT SUM(SALES)", "SQL compilation error: Object 'T' does not exist");
    let llm = StubLlm::replying(SALES_REPLY);
    let mut controller = controller(&warehouse, &llm);
    let session = at_orders(&mut controller).await;

    let (session, commands) = send(
        &mut controller,
        session,
        Event::Transcript(Some("show total sales".to_string())),
    )
    .await;

    assert_eq!(errors(&commands), vec![ErrorKind::ExecutionFailed]);
    assert!(commands.iter().any(|c| matches!(
        c,
        RenderCommand::Error { message, .. } if message.contains("does not exist")
    )));
    assert!(session.last_execution_failed);
    assert!(session.is_logged_in);
    assert_eq!(session.nav_state(), NavState::TableSelected);
    assert_eq!(session.last_attempted_sql.as_deref(), Some("SELECT SUM(SALES) FROM T"));
    assert!(session.last_generated_sql.is_none());

    // Still navigable
    let (session, commands) = send(&mut controller, session, Event::SelectDatabase("HR_DB".into())).await;
    assert!(errors(&commands).is_empty());
    assert_eq!(session.selected_database.as_deref(), Some("HR_DB"));
    assert!(!session.last_execution_failed);
}

#[tokio::test]
async fn test_llm_failure_is_reported() {
    let warehouse = FakeWarehouse::sample();
    let llm = StubLlm::failing("connection reset by peer");
    let mut controller = controller(&warehouse, &llm);
    let session = at_orders(&mut controller).await;

    let (session, commands) = send(
        &mut controller,
        session,
        Event::Transcript(Some("show total sales".to_string())),
    )
    .await;

    assert_eq!(errors(&commands), vec![ErrorKind::LlmCallFailed]);
    assert!(warehouse.user_statements().is_empty());
    assert!(session.is_logged_in);
}

#[tokio::test]
async fn test_new_database_resets_downstream_selection() {
    let warehouse = FakeWarehouse::sample();
    let llm = StubLlm::replying(SALES_REPLY);
    let mut controller = controller(&warehouse, &llm);
    let session = at_orders(&mut controller).await;
    let (session, _) = send(
        &mut controller,
        session,
        Event::Transcript(Some("show total sales".to_string())),
    )
    .await;
    assert!(!session.last_transcript.is_empty());

    let (session, commands) = send(&mut controller, session, Event::SelectDatabase("HR_DB".into())).await;

    assert_eq!(session.selected_database.as_deref(), Some("HR_DB"));
    assert!(session.selected_schema.is_none());
    assert!(session.selected_table.is_none());
    assert!(session.last_transcript.is_empty());
    assert!(controller.columns().is_empty());
    assert!(commands.contains(&RenderCommand::ClearResults));
    assert!(commands.contains(&RenderCommand::Tables(Vec::new())));
    assert!(commands.iter().any(|c| matches!(c, RenderCommand::Schemas(s) if !s.is_empty())));
}

#[tokio::test]
async fn test_out_of_order_selection_leaves_session_unchanged() {
    let warehouse = FakeWarehouse::sample();
    let mut controller = controller(&warehouse, &StubLlm::default());
    let (session, _) = send(&mut controller, Session::new(), Event::Login(credentials())).await;
    let before = session.clone();

    let (session, commands) = send(&mut controller, session, Event::SelectSchema("PUBLIC".into())).await;

    assert_eq!(errors(&commands), vec![ErrorKind::InvalidState]);
    assert_eq!(session, before);
}

#[tokio::test]
async fn test_question_requires_schema() {
    let warehouse = FakeWarehouse::sample();
    let llm = StubLlm::replying(SALES_REPLY);
    let mut controller = controller(&warehouse, &llm);
    let (session, _) = send(&mut controller, Session::new(), Event::Login(credentials())).await;

    let (_, commands) = send(
        &mut controller,
        session,
        Event::Transcript(Some("show total sales".to_string())),
    )
    .await;

    assert_eq!(errors(&commands), vec![ErrorKind::InvalidState]);
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn test_empty_capture_does_nothing() {
    let warehouse = FakeWarehouse::sample();
    let llm = StubLlm::replying(SALES_REPLY);
    let mut controller = controller(&warehouse, &llm);
    let session = at_orders(&mut controller).await;

    let (session, commands) = send(&mut controller, session, Event::Transcript(None)).await;

    assert!(commands.is_empty());
    assert!(llm.prompts().is_empty());
    assert_eq!(session.nav_state(), NavState::TableSelected);
}

#[tokio::test]
async fn test_metadata_failure_is_reported() {
    let warehouse = FakeWarehouse::sample();
    warehouse.fail("SHOW SCHEMAS", "Insufficient privileges to operate on database");
    let mut controller = controller(&warehouse, &StubLlm::default());
    let (session, _) = send(&mut controller, Session::new(), Event::Login(credentials())).await;

    let (session, commands) = send(&mut controller, session, Event::SelectDatabase("SALES_DB".into())).await;

    assert_eq!(errors(&commands), vec![ErrorKind::MetadataFetchFailed]);
    assert!(!commands.iter().any(|c| matches!(c, RenderCommand::Schemas(s) if !s.is_empty())));
    assert!(session.is_logged_in);
}

#[tokio::test]
async fn test_refresh_clears_selection() {
    let warehouse = FakeWarehouse::sample();
    warehouse.fail("SELECT SUM(SALES)", "warehouse suspended");
    let llm = StubLlm::replying(SALES_REPLY);
    let mut controller = controller(&warehouse, &llm);
    let session = at_orders(&mut controller).await;
    let (session, _) = send(
        &mut controller,
        session,
        Event::Transcript(Some("show total sales".to_string())),
    )
    .await;
    assert!(session.last_execution_failed);

    let (session, commands) = send(&mut controller, session, Event::Refresh).await;

    assert_eq!(session.nav_state(), NavState::NoSelection);
    assert!(session.last_transcript.is_empty());
    assert!(!session.last_execution_failed);
    assert!(controller.columns().is_empty());
    assert!(commands.contains(&RenderCommand::ClearResults));
    assert!(commands.iter().any(|c| matches!(c, RenderCommand::Databases(d) if d.len() == 2)));
}

#[tokio::test]
async fn test_non_select_statement_reports_success() {
    let warehouse = FakeWarehouse::sample();
    let mut controller = controller(&warehouse, &StubLlm::default());
    let session = at_orders(&mut controller).await;
    let (session, _) = send(&mut controller, session, Event::SetManualExecution(true)).await;

    let (session, commands) = send(
        &mut controller,
        session,
        Event::ExecuteManual("CREATE TABLE ARCHIVE AS SELECT * FROM ORDERS;".to_string()),
    )
    .await;

    assert!(commands.contains(&RenderCommand::Success(
        "SQL query executed successfully.".to_string()
    )));
    assert!(!commands.iter().any(|c| matches!(c, RenderCommand::Table(_))));
    assert_eq!(
        warehouse.user_statements(),
        vec!["CREATE TABLE ARCHIVE AS SELECT * FROM ORDERS"]
    );
    assert_eq!(
        session.last_generated_sql.as_deref(),
        Some("CREATE TABLE ARCHIVE AS SELECT * FROM ORDERS")
    );
}

#[tokio::test]
async fn test_manual_execution_must_be_enabled() {
    let warehouse = FakeWarehouse::sample();
    let mut controller = controller(&warehouse, &StubLlm::default());
    let session = at_orders(&mut controller).await;

    let (_, commands) = send(
        &mut controller,
        session,
        Event::ExecuteManual("SELECT 1".to_string()),
    )
    .await;

    assert_eq!(errors(&commands), vec![ErrorKind::InvalidState]);
    assert!(warehouse.user_statements().is_empty());
}

fn editor(commands: &[RenderCommand]) -> Option<(bool, Option<String>)> {
    commands.iter().rev().find_map(|c| match c {
        RenderCommand::ManualEditor { visible, prefill } => Some((*visible, prefill.clone())),
        _ => None,
    })
}

/// Ask once successfully, then once failing, with the given prefill policy
async fn prefill_after_failure(policy: ManualPrefill) -> Vec<Option<(bool, Option<String>)>> {
    let warehouse = FakeWarehouse::sample();
    warehouse.fail("SELECT COUNT", "Numeric value 'abc' is not recognized");
    let llm = StubLlm::default();
    llm.push_reply(SALES_REPLY);
    llm.push_reply("sql\nSELECT COUNT(*) FROM T WHERE ID = 'abc';");

    let config = AppConfig {
        manual_prefill: policy,
        ..AppConfig::default()
    };
    let mut controller = controller_with(config, &warehouse, &llm);
    let session = at_orders(&mut controller).await;
    let (session, enabled) = send(&mut controller, session, Event::SetManualExecution(true)).await;
    let (session, ok) = send(
        &mut controller,
        session,
        Event::Transcript(Some("show total sales".to_string())),
    )
    .await;
    let (_, failed) = send(
        &mut controller,
        session,
        Event::Transcript(Some("count order abc".to_string())),
    )
    .await;

    vec![editor(&enabled), editor(&ok), editor(&failed)]
}

#[tokio::test]
async fn test_prefill_last_generated() {
    let editors = prefill_after_failure(ManualPrefill::LastGenerated).await;
    let sales = Some("SELECT SUM(SALES) FROM T".to_string());
    assert_eq!(editors[0], Some((true, None)));
    assert_eq!(editors[1], Some((true, sales.clone())));
    // The failing statement never replaces the last good one
    assert_eq!(editors[2], Some((true, sales)));
}

#[tokio::test]
async fn test_prefill_on_failure() {
    let editors = prefill_after_failure(ManualPrefill::OnFailure).await;
    assert_eq!(editors[0], Some((true, None)));
    assert_eq!(editors[1], Some((true, None)));
    assert_eq!(
        editors[2],
        Some((true, Some("SELECT COUNT(*) FROM T WHERE ID = 'ABC'".to_string())))
    );
}

#[tokio::test]
async fn test_prefill_never() {
    let editors = prefill_after_failure(ManualPrefill::Never).await;
    assert!(editors.iter().all(|e| *e == Some((true, None))));
}

#[tokio::test]
async fn test_logout_drops_connection() {
    let warehouse = FakeWarehouse::sample();
    let mut controller = controller(&warehouse, &StubLlm::default());
    let session = at_orders(&mut controller).await;
    let id = session.id;

    let (session, commands) = send(&mut controller, session, Event::Logout).await;

    assert_eq!(commands, vec![RenderCommand::ShowLogin]);
    assert_eq!(session.nav_state(), NavState::LoggedOut);
    assert_eq!(session.id, id);
    assert!(!controller.is_connected());
    assert!(controller.columns().is_empty());

    let (_, commands) = send(&mut controller, session, Event::Refresh).await;
    assert_eq!(errors(&commands), vec![ErrorKind::InvalidState]);
}
