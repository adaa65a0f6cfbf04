//! VoiceQuery - ask Snowflake questions in plain speech
//!
//! A spoken question is transcribed, combined with the column names of the
//! selected table and sent to an LLM. The SQL statement in the reply is run
//! against Snowflake and the rows come back as a table.
//!
//! # Architecture
//!
//! - **Capabilities behind traits**: [`warehouse::Warehouse`],
//!   [`llm::LlmClient`] and [`speech::SpeechCapture`] are injected, so the
//!   pipeline runs against in-memory doubles in tests
//! - **Value-typed session**: [`session::Session`] holds navigation state
//!   only; [`session::Controller::handle`] maps `(event, session)` to
//!   `(session, render commands)`
//! - **One operation at a time**: the UI blocks input while an event is
//!   being handled
//!
//! # Modules
//!
//! - [`pipeline`] - prompt building, SQL extraction, execution, introspection
//! - [`session`] - navigation state machine and the controller
//! - [`llm`] - OpenAI and Anthropic chat clients
//! - [`warehouse`] - Snowflake connection
//! - [`ui`] - ratatui front end
//!
//! # Example
//!
//! ```rust,no_run
//! use voicequery::config::AppConfig;
//! use voicequery::llm::create_client;
//! use voicequery::session::{Controller, Event, Session};
//! use voicequery::warehouse::{Credentials, SnowflakeConnector};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::load(None)?;
//! let llm = create_client(config.llm.clone())?;
//! let connector = SnowflakeConnector::new(config.warehouse.clone());
//! let mut controller = Controller::new(&config, Box::new(connector), llm);
//!
//! let login = Event::Login(Credentials::new("analyst", "secret", "xy12345"));
//! let (session, commands) = controller.handle(login, Session::new()).await;
//! let (session, commands) = controller
//!     .handle(Event::SelectDatabase("SALES_DB".into()), session)
//!     .await;
//! # let _ = (session, commands);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod session;
pub mod speech;
pub mod ui;
pub mod warehouse;

pub use config::AppConfig;
pub use error::{ErrorKind, Result, VoiceQueryError};
pub use session::{Controller, Event, RenderCommand, Session};
pub use ui::VoiceQueryApp;
