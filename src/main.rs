//! VoiceQuery - natural-language questions against Snowflake
//!
//! Default mode is the TUI. `--simple` runs a line-oriented loop over the
//! same controller; the subcommands run one pipeline step and exit.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voicequery::{
    config::{AppConfig, ExtractionStrategy, LlmConfig, LlmProvider},
    llm::create_client,
    log_error, log_info, logging,
    session::{Controller, Event, RenderCommand, Session},
    speech::{ScriptedCapture, SpeechCapture, StdinCapture},
    ui::VoiceQueryApp,
    warehouse::{cell_to_string, Credentials, RowSet, SnowflakeConnector},
};

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Run one question through the whole pipeline
    Ask {
        /// The question, as it would have been spoken
        question: String,
        #[arg(long)]
        database: String,
        #[arg(long)]
        schema: String,
        /// Table whose columns are sent with the question
        #[arg(long)]
        table: Option<String>,
    },
    /// Execute a SQL statement directly
    Exec {
        sql: String,
        #[arg(long)]
        database: Option<String>,
        #[arg(long, requires = "database")]
        schema: Option<String>,
    },
    /// List databases, or drill into one
    Schema {
        #[arg(long)]
        database: Option<String>,
        #[arg(long, requires = "database")]
        schema: Option<String>,
        #[arg(long, requires = "schema")]
        table: Option<String>,
    },
    /// Write the current configuration to the config directory
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "voicequery")]
#[command(author = "MadKoding")]
#[command(version)]
#[command(about = "Ask Snowflake questions in plain language", long_about = None)]
struct Args {
    /// Configuration file path (overrides defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// .env file to load before reading the environment (default: ./.env)
    #[arg(long, short = 'e', global = true)]
    env_file: Option<PathBuf>,

    /// LLM vendor: openai or anthropic
    #[arg(long, global = true)]
    provider: Option<LlmProvider>,

    /// Model name (overrides config)
    #[arg(long, global = true)]
    model: Option<String>,

    /// SQL extraction: marker or offset
    #[arg(long, global = true)]
    extraction: Option<ExtractionStrategy>,

    #[arg(long, env = "SNOWFLAKE_USER", global = true)]
    user: Option<String>,

    #[arg(long, env = "SNOWFLAKE_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    #[arg(long, env = "SNOWFLAKE_ACCOUNT", global = true)]
    account: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip TUI and read questions from stdin
    #[arg(long)]
    simple: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Args {
    fn credentials(&self) -> Credentials {
        Credentials::new(
            self.user.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
            self.account.clone().unwrap_or_default(),
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The .env file has to be loaded before clap reads SNOWFLAKE_* from the environment
    load_env_file()?;
    let args = Args::parse();

    let config_path = AppConfig::locate(args.config.as_deref())?;
    let mut config = AppConfig::load(config_path.as_deref())?;

    let tui_mode = args.command.is_none() && !args.simple;
    init_logging(args.verbose, tui_mode, config.debug)?;
    match &config_path {
        Some(path) => tracing::info!("Loaded config from {}", path.display()),
        None => tracing::info!("Using default configuration with environment overrides"),
    }

    if let Some(provider) = args.provider {
        if provider != config.llm.provider {
            config.llm = LlmConfig::for_provider(provider);
        }
    }
    if let Some(model) = args.model.clone() {
        config.llm.model = model;
    }
    if let Some(strategy) = args.extraction {
        config.extraction.strategy = strategy;
    }
    config.validate()?;

    if let Some(Command::InitConfig { force }) = &args.command {
        return init_config(&config, *force);
    }

    if let Some(path) = &args.env_file {
        tracing::debug!("loaded environment from {}", path.display());
    }
    tracing::info!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        "using model"
    );

    let llm = match create_client(config.llm.clone()) {
        Ok(client) => client,
        Err(e) => {
            log_error!("Failed to create {} client: {}", config.llm.provider, e);
            return Err(e).with_context(|| {
                format!(
                    "set the API key named by llm.api_key ({})",
                    config.llm.api_key.as_deref().unwrap_or("none")
                )
            });
        }
    };
    let connector = SnowflakeConnector::new(config.warehouse.clone());
    let mut controller = Controller::new(&config, Box::new(connector), llm);
    let credentials = args.credentials();

    match args.command {
        Some(Command::Ask {
            question,
            database,
            schema,
            table,
        }) => {
            let mut session = step(&mut controller, Session::new(), Event::Login(credentials)).await?;
            session = step(&mut controller, session, Event::SelectDatabase(database)).await?;
            session = step(&mut controller, session, Event::SelectSchema(schema)).await?;
            if let Some(table) = table {
                session = step(&mut controller, session, Event::SelectTable(table)).await?;
            }
            let transcript = ScriptedCapture::new([question]).record().await?;
            step(&mut controller, session, Event::Transcript(transcript)).await?;
            Ok(())
        }
        Some(Command::Exec {
            sql,
            database,
            schema,
        }) => {
            let mut session = step(&mut controller, Session::new(), Event::Login(credentials)).await?;
            if let Some(database) = database {
                session = step(&mut controller, session, Event::SelectDatabase(database)).await?;
            }
            if let Some(schema) = schema {
                session = step(&mut controller, session, Event::SelectSchema(schema)).await?;
            }
            session = step(&mut controller, session, Event::SetManualExecution(true)).await?;
            step(&mut controller, session, Event::ExecuteManual(sql)).await?;
            Ok(())
        }
        Some(Command::Schema {
            database,
            schema,
            table,
        }) => {
            let mut session = step(&mut controller, Session::new(), Event::Login(credentials)).await?;
            if let Some(database) = database {
                session = step(&mut controller, session, Event::SelectDatabase(database)).await?;
            }
            if let Some(schema) = schema {
                session = step(&mut controller, session, Event::SelectSchema(schema)).await?;
            }
            if let Some(table) = table {
                step(&mut controller, session, Event::SelectTable(table)).await?;
            }
            Ok(())
        }
        Some(Command::InitConfig { .. }) => Ok(()),
        None if args.simple => run_simple(controller, credentials).await,
        None => run_tui(controller, credentials).await,
    }
}

/// Load `--env-file` or `./.env`, ahead of argument parsing
fn load_env_file() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if let Some(pos) = args.iter().position(|arg| arg == "--env-file" || arg == "-e") {
        if let Some(path) = args.get(pos + 1).filter(|p| !p.starts_with('-')) {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path))?;
            return Ok(());
        }
    }

    if let Some(path) = args.iter().find_map(|arg| arg.strip_prefix("--env-file=")) {
        dotenvy::from_path(path).with_context(|| format!("Failed to load env file {}", path))?;
        return Ok(());
    }

    // A missing ./.env is fine
    let _ = dotenvy::dotenv();
    Ok(())
}

/// Initialize logging
fn init_logging(verbose: bool, tui_mode: bool, debug_mode: bool) -> anyhow::Result<()> {
    let filter = if verbose || debug_mode {
        "voicequery=debug,info"
    } else {
        "voicequery=info,warn"
    };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    // The terminal belongs to ratatui in TUI mode, so everything goes to the log file
    if tui_mode {
        let file = logging::init_logger()?;
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .init();
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
    Ok(())
}

fn init_config(config: &AppConfig, force: bool) -> anyhow::Result<()> {
    let dir = AppConfig::config_dir().context("No config directory on this platform")?;
    std::fs::create_dir_all(&dir)?;

    let env = std::env::var("VOICEQUERY_ENV").unwrap_or_else(|_| "production".to_string());
    let path = dir.join(format!("config.{}.json", env));
    if path.exists() && !force {
        anyhow::bail!("{} already exists, pass --force to overwrite", path.display());
    }

    config.save_to_file(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn run_tui(controller: Controller, credentials: Credentials) -> anyhow::Result<()> {
    log_info!("Starting TUI, log file at {}", logging::get_log_path_display());
    let mut app = VoiceQueryApp::new(controller, credentials)?;
    app.run().await?;
    Ok(())
}

const SIMPLE_HELP: &str = "\
Commands:
  :db NAME         select a database
  :schema NAME     select a schema
  :table NAME      select a table
  :refresh         clear selections
  :manual on|off   toggle manual execution
  :exec SQL        run SQL directly (manual execution must be on)
  :quit            exit
Anything else is sent as a question.";

/// Line-oriented loop: each stdin line is one utterance or command
async fn run_simple(mut controller: Controller, credentials: Credentials) -> anyhow::Result<()> {
    let (mut session, commands) = controller
        .handle(Event::Login(credentials), Session::new())
        .await;
    if let Some(message) = print_commands(&commands) {
        anyhow::bail!(message);
    }

    println!("{}", SIMPLE_HELP);
    let mut capture = StdinCapture::stdin();

    loop {
        eprint!("> ");
        let line = match capture.record().await {
            Ok(Some(line)) => line,
            Ok(None) => continue,
            // stdin closed
            Err(_) => break,
        };

        let event = match parse_simple_command(&line) {
            SimpleInput::Quit => break,
            SimpleInput::Help => {
                println!("{}", SIMPLE_HELP);
                continue;
            }
            SimpleInput::Event(event) => event,
        };

        let (next, commands) = controller.handle(event, session).await;
        session = next;
        print_commands(&commands);
    }

    Ok(())
}

enum SimpleInput {
    Event(Event),
    Help,
    Quit,
}

fn parse_simple_command(line: &str) -> SimpleInput {
    let Some(command) = line.strip_prefix(':') else {
        return SimpleInput::Event(Event::Transcript(Some(line.to_string())));
    };

    let (name, rest) = command
        .split_once(' ')
        .map(|(n, r)| (n, r.trim()))
        .unwrap_or((command, ""));

    match (name, rest) {
        ("quit" | "q", _) => SimpleInput::Quit,
        ("db", name) if !name.is_empty() => SimpleInput::Event(Event::SelectDatabase(name.to_string())),
        ("schema", name) if !name.is_empty() => SimpleInput::Event(Event::SelectSchema(name.to_string())),
        ("table", name) if !name.is_empty() => SimpleInput::Event(Event::SelectTable(name.to_string())),
        ("refresh", _) => SimpleInput::Event(Event::Refresh),
        ("manual", "on") => SimpleInput::Event(Event::SetManualExecution(true)),
        ("manual", "off") => SimpleInput::Event(Event::SetManualExecution(false)),
        ("exec", sql) if !sql.is_empty() => SimpleInput::Event(Event::ExecuteManual(sql.to_string())),
        _ => SimpleInput::Help,
    }
}

/// Handle one event and print its output; the first error aborts
async fn step(controller: &mut Controller, session: Session, event: Event) -> anyhow::Result<Session> {
    let (session, commands) = controller.handle(event, session).await;
    if let Some(message) = print_commands(&commands) {
        anyhow::bail!(message);
    }
    Ok(session)
}

/// Print render commands to stdout, returning the first error message
fn print_commands(commands: &[RenderCommand]) -> Option<String> {
    let mut first_error = None;

    for command in commands {
        match command {
            RenderCommand::ShowLogin | RenderCommand::ClearResults => {}
            RenderCommand::LoggedIn(account) => println!("Logged in to {}", account),
            RenderCommand::Databases(items) => print_list("Databases", items),
            RenderCommand::Schemas(items) => print_list("Schemas", items),
            RenderCommand::Tables(items) => print_list("Tables", items),
            RenderCommand::Columns(items) => print_list("Columns", items),
            RenderCommand::Transcript(text) => println!("Transcript: {}", text),
            RenderCommand::ExtractedSql(sql) => println!("SQL: {}", sql),
            RenderCommand::Table(rows) => print_table(rows),
            RenderCommand::Success(message) => println!("✓ {}", message),
            RenderCommand::Notice(message) => println!("ℹ {}", message),
            RenderCommand::ManualEditor { visible, prefill } => {
                if let (true, Some(sql)) = (visible, prefill) {
                    println!("Manual SQL: {}", sql);
                }
            }
            RenderCommand::Error { kind, message } => {
                eprintln!("✗ {:?}: {}", kind, message);
                first_error.get_or_insert_with(|| message.clone());
            }
        }
    }

    first_error
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}:", title);
    for item in items {
        println!("  {}", item);
    }
}

fn print_table(rows: &RowSet) {
    if rows.is_empty() {
        println!("({})", rows.row_count_label());
        return;
    }

    let cells: Vec<Vec<String>> = rows
        .rows
        .iter()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    let widths: Vec<usize> = rows
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |values: Vec<&str>| {
        values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{:<width$}", value, width = width))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", format_row(rows.columns.iter().map(String::as_str).collect()));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in &cells {
        println!("{}", format_row(row.iter().map(String::as_str).collect()));
    }
    println!("({})", rows.row_count_label());
}
