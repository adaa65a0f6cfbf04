//! VoiceQuery TUI
//!
//! One event at a time: a key press becomes an [`Event`], the controller
//! handles it on a background task and the UI locks input until the render
//! commands come back.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use tokio::sync::{mpsc, Mutex};

use crate::session::{Controller, Event, NavState, RenderCommand, Session};
use crate::speech::normalize_transcript;
use crate::warehouse::{cell_to_string, Credentials};
use crate::{log_debug, log_info, log_warn};

use super::animations::{Spinner, StatusIndicator, StatusState};
use super::layout::{centered_rect, format_duration, MainAreas, TextInput};
use super::theme::{Icons, Theme};
use super::view::{Banner, Picker, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginField {
    User,
    Password,
    Account,
}

impl LoginField {
    fn next(self) -> Self {
        match self {
            Self::User => Self::Password,
            Self::Password => Self::Account,
            Self::Account => Self::User,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::User => Self::Account,
            Self::Password => Self::User,
            Self::Account => Self::Password,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Databases,
    Schemas,
    Tables,
    Question,
    Editor,
}

impl Focus {
    fn next(self, editor_visible: bool) -> Self {
        match self {
            Self::Databases => Self::Schemas,
            Self::Schemas => Self::Tables,
            Self::Tables => Self::Question,
            Self::Question if editor_visible => Self::Editor,
            Self::Question | Self::Editor => Self::Databases,
        }
    }

    fn prev(self, editor_visible: bool) -> Self {
        match self {
            Self::Databases if editor_visible => Self::Editor,
            Self::Databases => Self::Question,
            Self::Schemas => Self::Databases,
            Self::Tables => Self::Schemas,
            Self::Question => Self::Tables,
            Self::Editor => Self::Question,
        }
    }
}

/// Message from the background task to the UI
#[derive(Debug)]
enum BackgroundMessage {
    Handled {
        session: Session,
        commands: Vec<RenderCommand>,
    },
}

pub struct VoiceQueryApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    controller: Arc<Mutex<Controller>>,
    session: Session,
    should_quit: bool,

    theme: Theme,
    view: ViewState,
    focus: Focus,
    model_label: String,

    // Login form
    login_user: String,
    login_password: String,
    login_account: String,
    login_field: LoginField,

    question: String,
    results_scroll: usize,

    status: StatusIndicator,
    spinner: Spinner,
    status_message: String,

    is_processing: bool,
    processing_start: Option<Instant>,
    response_rx: Option<mpsc::Receiver<BackgroundMessage>>,

    last_ctrl_c: Option<Instant>,
}

impl VoiceQueryApp {
    /// Take over the terminal. `credentials` pre-fills the login form.
    pub fn new(controller: Controller, credentials: Credentials) -> io::Result<Self> {
        let model_label = format!(
            "{} {}",
            controller.llm().provider(),
            controller.llm().model_name()
        );

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            controller: Arc::new(Mutex::new(controller)),
            session: Session::new(),
            should_quit: false,

            theme: Theme::dark(),
            view: ViewState::login(),
            focus: Focus::Databases,
            model_label,

            login_user: credentials.user,
            login_password: credentials.password,
            login_account: credentials.account,
            login_field: LoginField::User,

            question: String::new(),
            results_scroll: 0,

            status: StatusIndicator::new(),
            spinner: Spinner::thinking(),
            status_message: "Log in to Snowflake".to_string(),

            is_processing: false,
            processing_start: None,
            response_rx: None,

            last_ctrl_c: None,
        })
    }

    pub async fn run(&mut self) -> io::Result<()> {
        log_info!("TUI started, session {}", self.session.id);

        let tick_rate = Duration::from_millis(80);
        let mut last_tick = Instant::now();

        loop {
            self.draw()?;

            self.check_background_response();

            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                if let TermEvent::Key(key) = event::read()? {
                    self.handle_key_event(key);
                }
            }

            if last_tick.elapsed() >= tick_rate {
                self.tick();
                last_tick = Instant::now();
            }

            if self.should_quit {
                break;
            }
        }

        log_info!("TUI closed");
        self.cleanup()
    }

    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, Show)?;
        Ok(())
    }

    fn tick(&mut self) {
        self.status.tick();
        self.spinner.tick();
    }

    /// Hand an event to the controller on a background task
    fn dispatch(&mut self, event: Event) {
        if self.is_processing {
            return;
        }
        log_debug!("dispatching {}", event.name());

        self.is_processing = true;
        self.processing_start = Some(Instant::now());
        self.status.set_state(StatusState::Working);
        self.status_message = working_message(&event).to_string();
        self.spinner.reset();

        let (tx, rx) = mpsc::channel(1);
        self.response_rx = Some(rx);

        let controller = Arc::clone(&self.controller);
        let session = self.session.clone();

        tokio::spawn(async move {
            let mut controller = controller.lock().await;
            let (session, commands) = controller.handle(event, session).await;
            let _ = tx
                .send(BackgroundMessage::Handled { session, commands })
                .await;
        });
    }

    fn check_background_response(&mut self) {
        let Some(rx) = self.response_rx.as_mut() else {
            return;
        };

        match rx.try_recv() {
            Ok(BackgroundMessage::Handled { session, commands }) => {
                self.response_rx = None;
                self.finish_processing(session, commands);
            }
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => {
                log_warn!("background task ended without a reply");
                self.response_rx = None;
                self.is_processing = false;
                self.processing_start = None;
                self.status.set_state(StatusState::Error);
                self.status_message = "Request aborted".to_string();
            }
        }
    }

    fn finish_processing(&mut self, session: Session, commands: Vec<RenderCommand>) {
        self.is_processing = false;
        self.processing_start = None;
        self.session = session;

        self.view.banner = None;
        self.view.apply_all(commands);

        self.results_scroll = 0;
        if !self.view.editor_visible && self.focus == Focus::Editor {
            self.focus = Focus::Question;
        }

        let (state, message) = match &self.view.banner {
            Some(Banner::Error { message, .. }) => (StatusState::Error, message.clone()),
            Some(Banner::Notice(message)) => (StatusState::Notice, message.clone()),
            Some(Banner::Success(message)) => (StatusState::Success, message.clone()),
            None => (StatusState::Idle, idle_message(&self.session)),
        };
        self.status.set_state(state);
        self.status_message = message;
    }

    fn draw(&mut self) -> io::Result<()> {
        let render_data = RenderData {
            theme: self.theme.clone(),
            view: self.view.clone(),
            session: self.session.clone(),
            focus: self.focus,
            model_label: self.model_label.clone(),
            login_user: self.login_user.clone(),
            login_password: self.login_password.clone(),
            login_account: self.login_account.clone(),
            login_field: self.login_field,
            question: self.question.clone(),
            results_scroll: self.results_scroll,
            status_render: self.status.render(),
            status_message: self.status_message.clone(),
            is_processing: self.is_processing,
            processing_start: self.processing_start,
            spinner_frame: self.spinner.frame().to_string(),
        };

        self.terminal.draw(|frame| {
            render_ui(frame, &render_data);
        })?;
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Ctrl+C twice within half a second quits
        if ctrl && key.code == KeyCode::Char('c') {
            let now = Instant::now();
            match self.last_ctrl_c {
                Some(last) if now.duration_since(last) < Duration::from_millis(500) => {
                    self.should_quit = true;
                }
                _ => {
                    self.last_ctrl_c = Some(now);
                    if !self.is_processing {
                        self.status_message = "Press Ctrl+C again to quit".to_string();
                    }
                }
            }
            return;
        }

        if ctrl && key.code == KeyCode::Char('q') {
            self.should_quit = true;
            return;
        }

        // Input stays locked until the running event completes
        if self.is_processing {
            return;
        }

        if self.view.show_login {
            self.handle_login_keys(key);
        } else {
            self.handle_main_keys(key);
        }
    }

    fn handle_login_keys(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.login_field = self.login_field.next(),
            KeyCode::BackTab | KeyCode::Up => self.login_field = self.login_field.prev(),
            KeyCode::Enter => {
                let credentials = Credentials::new(
                    self.login_user.trim(),
                    self.login_password.clone(),
                    self.login_account.trim(),
                );
                self.dispatch(Event::Login(credentials));
            }
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(c) => self.login_buffer().push(c),
            KeyCode::Backspace => {
                self.login_buffer().pop();
            }
            _ => {}
        }
    }

    fn login_buffer(&mut self) -> &mut String {
        match self.login_field {
            LoginField::User => &mut self.login_user,
            LoginField::Password => &mut self.login_password,
            LoginField::Account => &mut self.login_account,
        }
    }

    fn handle_main_keys(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl {
            match key.code {
                KeyCode::Char('r') => self.dispatch(Event::Refresh),
                KeyCode::Char('e') => {
                    let enabled = !self.session.manual_execution_enabled;
                    if enabled {
                        self.focus = Focus::Editor;
                    }
                    self.dispatch(Event::SetManualExecution(enabled));
                }
                KeyCode::Char('l') => {
                    self.login_password.clear();
                    self.dispatch(Event::Logout);
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Tab => self.focus = self.focus.next(self.view.editor_visible),
            KeyCode::BackTab => self.focus = self.focus.prev(self.view.editor_visible),
            KeyCode::PageUp => self.results_scroll = self.results_scroll.saturating_sub(10),
            KeyCode::PageDown => {
                let rows = self.view.results.as_ref().map_or(0, |r| r.rows.len());
                self.results_scroll = (self.results_scroll + 10).min(rows.saturating_sub(1));
            }
            _ => match self.focus {
                Focus::Databases => self.handle_picker_key(key, Focus::Databases),
                Focus::Schemas => self.handle_picker_key(key, Focus::Schemas),
                Focus::Tables => self.handle_picker_key(key, Focus::Tables),
                Focus::Question => self.handle_question_key(key),
                Focus::Editor => self.handle_editor_key(key),
            },
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent, focus: Focus) {
        let picker = match focus {
            Focus::Databases => &mut self.view.databases,
            Focus::Schemas => &mut self.view.schemas,
            _ => &mut self.view.tables,
        };

        match key.code {
            KeyCode::Up => picker.move_up(),
            KeyCode::Down => picker.move_down(),
            KeyCode::Enter => {
                let Some(name) = picker.current().map(String::from) else {
                    return;
                };
                let event = match focus {
                    Focus::Databases => Event::SelectDatabase(name),
                    Focus::Schemas => Event::SelectSchema(name),
                    _ => Event::SelectTable(name),
                };
                // Walk the focus down the hierarchy
                self.focus = self.focus.next(false);
                self.dispatch(event);
            }
            _ => {}
        }
    }

    fn handle_question_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let transcript = normalize_transcript(&self.question);
                self.question.clear();
                self.dispatch(Event::Transcript(transcript));
            }
            KeyCode::Char(c) => self.question.push(c),
            KeyCode::Backspace => {
                self.question.pop();
            }
            KeyCode::Esc => self.question.clear(),
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter if !self.view.editor.trim().is_empty() => {
                self.dispatch(Event::ExecuteManual(self.view.editor.clone()));
            }
            KeyCode::Char(c) => self.view.editor.push(c),
            KeyCode::Backspace => {
                self.view.editor.pop();
            }
            _ => {}
        }
    }
}

impl Drop for VoiceQueryApp {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen, Show);
    }
}

fn working_message(event: &Event) -> &'static str {
    match event {
        Event::Login(_) => "Connecting to Snowflake",
        Event::Transcript(_) => "Generating SQL",
        Event::ExecuteManual(_) => "Running query",
        _ => "Loading",
    }
}

fn idle_message(session: &Session) -> String {
    match session.nav_state() {
        NavState::LoggedOut => "Log in to Snowflake".to_string(),
        NavState::NoSelection => "Select a database".to_string(),
        NavState::DatabaseSelected => "Select a schema".to_string(),
        NavState::SchemaSelected | NavState::TableSelected => "Ask a question".to_string(),
    }
}

// ============================================================================
// Render Data & Static Rendering Functions
// ============================================================================

struct RenderData {
    theme: Theme,
    view: ViewState,
    session: Session,
    focus: Focus,
    model_label: String,
    login_user: String,
    login_password: String,
    login_account: String,
    login_field: LoginField,
    question: String,
    results_scroll: usize,
    status_render: (&'static str, (u8, u8, u8)),
    status_message: String,
    is_processing: bool,
    processing_start: Option<Instant>,
    spinner_frame: String,
}

fn render_ui(frame: &mut Frame, data: &RenderData) {
    let area = frame.area();
    frame.render_widget(Block::default().style(data.theme.base_style()), area);

    if data.view.show_login {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(1)])
            .split(area);
        render_login(frame, rows[0], data);
        render_status_bar(frame, rows[1], data);
        return;
    }

    let areas = MainAreas::split(area, data.view.editor_visible);
    render_header(frame, areas.header, data);
    render_picker(
        frame,
        areas.databases,
        " Databases ",
        &data.view.databases,
        data.session.selected_database.as_deref(),
        data.focus == Focus::Databases,
        &data.theme,
    );
    render_picker(
        frame,
        areas.schemas,
        " Schemas ",
        &data.view.schemas,
        data.session.selected_schema.as_deref(),
        data.focus == Focus::Schemas,
        &data.theme,
    );
    render_picker(
        frame,
        areas.tables,
        " Tables ",
        &data.view.tables,
        data.session.selected_table.as_deref(),
        data.focus == Focus::Tables,
        &data.theme,
    );
    render_columns(frame, areas.columns, data);
    render_question(frame, areas.question, data);
    render_answer(frame, areas.answer, data);
    render_results(frame, areas.results, data);
    if let Some(editor) = areas.editor {
        TextInput::new("Manual SQL (Enter to run)", &data.view.editor, &data.theme)
            .placeholder("SELECT ...")
            .focused(data.focus == Focus::Editor && !data.is_processing)
            .render(frame, editor);
    }
    render_status_bar(frame, areas.status, data);
}

fn render_login(frame: &mut Frame, area: Rect, data: &RenderData) {
    let modal_area = centered_rect(50, 60, area);
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(data.theme.primary_style())
        .border_type(BorderType::Double)
        .title(Span::styled(
            format!(" {} Snowflake login ", Icons::LOCK),
            data.theme.title_style(),
        ))
        .style(data.theme.base_style());
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    let focused = |field: LoginField| data.login_field == field && !data.is_processing;

    TextInput::new("Username", &data.login_user, &data.theme)
        .focused(focused(LoginField::User))
        .render(frame, rows[0]);
    TextInput::new("Password", &data.login_password, &data.theme)
        .masked(true)
        .focused(focused(LoginField::Password))
        .render(frame, rows[1]);
    TextInput::new("Account", &data.login_account, &data.theme)
        .placeholder("xy12345.eu-west-1")
        .focused(focused(LoginField::Account))
        .render(frame, rows[2]);

    let mut lines = vec![Line::from("")];
    if let Some(Banner::Error { message, .. }) = &data.view.banner {
        lines.push(Line::from(Span::styled(
            format!("{} {}", Icons::ERROR, message),
            data.theme.error_style(),
        )));
    }
    lines.push(Line::from(vec![
        Span::styled(" Tab ", data.theme.shortcut_key_style()),
        Span::styled("next field  ", data.theme.shortcut_desc_style()),
        Span::styled(" Enter ", data.theme.shortcut_key_style()),
        Span::styled("log in  ", data.theme.shortcut_desc_style()),
        Span::styled(" Esc ", data.theme.shortcut_key_style()),
        Span::styled("quit", data.theme.shortcut_desc_style()),
    ]));

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rows[3],
    );
}

fn render_header(frame: &mut Frame, area: Rect, data: &RenderData) {
    let (icon, color) = data.status_render;

    let path = [
        data.session.selected_database.as_deref(),
        data.session.selected_schema.as_deref(),
        data.session.selected_table.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(".");

    let title = Line::from(vec![
        Span::styled(" VoiceQuery ", data.theme.title_style()),
        Span::styled(icon, Style::default().fg(Color::Rgb(color.0, color.1, color.2))),
        Span::raw(" "),
        Span::styled(
            data.view.logged_in_as.clone().unwrap_or_default(),
            data.theme.accent_style(),
        ),
        Span::raw(" "),
        Span::styled(path, data.theme.muted_style()),
        Span::raw(" "),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(data.theme.border_style(false))
        .title(title)
        .title_alignment(Alignment::Left);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!("{} ", data.model_label),
            data.theme.muted_style(),
        )))
        .alignment(Alignment::Right)
        .block(block),
        area,
    );
}

fn render_picker(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    picker: &Picker,
    chosen: Option<&str>,
    focused: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(focused))
        .border_type(BorderType::Rounded)
        .title(Span::styled(
            title.to_string(),
            if focused {
                theme.primary_style()
            } else {
                theme.muted_style()
            },
        ));

    let items: Vec<ListItem> = picker
        .items
        .iter()
        .map(|name| {
            let is_chosen = chosen == Some(name.as_str());
            ListItem::new(Line::from(vec![
                Span::styled(
                    if is_chosen { Icons::CHOSEN } else { " " },
                    theme.success_style(),
                ),
                Span::raw(" "),
                Span::styled(
                    name.clone(),
                    if is_chosen {
                        theme.success_style().add_modifier(Modifier::BOLD)
                    } else {
                        theme.base_style()
                    },
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_symbol(Icons::POINTER)
        .highlight_style(if focused {
            theme.selection_style()
        } else {
            Style::default()
        });

    let mut state = ListState::default().with_selected(if picker.items.is_empty() {
        None
    } else {
        Some(picker.cursor)
    });
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_columns(frame: &mut Frame, area: Rect, data: &RenderData) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(data.theme.border_style(false))
        .border_type(BorderType::Rounded)
        .title(Span::styled(" Columns ", data.theme.muted_style()));

    let text = if data.view.columns.is_empty() {
        Line::from(Span::styled("No table selected", data.theme.muted_style()))
    } else {
        Line::from(Span::styled(
            data.view.columns.join(", "),
            data.theme.info_style(),
        ))
    };

    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_question(frame: &mut Frame, area: Rect, data: &RenderData) {
    let ready = matches!(
        data.session.nav_state(),
        NavState::SchemaSelected | NavState::TableSelected
    );
    let title = format!("{} Ask a question", Icons::MIC);
    let placeholder = if ready {
        "Say what you want to know and press Enter"
    } else {
        "Select a database and schema first"
    };

    TextInput::new(&title, &data.question, &data.theme)
        .placeholder(placeholder)
        .focused(data.focus == Focus::Question && !data.is_processing)
        .render(frame, area);
}

fn render_answer(frame: &mut Frame, area: Rect, data: &RenderData) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(data.theme.border_style(false))
        .border_type(BorderType::Rounded)
        .title(Span::styled(" Transcript & SQL ", data.theme.muted_style()));

    let mut lines = Vec::new();
    match &data.view.transcript {
        Some(text) => lines.push(Line::from(vec![
            Span::styled("You asked: ", data.theme.muted_style()),
            Span::styled(text.clone(), data.theme.base_style()),
        ])),
        None => lines.push(Line::from(Span::styled(
            "Nothing asked yet",
            data.theme.muted_style(),
        ))),
    }
    if let Some(sql) = &data.view.extracted_sql {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(sql.clone(), data.theme.sql_style())));
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_results(frame: &mut Frame, area: Rect, data: &RenderData) {
    let Some(result) = &data.view.results else {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(data.theme.border_style(false))
            .border_type(BorderType::Rounded)
            .title(Span::styled(" Results ", data.theme.muted_style()));
        frame.render_widget(
            Paragraph::new(Span::styled("No results", data.theme.muted_style())).block(block),
            area,
        );
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(data.theme.border_style(false))
        .border_type(BorderType::Rounded)
        .title(Span::styled(
            format!(" Results ({}) ", result.row_count_label()),
            data.theme.primary_style(),
        ));

    if result.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Query returned 0 rows.",
                data.theme.muted_style(),
            ))
            .block(block),
            area,
        );
        return;
    }

    let header = Row::new(
        result
            .columns
            .iter()
            .map(|c| Cell::from(c.clone()))
            .collect::<Vec<_>>(),
    )
    .style(data.theme.table_header_style());

    let rows = result.rows.iter().skip(data.results_scroll).map(|row| {
        Row::new(
            row.iter()
                .map(|value| Cell::from(cell_to_string(value)))
                .collect::<Vec<_>>(),
        )
    });

    let widths = vec![Constraint::Fill(1); result.columns.len().max(1)];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .style(data.theme.base_style());

    frame.render_widget(table, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, data: &RenderData) {
    let (icon, color) = data.status_render;

    let status_text = if data.is_processing {
        let elapsed = data
            .processing_start
            .map(|start| format_duration(start.elapsed().as_secs()))
            .unwrap_or_default();
        format!("{} {} {}", data.spinner_frame, data.status_message, elapsed)
    } else {
        format!("{} {}", icon, data.status_message)
    };

    let status_style = if data.is_processing {
        data.theme.warning_style()
    } else {
        Style::default().fg(Color::Rgb(color.0, color.1, color.2))
    };

    let hints = if data.view.show_login {
        "^C×2:quit"
    } else {
        "Tab:focus  ^R:refresh  ^E:manual SQL  ^L:logout  ^C×2:quit"
    };

    let line = Line::from(vec![
        Span::styled(format!(" {} ", status_text), status_style),
        Span::raw("│ "),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(line).style(data.theme.base_style()), area);
}
