//! PostPerson TUI - Actor-based terminal HTTP client
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Network Layer (Tokio) - async HTTP execution

use std::fs;
use std::io;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing_subscriber::EnvFilter;

use postperson_tui::app::{AppActor, AppState};
use postperson_tui::config::{Cli, Config};
use postperson_tui::constants::{APP_NAME, APP_VERSION, NOTIFICATION_SECS, UI_POLL_MS};
use postperson_tui::messages::ui_events::{EditTarget, Focus, InputMode, Modal, Screen};
use postperson_tui::messages::{key_to_ui_event, NetworkCommand, NetworkResponse, RenderState, UiEvent};
use postperson_tui::models::{Field, RequestRecord};
use postperson_tui::network::{create_client, NetworkActor};
use postperson_tui::session::{SessionController, SessionDocument};
use postperson_tui::ui::{centered_rect, field_block, method_color, response_body_lines, status_color};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load(Cli::parse())?;

    // Initialize logging to file
    let log_dir = match config.log_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => ".".into(),
    };
    let log_name = config
        .log_file
        .file_name()
        .context("log file path has no file name")?;
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(&log_dir, log_name);
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!(version = APP_VERSION, "Starting {}", APP_NAME);

    // A session named on the command line must open before the terminal is taken over
    let session = match &config.session {
        Some(path) => {
            let document = SessionDocument::open(path)
                .with_context(|| format!("opening session {}", path.display()))?;
            Some(SessionController::new(document))
        }
        None => None,
    };

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(create_client(config.request_timeout), net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(AppState::new(session), net_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    tracing::info!("Exiting");
    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Check for state updates (non-blocking)
        loop {
            match render_rx.try_recv() {
                Ok(state) => current_state = state,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if current_state.should_quit {
            break;
        }

        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(UI_POLL_MS))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(key, current_state.key_context()) {
                    let _ = ui_tx.send(event);
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_title_bar(f, state, main_chunks[0]);

    match state.screen {
        Screen::Prompt => draw_prompt(f, state, main_chunks[1]),
        Screen::Session => draw_session(f, state, main_chunks[1]),
    }

    draw_status_bar(f, state, main_chunks[2]);

    // Popups
    if state.is_editing(EditTarget::NewHeader) {
        draw_header_input_popup(f, state, area);
    }

    match state.modal {
        Modal::ConfirmDelete(_) => {
            draw_confirmation(f, "Are you sure you want to delete this request?", area)
        }
        Modal::ConfirmExit(_) => draw_confirmation(
            f,
            "You have unsaved changes. Are you sure you want to exit?",
            area,
        ),
        Modal::None => {}
    }

    if state.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_title_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let mut spans = vec![Span::styled(
        format!(" {} ", APP_NAME),
        Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
    )];
    if let Some(path) = &state.session_path {
        spans.push(Span::styled(format!(" {}", path), Style::default().fg(Color::Gray)));
    }
    if state.dirty {
        spans.push(Span::styled(" * unsaved", Style::default().fg(Color::Yellow)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_prompt(f: &mut Frame, state: &RenderState, area: Rect) {
    let popup_area = centered_rect(60, 40, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Hint
            Constraint::Length(3), // Input
            Constraint::Min(1),    // Error
        ])
        .split(popup_area);

    let hint = Paragraph::new("Path of the session file to open or create (.json)")
        .style(Style::default().fg(Color::Gray));
    f.render_widget(hint, chunks[0]);

    let block = field_block(" Create Session ", true, true);
    let input = Paragraph::new(state.input.buffer.as_str()).block(block);
    f.render_widget(input, chunks[1]);
    set_cursor(f, chunks[1], state);

    if let Some(error) = &state.prompt_error {
        let error = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: false });
        f.render_widget(error, chunks[2]);
    }
}

fn draw_session(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(20)])
        .split(area);

    draw_record_list(f, state, chunks[0]);

    match state.selected_record() {
        Some(record) => draw_record(f, state, record, chunks[1]),
        None => {
            let empty = Paragraph::new("No requests yet. Press 'a' to add one.")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(empty, chunks[1]);
        }
    }
}

fn draw_record_list(f: &mut Frame, state: &RenderState, area: Rect) {
    let items: Vec<ListItem> = state
        .records
        .iter()
        .map(|record| {
            let def = &record.definition;
            let mut spans = vec![
                Span::styled(
                    format!("{:7}", def.method.as_str()),
                    Style::default().fg(method_color(def.method)).bold(),
                ),
                Span::raw(def.name.clone()),
            ];
            if record.is_loading() {
                spans.push(Span::styled(" [...]", Style::default().fg(Color::Yellow)));
            } else if record.last_error.is_some() {
                spans.push(Span::styled(" !", Style::default().fg(Color::Red)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Requests ({}) ", state.records.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).bold());

    let mut list_state = ListState::default();
    if !state.records.is_empty() {
        list_state.select(Some(state.selected));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_record(f: &mut Frame, state: &RenderState, record: &RequestRecord, area: Rect) {
    let header_rows = record.definition.headers.len().clamp(1, 5) as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),           // Name + Method
            Constraint::Length(3),           // Url
            Constraint::Length(header_rows), // Headers
            Constraint::Length(7),           // Body
            Constraint::Min(5),              // Response
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(12)])
        .split(chunks[0]);

    draw_text_field(f, state, Field::Name, &record.definition.name, " Name ", top[0]);
    draw_method(f, state, record, top[1]);
    draw_text_field(f, state, Field::Url, &record.definition.url, " URL ", chunks[1]);
    draw_headers(f, state, record, chunks[2]);
    draw_text_field(f, state, Field::Body, &record.definition.body, " Body ", chunks[3]);
    draw_response(f, state, record, chunks[4]);
}

/// A text field showing the edit buffer while it is being edited
fn draw_text_field(
    f: &mut Frame,
    state: &RenderState,
    field: Field,
    value: &str,
    title: &str,
    area: Rect,
) {
    let is_editing = state.is_editing(EditTarget::Field(field));
    let is_focused = state.focus.field() == Some(field);
    let text = if is_editing { state.input.buffer.as_str() } else { value };

    let mut paragraph = Paragraph::new(text).block(field_block(title, is_focused, is_editing));
    if field == Field::Body {
        let scroll = if is_editing {
            (state.input.cursor_line() as u16).saturating_sub(area.height.saturating_sub(3))
        } else {
            0
        };
        paragraph = paragraph.scroll((scroll, 0));
    }
    f.render_widget(paragraph, area);

    if is_editing {
        set_cursor(f, area, state);
    }
}

fn draw_method(f: &mut Frame, state: &RenderState, record: &RequestRecord, area: Rect) {
    let method = record.definition.method;
    let block = field_block(" Method ", state.focus == Focus::Method, false);
    let text = Paragraph::new(Span::styled(
        method.as_str(),
        Style::default().fg(method_color(method)).bold(),
    ))
    .block(block);
    f.render_widget(text, area);
}

fn draw_headers(f: &mut Frame, state: &RenderState, record: &RequestRecord, area: Rect) {
    let is_focused = state.focus == Focus::Headers;
    let headers = &record.definition.headers;

    let items: Vec<ListItem> = if headers.is_empty() {
        vec![ListItem::new(Span::styled(
            "No headers",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        headers
            .iter()
            .map(|(key, value)| {
                ListItem::new(Line::from(vec![
                    Span::styled(key.clone(), Style::default().fg(Color::Cyan)),
                    Span::raw(": "),
                    Span::raw(value.clone()),
                ]))
            })
            .collect()
    };

    let title = if is_focused {
        " Headers (n:new x:delete) "
    } else {
        " Headers "
    };
    let list = List::new(items)
        .block(field_block(title, is_focused, false))
        .highlight_style(Style::default().fg(Color::Yellow).bold());

    let mut list_state = ListState::default();
    if is_focused && !headers.is_empty() {
        list_state.select(Some(state.selected_header));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_response(f: &mut Frame, state: &RenderState, record: &RequestRecord, area: Rect) {
    let is_focused = state.focus == Focus::Response;

    let mut block = field_block("", is_focused, false);
    let mut lines: Vec<Line> = Vec::new();

    if let Some(error) = &record.last_error {
        lines.push(Line::from(vec![
            Span::styled("Error: ", Style::default().fg(Color::Red).bold()),
            Span::raw(error.clone()),
        ]));
    }

    match &record.last_response {
        Some(response) => {
            block = block
                .title(Span::styled(
                    format!(" {} ", response.status),
                    Style::default().fg(status_color(response.status)).bold(),
                ))
                .title_bottom(
                    Line::from(format!(
                        " {}ms at {} ",
                        response.time_ms,
                        response.received_at.with_timezone(&chrono::Local).format("%H:%M:%S")
                    ))
                    .right_aligned(),
                );
            for (key, value) in response.headers.iter() {
                lines.push(Line::from(Span::styled(
                    format!("{}: {}", key, value),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.push(Line::default());
            lines.extend(response_body_lines(response));
        }
        None => {
            block = block.title(" Response ");
            if !record.is_loading() && record.last_error.is_none() {
                lines.push(Line::from(Span::styled(
                    "No response yet. Press 's' to send.",
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }

    if record.is_loading() {
        block = block.title(Span::styled(" Sending... ", Style::default().fg(Color::Yellow)));
    }

    let response = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((state.response_scroll, 0));
    f.render_widget(response, area);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let fresh = state
        .notification
        .as_ref()
        .filter(|n| (chrono::Utc::now() - n.at).num_seconds() < NOTIFICATION_SECS);

    let bar = match fresh {
        Some(n) => {
            let color = if n.is_error { Color::Red } else { Color::Green };
            Paragraph::new(format!(" {} ", n.text)).style(Style::default().fg(color))
        }
        None => {
            let hint = match (state.screen, state.input_mode) {
                (Screen::Prompt, _) => " Enter:open | Esc:quit ",
                (Screen::Session, InputMode::Editing) => " Esc:stop editing | arrows:move ",
                (Screen::Session, InputMode::Normal) => {
                    " Tab:field | j/k:request | e:edit | s:send | w:save | ?:help | q:quit "
                }
            };
            Paragraph::new(hint).style(Style::default().fg(Color::DarkGray))
        }
    };
    f.render_widget(bar, area);
}

fn draw_header_input_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let popup_area = centered_rect(60, 20, area);
    let input_area = Rect {
        height: 3.min(popup_area.height),
        ..popup_area
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" New header (Key: Value) ")
        .style(Style::default().bg(Color::Black));
    let input = Paragraph::new(state.input.buffer.as_str()).block(block);

    f.render_widget(Clear, input_area);
    f.render_widget(input, input_area);
    set_cursor(f, input_area, state);
}

fn draw_confirmation(f: &mut Frame, message: &str, area: Rect) {
    let popup_area = centered_rect(50, 20, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Confirm ")
        .style(Style::default().bg(Color::Black));

    let text = vec![
        Line::from(message.to_string()).centered(),
        Line::default(),
        Line::from(vec![
            Span::styled("[y] Yes", Style::default().fg(Color::Green).bold()),
            Span::raw("   "),
            Span::styled("[n] No", Style::default().fg(Color::Red).bold()),
        ])
        .centered(),
    ];

    let confirmation = Paragraph::new(text).block(block).wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(confirmation, popup_area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 POSTPERSON - Keyboard Shortcuts

 NAVIGATION
   j / k              Next / previous request
   Tab / Shift+Tab    Next / previous field
   ↑ / ↓              Requests, headers or response scroll

 REQUEST
   a                  Add request
   d                  Delete request
   e / Enter          Edit field (Enter on Method cycles it)
   m                  Cycle HTTP method
   s                  Send request

 HEADERS
   n                  Add header as Key: Value
   x                  Delete selected header

 GENERAL
   w / Ctrl+S         Save session
   Esc                Close session
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

/// Put the terminal cursor at the edit position inside a bordered area
fn set_cursor(f: &mut Frame, area: Rect, state: &RenderState) {
    let inner_height = area.height.saturating_sub(2);
    let line = (state.input.cursor_line() as u16).min(inner_height.saturating_sub(1));
    let max_x = area.x + area.width.saturating_sub(2);
    let cursor_x = (area.x + state.input.cursor_column() as u16 + 1).min(max_x);
    f.set_cursor_position(Position::new(cursor_x, area.y + 1 + line));
}
