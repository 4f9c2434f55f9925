//! TurfScout - terminal client for the turf listing API
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine owning the listing store
//! - Network Layer (Tokio) - async API calls

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use turfscout::app::{AppActor, AppState};
use turfscout::config::Config;
use turfscout::constants::{APP_NAME, APP_VERSION, LOG_FILE_NAME};
use turfscout::messages::ui_events::{key_to_ui_event, AppTab, InputMode};
use turfscout::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use turfscout::network::{ApiClient, NetworkActor};
use turfscout::ui::{pagination_label, render_form, render_tabs, status_color, turf_details, turf_row};

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
    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE_NAME);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let config = Config::load().context("loading configuration")?;
    let credentials = config.credentials();
    tracing::info!(
        version = APP_VERSION,
        api = %config.api_base_url,
        authenticated = !credentials.is_anonymous(),
        "Starting"
    );
    let client = ApiClient::new(config.api_base_url.clone(), credentials.clone())?;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _terminal_guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(Arc::new(client), net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let state = AppState::new(config.api_base_url.clone(), !credentials.is_anonymous());
    let app_actor = AppActor::new(state, net_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    tracing::info!("Shutting down");
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
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(
                    key,
                    current_state.active_tab,
                    current_state.input_mode,
                    current_state.show_help,
                    current_state.edit_form.is_some(),
                    current_state.confirm_delete.is_some(),
                ) {
                    let quit = matches!(event, UiEvent::Quit);
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
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
            Constraint::Length(1), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_tab_bar(f, state, main_chunks[0]);

    match state.active_tab {
        AppTab::Browse => draw_browse_tab(f, state, main_chunks[1]),
        AppTab::Create => draw_create_tab(f, state, main_chunks[1]),
    }

    draw_status_bar(f, state, main_chunks[2]);

    // Popups
    if let Some(form) = &state.edit_form {
        let popup_area = centered_rect(70, 50, area);
        let title = if state.edit_pending {
            format!(" {} [saving...] ", form.title())
        } else {
            format!(" {} (Enter/Ctrl+S save, Esc cancel) ", form.title())
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title)
            .style(Style::default().bg(Color::Black));
        f.render_widget(Clear, popup_area);
        f.render_widget(Paragraph::new(render_form(form, true)).block(block), popup_area);
    }

    if let Some(turf) = &state.confirm_delete {
        let popup_area = centered_rect(50, 20, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Delete turf ")
            .style(Style::default().bg(Color::Black));
        let text = format!("Delete #{} {}?\n\n y: delete    n: keep", turf.id, turf.name);
        f.render_widget(Clear, popup_area);
        f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: false }), popup_area);
    }

    if state.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_tab_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(40)])
        .split(area);

    let selected = match state.active_tab {
        AppTab::Browse => 0,
        AppTab::Create => 1,
    };
    f.render_widget(render_tabs(&[" 1:Turfs ", " 2:Create "], selected), chunks[0]);

    let account = if state.authenticated { "signed in" } else { "anonymous" };
    let info = Paragraph::new(format!("{} · {} ", state.api_base_url, account))
        .style(Style::default().fg(Color::DarkGray))
        .right_aligned();
    f.render_widget(info, chunks[1]);
}

fn draw_browse_tab(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let rows: Vec<Row> = state.items.iter().map(turf_row).collect();
    let footer = pagination_label(state.phase, state.is_loading, state.items.len());

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Percentage(40),
            Constraint::Percentage(35),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["ID", "Name", "Location", "Price"])
            .style(Style::default().fg(Color::Gray).bold()),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(" Your Turfs ")
            .title_bottom(Line::from(footer).right_aligned()),
    )
    .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Green));

    let mut table_state = TableState::default();
    if !state.items.is_empty() {
        table_state.select(Some(state.selected));
    }
    f.render_stateful_widget(table, chunks[0], &mut table_state);

    let details_block = Block::default().borders(Borders::ALL).title(" Details ");
    let details = match state.items.get(state.selected) {
        Some(turf) => Paragraph::new(turf_details(turf)),
        None if state.is_loading => Paragraph::new("Loading turfs..."),
        None => Paragraph::new("No turfs to show.\n\nPress 'r' to refresh or '2' to create one."),
    };
    f.render_widget(details.block(details_block).wrap(Wrap { trim: false }), chunks[1]);
}

fn draw_create_tab(f: &mut Frame, state: &RenderState, area: Rect) {
    let editing = state.input_mode == InputMode::Editing;
    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Green)
    };
    let title = if state.create_pending {
        format!(" {} [please wait...] ", state.create_form.title())
    } else {
        format!(" {} ", state.create_form.title())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);
    let form = Paragraph::new(render_form(&state.create_form, editing)).block(block);
    f.render_widget(form, area);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    if let Some(status) = &state.status {
        let bar = Paragraph::new(format!(" {} ", status.text))
            .style(Style::default().fg(status_color(status.kind)));
        f.render_widget(bar, area);
        return;
    }

    let hint = if state.edit_form.is_some() {
        " Tab:next field | Enter:save | Esc:cancel "
    } else if state.input_mode == InputMode::Editing {
        " ESC:stop editing | Tab:next field | Ctrl+S:create "
    } else {
        match state.active_tab {
            AppTab::Browse => " j/k:move | e:edit | d:delete | r:refresh | ?:help | q:quit ",
            AppTab::Create => " e:edit | Tab:next field | s:create | ?:help | q:quit ",
        }
    };
    let bar = Paragraph::new(hint).style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = format!(
        r#"
 {} {} - Keyboard Shortcuts

 TABS
   1 / 2              Turfs / Create

 TURFS
   j / k, arrows      Move selection (loads more near the end)
   e / Enter          Edit selected turf
   d / Del            Delete selected turf
   r                  Refresh from page 1

 FORMS
   e / Enter          Start editing (Create tab)
   Tab / Shift+Tab    Next / previous field
   Ctrl+S             Submit
   Esc                Stop editing / cancel

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#,
        APP_NAME, APP_VERSION
    );

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

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
