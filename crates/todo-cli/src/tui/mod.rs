//! todo TUI
//!
//! Terminal user interface for the todo list.
//!
//! ## Navigation
//!
//! - j/k or ↑/↓: Move selection down/up
//! - g/G: Jump to first/last
//! - q: Quit
//!
//! ## Commands
//!
//! - J/K or Shift+↓/↑: Move the selected todo (saves the display order)
//! - space/Enter: Toggle completed
//! - a: Add todo
//! - d: Delete todo
//! - r: Refresh
//! - ?: Help

mod app;
mod poller;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use todo_core::{Config, SlotStore, TodoApi, TodoList};
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::{App, InputMode};
use poller::{PollerCommand, PollerEvent, PollerHandle};

/// Run the TUI application
pub async fn run(config: Config) -> Result<()> {
    // Initialize TUI logging (file-based, only if TODO_LOG is set)
    init_tui_logging(&config);

    let list = TodoList::open_with_config(&config)?;
    let mut app = App::new(list);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let poller = config.refresh_interval().map(poller::spawn_refresh_poller);

    // Run app
    let result = run_app(&mut terminal, &mut app, poller).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend, A: TodoApi, S: SlotStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<A, S>,
    mut poller: Option<PollerHandle>,
) -> Result<()> {
    // Show the loading state while the first fetch runs
    terminal.draw(|frame| ui::draw(frame, app))?;
    app.refresh().await;

    loop {
        let mut poller_closed = false;

        // Check for status message timeout
        app.check_status_timeout();

        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            biased;

            // Periodic refresh (if enabled)
            poll_event = async {
                if let Some(ref mut handle) = poller {
                    handle.event_rx.recv().await
                } else {
                    // Never resolves without a poller
                    std::future::pending::<Option<PollerEvent>>().await
                }
            } => {
                match poll_event {
                    Some(PollerEvent::RefreshDue) => {
                        // Don't swap the list under a half-typed draft's selection
                        if app.input_mode == InputMode::Normal {
                            app.refresh().await;
                        }
                    }
                    None => poller_closed = true,
                }
            }

            // Poll for terminal events
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        // Only handle key press events (not release)
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }

                        // If error modal is showing, any key dismisses it
                        if app.has_error() {
                            app.clear_error();
                            continue;
                        }

                        // If help is showing, any key dismisses it
                        if app.show_help {
                            app.show_help = false;
                            continue;
                        }

                        match app.input_mode {
                            InputMode::Normal => {
                                handle_normal_mode(terminal, app, key.code, key.modifiers).await?
                            }
                            InputMode::Draft => {
                                handle_draft_mode(terminal, app, key.code, key.modifiers).await?
                            }
                        }
                    }
                }
            }
        }

        if poller_closed {
            poller = None;
        }

        if app.should_quit {
            if let Some(handle) = poller.take() {
                let _ = handle.command_tx.send(PollerCommand::Shutdown).await;
            }
            break;
        }
    }

    Ok(())
}

/// Handle key events in normal mode
async fn handle_normal_mode<B: Backend, A: TodoApi, S: SlotStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<A, S>,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<()> {
    // Clear status message on navigation keys
    if matches!(
        code,
        KeyCode::Char('j') | KeyCode::Char('k') | KeyCode::Up | KeyCode::Down
    ) {
        app.status_message = None;
    }

    match code {
        // Quit
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        // Move the selected todo
        KeyCode::Char('K') => app.move_current_up(),
        KeyCode::Up if modifiers.contains(KeyModifiers::SHIFT) => app.move_current_up(),
        KeyCode::Char('J') => app.move_current_down(),
        KeyCode::Down if modifiers.contains(KeyModifiers::SHIFT) => app.move_current_down(),

        // Navigation
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('g') | KeyCode::Home => app.move_to_first(),
        KeyCode::Char('G') | KeyCode::End => app.move_to_last(),

        // Commands
        KeyCode::Char(' ') | KeyCode::Enter => {
            app.toggle_current().await;
        }
        KeyCode::Char('a') => {
            app.enter_draft_mode();
        }
        KeyCode::Char('d') => {
            app.delete_current().await;
        }
        KeyCode::Char('r') => {
            show_loading(terminal, app)?;
            app.refresh().await;
            if app.list.is_ready() {
                app.set_status("Refreshed");
            }
        }
        KeyCode::Char('?') => {
            app.toggle_help();
        }

        _ => {}
    }

    Ok(())
}

/// Handle key events while typing a new todo
async fn handle_draft_mode<B: Backend, A: TodoApi, S: SlotStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<A, S>,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<()> {
    match code {
        // Cancel
        KeyCode::Esc => {
            app.exit_input_mode();
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.exit_input_mode();
        }

        // Submit
        KeyCode::Enter => {
            show_loading(terminal, app)?;
            app.submit_draft().await;
        }

        // Text input
        KeyCode::Char(c) => app.draft.insert_char(c),
        KeyCode::Backspace => app.draft.delete_char(),
        KeyCode::Left => app.draft.cursor_left(),
        KeyCode::Right => app.draft.cursor_right(),

        _ => {}
    }

    Ok(())
}

/// Redraw with a pending-request hint before a blocking remote call
fn show_loading<B: Backend, A: TodoApi, S: SlotStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<A, S>,
) -> Result<()> {
    app.set_status("Working...");
    terminal.draw(|frame| ui::draw(frame, app))?;
    Ok(())
}

/// Initialize logging for TUI mode
///
/// Only initializes if TODO_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var("TODO_LOG") else {
        return;
    };

    let log_path = config.log_path();

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("todo_core={},todo_cli={}", log_level, log_level));

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
