//! todo CLI
//!
//! Command-line interface for todo - a remote todo list with a local
//! display order.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use todo_core::{Config, TodoList};

mod commands;
mod output;
mod tui;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "todo - A remote todo list that remembers your order")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// List todos in display order
    #[command(alias = "ls")]
    List,
    /// Create a new todo
    Add {
        /// Title of the new todo (may be empty)
        title: String,
    },
    /// Flip a todo between open and completed
    Toggle {
        /// Todo ID
        id: i64,
    },
    /// Delete a todo
    #[command(alias = "delete")]
    Rm {
        /// Todo ID
        id: i64,
    },
    /// Move a todo to another position (1-based, as shown by `list`)
    #[command(alias = "mv")]
    Move {
        /// Current position
        from: usize,
        /// New position
        to: usize,
    },
    /// Show or reset the saved display order
    Order {
        #[command(subcommand)]
        command: Option<OrderCommands>,
    },
    /// Show status (API, local storage, saved order)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum OrderCommands {
    /// Print the saved order of todo IDs
    Show,
    /// Forget the saved order; the next load starts from newest first
    Reset,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, data_dir, user_id, order_key, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {:#}", err);
        if let Some(hint) = output::recovery_hint(&err) {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Commands that don't need a loaded configuration
    if let Some(Commands::Config { command }) = &cli.command {
        return match command {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    // Handle TUI (default when no command given); it logs to a file instead
    if matches!(&cli.command, Some(Commands::Tui) | None) {
        return tui::run(config).await;
    }

    init_cli_logging();

    let Some(command) = cli.command else {
        return Ok(());
    };

    match command {
        Commands::Order { command } => match command {
            Some(OrderCommands::Show) | None => commands::order::show(&config, &output),
            Some(OrderCommands::Reset) => commands::order::reset(&config, &output),
        },
        Commands::Status => commands::status::show(&config, config_path, &output).await,
        command => {
            let mut list = TodoList::open_with_config(&config)?;
            match command {
                Commands::List => commands::todo::list(&mut list, &output).await,
                Commands::Add { title } => commands::todo::add(&mut list, title, &output).await,
                Commands::Toggle { id } => commands::todo::toggle(&mut list, id, &output).await,
                Commands::Rm { id } => commands::todo::remove(&mut list, id, &output).await,
                Commands::Move { from, to } => {
                    commands::todo::move_to(&mut list, from, to, &output).await
                }
                // Dispatched above
                Commands::Tui
                | Commands::Order { .. }
                | Commands::Status
                | Commands::Config { .. } => Ok(()),
            }
        }
    }
}

/// Initialize logging for CLI commands
///
/// Only initializes if TODO_LOG environment variable is set.
/// Logs go to stderr so they never mix with command output.
fn init_cli_logging() {
    let Ok(log_level) = std::env::var("TODO_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!("todo_core={},todo_cli={}", log_level, log_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
