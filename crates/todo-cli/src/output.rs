//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use todo_core::{ListError, OrderError, PersistedOrder, StorageError, Todo};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single todo
    pub fn print_todo(&self, todo: &Todo) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", todo.id);
                println!("Title:     {}", display_title(&todo.title));
                println!("Completed: {}", if todo.completed { "yes" } else { "no" });
                println!("User:      {}", todo.user_id);
            }
            OutputFormat::Json => print_json(todo),
            OutputFormat::Quiet => {
                println!("{}", todo.id);
            }
        }
    }

    /// Print todos in display order
    pub fn print_todos(&self, todos: &[Todo]) {
        match self.format {
            OutputFormat::Human => {
                if todos.is_empty() {
                    println!("No todos found.");
                    return;
                }
                let width = todos.len().to_string().len();
                for (i, todo) in todos.iter().enumerate() {
                    println!("{}", format_row(i + 1, width, todo, 60));
                }
                let done = todos.iter().filter(|t| t.completed).count();
                println!("\n{} todo(s), {} completed", todos.len(), done);
            }
            OutputFormat::Json => print_json(&todos),
            OutputFormat::Quiet => {
                for todo in todos {
                    println!("{}", todo.id);
                }
            }
        }
    }

    /// Print the persisted display order
    pub fn print_order(&self, order: Option<&PersistedOrder>) {
        match self.format {
            OutputFormat::Human => match order {
                Some(order) if !order.is_empty() => {
                    let ids: Vec<String> = order.ids().iter().map(|id| id.to_string()).collect();
                    println!("{}", ids.join(" "));
                    println!("\n{} id(s)", order.len());
                }
                _ => println!("No display order saved yet."),
            },
            OutputFormat::Json => {
                let ids = order.map(|o| o.ids()).unwrap_or(&[]);
                print_json(&ids);
            }
            OutputFormat::Quiet => {
                if let Some(order) = order {
                    for id in order.ids() {
                        println!("{}", id);
                    }
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Recovery hint for a local storage failure anywhere in the error chain
pub fn recovery_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<ListError>() {
            e.recovery_suggestion()
        } else if let Some(e) = cause.downcast_ref::<OrderError>() {
            e.recovery_suggestion()
        } else {
            cause
                .downcast_ref::<StorageError>()
                .and_then(StorageError::recovery_suggestion)
        }
    })
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON output: {}", e),
    }
}

/// One line of `todo list`: position, checkbox, id, title
fn format_row(position: usize, width: usize, todo: &Todo, max_title: usize) -> String {
    format!(
        "{:>width$}. [{}] #{} {}",
        position,
        if todo.completed { "x" } else { " " },
        todo.id,
        truncate(&display_title(&todo.title), max_title),
        width = width
    )
}

/// Empty titles are legal; show a placeholder instead of a blank
pub fn display_title(title: &str) -> String {
    if title.is_empty() {
        "(untitled)".to_string()
    } else {
        title.to_string()
    }
}

/// Truncate a string to max characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
