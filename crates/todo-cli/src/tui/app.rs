//! Application state and logic

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use todo_core::{Draft, ListError, ListState, SlotStore, Todo, TodoApi, TodoList};

use crate::output::display_title;

/// How long a status message stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Typing the title of a new todo
    Draft,
}

/// Application state
pub struct App<A, S> {
    /// The synchronized list
    pub list: TodoList<A, S>,
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Title being typed for a new todo
    pub draft: Draft,
    /// Currently selected view index
    pub selected: usize,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Error shown in a modal until a key is pressed
    pub error_message: Option<String>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// When the list last loaded successfully
    pub last_loaded: Option<DateTime<Local>>,
}

impl<A: TodoApi, S: SlotStore> App<A, S> {
    /// Create an app around a list that has not been fetched yet
    pub fn new(list: TodoList<A, S>) -> Self {
        Self {
            list,
            should_quit: false,
            input_mode: InputMode::Normal,
            draft: Draft::new(),
            selected: 0,
            status_message: None,
            status_message_time: None,
            error_message: None,
            show_help: false,
            last_loaded: None,
        }
    }

    /// Items in display order
    pub fn todos(&self) -> &[Todo] {
        self.list.view()
    }

    pub fn state(&self) -> &ListState {
        self.list.state()
    }

    /// Get the currently selected todo
    pub fn current_todo(&self) -> Option<&Todo> {
        self.todos().get(self.selected)
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    /// Show a failed operation in the error modal, with a hint when one exists
    pub fn report(&mut self, err: ListError) {
        match err.recovery_suggestion() {
            Some(hint) => self.set_error(format!("{}\n\n{}", err, hint)),
            None => self.set_error(err.to_string()),
        }
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Move selection up
    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Move selection down
    pub fn move_down(&mut self) {
        if self.selected < self.todos().len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    /// Select the first item (vim 'g')
    pub fn move_to_first(&mut self) {
        self.selected = 0;
    }

    /// Select the last item (vim 'G')
    pub fn move_to_last(&mut self) {
        self.selected = self.todos().len().saturating_sub(1);
    }

    /// Keep the selection inside the view after it changed size
    fn clamp_selection(&mut self) {
        let len = self.todos().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Refetch the list
    ///
    /// A failed fetch shows up through the list's `Error` state, not the
    /// error modal.
    pub async fn refresh(&mut self) {
        if self.list.refresh().await.is_ok() {
            self.last_loaded = Some(Local::now());
        }
        self.clamp_selection();
    }

    /// Flip completed on the selected todo
    pub async fn toggle_current(&mut self) {
        let Some(todo) = self.current_todo() else {
            return;
        };
        let id = todo.id;

        match self.list.toggle(id).await {
            Ok(todo) => {
                let state = if todo.completed { "Completed" } else { "Reopened" };
                self.set_status(format!("{} '{}'", state, display_title(&todo.title)));
            }
            Err(e) => self.report(e),
        }
        self.clamp_selection();
    }

    /// Delete the selected todo
    pub async fn delete_current(&mut self) {
        let Some(todo) = self.current_todo().cloned() else {
            return;
        };

        match self.list.delete(todo.id).await {
            Ok(()) => self.set_status(format!("Deleted '{}'", display_title(&todo.title))),
            Err(e) => self.report(e),
        }
        self.clamp_selection();
    }

    /// Move the selected todo one place up, keeping it selected
    pub fn move_current_up(&mut self) {
        if self.selected > 0 {
            self.reorder(self.selected, self.selected - 1);
        }
    }

    /// Move the selected todo one place down, keeping it selected
    pub fn move_current_down(&mut self) {
        if self.selected + 1 < self.todos().len() {
            self.reorder(self.selected, self.selected + 1);
        }
    }

    fn reorder(&mut self, from: usize, to: usize) {
        match self.list.reorder(from, Some(to)) {
            Ok(_) => self.selected = to,
            Err(e) => self.report(e),
        }
    }

    /// Start typing a new todo
    pub fn enter_draft_mode(&mut self) {
        self.input_mode = InputMode::Draft;
    }

    /// Leave draft mode; the typed text is kept for next time
    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Create a todo from the draft
    ///
    /// The draft is cleared whether or not the create succeeds.
    pub async fn submit_draft(&mut self) {
        self.input_mode = InputMode::Normal;

        match self.list.submit(&mut self.draft).await {
            Ok(todo) => {
                if let Some(index) = self.list.position(todo.id) {
                    self.selected = index;
                }
                self.set_status(format!("Added '{}'", display_title(&todo.title)));
            }
            Err(e) => self.report(e),
        }
        self.clamp_selection();
    }
}
