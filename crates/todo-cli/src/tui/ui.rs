//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use todo_core::{ListState as LoadState, SlotStore, TodoApi};

use super::app::{App, InputMode};
use crate::output::display_title;

/// Main UI rendering function
pub fn draw<A: TodoApi, S: SlotStore>(frame: &mut Frame, app: &App<A, S>) {
    // Create vertical layout for status bar at the bottom
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    match app.state() {
        LoadState::Loading => draw_loading(frame, chunks[0]),
        LoadState::Error(msg) => draw_load_error(frame, msg, chunks[0]),
        LoadState::Ready => draw_todos(frame, app, chunks[0]),
    }

    // Draw status bar or draft input
    match app.input_mode {
        InputMode::Normal => draw_status_bar(frame, app, chunks[1]),
        InputMode::Draft => draw_draft_input(frame, app, chunks[1]),
    }

    if app.show_help {
        draw_help_overlay(frame);
    }

    if let Some(msg) = &app.error_message {
        draw_error_modal(frame, msg);
    }
}

fn list_block(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD))
}

fn draw_loading(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        "Loading...",
        Style::default().add_modifier(Modifier::DIM),
    )))
    .block(list_block(" Todos ".to_string()));

    frame.render_widget(paragraph, area);
}

fn draw_load_error(frame: &mut Frame, msg: &str, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            format!("Error: {}", msg),
            Style::default().fg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press r to retry",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(list_block(" Todos ".to_string()))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Draw the todo list in display order
fn draw_todos<A: TodoApi, S: SlotStore>(frame: &mut Frame, app: &App<A, S>, area: Rect) {
    let todos = app.todos();
    let done = todos.iter().filter(|t| t.completed).count();
    let block = list_block(format!(" Todos ({}/{}) ", done, todos.len()));

    if todos.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "No todos yet. Press a to add one.",
            Style::default().add_modifier(Modifier::DIM),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = todos
        .iter()
        .map(|todo| {
            let (mark, style) = if todo.completed {
                (
                    "[x] ",
                    Style::default()
                        .add_modifier(Modifier::DIM)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                ("[ ] ", Style::default())
            };

            ListItem::new(Line::from(vec![
                Span::raw(mark),
                Span::styled(display_title(&todo.title), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED),
    );

    let mut state = ListState::default();
    state.select(Some(app.selected));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the status bar at the bottom
fn draw_status_bar<A: TodoApi, S: SlotStore>(frame: &mut Frame, app: &App<A, S>, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else {
        let loaded = app
            .last_loaded
            .map(|t| format!("  loaded {}", t.format("%H:%M:%S")))
            .unwrap_or_default();
        format!(
            "a:add  space:toggle  J/K:move  d:del  r:refresh  ?:help  q:quit{}",
            loaded
        )
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Draw the draft input at the bottom
fn draw_draft_input<A: TodoApi, S: SlotStore>(frame: &mut Frame, app: &App<A, S>, area: Rect) {
    let prefix = "new: ";

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::Yellow)),
        Span::raw(app.draft.text()),
    ]);

    frame.render_widget(Paragraph::new(line), area);

    // Position cursor
    let cursor_x = area
        .x
        .saturating_add(prefix.len() as u16)
        .saturating_add(u16::try_from(app.draft.cursor()).unwrap_or(u16::MAX));
    frame.set_cursor_position((cursor_x, area.y));
}

/// Centered popup of at most `width` x `height`
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let area = popup_area(frame.area(), 46, 18);
    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("  j/k, ↑/↓        Select next/previous"),
        Line::from("  g/G             Select first/last"),
        Line::from("  J/K, Shift+↑/↓  Move todo down/up"),
        Line::from("  space, Enter    Toggle completed"),
        Line::from("  a               Add todo"),
        Line::from("  d               Delete todo"),
        Line::from("  r               Refresh"),
        Line::from("  ?               Help"),
        Line::from("  q               Quit"),
        Line::from(""),
        Line::from("While adding: Enter saves, Esc cancels"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let paragraph = Paragraph::new(help_text).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(paragraph, area);
}

/// Draw an error popup; any key dismisses it
fn draw_error_modal(frame: &mut Frame, msg: &str) {
    let area = popup_area(frame.area(), 60, 8);
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(msg.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to dismiss",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use todo_core::{MemorySlotStore, MemoryTodoApi, NewTodo, OrderReconciler, TodoList};

    type TestApp = App<MemoryTodoApi, Arc<MemorySlotStore>>;

    fn app(todos: Vec<todo_core::Todo>) -> TestApp {
        App::new(TodoList::new(
            MemoryTodoApi::with_todos(todos),
            OrderReconciler::new(Arc::new(MemorySlotStore::new()), "taskOrder"),
            1,
        ))
    }

    fn render(app: &TestApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_draws_loading() {
        let app = app(vec![]);
        assert!(render(&app).contains("Loading..."));
    }

    #[tokio::test]
    async fn test_draws_todos_in_view_order() {
        let mut todo = NewTodo::new(1, "water plants").with_id(1);
        todo.completed = true;
        let mut app = app(vec![todo, NewTodo::new(1, "").with_id(2)]);
        app.refresh().await;

        let screen = render(&app);
        assert!(screen.contains("Todos (1/2)"));
        let untitled = screen.find("[ ] (untitled)").unwrap();
        let plants = screen.find("[x] water plants").unwrap();
        assert!(untitled < plants);
    }

    #[test]
    fn test_draws_long_draft() {
        let mut app = app(vec![]);
        app.enter_draft_mode();
        app.draft.set("x".repeat(70_000));

        let screen = render(&app);
        assert!(screen.contains("new: xxx"));
    }

    #[tokio::test]
    async fn test_draws_load_error() {
        let mut app = app(vec![]);
        app.list.api().fail_with(502);
        app.refresh().await;

        let screen = render(&app);
        assert!(screen.contains("Error:"));
        assert!(screen.contains("502"));
    }
}
