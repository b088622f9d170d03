//! Todo command handlers

use anyhow::{bail, Result};

use todo_core::{Draft, SlotStore, TodoApi, TodoList};

use crate::output::{display_title, Output};

/// List todos in display order
pub async fn list<A: TodoApi, S: SlotStore>(
    list: &mut TodoList<A, S>,
    output: &Output,
) -> Result<()> {
    list.refresh().await?;
    output.print_todos(list.view());
    Ok(())
}

/// Create a new todo
pub async fn add<A: TodoApi, S: SlotStore>(
    list: &mut TodoList<A, S>,
    title: String,
    output: &Output,
) -> Result<()> {
    let mut draft = Draft::new();
    draft.set(title);

    let todo = list.submit(&mut draft).await?;

    output.success(&format!("Created todo #{}", todo.id));
    if !output.is_quiet() {
        output.print_todo(&todo);
    }
    Ok(())
}

/// Flip a todo between open and completed
pub async fn toggle<A: TodoApi, S: SlotStore>(
    list: &mut TodoList<A, S>,
    id: i64,
    output: &Output,
) -> Result<()> {
    list.refresh().await?;
    let todo = list.toggle(id).await?;

    let state = if todo.completed { "completed" } else { "open" };
    output.success(&format!(
        "Marked '{}' as {}",
        display_title(&todo.title),
        state
    ));
    Ok(())
}

/// Delete a todo
pub async fn remove<A: TodoApi, S: SlotStore>(
    list: &mut TodoList<A, S>,
    id: i64,
    output: &Output,
) -> Result<()> {
    list.refresh().await?;
    let title = list.get(id).map(|t| display_title(&t.title));

    list.delete(id).await?;

    match title {
        Some(title) => output.success(&format!("Deleted '{}'", title)),
        None => output.success(&format!("Deleted todo #{}", id)),
    }
    Ok(())
}

/// Move the todo at 1-based position `from` to position `to`
pub async fn move_to<A: TodoApi, S: SlotStore>(
    list: &mut TodoList<A, S>,
    from: usize,
    to: usize,
    output: &Output,
) -> Result<()> {
    list.refresh().await?;

    let len = list.view().len();
    let from = to_index(from, len)?;
    let to = to_index(to, len)?;

    list.reorder(from, Some(to))?;
    output.print_todos(list.view());
    Ok(())
}

/// Convert a 1-based list position into a view index
fn to_index(position: usize, len: usize) -> Result<usize> {
    if len == 0 {
        bail!("The list is empty, nothing to move");
    }
    if position == 0 || position > len {
        bail!(
            "Position {} is out of range. Use a number between 1 and {}.",
            position,
            len
        );
    }
    Ok(position - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use std::sync::Arc;
    use todo_core::{MemorySlotStore, MemoryTodoApi, NewTodo, OrderReconciler};

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    type TestList = TodoList<MemoryTodoApi, Arc<MemorySlotStore>>;

    fn list_of(titles: &[&str]) -> (Arc<MemorySlotStore>, TestList) {
        let todos = titles
            .iter()
            .enumerate()
            .map(|(i, t)| NewTodo::new(1, *t).with_id(i as i64 + 1))
            .collect();
        let store = Arc::new(MemorySlotStore::new());
        let list = TodoList::new(
            MemoryTodoApi::with_todos(todos),
            OrderReconciler::new(Arc::clone(&store), "taskOrder"),
            1,
        );
        (store, list)
    }

    #[test]
    fn test_to_index() {
        assert_eq!(to_index(1, 3).unwrap(), 0);
        assert_eq!(to_index(3, 3).unwrap(), 2);
        assert!(to_index(0, 3).is_err());
        assert!(to_index(4, 3).is_err());
        assert!(to_index(1, 0).is_err());
    }

    #[tokio::test]
    async fn test_move_persists_order() {
        let (store, mut list) = list_of(&["a", "b", "c"]);

        // Newest first: c, b, a; move c to the bottom
        move_to(&mut list, 1, 3, &quiet()).await.unwrap();
        assert_eq!(store.get("taskOrder").unwrap().as_deref(), Some("[2,1,3]"));
    }

    #[tokio::test]
    async fn test_add_and_remove() {
        let (store, mut list) = list_of(&["a", "b"]);
        list.refresh().await.unwrap();

        add(&mut list, "c".to_string(), &quiet()).await.unwrap();
        assert_eq!(list.view()[0].title, "c");

        remove(&mut list, 3, &quiet()).await.unwrap();
        assert_eq!(list.view().len(), 2);
        assert_eq!(store.get("taskOrder").unwrap().as_deref(), Some("[2,1]"));
    }

    #[tokio::test]
    async fn test_toggle_unknown_id() {
        let (_store, mut list) = list_of(&["a"]);
        let err = toggle(&mut list, 7, &quiet()).await.unwrap_err();
        assert!(err.to_string().contains("7"));
    }
}
