//! Display order command handlers

use anyhow::{Context, Result};

use todo_core::{Config, FileSlotStore, OrderReconciler};

use crate::output::Output;

fn reconciler(config: &Config) -> OrderReconciler<FileSlotStore> {
    OrderReconciler::new(FileSlotStore::new(&config.data_dir), &config.order_key)
}

/// Print the saved display order
pub fn show(config: &Config, output: &Output) -> Result<()> {
    let order = reconciler(config)
        .load()
        .context("Failed to read display order")?;
    output.print_order(order.as_ref());
    Ok(())
}

/// Reset the saved display order
///
/// The next load re-initialises it from the fetched list.
pub fn reset(config: &Config, output: &Output) -> Result<()> {
    reconciler(config)
        .clear()
        .context("Failed to reset display order")?;
    output.success("Display order reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use tempfile::TempDir;
    use todo_core::{PersistedOrder, SlotStore};

    #[test]
    fn test_reset_clears_saved_order() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp.path().to_path_buf(),
            ..Config::default()
        };
        let output = Output::new(OutputFormat::Quiet);

        reconciler(&config)
            .save(&PersistedOrder::new(vec![3, 1, 2]))
            .unwrap();
        show(&config, &output).unwrap();

        reset(&config, &output).unwrap();
        let store = FileSlotStore::new(temp.path());
        assert_eq!(store.get("taskOrder").unwrap().as_deref(), Some("[]"));
    }
}
