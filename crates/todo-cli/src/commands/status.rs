//! Status command handler

use std::path::PathBuf;

use anyhow::Result;

use todo_core::{Config, FileSlotStore, HttpTodoApi, OrderReconciler, TodoApi};

use crate::output::{Output, OutputFormat};

/// Show status information
///
/// Reports the saved order and whether the API answers. An unreachable API
/// is part of the report, not an error.
pub async fn show(config: &Config, config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let reconciler =
        OrderReconciler::new(FileSlotStore::new(&config.data_dir), &config.order_key);
    let order_len = reconciler.load()?.map(|o| o.len());

    let api = HttpTodoApi::from_config(config)?;
    let reachable = match api.fetch_all().await {
        Ok(todos) => Ok(todos.len()),
        Err(e) => Err(e.to_string()),
    };

    let config_file = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "api_url": api.base_url(),
                    "api_reachable": reachable.is_ok(),
                    "api_error": reachable.as_ref().err(),
                    "todos": reachable.as_ref().ok(),
                    "data_dir": config.data_dir,
                    "order_key": config.order_key,
                    "saved_order_len": order_len,
                    "config_file": config_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", if reachable.is_ok() { "ok" } else { "unreachable" });
        }
        OutputFormat::Human => {
            println!("todo Status");
            println!("===========");
            println!();
            println!("API:");
            println!("  URL:    {}", api.base_url());
            match &reachable {
                Ok(count) => println!("  Status: reachable ({} todo(s))", count),
                Err(e) => println!("  Status: unreachable ({})", e),
            }
            println!();
            println!("Display order:");
            println!("  Location: {}", config.data_dir.display());
            println!("  Key:      {}", config.order_key);
            match order_len {
                Some(len) => println!("  Saved:    {} id(s)", len),
                None => println!("  Saved:    (none yet)"),
            }
            println!();
            println!("Config file: {}", config_file.display());
        }
    }

    Ok(())
}
