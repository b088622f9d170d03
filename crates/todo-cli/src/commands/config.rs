//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use todo_core::Config;

use crate::output::{Output, OutputFormat};

/// Keys accepted by `config set`
const VALID_KEYS: &str =
    "api_url, data_dir, user_id, order_key, timeout_secs, refresh_interval_secs, log_file";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "api_url": config.api_url,
                    "data_dir": config.data_dir,
                    "user_id": config.user_id,
                    "order_key": config.order_key,
                    "timeout_secs": config.timeout_secs,
                    "refresh_interval_secs": config.refresh_interval_secs,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.api_url);
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  api_url:               {}", config.api_url);
            println!("  data_dir:              {}", config.data_dir.display());
            println!("  user_id:               {}", config.user_id);
            println!("  order_key:             {}", config.order_key);
            println!("  timeout_secs:          {}", config.timeout_secs);
            println!(
                "  refresh_interval_secs: {}",
                match config.refresh_interval_secs {
                    0 => "0 (off)".to_string(),
                    secs => secs.to_string(),
                }
            );
            println!(
                "  log_file:              {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(key: &str, value: &str, config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, key, value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

/// Apply one `key = value` setting
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "api_url" => {
            if value.is_empty() {
                bail!("api_url cannot be empty");
            }
            config.api_url = value.to_string();
        }
        "data_dir" => {
            config.data_dir = value.into();
        }
        "user_id" => {
            config.user_id = value
                .parse()
                .context("Invalid value for user_id. Use an integer.")?;
        }
        "order_key" => {
            if value.is_empty() {
                bail!("order_key cannot be empty");
            }
            config.order_key = value.to_string();
        }
        "timeout_secs" => {
            config.timeout_secs = value
                .parse()
                .context("Invalid value for timeout_secs. Use a whole number of seconds.")?;
        }
        "refresh_interval_secs" => {
            config.refresh_interval_secs = value.parse().context(
                "Invalid value for refresh_interval_secs. Use a whole number of seconds (0 = off).",
            )?;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                VALID_KEYS
            );
        }
    }
    Ok(())
}
