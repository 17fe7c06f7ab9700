//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use filevault_core::config::AppConfig;
use filevault_core::error::AppError;
use filevault_core::result::AppResult;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (the default)
    Show,
    /// Check that the configuration can open a store
    Validate,
    /// Write the default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(args: &ConfigArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    match args.command.as_ref().unwrap_or(&ConfigCommand::Show) {
        ConfigCommand::Show => match format {
            OutputFormat::Json => output::print_json(config),
            OutputFormat::Table => {
                let value = serde_json::to_value(config)?;
                print_section("", &value);
            }
        },
        ConfigCommand::Validate => {
            config.validate()?;
            let store = super::open_store(config).await?;
            if !store.health_check().await? {
                return Err(AppError::storage(format!(
                    "Storage provider '{}' is not reachable",
                    config.storage.provider
                )));
            }
            output::print_success("Configuration is valid");
            output::print_kv("Provider", &config.storage.provider);
            output::print_kv("Data root", &config.storage.data_root);
            output::print_kv(
                "Catalog",
                &config
                    .store
                    .catalog_path(&config.storage.data_root)
                    .display()
                    .to_string(),
            );
            output::print_kv(
                "Persistence",
                if store.persists_catalog() { "catalog" } else { "none" },
            );
        }
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path)
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
            {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::internal(format!("Failed to create dir: {e}")))?;
            }

            tokio::fs::write(out_path, default_config)
                .await
                .map_err(|e| AppError::internal(format!("Failed to write config: {e}")))?;

            output::print_success(&format!("Default config written to '{out_path}'"));
        }
    }

    Ok(())
}

fn print_section(prefix: &str, value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                print_section(&path, child);
            }
        }
        serde_json::Value::Null => output::print_kv(prefix, "(unset)"),
        other => output::print_kv(prefix, &other.to_string()),
    }
}
