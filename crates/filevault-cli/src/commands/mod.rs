//! CLI command definitions and dispatch.

pub mod config;
pub mod delete;
pub mod download;
pub mod info;
pub mod update;
pub mod upload;

use clap::{Args, Parser, Subcommand};

use crate::output::{self, OutputFormat};
use filevault_core::config::AppConfig;
use filevault_core::config::storage::ProviderKind;
use filevault_core::result::AppResult;
use filevault_entity::{FileKey, LATEST_SENTINEL, VersionSelector};
use filevault_service::{FileQuery, FileStore, RequestContext};

/// FileVault: versioned, multi-tenant file store
#[derive(Debug, Parser)]
#[command(name = "filevault", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file layered over config/default.toml
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Identity to act as (defaults to --owner)
    #[arg(long = "as", value_name = "IDENTITY", global = true)]
    pub acting_as: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload a local file as a new version
    Upload(upload::UploadArgs),
    /// Show one version's attributes and metadata
    Info(VersionedKeyArgs),
    /// List the versions of one file
    Versions(KeyArgs),
    /// List an owner's files
    Files(OwnerArgs),
    /// Merge metadata into one version
    Update(update::UpdateArgs),
    /// Merge metadata into every version an owner holds
    UpdateAll(update::UpdateAllArgs),
    /// Write one version's content to a file or stdout
    Download(download::DownloadArgs),
    /// Delete one version
    Delete(VersionedKeyArgs),
    /// Delete every file an owner holds
    DeleteAll(OwnerArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

/// Identifies one file.
#[derive(Debug, Clone, Args)]
pub struct KeyArgs {
    /// Owning tenant
    #[arg(long)]
    pub owner: String,
    /// Project within the owner
    #[arg(long)]
    pub project: String,
    /// File name
    #[arg(long)]
    pub name: String,
}

impl KeyArgs {
    /// The file key.
    pub fn key(&self) -> FileKey {
        FileKey::new(&self.owner, &self.project, &self.name)
    }
}

/// Identifies one version of a file.
#[derive(Debug, Clone, Args)]
pub struct VersionedKeyArgs {
    #[command(flatten)]
    pub key: KeyArgs,
    /// Version number, or -1 for the latest
    #[arg(long, default_value_t = LATEST_SENTINEL, allow_negative_numbers = true)]
    pub version: i64,
}

impl VersionedKeyArgs {
    /// The version query.
    pub fn query(&self) -> AppResult<FileQuery> {
        let selector = VersionSelector::from_raw(self.version)?;
        Ok(FileQuery::latest(&self.key.owner, &self.key.project, &self.key.name).at(selector))
    }
}

/// Identifies an owner.
#[derive(Debug, Clone, Args)]
pub struct OwnerArgs {
    /// Owning tenant
    #[arg(long)]
    pub owner: String,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.command {
            Commands::Upload(args) => upload::execute(self, config, args).await,
            Commands::Info(args) => info::info(self, config, args).await,
            Commands::Versions(args) => info::versions(self, config, args).await,
            Commands::Files(args) => info::files(self, config, args).await,
            Commands::Update(args) => update::update(self, config, args).await,
            Commands::UpdateAll(args) => update::update_all(self, config, args).await,
            Commands::Download(args) => download::execute(self, config, args).await,
            Commands::Delete(args) => delete::delete(self, config, args).await,
            Commands::DeleteAll(args) => delete::delete_all(self, config, args).await,
            Commands::Config(args) => config::execute(args, config, self.format).await,
        }
    }

    /// Request context acting as `--as`, or as `owner` when it is absent.
    pub fn context(&self, owner: &str) -> AppResult<RequestContext> {
        RequestContext::for_identity(self.acting_as.as_deref().unwrap_or(owner))
    }
}

/// Helper: open the store described by `config`.
pub async fn open_store(config: &AppConfig) -> AppResult<FileStore> {
    FileStore::open(config).await
}

/// Helper: write the catalog back after a mutation, when enabled.
pub async fn persist(store: &FileStore, config: &AppConfig) -> AppResult<()> {
    if store.persists_catalog() {
        store.persist().await?;
    } else if config.storage.provider_kind()? == ProviderKind::Memory {
        output::print_warning("Memory provider keeps no catalog: changes end with this process");
    }
    Ok(())
}
