//! Delete CLI commands.

use super::{Cli, OwnerArgs, VersionedKeyArgs};
use crate::output::{self, OutputFormat};
use filevault_core::config::AppConfig;
use filevault_core::result::AppResult;

/// Delete one version.
pub async fn delete(cli: &Cli, config: &AppConfig, args: &VersionedKeyArgs) -> AppResult<()> {
    let query = args.query()?;
    let ctx = cli.context(&query.owner)?;
    let store = super::open_store(config).await?;

    let version = store.delete(&ctx, &query).await?;
    super::persist(&store, config).await?;

    match cli.format {
        OutputFormat::Table => output::print_success(&format!(
            "Deleted {} version {version}",
            query.key()
        )),
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "owner": query.owner,
            "project": query.project,
            "name": query.name,
            "version": version,
        })),
    }
    Ok(())
}

/// Delete every file an owner holds.
pub async fn delete_all(cli: &Cli, config: &AppConfig, args: &OwnerArgs) -> AppResult<()> {
    let ctx = cli.context(&args.owner)?;
    let store = super::open_store(config).await?;

    let removed = store.delete_all_owner_files(&ctx, &args.owner).await?;
    super::persist(&store, config).await?;

    match cli.format {
        OutputFormat::Table => output::print_success(&format!(
            "Deleted {removed} files owned by {}",
            args.owner
        )),
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "owner": args.owner,
            "removed": removed,
        })),
    }
    Ok(())
}
