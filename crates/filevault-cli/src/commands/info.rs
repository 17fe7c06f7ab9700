//! Read-only file commands: info, versions, files.

use super::{Cli, KeyArgs, OwnerArgs, VersionedKeyArgs};
use crate::output::{self, FileRow, VersionRow};
use filevault_core::config::AppConfig;
use filevault_core::result::AppResult;

/// Show one version.
pub async fn info(cli: &Cli, config: &AppConfig, args: &VersionedKeyArgs) -> AppResult<()> {
    let query = args.query()?;
    let ctx = cli.context(&query.owner)?;
    let store = super::open_store(config).await?;

    let info = store.get_info(&ctx, &query).await?;
    output::print_info(&info, cli.format);
    Ok(())
}

/// List a file's versions.
pub async fn versions(cli: &Cli, config: &AppConfig, args: &KeyArgs) -> AppResult<()> {
    let ctx = cli.context(&args.owner)?;
    let store = super::open_store(config).await?;

    let versions = store.list_versions(&ctx, &args.key()).await?;
    match cli.format {
        output::OutputFormat::Table => {
            let rows: Vec<VersionRow> = versions.iter().map(VersionRow::from).collect();
            output::print_list(&rows, cli.format);
        }
        output::OutputFormat::Json => output::print_json(&versions),
    }
    Ok(())
}

/// List an owner's files.
pub async fn files(cli: &Cli, config: &AppConfig, args: &OwnerArgs) -> AppResult<()> {
    let ctx = cli.context(&args.owner)?;
    let store = super::open_store(config).await?;

    let files = store.list_owner_files(&ctx, &args.owner).await?;
    let rows: Vec<FileRow> = files.iter().map(FileRow::from).collect();
    output::print_list(&rows, cli.format);
    Ok(())
}
