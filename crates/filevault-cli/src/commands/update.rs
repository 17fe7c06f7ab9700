//! Metadata update CLI commands.

use clap::Args;

use super::{Cli, VersionedKeyArgs};
use crate::output::{self, OutputFormat};
use filevault_core::config::AppConfig;
use filevault_core::result::AppResult;
use filevault_service::{UpdateAllRequest, UpdateInfoRequest};

/// Arguments for the update command
#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub target: VersionedKeyArgs,

    /// JSON object to merge into the metadata; null values remove keys
    #[arg(short, long)]
    pub metadata: String,
}

/// Arguments for the update-all command
#[derive(Debug, Args)]
pub struct UpdateAllArgs {
    /// Owning tenant
    #[arg(long)]
    pub owner: String,

    /// JSON object to merge into every version's metadata
    #[arg(short, long)]
    pub metadata: String,
}

/// Merge metadata into one version.
pub async fn update(cli: &Cli, config: &AppConfig, args: &UpdateArgs) -> AppResult<()> {
    let query = args.target.query()?;
    let request = UpdateInfoRequest {
        name: query.name,
        owner: query.owner,
        project: query.project,
        version: query.version,
        updated_metadata: args.metadata.clone(),
    };
    let ctx = cli.context(&request.owner)?;
    let store = super::open_store(config).await?;

    let info = store.update_info(&ctx, &request).await?;
    super::persist(&store, config).await?;

    match cli.format {
        OutputFormat::Table => output::print_success(&format!(
            "Updated metadata of {}/{}/{} version {}",
            info.owner, info.project, info.name, info.version
        )),
        OutputFormat::Json => output::print_info(&info, cli.format),
    }
    Ok(())
}

/// Merge metadata into every version an owner holds.
pub async fn update_all(cli: &Cli, config: &AppConfig, args: &UpdateAllArgs) -> AppResult<()> {
    let request = UpdateAllRequest {
        owner: args.owner.clone(),
        updated_metadata: args.metadata.clone(),
    };
    let patch = request.patch()?;
    let ctx = cli.context(&args.owner)?;
    let store = super::open_store(config).await?;

    let report = store
        .update_all_owner_info_report(&ctx, &args.owner, &patch)
        .await?;
    super::persist(&store, config).await?;

    match cli.format {
        OutputFormat::Table => {
            output::print_success(&format!(
                "Updated metadata of {} versions owned by {}",
                report.updated_count(),
                args.owner
            ));
            for failure in &report.failed {
                output::print_warning(&format!(
                    "{} version {}: {}",
                    failure.target.key, failure.target.version, failure.message
                ));
            }
        }
        OutputFormat::Json => output::print_json(&report),
    }
    Ok(())
}
