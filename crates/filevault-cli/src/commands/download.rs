//! File download CLI command.

use std::path::PathBuf;

use clap::Args;
use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{Cli, VersionedKeyArgs};
use crate::output;
use filevault_core::config::AppConfig;
use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::traits::storage::ByteStream;

/// Arguments for the download command
#[derive(Debug, Args)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub target: VersionedKeyArgs,

    /// Write to this path instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the download command
pub async fn execute(cli: &Cli, config: &AppConfig, args: &DownloadArgs) -> AppResult<()> {
    let query = args.target.query()?;
    let ctx = cli.context(&query.owner)?;
    let store = super::open_store(config).await?;

    let download = store.download(&ctx, &query).await?;
    let version = download.version;
    let content_type = download.content_type.clone();

    match &args.output {
        Some(path) => {
            let mut file = tokio::fs::File::create(path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::InvalidArgument,
                    format!("Cannot create {}", path.display()),
                    e,
                )
            })?;
            let written = copy_stream(download.stream, &mut file).await?;
            output::print_success(&format!(
                "Wrote version {version} ({content_type}, {written} bytes) to {}",
                path.display()
            ));
        }
        None => {
            let mut stdout = tokio::io::stdout();
            copy_stream(download.stream, &mut stdout).await?;
        }
    }
    Ok(())
}

async fn copy_stream<W: AsyncWrite + Unpin>(mut stream: ByteStream, out: &mut W) -> AppResult<u64> {
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        out.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    out.flush().await?;
    Ok(written)
}
