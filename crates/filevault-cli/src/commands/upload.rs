//! File upload CLI command.

use std::path::PathBuf;

use clap::Args;
use tokio_util::io::ReaderStream;

use super::Cli;
use crate::output::{self, OutputFormat};
use filevault_core::config::AppConfig;
use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::traits::storage::ByteStream;
use filevault_service::UploadRequest;

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Path to the file to upload
    pub file: PathBuf,

    /// Owning tenant
    #[arg(long)]
    pub owner: String,

    /// Project within the owner
    #[arg(long)]
    pub project: String,

    /// Override file name (defaults to the local file name)
    #[arg(long)]
    pub name: Option<String>,

    /// MIME type (defaults to application/octet-stream)
    #[arg(long = "type", value_name = "MIME")]
    pub content_type: Option<String>,

    /// Description of this version
    #[arg(short, long, default_value = "")]
    pub description: String,
}

/// Execute the upload command
pub async fn execute(cli: &Cli, config: &AppConfig, args: &UploadArgs) -> AppResult<()> {
    let name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::invalid_argument(format!(
                    "Cannot derive a file name from {}; pass --name",
                    args.file.display()
                ))
            })?,
    };

    let file = tokio::fs::File::open(&args.file).await.map_err(|e| {
        let kind = if e.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::InvalidArgument
        };
        AppError::with_source(kind, format!("Cannot open {}", args.file.display()), e)
    })?;
    let stream: ByteStream = Box::pin(ReaderStream::new(file));

    let request = UploadRequest::new(&args.owner, &args.project, &name)
        .with_content_type(args.content_type.clone().unwrap_or_default())
        .with_description(&args.description);

    let ctx = cli.context(&args.owner)?;
    let store = super::open_store(config).await?;
    let version = store.upload_stream(&ctx, &request, stream).await?;
    super::persist(&store, config).await?;

    match cli.format {
        OutputFormat::Table => output::print_success(&format!(
            "Uploaded {}/{}/{} as version {version}",
            args.owner, args.project, name
        )),
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "owner": args.owner,
            "project": args.project,
            "name": name,
            "version": version,
        })),
    }
    Ok(())
}
