//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use filevault_entity::{FileInfo, FileSummary};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One version in a table.
#[derive(Debug, Serialize, Tabled)]
pub struct VersionRow {
    /// Version number.
    #[tabled(rename = "Version")]
    pub version: u32,
    /// MIME type.
    #[tabled(rename = "Type")]
    pub content_type: String,
    /// Size in bytes.
    #[tabled(rename = "Size")]
    pub size_bytes: u64,
    /// Creation time.
    #[tabled(rename = "Created")]
    pub created_at: String,
    /// Description.
    #[tabled(rename = "Description")]
    pub description: String,
}

impl From<&FileInfo> for VersionRow {
    fn from(info: &FileInfo) -> Self {
        Self {
            version: info.version,
            content_type: info.content_type.clone(),
            size_bytes: info.size_bytes,
            created_at: info.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            description: info.description.clone(),
        }
    }
}

/// One lineage in a table.
#[derive(Debug, Serialize, Tabled)]
pub struct FileRow {
    /// Project.
    #[tabled(rename = "Project")]
    pub project: String,
    /// File name.
    #[tabled(rename = "Name")]
    pub name: String,
    /// Latest version.
    #[tabled(rename = "Latest")]
    pub latest_version: u32,
    /// Live versions.
    #[tabled(rename = "Versions")]
    pub version_count: usize,
    /// When the latest version was created.
    #[tabled(rename = "Updated")]
    pub latest_created_at: String,
}

impl From<&FileSummary> for FileRow {
    fn from(summary: &FileSummary) -> Self {
        Self {
            project: summary.project.clone(),
            name: summary.name.clone(),
            latest_version: summary.latest_version,
            version_count: summary.version_count,
            latest_created_at: summary
                .latest_created_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        }
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => print_json(&items),
    }
}

/// Print one version's attributes and metadata.
pub fn print_info(info: &FileInfo, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_kv("File", &format!("{}/{}/{}", info.owner, info.project, info.name));
            print_kv("Version", &info.version.to_string());
            print_kv("Type", &info.content_type);
            print_kv("Size", &format!("{} bytes", info.size_bytes));
            print_kv("SHA-256", &info.checksum_sha256);
            print_kv("Description", &info.description);
            print_kv("Created by", &info.created_by);
            print_kv("Created at", &info.created_at.to_rfc3339());
            if let Some(updated) = info.updated_at {
                print_kv("Updated at", &updated.to_rfc3339());
            }
            let metadata = serde_json::to_string_pretty(&info.metadata)
                .unwrap_or_else(|_| "{}".to_string());
            print_kv("Metadata", &metadata);
        }
        OutputFormat::Json => print_json(info),
    }
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{json}");
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    eprintln!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<16} {}", format!("{key}:"), value);
}
