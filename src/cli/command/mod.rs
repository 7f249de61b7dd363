pub mod cities;
pub mod germany;
pub mod info;
pub mod rainseason;
pub mod world;

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Datelike, Local};
pub use cities::cities;
pub use germany::germany;
pub use info::info;
pub use rainseason::rainseason;
pub use world::world;

use super::Commands;

/// Runs a subcommand and returns the line reported on success.
pub async fn run(command: &Commands) -> Result<String> {
    match command {
        Commands::Rainseason(args) => rainseason(args).await.map(saved),
        Commands::Germany(args) => germany(args).await.map(saved),
        Commands::Cities(args) => cities(args).await.map(saved),
        Commands::World(args) => world(args).await.map(saved),
        Commands::Info(args) => info(args).await,
    }
}

fn saved(files: String) -> String {
    format!("File saved to `{}`", files)
}

pub fn make_output_file_name(kind: &str, extension: &str) -> PathBuf {
    let today = Local::now();
    let file_name = format!(
        "geoclim-{}-{}-{:02}-{:02}.{}",
        kind,
        today.year(),
        today.month(),
        today.day(),
        extension
    );

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(file_name)
}

/// The `--output` path, or a dated SVG file in the home directory.
pub fn output_path(output: Option<&PathBuf>, kind: &str) -> PathBuf {
    output
        .cloned()
        .unwrap_or_else(|| make_output_file_name(kind, "svg"))
}

/// A file next to `output` whose stem gets `suffix` appended.
pub fn sibling_path(output: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    output.with_file_name(format!("{stem}{suffix}.{extension}"))
}

/// Formats saved files for the `File saved to` line.
pub fn list_files(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|f| f.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("`, `")
}

// -- Tests ---
