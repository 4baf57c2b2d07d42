use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "octofhir-loader")]
#[command(about = "OctoFHIR loader — convert NDJSON resource files into batch Bundles")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config profile name
    #[arg(short, long, global = true, env = "OCTOFHIR_LOADER_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert NDJSON files into batch Bundles
    Convert(ConvertArgs),
    /// Show the bundles a single NDJSON file would produce
    Inspect(InspectArgs),
    /// Manage loader configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct ConvertArgs {
    /// NDJSON files or directories containing them
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Maximum number of resources per bundle
    #[arg(short, long, env = "OCTOFHIR_LOADER_BUNDLE_SIZE", allow_negative_numbers = true)]
    pub bundle_size: Option<i64>,
    /// Directory to write bundles to (bundles are only counted if omitted)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Number of files converted concurrently
    #[arg(long)]
    pub parallel: Option<usize>,
}

#[derive(clap::Args)]
pub struct InspectArgs {
    /// NDJSON file
    pub path: PathBuf,
    /// Maximum number of resources per bundle
    #[arg(short, long, env = "OCTOFHIR_LOADER_BUNDLE_SIZE", allow_negative_numbers = true)]
    pub bundle_size: Option<i64>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (bundle_size, output_dir, parallelism)
    pub key: String,
    /// Value
    pub value: String,
}
