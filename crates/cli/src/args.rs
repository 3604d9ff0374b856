//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// metadata-notifier: maps video tags to content terms and relays them to the CMS metadata notifier
#[derive(Parser, Debug)]
#[command(name = "metadata-notifier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level for this service and its HTTP layer (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the mappings and serve the notification API
    Serve(ServeArgs),

    /// Inspect the tag mappings
    Mappings(MappingsArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and check dependencies
    Doctor(DoctorArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Listening port of this service
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// URL of the metadata mapping spreadsheet
    #[arg(long, env = "MAPPING_URL")]
    pub mapping_url: Option<String>,

    /// Address of the CMS metadata notifier
    #[arg(long, env = "CMS_METADATA_NOTIFIER_ADDR")]
    pub cms_metadata_notifier_address: Option<String>,

    /// Host header to use to connect to the CMS metadata notifier
    #[arg(long, env = "CMS_METADATA_NOTIFIER_HOST_HEADER")]
    pub cms_metadata_notifier_host_header: Option<String>,
}

#[derive(Args, Debug)]
pub struct MappingsArgs {
    #[command(subcommand)]
    pub command: MappingsCommands,
}

#[derive(Subcommand, Debug)]
pub enum MappingsCommands {
    /// Fetch the catalog and list the parsed mappings
    List {
        /// Override the mapping URL
        #[arg(long, env = "MAPPING_URL")]
        mapping_url: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    #[command(flatten)]
    pub overrides: ServeArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
