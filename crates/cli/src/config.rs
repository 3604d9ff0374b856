//! Configuration loading and management

use anyhow::{Context, Result, bail};
use metadata_notifier_adapters::notifier::NotifierSettings;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::args::ServeArgs;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub mapping_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub address: String,

    #[serde(default = "default_host_header")]
    pub host_header: String,

    #[serde(default = "default_auth_env")]
    pub auth_env: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout() -> u64 {
    30
}

fn default_host_header() -> String {
    "cms-metadata-notifier".to_string()
}

fn default_auth_env() -> String {
    "CMS_METADATA_NOTIFIER_AUTH".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            mapping_url: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            host_header: default_host_header(),
            auth_env: default_auth_env(),
            timeout_secs: default_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            bail!("Config file not found: {}", path.display());
        }

        builder = builder.add_source(
            config::Environment::with_prefix("METADATA_NOTIFIER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Apply command line flags (and their env vars) on top of the loaded config
    pub fn apply_serve_args(&mut self, args: &ServeArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(url) = &args.mapping_url {
            self.catalog.mapping_url = url.clone();
        }
        if let Some(address) = &args.cms_metadata_notifier_address {
            self.notifier.address = address.clone();
        }
        if let Some(host) = &args.cms_metadata_notifier_host_header {
            self.notifier.host_header = host.clone();
        }
    }

    /// Check the settings required before serving traffic
    pub fn validate(&self) -> Result<()> {
        if self.catalog.mapping_url.trim().is_empty() {
            bail!("Please provide a valid mapping URL (--mapping-url or MAPPING_URL)");
        }
        Ok(())
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.timeout_secs)
    }

    /// Notifier authorization from the configured env var; unset or empty means none
    pub fn notifier_auth(&self) -> Option<SecretString> {
        if self.notifier.auth_env.trim().is_empty() {
            return None;
        }
        std::env::var(&self.notifier.auth_env)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| SecretString::new(value.into()))
    }

    pub fn notifier_settings(&self) -> NotifierSettings {
        NotifierSettings {
            address: self.notifier.address.trim_end_matches('/').to_string(),
            host_header: self.notifier.host_header.clone(),
            auth: self.notifier_auth(),
            timeout: Duration::from_secs(self.notifier.timeout_secs),
        }
    }

    /// Log the effective configuration without revealing secrets
    pub fn log_effective(&self) {
        let auth = if self.notifier_auth().is_some() {
            "set, not empty"
        } else {
            "empty"
        };

        tracing::info!(
            mapping_url = %self.catalog.mapping_url,
            notifier_address = %self.notifier.address,
            notifier_host_header = %self.notifier.host_header,
            notifier_auth = auth,
            port = self.server.port,
            "Effective configuration"
        );
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# metadata-notifier configuration

[server]
bind_address = "0.0.0.0"
port = 8080

[catalog]
# JSON array of records with "brightcovesearchterm" and "streamurl" fields
mapping_url = "https://bertha.example.com/view/publish/gss/SPREADSHEET_ID/Mappings"
timeout_secs = 30

[notifier]
address = "http://localhost:8080"
# Host header sent to the notifier (routing through a gateway); empty disables the override
host_header = "cms-metadata-notifier"
# Env var holding the Authorization header value (optional)
auth_env = "CMS_METADATA_NOTIFIER_AUTH"
timeout_secs = 30
"#
        .to_string()
    }
}
