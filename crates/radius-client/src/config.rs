use crate::registry::VendorAttributeSpec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Standard RADIUS authentication port
pub const DEFAULT_PORT: u16 = 1812;
/// Reply timeout when neither the server nor the file sets one
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// One authentication server entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// `host`, `host:port`, `ip` or `ip:port`; port defaults to 1812
    pub address: String,
    /// Overrides the top-level shared secret
    #[serde(default)]
    pub shared_secret: Option<String>,
    /// Reply timeout in seconds, overrides the top-level timeout unless 0
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Shared secret for servers that don't set their own
    #[serde(default)]
    pub shared_secret: Option<String>,

    /// Reply timeout in seconds (default: 10, clamped to 1..=30)
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Log every request and reply (passwords redacted)
    #[serde(default)]
    pub debug: bool,

    /// Log level: "trace", "debug", "info", "warn", "error" (default: "warn")
    #[serde(default)]
    pub log_level: Option<String>,

    /// Servers in failover order
    #[serde(default)]
    pub servers: Vec<ServerConfig>,

    /// Vendor attributes to copy from an Access-Accept, as `"<vendor-id>.<subtype>"`
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// A configured server after address resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedServer {
    pub address: SocketAddr,
    /// Empty when neither the server nor the file sets a secret
    pub secret: String,
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::Invalid("No server configured".to_string()));
        }

        for server in &self.servers {
            if server.address.trim().is_empty() {
                return Err(ConfigError::Invalid("Server has empty address".to_string()));
            }
        }

        if let Some(level) = &self.log_level {
            if !matches!(
                level.to_ascii_lowercase().as_str(),
                "trace" | "debug" | "info" | "warn" | "error"
            ) {
                return Err(ConfigError::Invalid(format!("Invalid log level: {}", level)));
            }
        }

        self.attribute_specs()?;
        Ok(())
    }

    /// Parse the `attributes` list
    pub fn attribute_specs(&self) -> Result<Vec<VendorAttributeSpec>, ConfigError> {
        self.attributes
            .iter()
            .map(|entry| parse_attribute(entry))
            .collect()
    }

    /// Resolve every server address, in file order
    ///
    /// A name resolving to several addresses yields one server per address,
    /// all sharing the entry's secret and timeout.
    pub fn resolve_servers(&self) -> Result<Vec<ResolvedServer>, ConfigError> {
        let mut resolved = Vec::new();
        for server in &self.servers {
            let secret = server
                .shared_secret
                .as_ref()
                .or(self.shared_secret.as_ref())
                .cloned()
                .unwrap_or_default();
            let timeout = self.timeout_for(server);

            for address in resolve_address(&server.address)? {
                resolved.push(ResolvedServer {
                    address,
                    secret: secret.clone(),
                    timeout,
                });
            }
        }
        Ok(resolved)
    }

    fn timeout_for(&self, server: &ServerConfig) -> Duration {
        // A server timeout of 0 falls back to the top-level one
        let secs = server
            .timeout
            .filter(|&secs| secs != 0)
            .or(self.timeout)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Create an example configuration file
    pub fn example() -> Self {
        Config {
            shared_secret: Some("testing123".to_string()),
            timeout: Some(DEFAULT_TIMEOUT_SECS),
            debug: false,
            log_level: Some("warn".to_string()),
            servers: vec![
                ServerConfig {
                    address: "10.0.0.1:1812".to_string(),
                    shared_secret: None,
                    timeout: None,
                },
                ServerConfig {
                    address: "radius.example.com".to_string(),
                    shared_secret: Some("other_secret".to_string()),
                    timeout: Some(3),
                },
            ],
            attributes: vec!["311.1".to_string(), "9.1".to_string()],
        }
    }
}

fn parse_attribute(entry: &str) -> Result<VendorAttributeSpec, ConfigError> {
    let invalid = || {
        ConfigError::Invalid(format!(
            "Invalid attribute `{}`, expected <vendor-id>.<subtype>",
            entry
        ))
    };
    let (vendor, subtype) = entry.trim().split_once('.').ok_or_else(invalid)?;
    let vendor_id = vendor.parse::<u32>().map_err(|_| invalid())?;
    let subtype = subtype.parse::<u8>().map_err(|_| invalid())?;
    Ok(VendorAttributeSpec::new(vendor_id, subtype))
}

fn resolve_address(address: &str) -> Result<Vec<SocketAddr>, ConfigError> {
    let address = address.trim();
    let addrs = match address.to_socket_addrs() {
        Ok(addrs) => addrs.collect::<Vec<_>>(),
        // No port given
        Err(_) => (address, DEFAULT_PORT)
            .to_socket_addrs()
            .map_err(|e| ConfigError::Invalid(format!("Cannot resolve server {}: {}", address, e)))?
            .collect(),
    };
    if addrs.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "Server {} resolved to no address",
            address
        )));
    }
    Ok(addrs)
}
