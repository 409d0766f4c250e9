//! Client configuration.
//!
//! Defines the YAML-serializable settings used to reach an event store.
//!
//! # Example YAML
//!
//! ```yaml
//! address: "events.internal:50051"
//! timeout_ms: 2500
//! use_tls: true
//! tls_cert_file: /etc/graveyard/ca.pem
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Default store address.
pub const DEFAULT_ADDRESS: &str = "localhost:50051";

/// Default timeout for unary calls, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Settings for connecting to an event store.
///
/// Missing keys in a YAML file fall back to [`ClientConfig::default`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use graveyard_schema_store::ClientConfig;
///
/// let config = ClientConfig::default();
/// assert_eq!(config.address, "localhost:50051");
/// assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
/// assert_eq!(config.endpoint(), "http://localhost:50051");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Store address as `host:port`.
    pub address: String,
    /// Default timeout for unary calls in milliseconds; `0` disables it.
    pub timeout_ms: u64,
    /// Connect over TLS.
    pub use_tls: bool,
    /// CA certificate used to verify the server. When unset and TLS is
    /// enabled, the system roots are used.
    pub tls_cert_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            use_tls: false,
            tls_cert_file: None,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for `address` with default settings.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Sets the default unary timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Enables TLS, optionally verifying against a CA certificate file.
    pub fn with_tls(mut self, ca_file: Option<PathBuf>) -> Self {
        self.use_tls = true;
        self.tls_cert_file = ca_file;
        self
    }

    /// Returns the default unary timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Returns the endpoint URI derived from the address and TLS setting.
    pub fn endpoint(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{scheme}://{}", self.address)
    }

    /// Checks the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the address is empty or lacks
    /// a port, or if a CA file is configured without TLS.
    pub fn validate(&self) -> Result<()> {
        let address = self.address.trim();
        if address.is_empty() {
            return Err(StoreError::InvalidConfig("address cannot be empty".into()));
        }
        match address.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {}
            _ => {
                return Err(StoreError::InvalidConfig(format!(
                    "address must be host:port, got {address}"
                )));
            }
        }
        if self.tls_cert_file.is_some() && !self.use_tls {
            return Err(StoreError::InvalidConfig(
                "tls_cert_file requires use_tls".into(),
            ));
        }
        Ok(())
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](StoreError::IoError) if the file cannot be read,
    /// or [`YamlError`](StoreError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](StoreError::IoError) if the file cannot be
    /// written, or [`YamlError`](StoreError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
address: "events.internal:7000"
timeout_ms: 250
use_tls: true
tls_cert_file: /etc/graveyard/ca.pem
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: ClientConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.address, "events.internal:7000");
        assert_eq!(config.timeout(), Some(Duration::from_millis(250)));
        assert!(config.use_tls);
        assert_eq!(
            config.tls_cert_file.as_deref(),
            Some(Path::new("/etc/graveyard/ca.pem"))
        );
        assert_eq!(config.endpoint(), "https://events.internal:7000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: ClientConfig = serde_yaml::from_str("address: \"db:9000\"\n").unwrap();
        assert_eq!(config.address, "db:9000");
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(!config.use_tls);
    }

    #[test]
    fn test_zero_timeout_disables_default() {
        let config = ClientConfig::new("db:9000").with_timeout(Duration::ZERO);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        assert!(matches!(
            ClientConfig::new("").validate(),
            Err(StoreError::InvalidConfig(_))
        ));
        assert!(matches!(
            ClientConfig::new("localhost").validate(),
            Err(StoreError::InvalidConfig(_))
        ));
        assert!(matches!(
            ClientConfig::new("localhost:notaport").validate(),
            Err(StoreError::InvalidConfig(_))
        ));

        let mut config = ClientConfig::default();
        config.tls_cert_file = Some(PathBuf::from("ca.pem"));
        assert!(matches!(
            config.validate(),
            Err(StoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.yml");

        let original = ClientConfig::new("events:50051")
            .with_timeout(Duration::from_secs(2))
            .with_tls(None);
        original.save(&path).unwrap();

        let loaded = ClientConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
