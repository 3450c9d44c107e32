//! Configuration module for listedit
//!
//! Reads the `[elasticsearch]` section of the archive's `ponymail.cfg` (INI)
//! once at startup. Values can be overridden from the environment with
//! `LISTEDIT_ELASTICSEARCH__<KEY>`, e.g. `LISTEDIT_ELASTICSEARCH__HOSTNAME`.
//!
//! ```ini
//! [elasticsearch]
//! hostname = localhost
//! port = 9200
//! ssl = false
//! uri =
//! dbname = ponymail
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::store::RetryPolicy;

/// File name looked up in the working directory by default
pub const DEFAULT_CONFIG_FILE: &str = "ponymail.cfg";

const fn default_port() -> u16 {
    9200
}

const fn default_max_retries() -> u32 {
    5
}

const fn default_true() -> bool {
    true
}

const fn default_backoff_ms() -> u64 {
    500
}

const fn default_timeout_secs() -> u64 {
    60
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    pub elasticsearch: ElasticsearchConfig,
}

/// Connection settings for the search store
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ElasticsearchConfig {
    /// Store host name
    pub hostname: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect over https
    #[serde(default)]
    pub ssl: bool,

    /// URL path prefix, for stores behind a reverse proxy
    #[serde(default)]
    pub uri: String,

    /// Index holding the archived emails
    pub dbname: String,

    /// Index holding list descriptions (defaults to `dbname`)
    #[serde(default)]
    pub list_index: Option<String>,

    /// Retries after a failed request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Also retry timeouts and connection failures
    #[serde(default = "default_true")]
    pub retry_on_timeout: bool,

    /// Delay before the first retry in milliseconds, doubled per retry
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Indices an edit reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNames {
    /// Archived emails
    pub archive: String,
    /// List metadata documents
    pub lists: String,
}

impl ElasticsearchConfig {
    /// Settings for `hostname` and `dbname` with every other value defaulted
    #[must_use]
    pub fn new(hostname: impl Into<String>, dbname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port: default_port(),
            ssl: false,
            uri: String::new(),
            dbname: dbname.into(),
            list_index: None,
            max_retries: default_max_retries(),
            retry_on_timeout: default_true(),
            backoff_ms: default_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Base URL of the store, always ending in `/`
    ///
    /// # Errors
    /// Returns `url::ParseError` if host, port and prefix do not form a URL.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        let scheme = if self.ssl { "https" } else { "http" };
        let prefix = self.uri.trim_matches('/');
        let raw = if prefix.is_empty() {
            format!("{scheme}://{}:{}/", self.hostname, self.port)
        } else {
            format!("{scheme}://{}:{}/{prefix}/", self.hostname, self.port)
        };
        Url::parse(&raw)
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            retry_on_timeout: self.retry_on_timeout,
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Archive and list-metadata index names
    #[must_use]
    pub fn indices(&self) -> IndexNames {
        let lists = self
            .list_index
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.dbname);
        IndexNames {
            archive: self.dbname.clone(),
            lists: lists.to_string(),
        }
    }
}

impl ArchiveConfig {
    /// Pick the configuration file to read
    ///
    /// An existing `requested` path wins. Otherwise, for the default file name
    /// only, `<config dir>/listedit/ponymail.cfg` is used when it exists.
    #[must_use]
    pub fn resolve_path(requested: &Path) -> PathBuf {
        if requested.exists() || requested != Path::new(DEFAULT_CONFIG_FILE) {
            return requested.to_path_buf();
        }
        dirs::config_dir()
            .map(|dir| dir.join("listedit").join(DEFAULT_CONFIG_FILE))
            .filter(|candidate| candidate.exists())
            .unwrap_or_else(|| requested.to_path_buf())
    }

    /// Load configuration from an INI file plus environment overrides
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file does not exist, cannot be parsed, or
    /// lacks a required key such as `hostname` or `dbname`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Message(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Ini))
            .add_source(
                Environment::with_prefix("LISTEDIT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}
