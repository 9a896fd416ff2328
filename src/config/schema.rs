/// Configuration schema and defaults for gapdash.
///
/// Defines the TOML-serializable configuration structure with the
/// `[server]`, `[data]` and `[logging]` sections. Every field has a built-in
/// default matching the stock dashboard (port 8060, debug off, the public
/// gapminder dataset), so a config file is never required.
use serde::{Deserialize, Serialize};

/// Public gapminder dataset fetched at startup when no local path is set.
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/plotly/datasets/master/gapminder_unfiltered.csv";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level gapdash configuration.
///
/// Maps directly to the `~/.gapdash/config.toml` and `.gapdash.toml` file
/// schemas. Missing sections and fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapdashConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Debug mode: error responses carry the full context chain and request
    /// bodies are logged.
    pub debug: bool,
    /// Open the dashboard in the system browser once the listener is up.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8060,
            debug: false,
            open_browser: false,
        }
    }
}

impl ServerConfig {
    /// `host:port` socket address string for the listener.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// [data]
// ---------------------------------------------------------------------------

/// Dataset source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV URL fetched once at startup.
    pub url: String,
    /// Local CSV file. Takes precedence over `url` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Timeout for the startup fetch (milliseconds).
    pub timeout_ms: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATA_URL.to_string(),
            path: None,
            timeout_ms: 30_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level(self) -> log::Level {
        match self {
            Self::Error => log::Level::Error,
            Self::Warn => log::Level::Warn,
            Self::Info => log::Level::Info,
            Self::Debug => log::Level::Debug,
            Self::Trace => log::Level::Trace,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

// ---------------------------------------------------------------------------
// Default TOML
// ---------------------------------------------------------------------------

impl GapdashConfig {
    /// Annotated default config written by `gapdash config init`.
    pub fn default_toml() -> String {
        format!(
            r#"# gapdash configuration
#
# Layers (later wins): built-in defaults, ~/.gapdash/config.toml,
# .gapdash.toml in the working directory, GAPDASH_* environment variables.

[server]
host = "127.0.0.1"
port = 8060
debug = false
open_browser = false

[data]
url = "{DEFAULT_DATA_URL}"
# path = "gapminder_unfiltered.csv"
timeout_ms = 30000

[logging]
level = "info"
"#
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
