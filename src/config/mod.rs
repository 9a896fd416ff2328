/// Configuration system for gapdash.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::GapdashConfig::default()`]
/// 2. **User global config** — `~/.gapdash/config.toml`
/// 3. **Project local config** — `.gapdash.toml` in the current working directory
/// 4. **Environment variables** — `GAPDASH_*` overrides (highest precedence)
///
/// A later file layer replaces the earlier one wholesale; fields missing from
/// a file take their built-in defaults.
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::GapdashConfig;
use schema::LogLevel;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved gapdash configuration.
///
/// Problems with config files are logged; callers that run before the
/// logger is installed should use [`load_with_warnings`] instead.
pub fn load() -> GapdashConfig {
    let (config, warnings) = load_with_warnings();
    for warning in &warnings {
        log::warn!("{warning}");
    }
    config
}

/// Load the configuration and return problems found in config files
/// alongside it, for the caller to report once logging is up.
pub fn load_with_warnings() -> (GapdashConfig, Vec<String>) {
    load_layers(
        global_config_path(),
        project_config_path(),
        |key| std::env::var(key).ok(),
    )
}

/// Resolve the layers from explicit file paths and an env lookup.
fn load_layers(
    global: Option<PathBuf>,
    project: Option<PathBuf>,
    lookup: impl Fn(&str) -> Option<String>,
) -> (GapdashConfig, Vec<String>) {
    let mut config = GapdashConfig::default();
    let mut warnings = Vec::new();

    if let Some(layer) = load_toml_file(global, &mut warnings) {
        config = layer;
    }

    if let Some(layer) = load_toml_file(project, &mut warnings) {
        config = layer;
    }

    apply_env_overrides(&mut config, lookup);

    (config, warnings)
}

/// Load a TOML config file from the given path (if it exists).
///
/// Malformed files are skipped with a warning so a typo never keeps the
/// dashboard from starting.
fn load_toml_file(path: Option<PathBuf>, warnings: &mut Vec<String>) -> Option<GapdashConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warnings.push(format!("ignoring malformed config {}: {e}", path.display()));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".gapdash").join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".gapdash.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `GAPDASH_HOST`, `GAPDASH_PORT` — listener address
/// - `GAPDASH_DEBUG` — debug mode (`1`/`true`/`yes`/`on`)
/// - `GAPDASH_DATA_URL` — dataset URL
/// - `GAPDASH_DATA_PATH` — local dataset file
/// - `GAPDASH_DATA_TIMEOUT_MS` — startup fetch timeout
/// - `GAPDASH_LOG_LEVEL` — `error`, `warn`, `info`, `debug`, `trace`
///
/// `lookup` is `std::env::var` in production and a map in tests.
fn apply_env_overrides(config: &mut GapdashConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("GAPDASH_HOST")
        && !val.is_empty()
    {
        config.server.host = val;
    }
    if let Some(val) = lookup("GAPDASH_PORT")
        && let Ok(port) = val.parse::<u16>()
    {
        config.server.port = port;
    }
    if let Some(val) = lookup("GAPDASH_DEBUG") {
        config.server.debug = is_truthy(&val);
    }

    if let Some(val) = lookup("GAPDASH_DATA_URL")
        && !val.is_empty()
    {
        config.data.url = val;
    }
    if let Some(val) = lookup("GAPDASH_DATA_PATH")
        && !val.is_empty()
    {
        config.data.path = Some(val);
    }
    if let Some(val) = lookup("GAPDASH_DATA_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.data.timeout_ms = ms;
    }

    if let Some(val) = lookup("GAPDASH_LOG_LEVEL")
        && let Some(level) = parse_log_level(&val)
    {
        config.logging.level = level;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_log_level(val: &str) -> Option<LogLevel> {
    match val.to_ascii_lowercase().as_str() {
        "error" => Some(LogLevel::Error),
        "warn" | "warning" => Some(LogLevel::Warn),
        "info" => Some(LogLevel::Info),
        "debug" => Some(LogLevel::Debug),
        "trace" => Some(LogLevel::Trace),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / show
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.gapdash/config.toml`.
///
/// Returns an error if the file already exists and `force` is not set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.gapdash/ directory")?;
    }

    fs::write(&path, GapdashConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
