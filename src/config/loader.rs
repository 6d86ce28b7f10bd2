//! Configuration loading from disk.
//!
//! # Responsibilities
//! - Resolve the configured path (with a `config/` fallback)
//! - Wait, bounded, for the file to become readable
//! - Pick the decoder from the file extension
//! - Decode into [`GatewayConfig`] with line/column diagnostics on syntax errors

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation;

/// Poll interval while waiting for the config file.
pub const READABLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Ceiling for the readability wait.
pub const READABLE_MAX_WAIT: Duration = Duration::from_secs(30);

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve config path {}: {source}", .path.display())]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("timeout waiting for file to be readable: {}", .0.display())]
    FileNotReadable(PathBuf),

    #[error("unsupported config type: {0}")]
    UnsupportedFormat(String),

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error at line {line}, column {column}: {message} (near `{context}`)")]
    Syntax {
        line: usize,
        column: usize,
        context: String,
        message: String,
    },

    #[error("failed to unmarshal config: {0}")]
    Schema(String),

    #[error("config store not initialized")]
    NotInitialized,

    #[error("file watch error: {0}")]
    Watch(#[from] notify::Error),
}

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Select the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat("no extension".to_string()))?;

        match ext.to_ascii_lowercase().as_str() {
            "json" => Ok(ConfigFormat::Json),
            "yml" | "yaml" => Ok(ConfigFormat::Yaml),
            _ => Err(ConfigError::UnsupportedFormat(format!(".{}", ext))),
        }
    }
}

/// Resolve `name` to an absolute path.
///
/// Relative paths are resolved against the working directory. If the result does
/// not exist, `config/<name>` is tried; the fallback is returned even if it is
/// missing too, so the readability wait can report it.
pub fn resolve_config_path(name: &Path) -> Result<PathBuf, ConfigError> {
    let absolute = to_absolute(name)?;
    if absolute.exists() || name.is_absolute() {
        return Ok(absolute);
    }

    tracing::info!(path = %absolute.display(), "Config file not found, trying config/ directory");
    to_absolute(&Path::new("config").join(name))
}

fn to_absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|source| ConfigError::PathResolution {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(cwd.join(path))
}

/// Poll until `path` can be opened for reading or `max_wait` elapses.
pub async fn wait_for_file_readable(path: &Path, max_wait: Duration) -> Result<(), ConfigError> {
    let poll = async {
        let mut ticker = tokio::time::interval(READABLE_POLL_INTERVAL);
        loop {
            ticker.tick().await;
            if std::fs::File::open(path).is_ok() {
                return;
            }
        }
    };

    tokio::time::timeout(max_wait, poll)
        .await
        .map_err(|_| ConfigError::FileNotReadable(path.to_path_buf()))
}

/// Read and decode the document at `path`, logging any semantic warnings.
pub fn load_config(path: &Path, format: ConfigFormat) -> Result<GatewayConfig, ConfigError> {
    let content = std::fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = decode(&content, format)?;

    validation::report(&config);

    Ok(config)
}

/// Decode raw bytes in the given format.
pub fn decode(bytes: &[u8], format: ConfigFormat) -> Result<GatewayConfig, ConfigError> {
    match format {
        ConfigFormat::Json => decode_json(bytes),
        ConfigFormat::Yaml => decode_yaml(bytes),
    }
}

fn decode_json(bytes: &[u8]) -> Result<GatewayConfig, ConfigError> {
    serde_json::from_slice(bytes).map_err(|e| match e.classify() {
        serde_json::error::Category::Syntax | serde_json::error::Category::Eof => {
            syntax_error(bytes, e.line(), e.column(), e.to_string())
        }
        _ => ConfigError::Schema(e.to_string()),
    })
}

fn decode_yaml(bytes: &[u8]) -> Result<GatewayConfig, ConfigError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(GatewayConfig::default());
    }

    // Parse to a generic value first so syntax and shape errors stay distinguishable.
    let value: serde_yaml::Value = serde_yaml::from_slice(bytes).map_err(|e| {
        let (line, column) = e
            .location()
            .map(|l| (l.line(), l.column()))
            .unwrap_or((0, 0));
        syntax_error(bytes, line, column, e.to_string())
    })?;

    if value.is_null() {
        return Ok(GatewayConfig::default());
    }

    serde_yaml::from_value(value).map_err(|e| ConfigError::Schema(e.to_string()))
}

fn syntax_error(bytes: &[u8], line: usize, column: usize, message: String) -> ConfigError {
    let context = error_context(&String::from_utf8_lossy(bytes), line, column);
    tracing::error!(line, column, context = %context, "Config syntax error");
    ConfigError::Syntax {
        line,
        column,
        context,
        message,
    }
}

/// Up to 40 characters either side of (`line`, `column`), both 1-based.
pub fn error_context(text: &str, line: usize, column: usize) -> String {
    const RADIUS: usize = 40;

    let Some(source_line) = line.checked_sub(1).and_then(|i| text.lines().nth(i)) else {
        return String::new();
    };
    let chars: Vec<char> = source_line.chars().collect();
    let at = column.saturating_sub(1).min(chars.len());
    let start = at.saturating_sub(RADIUS);
    let end = (at + RADIUS).min(chars.len());
    chars[start..end].iter().collect::<String>().trim().to_string()
}
