//! Error types.

use std::path::PathBuf;

use crate::theme::Theme;

/// Theme operation error.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// Name is not `light`, `dark` or `system`.
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),
    /// Name is not a known strategy.
    #[error("Unknown theme strategy: {0}")]
    UnknownStrategy(String),
    /// Theme is valid but not allowed by the configuration.
    #[error("Theme \"{theme}\" is not supported. Available themes: {available}")]
    Unsupported {
        /// Rejected theme.
        theme: Theme,
        /// Comma-separated allowed themes.
        available: String,
    },
    /// A forced theme is active.
    #[error("Theme cannot be changed while forced theme is active")]
    Forced,
    /// The service has been destroyed.
    #[error("Theme service has been destroyed")]
    Destroyed,
    /// A platform query failed.
    #[error("Platform error: {0}")]
    Platform(String),
    /// Applying the theme to its target failed.
    #[error("Failed to apply theme: {0}")]
    Target(String),
}

/// Preference store error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Backing file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The backing file is not a JSON object of strings.
    #[error("Invalid preference file {}: {source}", path.display())]
    Json {
        /// Backing file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The store cannot be used.
    #[error("Preference store unavailable: {0}")]
    Unavailable(String),
}
