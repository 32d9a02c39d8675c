//! CLI error types.

use dfx_config::ConfigError;
use dfx_markup::CatalogError;
use dfx_theme::ThemeError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Theme(#[from] ThemeError),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid --params JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}
