//! Configuration management for dfx.
//!
//! Parses `dfx.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `theme.storage_path`
//! - `markup.links.*`
//! - `translations.path`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dfx_theme::{DEFAULT_STORAGE_KEY, StrategyKind, Theme, ThemeConfig};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the preference file.
    pub storage_path: Option<PathBuf>,
    /// Override the forced theme.
    pub forced_theme: Option<Theme>,
    /// Override whether bold, italic and link tags are enabled.
    pub default_transpilers: Option<bool>,
    /// Override the translation catalog file.
    pub translations_path: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "dfx.toml";

/// Default preference file, relative to the config directory.
const DEFAULT_STORAGE_PATH: &str = ".dfx/preferences.json";

/// Default catalog language.
const DEFAULT_LANG: &str = "en";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme configuration (names as strings from TOML).
    theme: ThemeConfigRaw,
    /// Markup configuration.
    pub markup: MarkupConfig,
    /// Translation catalog configuration.
    pub translations: TranslationsConfig,

    /// Resolved theme configuration (set after loading).
    #[serde(skip)]
    pub theme_resolved: ThemeSettings,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw theme configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ThemeConfigRaw {
    default: Option<String>,
    enable_system: Option<bool>,
    enable_auto_init: Option<bool>,
    forced: Option<String>,
    storage_key: Option<String>,
    storage_path: Option<String>,
    strategies: Option<Vec<String>>,
}

/// Resolved theme configuration.
#[derive(Debug)]
pub struct ThemeSettings {
    /// Theme service behavior.
    pub theme: ThemeConfig,
    /// Key the preference is stored under.
    pub storage_key: String,
    /// Preference file.
    pub storage_path: PathBuf,
    /// Strategies in application order.
    pub strategies: Vec<StrategyKind>,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            theme: ThemeConfig::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            strategies: StrategyKind::DEFAULT.to_vec(),
        }
    }
}

/// Markup configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Whether `[b]`, `[i]` and `[link:...]` are recognized.
    pub default_transpilers: bool,
    /// Contextual links: `[name]...[/name]` links to the URL.
    pub links: BTreeMap<String, String>,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            default_transpilers: true,
            links: BTreeMap::new(),
        }
    }
}

/// Translation catalog configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TranslationsConfig {
    /// JSON catalog keyed by language (relative to the config file).
    pub path: Option<PathBuf>,
    /// Language used when none is requested.
    pub default_lang: String,
    /// Languages searched, in order, when a key is missing.
    pub fallback_langs: Vec<String>,
    /// Render empty texts instead of treating them as missing.
    pub allow_empty: bool,
}

impl Default for TranslationsConfig {
    fn default() -> Self {
        Self {
            path: None,
            default_lang: DEFAULT_LANG.to_owned(),
            fallback_langs: Vec::new(),
            allow_empty: false,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`theme.storage_path`").
        field: String,
        /// Error message (e.g., "${`PREFS_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Parse a named value, reporting the field on failure.
fn parse_field<T>(value: &str, field: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ConfigError::Validation(format!("{field}: {e}")))
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `dfx.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or a value is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(storage_path) = &settings.storage_path {
            self.theme_resolved.storage_path.clone_from(storage_path);
        }
        if let Some(forced) = settings.forced_theme {
            self.theme_resolved.theme.forced_theme = Some(forced);
        }
        if let Some(default_transpilers) = settings.default_transpilers {
            self.markup.default_transpilers = default_transpilers;
        }
        if let Some(translations_path) = &settings.translations_path {
            self.translations.path = Some(translations_path.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            theme: ThemeConfigRaw::default(),
            markup: MarkupConfig::default(),
            translations: TranslationsConfig::default(),
            theme_resolved: ThemeSettings {
                storage_path: base.join(DEFAULT_STORAGE_PATH),
                ..ThemeSettings::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_theme()?;
        self.validate_links()?;
        self.validate_translations()?;
        Ok(())
    }

    fn validate_translations(&self) -> Result<(), ConfigError> {
        let translations = &self.translations;
        require_non_empty(&translations.default_lang, "translations.default_lang")?;
        for lang in &translations.fallback_langs {
            require_non_empty(lang, "translations.fallback_langs")?;
        }
        Ok(())
    }

    fn validate_theme(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.theme_resolved.storage_key, "theme.storage_key")
    }

    fn validate_links(&self) -> Result<(), ConfigError> {
        for (name, url) in &self.markup.links {
            if name.is_empty()
                || !name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(ConfigError::Validation(format!(
                    "markup.links: invalid link name \"{name}\" (use letters, digits, '-' and '_')"
                )));
            }
            let field = format!("markup.links.{name}");
            require_non_empty(url, &field)?;
            require_http_url(url, &field)?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref path) = self.theme.storage_path {
            self.theme.storage_path = Some(expand::expand_env(path, "theme.storage_path")?);
        }

        for (name, url) in &mut self.markup.links {
            *url = expand::expand_env(url, &format!("markup.links.{name}"))?;
        }

        if let Some(ref path) = self.translations.path {
            let expanded = expand::expand_env(&path.to_string_lossy(), "translations.path")?;
            self.translations.path = Some(PathBuf::from(expanded));
        }

        Ok(())
    }

    /// Parse theme names and resolve paths relative to the config directory.
    fn resolve(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let raw = &self.theme;
        let defaults = ThemeConfig::default();

        let default_theme = match &raw.default {
            Some(name) => parse_field(name, "theme.default")?,
            None => defaults.default_theme,
        };
        let forced_theme = raw
            .forced
            .as_deref()
            .map(|name| parse_field(name, "theme.forced"))
            .transpose()?;
        let strategies = match &raw.strategies {
            Some(names) => names
                .iter()
                .map(|name| parse_field(name, "theme.strategies"))
                .collect::<Result<Vec<StrategyKind>, _>>()?,
            None => StrategyKind::DEFAULT.to_vec(),
        };

        self.theme_resolved = ThemeSettings {
            theme: ThemeConfig {
                default_theme,
                enable_auto_init: raw.enable_auto_init.unwrap_or(defaults.enable_auto_init),
                enable_system: raw.enable_system.unwrap_or(defaults.enable_system),
                forced_theme,
            },
            storage_key: raw
                .storage_key
                .clone()
                .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_owned()),
            storage_path: config_dir.join(raw.storage_path.as_deref().unwrap_or(DEFAULT_STORAGE_PATH)),
            strategies,
        };

        if let Some(path) = &self.translations.path {
            self.translations.path = Some(config_dir.join(path));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn load_str(toml: &str) -> Result<Config, ConfigError> {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, toml).unwrap();
        Config::load(Some(&path), None)
    }

    fn validation_message(result: Result<Config, ConfigError>) -> String {
        match result {
            Err(ConfigError::Validation(message)) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        let theme = &config.theme_resolved;

        assert_eq!(theme.theme, ThemeConfig::default());
        assert_eq!(theme.storage_key, "theme");
        assert_eq!(theme.storage_path, PathBuf::from("/test/.dfx/preferences.json"));
        assert_eq!(theme.strategies, vec![StrategyKind::ColorScheme, StrategyKind::Class]);
        assert!(config.markup.default_transpilers);
        assert!(config.markup.links.is_empty());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.markup.default_transpilers);
        assert!(config.theme.default.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[theme]
default = "dark"
enable_system = false
enable_auto_init = false
forced = "light"
storage_key = "app-theme"
storage_path = "state/prefs.json"
strategies = ["attribute", "class"]

[markup]
default_transpilers = false

[markup.links]
privacy = "https://example.com/privacy"
terms-of-use = "http://example.com/terms"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        let theme = &config.theme_resolved;

        assert_eq!(
            theme.theme,
            ThemeConfig {
                default_theme: Theme::Dark,
                enable_auto_init: false,
                enable_system: false,
                forced_theme: Some(Theme::Light),
            }
        );
        assert_eq!(theme.storage_key, "app-theme");
        assert_eq!(theme.storage_path, tmp.path().join("state/prefs.json"));
        assert_eq!(theme.strategies, vec![StrategyKind::Attribute, StrategyKind::Class]);
        assert!(!config.markup.default_transpilers);
        assert_eq!(
            config.markup.links.get("privacy").map(String::as_str),
            Some("https://example.com/privacy")
        );
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_storage_path_expands_env() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("DFX_TEST_STATE_DIR", "/var/state");
        }
        let config = load_str(
            r#"
[theme]
storage_path = "${DFX_TEST_STATE_DIR}/prefs.json"
"#,
        )
        .unwrap();
        unsafe {
            std::env::remove_var("DFX_TEST_STATE_DIR");
        }

        assert_eq!(
            config.theme_resolved.storage_path,
            PathBuf::from("/var/state/prefs.json")
        );
    }

    #[test]
    fn test_link_url_missing_env_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("DFX_TEST_MISSING_HOST");
        }
        let result = load_str(
            r#"
[markup.links]
docs = "https://${DFX_TEST_MISSING_HOST}/docs"
"#,
        );

        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "markup.links.docs"));
    }

    #[test]
    fn test_unknown_theme_name() {
        let message = validation_message(load_str("[theme]\ndefault = \"sepia\"\n"));
        assert!(message.contains("theme.default"));
        assert!(message.contains("sepia"));
    }

    #[test]
    fn test_unknown_strategy() {
        let message = validation_message(load_str("[theme]\nstrategies = [\"class\", \"inline\"]\n"));
        assert!(message.contains("theme.strategies"));
        assert!(message.contains("inline"));
    }

    #[test]
    fn test_empty_storage_key() {
        let message = validation_message(load_str("[theme]\nstorage_key = \"\"\n"));
        assert_eq!(message, "theme.storage_key cannot be empty");
    }

    #[test]
    fn test_system_detection_disabled_keeps_system_default() {
        let config = load_str("[theme]\nenable_system = false\n").unwrap();
        let theme = &config.theme_resolved.theme;

        assert!(!theme.enable_system);
        assert_eq!(theme.default_theme, Theme::System);
        assert_eq!(theme.forced_theme, None);
    }

    #[test]
    fn test_forced_system_without_detection_is_accepted() {
        let config = load_str("[theme]\nenable_system = false\nforced = \"system\"\n").unwrap();
        assert_eq!(config.theme_resolved.theme.forced_theme, Some(Theme::System));
    }

    #[test]
    fn test_translations_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[translations]
path = "i18n/catalog.json"
default_lang = "nl"
fallback_langs = ["en", "l33t"]
allow_empty = true
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        let translations = &config.translations;

        assert_eq!(translations.path, Some(tmp.path().join("i18n/catalog.json")));
        assert_eq!(translations.default_lang, "nl");
        assert_eq!(translations.fallback_langs, vec!["en", "l33t"]);
        assert!(translations.allow_empty);
    }

    #[test]
    fn test_translations_defaults() {
        let config = load_str("").unwrap();
        let translations = &config.translations;

        assert_eq!(translations.path, None);
        assert_eq!(translations.default_lang, "en");
        assert!(translations.fallback_langs.is_empty());
        assert!(!translations.allow_empty);
    }

    #[test]
    fn test_translations_empty_default_lang() {
        let message = validation_message(load_str("[translations]\ndefault_lang = \"\"\n"));
        assert_eq!(message, "translations.default_lang cannot be empty");
    }

    #[test]
    fn test_link_requires_http_url() {
        let message = validation_message(load_str("[markup.links]\ndocs = \"ftp://example.com\"\n"));
        assert_eq!(message, "markup.links.docs must start with http:// or https://");
    }

    #[test]
    fn test_link_name_characters() {
        let message =
            validation_message(load_str("[markup.links]\n\"a b\" = \"https://example.com\"\n"));
        assert!(message.contains("invalid link name"));
    }

    #[test]
    fn test_explicit_path_not_found() {
        let result = Config::load(Some(Path::new("/nonexistent/dfx.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(load_str("[theme"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_cli_settings_override() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[markup]\ndefault_transpilers = true\n").unwrap();
        let settings = CliSettings {
            storage_path: Some(PathBuf::from("/tmp/override.json")),
            forced_theme: Some(Theme::Dark),
            default_transpilers: Some(false),
            translations_path: Some(PathBuf::from("/tmp/catalog.json")),
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(
            config.theme_resolved.storage_path,
            PathBuf::from("/tmp/override.json")
        );
        assert_eq!(config.theme_resolved.theme.forced_theme, Some(Theme::Dark));
        assert!(!config.markup.default_transpilers);
        assert_eq!(
            config.translations.path,
            Some(PathBuf::from("/tmp/catalog.json"))
        );
    }
}
