//! `dfx render` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use dfx_config::{CliSettings, Config, MarkupConfig, TranslationsConfig};
use dfx_markup::{
    ContextualLinkTranspilerFactory, MarkupProcessor, TranslationCatalog, TranslationParams,
};
use serde_json::Value;

use crate::error::CliError;

/// Output format for rendered markup.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub(crate) enum Format {
    /// HTML with escaped text.
    #[default]
    Html,
    /// Concatenated text content.
    Text,
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Translation string, e.g. "Read the [link:terms]terms[/link]".
    text: Option<String>,

    /// Catalog key to render (takes precedence over the text).
    #[arg(short, long)]
    key: Option<String>,

    /// Catalog language (default: the configured default language).
    #[arg(short, long)]
    lang: Option<String>,

    /// Translation catalog JSON (overrides config).
    #[arg(long, value_name = "FILE")]
    translations: Option<PathBuf>,

    /// Fallback language (repeatable, overrides config).
    #[arg(long = "fallback-lang", value_name = "LANG")]
    fallback_langs: Vec<String>,

    /// Render empty catalog values instead of treating them as missing.
    #[arg(long)]
    allow_empty: bool,

    /// Parameter as key=value (repeatable, overrides --params).
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Parameters as a JSON object.
    #[arg(long = "params", value_name = "JSON")]
    params_json: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Disable the bold, italic and link tags.
    #[arg(long)]
    no_defaults: bool,

    /// Path to configuration file (default: auto-discover dfx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, parameters or the translation
    /// catalog are invalid.
    pub(crate) fn execute(mut self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            default_transpilers: self.no_defaults.then_some(false),
            translations_path: self.translations.take(),
            ..CliSettings::default()
        };
        let mut config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if !self.fallback_langs.is_empty() {
            config.translations.fallback_langs = std::mem::take(&mut self.fallback_langs);
        }
        config.translations.allow_empty |= self.allow_empty;

        let source = self.source_text(&config.translations)?;
        let params = parse_params(self.params_json.as_deref(), &self.params)?;
        let processor = build_processor(&config.markup);
        tracing::info!(transpilers = processor.transpilers().len(), "Rendering");

        let rendered = match self.format {
            Format::Html => processor.render_html(&source, &params),
            Format::Text => processor.render_text(&source, &params),
        };
        writeln!(io::stdout(), "{rendered}")?;

        Ok(())
    }
}

impl RenderArgs {
    /// Markup source: the catalog entry for `--key`, else the positional text.
    fn source_text(&self, translations: &TranslationsConfig) -> Result<String, CliError> {
        let Some(key) = self.key.as_deref() else {
            return Ok(self.text.clone().unwrap_or_default());
        };
        let Some(path) = &translations.path else {
            return Err(CliError::Validation(
                "--key requires a translation catalog (--translations or [translations] path)"
                    .to_owned(),
            ));
        };
        let catalog = load_catalog(path, translations)?;
        Ok(catalog.source_text(Some(key), self.text.as_deref(), self.lang.as_deref()))
    }
}

/// Read a JSON catalog and apply the configured language options.
fn load_catalog(
    path: &std::path::Path,
    translations: &TranslationsConfig,
) -> Result<TranslationCatalog, CliError> {
    let content = std::fs::read_to_string(path)?;
    let catalog = TranslationCatalog::from_json(&content)?
        .with_default_lang(translations.default_lang.as_str())
        .with_fallback_langs(translations.fallback_langs.clone())
        .with_allow_empty(translations.allow_empty);
    tracing::debug!(
        path = %path.display(),
        languages = catalog.languages().len(),
        "Loaded translation catalog"
    );
    Ok(catalog)
}

/// Build the processor for the configured markup.
///
/// Contextual links come first so a configured `[name]` tag wins over the
/// built-in tags.
fn build_processor(markup: &MarkupConfig) -> MarkupProcessor {
    let factory = ContextualLinkTranspilerFactory::new();
    let mut processor = MarkupProcessor::new();
    for (name, url) in &markup.links {
        processor = processor.with_transpiler(factory.create_block_transpiler(
            format!("[{name}]"),
            format!("[/{name}]"),
            Value::String(url.clone()),
        ));
    }
    if markup.default_transpilers {
        processor = processor.with_default_transpilers();
    }
    processor
}

/// Merge `--params` JSON with `-p key=value` pairs.
fn parse_params(json: Option<&str>, pairs: &[String]) -> Result<TranslationParams, CliError> {
    let mut params = TranslationParams::new();

    if let Some(json) = json {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(map) => params.extend(map),
            other => {
                return Err(CliError::Validation(format!(
                    "--params must be a JSON object, got {other}"
                )));
            }
        }
    }

    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(CliError::Validation(format!(
                "Invalid parameter \"{pair}\" (expected KEY=VALUE)"
            )));
        };
        if key.is_empty() {
            return Err(CliError::Validation(format!(
                "Invalid parameter \"{pair}\" (empty key)"
            )));
        }
        params.insert(key.to_owned(), Value::String(value.to_owned()));
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    const CATALOG: &str = r#"{
        "en": {"TITLE": "[b]Hello[/b] {{ name }}", "EMPTY": "", "ONLY_EN": "English only"},
        "nl": {"TITLE": "[b]Hallo[/b] {{ name }}", "EMPTY": ""},
        "l33t": {"TITLE": "H3ll0", "SECRET": "l33t only"}
    }"#;

    fn write_catalog(tmp: &TempDir) -> PathBuf {
        let path = tmp.path().join("catalog.json");
        std::fs::write(&path, CATALOG).unwrap();
        path
    }

    fn render_args(key: Option<&str>, text: Option<&str>, lang: Option<&str>) -> RenderArgs {
        RenderArgs {
            text: text.map(ToOwned::to_owned),
            key: key.map(ToOwned::to_owned),
            lang: lang.map(ToOwned::to_owned),
            translations: None,
            fallback_langs: Vec::new(),
            allow_empty: false,
            params: Vec::new(),
            params_json: None,
            format: Format::Html,
            no_defaults: false,
            config: None,
        }
    }

    fn translations(path: Option<PathBuf>) -> TranslationsConfig {
        TranslationsConfig {
            path,
            ..TranslationsConfig::default()
        }
    }

    fn markup(default_transpilers: bool, links: &[(&str, &str)]) -> MarkupConfig {
        MarkupConfig {
            default_transpilers,
            links: links
                .iter()
                .map(|(name, url)| ((*name).to_owned(), (*url).to_owned()))
                .collect(),
        }
    }

    #[test]
    fn test_parse_params_pairs_override_json() {
        let params = parse_params(
            Some(r#"{"name": "Ada", "link": {"url": "https://example.com"}}"#),
            &["name=Grace".to_owned(), "expr=a=b".to_owned()],
        )
        .unwrap();

        assert_eq!(params.get("name"), Some(&json!("Grace")));
        assert_eq!(params.get("expr"), Some(&json!("a=b")));
        assert_eq!(params.get("link"), Some(&json!({"url": "https://example.com"})));
    }

    #[test]
    fn test_parse_params_rejects_non_object() {
        let result = parse_params(Some("[1, 2]"), &[]);
        assert!(matches!(result, Err(CliError::Validation(_))));

        let result = parse_params(Some("{"), &[]);
        assert!(matches!(result, Err(CliError::Json(_))));
    }

    #[test]
    fn test_parse_params_rejects_bad_pair() {
        assert!(parse_params(None, &["novalue".to_owned()]).is_err());
        assert!(parse_params(None, &["=value".to_owned()]).is_err());
    }

    #[test]
    fn test_source_text_from_catalog() {
        let tmp = TempDir::new().unwrap();
        let config = translations(Some(write_catalog(&tmp)));

        let args = render_args(Some("TITLE"), None, Some("nl"));
        let source = args.source_text(&config).unwrap();
        assert_eq!(source, "[b]Hallo[/b] {{ name }}");

        let processor = build_processor(&markup(true, &[]));
        let params = parse_params(None, &["name=Ada".to_owned()]).unwrap();
        assert_eq!(processor.render_html(&source, &params), "<b>Hallo</b> Ada");
    }

    #[test]
    fn test_source_text_default_lang() {
        let tmp = TempDir::new().unwrap();
        let config = translations(Some(write_catalog(&tmp)));

        let args = render_args(Some("TITLE"), None, None);
        assert_eq!(args.source_text(&config).unwrap(), "[b]Hello[/b] {{ name }}");
    }

    #[test]
    fn test_source_text_key_beats_text() {
        let tmp = TempDir::new().unwrap();
        let config = translations(Some(write_catalog(&tmp)));

        let args = render_args(Some("TITLE"), Some("ignored"), Some("l33t"));
        assert_eq!(args.source_text(&config).unwrap(), "H3ll0");
    }

    #[test]
    fn test_source_text_missing_key_renders_key() {
        let tmp = TempDir::new().unwrap();
        let config = translations(Some(write_catalog(&tmp)));

        let args = render_args(Some("SECRET"), None, Some("en"));
        assert_eq!(args.source_text(&config).unwrap(), "SECRET");
    }

    #[test]
    fn test_source_text_fallback_langs() {
        let tmp = TempDir::new().unwrap();
        let mut config = translations(Some(write_catalog(&tmp)));
        config.fallback_langs = vec!["l33t".to_owned()];

        let args = render_args(Some("SECRET"), None, Some("nl"));
        assert_eq!(args.source_text(&config).unwrap(), "l33t only");
    }

    #[test]
    fn test_source_text_empty_value() {
        let tmp = TempDir::new().unwrap();
        let mut config = translations(Some(write_catalog(&tmp)));

        let args = render_args(Some("EMPTY"), None, Some("nl"));
        assert_eq!(args.source_text(&config).unwrap(), "EMPTY");

        config.allow_empty = true;
        assert_eq!(args.source_text(&config).unwrap(), "");
    }

    #[test]
    fn test_source_text_without_key_or_text() {
        let args = render_args(None, None, None);
        assert_eq!(args.source_text(&translations(None)).unwrap(), "");

        let args = render_args(None, Some("[i]plain[/i]"), Some("nl"));
        assert_eq!(args.source_text(&translations(None)).unwrap(), "[i]plain[/i]");
    }

    #[test]
    fn test_source_text_key_requires_catalog() {
        let args = render_args(Some("TITLE"), None, None);
        assert!(matches!(
            args.source_text(&translations(None)),
            Err(CliError::Validation(_))
        ));
    }

    #[test]
    fn test_source_text_invalid_catalog() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(&path, r#"{"en": {"TITLE": 1}}"#).unwrap();

        let args = render_args(Some("TITLE"), None, None);
        assert!(matches!(
            args.source_text(&translations(Some(path))),
            Err(CliError::Catalog(_))
        ));
    }

    #[test]
    fn test_build_processor_defaults() {
        let processor = build_processor(&markup(true, &[]));
        let params = parse_params(None, &["docs=https://example.com/docs".to_owned()]).unwrap();

        assert_eq!(
            processor.render_html("[b]Read[/b] the [link:docs]docs[/link]", &params),
            r#"<b>Read</b> the <a href="https://example.com/docs" target="_blank">docs</a>"#
        );
    }

    #[test]
    fn test_build_processor_without_defaults() {
        let processor = build_processor(&markup(false, &[]));
        assert_eq!(
            processor.render_html("[b]Read[/b]", &TranslationParams::new()),
            "[b]Read[/b]"
        );
    }

    #[test]
    fn test_build_processor_contextual_links() {
        let processor = build_processor(&markup(true, &[("privacy", "https://example.com/privacy")]));
        assert_eq!(
            processor.render_html(
                "See our [privacy][i]policy[/i][/privacy]",
                &TranslationParams::new()
            ),
            r#"See our <a href="https://example.com/privacy" target="_blank"><i>policy</i></a>"#
        );
        assert_eq!(
            processor.render_text("See our [privacy]policy[/privacy]", &TranslationParams::new()),
            "See our policy"
        );
    }
}
