//! Translation catalogs.
//!
//! A [`TranslationCatalog`] maps language to key to translation text. Lookups
//! try the requested language (or the default one), then the fallback
//! languages in order. Keys that are still missing are resolved by a
//! [`MissingTranslationHandler`], which renders the key itself by default.
//!
//! Empty texts count as missing unless empty values are allowed.
//!
//! # Catalog Files
//!
//! Catalogs load from JSON objects keyed by language. Nested objects are
//! flattened into dotted keys:
//!
//! ```json
//! {
//!   "en": { "TITLE": "Welcome to [b]Markup[/b]", "menu": { "home": "Home" } },
//!   "nl": { "TITLE": "Welkom bij [b]Markup[/b]" }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Language used when a lookup names none.
pub const DEFAULT_LANG: &str = "en";

/// Resolves translations missing from every searched language.
pub trait MissingTranslationHandler: Send + Sync {
    /// Text to render for `key`, requested in `lang`.
    fn handle(&self, key: &str, lang: &str) -> String;
}

/// Renders the missing key itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyMissingHandler;

impl MissingTranslationHandler for KeyMissingHandler {
    fn handle(&self, key: &str, _lang: &str) -> String {
        key.to_owned()
    }
}

/// Error type for catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Malformed JSON.
    #[error("Invalid translations JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Well-formed JSON with an unexpected shape.
    #[error("Invalid translations: {0}")]
    Invalid(String),
}

/// Translations by language and key.
#[derive(Clone)]
pub struct TranslationCatalog {
    languages: HashMap<String, HashMap<String, String>>,
    default_lang: String,
    fallback_langs: Vec<String>,
    allow_empty: bool,
    missing_handler: Arc<dyn MissingTranslationHandler>,
}

impl Default for TranslationCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TranslationCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationCatalog")
            .field("languages", &self.languages())
            .field("default_lang", &self.default_lang)
            .field("fallback_langs", &self.fallback_langs)
            .field("allow_empty", &self.allow_empty)
            .finish_non_exhaustive()
    }
}

impl TranslationCatalog {
    /// Create an empty catalog with `en` as the default language.
    #[must_use]
    pub fn new() -> Self {
        Self {
            languages: HashMap::new(),
            default_lang: DEFAULT_LANG.to_owned(),
            fallback_langs: Vec::new(),
            allow_empty: false,
            missing_handler: Arc::new(KeyMissingHandler),
        }
    }

    /// Parse a catalog from a JSON object keyed by language.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, a language is not an
    /// object, or a translation is not a string.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let Value::Object(languages) = serde_json::from_str::<Value>(content)? else {
            return Err(CatalogError::Invalid(
                "expected an object keyed by language".to_owned(),
            ));
        };

        let mut catalog = Self::new();
        for (lang, translations) in languages {
            let Value::Object(translations) = translations else {
                return Err(CatalogError::Invalid(format!(
                    "language \"{lang}\" must be an object"
                )));
            };
            let mut flat = HashMap::new();
            flatten(&lang, "", translations, &mut flat)?;
            catalog.languages.insert(lang, flat);
        }
        Ok(catalog)
    }

    /// Add or extend the translations of `lang`.
    #[must_use]
    pub fn with_translations<K, V>(
        mut self,
        lang: impl Into<String>,
        translations: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.languages.entry(lang.into()).or_default().extend(
            translations
                .into_iter()
                .map(|(key, text)| (key.into(), text.into())),
        );
        self
    }

    /// Set the language used when a lookup names none.
    #[must_use]
    pub fn with_default_lang(mut self, lang: impl Into<String>) -> Self {
        self.default_lang = lang.into();
        self
    }

    /// Set the languages searched, in order, after the requested one.
    #[must_use]
    pub fn with_fallback_langs(mut self, langs: Vec<String>) -> Self {
        self.fallback_langs = langs;
        self
    }

    /// Treat empty texts as translations instead of missing ones.
    #[must_use]
    pub fn with_allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    /// Replace the handler for missing translations.
    #[must_use]
    pub fn with_missing_handler<H: MissingTranslationHandler + 'static>(mut self, handler: H) -> Self {
        self.missing_handler = Arc::new(handler);
        self
    }

    /// Language used when a lookup names none.
    #[must_use]
    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }

    /// Known languages, sorted.
    #[must_use]
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.languages.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }

    /// Text of `key` in `lang` or a fallback language, if any.
    #[must_use]
    pub fn lookup(&self, key: &str, lang: Option<&str>) -> Option<&str> {
        let lang = lang.unwrap_or(&self.default_lang);
        std::iter::once(lang)
            .chain(self.fallback_langs.iter().map(String::as_str))
            .filter_map(|lang| self.languages.get(lang)?.get(key))
            .find(|text| self.allow_empty || !text.is_empty())
            .map(String::as_str)
    }

    /// Text of `key`, resolved through the missing handler when absent.
    #[must_use]
    pub fn translate(&self, key: &str, lang: Option<&str>) -> String {
        if let Some(text) = self.lookup(key, lang) {
            return text.to_owned();
        }
        let lang = lang.unwrap_or(&self.default_lang);
        tracing::warn!(key, lang, "Missing translation");
        self.missing_handler.handle(key, lang)
    }

    /// Source text for rendering.
    ///
    /// A translation `key` takes precedence over pre-translated `content`.
    /// Without either the text is empty.
    #[must_use]
    pub fn source_text(&self, key: Option<&str>, content: Option<&str>, lang: Option<&str>) -> String {
        match (key, content) {
            (Some(key), _) => self.translate(key, lang),
            (None, Some(content)) => content.to_owned(),
            (None, None) => String::new(),
        }
    }
}

fn flatten(
    lang: &str,
    prefix: &str,
    translations: Map<String, Value>,
    out: &mut HashMap<String, String>,
) -> Result<(), CatalogError> {
    for (key, value) in translations {
        let key = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::String(text) => {
                out.insert(key, text);
            }
            Value::Object(nested) => flatten(lang, &key, nested, out)?,
            other => {
                return Err(CatalogError::Invalid(format!(
                    "\"{lang}.{key}\" must be a string, got {other}"
                )));
            }
        }
    }
    Ok(())
}
