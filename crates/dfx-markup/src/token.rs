//! Tokens produced by the tokenize pass.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Intermediate unit produced from raw translation text.
///
/// Built-in transpilers use the dedicated variants. Custom transpilers carry
/// their own payload in [`Token::Custom`] and recognize it by downcasting.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// A single literal character.
    Char(char),
    /// Opening tag of a block pair (holds the tag text, e.g. `[b]`).
    BlockStart(String),
    /// Closing tag of a block pair (holds the tag text, e.g. `[/b]`).
    BlockEnd(String),
    /// `[link:parameterKey]`
    LinkStart {
        /// Translation parameter holding the link value.
        parameter_key: String,
    },
    /// `[/link]`
    LinkEnd,
    /// Interpolation expression including its delimiters (e.g. `{{ name }}`).
    Interpolation(String),
    /// Fixed string recognized by a substitution transpiler.
    Substitution(String),
    /// Transpiler-defined token.
    Custom(CustomToken),
}

/// Closing tag of link blocks.
pub const LINK_END_TAG: &str = "[/link]";

impl Token {
    /// The source text this token was scanned from.
    ///
    /// Used to render tokens that no transpiler claims as literal text.
    #[must_use]
    pub fn source_text(&self) -> Cow<'_, str> {
        match self {
            Self::Char(c) => Cow::Owned(c.to_string()),
            Self::BlockStart(tag)
            | Self::BlockEnd(tag)
            | Self::Interpolation(tag)
            | Self::Substitution(tag) => Cow::Borrowed(tag),
            Self::LinkStart { parameter_key } => Cow::Owned(format!("[link:{parameter_key}]")),
            Self::LinkEnd => Cow::Borrowed(LINK_END_TAG),
            Self::Custom(custom) => Cow::Borrowed(custom.source()),
        }
    }

    /// Length in bytes of the source text.
    #[must_use]
    pub fn source_len(&self) -> usize {
        match self {
            Self::Char(c) => c.len_utf8(),
            _ => self.source_text().len(),
        }
    }
}

/// Payload of a transpiler-defined token.
#[derive(Clone)]
pub struct CustomToken {
    source: String,
    payload: Arc<dyn Any + Send + Sync>,
}

impl CustomToken {
    /// Create a custom token from its source text and payload.
    pub fn new<T: Any + Send + Sync>(source: impl Into<String>, payload: T) -> Self {
        Self {
            source: source.into(),
            payload: Arc::new(payload),
        }
    }

    /// Source text the token was scanned from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Payload as `T`, if it has that type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }
}

impl PartialEq for CustomToken {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for CustomToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomToken")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
