//! Interpolation expressions (`{{ expr }}`).
//!
//! Expressions are recognized by an [`InterpolationExpressionMatcher`] during
//! tokenization and expanded by an [`InterpolationExpander`] at render time.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

use crate::node::Node;
use crate::renderer::{Renderer, TranslationParams};
use crate::token::Token;
use crate::transpiler::{TokenizeResult, TranspileResult, Transpiler, TranspilerContext};

static DOUBLE_BRACE_EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(.*?)\s*\}\}").unwrap());

/// Recognizes interpolation expressions in raw translation text.
pub trait InterpolationExpressionMatcher: Send + Sync {
    /// Byte length of the expression starting at `offset`, if any.
    fn match_expression(&self, value: &str, offset: usize) -> Option<usize>;
}

/// Matches expressions between a start and end delimiter.
///
/// An expression without its end delimiter does not match.
#[derive(Debug, Clone)]
pub struct DelimitedExpressionMatcher {
    start: String,
    end: String,
}

impl DelimitedExpressionMatcher {
    /// Create a matcher for custom delimiters.
    #[must_use]
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl Default for DelimitedExpressionMatcher {
    fn default() -> Self {
        Self::new("{{", "}}")
    }
}

impl InterpolationExpressionMatcher for DelimitedExpressionMatcher {
    fn match_expression(&self, value: &str, offset: usize) -> Option<usize> {
        let rest = value.get(offset..)?;
        let inner = rest.strip_prefix(self.start.as_str())?;
        let end = inner.find(self.end.as_str())?;
        Some(self.start.len() + end + self.end.len())
    }
}

/// Expands an interpolation expression into text.
pub trait InterpolationExpander: Send + Sync {
    /// Expand `expression` (including delimiters) using `params`.
    fn expand(&self, expression: &str, params: &TranslationParams) -> String;
}

/// Replaces `{{ key.path }}` with the parameter value at that path.
///
/// Missing values expand to an empty string. Text outside `{{ }}` is kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParamsExpander;

impl InterpolationExpander for ParamsExpander {
    fn expand(&self, expression: &str, params: &TranslationParams) -> String {
        DOUBLE_BRACE_EXPRESSION
            .replace_all(expression, |caps: &regex::Captures<'_>| {
                lookup_param(params, &caps[1]).map_or_else(String::new, value_to_text)
            })
            .into_owned()
    }
}

/// Resolve a parameter by exact key first, then by dotted path.
fn lookup_param<'a>(params: &'a TranslationParams, key: &str) -> Option<&'a Value> {
    if let Some(value) = params.get(key) {
        return Some(value);
    }

    let mut segments = key.split('.');
    let mut current = params.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Transpiler for interpolation expressions.
#[derive(Clone)]
pub struct StringInterpolationTranspiler {
    matcher: Arc<dyn InterpolationExpressionMatcher>,
    expander: Arc<dyn InterpolationExpander>,
}

impl Default for StringInterpolationTranspiler {
    fn default() -> Self {
        Self::new()
    }
}

impl StringInterpolationTranspiler {
    /// Create a transpiler for `{{ }}` expressions expanded from parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            matcher: Arc::new(DelimitedExpressionMatcher::default()),
            expander: Arc::new(ParamsExpander),
        }
    }

    /// Replace the expression matcher.
    #[must_use]
    pub fn with_matcher<M: InterpolationExpressionMatcher + 'static>(mut self, matcher: M) -> Self {
        self.matcher = Arc::new(matcher);
        self
    }

    /// Replace the expression expander.
    #[must_use]
    pub fn with_expander<E: InterpolationExpander + 'static>(mut self, expander: E) -> Self {
        self.expander = Arc::new(expander);
        self
    }
}

impl Transpiler for StringInterpolationTranspiler {
    fn tokenize(&self, translation: &str, offset: usize) -> Option<TokenizeResult> {
        let length = self.matcher.match_expression(translation, offset)?;
        let expression = translation.get(offset..offset + length)?;
        if expression.is_empty() {
            return None;
        }
        Some(TokenizeResult::new(
            Token::Interpolation(expression.to_owned()),
            offset + length,
        ))
    }

    fn transpile(&self, offset: usize, context: &TranspilerContext<'_>) -> Option<TranspileResult> {
        let Token::Interpolation(expression) = context.token(offset)? else {
            return None;
        };

        let expression = expression.clone();
        let expander = Arc::clone(&self.expander);
        let renderer = Renderer::new(move |params| Node::Text(expander.expand(&expression, params)));
        Some(TranspileResult::new(renderer, offset + 1))
    }
}
