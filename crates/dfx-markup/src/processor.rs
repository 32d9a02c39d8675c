//! Markup processor driving the tokenize and transpile passes.

use std::fmt;
use std::sync::Arc;

use crate::node::{Node, nodes_text_content, nodes_to_html};
use crate::renderer::{Renderer, RendererFactory, TranslationParams};
use crate::token::Token;
use crate::transpiler::{TokenizeResult, Transpiler, TranspilerContext};
use crate::transpilers::{
    BlockTranspiler, LinkTranspiler, StringInterpolationTranspiler, StringLiteralTranspiler,
};

/// Renders translation markup through an ordered transpiler chain.
///
/// The effective chain is the registered transpilers in order, then the
/// interpolation transpiler, then the literal character transpiler. Earlier
/// transpilers win at every offset, so register more specific ones first.
///
/// # Example
///
/// ```
/// use dfx_markup::{MarkupProcessor, TranslationParams};
///
/// let processor = MarkupProcessor::new().with_default_transpilers();
/// let html = processor.render_html(
///     "Welcome to [b]Transloco [i]Markup[/i][/b]",
///     &TranslationParams::new(),
/// );
/// assert_eq!(html, "Welcome to <b>Transloco <i>Markup</i></b>");
/// ```
#[derive(Clone)]
pub struct MarkupProcessor {
    transpilers: Vec<Arc<dyn Transpiler>>,
    interpolation: Arc<dyn Transpiler>,
    literal: Arc<dyn Transpiler>,
}

impl Default for MarkupProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MarkupProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkupProcessor")
            .field("transpilers", &self.transpilers.len())
            .finish_non_exhaustive()
    }
}

impl MarkupProcessor {
    /// Create a processor that only handles interpolation and literal text.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transpilers: Vec::new(),
            interpolation: Arc::new(StringInterpolationTranspiler::new()),
            literal: Arc::new(StringLiteralTranspiler),
        }
    }

    /// Append a transpiler to the chain.
    #[must_use]
    pub fn with_transpiler<T: Transpiler + 'static>(mut self, transpiler: T) -> Self {
        self.transpilers.push(Arc::new(transpiler));
        self
    }

    /// Append the bold, italic and link transpilers.
    #[must_use]
    pub fn with_default_transpilers(self) -> Self {
        self.with_transpiler(BlockTranspiler::bold())
            .with_transpiler(BlockTranspiler::italic())
            .with_transpiler(LinkTranspiler::new())
    }

    /// Place `inline` before the registered transpilers.
    ///
    /// When `merge` is false the registered transpilers are dropped and only
    /// `inline` remains (interpolation and literal text still apply).
    #[must_use]
    pub fn with_inline_transpilers(mut self, inline: Vec<Arc<dyn Transpiler>>, merge: bool) -> Self {
        if merge {
            self.transpilers.splice(0..0, inline);
        } else {
            self.transpilers = inline;
        }
        self
    }

    /// Replace the interpolation transpiler.
    #[must_use]
    pub fn with_interpolation(mut self, interpolation: StringInterpolationTranspiler) -> Self {
        self.interpolation = Arc::new(interpolation);
        self
    }

    /// The effective transpiler chain.
    #[must_use]
    pub fn transpilers(&self) -> Vec<Arc<dyn Transpiler>> {
        self.transpilers
            .iter()
            .chain([&self.interpolation, &self.literal])
            .map(Arc::clone)
            .collect()
    }

    /// Scan `text` into tokens.
    ///
    /// Every byte of `text` is covered by exactly one token.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        tokenize_with(&self.transpilers(), text)
    }

    /// Tokenize and transpile `text` into renderers.
    #[must_use]
    pub fn transpile(&self, text: &str, params: &TranslationParams) -> Vec<Renderer> {
        let chain = self.transpilers();
        let tokens = tokenize_with(&chain, text);
        TranspilerContext::new(&tokens, params, &chain).transpile(0, tokens.len())
    }

    /// Render `text` into nodes.
    #[must_use]
    pub fn render(&self, text: &str, params: &TranslationParams) -> Vec<Node> {
        RendererFactory::render_all(&self.transpile(text, params), params)
    }

    /// Render `text` as escaped HTML.
    #[must_use]
    pub fn render_html(&self, text: &str, params: &TranslationParams) -> String {
        nodes_to_html(&self.render(text, params))
    }

    /// Render `text` as plain text, dropping all markup.
    #[must_use]
    pub fn render_text(&self, text: &str, params: &TranslationParams) -> String {
        nodes_text_content(&self.render(text, params))
    }
}

fn tokenize_with(chain: &[Arc<dyn Transpiler>], text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    while offset < text.len() {
        if let Some(result) = tokenize_at(chain, text, offset) {
            tokens.push(result.token);
            offset = result.next_offset;
            continue;
        }

        let Some(c) = text.get(offset..).and_then(|rest| rest.chars().next()) else {
            break;
        };
        tokens.push(Token::Char(c));
        offset += c.len_utf8();
    }

    tokens
}

/// First valid tokenize result at `offset`.
fn tokenize_at(chain: &[Arc<dyn Transpiler>], text: &str, offset: usize) -> Option<TokenizeResult> {
    for transpiler in chain {
        let Some(result) = transpiler.tokenize(text, offset) else {
            continue;
        };
        let next = result.next_offset;
        if next > offset && next <= text.len() && text.is_char_boundary(next) {
            return Some(result);
        }
        tracing::warn!(
            offset,
            next_offset = next,
            "Discarding tokenize result that does not advance to a valid offset"
        );
    }
    None
}
