//! Paired block tags (`[b]...[/b]`, `[i]...[/i]`, ...).

use std::fmt;
use std::sync::Arc;

use crate::renderer::{Renderer, RendererFactory};
use crate::token::Token;
use crate::transpiler::{TokenizeResult, TranspileResult, Transpiler, TranspilerContext};

type WrapFn = dyn Fn(Vec<Renderer>) -> Renderer + Send + Sync;

/// Transpiler for a start/end tag pair wrapping transpiled content.
///
/// The enclosed tokens are transpiled through the whole chain, so blocks nest.
/// A start tag without a matching end tag is left unclaimed and renders as
/// literal text.
///
/// # Example
///
/// ```
/// use dfx_markup::{BlockTranspiler, MarkupProcessor, TranslationParams};
///
/// let processor = MarkupProcessor::new()
///     .with_transpiler(BlockTranspiler::element("[u]", "[/u]", "u"));
/// let html = processor.render_html("[u]under[/u]", &TranslationParams::new());
/// assert_eq!(html, "<u>under</u>");
/// ```
#[derive(Clone)]
pub struct BlockTranspiler {
    start: String,
    end: String,
    wrap: Arc<WrapFn>,
}

impl BlockTranspiler {
    /// Create a block transpiler with a custom wrapping renderer.
    pub fn new<F>(start: impl Into<String>, end: impl Into<String>, wrap: F) -> Self
    where
        F: Fn(Vec<Renderer>) -> Renderer + Send + Sync + 'static,
    {
        Self {
            start: start.into(),
            end: end.into(),
            wrap: Arc::new(wrap),
        }
    }

    /// Create a block transpiler wrapping its content in an element.
    #[must_use]
    pub fn element(start: impl Into<String>, end: impl Into<String>, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self::new(start, end, move |children| {
            RendererFactory::create_element_renderer(tag.clone(), children)
        })
    }

    /// `[b]...[/b]` rendered as `<b>...</b>`.
    #[must_use]
    pub fn bold() -> Self {
        Self::element("[b]", "[/b]", "b")
    }

    /// `[i]...[/i]` rendered as `<i>...</i>`.
    #[must_use]
    pub fn italic() -> Self {
        Self::element("[i]", "[/i]", "i")
    }

    /// Opening tag text.
    #[must_use]
    pub fn start_tag(&self) -> &str {
        &self.start
    }

    /// Closing tag text.
    #[must_use]
    pub fn end_tag(&self) -> &str {
        &self.end
    }

    fn is_start(&self, token: &Token) -> bool {
        matches!(token, Token::BlockStart(tag) if *tag == self.start)
    }

    fn is_end(&self, token: &Token) -> bool {
        matches!(token, Token::BlockEnd(tag) if *tag == self.end)
    }
}

impl fmt::Debug for BlockTranspiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockTranspiler")
            .field("start", &self.start)
            .field("end", &self.end)
            .finish_non_exhaustive()
    }
}

impl Transpiler for BlockTranspiler {
    fn tokenize(&self, translation: &str, offset: usize) -> Option<TokenizeResult> {
        let rest = translation.get(offset..)?;
        if rest.starts_with(self.start.as_str()) {
            Some(TokenizeResult::new(
                Token::BlockStart(self.start.clone()),
                offset + self.start.len(),
            ))
        } else if rest.starts_with(self.end.as_str()) {
            Some(TokenizeResult::new(
                Token::BlockEnd(self.end.clone()),
                offset + self.end.len(),
            ))
        } else {
            None
        }
    }

    fn transpile(&self, offset: usize, context: &TranspilerContext<'_>) -> Option<TranspileResult> {
        if !self.is_start(context.token(offset)?) || !context.can_nest() {
            return None;
        }

        let end = context.find_closing(offset, |t| self.is_start(t), |t| self.is_end(t))?;
        let children = context.transpile(offset + 1, end);
        Some(TranspileResult::new((self.wrap)(children), end + 1))
    }
}
