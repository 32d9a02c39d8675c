//! Transpiler trait and the context shared by the transpile pass.

use std::sync::Arc;

use crate::renderer::{Renderer, RendererFactory, TranslationParams};
use crate::token::Token;

/// Result of a successful tokenize attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenizeResult {
    /// Token scanned at the requested offset.
    pub token: Token,
    /// Byte offset at which scanning resumes.
    pub next_offset: usize,
}

impl TokenizeResult {
    /// Create a tokenize result.
    #[must_use]
    pub fn new(token: Token, next_offset: usize) -> Self {
        Self { token, next_offset }
    }
}

/// Result of a successful transpile attempt.
#[derive(Clone, Debug)]
pub struct TranspileResult {
    /// Renderer for the consumed tokens.
    pub renderer: Renderer,
    /// Token index at which transpiling resumes.
    pub next_offset: usize,
}

impl TranspileResult {
    /// Create a transpile result.
    #[must_use]
    pub fn new(renderer: Renderer, next_offset: usize) -> Self {
        Self {
            renderer,
            next_offset,
        }
    }
}

/// Handler for one markup construct.
///
/// Both methods return `None` when the construct is not present at `offset`,
/// letting the next transpiler in the chain try.
///
/// # Example
///
/// ```
/// use dfx_markup::{
///     RendererFactory, Token, TokenizeResult, Transpiler, TranspilerContext,
///     TranspileResult,
/// };
///
/// /// Renders `(c)` as a copyright sign.
/// struct CopyrightTranspiler;
///
/// impl Transpiler for CopyrightTranspiler {
///     fn tokenize(&self, translation: &str, offset: usize) -> Option<TokenizeResult> {
///         translation[offset..].starts_with("(c)").then(|| {
///             TokenizeResult::new(Token::Substitution("(c)".to_owned()), offset + 3)
///         })
///     }
///
///     fn transpile(&self, offset: usize, context: &TranspilerContext<'_>) -> Option<TranspileResult> {
///         match context.token(offset)? {
///             Token::Substitution(s) if s == "(c)" => Some(TranspileResult::new(
///                 RendererFactory::create_text_renderer("\u{a9}"),
///                 offset + 1,
///             )),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Transpiler: Send + Sync {
    /// Try to scan the raw translation at byte `offset`.
    fn tokenize(&self, translation: &str, offset: usize) -> Option<TokenizeResult>;

    /// Try to transpile the token sequence at index `offset`.
    fn transpile(&self, offset: usize, context: &TranspilerContext<'_>) -> Option<TranspileResult>;
}

/// Deepest block nesting transpiled as markup.
///
/// Block and link tags opened beyond this depth stay unclaimed and render as
/// their source text.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Everything a transpiler can see while transpiling.
///
/// `tokens` is bounded by the range currently being transpiled, so lookahead
/// never crosses the end of an enclosing block.
pub struct TranspilerContext<'a> {
    /// Token sequence (indices are absolute).
    pub tokens: &'a [Token],
    /// Translation parameters known at transpile time.
    pub params: &'a TranslationParams,
    /// Active transpiler chain in registration order.
    pub transpilers: &'a [Arc<dyn Transpiler>],
    depth: usize,
}

impl<'a> TranspilerContext<'a> {
    /// Create a context over a full token sequence.
    #[must_use]
    pub fn new(
        tokens: &'a [Token],
        params: &'a TranslationParams,
        transpilers: &'a [Arc<dyn Transpiler>],
    ) -> Self {
        Self {
            tokens,
            params,
            transpilers,
            depth: 0,
        }
    }

    /// Number of ranges being transpiled, the top level included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether a block opened here may transpile its content.
    #[must_use]
    pub fn can_nest(&self) -> bool {
        self.depth <= MAX_NESTING_DEPTH
    }

    /// Token at `offset`, if within the visible range.
    #[must_use]
    pub fn token(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(offset)
    }

    /// Transpile the token range `start..end` through the whole chain.
    ///
    /// Tokens no transpiler claims render as their source text. A range
    /// nested deeper than [`MAX_NESTING_DEPTH`] renders as source text too.
    #[must_use]
    pub fn transpile(&self, start: usize, end: usize) -> Vec<Renderer> {
        let end = end.min(self.tokens.len());
        if start >= end {
            return Vec::new();
        }
        if !self.can_nest() {
            tracing::warn!(depth = self.depth, "Markup nested too deeply, rendering as text");
            let literal: String = self.tokens[start..end].iter().map(Token::source_text).collect();
            return vec![RendererFactory::create_text_renderer(literal)];
        }

        let view = TranspilerContext {
            tokens: &self.tokens[..end],
            params: self.params,
            transpilers: self.transpilers,
            depth: self.depth + 1,
        };

        let mut renderers = Vec::new();
        let mut offset = start;
        while offset < end {
            if let Some(result) = view.transpile_at(offset) {
                renderers.push(result.renderer);
                offset = result.next_offset;
            } else {
                let literal = view.tokens[offset].source_text();
                renderers.push(RendererFactory::create_text_renderer(literal));
                offset += 1;
            }
        }
        renderers
    }

    /// First transpiler result at `offset` that advances within range.
    fn transpile_at(&self, offset: usize) -> Option<TranspileResult> {
        for transpiler in self.transpilers {
            let Some(result) = transpiler.transpile(offset, self) else {
                continue;
            };
            if result.next_offset > offset && result.next_offset <= self.tokens.len() {
                return Some(result);
            }
            tracing::warn!(
                offset,
                next_offset = result.next_offset,
                "Discarding transpile result that does not advance within range"
            );
        }
        None
    }

    /// Index of the closing token matching the opening token at `offset`.
    ///
    /// Nested openings are counted so the match is at the same depth.
    #[must_use]
    pub fn find_closing(
        &self,
        offset: usize,
        is_open: impl Fn(&Token) -> bool,
        is_close: impl Fn(&Token) -> bool,
    ) -> Option<usize> {
        let mut depth = 0_usize;
        for (index, token) in self.tokens.iter().enumerate().skip(offset + 1) {
            if is_open(token) {
                depth += 1;
            } else if is_close(token) {
                if depth == 0 {
                    return Some(index);
                }
                depth -= 1;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<Token> {
        s.chars().map(Token::Char).collect()
    }

    fn is_b_start(token: &Token) -> bool {
        matches!(token, Token::BlockStart(t) if t == "[b]")
    }

    fn is_b_end(token: &Token) -> bool {
        matches!(token, Token::BlockEnd(t) if t == "[/b]")
    }

    #[test]
    fn test_unclaimed_tokens_render_as_source_text() {
        let mut tokens = chars("ab");
        tokens.push(Token::BlockStart("[b]".to_owned()));
        let params = TranslationParams::new();
        let context = TranspilerContext::new(&tokens, &params, &[]);

        let renderers = context.transpile(0, tokens.len());
        let text: String = RendererFactory::render_all(&renderers, &params)
            .iter()
            .map(crate::Node::text_content)
            .collect();

        assert_eq!(renderers.len(), 3);
        assert_eq!(text, "ab[b]");
    }

    #[test]
    fn test_find_closing_respects_depth() {
        let tokens = vec![
            Token::BlockStart("[b]".to_owned()),
            Token::BlockStart("[b]".to_owned()),
            Token::BlockEnd("[/b]".to_owned()),
            Token::BlockEnd("[/b]".to_owned()),
        ];
        let params = TranslationParams::new();
        let context = TranspilerContext::new(&tokens, &params, &[]);

        assert_eq!(context.find_closing(0, is_b_start, is_b_end), Some(3));
        assert_eq!(context.find_closing(1, is_b_start, is_b_end), Some(2));
        assert_eq!(context.find_closing(2, is_b_start, is_b_end), Some(3));
    }

    #[test]
    fn test_find_closing_unmatched() {
        let tokens = vec![Token::BlockStart("[b]".to_owned()), Token::Char('x')];
        let params = TranslationParams::new();
        let context = TranspilerContext::new(&tokens, &params, &[]);

        assert_eq!(context.find_closing(0, is_b_start, is_b_end), None);
    }

    /// Opens a `[b]` block without checking `can_nest`.
    struct GreedyBlock;

    impl Transpiler for GreedyBlock {
        fn tokenize(&self, _translation: &str, _offset: usize) -> Option<TokenizeResult> {
            None
        }

        fn transpile(&self, offset: usize, context: &TranspilerContext<'_>) -> Option<TranspileResult> {
            if !is_b_start(context.token(offset)?) {
                return None;
            }
            let end = context.find_closing(offset, is_b_start, is_b_end)?;
            let children = context.transpile(offset + 1, end);
            Some(TranspileResult::new(
                RendererFactory::create_element_renderer("b", children),
                end + 1,
            ))
        }
    }

    #[test]
    fn test_new_context_can_nest() {
        let tokens = chars("a");
        let params = TranslationParams::new();
        let context = TranspilerContext::new(&tokens, &params, &[]);

        assert_eq!(context.depth(), 0);
        assert!(context.can_nest());
    }

    #[test]
    fn test_transpile_stops_recursing_past_max_depth() {
        let levels = MAX_NESTING_DEPTH + 8;
        let mut tokens: Vec<Token> = (0..levels).map(|_| Token::BlockStart("[b]".to_owned())).collect();
        tokens.push(Token::Char('x'));
        tokens.extend((0..levels).map(|_| Token::BlockEnd("[/b]".to_owned())));
        let params = TranslationParams::new();
        let chain: Vec<Arc<dyn Transpiler>> = vec![Arc::new(GreedyBlock)];
        let context = TranspilerContext::new(&tokens, &params, &chain);

        let html: String = RendererFactory::render_all(&context.transpile(0, tokens.len()), &params)
            .iter()
            .map(crate::Node::to_html)
            .collect();

        // The block opened at the deepest level wraps its content as text.
        let elements = MAX_NESTING_DEPTH + 1;
        let inner = levels - elements;
        let expected = format!(
            "{}{}x{}{}",
            "<b>".repeat(elements),
            "[b]".repeat(inner),
            "[/b]".repeat(inner),
            "</b>".repeat(elements),
        );
        assert_eq!(html, expected);
    }

    #[test]
    fn test_transpile_clamps_range() {
        let tokens = chars("abc");
        let params = TranslationParams::new();
        let context = TranspilerContext::new(&tokens, &params, &[]);

        assert_eq!(context.transpile(1, 99).len(), 2);
        assert!(context.transpile(3, 3).is_empty());
    }
}
