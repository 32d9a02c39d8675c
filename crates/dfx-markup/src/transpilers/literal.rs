//! Catch-all literal character transpiler.

use crate::renderer::RendererFactory;
use crate::token::Token;
use crate::transpiler::{TokenizeResult, TranspileResult, Transpiler, TranspilerContext};

/// Tokenizes every character and transpiles runs of characters into text.
///
/// Must be the last transpiler in a chain: it matches at every offset.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringLiteralTranspiler;

impl Transpiler for StringLiteralTranspiler {
    fn tokenize(&self, translation: &str, offset: usize) -> Option<TokenizeResult> {
        let c = translation.get(offset..)?.chars().next()?;
        Some(TokenizeResult::new(Token::Char(c), offset + c.len_utf8()))
    }

    fn transpile(&self, offset: usize, context: &TranspilerContext<'_>) -> Option<TranspileResult> {
        let mut text = String::new();
        let mut next = offset;
        while let Some(Token::Char(c)) = context.token(next) {
            text.push(*c);
            next += 1;
        }

        if text.is_empty() {
            return None;
        }
        Some(TranspileResult::new(
            RendererFactory::create_text_renderer(text),
            next,
        ))
    }
}
