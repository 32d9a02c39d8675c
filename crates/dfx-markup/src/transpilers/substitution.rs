//! Fixed string substitutions.

use crate::renderer::{Renderer, RendererFactory};
use crate::token::Token;
use crate::transpiler::{TokenizeResult, TranspileResult, Transpiler, TranspilerContext};

/// Replaces every occurrence of a fixed string with a fixed renderer.
#[derive(Clone, Debug)]
pub struct SubstitutionTranspiler {
    substitute: String,
    renderer: Renderer,
}

impl SubstitutionTranspiler {
    /// Replace `substitute` with the output of `renderer`.
    ///
    /// An empty `substitute` never matches.
    #[must_use]
    pub fn new(substitute: impl Into<String>, renderer: Renderer) -> Self {
        Self {
            substitute: substitute.into(),
            renderer,
        }
    }

    /// Replace `substitute` with plain text.
    #[must_use]
    pub fn text(substitute: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::new(substitute, RendererFactory::create_text_renderer(replacement))
    }

    /// The string being replaced.
    #[must_use]
    pub fn substitute(&self) -> &str {
        &self.substitute
    }
}

impl Transpiler for SubstitutionTranspiler {
    fn tokenize(&self, translation: &str, offset: usize) -> Option<TokenizeResult> {
        if self.substitute.is_empty() || !translation.get(offset..)?.starts_with(&self.substitute) {
            return None;
        }
        Some(TokenizeResult::new(
            Token::Substitution(self.substitute.clone()),
            offset + self.substitute.len(),
        ))
    }

    fn transpile(&self, offset: usize, context: &TranspilerContext<'_>) -> Option<TranspileResult> {
        match context.token(offset)? {
            Token::Substitution(s) if *s == self.substitute => {
                Some(TranspileResult::new(self.renderer.clone(), offset + 1))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::renderer::TranslationParams;

    #[test]
    fn test_tokenize_matches_substitute_only() {
        let transpiler = SubstitutionTranspiler::text("(c)", "\u{a9}");
        let translation = "(c) 2024 (c";

        assert_eq!(
            transpiler.tokenize(translation, 0),
            Some(TokenizeResult::new(Token::Substitution("(c)".to_owned()), 3))
        );
        for offset in 1..translation.len() {
            assert!(transpiler.tokenize(translation, offset).is_none(), "offset {offset}");
        }
    }

    #[test]
    fn test_empty_substitute_never_matches() {
        let transpiler = SubstitutionTranspiler::text("", "x");
        assert!(transpiler.tokenize("abc", 0).is_none());
    }

    #[test]
    fn test_transpile_ignores_other_substitutions() {
        let transpiler = SubstitutionTranspiler::text("(c)", "\u{a9}");
        let tokens = vec![
            Token::Substitution("(r)".to_owned()),
            Token::Substitution("(c)".to_owned()),
            Token::Char('c'),
        ];
        let params = TranslationParams::new();
        let context = TranspilerContext::new(&tokens, &params, &[]);

        assert!(transpiler.transpile(0, &context).is_none());
        let result = transpiler.transpile(1, &context).unwrap();
        assert_eq!(result.next_offset, 2);
        assert_eq!(result.renderer.render(&params).text_content(), "\u{a9}");
        assert!(transpiler.transpile(2, &context).is_none());
    }
}
