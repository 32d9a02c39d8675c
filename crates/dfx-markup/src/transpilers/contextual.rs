//! Links whose target is fixed when the transpiler is built.
//!
//! Useful for translations that always link to the same place, e.g.
//! `Read our [privacy]privacy policy[/privacy]`, without passing the URL as a
//! translation parameter on every render.

use std::sync::Arc;

use serde_json::Value;

use crate::node::Node;
use crate::renderer::Renderer;
use crate::transpiler::{TokenizeResult, TranspileResult, Transpiler, TranspilerContext};
use crate::transpilers::block::BlockTranspiler;
use crate::transpilers::link::{LinkRenderer, default_link_renderers, render_link};
use crate::transpilers::substitution::SubstitutionTranspiler;

/// Builds contextual link transpilers sharing one set of link renderers.
#[derive(Clone)]
pub struct ContextualLinkTranspilerFactory {
    link_renderers: Arc<[Arc<dyn LinkRenderer>]>,
}

impl Default for ContextualLinkTranspilerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextualLinkTranspilerFactory {
    /// Create a factory using the default link renderers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_link_renderers(default_link_renderers())
    }

    /// Create a factory using custom link renderers.
    #[must_use]
    pub fn with_link_renderers(link_renderers: Vec<Arc<dyn LinkRenderer>>) -> Self {
        Self {
            link_renderers: link_renderers.into(),
        }
    }

    /// `start...end` rendered as a link to `link`.
    #[must_use]
    pub fn create_block_transpiler(
        &self,
        start: impl Into<String>,
        end: impl Into<String>,
        link: Value,
    ) -> ContextualLinkBlockTranspiler {
        let link_renderers = Arc::clone(&self.link_renderers);
        let link = Arc::new(link);
        let block = BlockTranspiler::new(start, end, move |children| {
            let link_renderers = Arc::clone(&link_renderers);
            let link = Arc::clone(&link);
            Renderer::new(move |params| {
                let content = children.iter().map(|r| r.render(params)).collect();
                render_link(&link_renderers, Some(&link), content)
            })
        });
        ContextualLinkBlockTranspiler { block }
    }

    /// `substitute` replaced by a link to `link` reading `text`.
    #[must_use]
    pub fn create_substitution_transpiler(
        &self,
        substitute: impl Into<String>,
        text: impl Into<String>,
        link: Value,
    ) -> ContextualLinkSubstitutionTranspiler {
        let link_renderers = Arc::clone(&self.link_renderers);
        let text = text.into();
        let renderer = Renderer::new(move |_| {
            render_link(&link_renderers, Some(&link), vec![Node::text(text.clone())])
        });
        ContextualLinkSubstitutionTranspiler {
            substitution: SubstitutionTranspiler::new(substitute, renderer),
        }
    }
}

/// Block tags linking their content to a fixed link value.
#[derive(Clone, Debug)]
pub struct ContextualLinkBlockTranspiler {
    block: BlockTranspiler,
}

impl Transpiler for ContextualLinkBlockTranspiler {
    fn tokenize(&self, translation: &str, offset: usize) -> Option<TokenizeResult> {
        self.block.tokenize(translation, offset)
    }

    fn transpile(&self, offset: usize, context: &TranspilerContext<'_>) -> Option<TranspileResult> {
        self.block.transpile(offset, context)
    }
}

/// A fixed string replaced by a link with fixed text.
#[derive(Clone, Debug)]
pub struct ContextualLinkSubstitutionTranspiler {
    substitution: SubstitutionTranspiler,
}

impl Transpiler for ContextualLinkSubstitutionTranspiler {
    fn tokenize(&self, translation: &str, offset: usize) -> Option<TokenizeResult> {
        self.substitution.tokenize(translation, offset)
    }

    fn transpile(&self, offset: usize, context: &TranspilerContext<'_>) -> Option<TranspileResult> {
        self.substitution.transpile(offset, context)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::renderer::TranslationParams;
    use crate::token::Token;
    use crate::transpilers::StringLiteralTranspiler;

    #[test]
    fn test_block_transpiler_links_content() {
        let transpiler = ContextualLinkTranspilerFactory::new().create_block_transpiler(
            "[privacy]",
            "[/privacy]",
            json!("https://example.com/privacy"),
        );
        let tokens = vec![
            Token::BlockStart("[privacy]".to_owned()),
            Token::Char('h'),
            Token::Char('i'),
            Token::BlockEnd("[/privacy]".to_owned()),
        ];
        let params = TranslationParams::new();
        let chain: Vec<Arc<dyn Transpiler>> = vec![Arc::new(StringLiteralTranspiler)];
        let context = TranspilerContext::new(&tokens, &params, &chain);

        let result = transpiler.transpile(0, &context).unwrap();
        assert_eq!(result.next_offset, 4);
        assert_eq!(
            result.renderer.render(&params).to_html(),
            r#"<a href="https://example.com/privacy" target="_blank">hi</a>"#
        );
    }

    #[test]
    fn test_substitution_transpiler_renders_fixed_link() {
        let transpiler = ContextualLinkTranspilerFactory::new().create_substitution_transpiler(
            "%docs%",
            "the docs",
            json!({ "url": "/docs", "target": "_self" }),
        );
        let translation = "see %docs%";

        let tokenized = transpiler.tokenize(translation, 4).unwrap();
        assert_eq!(tokenized.next_offset, 10);

        let tokens = vec![tokenized.token];
        let params = TranslationParams::new();
        let context = TranspilerContext::new(&tokens, &params, &[]);
        let result = transpiler.transpile(0, &context).unwrap();
        assert_eq!(
            result.renderer.render(&params).to_html(),
            r#"<a href="/docs" target="_self">the docs</a>"#
        );
    }

    #[test]
    fn test_unsupported_link_value_renders_plain_text() {
        let transpiler = ContextualLinkTranspilerFactory::with_link_renderers(Vec::new())
            .create_substitution_transpiler("%x%", "plain", json!("https://x.test"));
        let tokens = vec![Token::Substitution("%x%".to_owned())];
        let params = TranslationParams::new();
        let context = TranspilerContext::new(&tokens, &params, &[]);

        let node = transpiler.transpile(0, &context).unwrap().renderer.render(&params);
        assert_eq!(node, Node::Fragment(vec![Node::text("plain")]));
    }
}
