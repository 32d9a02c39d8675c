//! Transpiler-chain renderer for bracket-tagged translation markup.
//!
//! Translation strings such as `Welcome to [b]Transloco [i]Markup[/i][/b]`
//! are rendered in three steps:
//!
//! 1. **Tokenize**: an ordered chain of [`Transpiler`]s scans the string.
//!    At every offset the first transpiler that recognizes something emits a
//!    [`Token`]; the [`StringLiteralTranspiler`] at the end of the chain
//!    catches every remaining character.
//! 2. **Transpile**: the same chain turns the token sequence into deferred
//!    [`Renderer`]s. Block transpilers find their matching end token, and
//!    recursively transpile the enclosed range through the whole chain.
//! 3. **Render**: renderers are invoked with [`TranslationParams`] and
//!    produce a [`Node`] tree, which serializes to escaped HTML.
//!
//! Malformed markup never fails: an unmatched start tag or an orphan end tag
//! renders as literal text, and so do tags nested deeper than
//! [`MAX_NESTING_DEPTH`].
//!
//! Source strings can come from a [`TranslationCatalog`], which looks keys up
//! by language with fallbacks.
//!
//! # Example
//!
//! ```
//! use dfx_markup::{MarkupProcessor, TranslationParams};
//! use serde_json::json;
//!
//! let processor = MarkupProcessor::new().with_default_transpilers();
//!
//! let mut params = TranslationParams::new();
//! params.insert("docs".to_owned(), json!({ "url": "/docs", "target": "_self" }));
//!
//! let html = processor.render_html("Read the [link:docs][b]docs[/b][/link]", &params);
//! assert_eq!(html, r#"Read the <a href="/docs" target="_self"><b>docs</b></a>"#);
//! ```

mod catalog;
mod node;
mod processor;
mod renderer;
mod token;
mod transpiler;
pub mod transpilers;

pub use catalog::{
    CatalogError, DEFAULT_LANG, KeyMissingHandler, MissingTranslationHandler, TranslationCatalog,
};
pub use node::{Node, escape_html, nodes_text_content, nodes_to_html};
pub use processor::MarkupProcessor;
pub use renderer::{Renderer, RendererFactory, TranslationParams};
pub use token::{CustomToken, LINK_END_TAG, Token};
pub use transpiler::{
    MAX_NESTING_DEPTH, TokenizeResult, TranspileResult, Transpiler, TranspilerContext,
};
pub use transpilers::{
    BlockTranspiler, ContextualLinkTranspilerFactory, LinkRenderer, LinkTranspiler,
    StringInterpolationTranspiler, StringLiteralTranspiler, SubstitutionTranspiler,
};
