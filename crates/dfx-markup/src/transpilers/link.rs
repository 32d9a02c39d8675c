//! Parameterized links (`[link:paramKey]...[/link]`) and link renderers.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::node::Node;
use crate::renderer::{Renderer, RendererFactory};
use crate::token::{LINK_END_TAG, Token};
use crate::transpiler::{TokenizeResult, TranspileResult, Transpiler, TranspilerContext};

const LINK_START_PREFIX: &str = "[link:";

/// Link target used when a link value does not specify one.
pub const DEFAULT_LINK_TARGET: &str = "_blank";

/// Renders a link value around already rendered content.
///
/// Renderers are consulted in order; the first one whose
/// [`supports`](Self::supports) returns `true` renders the link.
pub trait LinkRenderer: Send + Sync {
    /// Whether this renderer can handle `link`.
    fn supports(&self, link: &Value) -> bool;

    /// Render `children` as a link to `link`.
    fn render(&self, link: &Value, children: Vec<Node>) -> Node;
}

/// Renders string link values as `<a href="..." target="_blank">`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringLinkRenderer;

impl LinkRenderer for StringLinkRenderer {
    fn supports(&self, link: &Value) -> bool {
        link.is_string()
    }

    fn render(&self, link: &Value, children: Vec<Node>) -> Node {
        anchor(link.as_str().unwrap_or_default(), DEFAULT_LINK_TARGET, children)
    }
}

/// Renders `{ "url": ..., "target": ... }` link objects.
///
/// `target` is optional and defaults to `_blank`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExternalLinkObjectLinkRenderer;

impl LinkRenderer for ExternalLinkObjectLinkRenderer {
    fn supports(&self, link: &Value) -> bool {
        let Some(object) = link.as_object() else {
            return false;
        };
        object.get("url").is_some_and(Value::is_string)
            && object.get("target").is_none_or(Value::is_string)
    }

    fn render(&self, link: &Value, children: Vec<Node>) -> Node {
        let url = link.get("url").and_then(Value::as_str).unwrap_or_default();
        let target = link
            .get("target")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_LINK_TARGET);
        anchor(url, target, children)
    }
}

fn anchor(url: &str, target: &str, children: Vec<Node>) -> Node {
    Node::element_with_attributes(
        "a",
        vec![
            ("href".to_owned(), url.to_owned()),
            ("target".to_owned(), target.to_owned()),
        ],
        children,
    )
}

/// The link renderers used when none are configured.
#[must_use]
pub fn default_link_renderers() -> Vec<Arc<dyn LinkRenderer>> {
    vec![
        Arc::new(StringLinkRenderer),
        Arc::new(ExternalLinkObjectLinkRenderer),
    ]
}

/// Render `children` through the first link renderer supporting `link`.
///
/// Without a supporting renderer (or without a link value) the children are
/// rendered unlinked.
#[must_use]
pub fn render_link(
    renderers: &[Arc<dyn LinkRenderer>],
    link: Option<&Value>,
    children: Vec<Node>,
) -> Node {
    if let Some(link) = link {
        if let Some(renderer) = renderers.iter().find(|r| r.supports(link)) {
            return renderer.render(link, children);
        }
        tracing::debug!(%link, "No link renderer supports link value");
    }
    Node::Fragment(children)
}

/// Transpiler for `[link:paramKey]...[/link]` blocks.
///
/// The link value is looked up in the render parameters under `paramKey`.
#[derive(Clone)]
pub struct LinkTranspiler {
    link_renderers: Arc<[Arc<dyn LinkRenderer>]>,
}

impl Default for LinkTranspiler {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkTranspiler {
    /// Create a link transpiler with the default link renderers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_link_renderers(default_link_renderers())
    }

    /// Create a link transpiler with custom link renderers.
    #[must_use]
    pub fn with_link_renderers(link_renderers: Vec<Arc<dyn LinkRenderer>>) -> Self {
        Self {
            link_renderers: link_renderers.into(),
        }
    }
}

impl fmt::Debug for LinkTranspiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkTranspiler")
            .field("link_renderers", &self.link_renderers.len())
            .finish()
    }
}

/// Parse `[link:key]` at the start of `s`, returning the key and consumed bytes.
fn parse_link_start(s: &str) -> Option<(&str, usize)> {
    let after = s.strip_prefix(LINK_START_PREFIX)?;
    let close = after.find(']')?;
    let key = &after[..close];
    if key.is_empty() || key.contains(|c: char| c == '[' || c.is_whitespace()) {
        return None;
    }
    Some((key, LINK_START_PREFIX.len() + close + 1))
}

impl Transpiler for LinkTranspiler {
    fn tokenize(&self, translation: &str, offset: usize) -> Option<TokenizeResult> {
        let rest = translation.get(offset..)?;
        if let Some((key, consumed)) = parse_link_start(rest) {
            return Some(TokenizeResult::new(
                Token::LinkStart {
                    parameter_key: key.to_owned(),
                },
                offset + consumed,
            ));
        }
        rest.starts_with(LINK_END_TAG)
            .then(|| TokenizeResult::new(Token::LinkEnd, offset + LINK_END_TAG.len()))
    }

    fn transpile(&self, offset: usize, context: &TranspilerContext<'_>) -> Option<TranspileResult> {
        let Token::LinkStart { parameter_key } = context.token(offset)? else {
            return None;
        };
        if !context.can_nest() {
            return None;
        }

        let end = context.find_closing(
            offset,
            |t| matches!(t, Token::LinkStart { .. }),
            |t| matches!(t, Token::LinkEnd),
        )?;
        let children = context.transpile(offset + 1, end);

        let key = parameter_key.clone();
        let link_renderers = Arc::clone(&self.link_renderers);
        let renderer = Renderer::new(move |params| {
            let content = RendererFactory::render_all(&children, params);
            render_link(&link_renderers, params.get(&key), content)
        });
        Some(TranspileResult::new(renderer, end + 1))
    }
}
