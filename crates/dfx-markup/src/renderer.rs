//! Deferred renderers and the renderer factory.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::node::Node;

/// Runtime translation parameters passed to renderers.
///
/// Link parameters are either a URL string or an object
/// `{ "url": ..., "target": ... }`.
pub type TranslationParams = HashMap<String, Value>;

type RenderFn = dyn Fn(&TranslationParams) -> Node + Send + Sync;

/// Deferred node construction.
///
/// A renderer is built once per transpiled translation and may be invoked any
/// number of times with different parameters.
#[derive(Clone)]
pub struct Renderer(Arc<RenderFn>);

impl Renderer {
    /// Wrap a render function.
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&TranslationParams) -> Node + Send + Sync + 'static,
    {
        Self(Arc::new(render))
    }

    /// Produce a node for the given parameters.
    #[must_use]
    pub fn render(&self, params: &TranslationParams) -> Node {
        (self.0)(params)
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Renderer(..)")
    }
}

/// Builds structural renderers. Holds no state.
///
/// # Example
///
/// ```
/// use dfx_markup::{RendererFactory, TranslationParams};
///
/// let bold = RendererFactory::create_element_renderer(
///     "b",
///     vec![RendererFactory::create_text_renderer("hi")],
/// );
/// let node = bold.render(&TranslationParams::new());
/// assert_eq!(node.to_html(), "<b>hi</b>");
/// ```
pub struct RendererFactory;

impl RendererFactory {
    /// Renderer producing a fixed text node.
    #[must_use]
    pub fn create_text_renderer(text: impl Into<String>) -> Renderer {
        let text = text.into();
        Renderer::new(move |_| Node::Text(text.clone()))
    }

    /// Renderer producing an element wrapping the output of child renderers.
    #[must_use]
    pub fn create_element_renderer(tag: impl Into<String>, children: Vec<Renderer>) -> Renderer {
        Self::create_element_renderer_with_attributes(tag, Vec::new(), children)
    }

    /// Renderer producing an element with fixed attributes.
    #[must_use]
    pub fn create_element_renderer_with_attributes(
        tag: impl Into<String>,
        attributes: Vec<(String, String)>,
        children: Vec<Renderer>,
    ) -> Renderer {
        let tag = tag.into();
        Renderer::new(move |params| {
            Node::element_with_attributes(
                tag.clone(),
                attributes.clone(),
                Self::render_all(&children, params),
            )
        })
    }

    /// Renderer producing a fragment of the child renderers' output.
    #[must_use]
    pub fn create_fragment_renderer(children: Vec<Renderer>) -> Renderer {
        Renderer::new(move |params| Node::Fragment(Self::render_all(&children, params)))
    }

    /// Invoke every renderer in order.
    #[must_use]
    pub fn render_all(renderers: &[Renderer], params: &TranslationParams) -> Vec<Node> {
        renderers.iter().map(|r| r.render(params)).collect()
    }
}
