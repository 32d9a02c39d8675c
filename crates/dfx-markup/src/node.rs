//! Output node tree.
//!
//! Renderers produce [`Node`] values. A node tree can be flattened to its
//! text content or serialized to HTML.

use std::fmt::Write;

/// A displayable node produced by a renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Plain text. Escaped when serialized to HTML.
    Text(String),
    /// Element wrapping child nodes.
    Element {
        /// Tag name (e.g., "b", "a").
        tag: String,
        /// Attributes in insertion order.
        attributes: Vec<(String, String)>,
        /// Child nodes.
        children: Vec<Node>,
    },
    /// Sequence of nodes without a wrapping element.
    Fragment(Vec<Node>),
}

impl Node {
    /// Create a text node.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Create an element node without attributes.
    #[must_use]
    pub fn element(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Self::Element {
            tag: tag.into(),
            attributes: Vec::new(),
            children,
        }
    }

    /// Create an element node with attributes.
    #[must_use]
    pub fn element_with_attributes(
        tag: impl Into<String>,
        attributes: Vec<(String, String)>,
        children: Vec<Node>,
    ) -> Self {
        Self::Element {
            tag: tag.into(),
            attributes,
            children,
        }
    }

    /// Concatenated text of this node and all descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Element { children, .. } | Self::Fragment(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Tag name if this node is an element.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Attribute value if this node is an element carrying `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Self::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// Depth-first search for the first element with the given tag.
    #[must_use]
    pub fn find_element(&self, tag: &str) -> Option<&Node> {
        match self {
            Self::Text(_) => None,
            Self::Element { tag: own, .. } if own == tag => Some(self),
            Self::Element { children, .. } | Self::Fragment(children) => {
                children.iter().find_map(|child| child.find_element(tag))
            }
        }
    }

    /// Serialize this node to HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&escape_html(text)),
            Self::Element {
                tag,
                attributes,
                children,
            } => {
                write!(out, "<{tag}").unwrap();
                for (key, value) in attributes {
                    write!(out, r#" {key}="{}""#, escape_html(value)).unwrap();
                }
                out.push('>');
                for child in children {
                    child.write_html(out);
                }
                write!(out, "</{tag}>").unwrap();
            }
            Self::Fragment(children) => {
                for child in children {
                    child.write_html(out);
                }
            }
        }
    }
}

/// Serialize a node list to HTML.
#[must_use]
pub fn nodes_to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.write_html(&mut out);
    }
    out
}

/// Concatenated text content of a node list.
#[must_use]
pub fn nodes_text_content(nodes: &[Node]) -> String {
    nodes.iter().map(Node::text_content).collect()
}

/// Escape special HTML characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
