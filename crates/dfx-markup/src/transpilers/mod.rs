//! Built-in transpilers.

mod block;
mod contextual;
mod interpolation;
mod link;
mod literal;
mod substitution;

pub use block::BlockTranspiler;
pub use contextual::{
    ContextualLinkBlockTranspiler, ContextualLinkSubstitutionTranspiler,
    ContextualLinkTranspilerFactory,
};
pub use interpolation::{
    DelimitedExpressionMatcher, InterpolationExpander, InterpolationExpressionMatcher,
    ParamsExpander, StringInterpolationTranspiler,
};
pub use link::{
    DEFAULT_LINK_TARGET, ExternalLinkObjectLinkRenderer, LinkRenderer, LinkTranspiler,
    StringLinkRenderer, default_link_renderers, render_link,
};
pub use literal::StringLiteralTranspiler;
pub use substitution::SubstitutionTranspiler;
