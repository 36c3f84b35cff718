//! Content module - post models, CMS payload validation, and rich text

mod document;
mod post;
pub mod richtext;
mod source;

pub use post::{Banner, ContentBlock, PostDetail, PostPage, PostSummary};
pub use richtext::{LinkResolver, PostLinkResolver, RichTextNode};
pub use source::{ContentSource, PrismicSource};

#[cfg(test)]
pub(crate) use source::testing;
