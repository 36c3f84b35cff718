//! Prismic rich text rendering
//!
//! Rich text arrives from the CMS as a list of block nodes, each carrying its
//! text and a list of inline spans addressed by offsets into that text.
//! Offsets count UTF-16 code units, the way the CMS editor measures them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::helpers::html_escape;

/// Block-level node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    Preformatted,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    ListItem,
    OListItem,
    Image,
    Embed,
    #[serde(other)]
    Unknown,
}

/// Inline span type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unknown,
}

/// Inline formatting applied to `[start, end)` of a node's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default)]
    pub data: Value,
}

/// A rich text block node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextNode {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    /// Image source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Image alternative text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Embed payload (oEmbed response)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Value>,
}

impl RichTextNode {
    pub fn paragraph(text: &str) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: text.to_string(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }
}

/// Maps links to other CMS documents onto site URLs
pub trait LinkResolver {
    fn resolve(&self, doc_type: Option<&str>, uid: Option<&str>) -> String;
}

/// Document links to posts land on the post page, everything else on the home page
pub struct PostLinkResolver {
    /// Custom type the posts are stored as
    doc_type: String,
}

impl PostLinkResolver {
    pub fn new(doc_type: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
        }
    }
}

impl LinkResolver for PostLinkResolver {
    fn resolve(&self, doc_type: Option<&str>, uid: Option<&str>) -> String {
        match (doc_type, uid) {
            (Some(doc_type), Some(uid)) if doc_type == self.doc_type => {
                crate::helpers::post_path(uid)
            }
            _ => "/".to_string(),
        }
    }
}

/// Plain text of the nodes, joined with a single space
pub fn as_text(nodes: &[RichTextNode]) -> String {
    nodes
        .iter()
        .map(|node| node.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render nodes to HTML
pub fn as_html(nodes: &[RichTextNode], resolver: &dyn LinkResolver) -> String {
    let mut html = String::new();
    let mut open_list: Option<BlockKind> = None;

    for node in nodes {
        let list = match node.kind {
            BlockKind::ListItem | BlockKind::OListItem => Some(node.kind),
            _ => None,
        };

        if open_list != list {
            if let Some(kind) = open_list {
                html.push_str(list_tag(kind).1);
            }
            if let Some(kind) = list {
                html.push_str(list_tag(kind).0);
            }
            open_list = list;
        }

        render_node(node, resolver, &mut html);
    }

    if let Some(kind) = open_list {
        html.push_str(list_tag(kind).1);
    }

    html
}

fn list_tag(kind: BlockKind) -> (&'static str, &'static str) {
    match kind {
        BlockKind::OListItem => ("<ol>", "</ol>"),
        _ => ("<ul>", "</ul>"),
    }
}

fn render_node(node: &RichTextNode, resolver: &dyn LinkResolver, out: &mut String) {
    let tag = match node.kind {
        BlockKind::Paragraph => "p",
        BlockKind::Preformatted => "pre",
        BlockKind::Heading1 => "h1",
        BlockKind::Heading2 => "h2",
        BlockKind::Heading3 => "h3",
        BlockKind::Heading4 => "h4",
        BlockKind::Heading5 => "h5",
        BlockKind::Heading6 => "h6",
        BlockKind::ListItem | BlockKind::OListItem => "li",
        BlockKind::Image => {
            render_image(node, out);
            return;
        }
        BlockKind::Embed => {
            render_embed(node, out);
            return;
        }
        BlockKind::Unknown => return,
    };

    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&render_spans(&node.text, &node.spans, resolver));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn render_image(node: &RichTextNode, out: &mut String) {
    let Some(url) = node.url.as_deref() else {
        return;
    };
    out.push_str(&format!(
        r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
        html_escape(url),
        html_escape(node.alt.as_deref().unwrap_or(""))
    ));
}

fn render_embed(node: &RichTextNode, out: &mut String) {
    let Some(oembed) = node.oembed.as_ref() else {
        return;
    };
    let field = |name: &str| oembed.get(name).and_then(Value::as_str).unwrap_or("");

    out.push_str(&format!(
        r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
        html_escape(field("embed_url")),
        html_escape(field("type")),
        html_escape(field("provider_name")),
        field("html")
    ));
}

/// Render `text` with its spans applied
pub fn render_spans(text: &str, spans: &[Span], resolver: &dyn LinkResolver) -> String {
    let units: Vec<u16> = text.encode_utf16().collect();

    let mut ordered: Vec<&Span> = spans
        .iter()
        .filter(|span| span.kind != SpanKind::Unknown && span.start < span.end)
        .collect();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::new();
    render_range(&units, &ordered, 0, units.len(), resolver, &mut out);
    out
}

fn render_range(
    units: &[u16],
    spans: &[&Span],
    from: usize,
    to: usize,
    resolver: &dyn LinkResolver,
    out: &mut String,
) {
    let mut cursor = from;
    let mut i = 0;

    while i < spans.len() {
        let span = spans[i];
        let start = span.start.clamp(cursor, to);
        let end = span.end.clamp(start, to);

        // Spans nested inside this one are the following ones that start before it ends
        let mut j = i + 1;
        while j < spans.len() && spans[j].start < end {
            j += 1;
        }

        if start < end {
            push_text(&units[cursor..start], out);
            let (open, close) = span_tags(span, resolver);
            out.push_str(&open);
            render_range(units, &spans[i + 1..j], start, end, resolver, out);
            out.push_str(close);
            cursor = end;
        }

        i = j;
    }

    push_text(&units[cursor..to], out);
}

fn push_text(units: &[u16], out: &mut String) {
    let text = String::from_utf16_lossy(units);
    out.push_str(&html_escape(&text).replace('\n', "<br />"));
}

fn span_tags(span: &Span, resolver: &dyn LinkResolver) -> (String, &'static str) {
    match span.kind {
        SpanKind::Strong => ("<strong>".to_string(), "</strong>"),
        SpanKind::Em => ("<em>".to_string(), "</em>"),
        SpanKind::Label => {
            let label = span.data.get("label").and_then(Value::as_str).unwrap_or("");
            (format!(r#"<span class="{}">"#, html_escape(label)), "</span>")
        }
        SpanKind::Hyperlink => (hyperlink_open(&span.data, resolver), "</a>"),
        SpanKind::Unknown => (String::new(), ""),
    }
}

fn hyperlink_open(data: &Value, resolver: &dyn LinkResolver) -> String {
    let field = |name: &str| data.get(name).and_then(Value::as_str);

    let href = match field("link_type") {
        Some("Document") => resolver.resolve(field("type"), field("uid")),
        _ => field("url").unwrap_or("").to_string(),
    };

    match field("target") {
        Some(target) => format!(
            r#"<a href="{}" target="{}" rel="noopener">"#,
            html_escape(&href),
            html_escape(target)
        ),
        None => format!(r#"<a href="{}">"#, html_escape(&href)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nodes(value: Value) -> Vec<RichTextNode> {
        serde_json::from_value(value).unwrap()
    }

    fn resolver() -> PostLinkResolver {
        PostLinkResolver::new("posts")
    }

    #[test]
    fn test_as_text_joins_blocks() {
        let body = nodes(json!([
            { "type": "paragraph", "text": "First paragraph.", "spans": [] },
            { "type": "heading2", "text": "Second", "spans": [] }
        ]));
        assert_eq!(as_text(&body), "First paragraph. Second");
        assert_eq!(as_text(&[]), "");
    }

    #[test]
    fn test_hyperlink_span() {
        let body = nodes(json!([{
            "type": "paragraph",
            "text": "Be sure to check out the documentation for testing-library.",
            "spans": [{
                "start": 43,
                "end": 58,
                "type": "hyperlink",
                "data": { "link_type": "Web", "url": "https://testing-library.com/" }
            }]
        }]));
        assert_eq!(
            as_html(&body, &resolver()),
            r#"<p>Be sure to check out the documentation for <a href="https://testing-library.com/">testing-library</a>.</p>"#
        );
    }

    #[test]
    fn test_nested_spans() {
        let body = nodes(json!([{
            "type": "paragraph",
            "text": "bold and italic",
            "spans": [
                { "start": 0, "end": 15, "type": "strong" },
                { "start": 9, "end": 15, "type": "em" }
            ]
        }]));
        assert_eq!(
            as_html(&body, &resolver()),
            "<p><strong>bold and <em>italic</em></strong></p>"
        );
    }

    #[test]
    fn test_overlapping_span_is_clipped() {
        let body = nodes(json!([{
            "type": "paragraph",
            "text": "abcdef",
            "spans": [
                { "start": 0, "end": 3, "type": "strong" },
                { "start": 2, "end": 5, "type": "em" }
            ]
        }]));
        assert_eq!(
            as_html(&body, &resolver()),
            "<p><strong>ab<em>c</em></strong>def</p>"
        );
    }

    #[test]
    fn test_offsets_are_utf16() {
        // "’" is one UTF-16 unit, the emoji is two
        let body = nodes(json!([{
            "type": "paragraph",
            "text": "it’s 🚀 time",
            "spans": [{ "start": 8, "end": 12, "type": "em" }]
        }]));
        assert_eq!(
            as_html(&body, &resolver()),
            "<p>it’s 🚀 <em>time</em></p>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let body = nodes(json!([
            { "type": "preformatted", "text": "<script>\nalert(1)", "spans": [] }
        ]));
        assert_eq!(
            as_html(&body, &resolver()),
            "<pre>&lt;script&gt;<br />alert(1)</pre>"
        );
    }

    #[test]
    fn test_lists_are_grouped() {
        let body = nodes(json!([
            { "type": "list-item", "text": "one", "spans": [] },
            { "type": "list-item", "text": "two", "spans": [] },
            { "type": "o-list-item", "text": "first", "spans": [] },
            { "type": "paragraph", "text": "after", "spans": [] }
        ]));
        assert_eq!(
            as_html(&body, &resolver()),
            "<ul><li>one</li><li>two</li></ul><ol><li>first</li></ol><p>after</p>"
        );
    }

    #[test]
    fn test_image_and_unknown_blocks() {
        let body = nodes(json!([
            { "type": "image", "url": "https://images.prismic.io/a.png", "alt": "A" },
            { "type": "table", "text": "ignored" }
        ]));
        assert_eq!(
            as_html(&body, &resolver()),
            r#"<p class="block-img"><img src="https://images.prismic.io/a.png" alt="A" /></p>"#
        );
    }

    #[test]
    fn test_document_link_uses_resolver() {
        let body = nodes(json!([{
            "type": "heading3",
            "text": "previous article",
            "spans": [{
                "start": 0,
                "end": 16,
                "type": "hyperlink",
                "data": { "link_type": "Document", "type": "posts", "uid": "crud-testing" }
            }]
        }]));
        assert_eq!(
            as_html(&body, &resolver()),
            r#"<h3><a href="/post/crud-testing">previous article</a></h3>"#
        );
    }

    #[test]
    fn test_label_and_target() {
        let body = nodes(json!([{
            "type": "paragraph",
            "text": "note link",
            "spans": [
                { "start": 0, "end": 4, "type": "label", "data": { "label": "highlight" } },
                {
                    "start": 5,
                    "end": 9,
                    "type": "hyperlink",
                    "data": { "link_type": "Web", "url": "https://github.com", "target": "_blank" }
                }
            ]
        }]));
        assert_eq!(
            as_html(&body, &resolver()),
            r#"<p><span class="highlight">note</span> <a href="https://github.com" target="_blank" rel="noopener">link</a></p>"#
        );
    }

    #[test]
    fn test_resolver_uses_configured_type() {
        let link = json!([{
            "type": "paragraph",
            "text": "read this",
            "spans": [{
                "start": 0,
                "end": 9,
                "type": "hyperlink",
                "data": { "link_type": "Document", "type": "articles", "uid": "intro" }
            }]
        }]);

        assert_eq!(
            as_html(&nodes(link.clone()), &PostLinkResolver::new("articles")),
            r#"<p><a href="/post/intro">read this</a></p>"#
        );
        assert_eq!(
            as_html(&nodes(link), &resolver()),
            r#"<p><a href="/">read this</a></p>"#
        );
    }
}
