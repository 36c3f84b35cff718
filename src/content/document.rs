//! Validation of raw CMS documents into post models
//!
//! Payloads from the CMS are loosely typed: fields can be missing, null, or
//! stored as rich text where plain text was expected. Everything is checked
//! here, once, before the rest of the crate sees it.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::post::{Banner, ContentBlock, PostDetail, PostPage, PostSummary};
use super::richtext::{self, RichTextNode};
use crate::error::ContentError;
use crate::helpers::parse_timestamp;
use crate::prismic::{Document, SearchResponse};

/// A text field stored either as key text or as rich text
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextField {
    Plain(String),
    Rich(Vec<RichTextNode>),
}

impl TextField {
    fn into_plain(self) -> String {
        match self {
            Self::Plain(text) => text,
            Self::Rich(nodes) => richtext::as_text(&nodes),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPostData {
    title: Option<TextField>,
    subtitle: Option<TextField>,
    author: Option<TextField>,
    banner: Option<RawImage>,
    content: Vec<RawContentBlock>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawImage {
    url: Option<String>,
    alt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawContentBlock {
    heading: Option<TextField>,
    body: Vec<RichTextNode>,
}

/// Fields shared by summaries and details
struct Validated {
    uid: String,
    first_publication_date: Option<DateTime<Utc>>,
    title: String,
    data: RawPostData,
}

fn validate(doc: Document) -> Result<Validated, ContentError> {
    let uid = doc
        .uid
        .filter(|uid| !uid.trim().is_empty())
        .ok_or_else(|| ContentError::malformed(&doc.id, "missing uid"))?;

    let mut data: RawPostData = match doc.data {
        Value::Null => RawPostData::default(),
        value => serde_json::from_value(value)
            .map_err(|e| ContentError::malformed(&doc.id, e.to_string()))?,
    };

    let title = data
        .title
        .take()
        .map(TextField::into_plain)
        .filter(|title| !title.trim().is_empty())
        .ok_or_else(|| ContentError::malformed(&doc.id, "missing title"))?;

    let first_publication_date = match doc.first_publication_date.as_deref() {
        Some(raw) => {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                tracing::warn!(id = %doc.id, date = raw, "unparsable publication date");
            }
            parsed
        }
        None => None,
    };

    Ok(Validated {
        uid,
        first_publication_date,
        title,
        data,
    })
}

fn plain_or_empty(field: Option<TextField>) -> String {
    field.map(TextField::into_plain).unwrap_or_default()
}

impl TryFrom<Document> for PostSummary {
    type Error = ContentError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let Validated {
            uid,
            first_publication_date,
            title,
            data,
        } = validate(doc)?;

        Ok(Self {
            uid,
            first_publication_date,
            title,
            subtitle: plain_or_empty(data.subtitle),
            author: plain_or_empty(data.author),
        })
    }
}

impl TryFrom<Document> for PostDetail {
    type Error = ContentError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let Validated {
            uid,
            first_publication_date,
            title,
            data,
        } = validate(doc)?;

        let banner = data.banner.and_then(|image| {
            let url = image.url.filter(|url| !url.is_empty())?;
            Some(Banner {
                url,
                alt: image.alt,
            })
        });

        let content = data
            .content
            .into_iter()
            .map(|block| ContentBlock {
                heading: plain_or_empty(block.heading),
                body: block.body,
            })
            .collect();

        Ok(Self {
            uid,
            first_publication_date,
            title,
            banner,
            author: plain_or_empty(data.author),
            content,
        })
    }
}

impl From<SearchResponse> for PostPage {
    /// Keeps backend order; documents that fail validation are dropped
    fn from(response: SearchResponse) -> Self {
        let results = response
            .results
            .into_iter()
            .filter_map(|doc| match PostSummary::try_from(doc) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    tracing::warn!("Skipping document: {}", e);
                    None
                }
            })
            .collect();

        Self {
            results,
            next_page: response.next_page.filter(|url| !url.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> Value {
        json!({
            "id": "YMqJ0xMAACEAjxIZ",
            "uid": "setting-up-testing-library-with-nextjs",
            "type": "posts",
            "first_publication_date": "2021-06-16T23:31:35+0000",
            "data": {
                "title": "Setting Up Testing Library with NextJS",
                "subtitle": "Getting setup with Jest and React Testing Library",
                "author": "Malcolm L",
                "banner": {
                    "dimensions": { "width": 672, "height": 488 },
                    "alt": null,
                    "url": "https://images.prismic.io/posts-challenge/banner.png?auto=compress,format"
                },
                "content": [{
                    "heading": "Writing our first test",
                    "body": [{ "type": "paragraph", "text": "Create a file.", "spans": [] }]
                }]
            }
        })
    }

    #[test]
    fn test_summary_from_document() {
        let summary = PostSummary::try_from(document(sample())).unwrap();
        assert_eq!(summary.uid, "setting-up-testing-library-with-nextjs");
        assert_eq!(summary.title, "Setting Up Testing Library with NextJS");
        assert_eq!(summary.author, "Malcolm L");
        assert_eq!(
            summary.first_publication_date.unwrap().to_rfc3339(),
            "2021-06-16T23:31:35+00:00"
        );
    }

    #[test]
    fn test_detail_from_document() {
        let detail = PostDetail::try_from(document(sample())).unwrap();
        let banner = detail.banner.unwrap();
        assert!(banner.url.starts_with("https://images.prismic.io/"));
        assert_eq!(banner.alt, None);
        assert_eq!(detail.content.len(), 1);
        assert_eq!(detail.content[0].heading, "Writing our first test");
        assert_eq!(detail.content[0].body[0].text, "Create a file.");
    }

    #[test]
    fn test_missing_uid_rejected() {
        let mut value = sample();
        value["uid"] = Value::Null;
        let err = PostSummary::try_from(document(value)).unwrap_err();
        assert_eq!(err.to_string(), "malformed document YMqJ0xMAACEAjxIZ: missing uid");
    }

    #[test]
    fn test_missing_title_rejected() {
        let mut value = sample();
        value["data"]["title"] = json!("  ");
        assert!(PostDetail::try_from(document(value)).is_err());
    }

    #[test]
    fn test_optional_fields_default() {
        let doc = document(json!({
            "id": "x",
            "uid": "minimal",
            "type": "posts",
            "first_publication_date": null,
            "data": { "title": "Minimal", "banner": {} }
        }));
        let detail = PostDetail::try_from(doc).unwrap();
        assert_eq!(detail.first_publication_date, None);
        assert_eq!(detail.banner, None);
        assert_eq!(detail.author, "");
        assert!(detail.content.is_empty());
    }

    #[test]
    fn test_bad_date_becomes_none() {
        let mut value = sample();
        value["first_publication_date"] = json!("yesterday");
        let summary = PostSummary::try_from(document(value)).unwrap();
        assert_eq!(summary.first_publication_date, None);
    }

    #[test]
    fn test_rich_text_title() {
        let mut value = sample();
        value["data"]["title"] = json!([{ "type": "heading1", "text": "Rich Title", "spans": [] }]);
        let summary = PostSummary::try_from(document(value)).unwrap();
        assert_eq!(summary.title, "Rich Title");
    }

    #[test]
    fn test_page_skips_invalid_documents() {
        let mut broken = sample();
        broken["uid"] = Value::Null;
        let mut second = sample();
        second["uid"] = json!("second");

        let response: SearchResponse = serde_json::from_value(json!({
            "page": 1,
            "next_page": null,
            "results": [sample(), broken, second]
        }))
        .unwrap();

        let page = PostPage::from(response);
        let uids: Vec<&str> = page.results.iter().map(|p| p.uid.as_str()).collect();
        assert_eq!(uids, vec!["setting-up-testing-library-with-nextjs", "second"]);
        assert!(!page.has_next());
    }
}
