//! Query predicates and search parameters

use std::fmt;

/// A single query predicate: `at(path, "value")`, an exact match on a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    path: String,
    value: String,
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Documents of the given custom type
    pub fn document_type(doc_type: &str) -> Self {
        Self::at("document.type", doc_type)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[at({}, {})]", self.path, quote(&self.value))
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// A search against the documents endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    pub page_size: Option<usize>,
    /// Field projection, e.g. `posts.title`
    pub fetch: Vec<String>,
}

impl Query {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicates: vec![predicate],
            ..Self::default()
        }
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch = fields.into_iter().map(Into::into).collect();
        self
    }

    /// The `q` parameter: predicates wrapped in a single `[...]`
    pub fn q(&self) -> String {
        let inner: String = self.predicates.iter().map(|p| p.to_string()).collect();
        format!("[{}]", inner)
    }

    /// Query string pairs, without `ref` and `access_token`
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", self.q())];
        if let Some(page_size) = self.page_size {
            params.push(("pageSize", page_size.to_string()));
        }
        if !self.fetch.is_empty() {
            params.push(("fetch", self.fetch.join(",")));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_display() {
        assert_eq!(
            Predicate::document_type("posts").to_string(),
            r#"[at(document.type, "posts")]"#
        );
        assert_eq!(
            Predicate::at("my.posts.uid", r#"a"b"#).to_string(),
            r#"[at(my.posts.uid, "a\"b")]"#
        );
    }

    #[test]
    fn test_query_params() {
        let query = Query::new(Predicate::document_type("posts"))
            .page_size(3)
            .fetch(["posts.title", "posts.subtitle", "posts.author"]);

        assert_eq!(
            query.params(),
            vec![
                ("q", r#"[[at(document.type, "posts")]]"#.to_string()),
                ("pageSize", "3".to_string()),
                ("fetch", "posts.title,posts.subtitle,posts.author".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_multiple_predicates() {
        let query = Query::new(Predicate::document_type("posts"))
            .and(Predicate::at("my.posts.uid", "hello"));
        assert_eq!(
            query.q(),
            r#"[[at(document.type, "posts")][at(my.posts.uid, "hello")]]"#
        );
    }
}
