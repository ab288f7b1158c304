//! Ordered query parameters and their URL encoding.
//!
//! List values are written as repeated `key[]=item` pairs. Scalar values are
//! set once per key: setting a key that is already present replaces the first
//! pair in place and drops any later duplicates.

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Text(String),
    Bool(bool),
    List(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(value: Vec<String>) -> Self {
        QueryValue::List(value)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(value: Vec<&str>) -> Self {
        QueryValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Query mapping in insertion order. `None` entries are kept so callers can
/// pass optional values through, but they never reach the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    entries: Vec<(String, Option<QueryValue>)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.entries.push((key.into(), Some(value.into())));
        self
    }

    pub fn with_opt<V: Into<QueryValue>>(
        mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> Self {
        self.entries.push((key.into(), value.map(Into::into)));
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: Option<QueryValue>) {
        self.entries.push((key.into(), value));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten into the `(name, value)` pairs that end up in the URL.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.merge_into(Vec::new())
    }

    fn merge_into(&self, mut pairs: Vec<(String, String)>) -> Vec<(String, String)> {
        for (key, value) in &self.entries {
            match value {
                None => {}
                Some(QueryValue::List(items)) => {
                    let name = format!("{key}[]");
                    pairs.extend(items.iter().map(|item| (name.clone(), item.clone())));
                }
                Some(QueryValue::Text(text)) => set_pair(&mut pairs, key, text.clone()),
                Some(QueryValue::Bool(flag)) => set_pair(&mut pairs, key, flag.to_string()),
            }
        }
        pairs
    }

    /// Merge the parameters into `url`. Pairs already in the URL are kept,
    /// except that scalars overwrite an existing key.
    pub fn apply_to(&self, url: &mut Url) {
        if self.entries.iter().all(|(_, value)| value.is_none()) {
            return;
        }
        let existing: Vec<(String, String)> = url
            .query_pairs()
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        let pairs = self.merge_into(existing);

        url.set_query(None);
        if pairs.is_empty() {
            return;
        }
        let mut serializer = url.query_pairs_mut();
        for (name, value) in &pairs {
            serializer.append_pair(name, value);
        }
    }
}

fn set_pair(pairs: &mut Vec<(String, String)>, key: &str, value: String) {
    match pairs.iter().position(|(name, _)| name == key) {
        Some(first) => {
            pairs[first].1 = value;
            let mut index = 0;
            pairs.retain(|(name, _)| {
                let keep = index <= first || name != key;
                index += 1;
                keep
            });
        }
        None => pairs.push((key.to_string(), value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[test]
    fn absent_values_are_skipped() {
        let query = Query::new()
            .with("page", 2u32)
            .with_opt::<String>("search", None)
            .with_opt("state", Some("scheduled"));

        assert_eq!(query.pairs(), vec![pair("page", "2"), pair("state", "scheduled")]);
    }

    #[test]
    fn lists_become_bracketed_pairs_in_order() {
        let query = Query::new().with("types", vec!["video", "photo", "gif"]);

        assert_eq!(
            query.pairs(),
            vec![
                pair("types[]", "video"),
                pair("types[]", "photo"),
                pair("types[]", "gif"),
            ]
        );
    }

    #[test]
    fn booleans_are_stringified() {
        let query = Query::new().with("in_library", true).with("direct", false);

        assert_eq!(query.pairs(), vec![pair("in_library", "true"), pair("direct", "false")]);
    }

    #[test]
    fn duplicate_scalar_keys_overwrite_in_place() {
        let query = Query::new()
            .with("state", "draft")
            .with("page", 1u32)
            .with("state", "scheduled");

        assert_eq!(query.pairs(), vec![pair("state", "scheduled"), pair("page", "1")]);
    }

    #[test]
    fn scalar_replaces_all_list_items_with_same_name() {
        let query = Query::new()
            .with("ids", vec!["a", "b"])
            .with("ids[]", "c");

        assert_eq!(query.pairs(), vec![pair("ids[]", "c")]);
    }

    #[test]
    fn apply_to_encodes_into_url() {
        let mut url = Url::parse("https://app.publer.com/api/v1/media").unwrap();
        Query::new()
            .with("search", "summer sale")
            .with("ids", vec!["1", "2"])
            .apply_to(&mut url);

        assert_eq!(
            url.as_str(),
            "https://app.publer.com/api/v1/media?search=summer+sale&ids%5B%5D=1&ids%5B%5D=2"
        );
    }

    #[test]
    fn scalar_overwrites_pair_already_in_url() {
        let mut url = Url::parse("https://app.publer.com/api/v1/posts?state=a&page=1").unwrap();
        Query::new()
            .with("state", "b")
            .with("accounts", vec!["x"])
            .apply_to(&mut url);

        assert_eq!(url.query(), Some("state=b&page=1&accounts%5B%5D=x"));
    }

    #[test]
    fn lists_append_to_pairs_already_in_url() {
        let mut url = Url::parse("https://app.publer.com/api/v1/media?ids%5B%5D=1").unwrap();
        Query::new().with("ids", vec!["2"]).apply_to(&mut url);

        assert_eq!(url.query(), Some("ids%5B%5D=1&ids%5B%5D=2"));
    }

    #[test]
    fn empty_query_leaves_url_untouched() {
        let mut url = Url::parse("https://app.publer.com/api/v1/posts").unwrap();
        Query::new().with_opt::<bool>("x", None).apply_to(&mut url);

        assert_eq!(url.as_str(), "https://app.publer.com/api/v1/posts");
        assert_eq!(url.query(), None);
    }
}
