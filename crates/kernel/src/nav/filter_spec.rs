//! Filter/sort criteria defining a collection view.
//!
//! A `FilterSpec` is the stored shape of a browse query: an ordered list of
//! filter key/value pairs plus sort controls. Navigation re-executes it
//! unwindowed, so pagination keys are stripped before sequencing.

use serde::{Deserialize, Serialize};

/// Keys that window a browse result and must never window a sequence.
const PAGINATION_KEYS: [&str; 4] = ["page", "per_page", "limit", "offset"];

/// Keys that control ordering rather than filtering.
const SORT_KEYS: [&str; 2] = ["sort_by", "sort_order"];

/// Sort direction. Ascending unless explicitly requested otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse case-insensitively; anything other than "desc" is ascending.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

/// Ordered filter criteria plus sort for one collection view.
///
/// Entries preserve insertion order so that re-encoding a stored query
/// yields the same URL the user browsed with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    entries: Vec<(String, String)>,
}

impl FilterSpec {
    /// Create an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a spec from key/value pairs, preserving order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse a URL-encoded query string.
    ///
    /// Malformed pairs (undecodable percent-escapes, empty keys) are skipped
    /// rather than failing the call; a fully malformed string degrades to an
    /// empty spec.
    pub fn from_query_string(raw: &str) -> Self {
        let mut entries = Vec::new();
        for segment in raw.split('&') {
            if segment.is_empty() {
                continue;
            }
            let (key, value) = match segment.split_once('=') {
                Some((k, v)) => (k, v),
                None => (segment, ""),
            };
            let (Ok(key), Ok(value)) = (urlencoding::decode(key), urlencoding::decode(value))
            else {
                continue;
            };
            if key.is_empty() {
                continue;
            }
            entries.push((key.into_owned(), value.into_owned()));
        }
        Self { entries }
    }

    /// Re-encode as a navigable query string.
    pub fn to_query_string(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Append an entry.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// First value stored under a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// True when the spec holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the spec holds at least one real filter: an entry that is
    /// neither a sort control nor a pagination key. Site scoping is only
    /// injected when this is false.
    pub fn has_filters(&self) -> bool {
        self.entries
            .iter()
            .any(|(k, _)| !SORT_KEYS.contains(&k.as_str()) && !PAGINATION_KEYS.contains(&k.as_str()))
    }

    /// Drop pagination keys: the sequence must always be the complete
    /// matching set, never a page of it.
    pub fn without_pagination(mut self) -> Self {
        self.entries
            .retain(|(k, _)| !PAGINATION_KEYS.contains(&k.as_str()));
        self
    }

    /// Primary sort field, when one was requested.
    pub fn sort_by(&self) -> Option<&str> {
        self.get("sort_by").filter(|v| !v.is_empty())
    }

    /// Sort direction. ASC unless "desc" was explicitly requested.
    pub fn sort_order(&self) -> SortDirection {
        self.get("sort_order")
            .map(SortDirection::parse)
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_string() {
        let spec = FilterSpec::from_query_string("owner_id=abc&sort_by=title&sort_order=DESC");
        assert_eq!(spec.get("owner_id"), Some("abc"));
        assert_eq!(spec.sort_by(), Some("title"));
        assert_eq!(spec.sort_order(), SortDirection::Desc);
    }

    #[test]
    fn parse_decodes_percent_escapes() {
        let spec = FilterSpec::from_query_string("search=hello%20world&a%3Db=c");
        assert_eq!(spec.get("search"), Some("hello world"));
        assert_eq!(spec.get("a=b"), Some("c"));
    }

    #[test]
    fn malformed_pairs_are_skipped() {
        let spec = FilterSpec::from_query_string("a=1&%FF%FE=broken&=nokey&b=2");
        assert_eq!(spec.get("a"), Some("1"));
        assert_eq!(spec.get("b"), Some("2"));
        assert_eq!(spec.entries().len(), 2);
    }

    #[test]
    fn fully_malformed_degrades_to_empty() {
        let spec = FilterSpec::from_query_string("%FF=%FF");
        assert!(spec.is_empty());
    }

    #[test]
    fn value_free_segment_keeps_key() {
        let spec = FilterSpec::from_query_string("is_public");
        assert_eq!(spec.get("is_public"), Some(""));
    }

    #[test]
    fn query_string_round_trip() {
        let spec = FilterSpec::from_pairs([("search", "hello world"), ("sort_by", "title")]);
        let encoded = spec.to_query_string();
        assert_eq!(encoded, "search=hello%20world&sort_by=title");
        assert_eq!(FilterSpec::from_query_string(&encoded), spec);
    }

    #[test]
    fn pagination_keys_are_stripped() {
        let spec = FilterSpec::from_pairs([
            ("page", "3"),
            ("per_page", "25"),
            ("limit", "1"),
            ("offset", "50"),
            ("owner_id", "abc"),
        ])
        .without_pagination();
        assert_eq!(spec.entries().len(), 1);
        assert_eq!(spec.get("owner_id"), Some("abc"));
    }

    #[test]
    fn sort_order_defaults_to_asc() {
        assert_eq!(FilterSpec::new().sort_order(), SortDirection::Asc);
        let spec = FilterSpec::from_pairs([("sort_order", "sideways")]);
        assert_eq!(spec.sort_order(), SortDirection::Asc);
    }

    #[test]
    fn sort_order_desc_is_case_insensitive() {
        for raw in ["desc", "DESC", "Desc"] {
            let spec = FilterSpec::from_pairs([("sort_order", raw)]);
            assert_eq!(spec.sort_order(), SortDirection::Desc);
        }
    }

    #[test]
    fn sort_keys_do_not_count_as_filters() {
        let spec = FilterSpec::from_pairs([("sort_by", "title"), ("sort_order", "desc")]);
        assert!(!spec.has_filters());

        let spec = FilterSpec::from_pairs([("sort_by", "title"), ("owner_id", "abc")]);
        assert!(spec.has_filters());
    }

    #[test]
    fn first_occurrence_wins_for_get() {
        let spec = FilterSpec::from_query_string("a=1&a=2");
        assert_eq!(spec.get("a"), Some("1"));
    }
}
