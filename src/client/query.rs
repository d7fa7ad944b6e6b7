// Query-string construction for endpoint paths

/// A value that may be left out of a query string. Empty strings and zero
/// counts carry no filter and are dropped like absent ones.
pub trait QueryValue: ToString {
    fn is_blank(&self) -> bool;
}

impl QueryValue for &str {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl QueryValue for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl QueryValue for u64 {
    fn is_blank(&self) -> bool {
        *self == 0
    }
}

/// Ordered query parameters. Absent and blank values are skipped, present
/// ones are percent-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn push_opt<V: QueryValue>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) if !value.is_blank() => self.push(key, value),
            _ => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `path` with `?k=v&...` appended, or `path` unchanged when empty.
    pub fn append_to(&self, path: &str) -> String {
        if self.pairs.is_empty() {
            return path.to_string();
        }

        let encoded: Vec<String> = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        format!("{}?{}", path, encoded.join("&"))
    }
}

/// Percent-encode a single path segment (ids, wallet addresses).
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
