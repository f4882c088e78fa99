use std::collections::BTreeSet;

/// Deduplicated, ordered set of price-lookup keys.
///
/// Ordering is lexicographic so the outbound query string is stable for a
/// given set of holdings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceKeys(BTreeSet<String>);

impl PriceKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        let key = key.trim();
        if key.is_empty() {
            return false;
        }
        self.0.insert(key.to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Comma-joined form used in the `ids` query parameter.
    pub fn join(&self, separator: &str) -> String {
        self.iter().collect::<Vec<_>>().join(separator)
    }
}

impl<S: Into<String>> FromIterator<S> for PriceKeys {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut keys = Self::new();
        for key in iter {
            keys.insert(key);
        }
        keys
    }
}
