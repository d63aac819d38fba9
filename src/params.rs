use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped by `encodeURIComponent`.
pub(crate) const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Ordered multi-value map of captured path parameters.
///
/// Keys are parameter names (or stringified positional indices for unnamed
/// capture groups). A repeated parameter (`:x+` / `:x*`) holds one entry per
/// captured segment; a plain parameter holds a single entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Params(Vec<(String, Vec<String>)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value, keeping any values already present under the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.0.iter_mut().find(|(k, _)| *k == key) {
            entry.1.push(value);
        } else {
            self.0.push((key, vec![value]));
        }
    }

    /// Replaces all values under the key.
    pub fn replace(&mut self, key: impl Into<String>, values: Vec<String>) {
        let key = key.into();
        if let Some(entry) = self.0.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = values;
        } else {
            self.0.push((key, values));
        }
    }

    /// Most-recently-added value for the key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find_map(|(k, v)| {
            if k == key {
                v.last().map(|s| s.as_str())
            } else {
                None
            }
        })
    }

    /// All values recorded for the key.
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find_map(|(k, v)| if k == key { Some(v.as_slice()) } else { None })
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        let i = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(i).1)
    }

    /// Parses the most recent value for the key into a typed value.
    pub fn parse<T: FromStr>(&self, key: &str) -> Option<Result<T, T::Err>> {
        self.get(key).map(T::from_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Child params override parent params of the same name.
    pub fn merged_with(&self, child: &Params) -> Params {
        let mut out = self.clone();
        for (k, v) in &child.0 {
            out.replace(k.clone(), v.clone());
        }
        out
    }

    /// Serializes the map as a query string without the leading `?`, empty
    /// string for an empty map. Used for leftover params in reverse URL
    /// generation.
    pub fn to_query_string(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let mut buf = String::new();
        for (k, vs) in &self.0 {
            for v in vs {
                buf.push_str(&utf8_percent_encode(k, COMPONENT).to_string());
                buf.push('=');
                buf.push_str(&utf8_percent_encode(v, COMPONENT).to_string());
                buf.push('&');
            }
        }
        buf.pop();
        buf
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, vs) in &self.0 {
            for v in vs {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{}={}", k, v)?;
                first = false;
            }
        }
        Ok(())
    }
}
