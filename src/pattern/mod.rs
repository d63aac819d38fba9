//! Path pattern compiler: express-style patterns to matchers and back.

mod builder;
mod cache;
mod matcher;
mod parser;

pub use self::builder::{BuildArgs, ParamValue, PathBuildError, PathBuilder};
pub use self::cache::PatternCache;
pub use self::matcher::{compile, CompileOptions, Matcher, PathMatch};
pub use self::parser::{parse, Key, KeyName, PatternError, Token};

use std::fmt;

/// A route's path pattern: a single express-style string or an ordered list
/// of alternatives tried in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternSource(Vec<String>);

impl PatternSource {
    pub fn alternatives(&self) -> &[String] {
        &self.0
    }

    /// The primary (first) alternative; used when joining ancestor paths for
    /// reverse URL generation.
    pub fn primary(&self) -> &str {
        self.0.first().map(|s| s.as_str()).unwrap_or("")
    }

    /// The same alternatives with a leading `/` stripped from each. Applied
    /// to nested routes once an ancestor has consumed the leading slash.
    pub fn without_leading_slash(&self) -> PatternSource {
        PatternSource(
            self.0
                .iter()
                .map(|s| s.strip_prefix('/').unwrap_or(s).to_string())
                .collect(),
        )
    }
}

impl From<&str> for PatternSource {
    fn from(s: &str) -> Self {
        PatternSource(vec![s.to_string()])
    }
}

impl From<String> for PatternSource {
    fn from(s: String) -> Self {
        PatternSource(vec![s])
    }
}

impl From<Vec<String>> for PatternSource {
    fn from(v: Vec<String>) -> Self {
        PatternSource(v)
    }
}

impl From<Vec<&str>> for PatternSource {
    fn from(v: Vec<&str>) -> Self {
        PatternSource(v.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for PatternSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("|"))
    }
}
