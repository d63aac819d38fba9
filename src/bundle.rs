//! External bundle references and their loader boundary.

use futures::future::LocalBoxFuture;
use smallvec::SmallVec;

/// Reference to an external resource loaded before a route's component is
/// instantiated. `Dual` carries a modern and a legacy variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bundle {
    Single(String),
    Dual { module: String, nomodule: String },
}

impl Bundle {
    pub fn urls(&self) -> SmallVec<[&str; 2]> {
        match self {
            Bundle::Single(url) => SmallVec::from_slice(&[url.as_str()]),
            Bundle::Dual { module, nomodule } => {
                SmallVec::from_slice(&[module.as_str(), nomodule.as_str()])
            }
        }
    }
}

impl From<&str> for Bundle {
    fn from(url: &str) -> Self {
        Bundle::Single(url.to_string())
    }
}

impl From<String> for Bundle {
    fn from(url: String) -> Self {
        Bundle::Single(url)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to load bundle {url:?}: {message}")]
pub struct BundleError {
    pub url: String,
    pub message: String,
}

/// Fetches bundle URLs. The navigation controller guarantees each URL is
/// requested at most once; repeated references resolve immediately.
pub trait BundleLoader {
    fn load<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<(), BundleError>>;
}
