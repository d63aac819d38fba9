use crate::pattern::{PathBuildError, PatternError};
use crate::routes::ValidationError;

/// Top-level error type for resolution and navigation.
///
/// `NotFound` and `TooManyRedirects` are the two router-specific fatal
/// conditions; both carry the pathname that failed. Everything else wraps
/// a configuration or callback failure.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("page not found (path: {pathname:?})")]
    NotFound {
        pathname: String,
        /// Route path where resolution stopped, if any route matched at all.
        route_path: Option<String>,
    },

    #[error("too many redirects (path: {pathname:?}, count: {count})")]
    TooManyRedirects { pathname: String, count: u32 },

    #[error("bundle not found (url: {url:?})")]
    BundleLoad { url: String },

    #[error("component {component:?} is not known to the component factory")]
    InvalidResolutionResult { component: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    PathBuild(#[from] PathBuildError),

    /// Error raised by a route action or lifecycle hook.
    #[error("{message}")]
    Callback { message: String },
}

impl RouterError {
    /// Creates a callback error from any displayable value.
    pub fn callback(message: impl Into<String>) -> Self {
        Self::Callback {
            message: message.into(),
        }
    }

    /// Status code associated with this error: 404 for `NotFound`,
    /// 500 for everything else.
    pub fn code(&self) -> u32 {
        match self {
            Self::NotFound { .. } => 404,
            _ => 500,
        }
    }
}
