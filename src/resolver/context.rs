use crate::dom::Element;
use crate::params::Params;
use crate::routes::RouteId;

/// Caller-supplied description of what to resolve.
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    pub pathname: String,
    pub search: String,
    pub hash: String,
    /// The original pathname when this request was produced by a redirect.
    pub redirect_from: Option<String>,
}

impl ResolveRequest {
    pub fn path(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            ..Self::default()
        }
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    pub fn redirect_from(mut self, from: impl Into<String>) -> Self {
        self.redirect_from = Some(from.into());
        self
    }
}

impl From<&str> for ResolveRequest {
    fn from(pathname: &str) -> Self {
        Self::path(pathname)
    }
}

impl From<String> for ResolveRequest {
    fn from(pathname: String) -> Self {
        Self::path(pathname)
    }
}

/// A non-empty value produced by resolving one matched route.
#[derive(Debug, Clone)]
pub enum ResolveResult {
    /// A component identifier for the surrounding UI to instantiate.
    Component(String),
    /// A renderable element produced directly by an action.
    Element(Element),
    /// Restart resolution at another path.
    Redirect { pathname: String, from: String },
}

impl ResolveResult {
    pub fn is_redirect(&self) -> bool {
        matches!(self, ResolveResult::Redirect { .. })
    }
}

/// One link of a resolution chain: a matched route segment and, once the
/// navigation controller has rendered it, its element.
///
/// The route metadata is snapshotted here because dynamically produced
/// routes only live as long as the resolution attempt itself.
#[derive(Debug, Clone)]
pub struct ChainEntry {
    pub route: RouteId,
    /// The pathname substring this route's own pattern consumed.
    pub path: String,
    pub element: Option<Element>,
    /// Primary pattern source of the route, as configured.
    pub(crate) pattern: String,
    pub(crate) name: Option<String>,
    pub(crate) component: Option<String>,
    pub(crate) animate: bool,
}

/// Settled outcome of one resolution walk.
#[derive(Debug, Clone)]
pub struct ResolvedContext {
    pub pathname: String,
    pub search: String,
    pub hash: String,
    /// Parameters merged from the root down to the resolved route.
    pub params: Params,
    /// Root-to-leaf matched segments, synthetic root excluded.
    pub chain: Vec<ChainEntry>,
    pub result: ResolveResult,
    pub redirect_from: Option<String>,
    /// Pathname offset up to which the chain has matched.
    pub matched_end: usize,
}

impl ResolvedContext {
    /// Whether the chain accounts for the entire pathname.
    pub fn is_found(&self) -> bool {
        self.matched_end == self.pathname.len()
    }

    pub fn route(&self) -> Option<RouteId> {
        self.chain.last().map(|entry| entry.route)
    }
}
