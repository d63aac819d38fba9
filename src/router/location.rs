use crate::error::RouterError;
use crate::params::Params;
use crate::pattern::{BuildArgs, PathBuilder};
use crate::resolver::ResolvedContext;

use super::urls::join_paths;

/// Snapshot of one matched route, exposed on [`RouterLocation`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteInfo {
    /// The route's pattern as configured.
    pub path: String,
    pub name: Option<String>,
    pub component: Option<String>,
}

/// The currently rendered location, rebuilt after every completed render.
#[derive(Debug, Clone, Default)]
pub struct RouterLocation {
    pub base_url: String,
    /// Full visible pathname, base prefix included.
    pub pathname: String,
    pub search: String,
    pub hash: String,
    /// Infos for every matched route, root to leaf.
    pub routes: Vec<RouteInfo>,
    pub params: Params,
    /// Original pathname when the render went through redirects.
    pub redirect_from: Option<String>,
    /// Ancestor-joined pattern of the matched chain, for URL rebuilding.
    pub(crate) route_pattern: String,
}

impl RouterLocation {
    pub(crate) fn from_context(context: &ResolvedContext, base_url: Option<&str>) -> Self {
        let base = base_url.unwrap_or("");
        let routes: Vec<RouteInfo> = context
            .chain
            .iter()
            .map(|entry| RouteInfo {
                path: entry.pattern.clone(),
                name: entry.name.clone(),
                component: entry.component.clone(),
            })
            .collect();
        let route_pattern = context
            .chain
            .iter()
            .fold(String::new(), |acc, entry| join_paths(&acc, &entry.pattern));
        Self {
            base_url: base.to_string(),
            pathname: format!("{}{}", base.trim_end_matches('/'), context.pathname),
            search: context.search.clone(),
            hash: context.hash.clone(),
            routes,
            params: context.params.clone(),
            redirect_from: context.redirect_from.clone(),
            route_pattern,
        }
    }

    pub(crate) fn error_at(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            ..Self::default()
        }
    }

    /// The deepest matched route.
    pub fn route(&self) -> Option<&RouteInfo> {
        self.routes.last()
    }

    /// The visible URL: pathname plus search plus hash.
    pub fn url(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }

    /// Rebuilds this location's URL with some parameters replaced. Values
    /// not supplied in `extra` fall back to the current parameters.
    pub fn get_url(&self, extra: &BuildArgs) -> Result<String, RouterError> {
        let mut args = extra.clone();
        for (key, values) in self.params.iter() {
            if args.get(key).is_none() {
                if values.len() == 1 {
                    args.insert(key, &values[0]);
                } else {
                    args.insert_list(key, values.to_vec());
                }
            }
        }
        let builder = PathBuilder::compile(&self.route_pattern)?;
        let path = builder.build(&args)?;
        Ok(format!("{}{}", self.base_url.trim_end_matches('/'), path))
    }
}

/// Splits a URL into pathname, search (with `?`), and hash (with `#`).
pub(crate) fn split_url(url: &str) -> (String, String, String) {
    let (rest, hash) = match url.find('#') {
        Some(i) => (&url[..i], url[i..].to_string()),
        None => (url, String::new()),
    };
    let (pathname, search) = match rest.find('?') {
        Some(i) => (rest[..i].to_string(), rest[i..].to_string()),
        None => (rest.to_string(), String::new()),
    };
    (pathname, search, hash)
}
