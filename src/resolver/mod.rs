//! Route resolution: match walk plus pluggable per-route resolution.
//!
//! The resolver owns the route table and the pattern compilation cache. Its
//! [`Resolver::resolve`] runs the tree matcher over the configured routes and
//! invokes a resolve-route strategy for each candidate match in order; the
//! first non-empty result wins. The default strategy dispatches to the
//! route's `action` and nothing else; the navigation controller substitutes
//! a richer strategy without touching the matching algorithm.

mod context;
mod walk;

pub use self::context::{ChainEntry, ResolveRequest, ResolveResult, ResolvedContext};
pub(crate) use self::walk::Walk;

use crate::error::RouterError;
use crate::pattern::PatternCache;
use crate::routes::{ActionContext, ActionResult, Commands, Route, RouteDef, RouteTable, ValidationError};

use std::cell::RefCell;

use futures::future::LocalBoxFuture;
use log::{debug, warn};

/// Per-route resolution strategy invoked for every candidate match.
pub(crate) trait ResolveRoute {
    /// Returns `None` to pass and let the walk continue to deeper or sibling
    /// matches.
    fn resolve_route<'a>(
        &'a self,
        context: &'a ActionContext,
        def: &'a RouteDef,
    ) -> LocalBoxFuture<'a, Result<Option<ResolveResult>, RouterError>>;
}

/// Default strategy: invoke the route's `action` when present, otherwise
/// pass.
pub(crate) struct ActionDispatch;

impl ResolveRoute for ActionDispatch {
    fn resolve_route<'a>(
        &'a self,
        context: &'a ActionContext,
        def: &'a RouteDef,
    ) -> LocalBoxFuture<'a, Result<Option<ResolveResult>, RouterError>> {
        let action = def.action.clone();
        Box::pin(async move {
            let action = match action {
                Some(action) => action,
                None => return Ok(None),
            };
            let commands = Commands::default();
            match action(context, &commands).await? {
                ActionResult::None => Ok(None),
                ActionResult::Component(name) => Ok(Some(ResolveResult::Component(name))),
                ActionResult::Element(element) => Ok(Some(ResolveResult::Element(element))),
                ActionResult::Redirect(pathname) => Ok(Some(ResolveResult::Redirect {
                    pathname,
                    from: context.pathname.clone(),
                })),
            }
        })
    }
}

type ErrorHandlerFn = Box<dyn Fn(&RouterError) -> Option<ResolveResult>>;

/// Matches pathnames against a route table and resolves the first matching
/// route to a non-empty result.
pub struct Resolver {
    table: RefCell<RouteTable>,
    cache: PatternCache,
    base_url: Option<String>,
    error_handler: Option<ErrorHandlerFn>,
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            table: RefCell::new(RouteTable::new()),
            cache: PatternCache::new(),
            base_url: None,
            error_handler: None,
        }
    }

    /// All incoming pathnames must fall under `base`; the prefix is stripped
    /// before matching.
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        self.base_url = Some(base);
        self
    }

    /// Gets first refusal on any error raised during a walk; a `Some` return
    /// value becomes the context's result instead of the error propagating.
    pub fn set_error_handler<F>(&mut self, handler: F)
    where
        F: Fn(&RouterError) -> Option<ResolveResult> + 'static,
    {
        self.error_handler = Some(Box::new(handler));
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Replaces the top-level route list. Fails synchronously when any route
    /// lacks both a path handler and children.
    pub fn set_routes(&self, routes: Vec<Route>) -> Result<(), ValidationError> {
        self.table.borrow_mut().set_routes(routes)?;
        self.cache.clear();
        Ok(())
    }

    pub fn add_routes(&self, routes: Vec<Route>) -> Result<(), ValidationError> {
        self.table.borrow_mut().add_routes(routes)
    }

    pub fn remove_routes(&self) {
        self.table.borrow_mut().remove_routes();
        self.cache.clear();
    }

    /// Shallow snapshot of the configured top-level routes.
    pub fn get_routes(&self) -> Vec<Route> {
        self.table.borrow().get_routes()
    }

    pub(crate) fn table(&self) -> &RefCell<RouteTable> {
        &self.table
    }

    pub(crate) fn cache(&self) -> &PatternCache {
        &self.cache
    }

    /// Strips the configured base prefix. `None` means the pathname is not
    /// handled by this resolver at all.
    pub(crate) fn normalize(&self, pathname: &str) -> Option<String> {
        match &self.base_url {
            None => Some(pathname.to_string()),
            Some(base) => {
                if let Some(rest) = pathname.strip_prefix(base.as_str()) {
                    let mut stripped = String::with_capacity(rest.len() + 1);
                    stripped.push('/');
                    stripped.push_str(rest);
                    Some(stripped)
                } else if pathname == &base[..base.len() - 1] {
                    Some("/".to_string())
                } else {
                    None
                }
            }
        }
    }

    pub(crate) fn walk<'r, S: ResolveRoute + ?Sized>(
        &'r self,
        strategy: &'r S,
        request: ResolveRequest,
    ) -> Result<Walk<'r, S>, RouterError> {
        let mut request = request;
        request.pathname = match self.normalize(&request.pathname) {
            Some(normalized) => normalized,
            None => {
                return Err(RouterError::NotFound {
                    pathname: request.pathname,
                    route_path: None,
                })
            }
        };
        Ok(Walk::new(self, strategy, request))
    }

    /// Resolves a pathname to the first non-empty route result.
    pub async fn resolve(
        &self,
        request: impl Into<ResolveRequest>,
    ) -> Result<ResolvedContext, RouterError> {
        let request = request.into();
        debug!("resolving {:?}", request.pathname);
        let attempted = request.clone();
        let outcome = async {
            let mut walk = self.walk(&ActionDispatch, request)?;
            match walk.next().await? {
                Some(result) => Ok(walk.finish(result)),
                None => {
                    let err = RouterError::NotFound {
                        pathname: walk.pathname().to_string(),
                        route_path: walk.stopped_at(),
                    };
                    warn!("{}", err);
                    Err(err)
                }
            }
        }
        .await;

        match outcome {
            Ok(context) => Ok(context),
            Err(err) => match self.handle_error(&err) {
                Some(result) => {
                    debug!("error handler substituted a result for {}", err);
                    // the attempted location survives with only the result
                    // swapped in
                    let pathname = self
                        .normalize(&attempted.pathname)
                        .unwrap_or(attempted.pathname);
                    Ok(ResolvedContext {
                        pathname,
                        search: attempted.search,
                        hash: attempted.hash,
                        params: crate::params::Params::new(),
                        chain: Vec::new(),
                        result,
                        redirect_from: attempted.redirect_from,
                        matched_end: 0,
                    })
                }
                None => Err(err),
            },
        }
    }

    /// Offers an error to the configured handler; `Some` substitutes the
    /// failed attempt's result.
    pub(crate) fn handle_error(&self, err: &RouterError) -> Option<ResolveResult> {
        self.error_handler.as_ref().and_then(|handler| handler(err))
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future;

    #[test]
    fn first_non_empty_action_wins() {
        let resolver = Resolver::new();
        resolver
            .set_routes(vec![
                Route::new("/a")
                    .action(|_ctx, c| Box::pin(future::ready(Ok(c.pass())))),
                Route::new("/a")
                    .action(|_ctx, c| Box::pin(future::ready(Ok(c.component("second"))))),
            ])
            .unwrap();
        let context = block_on(resolver.resolve("/a")).unwrap();
        match &context.result {
            ResolveResult::Component(name) => assert_eq!(name, "second"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(context.is_found());
    }

    #[test]
    fn exhausted_walk_is_not_found_with_code_404() {
        let resolver = Resolver::new();
        resolver
            .set_routes(vec![
                Route::new("/a").action(|_ctx, c| Box::pin(future::ready(Ok(c.pass()))))
            ])
            .unwrap();
        let err = block_on(resolver.resolve("/missing")).unwrap_err();
        assert_eq!(err.code(), 404);
    }

    #[test]
    fn action_params_reach_the_context() {
        let resolver = Resolver::new();
        resolver
            .set_routes(vec![Route::new("/user/:id").action(|ctx, _c| {
                let id = ctx.params.get("id").unwrap_or_default().to_string();
                Box::pin(future::ready(Ok(ActionResult::Component(format!(
                    "user-{}",
                    id
                )))))
            })])
            .unwrap();
        let context = block_on(resolver.resolve("/user/42")).unwrap();
        assert_eq!(context.params.get("id"), Some("42"));
        match context.result {
            ResolveResult::Component(name) => assert_eq!(name, "user-42"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn base_url_prefix_is_stripped() {
        let resolver = Resolver::new().with_base_url("/app");
        resolver
            .set_routes(vec![
                Route::new("/x").action(|_ctx, c| Box::pin(future::ready(Ok(c.component("x")))))
            ])
            .unwrap();
        let context = block_on(resolver.resolve("/app/x")).unwrap();
        assert_eq!(context.pathname, "/x");

        let err = block_on(resolver.resolve("/elsewhere/x")).unwrap_err();
        assert_eq!(err.code(), 404);
    }

    #[test]
    fn error_handler_gets_first_refusal() {
        let mut resolver = Resolver::new();
        resolver
            .set_routes(vec![
                Route::new("/a").action(|_ctx, c| Box::pin(future::ready(Ok(c.component("a")))))
            ])
            .unwrap();
        resolver.set_error_handler(|err| {
            assert_eq!(err.code(), 404);
            Some(ResolveResult::Component("fallback".to_string()))
        });
        let context = block_on(
            resolver.resolve(ResolveRequest::path("/missing").search("?q=1").hash("#top")),
        )
        .unwrap();
        match &context.result {
            ResolveResult::Component(name) => assert_eq!(name, "fallback"),
            other => panic!("unexpected result: {:?}", other),
        }
        // the substituted result keeps the attempted location
        assert_eq!(context.pathname, "/missing");
        assert_eq!(context.search, "?q=1");
        assert_eq!(context.hash, "#top");
    }

    #[test]
    fn dynamic_children_resolve_within_one_attempt() {
        let resolver = Resolver::new();
        resolver
            .set_routes(vec![Route::new("/lazy").children_fn(|_ctx| {
                Box::pin(future::ready(Ok(vec![Route::new(":leaf").action(
                    |ctx, _c| {
                        let leaf = ctx.params.get("leaf").unwrap_or_default().to_string();
                        Box::pin(future::ready(Ok(ActionResult::Component(leaf))))
                    },
                )])))
            })])
            .unwrap();
        let context = block_on(resolver.resolve("/lazy/inner")).unwrap();
        match context.result {
            ResolveResult::Component(name) => assert_eq!(name, "inner"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(context.chain.len(), 2);
    }

    #[test]
    fn redirect_result_carries_the_origin() {
        let resolver = Resolver::new();
        resolver
            .set_routes(vec![
                Route::new("/old").action(|_ctx, c| Box::pin(future::ready(Ok(c.redirect("/new")))))
            ])
            .unwrap();
        let context = block_on(resolver.resolve("/old")).unwrap();
        match context.result {
            ResolveResult::Redirect { pathname, from } => {
                assert_eq!(pathname, "/new");
                assert_eq!(from, "/old");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
