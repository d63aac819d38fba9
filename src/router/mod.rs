//! The navigation controller.
//!
//! Every call to [`Router::render`] gets a strictly increasing render id.
//! Async steps re-check that id at each resumption; a superseded attempt
//! stops mutating shared state and settles with the latest location.

mod location;
mod reconcile;
mod strategy;
mod urls;

pub use self::location::{RouteInfo, RouterLocation};

use self::location::split_url;
use self::reconcile::{apply_chain, divergence_index, remove_appearing_content, DomUpdate};
use self::strategy::NavStrategy;
use self::urls::{build_name_index, full_path, lookup_name, NameSlot};

use crate::bundle::BundleLoader;
use crate::dom::{Animator, ComponentFactory, Element, HookOutcome};
use crate::error::RouterError;
use crate::events::{EventHandler, RouterEvent};
use crate::history::{History, HistoryEntry, HistoryLocation, MemoryHistory};
use crate::params::Params;
use crate::pattern::BuildArgs;
use crate::resolver::{ChainEntry, ResolveRequest, ResolveResult, ResolvedContext, Resolver};
use crate::routes::{Route, ValidationError};

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use log::{debug, warn};

/// Redirect chains longer than this fail with
/// [`RouterError::TooManyRedirects`].
pub const MAX_REDIRECTS: u32 = 256;

enum WalkOutcome {
    Complete(ResolvedContext),
    Redirect { pathname: String, from: String },
}

enum Commit {
    Done(RouterLocation),
    Redirect(String),
    /// A before-hook prevented the navigation; the previous render stays.
    Cancelled,
    /// A newer attempt took over.
    Stale,
}

type QueryStringifier = Box<dyn Fn(&Params) -> String>;

pub struct Router {
    resolver: Resolver,
    mount: Element,
    factory: Rc<dyn ComponentFactory>,
    bundle_loader: Option<Rc<dyn BundleLoader>>,
    loaded_bundles: Rc<RefCell<HashSet<String>>>,
    history: Rc<dyn History>,
    animator: Option<Rc<dyn Animator>>,
    last_render_id: Rc<Cell<u64>>,
    committed: Cell<bool>,
    chain: RefCell<Vec<ChainEntry>>,
    location: RefCell<RouterLocation>,
    name_index: RefCell<Option<Rc<HashMap<String, NameSlot>>>>,
    subscribers: RefCell<Vec<EventHandler>>,
    query_stringifier: QueryStringifier,
}

impl Router {
    pub fn new<F>(mount: Element, factory: F) -> Self
    where
        F: ComponentFactory + 'static,
    {
        Self {
            resolver: Resolver::new(),
            mount,
            factory: Rc::new(factory),
            bundle_loader: None,
            loaded_bundles: Rc::new(RefCell::new(HashSet::new())),
            history: Rc::new(MemoryHistory::new()),
            animator: None,
            last_render_id: Rc::new(Cell::new(0)),
            committed: Cell::new(false),
            chain: RefCell::new(Vec::new()),
            location: RefCell::new(RouterLocation::default()),
            name_index: RefCell::new(None),
            subscribers: RefCell::new(Vec::new()),
            query_stringifier: Box::new(|params| params.to_query_string()),
        }
    }

    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.resolver = self.resolver.with_base_url(base);
        self
    }

    pub fn with_history(mut self, history: impl History + 'static) -> Self {
        self.history = Rc::new(history);
        self
    }

    pub fn with_bundle_loader(mut self, loader: impl BundleLoader + 'static) -> Self {
        self.bundle_loader = Some(Rc::new(loader));
        self
    }

    pub fn with_animator(mut self, animator: impl Animator + 'static) -> Self {
        self.animator = Some(Rc::new(animator));
        self
    }

    /// Gives `handler` first refusal on any render error; a `Some` return
    /// value is mounted at the attempted pathname instead of the render
    /// failing.
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RouterError) -> Option<ResolveResult> + 'static,
    {
        self.resolver.set_error_handler(handler);
        self
    }

    /// Replaces the serializer for parameters not consumed by a pattern
    /// during reverse URL generation. The default is
    /// [`Params::to_query_string`].
    pub fn with_query_stringifier<F>(mut self, stringifier: F) -> Self
    where
        F: Fn(&Params) -> String + 'static,
    {
        self.query_stringifier = Box::new(stringifier);
        self
    }

    pub fn set_routes(&self, routes: Vec<Route>) -> Result<(), ValidationError> {
        self.resolver.set_routes(routes)?;
        *self.name_index.borrow_mut() = None;
        Ok(())
    }

    pub fn add_routes(&self, routes: Vec<Route>) -> Result<(), ValidationError> {
        self.resolver.add_routes(routes)?;
        *self.name_index.borrow_mut() = None;
        Ok(())
    }

    pub fn remove_routes(&self) {
        self.resolver.remove_routes();
        *self.name_index.borrow_mut() = None;
    }

    pub fn get_routes(&self) -> Vec<Route> {
        self.resolver.get_routes()
    }

    pub fn outlet(&self) -> &Element {
        &self.mount
    }

    pub fn location(&self) -> RouterLocation {
        self.location.borrow().clone()
    }

    pub fn subscribe<F>(&self, subscriber: F)
    where
        F: Fn(&RouterEvent) + 'static,
    {
        self.subscribers.borrow_mut().push(Box::new(subscriber));
    }

    fn emit(&self, event: &RouterEvent) {
        for subscriber in self.subscribers.borrow().iter() {
            subscriber(event);
        }
    }

    fn is_latest(&self, id: u64) -> bool {
        self.last_render_id.get() == id
    }

    /// Renders the route chain for a pathname (or full request) into the
    /// mount point. Resolves with the rendered location; a superseded
    /// attempt resolves with the latest location instead.
    pub async fn render(
        &self,
        request: impl Into<ResolveRequest>,
    ) -> Result<RouterLocation, RouterError> {
        self.render_with(request.into(), true).await
    }

    /// Re-renders for a popped history entry. Entries stamped with the
    /// router-ignore sentinel were written by this router and are not
    /// replayed; either way the history stack itself is left alone.
    pub async fn handle_popped(&self, entry: HistoryEntry) -> Result<RouterLocation, RouterError> {
        if entry.router_ignore {
            return Ok(self.location());
        }
        let HistoryLocation {
            pathname,
            search,
            hash,
        } = entry.location;
        self.render_with(
            ResolveRequest::path(pathname).search(search).hash(hash),
            false,
        )
        .await
    }

    async fn render_with(
        &self,
        request: ResolveRequest,
        update_history: bool,
    ) -> Result<RouterLocation, RouterError> {
        let id = self.last_render_id.get() + 1;
        self.last_render_id.set(id);
        let pathname = request.pathname.clone();
        debug!("render #{}: {:?}", id, pathname);

        match self.do_render(id, request, update_history).await {
            Ok(location) => Ok(location),
            Err(err) => {
                if !self.is_latest(id) {
                    return Err(err);
                }
                if let Some(result) = self.resolver.handle_error(&err) {
                    debug!("render #{}: error handler substituted a result", id);
                    if let Some(location) =
                        self.apply_fallback(result, pathname.clone(), update_history)
                    {
                        self.emit(&RouterEvent::LocationChanged(location.clone()));
                        return Ok(location);
                    }
                }
                warn!("render #{} failed: {}", id, err);
                self.mount.clear();
                self.chain.borrow_mut().clear();
                *self.location.borrow_mut() = RouterLocation::error_at(pathname.clone());
                self.emit(&RouterEvent::Error {
                    message: err.to_string(),
                    pathname,
                });
                Err(err)
            }
        }
    }

    /// Mounts an error handler's substituted result at the attempted
    /// pathname. Redirect substitutions are not followed.
    fn apply_fallback(
        &self,
        result: ResolveResult,
        pathname: String,
        update_history: bool,
    ) -> Option<RouterLocation> {
        let element = match result {
            ResolveResult::Element(element) => element,
            ResolveResult::Component(name) => self.factory.create(&name)?,
            ResolveResult::Redirect { .. } => return None,
        };
        self.mount.clear();
        self.mount.append_child(&element);
        self.chain.borrow_mut().clear();
        let location = RouterLocation::error_at(pathname);
        if update_history {
            let entry = HistoryEntry {
                location: HistoryLocation {
                    pathname: location.pathname.clone(),
                    search: location.search.clone(),
                    hash: location.hash.clone(),
                },
                router_ignore: true,
            };
            if self.committed.get() {
                self.history.push(entry);
            } else {
                self.history.replace(entry);
            }
        }
        self.committed.set(true);
        *self.location.borrow_mut() = location.clone();
        Some(location)
    }

    /// [`render`](Self::render) for a full URL with search and hash parts.
    pub async fn render_url(&self, url: &str) -> Result<RouterLocation, RouterError> {
        let (pathname, search, hash) = split_url(url);
        self.render(ResolveRequest::path(pathname).search(search).hash(hash))
            .await
    }

    async fn do_render(
        &self,
        id: u64,
        request: ResolveRequest,
        update_history: bool,
    ) -> Result<RouterLocation, RouterError> {
        let mut request = request;
        let mut redirects: u32 = 0;
        loop {
            let strategy = NavStrategy {
                render_id: id,
                last_render_id: Rc::clone(&self.last_render_id),
                factory: Rc::clone(&self.factory),
                bundle_loader: self.bundle_loader.clone(),
                loaded_bundles: Rc::clone(&self.loaded_bundles),
            };
            let outcome = {
                let mut walk = self.resolver.walk(&strategy, request.clone())?;
                loop {
                    let step = walk.next().await?;
                    if !self.is_latest(id) {
                        return Ok(self.location());
                    }
                    match step {
                        None => {
                            return Err(RouterError::NotFound {
                                pathname: walk.pathname().to_string(),
                                route_path: walk.stopped_at(),
                            })
                        }
                        Some(ResolveResult::Redirect { pathname, from }) => {
                            break WalkOutcome::Redirect { pathname, from };
                        }
                        Some(ResolveResult::Component(name)) => {
                            // the navigation strategy instantiates components
                            // itself; a raw name here means the factory was
                            // bypassed
                            return Err(RouterError::InvalidResolutionResult { component: name });
                        }
                        Some(ResolveResult::Element(element)) => {
                            walk.set_last_element(element.clone());
                            if walk.is_found() {
                                break WalkOutcome::Complete(
                                    walk.finish(ResolveResult::Element(element)),
                                );
                            }
                            // pathname not fully consumed: keep extending the
                            // chain with deeper or sibling matches
                        }
                    }
                }
            };

            match outcome {
                WalkOutcome::Redirect { pathname, from } => {
                    redirects = self.bump_redirects(redirects, &pathname)?;
                    debug!("render #{}: redirect to {:?}", id, pathname);
                    let redirect_from = request.redirect_from.take().unwrap_or(from);
                    request = ResolveRequest::path(pathname)
                        .search(request.search)
                        .hash(request.hash)
                        .redirect_from(redirect_from);
                }
                WalkOutcome::Complete(context) => match self
                    .commit(id, context, update_history)
                    .await?
                {
                    Commit::Done(location) => return Ok(location),
                    Commit::Redirect(pathname) => {
                        redirects = self.bump_redirects(redirects, &pathname)?;
                        debug!("render #{}: hook redirect to {:?}", id, pathname);
                        let from = request.pathname.clone();
                        let redirect_from = request.redirect_from.take().unwrap_or(from);
                        request = ResolveRequest::path(pathname)
                            .search(request.search)
                            .hash(request.hash)
                            .redirect_from(redirect_from);
                    }
                    Commit::Cancelled | Commit::Stale => return Ok(self.location()),
                },
            }
        }
    }

    fn bump_redirects(&self, count: u32, pathname: &str) -> Result<u32, RouterError> {
        let count = count + 1;
        if count > MAX_REDIRECTS {
            return Err(RouterError::TooManyRedirects {
                pathname: pathname.to_string(),
                count,
            });
        }
        Ok(count)
    }

    /// Lifecycle passes, DOM reconciliation, and history for one fully
    /// resolved context.
    async fn commit(
        &self,
        id: u64,
        context: ResolvedContext,
        update_history: bool,
    ) -> Result<Commit, RouterError> {
        let old_chain = self.chain.borrow().clone();
        let mut new_chain = context.chain.clone();
        let divergence = divergence_index(&old_chain, &new_chain);
        // reused positions keep the already-mounted elements
        for i in 0..divergence {
            new_chain[i].element = old_chain[i].element.clone();
        }
        let location = RouterLocation::from_context(&context, self.resolver.base_url());

        // before-leave over the abandoned old suffix, deepest first
        for entry in old_chain[divergence..].iter().rev() {
            if let Some(lifecycle) = entry.element.as_ref().and_then(|el| el.lifecycle()) {
                match lifecycle.on_before_leave(&location).await {
                    HookOutcome::Continue => {}
                    HookOutcome::Prevent => return Ok(Commit::Cancelled),
                    HookOutcome::Redirect(path) => return Ok(Commit::Redirect(path)),
                }
                if !self.is_latest(id) {
                    return Ok(Commit::Stale);
                }
            }
        }
        // before-enter over the new suffix, shallowest first
        for entry in new_chain[divergence..].iter() {
            if let Some(lifecycle) = entry.element.as_ref().and_then(|el| el.lifecycle()) {
                match lifecycle.on_before_enter(&location).await {
                    HookOutcome::Continue => {}
                    HookOutcome::Prevent => return Ok(Commit::Cancelled),
                    HookOutcome::Redirect(path) => return Ok(Commit::Redirect(path)),
                }
                if !self.is_latest(id) {
                    return Ok(Commit::Stale);
                }
            }
        }

        let unchanged = divergence == old_chain.len() && divergence == new_chain.len();
        let update = if unchanged {
            DomUpdate::default()
        } else {
            apply_chain(&self.mount, &new_chain, divergence)
        };

        // disappearing content stays mounted until the transition finishes
        let animated = old_chain[divergence..]
            .iter()
            .chain(&new_chain[divergence..])
            .any(|entry| entry.animate);
        if animated {
            if let Some(animator) = &self.animator {
                animator
                    .animate(&update.disappearing, &update.appearing)
                    .await;
                if !self.is_latest(id) {
                    remove_appearing_content(&update);
                    return Ok(Commit::Stale);
                }
            }
        }
        for element in &update.disappearing {
            element.detach();
        }

        // after-enter forward, after-leave in reverse
        for entry in new_chain[divergence..].iter() {
            if let Some(lifecycle) = entry.element.as_ref().and_then(|el| el.lifecycle()) {
                lifecycle.on_after_enter(&location).await;
            }
        }
        for entry in old_chain[divergence..].iter().rev() {
            if let Some(lifecycle) = entry.element.as_ref().and_then(|el| el.lifecycle()) {
                lifecycle.on_after_leave(&location).await;
            }
        }

        if !self.is_latest(id) {
            // the winner diffs against the mounted content and tears the
            // rest down itself
            return Ok(Commit::Stale);
        }

        if update_history {
            let entry = HistoryEntry {
                location: HistoryLocation {
                    pathname: location.pathname.clone(),
                    search: location.search.clone(),
                    hash: location.hash.clone(),
                },
                router_ignore: true,
            };
            if !self.committed.get() || context.redirect_from.is_some() {
                self.history.replace(entry);
            } else {
                self.history.push(entry);
            }
        }
        self.committed.set(true);

        *self.chain.borrow_mut() = new_chain;
        *self.location.borrow_mut() = location.clone();
        self.emit(&RouterEvent::LocationChanged(location.clone()));
        Ok(Commit::Done(location))
    }

    fn name_index(&self) -> Rc<HashMap<String, NameSlot>> {
        let mut slot = self.name_index.borrow_mut();
        match &*slot {
            Some(index) => Rc::clone(index),
            None => {
                let index = Rc::new(build_name_index(&self.resolver.table().borrow()));
                *slot = Some(Rc::clone(&index));
                index
            }
        }
    }

    /// Builds a URL for a named route from parameter values. Parameters the
    /// pattern does not consume go through the query stringifier, if any.
    pub fn url_for_name(&self, name: &str, args: &BuildArgs) -> Result<String, RouterError> {
        let index = self.name_index();
        let id = lookup_name(&index, name)?;
        let path = full_path(&self.resolver.table().borrow(), id);
        self.build_url(&path, args)
    }

    /// Builds a URL directly from a route path pattern.
    pub fn url_for_path(&self, pattern: &str, args: &BuildArgs) -> Result<String, RouterError> {
        self.build_url(pattern, args)
    }

    fn build_url(&self, pattern: &str, args: &BuildArgs) -> Result<String, RouterError> {
        let builder = self.resolver.cache().builder_for(pattern)?;
        let mut url = builder.build(args)?;
        let leftover = args.leftover(&builder.key_names());
        if !leftover.is_empty() {
            let query = (self.query_stringifier)(&leftover);
            if !query.is_empty() {
                url.push('?');
                url.push_str(&query);
            }
        }
        match self.resolver.base_url() {
            Some(base) => Ok(format!("{}{}", base.trim_end_matches('/'), url)),
            None => Ok(url),
        }
    }
}
