//! Route configuration and the arena it is flattened into.
//!
//! Public configuration is an owned [`Route`] tree built with chained
//! constructors. [`RouteTable`] flattens it into a vector of [`RouteDef`]s
//! addressed by [`RouteId`]; parent/child relationships are id pairs, never
//! back-pointers. Children produced by a callback are flattened into a
//! per-resolution [`SideArena`] so the shared table is never mutated while
//! matching.

use crate::bundle::Bundle;
use crate::dom::Element;
use crate::error::RouterError;
use crate::params::Params;
use crate::pattern::PatternSource;

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

/// Stable identifier of a route within a table (or its per-attempt side
/// arena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub(crate) usize);

/// Snapshot handed to route actions and children callbacks.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub pathname: String,
    pub search: String,
    pub hash: String,
    /// Merged parameters of this route and its matched ancestors.
    pub params: Params,
    /// The pathname portion consumed by this route's own pattern.
    pub route_path: String,
    pub redirect_from: Option<String>,
}

/// Value produced by a route action.
pub enum ActionResult {
    /// Pass through: resolution continues with deeper or sibling matches.
    None,
    /// Instantiate the named component as this route's element.
    Component(String),
    /// Use this element directly.
    Element(Element),
    /// Restart resolution at another path.
    Redirect(String),
}

/// Helper commands handed to actions alongside the context.
#[derive(Debug, Default)]
pub struct Commands;

impl Commands {
    pub fn redirect(&self, path: impl Into<String>) -> ActionResult {
        ActionResult::Redirect(path.into())
    }

    pub fn component(&self, name: impl Into<String>) -> ActionResult {
        ActionResult::Component(name.into())
    }

    pub fn pass(&self) -> ActionResult {
        ActionResult::None
    }
}

pub type ActionFn = Rc<
    dyn Fn(&ActionContext, &Commands) -> LocalBoxFuture<'static, Result<ActionResult, RouterError>>,
>;

pub type ChildrenFn =
    Rc<dyn Fn(&ActionContext) -> LocalBoxFuture<'static, Result<Vec<Route>, RouterError>>>;

#[derive(Clone)]
pub enum RouteChildren {
    Static(Vec<Route>),
    Dynamic(ChildrenFn),
}

/// One node of the route configuration tree.
#[derive(Clone)]
pub struct Route {
    pub(crate) path: PatternSource,
    pub(crate) children: Option<RouteChildren>,
    pub(crate) action: Option<ActionFn>,
    pub(crate) redirect: Option<String>,
    pub(crate) component: Option<String>,
    pub(crate) bundle: Option<Bundle>,
    pub(crate) name: Option<String>,
    pub(crate) animate: bool,
}

impl Route {
    pub fn new(path: impl Into<PatternSource>) -> Self {
        Self {
            path: path.into(),
            children: None,
            action: None,
            redirect: None,
            component: None,
            bundle: None,
            name: None,
            animate: false,
        }
    }

    pub fn component(mut self, name: impl Into<String>) -> Self {
        self.component = Some(name.into());
        self
    }

    pub fn redirect(mut self, path: impl Into<String>) -> Self {
        self.redirect = Some(path.into());
        self
    }

    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&ActionContext, &Commands) -> LocalBoxFuture<'static, Result<ActionResult, RouterError>>
            + 'static,
    {
        self.action = Some(Rc::new(action));
        self
    }

    pub fn children(mut self, children: Vec<Route>) -> Self {
        self.children = Some(RouteChildren::Static(children));
        self
    }

    pub fn children_fn<F>(mut self, children: F) -> Self
    where
        F: Fn(&ActionContext) -> LocalBoxFuture<'static, Result<Vec<Route>, RouterError>> + 'static,
    {
        self.children = Some(RouteChildren::Dynamic(Rc::new(children)));
        self
    }

    pub fn bundle(mut self, bundle: impl Into<Bundle>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn animate(mut self) -> Self {
        self.animate = true;
        self
    }

    pub fn path(&self) -> &PatternSource {
        &self.path
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("component", &self.component)
            .field("redirect", &self.redirect)
            .field("name", &self.name)
            .finish()
    }
}

/// Raised synchronously when a route configuration is structurally invalid.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("route {path:?} must declare an action, children, redirect, component, or bundle")]
    MissingHandler { path: String },

    #[error("duplicate route name {name:?}")]
    DuplicateName { name: String },

    #[error("no route registered under the name {name:?}")]
    UnknownName { name: String },
}

#[derive(Clone)]
pub(crate) enum ChildrenDef {
    None,
    Static(Vec<RouteId>),
    Dynamic(ChildrenFn),
}

/// Flattened route record.
#[derive(Clone)]
pub(crate) struct RouteDef {
    pub id: RouteId,
    pub parent: Option<RouteId>,
    pub path: PatternSource,
    pub children: ChildrenDef,
    pub action: Option<ActionFn>,
    pub redirect: Option<String>,
    pub component: Option<String>,
    pub bundle: Option<Bundle>,
    pub name: Option<String>,
    pub animate: bool,
    /// The implicit root wrapping the top-level list; excluded from chains.
    pub synthetic: bool,
}

impl RouteDef {
    pub fn has_children(&self) -> bool {
        !matches!(self.children, ChildrenDef::None)
    }
}

pub(crate) fn validate_tree(route: &Route) -> Result<(), ValidationError> {
    let has_handler = route.action.is_some()
        || route.children.is_some()
        || route.redirect.is_some()
        || route.component.is_some()
        || route.bundle.is_some();
    if !has_handler {
        return Err(ValidationError::MissingHandler {
            path: route.path.to_string(),
        });
    }
    if let Some(RouteChildren::Static(children)) = &route.children {
        for child in children {
            validate_tree(child)?;
        }
    }
    Ok(())
}

/// Flattens `route` and its static descendants into `defs`, assigning ids
/// offset by `base`. Returns the new route's id.
fn flatten_into(defs: &mut Vec<RouteDef>, base: usize, route: &Route, parent: Option<RouteId>) -> RouteId {
    let id = RouteId(base + defs.len());
    defs.push(RouteDef {
        id,
        parent,
        path: route.path.clone(),
        children: ChildrenDef::None,
        action: route.action.clone(),
        redirect: route.redirect.clone(),
        component: route.component.clone(),
        bundle: route.bundle.clone(),
        name: route.name.clone(),
        animate: route.animate,
        synthetic: false,
    });
    match &route.children {
        None => {}
        Some(RouteChildren::Dynamic(f)) => {
            defs[id.0 - base].children = ChildrenDef::Dynamic(Rc::clone(f));
        }
        Some(RouteChildren::Static(children)) => {
            let child_ids: Vec<RouteId> = children
                .iter()
                .map(|c| flatten_into(defs, base, c, Some(id)))
                .collect();
            defs[id.0 - base].children = ChildrenDef::Static(child_ids);
        }
    }
    id
}

/// Arena of flattened routes, with a synthetic empty-path root at id 0
/// holding the configured top-level list.
pub(crate) struct RouteTable {
    defs: Vec<RouteDef>,
    config: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        let root = RouteDef {
            id: RouteId(0),
            parent: None,
            path: PatternSource::from(""),
            children: ChildrenDef::Static(Vec::new()),
            action: None,
            redirect: None,
            component: None,
            bundle: None,
            name: None,
            animate: false,
            synthetic: true,
        };
        Self {
            defs: vec![root],
            config: Vec::new(),
        }
    }

    pub fn root(&self) -> RouteId {
        RouteId(0)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn def(&self, id: RouteId) -> Option<&RouteDef> {
        self.defs.get(id.0)
    }

    pub fn defs(&self) -> &[RouteDef] {
        &self.defs
    }

    pub fn set_routes(&mut self, routes: Vec<Route>) -> Result<(), ValidationError> {
        for route in &routes {
            validate_tree(route)?;
        }
        *self = Self::new();
        self.append(&routes);
        self.config = routes;
        Ok(())
    }

    pub fn add_routes(&mut self, routes: Vec<Route>) -> Result<(), ValidationError> {
        for route in &routes {
            validate_tree(route)?;
        }
        self.append(&routes);
        self.config.extend(routes);
        Ok(())
    }

    pub fn remove_routes(&mut self) {
        *self = Self::new();
    }

    /// Shallow snapshot of the configured top-level list.
    pub fn get_routes(&self) -> Vec<Route> {
        self.config.clone()
    }

    fn append(&mut self, routes: &[Route]) {
        let root = self.root();
        let new_ids: Vec<RouteId> = routes
            .iter()
            .map(|route| flatten_into(&mut self.defs, 0, route, Some(root)))
            .collect();
        if let ChildrenDef::Static(children) = &mut self.defs[root.0].children {
            children.extend(new_ids);
        }
    }
}

/// Per-resolution-attempt storage for routes materialized from children
/// callbacks. Ids continue past the table's length; the cache keyed by the
/// parent id guarantees each callback runs at most once per attempt.
pub(crate) struct SideArena {
    base: usize,
    defs: Vec<RouteDef>,
    materialized: HashMap<RouteId, Vec<RouteId>>,
}

impl SideArena {
    pub fn new(base: usize) -> Self {
        Self {
            base,
            defs: Vec::new(),
            materialized: HashMap::new(),
        }
    }

    pub fn def(&self, id: RouteId) -> Option<&RouteDef> {
        id.0.checked_sub(self.base).and_then(|i| self.defs.get(i))
    }

    pub fn children_of(&self, parent: RouteId) -> Option<&Vec<RouteId>> {
        self.materialized.get(&parent)
    }

    pub fn insert_children(&mut self, parent: RouteId, routes: &[Route]) -> Vec<RouteId> {
        let ids: Vec<RouteId> = routes
            .iter()
            .map(|r| flatten_into(&mut self.defs, self.base, r, Some(parent)))
            .collect();
        self.materialized.insert(parent, ids.clone());
        ids
    }
}
