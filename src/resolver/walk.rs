use super::context::{ChainEntry, ResolveRequest, ResolveResult, ResolvedContext};
use super::{ResolveRoute, Resolver};
use crate::dom::Element;
use crate::error::RouterError;
use crate::matching::{MatchCursor, RouteMatch, Step};
use crate::params::Params;
use crate::routes::{validate_tree, ActionContext, ChildrenDef, RouteDef, RouteId, SideArena};

/// One resolution attempt over the resolver's route table: pulls candidate
/// matches from the cursor, materializes callback children into a private
/// side arena, and hands each match to the strategy until one produces a
/// non-empty result.
///
/// The walk stays usable after a result so the navigation controller can
/// keep extending the chain with deeper matches.
pub(crate) struct Walk<'r, S: ?Sized> {
    resolver: &'r Resolver,
    strategy: &'r S,
    pathname: String,
    search: String,
    hash: String,
    redirect_from: Option<String>,
    cursor: MatchCursor,
    side: SideArena,
    chain: Vec<ChainEntry>,
    params: Params,
    matched_end: usize,
    last_route: Option<RouteId>,
}

impl<'r, S: ResolveRoute + ?Sized> Walk<'r, S> {
    pub fn new(resolver: &'r Resolver, strategy: &'r S, request: ResolveRequest) -> Self {
        let side = SideArena::new(resolver.table().borrow().len());
        let cursor = MatchCursor::new(request.pathname.clone());
        Self {
            resolver,
            strategy,
            pathname: request.pathname,
            search: request.search,
            hash: request.hash,
            redirect_from: request.redirect_from,
            cursor,
            side,
            chain: Vec::new(),
            params: Params::new(),
            matched_end: 0,
            last_route: None,
        }
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// Whether the matched chain accounts for the whole pathname.
    pub fn is_found(&self) -> bool {
        self.matched_end == self.pathname.len()
    }

    /// Pattern source of the deepest matched route, for diagnostics.
    pub fn stopped_at(&self) -> Option<String> {
        let route = self.last_route?;
        self.def(route).map(|d| d.path.to_string())
    }

    fn def(&self, id: RouteId) -> Option<RouteDef> {
        self.resolver
            .table()
            .borrow()
            .def(id)
            .cloned()
            .or_else(|| self.side.def(id).cloned())
    }

    fn update_chain(&mut self, m: &RouteMatch, def: &RouteDef) {
        let parent = def.parent;
        while let Some(top) = self.chain.last() {
            if Some(top.route) == parent {
                break;
            }
            self.chain.pop();
        }
        self.chain.push(ChainEntry {
            route: m.route,
            path: m.path.clone(),
            element: None,
            pattern: def.path.primary().to_string(),
            name: def.name.clone(),
            component: def.component.clone(),
            animate: def.animate,
        });
        self.params = m.params.clone();
        self.matched_end = m.matched_end;
        self.last_route = Some(m.route);
    }

    /// Attaches the rendered element to the deepest chain entry.
    pub fn set_last_element(&mut self, element: Element) {
        if let Some(entry) = self.chain.last_mut() {
            entry.element = Some(element);
        }
    }

    fn action_context(&self, params: Params, route_path: String) -> ActionContext {
        ActionContext {
            pathname: self.pathname.clone(),
            search: self.search.clone(),
            hash: self.hash.clone(),
            params,
            route_path,
            redirect_from: self.redirect_from.clone(),
        }
    }

    /// Advances until the strategy yields a non-empty result or the matcher
    /// is exhausted.
    pub async fn next(&mut self) -> Result<Option<ResolveResult>, RouterError> {
        loop {
            let step = {
                let table = self.resolver.table().borrow();
                self.cursor.next(&table, &self.side, self.resolver.cache())?
            };
            match step {
                Step::Done => return Ok(None),
                Step::NeedChildren { parent, params } => {
                    self.materialize_children(parent, params).await?;
                }
                Step::Match(m) => {
                    let def = match self.def(m.route) {
                        Some(def) => def,
                        None => continue,
                    };
                    self.update_chain(&m, &def);
                    let context = self.action_context(m.params.clone(), m.path.clone());
                    match self.strategy.resolve_route(&context, &def).await? {
                        Some(result) => return Ok(Some(result)),
                        None => {
                            // a leaf has no subtree worth descending into
                            if !def.has_children() {
                                self.cursor.skip_after(m.route);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Runs a route's children callback exactly once per attempt and parks
    /// the produced routes in the side arena.
    async fn materialize_children(
        &mut self,
        parent: RouteId,
        params: Params,
    ) -> Result<(), RouterError> {
        let children_fn = match self.def(parent).map(|d| d.children) {
            Some(ChildrenDef::Dynamic(f)) => f,
            _ => return Ok(()),
        };
        let route_path = self
            .chain
            .last()
            .map(|entry| entry.path.clone())
            .unwrap_or_default();
        let context = self.action_context(params, route_path);
        let routes = children_fn(&context).await?;
        for route in &routes {
            validate_tree(route)?;
        }
        self.side.insert_children(parent, &routes);
        Ok(())
    }

    /// Snapshots the walk into a settled context carrying `result`.
    pub fn finish(&self, result: ResolveResult) -> ResolvedContext {
        ResolvedContext {
            pathname: self.pathname.clone(),
            search: self.search.clone(),
            hash: self.hash.clone(),
            params: self.params.clone(),
            chain: self.chain.clone(),
            result,
            redirect_from: self.redirect_from.clone(),
            matched_end: self.matched_end,
        }
    }
}
