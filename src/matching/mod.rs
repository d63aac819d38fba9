//! Lazy depth-first enumeration of route matches.
//!
//! [`MatchCursor`] is a pull-based stack machine over a flattened route
//! tree, yielding candidate matches in declaration order. Dynamic children
//! are never evaluated here: the cursor yields [`Step::NeedChildren`] and
//! stays put until the caller fills the side arena and steps again.

use crate::params::Params;
use crate::pattern::{PathMatch, PatternCache, PatternError, PatternSource};
use crate::routes::{ChildrenDef, RouteDef, RouteId, RouteTable, SideArena};

/// One candidate match yielded by the cursor.
#[derive(Debug, Clone)]
pub(crate) struct RouteMatch {
    pub route: RouteId,
    /// The pathname substring consumed by this route's own pattern.
    pub path: String,
    /// Parameters accumulated from the root down to this route.
    pub params: Params,
    /// Ordered key names contributing to this and ancestor matches.
    pub keys: Vec<String>,
    /// Absolute pathname offset up to which the chain has matched.
    pub matched_end: usize,
}

/// Outcome of one cursor step.
pub(crate) enum Step {
    Match(RouteMatch),
    /// `parent` matched and declares callback children that are not yet in
    /// the side arena. The cursor has not advanced.
    NeedChildren { parent: RouteId, params: Params },
    Done,
}

struct Frame {
    route: RouteId,
    /// Pathname offset where this route's own match started.
    offset: usize,
    /// Characters consumed by this route's own pattern.
    consumed: usize,
    params: Params,
    keys: Vec<String>,
    /// Child ids in declaration order, filled on first descent.
    children: Option<Vec<RouteId>>,
    child_index: usize,
}

pub(crate) struct MatchCursor {
    pathname: String,
    stack: Vec<Frame>,
    started: bool,
}

fn lookup<'a>(table: &'a RouteTable, side: &'a SideArena, id: RouteId) -> Option<&'a RouteDef> {
    table.def(id).or_else(|| side.def(id))
}

impl MatchCursor {
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            stack: Vec::new(),
            started: false,
        }
    }

    /// Pops the top frame when it belongs to `route`, so the next step
    /// resumes at the parent's following child. The already-matched parent
    /// segments persist.
    pub fn skip_after(&mut self, route: RouteId) {
        if self.stack.last().map(|f| f.route) == Some(route) {
            self.stack.pop();
        }
    }

    /// Advances to the next candidate match.
    pub fn next(
        &mut self,
        table: &RouteTable,
        side: &SideArena,
        cache: &PatternCache,
    ) -> Result<Step, PatternError> {
        loop {
            if !self.started {
                self.started = true;
                let root = table.root();
                let (synthetic, hit) = match lookup(table, side, root) {
                    Some(def) => (def.synthetic, self.try_match(def, 0, cache)?),
                    None => return Ok(Step::Done),
                };
                match hit {
                    Some(pm) => {
                        let m = self.push(root, 0, pm, &Params::new(), &[]);
                        if !synthetic {
                            return Ok(Step::Match(m));
                        }
                        continue;
                    }
                    None => return Ok(Step::Done),
                }
            }

            let (route, offset, consumed, child_index, resolved) = match self.stack.last() {
                Some(f) => (
                    f.route,
                    f.offset,
                    f.consumed,
                    f.child_index,
                    f.children.is_some(),
                ),
                None => return Ok(Step::Done),
            };

            if !resolved {
                let list = match lookup(table, side, route).map(|d| &d.children) {
                    Some(ChildrenDef::Static(ids)) => ids.clone(),
                    Some(ChildrenDef::Dynamic(_)) => match side.children_of(route) {
                        Some(ids) => ids.clone(),
                        None => {
                            let params = match self.stack.last() {
                                Some(f) => f.params.clone(),
                                None => Params::new(),
                            };
                            return Ok(Step::NeedChildren {
                                parent: route,
                                params,
                            });
                        }
                    },
                    Some(ChildrenDef::None) | None => {
                        self.stack.pop();
                        continue;
                    }
                };
                if let Some(f) = self.stack.last_mut() {
                    f.children = Some(list);
                }
                continue;
            }

            let child = match self
                .stack
                .last()
                .and_then(|f| f.children.as_ref())
                .and_then(|c| c.get(child_index).copied())
            {
                Some(id) => id,
                None => {
                    self.stack.pop();
                    continue;
                }
            };
            if let Some(f) = self.stack.last_mut() {
                f.child_index += 1;
            }

            // The consumed prefix plus one separating slash, if present.
            let base = offset + consumed;
            let child_offset = base
                + if self.pathname.as_bytes().get(base) == Some(&b'/') {
                    1
                } else {
                    0
                };

            let hit = match lookup(table, side, child) {
                Some(def) => self.try_match(def, child_offset, cache)?,
                None => None,
            };
            if let Some(pm) = hit {
                let (params, keys) = match self.stack.last() {
                    Some(f) => (f.params.clone(), f.keys.clone()),
                    None => (Params::new(), Vec::new()),
                };
                return Ok(Step::Match(self.push(child, child_offset, pm, &params, &keys)));
            }
        }
    }

    /// Tests one route's pattern at `offset`. Routes with children match as
    /// a prefix, leaves must consume the whole remaining suffix. A leading
    /// slash in the pattern only counts for the first segment of the tree.
    fn try_match(
        &self,
        def: &RouteDef,
        offset: usize,
        cache: &PatternCache,
    ) -> Result<Option<PathMatch>, PatternError> {
        let exact = !def.has_children();
        let source: PatternSource = if offset > 0 {
            def.path.without_leading_slash()
        } else {
            def.path.clone()
        };
        let matchers = cache.matchers_for(&source, exact)?;
        let target = &self.pathname[offset..];
        Ok(matchers.iter().find_map(|m| m.test(target)))
    }

    fn push(
        &mut self,
        route: RouteId,
        offset: usize,
        pm: PathMatch,
        parent_params: &Params,
        parent_keys: &[String],
    ) -> RouteMatch {
        let params = parent_params.merged_with(&pm.params);
        let mut keys = parent_keys.to_vec();
        keys.extend(pm.keys);
        let consumed = pm.path.len();
        self.stack.push(Frame {
            route,
            offset,
            consumed,
            params: params.clone(),
            keys: keys.clone(),
            children: None,
            child_index: 0,
        });
        RouteMatch {
            route,
            path: pm.path,
            params,
            keys,
            matched_end: offset + consumed,
        }
    }
}
