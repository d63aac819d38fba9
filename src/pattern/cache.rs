//! Compilation caches owned by the pattern compiler.

use super::matcher::{compile, CompileOptions, Matcher};
use super::builder::PathBuilder;
use super::{PatternError, PatternSource};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

/// Composite cache key: the pattern source plus the exactness it was
/// compiled with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MatcherKey {
    source: PatternSource,
    exact: bool,
}

/// Maps `(pattern, exactness)` to compiled matchers, and a route's joined
/// ancestor path to its reverse-URL builder. Cleared whenever the route list
/// is replaced.
#[derive(Debug, Default)]
pub struct PatternCache {
    matchers: RefCell<HashMap<MatcherKey, Rc<Vec<Matcher>>>>,
    builders: RefCell<HashMap<String, Rc<PathBuilder>>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// One matcher per alternative of `source`, compiled at most once per
    /// `(source, exact)` pair. The empty pattern compiles strict so that it
    /// matches without consuming anything.
    pub fn matchers_for(
        &self,
        source: &PatternSource,
        exact: bool,
    ) -> Result<Rc<Vec<Matcher>>, PatternError> {
        let key = MatcherKey {
            source: source.clone(),
            exact,
        };
        if let Some(hit) = self.matchers.borrow().get(&key) {
            return Ok(Rc::clone(hit));
        }

        trace!("compiling pattern {:?} (exact: {})", source, exact);
        let mut compiled = Vec::with_capacity(source.alternatives().len());
        for alt in source.alternatives() {
            let opts = CompileOptions {
                end: exact,
                strict: alt.is_empty(),
                sensitive: false,
            };
            compiled.push(compile(alt, &opts)?);
        }
        let compiled = Rc::new(compiled);
        self.matchers
            .borrow_mut()
            .insert(key, Rc::clone(&compiled));
        Ok(compiled)
    }

    /// Reverse-URL builder for a full (ancestor-joined) route path.
    pub fn builder_for(&self, full_path: &str) -> Result<Rc<PathBuilder>, PatternError> {
        if let Some(hit) = self.builders.borrow().get(full_path) {
            return Ok(Rc::clone(hit));
        }
        trace!("compiling path builder for {:?}", full_path);
        let builder = Rc::new(PathBuilder::compile(full_path)?);
        self.builders
            .borrow_mut()
            .insert(full_path.to_string(), Rc::clone(&builder));
        Ok(builder)
    }

    pub fn clear(&self) {
        self.matchers.borrow_mut().clear();
        self.builders.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matcher_compiled_once_per_key() {
        let cache = PatternCache::new();
        let source = PatternSource::from("/user/:id");
        let a = cache.matchers_for(&source, true).unwrap();
        let b = cache.matchers_for(&source, true).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        // different exactness is a different cache entry
        let c = cache.matchers_for(&source, false).unwrap();
        assert!(!Rc::ptr_eq(&a, &c));
    }

    #[test]
    fn clear_drops_entries() {
        let cache = PatternCache::new();
        let source = PatternSource::from("/a");
        let a = cache.matchers_for(&source, true).unwrap();
        cache.clear();
        let b = cache.matchers_for(&source, true).unwrap();
        assert!(!Rc::ptr_eq(&a, &b));
    }
}
