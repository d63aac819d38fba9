//! A client-side route resolution engine: express-style path patterns, a
//! lazily matched route tree, pluggable per-route resolution, and a
//! navigation controller with lifecycle hooks, redirect handling, and
//! incremental mount-point updates.
//!
//! The pieces layer bottom-up:
//!
//! - [`pattern`]: compiles `/user/:id`-style patterns into matchers and
//!   reverse path builders.
//! - [`Resolver`]: walks a route tree against a pathname and resolves the
//!   first match that produces a non-empty result.
//! - [`Router`]: drives renders end to end - redirects, before/after hooks,
//!   DOM diffing against the previously rendered chain, and history sync.
//!
//! Everything is single-threaded and cooperative; suspension points are
//! route actions, lazy children, bundle loads, and lifecycle hooks.
//!
//! ```
//! use trellis_router::{Element, Route, Router};
//!
//! let router = Router::new(Element::new("outlet"), |name: &str| {
//!     Some(Element::new(name))
//! });
//! router
//!     .set_routes(vec![
//!         Route::new("/").component("home-view"),
//!         Route::new("/user/:id").component("user-view"),
//!     ])
//!     .unwrap();
//!
//! let location = futures::executor::block_on(router.render("/user/42")).unwrap();
//! assert_eq!(location.params.get("id"), Some("42"));
//! ```

#![deny(unsafe_code)]

mod bundle;
mod dom;
mod error;
mod events;
mod history;
mod matching;
mod params;
mod resolver;
mod routes;
mod router;

pub mod pattern;

pub use self::bundle::{Bundle, BundleError, BundleLoader};
pub use self::dom::{Animator, ComponentFactory, Element, HookOutcome, Lifecycle};
pub use self::error::RouterError;
pub use self::events::RouterEvent;
pub use self::history::{History, HistoryEntry, HistoryLocation, MemoryHistory};
pub use self::params::Params;
pub use self::pattern::{BuildArgs, ParamValue};
pub use self::resolver::{
    ChainEntry, ResolveRequest, ResolveResult, ResolvedContext, Resolver,
};
pub use self::router::{RouteInfo, Router, RouterLocation, MAX_REDIRECTS};
pub use self::routes::{
    ActionContext, ActionResult, Commands, Route, RouteId, ValidationError,
};
