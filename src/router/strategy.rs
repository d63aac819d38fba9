//! The navigation controller's resolve-route strategy.
//!
//! Evaluates a route's `action` first, then its `redirect`, then its
//! `bundle` (which loads and falls through), then its `component`.
//! Component names are instantiated through the configured factory right
//! here so that every non-redirect result reaching the render loop is a
//! concrete element.

use crate::bundle::{Bundle, BundleLoader};
use crate::dom::ComponentFactory;
use crate::error::RouterError;
use crate::resolver::{ResolveResult, ResolveRoute};
use crate::routes::{ActionContext, ActionResult, Commands, RouteDef};

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use log::debug;

pub(crate) struct NavStrategy {
    pub render_id: u64,
    pub last_render_id: Rc<Cell<u64>>,
    pub factory: Rc<dyn ComponentFactory>,
    pub bundle_loader: Option<Rc<dyn BundleLoader>>,
    pub loaded_bundles: Rc<RefCell<HashSet<String>>>,
}

impl NavStrategy {
    fn is_stale(&self) -> bool {
        self.last_render_id.get() != self.render_id
    }

    fn instantiate(&self, component: &str) -> Result<ResolveResult, RouterError> {
        match self.factory.create(component) {
            Some(element) => {
                element.mark_created_by_router();
                Ok(ResolveResult::Element(element))
            }
            None => Err(RouterError::InvalidResolutionResult {
                component: component.to_string(),
            }),
        }
    }

    /// Loads each of the bundle's URLs at most once per router instance.
    async fn load_bundle(&self, bundle: &Bundle) -> Result<(), RouterError> {
        let loader = match &self.bundle_loader {
            Some(loader) => Rc::clone(loader),
            None => return Ok(()),
        };
        for url in bundle.urls() {
            if self.loaded_bundles.borrow().contains(url) {
                continue;
            }
            debug!("loading bundle {}", url);
            loader
                .load(url)
                .await
                .map_err(|_| RouterError::BundleLoad {
                    url: url.to_string(),
                })?;
            self.loaded_bundles.borrow_mut().insert(url.to_string());
        }
        Ok(())
    }
}

impl ResolveRoute for NavStrategy {
    fn resolve_route<'a>(
        &'a self,
        context: &'a ActionContext,
        def: &'a RouteDef,
    ) -> LocalBoxFuture<'a, Result<Option<ResolveResult>, RouterError>> {
        Box::pin(async move {
            // a superseded attempt must not run user code
            if self.is_stale() {
                return Ok(None);
            }

            if let Some(action) = &def.action {
                let commands = Commands::default();
                match action(context, &commands).await? {
                    ActionResult::None => {
                        if self.is_stale() {
                            return Ok(None);
                        }
                    }
                    ActionResult::Component(name) => return self.instantiate(&name).map(Some),
                    ActionResult::Element(element) => {
                        return Ok(Some(ResolveResult::Element(element)))
                    }
                    ActionResult::Redirect(pathname) => {
                        return Ok(Some(ResolveResult::Redirect {
                            pathname,
                            from: context.pathname.clone(),
                        }))
                    }
                }
            }

            if let Some(target) = &def.redirect {
                return Ok(Some(ResolveResult::Redirect {
                    pathname: target.clone(),
                    from: context.pathname.clone(),
                }));
            }

            if let Some(bundle) = &def.bundle {
                self.load_bundle(bundle).await?;
                if self.is_stale() {
                    return Ok(None);
                }
            }

            if let Some(component) = &def.component {
                return self.instantiate(component).map(Some);
            }

            Ok(None)
        })
    }
}
