//! Headless render-target abstraction.
//!
//! The router renders into a lightweight element tree instead of a real DOM.
//! The surrounding application supplies a [`ComponentFactory`] that maps
//! component names to elements, and may attach a [`Lifecycle`] capability to
//! any element it creates.

use crate::router::RouterLocation;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::future::LocalBoxFuture;

/// Outcome of a before-enter / before-leave hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    Continue,
    /// Abort the navigation and keep the previous render.
    Prevent,
    /// Restart resolution at the given path.
    Redirect(String),
}

/// Navigation lifecycle capability of a rendered element. All four hooks are
/// optional: the defaults continue immediately.
pub trait Lifecycle {
    fn on_before_enter<'a>(
        &'a self,
        location: &'a RouterLocation,
    ) -> LocalBoxFuture<'a, HookOutcome> {
        let _ = location;
        Box::pin(futures::future::ready(HookOutcome::Continue))
    }

    fn on_after_enter<'a>(&'a self, location: &'a RouterLocation) -> LocalBoxFuture<'a, ()> {
        let _ = location;
        Box::pin(futures::future::ready(()))
    }

    fn on_before_leave<'a>(
        &'a self,
        location: &'a RouterLocation,
    ) -> LocalBoxFuture<'a, HookOutcome> {
        let _ = location;
        Box::pin(futures::future::ready(HookOutcome::Continue))
    }

    fn on_after_leave<'a>(&'a self, location: &'a RouterLocation) -> LocalBoxFuture<'a, ()> {
        let _ = location;
        Box::pin(futures::future::ready(()))
    }
}

struct ElementInner {
    component: String,
    created_by_router: bool,
    lifecycle: Option<Rc<dyn Lifecycle>>,
    children: Vec<Element>,
    parent: Option<Weak<RefCell<ElementInner>>>,
}

/// A node in the render-target tree. Cheap to clone; clones share identity.
#[derive(Clone)]
pub struct Element {
    inner: Rc<RefCell<ElementInner>>,
}

impl Element {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ElementInner {
                component: component.into(),
                created_by_router: false,
                lifecycle: None,
                children: Vec::new(),
                parent: None,
            })),
        }
    }

    pub fn component(&self) -> String {
        self.inner.borrow().component.clone()
    }

    pub fn set_lifecycle(&self, lifecycle: Rc<dyn Lifecycle>) {
        self.inner.borrow_mut().lifecycle = Some(lifecycle);
    }

    pub fn lifecycle(&self) -> Option<Rc<dyn Lifecycle>> {
        self.inner.borrow().lifecycle.clone()
    }

    /// Identity comparison: two handles referring to the same node.
    pub fn same(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn parent(&self) -> Option<Element> {
        let weak = self.inner.borrow().parent.clone()?;
        weak.upgrade().map(|inner| Element { inner })
    }

    pub fn children(&self) -> Vec<Element> {
        self.inner.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    /// Moves `child` under this element, detaching it from any previous
    /// parent first.
    pub fn append_child(&self, child: &Element) {
        child.detach();
        child.inner.borrow_mut().parent = Some(Rc::downgrade(&self.inner));
        self.inner.borrow_mut().children.push(child.clone());
    }

    /// Removes this element from its parent, if any.
    pub fn detach(&self) {
        let parent = self.parent();
        if let Some(parent) = parent {
            parent
                .inner
                .borrow_mut()
                .children
                .retain(|c| !c.same(self));
        }
        self.inner.borrow_mut().parent = None;
    }

    /// Removes all children.
    pub fn clear(&self) {
        let children = std::mem::replace(&mut self.inner.borrow_mut().children, Vec::new());
        for child in children {
            child.inner.borrow_mut().parent = None;
        }
    }

    pub(crate) fn created_by_router(&self) -> bool {
        self.inner.borrow().created_by_router
    }

    pub(crate) fn mark_created_by_router(&self) {
        self.inner.borrow_mut().created_by_router = true;
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Element")
            .field("component", &inner.component)
            .field("children", &inner.children.len())
            .finish()
    }
}

/// Maps component names to renderable elements. Returning `None` for a name
/// referenced by a route is a configuration error.
pub trait ComponentFactory {
    fn create(&self, component: &str) -> Option<Element>;
}

impl<F> ComponentFactory for F
where
    F: Fn(&str) -> Option<Element>,
{
    fn create(&self, component: &str) -> Option<Element> {
        self(component)
    }
}

/// Drives enter/leave transitions for routes flagged with `animate`. The
/// returned future resolves when the transition is over; disappearing content
/// stays mounted until then.
pub trait Animator {
    fn animate(
        &self,
        leaving: &[Element],
        entering: &[Element],
    ) -> LocalBoxFuture<'static, ()>;
}
