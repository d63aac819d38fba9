//! Notifications emitted after completed renders and unrecovered failures.

use crate::router::RouterLocation;

/// External observers (breadcrumbs, analytics) subscribe to these through
/// [`Router::subscribe`](crate::Router::subscribe).
#[derive(Debug, Clone)]
pub enum RouterEvent {
    LocationChanged(RouterLocation),
    Error { message: String, pathname: String },
}

pub(crate) type EventHandler = Box<dyn Fn(&RouterEvent)>;
