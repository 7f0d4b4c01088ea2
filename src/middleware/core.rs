use std::time::Duration;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// A hook pair wrapped around the inner handler by the [`Dispatcher`](crate::dispatcher::Dispatcher).
///
/// `before` may answer the request itself by returning a response; the
/// handler is then skipped. `after` runs on every final response.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}
