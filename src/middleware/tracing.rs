use std::time::Duration;

use tracing::info;

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Logs one structured line per dispatched request.
///
/// Place it first in the chain so it also records requests another
/// middleware answered early (preflights, rejections).
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            origin = req.get_header("origin").unwrap_or(""),
            status = res.status,
            latency_us = latency.as_micros() as u64,
            "request completed"
        );
    }
}
