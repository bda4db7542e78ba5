//! Request ID middleware.
//!
//! Every request gets a fresh UUID v7. Incoming `X-Request-ID` headers are
//! ignored so clients cannot choose the ID that appears in server logs.
//! The ID is stored in the [`MiddlewareContext`] for later stages and
//! handlers, and echoed on the response.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::pipeline::Stage;
use crate::types::{Request, Response};
use http::HeaderValue;
use rolodex_core::RequestId;

/// Response header carrying the server-assigned request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that assigns request IDs.
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware;

impl RequestIdMiddleware {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        Stage::RequestId.name()
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let request_id = RequestId::new();
            ctx.set_request_id(request_id);

            let mut response = next.run(ctx, request).await;

            // A hyphenated UUID is always a valid header value.
            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }

            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use http_body_util::Full;
    use std::sync::{Arc, Mutex};

    fn list_request() -> Request {
        HttpRequest::builder()
            .uri("/contacts")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn ok() -> Response {
        HttpResponse::builder()
            .status(StatusCode::OK)
            .body(Full::new(Bytes::from("OK")))
            .unwrap()
    }

    #[tokio::test]
    async fn test_sets_response_header_matching_context() {
        let middleware = RequestIdMiddleware::new();
        let mut ctx = MiddlewareContext::new();

        let next = Next::handler(|_ctx, _req| Box::pin(async { ok() }));
        let response = middleware.process(&mut ctx, list_request(), next).await;

        let header_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(ctx.request_id().to_string(), header_id);
    }

    #[tokio::test]
    async fn test_handler_sees_assigned_id() {
        let middleware = RequestIdMiddleware::new();
        let mut ctx = MiddlewareContext::new();
        let seen = Arc::new(Mutex::new(None));

        let captured = Arc::clone(&seen);
        let next = Next::handler(move |ctx, _req| {
            *captured.lock().unwrap() = Some(ctx.request_id());
            Box::pin(async { ok() })
        });
        middleware.process(&mut ctx, list_request(), next).await;

        assert_eq!(*seen.lock().unwrap(), Some(ctx.request_id()));
    }

    #[tokio::test]
    async fn test_ignores_incoming_id() {
        let middleware = RequestIdMiddleware::new();
        let mut ctx = MiddlewareContext::new();
        let incoming_id = "12345678-1234-7234-1234-123456789abc";
        let request = HttpRequest::builder()
            .uri("/contacts")
            .header(REQUEST_ID_HEADER, incoming_id)
            .body(Full::new(Bytes::new()))
            .unwrap();

        let next = Next::handler(|_ctx, _req| Box::pin(async { ok() }));
        let response = middleware.process(&mut ctx, request, next).await;

        let header_id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert_ne!(header_id, incoming_id);
    }

    #[tokio::test]
    async fn test_ids_differ_between_requests() {
        let middleware = RequestIdMiddleware::new();
        let mut ids = Vec::new();

        for _ in 0..2 {
            let mut ctx = MiddlewareContext::new();
            let next = Next::handler(|_ctx, _req| Box::pin(async { ok() }));
            let response = middleware.process(&mut ctx, list_request(), next).await;
            ids.push(response.headers().get(REQUEST_ID_HEADER).unwrap().clone());
        }

        assert_ne!(ids[0], ids[1]);
    }
}
