//! Access log middleware.
//!
//! Emits one `info` event per completed request with the request ID, method,
//! path, status and duration. The same data is stored in the context as an
//! [`AccessLogRecord`] so tests and outer stages can inspect it.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::pipeline::Stage;
use crate::types::{Request, Response};
use std::time::Instant;

/// What the access log recorded for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessLogRecord {
    /// The request ID.
    pub request_id: String,
    /// The HTTP method.
    pub method: String,
    /// The request path, without query string.
    pub path: String,
    /// The HTTP status code.
    pub status_code: u16,
    /// Time spent in inner stages and the handler, in milliseconds.
    pub duration_ms: f64,
}

/// Middleware that logs every request after the handler completes.
#[derive(Debug, Clone, Default)]
pub struct AccessLogMiddleware;

impl AccessLogMiddleware {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for AccessLogMiddleware {
    fn name(&self) -> &'static str {
        Stage::AccessLog.name()
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let started = Instant::now();
            let method = request.method().to_string();
            let path = request.uri().path().to_string();

            let response = next.run(ctx, request).await;

            let record = AccessLogRecord {
                request_id: ctx.request_id().to_string(),
                method,
                path,
                status_code: response.status().as_u16(),
                duration_ms: started.elapsed().as_secs_f64() * 1000.0,
            };

            tracing::info!(
                request_id = %record.request_id,
                http.method = %record.method,
                http.path = %record.path,
                http.status_code = record.status_code,
                duration_ms = record.duration_ms,
                "request completed"
            );

            ctx.set_extension(record);
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Method, Request as HttpRequest, Response as HttpResponse, StatusCode};
    use http_body_util::Full;

    #[tokio::test]
    async fn test_records_request() {
        let middleware = AccessLogMiddleware::new();
        let mut ctx = MiddlewareContext::new();
        let request = HttpRequest::builder()
            .method(Method::DELETE)
            .uri("/contacts/3?confirm=1")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let next = Next::handler(|_ctx, _req| {
            Box::pin(async {
                HttpResponse::builder()
                    .status(StatusCode::NOT_FOUND)
                    .body(Full::new(Bytes::new()))
                    .unwrap()
            })
        });
        let response = middleware.process(&mut ctx, request, next).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let record = ctx.get_extension::<AccessLogRecord>().unwrap();
        assert_eq!(record.method, "DELETE");
        assert_eq!(record.path, "/contacts/3");
        assert_eq!(record.status_code, 404);
        assert_eq!(record.request_id, ctx.request_id().to_string());
        assert!(record.duration_ms >= 0.0);
    }

    #[tokio::test]
    async fn test_duration_covers_handler() {
        let middleware = AccessLogMiddleware::new();
        let mut ctx = MiddlewareContext::new();
        let request = HttpRequest::builder()
            .uri("/contacts")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let next = Next::handler(|_ctx, _req| {
            Box::pin(async {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                HttpResponse::new(Full::new(Bytes::new()))
            })
        });
        middleware.process(&mut ctx, request, next).await;

        let record = ctx.get_extension::<AccessLogRecord>().unwrap();
        assert_eq!(record.status_code, 200);
        assert!(record.duration_ms >= 5.0, "{}", record.duration_ms);
    }
}
