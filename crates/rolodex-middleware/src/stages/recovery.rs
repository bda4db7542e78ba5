//! Panic recovery middleware.
//!
//! A panic anywhere below this stage is caught, logged at error level with
//! the request ID, method and path, and answered with a plain-text 500. The
//! connection and the process keep running.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::pipeline::Stage;
use crate::types::{Request, Response, ResponseExt};
use futures_util::FutureExt;
use http::StatusCode;
use std::any::Any;
use std::panic::AssertUnwindSafe;

/// Middleware that converts panics into `500 Internal Server Error`.
#[derive(Debug, Clone, Default)]
pub struct RecoveryMiddleware;

impl RecoveryMiddleware {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for RecoveryMiddleware {
    fn name(&self) -> &'static str {
        Stage::Recovery.name()
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let request_id = ctx.request_id();
            let method = request.method().clone();
            let path = request.uri().path().to_string();

            let outcome = AssertUnwindSafe(next.run(ctx, request)).catch_unwind().await;

            match outcome {
                Ok(response) => response,
                Err(payload) => {
                    tracing::error!(
                        request_id = %request_id,
                        http.method = %method,
                        http.path = %path,
                        panic = %panic_message(payload.as_ref()),
                        "panic recovered"
                    );
                    Response::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                }
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Request as HttpRequest, Response as HttpResponse};
    use http_body_util::{BodyExt, Full};

    fn request() -> Request {
        HttpRequest::builder()
            .uri("/boom")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_passes_through_normal_response() {
        let middleware = RecoveryMiddleware::new();
        let mut ctx = MiddlewareContext::new();

        let next = Next::handler(|_ctx, _req| {
            Box::pin(async {
                HttpResponse::builder()
                    .status(StatusCode::CREATED)
                    .body(Full::new(Bytes::new()))
                    .unwrap()
            })
        });
        let response = middleware.process(&mut ctx, request(), next).await;

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_panic_inside_future_becomes_500() {
        let middleware = RecoveryMiddleware::new();
        let mut ctx = MiddlewareContext::new();

        let next = Next::handler(|_ctx, _req| {
            Box::pin(async {
                let contacts: Vec<u32> = Vec::new();
                let _ = contacts[3];
                HttpResponse::new(Full::new(Bytes::new()))
            })
        });
        let response = middleware.process(&mut ctx, request(), next).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "Internal Server Error");
    }

    #[tokio::test]
    async fn test_panic_before_future_becomes_500() {
        let middleware = RecoveryMiddleware::new();
        let mut ctx = MiddlewareContext::new();

        let next = Next::handler(|_ctx, _req| -> BoxFuture<'static, Response> {
            panic!("handler exploded")
        });
        let response = middleware.process(&mut ctx, request(), next).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(payload.as_ref()), "static str");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
