//! Core middleware trait and chain types.
//!
//! A stage receives the mutable context, the request, and a [`Next`] that
//! continues the chain. It may run code before and after `next.run()`, or
//! skip it and answer on its own.
//!
//! # Example
//!
//! ```
//! use rolodex_middleware::{BoxFuture, Middleware, MiddlewareContext, Next, Request, Response};
//!
//! struct NoStore;
//!
//! impl Middleware for NoStore {
//!     fn name(&self) -> &'static str {
//!         "no_store"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             let mut response = next.run(ctx, request).await;
//!             response
//!                 .headers_mut()
//!                 .insert("cache-control", http::HeaderValue::from_static("no-store"));
//!             response
//!         })
//!     }
//! }
//! ```

use crate::context::MiddlewareContext;
use crate::types::{Request, Response};
use std::future::Future;
use std::pin::Pin;

/// A boxed future that returns a response.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Terminal handler invoked after the last stage.
type HandlerFn<'a> =
    Box<dyn FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a>;

/// A single pipeline stage.
///
/// Stages must call `next.run()` at most once.
pub trait Middleware: Send + Sync + 'static {
    /// Stable stage name used in logs and [`Pipeline::stage_names`](crate::Pipeline::stage_names).
    fn name(&self) -> &'static str;

    /// Processes the request, usually by delegating to `next`.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// The rest of the chain after the current stage.
///
/// Consumed by [`run`](Self::run), so it can only be invoked once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(HandlerFn<'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that invokes `middleware` and then `next`.
    pub fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next stage or the handler.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use http_body_util::Full;

    #[derive(Debug, Default)]
    struct Visited(Vec<&'static str>);

    struct Recording {
        name: &'static str,
    }

    impl Middleware for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                let mut visited = ctx.remove_extension::<Visited>().unwrap_or_default();
                visited.0.push(self.name);
                ctx.set_extension(visited);
                next.run(ctx, request).await
            })
        }
    }

    struct ShortCircuit;

    impl Middleware for ShortCircuit {
        fn name(&self) -> &'static str {
            "short_circuit"
        }

        fn process<'a>(
            &'a self,
            _ctx: &'a mut MiddlewareContext,
            _request: Request,
            _next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async {
                HttpResponse::builder()
                    .status(StatusCode::FORBIDDEN)
                    .body(Full::new(Bytes::new()))
                    .unwrap()
            })
        }
    }

    fn request() -> Request {
        HttpRequest::builder()
            .uri("/contacts")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn ok_handler<'a>() -> Next<'a> {
        Next::handler(|_ctx, _req| {
            Box::pin(async {
                HttpResponse::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(Bytes::from("OK")))
                    .unwrap()
            })
        })
    }

    #[tokio::test]
    async fn test_next_handler() {
        let mut ctx = MiddlewareContext::new();
        let response = ok_handler().run(&mut ctx, request()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chain_runs_in_order() {
        let first = Recording { name: "first" };
        let second = Recording { name: "second" };

        let mut ctx = MiddlewareContext::new();
        let chain = Next::new(&first, Next::new(&second, ok_handler()));
        let response = chain.run(&mut ctx, request()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            ctx.get_extension::<Visited>().unwrap().0,
            ["first", "second"]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_skips_handler() {
        let stage = ShortCircuit;
        let mut ctx = MiddlewareContext::new();

        let handler = Next::handler(|_ctx, _req| -> BoxFuture<'static, Response> {
            panic!("handler must not run")
        });
        let response = Next::new(&stage, handler).run(&mut ctx, request()).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
