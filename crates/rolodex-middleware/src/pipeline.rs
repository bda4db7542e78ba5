//! Fixed-order middleware pipeline.
//!
//! [`Pipeline::standard`] builds the chain every Rolodex request goes through:
//!
//! 1. **Request ID** - assign a UUID v7, echo it in `X-Request-ID`
//! 2. **Recovery** - convert panics below this point into a 500
//! 3. **Access Log** - one structured line per completed request
//!
//! The chain is built from back to front per request, so the first stage
//! added is the outermost.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::stages::{AccessLogMiddleware, RecoveryMiddleware, RequestIdMiddleware};
use crate::types::{Request, Response};
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An ordered, immutable list of middleware stages.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use http_body_util::Full;
/// use rolodex_middleware::{MiddlewareContext, Pipeline, Response};
///
/// # tokio_test::block_on(async {
/// let pipeline = Pipeline::standard();
/// let request = http::Request::builder()
///     .uri("/")
///     .body(Full::new(Bytes::new()))
///     .unwrap();
///
/// let response = pipeline
///     .process(MiddlewareContext::new(), request, |_ctx, _req| {
///         Box::pin(async { Response::new(Full::new(Bytes::from("hello"))) })
///     })
///     .await;
///
/// assert!(response.headers().contains_key("x-request-id"));
/// # });
/// ```
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder with no stages.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The request ID, recovery and access log stages, in that order.
    #[must_use]
    pub fn standard() -> Self {
        Self::builder()
            .stage(RequestIdMiddleware::new())
            .stage(RecoveryMiddleware::new())
            .stage(AccessLogMiddleware::new())
            .build()
    }

    /// Runs a request through every stage and then `handler`.
    pub async fn process<H>(
        &self,
        mut ctx: MiddlewareContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(&mut ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the names of all middleware stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of middleware stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage. Earlier stages wrap later ones.
    #[must_use]
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

/// The stages of the standard pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Stage 1: request ID assignment
    RequestId = 1,
    /// Stage 2: panic recovery
    Recovery = 2,
    /// Stage 3: access logging
    AccessLog = 3,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RequestId => "request_id",
            Self::Recovery => "recovery",
            Self::AccessLog => "access_log",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 3] {
        [Self::RequestId, Self::Recovery, Self::AccessLog]
    }
}
