//! The application: middleware pipeline, routing, handlers and static assets.
//!
//! [`App::handle`] is everything that happens to a request after its body
//! has been read. The server calls it once per request; tests call it
//! directly without opening a socket.

use crate::config::ServerConfig;
use crate::handlers::{self, Handlers, Route};
use crate::request::HandlerRequest;
use crate::response;
use crate::router::{RouteResult, Router};
use crate::static_files::{StaticFileError, StaticFiles};
use http::{Method, StatusCode};
use http_body_util::BodyExt;
use rolodex_core::{ContactStore, RequestId};
use rolodex_middleware::{MiddlewareContext, Pipeline, Request, Response, ResponseExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// URL prefix for static assets.
pub const STATIC_PREFIX: &str = "/static/";

const STATIC_CACHE_CONTROL: &str = "public, max-age=3600";

/// Marks a request whose body could not be read.
///
/// The server still runs such requests through the pipeline so the
/// rejection gets a request ID and an access log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BodyRejection(pub(crate) StatusCode);

/// Shared application state.
pub struct App {
    pipeline: Pipeline,
    router: Router<Route>,
    handlers: Handlers,
    static_files: StaticFiles,
    write_timeout: Duration,
}

impl App {
    /// Creates the application over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ContactStore>, config: &ServerConfig) -> Self {
        Self {
            pipeline: Pipeline::standard(),
            router: handlers::routes(),
            handlers: Handlers::new(store),
            static_files: StaticFiles::new(config.static_dir()).cache_control(STATIC_CACHE_CONTROL),
            write_timeout: config.write_timeout(),
        }
    }

    /// Runs one request through the middleware pipeline and the router.
    pub async fn handle(self: &Arc<Self>, request: Request) -> Response {
        let app = Arc::clone(self);
        self.pipeline
            .process(MiddlewareContext::new(), request, move |ctx, request| {
                let request_id = ctx.request_id();
                Box::pin(async move { app.respond(request_id, request).await })
            })
            .await
    }

    async fn respond(&self, request_id: RequestId, request: Request) -> Response {
        if let Some(BodyRejection(status)) = request.extensions().get::<BodyRejection>() {
            let reason = status.canonical_reason().unwrap_or("Bad Request");
            return Response::error(*status, reason);
        }

        let path = request.uri().path().to_string();
        if let Some(asset) = path.strip_prefix(STATIC_PREFIX) {
            return self.serve_static(request_id, asset, &request);
        }

        match self.router.match_route(request.method(), &path) {
            RouteResult::Matched(matched) => {
                let (route, params) = matched.into_parts();
                let (parts, body) = request.into_parts();
                let body = body.collect().await.map(|c| c.to_bytes()).unwrap_or_default();
                let req = HandlerRequest::new(
                    request_id,
                    http::Request::from_parts(parts, body),
                    params,
                );

                match tokio::time::timeout(self.write_timeout, self.handlers.dispatch(route, req))
                    .await
                {
                    Ok(response) => response,
                    Err(_) => {
                        warn!(
                            request_id = %request_id,
                            handler = route.name(),
                            timeout_secs = self.write_timeout.as_secs_f64(),
                            "handler timed out"
                        );
                        Response::error(StatusCode::GATEWAY_TIMEOUT, "Gateway Timeout")
                    }
                }
            }
            RouteResult::MethodNotAllowed { allowed } => response::method_not_allowed(&allowed),
            RouteResult::NotFound => response::not_found(),
        }
    }

    fn serve_static(&self, request_id: RequestId, asset: &str, request: &Request) -> Response {
        match self
            .static_files
            .handle(asset, request.headers(), request.method())
        {
            Ok(response) => response,
            Err(StaticFileError::NotFound(_)) => response::not_found(),
            Err(StaticFileError::MethodNotAllowed) => {
                response::method_not_allowed(&[Method::GET, Method::HEAD])
            }
            Err(err @ StaticFileError::Forbidden(_)) => {
                Response::error(err.status_code(), "Forbidden")
            }
            Err(err @ StaticFileError::Io(_)) => {
                error!(request_id = %request_id, path = asset, error = %err, "static file read failed");
                response::internal_error()
            }
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("pipeline", &self.pipeline)
            .field("routes", &self.router.route_count())
            .field("static_root", &self.static_files.root())
            .field("write_timeout", &self.write_timeout)
            .finish_non_exhaustive()
    }
}
