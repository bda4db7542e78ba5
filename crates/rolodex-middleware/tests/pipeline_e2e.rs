//! End-to-end tests for the standard pipeline.

use bytes::Bytes;
use http::{Request as HttpRequest, StatusCode};
use http_body_util::{BodyExt, Full};
use rolodex_middleware::stages::REQUEST_ID_HEADER;
use rolodex_middleware::{BoxFuture, MiddlewareContext, Pipeline, Request, Response};
use std::sync::{Arc, Mutex};

fn make_request(method: &str, path: &str) -> Request {
    HttpRequest::builder()
        .method(method)
        .uri(path)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn explode(message: &str) -> Response {
    panic!("{message}")
}

fn html(body: &'static str) -> Response {
    http::Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "text/html; charset=utf-8")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

#[tokio::test]
async fn test_response_carries_request_id_seen_by_handler() {
    let pipeline = Pipeline::standard();
    let seen = Arc::new(Mutex::new(String::new()));

    let captured = Arc::clone(&seen);
    let response = pipeline
        .process(
            MiddlewareContext::new(),
            make_request("GET", "/contacts"),
            move |ctx, _req| {
                *captured.lock().unwrap() = ctx.request_id().to_string();
                Box::pin(async { html("<table></table>") })
            },
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let header = response.headers().get(REQUEST_ID_HEADER).unwrap();
    assert_eq!(header.to_str().unwrap(), seen.lock().unwrap().as_str());
}

#[tokio::test]
async fn test_panicking_handler_yields_500_with_request_id() {
    let pipeline = Pipeline::standard();

    let response = pipeline
        .process(
            MiddlewareContext::new(),
            make_request("POST", "/contacts"),
            |_ctx, _req| Box::pin(async { explode("store invariant violated") }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, "Internal Server Error");
}

#[tokio::test]
async fn test_pipeline_survives_panic_for_next_request() {
    let pipeline = Pipeline::standard();

    let first = pipeline
        .process(
            MiddlewareContext::new(),
            make_request("GET", "/boom"),
            |_ctx, _req| -> BoxFuture<'static, Response> { panic!("boom") },
        )
        .await;
    assert_eq!(first.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let second = pipeline
        .process(
            MiddlewareContext::new(),
            make_request("GET", "/"),
            |_ctx, _req| Box::pin(async { html("ok") }),
        )
        .await;
    assert_eq!(second.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_concurrent_requests_get_distinct_ids() {
    let pipeline = Arc::new(Pipeline::standard());
    let mut handles = Vec::new();

    for _ in 0..20 {
        let pipeline = Arc::clone(&pipeline);
        handles.push(tokio::spawn(async move {
            let response = pipeline
                .process(
                    MiddlewareContext::new(),
                    make_request("GET", "/"),
                    |_ctx, _req| Box::pin(async { html("ok") }),
                )
                .await;
            response
                .headers()
                .get(REQUEST_ID_HEADER)
                .unwrap()
                .to_str()
                .unwrap()
                .to_string()
        }));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        assert!(ids.insert(handle.await.unwrap()));
    }
    assert_eq!(ids.len(), 20);
}
