//! Response builders shared by handlers and the dispatcher.

use crate::render;
use bytes::Bytes;
use http::header::{HeaderValue, ALLOW, CONTENT_TYPE, LOCATION};
use http::{Method, StatusCode};
use http_body_util::Full;
use maud::Markup;
use rolodex_middleware::{Response, ResponseExt};

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Renders `markup` with the given status.
pub fn html(status: StatusCode, markup: Markup) -> Response {
    let mut response = http::Response::new(Full::new(Bytes::from(markup.into_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
    response
}

/// 200 with `markup`.
pub fn ok(markup: Markup) -> Response {
    html(StatusCode::OK, markup)
}

/// 303 See Other to `location`.
pub fn see_other(location: &'static str) -> Response {
    let mut response = empty(StatusCode::SEE_OTHER);
    response
        .headers_mut()
        .insert(LOCATION, HeaderValue::from_static(location));
    response
}

/// A response with no body.
pub fn empty(status: StatusCode) -> Response {
    let mut response = http::Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// The 404 page.
pub fn not_found() -> Response {
    html(StatusCode::NOT_FOUND, render::not_found_page())
}

/// The generic 500 page.
pub fn internal_error() -> Response {
    html(StatusCode::INTERNAL_SERVER_ERROR, render::error_page())
}

/// 405 listing the methods the path does support.
pub fn method_not_allowed(allowed: &[Method]) -> Response {
    let mut response = Response::error(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_content_type() {
        let response = ok(render::home_page());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], HTML_CONTENT_TYPE);
    }

    #[test]
    fn test_see_other() {
        let response = see_other("/contacts");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/contacts");
    }

    #[test]
    fn test_method_not_allowed_allow_header() {
        let response = method_not_allowed(&[Method::POST, Method::DELETE]);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "POST, DELETE");
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(internal_error().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(empty(StatusCode::OK).status(), StatusCode::OK);
    }
}
