//! Request data handed to handlers.

use bytes::Bytes;
use http::{HeaderMap, Method};
use rolodex_core::{Contact, RequestId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

/// Header htmx sets on every request it issues.
pub const HX_REQUEST_HEADER: &str = "hx-request";

/// A routed request with its body already collected.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    request_id: RequestId,
    method: Method,
    path: String,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    headers: HeaderMap,
    body: Bytes,
}

impl HandlerRequest {
    /// Builds a handler request from a routed HTTP request.
    ///
    /// Unparseable query strings are treated as empty.
    #[must_use]
    pub fn new(
        request_id: RequestId,
        request: http::Request<Bytes>,
        params: HashMap<String, String>,
    ) -> Self {
        let (parts, body) = request.into_parts();
        let query = parts
            .uri
            .query()
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .map(|pairs| pairs.into_iter().collect())
            .unwrap_or_default();

        Self {
            request_id,
            method: parts.method,
            path: parts.uri.path().to_string(),
            params,
            query,
            headers: parts.headers,
            body,
        }
    }

    /// ID assigned by the request ID middleware.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// A path parameter captured by the router.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// A query string value. When a key repeats, the last value wins.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether htmx issued this request (`HX-Request: true`).
    #[must_use]
    pub fn is_htmx(&self) -> bool {
        self.headers
            .get(HX_REQUEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Decodes an `application/x-www-form-urlencoded` body.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if the body is not valid form data for `T`.
    pub fn form<T: DeserializeOwned>(&self) -> Result<T, serde_urlencoded::de::Error> {
        serde_urlencoded::from_bytes(&self.body)
    }
}

/// Fields posted by the contact form. Missing fields decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    /// `first_name` input.
    pub first_name: String,
    /// `last_name` input.
    pub last_name: String,
    /// `email` input.
    pub email: String,
    /// `phone` input.
    pub phone: String,
}

impl ContactForm {
    /// Converts the submission into an unsaved contact.
    #[must_use]
    pub fn into_contact(self) -> Contact {
        Contact::new(self.first_name, self.last_name, self.email, self.phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, body: &'static str) -> http::Request<Bytes> {
        http::Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap()
    }

    #[test]
    fn test_query_decoding() {
        let req = HandlerRequest::new(
            RequestId::new(),
            request("/contacts?q=ada+love%40", ""),
            HashMap::new(),
        );
        assert_eq!(req.path(), "/contacts");
        assert_eq!(req.query("q"), Some("ada love@"));
        assert_eq!(req.query("page"), None);
    }

    #[test]
    fn test_params() {
        let params = HashMap::from([("id".to_string(), "7".to_string())]);
        let req = HandlerRequest::new(RequestId::new(), request("/contacts/7", ""), params);
        assert_eq!(req.param("id"), Some("7"));
        assert_eq!(req.method(), Method::POST);
    }

    #[test]
    fn test_htmx_detection() {
        let mut raw = request("/contacts", "");
        raw.headers_mut()
            .insert("HX-Request", http::HeaderValue::from_static("true"));
        let req = HandlerRequest::new(RequestId::new(), raw, HashMap::new());
        assert!(req.is_htmx());

        let plain = HandlerRequest::new(RequestId::new(), request("/contacts", ""), HashMap::new());
        assert!(!plain.is_htmx());
    }

    #[test]
    fn test_contact_form_defaults_missing_fields() {
        let req = HandlerRequest::new(
            RequestId::new(),
            request("/contacts", "first_name=Ada&email=ada%40example.com"),
            HashMap::new(),
        );
        let form: ContactForm = req.form().unwrap();
        assert_eq!(form.first_name, "Ada");
        assert_eq!(form.last_name, "");
        assert_eq!(form.email, "ada@example.com");

        let contact = form.into_contact();
        assert!(contact.id.is_empty());
        assert_eq!(contact.first_name, "Ada");
    }
}
