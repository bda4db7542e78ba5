//! Static asset serving.
//!
//! Files under the configured directory are served at `/static/...` with
//! `ETag` and `Last-Modified` validators, so browsers revalidate the
//! stylesheet cheaply with a 304.
//!
//! # Security
//!
//! - Paths containing `..` are rejected
//! - Hidden files (names starting with `.`) are never served
//! - The resolved path must stay inside the root after symlink resolution
//!
//! # Example
//!
//! ```rust
//! use rolodex_server::static_files::StaticFiles;
//!
//! let files = StaticFiles::new("./static").cache_control("public, max-age=3600");
//! assert_eq!(files.root().to_str(), Some("./static"));
//! ```

use bytes::Bytes;
use http::{header, HeaderMap, Method, StatusCode};
use http_body_util::Full;
use rolodex_middleware::Response;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// Errors that can occur when serving static files.
#[derive(Debug, Error)]
pub enum StaticFileError {
    /// The requested file does not exist.
    #[error("File not found: {0}")]
    NotFound(String),

    /// The path is not allowed (traversal, hidden file, escapes the root).
    #[error("Forbidden path: {0}")]
    Forbidden(String),

    /// Only GET and HEAD are served.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StaticFileError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Serves files from one directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    cache_control: Option<String>,
}

impl StaticFiles {
    /// Creates a server for files under `root`.
    #[must_use]
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            cache_control: None,
        }
    }

    /// Sets the `Cache-Control` header sent with every file.
    #[must_use]
    pub fn cache_control<S: Into<String>>(mut self, value: S) -> Self {
        self.cache_control = Some(value.into());
        self
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serves `request_path`, relative to the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the method is not GET or HEAD, the path is
    /// forbidden, the file does not exist, or it cannot be read.
    pub fn handle(
        &self,
        request_path: &str,
        headers: &HeaderMap,
        method: &Method,
    ) -> Result<Response, StaticFileError> {
        if method != Method::GET && method != Method::HEAD {
            return Err(StaticFileError::MethodNotAllowed);
        }

        let path = self.resolve_path(request_path)?;
        if !path.is_file() {
            return Err(StaticFileError::NotFound(request_path.to_string()));
        }

        self.serve_file(&path, headers, method)
    }

    fn resolve_path(&self, request_path: &str) -> Result<PathBuf, StaticFileError> {
        let relative = request_path.trim_start_matches('/');

        for component in Path::new(relative).components() {
            match component {
                Component::ParentDir => {
                    return Err(StaticFileError::Forbidden(
                        "Directory traversal not allowed".to_string(),
                    ));
                }
                Component::Normal(name) => {
                    if name.to_str().is_some_and(|n| n.starts_with('.')) {
                        return Err(StaticFileError::Forbidden(
                            "Hidden files not allowed".to_string(),
                        ));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(StaticFileError::Forbidden(
                        "Absolute paths not allowed".to_string(),
                    ));
                }
                Component::CurDir => {}
            }
        }

        let canonical = self
            .root
            .join(relative)
            .canonicalize()
            .map_err(|_| StaticFileError::NotFound(request_path.to_string()))?;
        let canonical_root = self.root.canonicalize()?;

        if !canonical.starts_with(&canonical_root) {
            return Err(StaticFileError::Forbidden(
                "Path escapes root directory".to_string(),
            ));
        }

        Ok(canonical)
    }

    fn serve_file(
        &self,
        path: &Path,
        headers: &HeaderMap,
        method: &Method,
    ) -> Result<Response, StaticFileError> {
        let metadata = std::fs::metadata(path)?;
        let modified = metadata.modified().ok();
        let etag = modified.and_then(|m| generate_etag(m, metadata.len()));

        // If-Modified-Since only counts when If-None-Match is absent.
        if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH) {
            if let (Some(etag), Ok(value)) = (etag.as_deref(), if_none_match.to_str()) {
                if value.split(',').any(|t| t.trim() == etag || t.trim() == "*") {
                    return Ok(self.not_modified(etag));
                }
            }
        } else if let Some(modified) = modified {
            if not_modified_since(modified, headers) {
                return Ok(self.not_modified(etag.as_deref().unwrap_or_default()));
            }
        }

        let body = if method == Method::HEAD {
            Bytes::new()
        } else {
            Bytes::from(std::fs::read(path)?)
        };

        let mut response = http::Response::new(Full::new(body));
        let response_headers = response.headers_mut();
        insert_header(response_headers, header::CONTENT_TYPE, detect_mime_type(path));
        insert_header(
            response_headers,
            header::CONTENT_LENGTH,
            &metadata.len().to_string(),
        );
        if let Some(ref cache_control) = self.cache_control {
            insert_header(response_headers, header::CACHE_CONTROL, cache_control);
        }
        if let Some(ref etag) = etag {
            insert_header(response_headers, header::ETAG, etag);
        }
        if let Some(modified) = modified {
            insert_header(
                response_headers,
                header::LAST_MODIFIED,
                &httpdate::fmt_http_date(modified),
            );
        }

        Ok(response)
    }

    fn not_modified(&self, etag: &str) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::new()));
        *response.status_mut() = StatusCode::NOT_MODIFIED;
        if !etag.is_empty() {
            insert_header(response.headers_mut(), header::ETAG, etag);
        }
        if let Some(ref cache_control) = self.cache_control {
            insert_header(response.headers_mut(), header::CACHE_CONTROL, cache_control);
        }
        response
    }
}

fn insert_header(headers: &mut HeaderMap, name: header::HeaderName, value: &str) {
    if let Ok(value) = header::HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

/// Validator built from modification time and size.
fn generate_etag(modified: SystemTime, len: u64) -> Option<String> {
    let since_epoch = modified.duration_since(SystemTime::UNIX_EPOCH).ok()?;
    Some(format!(
        "\"{:x}-{:x}-{:x}\"",
        since_epoch.as_secs(),
        since_epoch.subsec_nanos(),
        len
    ))
}

fn not_modified_since(modified: SystemTime, headers: &HeaderMap) -> bool {
    let Some(since) = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| httpdate::parse_http_date(v).ok())
    else {
        return false;
    };

    match (
        modified.duration_since(SystemTime::UNIX_EPOCH),
        since.duration_since(SystemTime::UNIX_EPOCH),
    ) {
        (Ok(modified), Ok(since)) => modified.as_secs() <= since.as_secs(),
        _ => false,
    }
}

fn detect_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, StaticFiles) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/style.css"), "body { margin: 0; }").unwrap();
        fs::write(dir.path().join(".env"), "SECRET=1").unwrap();
        let files = StaticFiles::new(dir.path());
        (dir, files)
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_css() {
        let (_dir, files) = setup();
        let response = files
            .handle("/css/style.css", &HeaderMap::new(), &Method::GET)
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/css; charset=utf-8"
        );
        assert!(response.headers().contains_key(header::ETAG));
        assert!(response.headers().contains_key(header::LAST_MODIFIED));
        assert_eq!(body_string(response).await, "body { margin: 0; }");
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let (_dir, files) = setup();
        let response = files
            .handle("css/style.css", &HeaderMap::new(), &Method::HEAD)
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "19");
        assert_eq!(body_string(response).await, "");
    }

    #[test]
    fn test_etag_revalidation() {
        let (_dir, files) = setup();
        let first = files
            .handle("/css/style.css", &HeaderMap::new(), &Method::GET)
            .unwrap();
        let etag = first.headers()[header::ETAG].clone();

        let mut headers = HeaderMap::new();
        headers.insert(header::IF_NONE_MATCH, etag);
        let second = files.handle("/css/style.css", &headers, &Method::GET).unwrap();
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
    }

    #[test]
    fn test_cache_control() {
        let (_dir, files) = setup();
        let files = files.cache_control("public, max-age=60");
        let response = files
            .handle("/css/style.css", &HeaderMap::new(), &Method::GET)
            .unwrap();
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=60"
        );
    }

    #[test]
    fn test_missing_file() {
        let (_dir, files) = setup();
        let err = files
            .handle("/css/missing.css", &HeaderMap::new(), &Method::GET)
            .unwrap_err();
        assert!(matches!(err, StaticFileError::NotFound(_)));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_directory_is_not_found() {
        let (_dir, files) = setup();
        let err = files.handle("/css", &HeaderMap::new(), &Method::GET).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_traversal_forbidden() {
        let (_dir, files) = setup();
        let err = files
            .handle("/../etc/passwd", &HeaderMap::new(), &Method::GET)
            .unwrap_err();
        assert!(matches!(err, StaticFileError::Forbidden(_)));
    }

    #[test]
    fn test_hidden_forbidden() {
        let (_dir, files) = setup();
        let err = files.handle("/.env", &HeaderMap::new(), &Method::GET).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_post_not_allowed() {
        let (_dir, files) = setup();
        let err = files
            .handle("/css/style.css", &HeaderMap::new(), &Method::POST)
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(detect_mime_type(Path::new("a.JS")), "text/javascript; charset=utf-8");
        assert_eq!(detect_mime_type(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(detect_mime_type(Path::new("blob")), "application/octet-stream");
    }
}
