use super::Handlers;
use crate::{render, response};
use rolodex_middleware::Response;

impl Handlers {
    /// `GET /`: landing page.
    pub fn home(&self) -> Response {
        response::ok(render::home_page())
    }
}
