//! Request handlers and the route table.
//!
//! Each handler parses its input, calls the store, and turns the outcome
//! into a page, a partial, or a redirect. Store errors a handler does not
//! resolve itself are mapped to a response in [`Handlers::dispatch`].

mod contacts;
mod home;

use crate::request::HandlerRequest;
use crate::response;
use crate::router::Router;
use http::{Method, StatusCode};
use rolodex_core::{ContactError, ContactStore};
use rolodex_middleware::{Response, ResponseExt};
use std::sync::Arc;
use tracing::{error, warn};

/// Result type returned by individual handlers.
pub type HandlerResult = Result<Response, ContactError>;

/// Application routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `GET /`
    Home,
    /// `GET /contacts`
    ListContacts,
    /// `GET /contacts/search`
    SearchContacts,
    /// `GET /contacts/new`
    NewContact,
    /// `POST /contacts`
    CreateContact,
    /// `GET /contacts/{id}/edit`
    EditContact,
    /// `POST /contacts/{id}`
    UpdateContact,
    /// `DELETE /contacts/{id}`
    DeleteContact,
}

impl Route {
    /// Handler name, used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::ListContacts => "list_contacts",
            Self::SearchContacts => "search_contacts",
            Self::NewContact => "new_contact",
            Self::CreateContact => "create_contact",
            Self::EditContact => "edit_contact",
            Self::UpdateContact => "update_contact",
            Self::DeleteContact => "delete_contact",
        }
    }
}

/// Builds the route table. Literal paths come before `{id}` paths.
#[must_use]
pub fn routes() -> Router<Route> {
    let mut router = Router::new();
    router.add_route(Method::GET, "/", Route::Home);
    router.add_route(Method::GET, "/contacts", Route::ListContacts);
    router.add_route(Method::POST, "/contacts", Route::CreateContact);
    router.add_route(Method::GET, "/contacts/search", Route::SearchContacts);
    router.add_route(Method::GET, "/contacts/new", Route::NewContact);
    router.add_route(Method::GET, "/contacts/{id}/edit", Route::EditContact);
    router.add_route(Method::POST, "/contacts/{id}", Route::UpdateContact);
    router.add_route(Method::DELETE, "/contacts/{id}", Route::DeleteContact);
    router
}

/// Handlers share one store.
#[derive(Clone)]
pub struct Handlers {
    store: Arc<dyn ContactStore>,
}

impl Handlers {
    /// Creates handlers backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// Runs the handler for `route` and maps any unresolved error.
    pub async fn dispatch(&self, route: Route, req: HandlerRequest) -> Response {
        let result = match route {
            Route::Home => Ok(self.home()),
            Route::ListContacts => self.list_contacts(&req).await,
            Route::SearchContacts => self.search_contacts(&req).await,
            Route::NewContact => Ok(self.new_contact()),
            Route::CreateContact => self.create_contact(&req).await,
            Route::EditContact => self.edit_contact(&req).await,
            Route::UpdateContact => self.update_contact(&req).await,
            Route::DeleteContact => self.delete_contact(&req).await,
        };

        match result {
            Ok(response) => response,
            Err(ContactError::NotFound { .. }) => response::not_found(),
            Err(err @ (ContactError::Validation(_) | ContactError::DuplicateEmail { .. })) => {
                warn!(
                    request_id = %req.request_id(),
                    handler = route.name(),
                    error = %err,
                    "unhandled client error"
                );
                Response::error(err.status_code(), "Unprocessable Entity")
            }
            Err(err @ ContactError::Internal { .. }) => {
                error!(
                    request_id = %req.request_id(),
                    handler = route.name(),
                    error = %err,
                    "handler failed"
                );
                response::internal_error()
            }
        }
    }
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handlers").finish_non_exhaustive()
    }
}

fn bad_request() -> Response {
    Response::error(StatusCode::BAD_REQUEST, "Bad Request")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::RouteResult;

    #[test]
    fn test_route_table() {
        let router = routes();
        let cases = [
            (Method::GET, "/", Route::Home),
            (Method::GET, "/contacts", Route::ListContacts),
            (Method::POST, "/contacts", Route::CreateContact),
            (Method::GET, "/contacts/search", Route::SearchContacts),
            (Method::GET, "/contacts/new", Route::NewContact),
            (Method::GET, "/contacts/5/edit", Route::EditContact),
            (Method::POST, "/contacts/5", Route::UpdateContact),
            (Method::DELETE, "/contacts/5", Route::DeleteContact),
        ];

        for (method, path, expected) in cases {
            match router.match_route(&method, path) {
                RouteResult::Matched(m) => assert_eq!(*m.route(), expected, "{method} {path}"),
                other => panic!("{method} {path}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_search_is_not_an_id() {
        let router = routes();
        assert!(matches!(
            router.match_route(&Method::DELETE, "/contacts/search"),
            RouteResult::Matched(m) if *m.route() == Route::DeleteContact
        ));
        assert!(matches!(
            router.match_route(&Method::GET, "/contacts/search"),
            RouteResult::Matched(m) if *m.route() == Route::SearchContacts
        ));
    }

    #[test]
    fn test_wrong_method() {
        let router = routes();
        assert!(matches!(
            router.match_route(&Method::PUT, "/contacts"),
            RouteResult::MethodNotAllowed { .. }
        ));
    }

    #[test]
    fn test_route_names() {
        assert_eq!(Route::Home.name(), "home");
        assert_eq!(Route::DeleteContact.name(), "delete_contact");
    }
}
