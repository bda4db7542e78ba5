use super::{bad_request, HandlerResult, Handlers};
use crate::render::{self, ContactFormView, ContactsView};
use crate::request::{ContactForm, HandlerRequest};
use crate::response;
use http::StatusCode;
use rolodex_core::{Contact, ContactError, FieldErrors};
use rolodex_middleware::Response;
use tracing::{debug, info};

const DUPLICATE_EMAIL_MESSAGE: &str = "A contact with this email already exists";

impl Handlers {
    /// `GET /contacts`: full page, or just the rows for htmx requests.
    pub async fn list_contacts(&self, req: &HandlerRequest) -> HandlerResult {
        let query = req.query("q").unwrap_or_default();
        let contacts = self.store.list(query).await?;

        if req.is_htmx() {
            return Ok(response::ok(render::contact_rows(&contacts)));
        }

        let count = self.store.count().await;
        Ok(response::ok(render::contacts_page(ContactsView {
            contacts: &contacts,
            count,
            query,
        })))
    }

    /// `GET /contacts/search`: rows matching `q`.
    pub async fn search_contacts(&self, req: &HandlerRequest) -> HandlerResult {
        let query = req.query("q").unwrap_or_default();
        let contacts = self.store.list(query).await?;
        debug!(query, matches = contacts.len(), "contact search");
        Ok(response::ok(render::contact_rows(&contacts)))
    }

    /// `GET /contacts/new`: empty form.
    pub fn new_contact(&self) -> Response {
        let blank = Contact::new("", "", "", "");
        form_page(StatusCode::OK, &blank, &FieldErrors::new())
    }

    /// `POST /contacts`: validate and create.
    pub async fn create_contact(&self, req: &HandlerRequest) -> HandlerResult {
        let Ok(form) = req.form::<ContactForm>() else {
            return Ok(bad_request());
        };
        let contact = form.into_contact();

        let errors = contact.validate();
        if !errors.is_empty() {
            return Ok(form_page(StatusCode::UNPROCESSABLE_ENTITY, &contact, &errors));
        }

        match self.store.create(contact.clone()).await {
            Ok(created) => {
                info!(id = %created.id, name = %created.full_name(), "contact created");
                Ok(response::see_other("/contacts"))
            }
            Err(err) => rejected(err, &contact),
        }
    }

    /// `GET /contacts/{id}/edit`: form pre-filled with the stored contact.
    pub async fn edit_contact(&self, req: &HandlerRequest) -> HandlerResult {
        let id = req.param("id").unwrap_or_default();
        let contact = self.store.get(id).await?;
        Ok(form_page(StatusCode::OK, &contact, &FieldErrors::new()))
    }

    /// `POST /contacts/{id}`: validate and replace.
    pub async fn update_contact(&self, req: &HandlerRequest) -> HandlerResult {
        let Ok(form) = req.form::<ContactForm>() else {
            return Ok(bad_request());
        };
        let mut contact = form.into_contact();
        contact.id = req.param("id").unwrap_or_default().to_string();

        let errors = contact.validate();
        if !errors.is_empty() {
            return Ok(form_page(StatusCode::UNPROCESSABLE_ENTITY, &contact, &errors));
        }

        match self.store.update(contact.clone()).await {
            Ok(updated) => {
                info!(id = %updated.id, name = %updated.full_name(), "contact updated");
                Ok(response::see_other("/contacts"))
            }
            Err(err) => rejected(err, &contact),
        }
    }

    /// `DELETE /contacts/{id}`: empty 200 for htmx so the row swaps out,
    /// otherwise a redirect back to the list.
    pub async fn delete_contact(&self, req: &HandlerRequest) -> HandlerResult {
        let id = req.param("id").unwrap_or_default();
        self.store.delete(id).await?;
        info!(id, "contact deleted");

        if req.is_htmx() {
            Ok(response::empty(StatusCode::OK))
        } else {
            Ok(response::see_other("/contacts"))
        }
    }
}

/// Re-renders the form for store rejections the user can fix.
fn rejected(err: ContactError, contact: &Contact) -> HandlerResult {
    match err {
        ContactError::DuplicateEmail { .. } => {
            let mut errors = FieldErrors::new();
            errors.insert(FieldErrors::EMAIL, DUPLICATE_EMAIL_MESSAGE);
            Ok(form_page(StatusCode::UNPROCESSABLE_ENTITY, contact, &errors))
        }
        ContactError::Validation(errors) => {
            Ok(form_page(StatusCode::UNPROCESSABLE_ENTITY, contact, &errors))
        }
        ContactError::NotFound { .. } | ContactError::Internal { .. } => Err(err),
    }
}

fn form_page(status: StatusCode, contact: &Contact, errors: &FieldErrors) -> Response {
    response::html(status, render::contact_form(ContactFormView { contact, errors }))
}
