//! HTML views.
//!
//! Pages are full documents wrapped in [`layout`]; partials such as
//! [`contact_rows`] are fragments htmx swaps into an existing page. All
//! interpolated values are escaped by `maud`.

use maud::{html, Markup, DOCTYPE};
use rolodex_core::{Contact, FieldErrors};

/// htmx build loaded by every page.
pub const HTMX_SRC: &str = "https://unpkg.com/htmx.org@1.9.12";

/// Stylesheet served from the static directory.
pub const STYLESHEET_HREF: &str = "/static/css/style.css";

/// Data for the contacts list page.
#[derive(Debug, Clone, Copy)]
pub struct ContactsView<'a> {
    /// Contacts matching the current search.
    pub contacts: &'a [Contact],
    /// Total number of stored contacts, ignoring the search.
    pub count: usize,
    /// Current search text.
    pub query: &'a str,
}

/// Data for the create/edit form.
///
/// A contact with an empty `id` renders as "New Contact".
#[derive(Debug, Clone, Copy)]
pub struct ContactFormView<'a> {
    /// Values to pre-fill.
    pub contact: &'a Contact,
    /// Per-field messages shown under the inputs.
    pub errors: &'a FieldErrors,
}

impl ContactFormView<'_> {
    fn is_edit(&self) -> bool {
        !self.contact.id.is_empty()
    }

    fn title(&self) -> &'static str {
        if self.is_edit() {
            "Edit Contact"
        } else {
            "New Contact"
        }
    }

    fn action(&self) -> String {
        if self.is_edit() {
            format!("/contacts/{}", self.contact.id)
        } else {
            "/contacts".to_string()
        }
    }
}

/// Wraps `body` in the site chrome.
pub fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " - rolodex" }
                link rel="stylesheet" href=(STYLESHEET_HREF);
                script src=(HTMX_SRC) {}
            }
            body {
                nav class="navbar" {
                    a class="brand" href="/" { "rolodex" }
                    a href="/contacts" { "Contacts" }
                }
                main class="container" {
                    (body)
                }
            }
        }
    }
}

/// Landing page.
pub fn home_page() -> Markup {
    layout(
        "Home",
        html! {
            section class="hero" {
                h1 { "rolodex" }
                p { "A small contact manager. Search as you type, edit in place, delete without a reload." }
                a class="btn btn-primary" href="/contacts" { "View contacts" }
            }
        },
    )
}

/// Full contacts page with search box and table.
pub fn contacts_page(view: ContactsView<'_>) -> Markup {
    layout(
        "Contacts",
        html! {
            div class="page-header" {
                h1 { "Contacts" }
                a class="btn btn-primary" href="/contacts/new" { "New Contact" }
            }
            input
                type="search"
                name="q"
                class="search"
                placeholder="Search contacts..."
                value=(view.query)
                hx-get="/contacts/search"
                hx-trigger="input changed delay:300ms, search"
                hx-target="#contact-rows";
            p class="count" { (count_label(view.count)) }
            table class="contacts" {
                thead {
                    tr {
                        th { "Name" }
                        th { "Email" }
                        th { "Phone" }
                        th { "Actions" }
                    }
                }
                tbody id="contact-rows" {
                    (contact_rows(view.contacts))
                }
            }
        },
    )
}

/// Table rows for `contacts`, without surrounding markup.
pub fn contact_rows(contacts: &[Contact]) -> Markup {
    html! {
        @for contact in contacts {
            tr id=(format!("contact-{}", contact.id)) {
                td { (contact.full_name()) }
                td { (contact.email) }
                td { (contact.phone) }
                td class="actions" {
                    a class="btn" href=(format!("/contacts/{}/edit", contact.id)) { "Edit" }
                    button
                        class="btn btn-danger"
                        hx-delete=(format!("/contacts/{}", contact.id))
                        hx-target=(format!("#contact-{}", contact.id))
                        hx-swap="outerHTML"
                        hx-confirm=(format!("Delete {}?", contact.full_name())) {
                        "Delete"
                    }
                }
            }
        }
        @if contacts.is_empty() {
            tr class="empty" {
                td colspan="4" { "No contacts found." }
            }
        }
    }
}

/// Create or edit form.
pub fn contact_form(view: ContactFormView<'_>) -> Markup {
    let contact = view.contact;
    let errors = view.errors;

    layout(
        view.title(),
        html! {
            h1 { (view.title()) }
            form method="post" action=(view.action()) class="contact-form" {
                (field("first_name", "First name", "text", &contact.first_name, errors.get(FieldErrors::FIRST_NAME)))
                (field("last_name", "Last name", "text", &contact.last_name, errors.get(FieldErrors::LAST_NAME)))
                (field("email", "Email", "email", &contact.email, errors.get(FieldErrors::EMAIL)))
                (field("phone", "Phone", "tel", &contact.phone, None))
                div class="form-actions" {
                    button type="submit" class="btn btn-primary" { "Save" }
                    a class="btn" href="/contacts" { "Cancel" }
                }
            }
        },
    )
}

fn field(name: &str, label: &str, kind: &str, value: &str, error: Option<&str>) -> Markup {
    html! {
        div class=(if error.is_some() { "field has-error" } else { "field" }) {
            label for=(name) { (label) }
            input type=(kind) id=(name) name=(name) value=(value);
            @if let Some(message) = error {
                p class="error" { (message) }
            }
        }
    }
}

/// 404 page.
pub fn not_found_page() -> Markup {
    layout(
        "Not Found",
        html! {
            h1 { "Not Found" }
            p { "The page you were looking for does not exist." }
            a href="/contacts" { "Back to contacts" }
        },
    )
}

/// Generic 500 page. Never includes error details.
pub fn error_page() -> Markup {
    layout(
        "Error",
        html! {
            h1 { "Something went wrong" }
            p { "An unexpected error occurred. Please try again." }
            a href="/contacts" { "Back to contacts" }
        },
    )
}

fn count_label(count: usize) -> String {
    match count {
        1 => "1 contact".to_string(),
        n => format!("{n} contacts"),
    }
}
