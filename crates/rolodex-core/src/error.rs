//! Error types for contact operations.
//!
//! [`ContactError`] is the closed set of failures a [`ContactStore`](crate::ContactStore)
//! can report. The HTTP layer matches on it exhaustively to pick a status code and page.

use crate::contact::FieldErrors;
use http::StatusCode;
use thiserror::Error;

/// Result type alias using [`ContactError`].
pub type ContactResult<T> = Result<T, ContactError>;

/// Failures produced by the contact store and validator.
#[derive(Error, Debug)]
pub enum ContactError {
    /// No contact has the requested ID.
    #[error("contact not found: {id}")]
    NotFound {
        /// The ID that was looked up.
        id: String,
    },

    /// Another contact already uses this email, ignoring case.
    #[error("a contact with email {email} already exists")]
    DuplicateEmail {
        /// The conflicting email as submitted.
        email: String,
    },

    /// One or more fields failed validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The backing store failed for a reason the caller cannot fix.
    #[error("internal store error: {message}")]
    Internal {
        /// Description of the failure, for logs only.
        message: String,
    },
}

impl ContactError {
    /// Creates a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a duplicate email error.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::DuplicateEmail { .. } | Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FieldErrors> for ContactError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}
