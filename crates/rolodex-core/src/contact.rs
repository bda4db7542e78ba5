//! The contact record and its validation rules.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A single entry in the address book.
///
/// `id` is assigned by the store on create and is empty until then.
/// Timestamps are set by the store as well; values supplied by callers
/// are overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Store-assigned identifier (decimal string).
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address, unique across the store ignoring case.
    pub email: String,
    /// Free-form phone number, may be empty.
    pub phone: String,
    /// Set once when the contact is created.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful update.
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Creates an unsaved contact with an empty ID.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: phone.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `"first last"` with surrounding whitespace removed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Checks required fields and email syntax.
    ///
    /// Returns an empty map when the contact is valid. Keys are
    /// `FirstName`, `LastName` and `Email`.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.first_name.trim().is_empty() {
            errors.insert(FieldErrors::FIRST_NAME, "First name is required");
        }
        if self.last_name.trim().is_empty() {
            errors.insert(FieldErrors::LAST_NAME, "Last name is required");
        }

        if self.email.trim().is_empty() {
            errors.insert(FieldErrors::EMAIL, "Email is required");
        } else if !is_valid_email(&self.email) {
            errors.insert(
                FieldErrors::EMAIL,
                format!("Invalid email address: {}", self.email),
            );
        }

        errors
    }

    /// Lowercased bare address, used as the uniqueness key.
    ///
    /// `" Ann <ann@x.io>"` and `"ANN@x.io "` share the key `ann@x.io`.
    pub(crate) fn email_key(&self) -> String {
        mailbox(&self.email)
            .unwrap_or_else(|| self.email.trim())
            .to_lowercase()
    }

    /// Case-insensitive substring match over name, email and phone.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Field name to message map produced by [`Contact::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Key for first name errors.
    pub const FIRST_NAME: &'static str = "FirstName";
    /// Key for last name errors.
    pub const LAST_NAME: &'static str = "LastName";
    /// Key for email errors.
    pub const EMAIL: &'static str = "Email";

    /// Creates an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`, replacing any previous one.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Returns the message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// True when no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

fn addr_spec() -> &'static Regex {
    static ADDR_SPEC: OnceLock<Regex> = OnceLock::new();
    ADDR_SPEC.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$",
        )
        .unwrap_or_else(|e| panic!("address pattern must compile: {e}"))
    })
}

/// Extracts the address from a bare `local@domain` or a named form
/// `Display Name <local@domain>`. `None` when the brackets are malformed.
fn mailbox(input: &str) -> Option<&str> {
    let input = input.trim();

    match (input.rfind('<'), input.strip_suffix('>')) {
        (Some(open), Some(inner)) => {
            let name = input[..open].trim();
            if name.contains(['<', '>', '@']) {
                return None;
            }
            Some(inner[open + 1..].trim())
        }
        (None, None) => Some(input),
        _ => None,
    }
}

fn is_valid_email(input: &str) -> bool {
    mailbox(input).is_some_and(|address| addr_spec().is_match(address))
}
