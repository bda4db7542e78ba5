//! In-memory contact store.

use crate::contact::Contact;
use crate::error::{ContactError, ContactResult};
use crate::seed::sample_contacts;
use crate::store::ContactStore;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Contacts held in process memory behind a single reader-writer lock.
///
/// Reads take the shared lock, writes the exclusive one. The lock is
/// never held across an `.await`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    contacts: HashMap<String, Contact>,
    /// Lowercased email to owning contact ID.
    emails: HashMap<String, String>,
    /// Last assigned ID. IDs are never reused.
    counter: u64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the sample contacts and returns how many were added.
    ///
    /// Contacts whose email is already present are skipped.
    pub fn seed(&self) -> usize {
        let mut added = 0;
        for contact in sample_contacts() {
            match self.insert(contact) {
                Ok(_) => added += 1,
                Err(e) => tracing::debug!(error = %e, "skipping sample contact"),
            }
        }
        tracing::info!(count = added, "seeded sample contacts");
        added
    }

    fn insert(&self, mut contact: Contact) -> ContactResult<Contact> {
        let key = contact.email_key();
        let mut inner = self.inner.write();

        if inner.emails.contains_key(&key) {
            return Err(ContactError::duplicate_email(contact.email));
        }

        inner.counter += 1;
        let now = Utc::now();
        contact.id = inner.counter.to_string();
        contact.created_at = now;
        contact.updated_at = now;

        inner.emails.insert(key, contact.id.clone());
        inner.contacts.insert(contact.id.clone(), contact.clone());
        Ok(contact)
    }

    fn replace(&self, mut contact: Contact) -> ContactResult<Contact> {
        let key = contact.email_key();
        let mut inner = self.inner.write();

        let (created_at, old_key) = match inner.contacts.get(&contact.id) {
            Some(existing) => (existing.created_at, existing.email_key()),
            None => return Err(ContactError::not_found(contact.id)),
        };

        if let Some(owner) = inner.emails.get(&key) {
            if *owner != contact.id {
                return Err(ContactError::duplicate_email(contact.email));
            }
        }

        contact.created_at = created_at;
        contact.updated_at = Utc::now();

        inner.emails.remove(&old_key);
        inner.emails.insert(key, contact.id.clone());
        inner.contacts.insert(contact.id.clone(), contact.clone());
        Ok(contact)
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn list(&self, search: &str) -> ContactResult<Vec<Contact>> {
        let needle = search.trim().to_lowercase();

        let mut contacts: Vec<Contact> = {
            let inner = self.inner.read();
            inner
                .contacts
                .values()
                .filter(|c| needle.is_empty() || c.matches(&needle))
                .cloned()
                .collect()
        };

        // Same name falls back to creation order.
        contacts.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
                .then_with(|| id_order(&a.id).cmp(&id_order(&b.id)))
        });
        Ok(contacts)
    }

    async fn get(&self, id: &str) -> ContactResult<Contact> {
        self.inner
            .read()
            .contacts
            .get(id)
            .cloned()
            .ok_or_else(|| ContactError::not_found(id))
    }

    async fn create(&self, contact: Contact) -> ContactResult<Contact> {
        self.insert(contact)
    }

    async fn update(&self, contact: Contact) -> ContactResult<Contact> {
        self.replace(contact)
    }

    async fn delete(&self, id: &str) -> ContactResult<()> {
        let mut inner = self.inner.write();
        let removed = inner
            .contacts
            .remove(id)
            .ok_or_else(|| ContactError::not_found(id))?;
        inner.emails.remove(&removed.email_key());
        Ok(())
    }

    async fn count(&self) -> usize {
        self.inner.read().contacts.len()
    }
}

/// Numeric IDs compare by value; anything else sorts after them by text.
fn id_order(id: &str) -> (bool, u64, &str) {
    match id.parse::<u64>() {
        Ok(n) => (false, n, id),
        Err(_) => (true, 0, id),
    }
}
