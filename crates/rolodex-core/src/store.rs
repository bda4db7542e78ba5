//! The storage seam between handlers and persistence.

use crate::contact::Contact;
use crate::error::ContactResult;
use async_trait::async_trait;

/// Storage for contacts.
///
/// Handlers hold an `Arc<dyn ContactStore>` so tests and alternative
/// backends can be injected. Implementations must be safe to call from
/// many tasks at once and must keep emails unique ignoring case.
#[async_trait]
pub trait ContactStore: Send + Sync + 'static {
    /// Returns contacts sorted by last name, then first name.
    ///
    /// A non-blank `search` keeps only contacts whose first name, last
    /// name, email or phone contains it, ignoring case.
    async fn list(&self, search: &str) -> ContactResult<Vec<Contact>>;

    /// Looks up a single contact.
    async fn get(&self, id: &str) -> ContactResult<Contact>;

    /// Stores a new contact, assigning its ID and timestamps.
    async fn create(&self, contact: Contact) -> ContactResult<Contact>;

    /// Replaces the editable fields of an existing contact.
    ///
    /// `created_at` is preserved and `updated_at` refreshed.
    async fn update(&self, contact: Contact) -> ContactResult<Contact>;

    /// Removes a contact.
    async fn delete(&self, id: &str) -> ContactResult<()>;

    /// Number of stored contacts.
    async fn count(&self) -> usize;
}
