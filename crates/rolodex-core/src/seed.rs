//! Sample data for demos and local development.

use crate::contact::Contact;

/// The five contacts loaded at startup when seeding is enabled.
pub fn sample_contacts() -> Vec<Contact> {
    [
        ("Alice", "Johnson", "alice@example.com", "555-0101"),
        ("Bob", "Smith", "bob@example.com", "555-0102"),
        ("Carol", "Williams", "carol@example.com", "555-0103"),
        ("David", "Brown", "david@example.com", "555-0104"),
        ("Eve", "Davis", "eve@example.com", "555-0105"),
    ]
    .into_iter()
    .map(|(first, last, email, phone)| Contact::new(first, last, email, phone))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_contacts_are_valid() {
        let contacts = sample_contacts();
        assert_eq!(contacts.len(), 5);
        for contact in &contacts {
            assert!(contact.validate().is_empty(), "{}", contact.full_name());
            assert!(contact.id.is_empty());
        }
    }
}
