//! Advisory detection of repeat RSVPs from the same contact.
//!
//! This only looks at the local store of one browser; it catches accidental
//! resubmissions and is trivially bypassed.

use crate::index::{ContactKey, SubmissionIndex};
use crate::record::SubmissionRecord;
use crate::storage::KeyValueStorage;
use crate::store::SubmissionStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateMatch {
    /// The key that matched.
    pub key: ContactKey,
    pub record: SubmissionRecord,
}

/// Looks `email` up first, then `phone`.
pub fn find_in_index(index: &SubmissionIndex, email: &str, phone: &str) -> Option<DuplicateMatch> {
    ContactKey::email(email)
        .into_iter()
        .chain(ContactKey::phone(phone))
        .find_map(|key| {
            let record = index.get(&key)?.clone();
            Some(DuplicateMatch { key, record })
        })
}

pub struct DuplicateDetector<'a, S> {
    store: &'a SubmissionStore<S>,
}

impl<'a, S: KeyValueStorage> DuplicateDetector<'a, S> {
    pub fn new(store: &'a SubmissionStore<S>) -> Self {
        Self { store }
    }

    pub fn find(&self, email: &str, phone: &str) -> Option<DuplicateMatch> {
        find_in_index(&self.store.index(), email, phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{InvitationPreference, YesNo};
    use crate::storage::MemoryStorage;

    fn record(name: &str, email: &str, phone: &str) -> SubmissionRecord {
        SubmissionRecord {
            submitted_at: 0,
            attending: YesNo::Yes,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            invitation_preference: InvitationPreference::Both,
            bringing_plus_one: None,
            plus_one_name: String::new(),
            additional_guests: None,
            additional_guests_count: None,
        }
    }

    #[test]
    fn email_is_checked_before_phone() {
        let store = SubmissionStore::new(MemoryStorage::new());
        store.append(record("By phone", "other@example.com", "555 123 4567"));
        store.append(record("By email", "alex@example.com", ""));

        let found = DuplicateDetector::new(&store)
            .find("Alex@Example.com", "(555) 123-4567")
            .unwrap();
        assert_eq!(found.record.name, "By email");
        assert_eq!(found.key, ContactKey::Email("alex@example.com".to_string()));
    }

    #[test]
    fn falls_back_to_phone() {
        let store = SubmissionStore::new(MemoryStorage::new());
        store.append(record("By phone", "", "555.123.4567"));

        let found = DuplicateDetector::new(&store)
            .find("new@example.com", "5551234567")
            .unwrap();
        assert_eq!(found.record.name, "By phone");
    }

    #[test]
    fn blank_contacts_never_match() {
        let store = SubmissionStore::new(MemoryStorage::new());
        store.append(record("Nobody", "", ""));
        assert_eq!(DuplicateDetector::new(&store).find("  ", "--"), None);
    }
}
