//! Contact-keyed lookup over stored submissions.
//!
//! The index is derived data: it can always be rebuilt from the record list,
//! and a rebuild is the only way it changes.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json_any_key::*;

use crate::record::SubmissionRecord;

/// Normalized contact information identifying a guest.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKey {
    /// Trimmed, lowercased email address.
    Email(String),
    /// Digits of the phone number, punctuation stripped.
    Phone(String),
}

impl ContactKey {
    pub fn email(raw: &str) -> Option<Self> {
        let email = raw.trim().to_lowercase();
        (!email.is_empty()).then_some(Self::Email(email))
    }

    pub fn phone(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        (!digits.is_empty()).then_some(Self::Phone(digits))
    }

    /// Keys of a record, email first.
    pub fn of_record(record: &SubmissionRecord) -> Vec<Self> {
        Self::email(&record.email)
            .into_iter()
            .chain(Self::phone(&record.phone))
            .collect()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Email(email) => email,
            Self::Phone(digits) => digits,
        }
    }
}

impl std::fmt::Display for ContactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Email(email) => write!(f, "email:{email}"),
            Self::Phone(digits) => write!(f, "phone:{digits}"),
        }
    }
}

/// Latest submission per contact key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmissionIndex {
    by_contact: HashMap<ContactKey, SubmissionRecord>,
}

impl SubmissionIndex {
    /// Later records win over earlier ones sharing a key.
    pub fn from_records(records: &[SubmissionRecord]) -> Self {
        let mut by_contact = HashMap::new();
        for record in records {
            for key in ContactKey::of_record(record) {
                by_contact.insert(key, record.clone());
            }
        }
        Self { by_contact }
    }

    pub fn get(&self, key: &ContactKey) -> Option<&SubmissionRecord> {
        self.by_contact.get(key)
    }

    pub fn len(&self) -> usize {
        self.by_contact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_contact.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContactKey, &SubmissionRecord)> {
        self.by_contact.iter()
    }

    /// Email-only view, keyed by the normalized address.
    pub fn email_index(&self) -> BTreeMap<String, SubmissionRecord> {
        self.view(|key| matches!(key, ContactKey::Email(_)))
    }

    /// Phone-only view, keyed by the phone digits.
    pub fn phone_index(&self) -> BTreeMap<String, SubmissionRecord> {
        self.view(|key| matches!(key, ContactKey::Phone(_)))
    }

    fn view(&self, include: impl Fn(&ContactKey) -> bool) -> BTreeMap<String, SubmissionRecord> {
        self.by_contact
            .iter()
            .filter(|(key, _)| include(*key))
            .map(|(key, record)| (key.as_str().to_string(), record.clone()))
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.by_contact.iter().to_json_map()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let by_contact = json_to_map::<ContactKey, SubmissionRecord>(json)?;
        Ok(Self { by_contact })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{InvitationPreference, YesNo};

    fn record(submitted_at: u64, email: &str, phone: &str) -> SubmissionRecord {
        SubmissionRecord {
            submitted_at,
            attending: YesNo::Yes,
            name: format!("Guest {submitted_at}"),
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
    fn keys_are_normalized() {
        assert_eq!(
            ContactKey::email("  Alex@Example.COM "),
            Some(ContactKey::Email("alex@example.com".to_string()))
        );
        assert_eq!(
            ContactKey::phone("(555) 123-4567"),
            Some(ContactKey::Phone("5551234567".to_string()))
        );
        assert_eq!(ContactKey::email("   "), None);
        assert_eq!(ContactKey::phone("n/a"), None);
    }

    #[test]
    fn later_records_win() {
        let first = record(1, "alex@example.com", "555 123 4567");
        let second = record(2, "ALEX@example.com", "");
        let index = SubmissionIndex::from_records(&[first.clone(), second.clone()]);

        let email = ContactKey::email("alex@example.com").unwrap();
        let phone = ContactKey::phone("5551234567").unwrap();
        assert_eq!(index.get(&email), Some(&second));
        assert_eq!(index.get(&phone), Some(&first));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn views_split_by_kind() {
        let index = SubmissionIndex::from_records(&[record(1, "a@b.co", "+1 (555) 000-1111")]);
        let emails = index.email_index();
        let phones = index.phone_index();
        assert_eq!(emails.keys().collect::<Vec<_>>(), vec!["a@b.co"]);
        assert_eq!(phones.keys().collect::<Vec<_>>(), vec!["15550001111"]);
    }

    #[test]
    fn json_round_trip() {
        let index = SubmissionIndex::from_records(&[
            record(1, "a@b.co", "5550001111"),
            record(2, "c@d.co", ""),
        ]);
        let json = index.to_json().unwrap();
        assert_eq!(SubmissionIndex::from_json(&json).unwrap(), index);
    }

    #[test]
    fn corrupt_json_is_an_error() {
        assert!(SubmissionIndex::from_json("[1, 2]").is_err());
    }
}
