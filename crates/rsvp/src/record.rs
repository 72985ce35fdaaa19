//! RSVP records and the raw form values they are built from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Names of the form fields the RSVP form exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Attending,
    Name,
    Email,
    Phone,
    InvitationPreference,
    BringingPlusOne,
    PlusOneName,
    AdditionalGuests,
    AdditionalGuestsCount,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Attending,
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::InvitationPreference,
        Field::BringingPlusOne,
        Field::PlusOneName,
        Field::AdditionalGuests,
        Field::AdditionalGuestsCount,
    ];

    /// The `name` attribute of the form control.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Attending => "attending",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::InvitationPreference => "invitation_preference",
            Self::BringingPlusOne => "bringing_plus_one",
            Self::PlusOneName => "plus_one_name",
            Self::AdditionalGuests => "additional_guests",
            Self::AdditionalGuestsCount => "additional_guests_count",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

/// How the guest wants to receive the formal invitation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationPreference {
    Phone,
    Email,
    Both,
    Text,
    None,
}

impl InvitationPreference {
    /// Parses a preference a guest may choose on the form.
    /// `none` is only ever assigned to records of guests who are not attending.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "phone" => Some(Self::Phone),
            "email" => Some(Self::Email),
            "both" => Some(Self::Both),
            "text" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Both => "both",
            Self::Text => "text",
            Self::None => "none",
        }
    }

    pub fn requires_phone(&self) -> bool {
        matches!(self, Self::Phone | Self::Both | Self::Text)
    }

    pub fn requires_email(&self) -> bool {
        matches!(self, Self::Email | Self::Both)
    }
}

/// Current values of the RSVP form, keyed by field name.
///
/// Absent fields read as empty strings and every value is trimmed,
/// matching how the browser's `FormData` is consumed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<String, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field.name().to_string(), value.into());
    }

    /// Inserts a raw `name=value` pair as read from the DOM.
    pub fn insert_raw(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, field: Field) -> &str {
        self.values
            .get(field.name())
            .map(|value| value.trim())
            .unwrap_or_default()
    }

    fn yes_no(&self, field: Field) -> Option<YesNo> {
        YesNo::parse(self.get(field))
    }

    /// Form values that reproduce `record` when the form is pre-filled with them.
    pub fn from_record(record: &SubmissionRecord) -> Self {
        let mut values = Self::new()
            .with(Field::Attending, record.attending.as_str())
            .with(Field::Name, record.name.clone())
            .with(Field::Email, record.email.clone())
            .with(Field::Phone, record.phone.clone())
            .with(Field::PlusOneName, record.plus_one_name.clone());
        if record.invitation_preference != InvitationPreference::None {
            values.set(
                Field::InvitationPreference,
                record.invitation_preference.as_str(),
            );
        }
        if let Some(bringing_plus_one) = record.bringing_plus_one {
            values.set(Field::BringingPlusOne, bringing_plus_one.as_str());
        }
        if let Some(additional_guests) = record.additional_guests {
            values.set(Field::AdditionalGuests, additional_guests.as_str());
        }
        if let Some(count) = record.additional_guests_count {
            values.set(Field::AdditionalGuestsCount, count.to_string());
        }
        values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// One guest's response to the invitation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    /// Milliseconds since the Unix epoch.
    pub submitted_at: u64,
    pub attending: YesNo,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub invitation_preference: InvitationPreference,
    #[serde(default)]
    pub bringing_plus_one: Option<YesNo>,
    #[serde(default)]
    pub plus_one_name: String,
    #[serde(default)]
    pub additional_guests: Option<YesNo>,
    #[serde(default)]
    pub additional_guests_count: Option<u32>,
}

impl SubmissionRecord {
    /// Builds a record from form values that already passed validation.
    ///
    /// Returns `None` when `attending` is not answered. Fields the guest
    /// could not see (everything but the name for declining guests, the
    /// plus-one name without a plus-one) are dropped.
    pub fn from_form(values: &FormValues, submitted_at: u64) -> Option<Self> {
        let attending = values.yes_no(Field::Attending)?;
        let name = values.get(Field::Name).to_string();
        if attending == YesNo::No {
            return Some(Self {
                submitted_at,
                attending,
                name,
                email: values.get(Field::Email).to_string(),
                phone: values.get(Field::Phone).to_string(),
                invitation_preference: InvitationPreference::None,
                bringing_plus_one: None,
                plus_one_name: String::new(),
                additional_guests: None,
                additional_guests_count: None,
            });
        }
        let bringing_plus_one = values.yes_no(Field::BringingPlusOne);
        let additional_guests = values.yes_no(Field::AdditionalGuests);
        let plus_one_name = if bringing_plus_one == Some(YesNo::Yes) {
            values.get(Field::PlusOneName).to_string()
        } else {
            String::new()
        };
        let additional_guests_count = if additional_guests == Some(YesNo::Yes) {
            parse_guest_count(values.get(Field::AdditionalGuestsCount))
        } else {
            None
        };
        Some(Self {
            submitted_at,
            attending,
            name,
            email: values.get(Field::Email).to_string(),
            phone: values.get(Field::Phone).to_string(),
            invitation_preference: InvitationPreference::parse(
                values.get(Field::InvitationPreference),
            )
            .unwrap_or(InvitationPreference::None),
            bringing_plus_one,
            plus_one_name,
            additional_guests,
            additional_guests_count,
        })
    }

    /// `(name, value)` pairs in the order they are sent to the remote endpoint.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let yes_no = |value: Option<YesNo>| value.map(|v| v.as_str()).unwrap_or_default();
        vec![
            ("submittedAt", self.submitted_at.to_string()),
            ("attending", self.attending.as_str().to_string()),
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("phone", self.phone.clone()),
            (
                "invitationPreference",
                self.invitation_preference.as_str().to_string(),
            ),
            ("bringingPlusOne", yes_no(self.bringing_plus_one).to_string()),
            ("plusOneName", self.plus_one_name.clone()),
            ("additionalGuests", yes_no(self.additional_guests).to_string()),
            (
                "additionalGuestsCount",
                self.additional_guests_count
                    .map(|count| count.to_string())
                    .unwrap_or_default(),
            ),
        ]
    }
}

/// Parses a guest count the way the form does: any finite number of at least one.
/// Fractional counts are truncated.
pub fn parse_guest_count(value: &str) -> Option<u32> {
    let count = value.trim().parse::<f64>().ok()?;
    if !count.is_finite() || count < 1.0 {
        return None;
    }
    Some(count.min(u32::MAX as f64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attending_values() -> FormValues {
        FormValues::new()
            .with(Field::Attending, "yes")
            .with(Field::Name, "  Alex Kim ")
            .with(Field::InvitationPreference, "email")
            .with(Field::Email, "alex@example.com")
            .with(Field::BringingPlusOne, "no")
            .with(Field::PlusOneName, "ignored")
            .with(Field::AdditionalGuests, "yes")
            .with(Field::AdditionalGuestsCount, "2")
    }

    #[test]
    fn absent_fields_read_as_empty() {
        let values = FormValues::new();
        assert_eq!(values.get(Field::Phone), "");
    }

    #[test]
    fn record_drops_hidden_fields() {
        let record = SubmissionRecord::from_form(&attending_values(), 10).unwrap();
        assert_eq!(record.name, "Alex Kim");
        assert_eq!(record.plus_one_name, "");
        assert_eq!(record.additional_guests_count, Some(2));
        assert_eq!(record.invitation_preference, InvitationPreference::Email);
    }

    #[test]
    fn declining_record_has_no_preference() {
        let values = FormValues::new()
            .with(Field::Attending, "no")
            .with(Field::Name, "Sam")
            .with(Field::InvitationPreference, "email");
        let record = SubmissionRecord::from_form(&values, 0).unwrap();
        assert_eq!(record.invitation_preference, InvitationPreference::None);
        assert_eq!(record.bringing_plus_one, None);
    }

    #[test]
    fn record_without_attendance_is_not_built() {
        assert!(SubmissionRecord::from_form(&FormValues::new(), 0).is_none());
    }

    #[test]
    fn record_serializes_with_camel_case_names() {
        let record = SubmissionRecord::from_form(&attending_values(), 42).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["submittedAt"], 42);
        assert_eq!(json["invitationPreference"], "email");
        assert_eq!(json["bringingPlusOne"], "no");
        assert_eq!(json["additionalGuestsCount"], 2);
    }

    #[test]
    fn prefill_reproduces_record() {
        let record = SubmissionRecord::from_form(&attending_values(), 7).unwrap();
        let prefilled = FormValues::from_record(&record);
        assert_eq!(SubmissionRecord::from_form(&prefilled, 7), Some(record));
    }

    #[test]
    fn guest_count_parsing() {
        assert_eq!(parse_guest_count("3"), Some(3));
        assert_eq!(parse_guest_count(" 2.5 "), Some(2));
        assert_eq!(parse_guest_count("0"), None);
        assert_eq!(parse_guest_count("inf"), None);
        assert_eq!(parse_guest_count("many"), None);
    }
}
