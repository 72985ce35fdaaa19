//! RSVP form validation.
//!
//! Validation never fails loudly: it returns a [`ValidationReport`] carrying
//! one hint per field, which the caller renders beside each control.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::record::{Field, FormValues, InvitationPreference, YesNo};

pub const ATTENDING_HINT: &str = "Please let us know if you can make it.";
pub const NAME_HINT: &str = "Please enter your name.";
pub const PREFERENCE_HINT: &str = "Please choose how you'd like to receive your invitation.";
pub const PHONE_MISSING_HINT: &str = "Please enter your phone number.";
pub const PHONE_INVALID_HINT: &str = "Please enter a valid phone number.";
pub const PHONE_LENGTH_HINT: &str = "Please enter a phone number with at least 10 digits.";
pub const EMAIL_MISSING_HINT: &str = "Please enter your email.";
pub const EMAIL_INVALID_HINT: &str = "Please enter a valid email.";
pub const PLUS_ONE_NAME_HINT: &str = "Please enter your guest's name.";
pub const GUEST_COUNT_MISSING_HINT: &str = "Please enter how many additional guests are coming.";
pub const GUEST_COUNT_INVALID_HINT: &str = "Please enter a number of at least 1.";

const MIN_PHONE_DIGITS: usize = 10;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9()+\-.\s]+$").expect("valid phone pattern"));

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Outcome of validating the RSVP form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<Field, &'static str>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Hint for `field`, or an empty string when the field is fine.
    pub fn hint(&self, field: Field) -> &'static str {
        self.errors.get(&field).copied().unwrap_or_default()
    }

    /// Every form field with its hint, so stale hints can be cleared.
    pub fn hints(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        Field::ALL.into_iter().map(|field| (field, self.hint(field)))
    }

    /// Fields that carry an error.
    pub fn invalid_fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.errors.keys().copied()
    }

    fn fail(&mut self, field: Field, hint: &'static str) {
        self.errors.insert(field, hint);
    }
}

/// Validates the RSVP form.
///
/// Only a missing attendance answer short-circuits; all other checks run so
/// every problem is reported at once.
pub fn validate(values: &FormValues) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Some(attending) = YesNo::parse(values.get(Field::Attending)) else {
        report.fail(Field::Attending, ATTENDING_HINT);
        return report;
    };
    if attending == YesNo::No {
        return report;
    }

    if values.get(Field::Name).is_empty() {
        report.fail(Field::Name, NAME_HINT);
    }

    let preference = InvitationPreference::parse(values.get(Field::InvitationPreference));
    if preference.is_none() {
        report.fail(Field::InvitationPreference, PREFERENCE_HINT);
    }
    let requires_phone = preference.is_some_and(|p| p.requires_phone());
    let requires_email = preference.is_some_and(|p| p.requires_email());

    if let Some(hint) = phone_hint(values.get(Field::Phone), requires_phone) {
        report.fail(Field::Phone, hint);
    }
    if let Some(hint) = email_hint(values.get(Field::Email), requires_email) {
        report.fail(Field::Email, hint);
    }

    if YesNo::parse(values.get(Field::BringingPlusOne)) == Some(YesNo::Yes)
        && values.get(Field::PlusOneName).is_empty()
    {
        report.fail(Field::PlusOneName, PLUS_ONE_NAME_HINT);
    }

    if YesNo::parse(values.get(Field::AdditionalGuests)) == Some(YesNo::Yes) {
        let count = values.get(Field::AdditionalGuestsCount);
        if count.is_empty() {
            report.fail(Field::AdditionalGuestsCount, GUEST_COUNT_MISSING_HINT);
        } else if !is_valid_guest_count(count) {
            report.fail(Field::AdditionalGuestsCount, GUEST_COUNT_INVALID_HINT);
        }
    }

    report
}

fn phone_hint(phone: &str, required: bool) -> Option<&'static str> {
    if phone.is_empty() {
        return required.then_some(PHONE_MISSING_HINT);
    }
    if !PHONE_PATTERN.is_match(phone) {
        return Some(PHONE_INVALID_HINT);
    }
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    (digits < MIN_PHONE_DIGITS).then_some(PHONE_LENGTH_HINT)
}

fn email_hint(email: &str, required: bool) -> Option<&'static str> {
    if email.is_empty() {
        return required.then_some(EMAIL_MISSING_HINT);
    }
    (!EMAIL_PATTERN.is_match(email)).then_some(EMAIL_INVALID_HINT)
}

fn is_valid_guest_count(count: &str) -> bool {
    count
        .parse::<f64>()
        .is_ok_and(|count| count.is_finite() && count >= 1.0)
}
