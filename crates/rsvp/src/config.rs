//! Site configuration: where state is persisted and where RSVPs are delivered.

use std::borrow::Cow;

use crate::remote::{DeliveryMode, RemoteConfig};

pub static SUBMISSIONS_STORAGE_KEY: &str = "rsvp-submissions";
pub static INDEX_STORAGE_KEY: &str = "rsvp-submission-index";
pub static EMAIL_INDEX_STORAGE_KEY: &str = "rsvp-email-index";
pub static PHONE_INDEX_STORAGE_KEY: &str = "rsvp-phone-index";

/// Storage keys of the submission list and its derived indexes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKeys {
    pub submissions: Cow<'static, str>,
    pub index: Cow<'static, str>,
    pub email_index: Cow<'static, str>,
    pub phone_index: Cow<'static, str>,
}

impl StorageKeys {
    /// Keys sharing `prefix`, for hosting several pages on one origin.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            submissions: format!("{prefix}-submissions").into(),
            index: format!("{prefix}-submission-index").into(),
            email_index: format!("{prefix}-email-index").into(),
            phone_index: format!("{prefix}-phone-index").into(),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            submissions: SUBMISSIONS_STORAGE_KEY.into(),
            index: INDEX_STORAGE_KEY.into(),
            email_index: EMAIL_INDEX_STORAGE_KEY.into(),
            phone_index: PHONE_INDEX_STORAGE_KEY.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SiteConfig {
    pub storage_keys: StorageKeys,
    pub remote: RemoteConfig,
}

impl SiteConfig {
    /// Builds the configuration from the RSVP form's `data-endpoint` and
    /// `data-delivery` attributes. Blank values count as absent.
    pub fn from_attributes(endpoint: Option<&str>, delivery: Option<&str>) -> Self {
        let endpoint = endpoint
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty())
            .map(str::to_string);
        let mode = delivery
            .and_then(DeliveryMode::parse)
            .unwrap_or_default();
        Self {
            storage_keys: StorageKeys::default(),
            remote: RemoteConfig { endpoint, mode },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_endpoint_is_absent() {
        let config = SiteConfig::from_attributes(Some("  "), Some("callback"));
        assert_eq!(config.remote.endpoint, None);
        assert_eq!(config.remote.mode, DeliveryMode::Callback);
    }

    #[test]
    fn unknown_delivery_falls_back_to_default() {
        let config = SiteConfig::from_attributes(Some("https://example.com/exec"), Some("carrier-pigeon"));
        assert_eq!(config.remote.mode, DeliveryMode::default());
        assert_eq!(config.remote.endpoint.as_deref(), Some("https://example.com/exec"));
    }

    #[test]
    fn prefixed_keys() {
        let keys = StorageKeys::with_prefix("party");
        assert_eq!(keys.submissions, "party-submissions");
        assert_eq!(keys.phone_index, "party-phone-index");
    }
}
