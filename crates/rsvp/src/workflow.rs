//! The RSVP submission state machine.
//!
//! ```text
//! Idle -> Validating -> Idle (invalid, hints shown)
//!                    -> CheckingDuplicate -> PromptUpdate (prior RSVP found)
//!                                         -> Storing -> Submitting -> Settled
//! PromptUpdate -> Idle (form optionally pre-filled with the prior RSVP)
//! ```
//!
//! The record is stored locally before it is sent, so a failed delivery only
//! softens the final status message.

use std::collections::HashSet;

use crate::duplicate::{DuplicateMatch, find_in_index};
use crate::index::ContactKey;
use crate::record::{Field, FormValues, SubmissionRecord, YesNo};
use crate::remote::RemoteOutcome;
use crate::storage::KeyValueStorage;
use crate::store::SubmissionStore;
use crate::validator::{ValidationReport, validate};

pub const SENDING_MESSAGE: &str = "Sending...";
pub const ATTENDING_MESSAGE: &str = "Thank you! We can't wait to celebrate with you.";
pub const DECLINING_MESSAGE: &str = "Thank you for letting us know. You'll be missed!";
pub const UNDELIVERED_NOTE: &str =
    "Your response is saved on this device, but we couldn't reach our guest list right now.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Validating,
    CheckingDuplicate,
    PromptUpdate(DuplicateMatch),
    Storing,
    Submitting(SubmissionRecord),
    Settled(StatusMessage),
}

impl WorkflowState {
    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::CheckingDuplicate => "checking-duplicate",
            Self::PromptUpdate(_) => "prompt-update",
            Self::Storing => "storing",
            Self::Submitting(_) => "submitting",
            Self::Settled(_) => "settled",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Pending,
    Success,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusMessage {
    pub fn sending() -> Self {
        Self {
            text: SENDING_MESSAGE.to_string(),
            tone: StatusTone::Pending,
        }
    }

    /// Final message for `attending`; delivery problems add a note but never
    /// turn the message into an error.
    pub fn settled(attending: YesNo, outcome: RemoteOutcome) -> Self {
        let thanks = match attending {
            YesNo::Yes => ATTENDING_MESSAGE,
            YesNo::No => DECLINING_MESSAGE,
        };
        match outcome {
            RemoteOutcome::Success => Self {
                text: thanks.to_string(),
                tone: StatusTone::Success,
            },
            RemoteOutcome::NotConfigured | RemoteOutcome::NetworkError => Self {
                text: format!("{thanks} {UNDELIVERED_NOTE}"),
                tone: StatusTone::Info,
            },
        }
    }
}

/// Result of one submit attempt, up to the point where delivery starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitStep {
    /// Show the hints; nothing was stored.
    Invalid(ValidationReport),
    /// A prior RSVP shares contact details; ask the guest what to do.
    Duplicate(DuplicateMatch),
    /// Stored locally; deliver the record and then call [`RsvpWorkflow::settle`].
    Submitting(SubmissionRecord),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptChoice {
    /// Pre-fill the form with the prior RSVP so it can be edited and resent.
    UpdatePrevious,
    /// Keep the form as it is.
    Dismiss,
}

pub struct RsvpWorkflow<S> {
    store: SubmissionStore<S>,
    state: WorkflowState,
    acknowledged: HashSet<ContactKey>,
}

impl<S: KeyValueStorage> RsvpWorkflow<S> {
    pub fn new(store: SubmissionStore<S>) -> Self {
        Self {
            store,
            state: WorkflowState::Idle,
            acknowledged: HashSet::new(),
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn store(&self) -> &SubmissionStore<S> {
        &self.store
    }

    pub fn submit(&mut self, values: &FormValues, now_ms: u64) -> SubmitStep {
        self.transition(WorkflowState::Validating);
        let report = validate(values);
        if !report.is_valid() {
            self.transition(WorkflowState::Idle);
            return SubmitStep::Invalid(report);
        }

        self.transition(WorkflowState::CheckingDuplicate);
        if let Some(found) = self.unacknowledged_duplicate(values) {
            self.transition(WorkflowState::PromptUpdate(found.clone()));
            return SubmitStep::Duplicate(found);
        }

        self.transition(WorkflowState::Storing);
        let Some(record) = SubmissionRecord::from_form(values, now_ms) else {
            self.transition(WorkflowState::Idle);
            return SubmitStep::Invalid(report);
        };
        self.store.append(record.clone());
        for key in ContactKey::of_record(&record) {
            self.acknowledged.remove(&key);
        }
        self.transition(WorkflowState::Submitting(record.clone()));
        SubmitStep::Submitting(record)
    }

    /// Answers the duplicate prompt. Returns the values to pre-fill the form with.
    ///
    /// Either choice acknowledges the prior RSVP, so the next submit with the
    /// same contact details is stored as an update instead of prompting again.
    pub fn resolve_prompt(&mut self, choice: PromptChoice) -> Option<FormValues> {
        let WorkflowState::PromptUpdate(found) = &self.state else {
            return None;
        };
        let prior = found.record.clone();
        self.acknowledged.insert(found.key.clone());
        self.acknowledged.extend(ContactKey::of_record(&prior));
        self.transition(WorkflowState::Idle);
        match choice {
            PromptChoice::UpdatePrevious => Some(FormValues::from_record(&prior)),
            PromptChoice::Dismiss => None,
        }
    }

    /// Finishes delivery of `record`.
    pub fn settle(&mut self, record: &SubmissionRecord, outcome: RemoteOutcome) -> StatusMessage {
        if outcome != RemoteOutcome::Success {
            log::warn!("RSVP kept locally, remote delivery outcome: {outcome:?}");
        }
        let message = StatusMessage::settled(record.attending, outcome);
        self.transition(WorkflowState::Settled(message.clone()));
        message
    }

    /// Advisory lookup when a contact field loses focus.
    pub fn check_contact(&self, email: &str, phone: &str) -> Option<DuplicateMatch> {
        find_in_index(&self.store.index(), email, phone)
    }

    fn unacknowledged_duplicate(&self, values: &FormValues) -> Option<DuplicateMatch> {
        let found = self.check_contact(values.get(Field::Email), values.get(Field::Phone))?;
        (!self.acknowledged.contains(&found.key)).then_some(found)
    }

    fn transition(&mut self, next: WorkflowState) {
        log::debug!("RSVP workflow: {} -> {}", self.state.label(), next.label());
        self.state = next;
    }
}

/// Hint shown beside the contact fields when a prior RSVP matches.
pub fn duplicate_hint(found: &DuplicateMatch) -> String {
    let name = found.record.name.trim();
    if name.is_empty() {
        "We already have an RSVP with these contact details. Submitting again will update it."
            .to_string()
    } else {
        format!("We already have an RSVP from {name}. Submitting again will update it.")
    }
}

/// Remembers which contact field shows the advisory duplicate hint, so a
/// lookup only ever overwrites or clears a hint it wrote itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContactHints {
    shown_on: Option<Field>,
}

impl ContactHints {
    /// Hint writes for the result of a contact lookup, as `(field, text)`.
    /// An empty text clears the hint.
    pub fn update(&mut self, found: Option<&DuplicateMatch>) -> Vec<(Field, String)> {
        let mut writes = Vec::new();
        let target = found.map(|found| match found.key {
            ContactKey::Email(_) => Field::Email,
            ContactKey::Phone(_) => Field::Phone,
        });
        if let Some(shown_on) = self.shown_on.filter(|shown_on| Some(*shown_on) != target) {
            writes.push((shown_on, String::new()));
        }
        if let (Some(found), Some(target)) = (found, target) {
            writes.push((target, duplicate_hint(found)));
        }
        self.shown_on = target;
        writes
    }

    /// Forgets the duplicate hint after all hints were re-rendered.
    pub fn reset(&mut self) {
        self.shown_on = None;
    }
}

/// Question asked when a submit matches a prior RSVP.
pub fn prompt_text(found: &DuplicateMatch) -> String {
    let attending = match found.record.attending {
        YesNo::Yes => "attending",
        YesNo::No => "not attending",
    };
    format!(
        "We found an earlier RSVP for {} ({attending}). Load it into the form so you can update it?",
        found.record.name.trim()
    )
}
