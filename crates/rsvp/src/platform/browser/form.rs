//! The `#rsvp-form` binding: live visibility, advisory duplicate hints and
//! the submit flow.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlFormElement};
use zoon::Task;

use super::nav::listen;
use super::storage::BrowserStorage;
use super::transport::BrowserTransport;
use super::{dom, now_ms};
use crate::config::SiteConfig;
use crate::record::{Field, FormValues};
use crate::remote::RemoteClient;
use crate::storage::{KeyValueStorage, MemoryStorage};
use crate::validator::ValidationReport;
use crate::store::SubmissionStore;
use crate::visibility::visible_sections_for;
use crate::workflow::{
    ContactHints, PromptChoice, RsvpWorkflow, StatusMessage, StatusTone, SubmitStep, prompt_text,
};

const FORM_ID: &str = "rsvp-form";

const PREFILLED_MESSAGE: &str = "We've loaded your earlier RSVP. Make your changes and submit again.";
const KEEP_FORM_MESSAGE: &str = "Submit again to update your earlier RSVP.";

type PageStorage = Box<dyn KeyValueStorage>;

struct RsvpForm {
    form: HtmlFormElement,
    workflow: RefCell<RsvpWorkflow<PageStorage>>,
    client: RemoteClient<BrowserTransport>,
    contact_hints: Cell<ContactHints>,
}

pub fn bind_rsvp_form() {
    let Some(form) = dom::document()
        .and_then(|document| document.get_element_by_id(FORM_ID))
        .and_then(|element| element.dyn_into::<HtmlFormElement>().ok())
    else {
        log::debug!("No #{FORM_ID} on this page");
        return;
    };

    let config = SiteConfig::from_attributes(
        form.get_attribute("data-endpoint").as_deref(),
        form.get_attribute("data-delivery").as_deref(),
    );
    if config.remote.endpoint.is_none() {
        log::info!("No RSVP endpoint configured, submissions stay in this browser");
    }
    let storage: PageStorage = match BrowserStorage::local() {
        Ok(storage) => Box::new(storage),
        Err(error) => {
            log::warn!("{error}, keeping RSVPs in memory for this visit");
            Box::new(MemoryStorage::new())
        }
    };
    let store = SubmissionStore::with_keys(storage, config.storage_keys);

    let rsvp = Rc::new(RsvpForm {
        form,
        workflow: RefCell::new(RsvpWorkflow::new(store)),
        client: RemoteClient::new(config.remote, BrowserTransport),
        contact_hints: Cell::new(ContactHints::default()),
    });
    rsvp.render_sections();

    for event_type in ["input", "change"] {
        let rsvp = rsvp.clone();
        listen(&rsvp.form.clone(), event_type, move |_event: Event| rsvp.render_sections());
    }

    listen(&rsvp.form, "focusout", {
        let rsvp = rsvp.clone();
        move |event: Event| {
            let name = event
                .target()
                .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
                .and_then(|element| element.get_attribute("name"));
            if matches!(name.as_deref(), Some(name) if name == Field::Email.name() || name == Field::Phone.name()) {
                rsvp.check_contact();
            }
        }
    });

    listen(&rsvp.form, "submit", {
        let rsvp = rsvp.clone();
        move |event: Event| {
            event.prevent_default();
            rsvp.clone().submit();
        }
    });
}

impl RsvpForm {
    fn values(&self) -> FormValues {
        dom::read_form(&self.form)
    }

    fn render_sections(&self) {
        dom::render_sections(&self.form, visible_sections_for(&self.values()));
    }

    fn check_contact(&self) {
        let values = self.values();
        let found = self
            .workflow
            .borrow()
            .check_contact(values.get(Field::Email), values.get(Field::Phone));
        let mut hints = self.contact_hints.get();
        for (field, hint) in hints.update(found.as_ref()) {
            dom::set_hint(&self.form, field, &hint);
        }
        self.contact_hints.set(hints);
    }

    fn render_hints(&self, report: &ValidationReport) {
        dom::render_hints(&self.form, report);
        let mut hints = self.contact_hints.get();
        hints.reset();
        self.contact_hints.set(hints);
    }

    fn submit(self: Rc<Self>) {
        let values = self.values();
        let step = self.workflow.borrow_mut().submit(&values, now_ms());
        match step {
            SubmitStep::Invalid(report) => {
                self.render_hints(&report);
                dom::render_status(&self.form, None);
            }
            SubmitStep::Duplicate(found) => self.prompt(&prompt_text(&found)),
            SubmitStep::Submitting(record) => {
                self.render_hints(&ValidationReport::default());
                dom::render_status(&self.form, Some(&StatusMessage::sending()));
                Task::start(async move {
                    let outcome = self.client.submit(&record).await;
                    let status = self.workflow.borrow_mut().settle(&record, outcome);
                    self.form.reset();
                    self.render_sections();
                    dom::render_status(&self.form, Some(&status));
                });
            }
        }
    }

    fn prompt(&self, question: &str) {
        let confirmed = web_sys::window()
            .and_then(|window| window.confirm_with_message(question).ok())
            .unwrap_or(false);
        let choice = if confirmed {
            PromptChoice::UpdatePrevious
        } else {
            PromptChoice::Dismiss
        };
        let prefill = self.workflow.borrow_mut().resolve_prompt(choice);
        let text = match &prefill {
            Some(values) => {
                dom::fill_form(&self.form, values);
                self.render_sections();
                PREFILLED_MESSAGE
            }
            None => KEEP_FORM_MESSAGE,
        };
        self.render_hints(&ValidationReport::default());
        dom::render_status(
            &self.form,
            Some(&StatusMessage {
                text: text.to_string(),
                tone: StatusTone::Info,
            }),
        );
    }
}
