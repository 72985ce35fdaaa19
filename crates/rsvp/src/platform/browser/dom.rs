//! Small DOM helpers shared by the page bindings.
//!
//! Missing elements are never an error: the page may omit any part of the
//! markup, and the corresponding binding simply does nothing.

use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, FormData, HtmlFormElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement,
};

use crate::record::{Field, FormValues};
use crate::validator::ValidationReport;
use crate::visibility::{Section, VisibleSections};
use crate::workflow::{StatusMessage, StatusTone};

pub fn document() -> Option<Document> {
    web_sys::window()?.document()
}

/// All elements matching `selector` under `root`.
pub fn query_all(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(nodes) = root.query_selector_all(selector) else {
        zoon::eprintln!("Invalid selector: {selector}");
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn query(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

pub fn document_query_all(selector: &str) -> Vec<Element> {
    document()
        .and_then(|document| document.document_element())
        .map(|root| query_all(&root, selector))
        .unwrap_or_default()
}

/// Current values of the form, as `FormData` sees them.
pub fn read_form(form: &HtmlFormElement) -> FormValues {
    let mut values = FormValues::new();
    let Ok(data) = FormData::new_with_form(form) else {
        zoon::eprintln!("Failed to read RSVP form data");
        return values;
    };
    for field in Field::ALL {
        if let Some(value) = data.get(field.name()).as_string() {
            values.set(field, value);
        }
    }
    values
}

/// Puts `values` back into the form controls.
pub fn fill_form(form: &HtmlFormElement, values: &FormValues) {
    for field in Field::ALL {
        let value = values.get(field);
        for control in query_all(form, &format!("[name=\"{}\"]", field.name())) {
            if let Some(input) = control.dyn_ref::<HtmlInputElement>() {
                match input.type_().as_str() {
                    "radio" | "checkbox" => input.set_checked(input.value() == value),
                    _ => input.set_value(value),
                }
            } else if let Some(select) = control.dyn_ref::<HtmlSelectElement>() {
                select.set_value(value);
            } else if let Some(text_area) = control.dyn_ref::<HtmlTextAreaElement>() {
                text_area.set_value(value);
            }
        }
    }
}

pub fn set_hint(root: &Element, field: Field, message: &str) {
    if let Some(hint) = query(root, &format!("[data-hint-for=\"{}\"]", field.name())) {
        hint.set_text_content(Some(message));
    }
}

pub fn render_hints(root: &Element, report: &ValidationReport) {
    for (field, hint) in report.hints() {
        set_hint(root, field, hint);
    }
}

pub fn clear_hints(root: &Element) {
    render_hints(root, &ValidationReport::default());
}

pub fn render_sections(root: &Element, visible: VisibleSections) {
    for element in query_all(root, "[data-conditional]") {
        let Some(section) = element
            .get_attribute("data-conditional")
            .as_deref()
            .and_then(Section::from_name)
        else {
            continue;
        };
        if let Err(error) = element.toggle_attribute_with_force("hidden", !visible.is_visible(section)) {
            zoon::eprintln!("Failed to toggle section {}: {error:?}", section.name());
        }
    }
}

pub fn render_status(root: &Element, status: Option<&StatusMessage>) {
    let Some(element) = query(root, "[data-rsvp-status]") else {
        return;
    };
    element.set_text_content(status.map(|status| status.text.as_str()));
    let tone = status.map(|status| match status.tone {
        StatusTone::Pending => "pending",
        StatusTone::Success => "success",
        StatusTone::Info => "info",
    });
    let result = match tone {
        Some(tone) => element.set_attribute("data-tone", tone),
        None => element.remove_attribute("data-tone"),
    };
    if let Err(error) = result {
        zoon::eprintln!("Failed to update RSVP status tone: {error:?}");
    }
}
