//! Navigation menu: `.nav-toggle` button controlling the `#nav-links` list.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{Element, Event, KeyboardEvent};

use super::dom;
use crate::nav::NavMenu;

pub fn bind_nav() {
    let Some(document) = dom::document() else {
        return;
    };
    let (Some(toggle), Some(links)) = (
        document.query_selector(".nav-toggle").ok().flatten(),
        document.get_element_by_id("nav-links"),
    ) else {
        return;
    };

    let menu = Rc::new(Cell::new(NavMenu::default()));
    let update = {
        let menu = menu.clone();
        let toggle = toggle.clone();
        let links = links.clone();
        move |change: &dyn Fn(&mut NavMenu)| {
            let mut next = menu.get();
            change(&mut next);
            menu.set(next);
            apply(&toggle, &links, next);
        }
    };
    let update = Rc::new(update);

    listen(&toggle, "click", {
        let update = update.clone();
        move |_event: Event| update(&|menu: &mut NavMenu| menu.toggle())
    });

    listen(&links, "click", {
        let update = update.clone();
        move |event: Event| {
            let href = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .and_then(|element| element.closest("a").ok().flatten())
                .and_then(|anchor| anchor.get_attribute("href"));
            update(&|menu: &mut NavMenu| menu.link_clicked(href.as_deref()));
        }
    });

    listen(&document, "keydown", move |event: Event| {
        if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
            let key = event.key();
            update(&|menu: &mut NavMenu| menu.key_pressed(&key));
        }
    });
}

fn apply(toggle: &Element, links: &Element, menu: NavMenu) {
    if toggle.set_attribute("aria-expanded", menu.aria_expanded()).is_err() {
        zoon::eprintln!("Failed to update nav toggle");
    }
    if links.class_list().toggle_with_force("open", menu.is_expanded()).is_err() {
        zoon::eprintln!("Failed to update nav links");
    }
}

/// Adds a page-lifetime event listener.
pub(super) fn listen(target: &web_sys::EventTarget, event_type: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    if let Err(error) = target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref()) {
        zoon::eprintln!("Failed to listen to '{event_type}': {error:?}");
    }
    closure.forget();
}
