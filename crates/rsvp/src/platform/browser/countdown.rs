//! Countdown banners: `[data-countdown-target]` elements with
//! `[data-countdown="days|hours|minutes|seconds"]` children.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::Element;

use super::{BrowserClock, dom};
use crate::clock::Clock;
use crate::countdown::{Countdown, CountdownDisplay, TICK_INTERVAL_MS};

const PART_NAMES: [&str; 4] = ["days", "hours", "minutes", "seconds"];

pub fn bind_countdowns() {
    for banner in dom::document_query_all("[data-countdown-target]") {
        let Some(target) = banner.get_attribute("data-countdown-target") else {
            continue;
        };
        let target_ms = js_sys::Date::parse(&target);
        if target_ms.is_nan() {
            zoon::eprintln!("Invalid countdown target date: {target}");
            continue;
        }
        bind_banner(banner, Countdown::new(target_ms.max(0.0) as u64));
    }
}

fn bind_banner(banner: Element, countdown: Countdown) {
    let countdown = Rc::new(RefCell::new(countdown));
    if !tick(&banner, &countdown) {
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    let interval_id = Rc::new(Cell::new(None::<i32>));
    let closure = Closure::<dyn FnMut()>::new({
        let interval_id = interval_id.clone();
        move || {
            if tick(&banner, &countdown) {
                return;
            }
            if let (Some(window), Some(id)) = (web_sys::window(), interval_id.take()) {
                window.clear_interval_with_handle(id);
            }
        }
    });
    match window.set_interval_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        TICK_INTERVAL_MS as i32,
    ) {
        Ok(id) => interval_id.set(Some(id)),
        Err(error) => zoon::eprintln!("Failed to start countdown: {error:?}"),
    }
    // The banner lives as long as the page.
    closure.forget();
}

/// Renders one tick. Returns whether the countdown is still running.
fn tick(banner: &Element, countdown: &RefCell<Countdown>) -> bool {
    let display = countdown.borrow_mut().tick(BrowserClock.now_ms());
    render(banner, &display);
    !display.ended
}

fn render(banner: &Element, display: &CountdownDisplay) {
    for (name, value) in PART_NAMES.iter().zip(display.parts()) {
        if let Some(part) = dom::query(banner, &format!("[data-countdown=\"{name}\"]")) {
            part.set_text_content(Some(&value));
        }
    }
    if display.ended && banner.set_attribute("data-countdown-ended", "").is_err() {
        zoon::eprintln!("Failed to mark countdown as ended");
    }
}
