//! Browser bindings for the save-the-date page.
//!
//! Each binding looks up its own markup and does nothing when the page
//! doesn't carry it, so one bundle serves every page of the site.

pub mod countdown;
pub mod dom;
pub mod form;
pub mod logger;
pub mod nav;
pub mod storage;
pub mod transport;

use crate::clock::Clock;

/// Milliseconds since the Unix epoch, from `Date.now()`.
pub fn now_ms() -> u64 {
    js_sys::Date::now().max(0.0) as u64
}

/// [`Clock`] backed by `Date.now()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> u64 {
        now_ms()
    }
}

/// Wires up every binding present on the page.
pub fn start() {
    logger::init(if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
    nav::bind_nav();
    countdown::bind_countdowns();
    form::bind_rsvp_form();
    log::debug!("Save-the-date page started");
}
