//! Save-the-date site logic: the RSVP workflow, the countdown banner and the
//! navigation menu.
//!
//! Everything outside [`platform`] is platform-independent and driven by
//! plain values, so it runs the same in the browser and in native tests.

pub mod clock;
pub mod config;
pub mod countdown;
pub mod duplicate;
pub mod index;
pub mod nav;
pub mod platform;
pub mod record;
pub mod remote;
pub mod storage;
pub mod store;
pub mod validator;
pub mod visibility;
pub mod workflow;

#[cfg(feature = "browser")]
pub use zoon;
