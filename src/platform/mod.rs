//! Platform abstraction layer
//!
//! Browser-independent pieces of the front end:
//! - Time: fixed-rate timers and the resize debouncer
//! - Input: player intents and key bindings

pub mod input;
pub mod time;

pub use input::{Intent, intent_for_key};
pub use time::{Debouncer, Scheduler, Timer, Trigger, seconds_to_micros};
