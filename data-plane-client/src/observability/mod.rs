//! Event names and field formatting shared by data-path log statements.
//!
//! Library code emits `tracing` events only. Installing a subscriber is left to
//! the hosting process or test harness.

pub mod events;
pub mod fields;
