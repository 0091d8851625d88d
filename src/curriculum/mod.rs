//! Pure curriculum logic: no I/O, no store access.
//!
//! Handlers load rows through the store, hand them to these functions, and
//! persist whatever they return.

pub mod dashboard;
pub mod ordering;
pub mod progress;
pub mod tree;
pub mod validation;
