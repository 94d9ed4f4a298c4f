//! Tree traversal, filtering, landmark refs, and diffing over
//! [`bridge_types::Element`] trees (spec §4.2, §4.3).
//!
//! This crate has no knowledge of the request engine's cache or of any
//! platform backend; it is pure functions over the element model, the way
//! `accesskit_consumer` is pure functions over `accesskit`'s node model.

pub mod diff;
pub mod ops;
pub mod overlay;
pub mod refs;
pub mod snapshot;
