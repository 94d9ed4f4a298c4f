//! Element domain model for the desktop accessibility bridge (spec §3, §4.1).
//!
//! This crate defines the data shapes shared by every other crate in the
//! workspace: the tree/flat element representations, the fixed role
//! vocabulary, bounds math, windows, target specs, and diff/observe wire
//! types. It has no knowledge of traversal, filtering, or diffing — that
//! lives in `bridge-consumer` — and no knowledge of any platform backend.

mod bounds;
mod diff;
mod element;
mod hash;
mod role;
mod scope;
mod target;
mod window;

pub use bounds::Bounds;
pub use diff::{FieldDiff, HashChange, IdDiff, ObserveEvent, TreeDiff};
pub use element::{Element, Enabled, FlatElement};
pub use hash::ContentHash;
pub use role::{map_action, map_role, Role, INTERACTIVE_ROLES};
pub use scope::ReadScope;
pub use target::{Direction, TargetSpec};
pub use window::Window;
