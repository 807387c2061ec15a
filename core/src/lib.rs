//! Memoized resolution and nested-map traversal.
//!
//! This crate holds the two pure-ish building blocks the rest of the
//! workspace composes:
//!
//! - [`Memo`]: a single-slot, compute-once async cache with a single-flight
//!   guarantee for concurrent first callers.
//! - [`access_nested`]: strict traversal of a JSON object along an ordered
//!   key path, failing at the first key that cannot be applied.
//!
//! Neither module performs IO; callers supply the data and the computations.

pub mod memo;
pub mod nested;

pub use memo::Memo;
pub use nested::{LookupError, access_nested};
