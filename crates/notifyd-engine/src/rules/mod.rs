//! Per-application rules: criteria evaluation and action merging.

pub mod actions;
pub mod matcher;

pub use actions::ActionSet;
pub use matcher::RuleMatcher;
