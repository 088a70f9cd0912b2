//! Data models for checkcards and task breakdowns.
//!
//! A [`CheckcardRecord`] is the unit persisted per step. Its `metadata`
//! section is derived from the step definition, its `data` section belongs to
//! the actor, and its lifecycle fields describe whether the step succeeded.
//! Lifecycle fields stay raw JSON so validators can report malformed content.

pub mod actor;
pub mod record;
pub mod status;
pub mod task;

#[cfg(test)]
mod tests;

pub use actor::Actor;
pub use record::{CheckcardRecord, DataSection, StepMetadata};
pub use status::LifecycleStatus;
pub use task::{TaskRecord, INITIAL_TASK_STATUS};
