// --- File: crates/atom_scheduling/src/lib.rs ---
//! Conversational meeting scheduling.
//!
//! The client posts the message history; the pipeline extracts the request,
//! asks for missing details or creates the meeting, and returns the history
//! with the assistant's reply appended.

pub mod body;
#[cfg(test)]
mod body_test;
pub mod datetime;
pub mod doc;
pub mod error;
pub mod extractor;
pub mod handlers;
pub mod hasura;
pub mod indexer;
#[cfg(test)]
mod merge_proptest;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod pipeline;
#[cfg(test)]
mod pipeline_test;
pub mod recurrence;
pub mod responder;
pub mod routes;
pub mod store;
pub mod types;

pub use error::SchedulingError;
pub use handlers::SchedulingState;
pub use pipeline::{schedule_meeting_control_center, SchedulingDeps};
pub use routes::{router_with_state, routes};
pub use types::{MeetingQuery, SkillMessageHistory};
