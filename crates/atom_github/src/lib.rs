// --- File: crates/atom_github/src/lib.rs ---
pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_test;
pub mod models;
pub mod routes;

pub use error::GithubError;
pub use handlers::GithubState;
pub use logic::GithubSkills;
pub use models::{Issue, NewIssue, PullRequest, Repository};
pub use routes::{router_with_state, routes};
