pub mod client;
pub mod doc;
pub mod enrich;
pub mod error;
pub mod handlers;
pub mod models;
#[cfg(test)]
mod models_test;
pub mod routes;
pub mod skills;

pub use error::SlackError;
pub use handlers::SlackState;
pub use models::{SlackChannel, SlackMessage};
pub use routes::{router_with_state, routes};
pub use skills::{briefing_query, is_slack_id, SlackSkills};
