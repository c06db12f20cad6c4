pub mod auth;
#[cfg(test)]
mod auth_test;
pub mod doc;
pub mod handlers;
pub mod logic;
pub mod routes;

pub use auth::{decode_id_token_claims, IdTokenClaims, MsTeamsOAuthProvider};
pub use handlers::MsTeamsState;
pub use logic::TeamsStatus;
pub use routes::{router_with_state, routes};
