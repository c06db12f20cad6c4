// --- File: crates/atom_gcal/src/lib.rs ---
pub mod auth;
#[cfg(test)]
mod auth_test;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;
#[cfg(test)]
mod routes_test;
pub mod service;

pub use auth::{create_user_hub, GoogleOAuthProvider, HubType};
pub use error::GcalError;
pub use handlers::GcalState;
pub use logic::{CalendarProbe, CalendarStatus, GoogleCalendarProbe, ProbeError};
pub use routes::{router_with_state, routes};
pub use service::{to_google_event, GoogleCalendarService};
