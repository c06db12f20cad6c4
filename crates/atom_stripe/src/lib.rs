// --- File: crates/atom_stripe/src/lib.rs ---
pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_test;
pub mod models;
pub mod routes;

pub use error::StripeError;
pub use handlers::StripeState;
pub use logic::StripeSkills;
pub use models::{PaymentList, StripeCharge, StripePaymentIntent};
pub use routes::{router_with_state, routes};
