pub mod api;
pub mod auth;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod skills;
pub mod tokens;
#[cfg(test)]
mod tokens_test;

pub use api::{build_invoice_query, Invoice, ListInvoicesOptions, QboApi};
pub use auth::QuickBooksProvider;
pub use error::QboError;
pub use handlers::QboState;
pub use routes::{router_with_state, routes};
pub use skills::{QboCallbackQuery, QuickBooksSkills};
pub use tokens::{get_valid_tokens, QboTokens};
