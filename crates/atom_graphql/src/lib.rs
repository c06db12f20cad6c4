//! Hasura GraphQL persistence for Atom
//!
//! Provides the retrying [`HasuraClient`] and the Hasura-backed implementations
//! of the `TokenStore` (`user_tokens`) and `CredentialStore`
//! (`user_credentials`) traits from `atom-common`.

pub mod client;
pub mod credentials;
pub mod error;
pub mod tokens;

pub use client::HasuraClient;
pub use credentials::HasuraCredentialStore;
pub use error::GraphqlError;
pub use tokens::HasuraTokenStore;
