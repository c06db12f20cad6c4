// --- File: crates/services/atom_backend/src/lib.rs ---
pub mod app;
pub mod app_state;
pub mod doc;
pub mod service_factory;


pub use app::build_app;
pub use app_state::AppState;
pub use service_factory::AtomServiceFactory;
