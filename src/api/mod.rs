//! HTTP API module for verification runs, collaborator checks, health, and metrics.

pub mod doc;
pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
