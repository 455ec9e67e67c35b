//! Music catalog service
//!
//! A REST API over three resources: usuarios, canciones and the favoritos
//! that join them. Writes are validated and transactional; deleting a
//! usuario or a cancion removes its favoritos in the same transaction.

pub mod config;
pub mod docs;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
