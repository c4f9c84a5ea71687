//! Web layer for the fuel station map.
//!
//! Serves the map page and a JSON API for filtered stations.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
