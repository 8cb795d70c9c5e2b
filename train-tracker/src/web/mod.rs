//! Web layer for the train tracker.
//!
//! Read-only JSON endpoints over the network topology and the current
//! train positions.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
