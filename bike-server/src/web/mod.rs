//! Web layer for the bike dashboard.
//!
//! Serves the HTML dashboard plus the JSON endpoints the map script reads.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{SESSION_COOKIE, create_router};
pub use state::AppState;
pub use templates::*;
