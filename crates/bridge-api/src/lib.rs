//! # bridge-api
//!
//! HTTP API layer for the role bridge.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Liveness text |
//! | GET | `/health` | Health check |
//! | POST | `/create-checkout-session` | Create checkout session |
//! | POST | `/webhook` | Stripe webhook |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
