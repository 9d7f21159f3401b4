//! PhishGuard Server
//!
//! HTTP front end for the phishing detector: a single `POST /predict`
//! endpoint backed by a detector loaded once at startup.

pub mod cli;
pub mod config;
pub mod routes;
pub mod state;

pub use cli::Cli;
pub use config::{ServerSettings, ServiceConfig};
pub use routes::{create_router, ApiError};
pub use state::AppState;
