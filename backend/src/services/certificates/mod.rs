//! Certificate pipeline endpoints.
//!
//! ## Sub-modules:
//! - `generate`: runs the batch generation orchestrator over the roster and
//!   returns the list of rendered artifacts.
//! - `send`: dispatches generated certificates by email with per-recipient
//!   failure accounting.

pub(crate) mod generate;
pub(crate) mod send;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/certificates";

/// Configures and returns the Actix `Scope` for the certificate routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/generate", post().to(generate::process))
        .route("/send", post().to(send::process))
}
