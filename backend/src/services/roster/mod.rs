//! Roster ingestion and visibility.
//!
//! The provided routes are:
//! - `POST /api/roster/upload`: multipart CSV upload. The file becomes the
//!   persisted roster source and its rows are merge-synced (upsert by email)
//!   into the store.
//! - `GET /api/roster/status`: the full roster with each recipient's current
//!   lifecycle status, for operator visibility and targeted retry.

mod status;
pub(crate) mod sync;
mod upload;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/roster";

/// Configures and returns the Actix `Scope` for all roster routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload", post().to(upload::process))
        .route("/status", get().to(status::process))
}
