//! Layout settings endpoints.
//!
//! The layout record is a singleton produced by the external editor; the
//! backend persists it verbatim (after basic validation) and the generation
//! batch reads it back. `get` answers 404 until the first save.

mod get;
mod save;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/layout";

/// Configures and returns the Actix `Scope` for the layout routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(get::process))
        .route("", post().to(save::process))
}
