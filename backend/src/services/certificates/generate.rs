//! # Batch Generation Orchestrator
//!
//! This module provides the `POST /api/certificates/generate` endpoint, which
//! renders one personalized certificate per roster recipient.
//!
//! ## Workflow:
//!
//! 1. **Resync**: if the configured roster file exists, it is authoritative:
//!    the persisted roster is fully replaced by the file's contents before
//!    anything renders. Recipients absent from the file are discarded; this
//!    is a deliberate "CSV is source of truth" policy, not a merge.
//!
//! 2. **Batch context**: layout settings and the template image are loaded
//!    exactly once per invocation into a [`BatchContext`]. Every recipient
//!    renders against the identical template in the identical position, and
//!    decoding the template is the expensive part. A failure here (settings
//!    never saved, template unreadable, font unknown) is structural and
//!    aborts the batch before any recipient is touched.
//!
//! 3. **Sequential rendering**: each recipient is rendered in roster order.
//!    Success sets `artifact_path` and advances the status to `generated`;
//!    failure marks the recipient `failed` and the loop continues; one bad
//!    recipient never aborts the batch. Recipients already at `emailed` are
//!    skipped: that status only resets through a roster resync.
//!
//! 4. **Result**: the response lists only successfully rendered recipients;
//!    failed ones stay in the roster with `status = failed` so the operator
//!    can see and retry them via the status endpoint.
//!
//! Rendering is CPU-bound, so the batch runs under
//! `tokio::task::spawn_blocking` and the handler awaits its completion.

use crate::config::Config;
use crate::rendering::fonts::FontRegistry;
use crate::rendering::render::BatchContext;
use crate::services::roster::sync;
use crate::{db, store};
use actix_web::{web, HttpResponse, Responder};
use common::model::recipient::{Recipient, RecipientStatus};
use common::requests::{GenerateResponse, GenerationResult};
use log::{info, warn};
use rusqlite::Connection;
use std::path::PathBuf;

pub(crate) async fn process(
    cfg: web::Data<Config>,
    fonts: web::Data<FontRegistry>,
) -> impl Responder {
    let handle = tokio::task::spawn_blocking(move || generate_batch(&cfg, &fonts));
    match handle.await {
        Ok(Ok(files)) => HttpResponse::Ok().json(GenerateResponse {
            message: format!("Generated {} certificates", files.len()),
            files,
        }),
        Ok(Err(e)) => HttpResponse::InternalServerError().body(format!("Error: {}", e)),
        Err(e) => HttpResponse::InternalServerError().body(format!("Task join error: {}", e)),
    }
}

/// The synchronous batch body, run via `spawn_blocking`.
fn generate_batch(cfg: &Config, fonts: &FontRegistry) -> Result<Vec<GenerationResult>, String> {
    let conn = db::open(cfg)?;

    if cfg.roster_path.exists() {
        let rows = sync::parse_roster_file(&cfg.roster_path)?;
        let count = store::roster::replace_sync(&conn, &rows)?;
        info!(
            "Roster resynced from {:?}: {} recipients",
            cfg.roster_path, count
        );
    }

    let settings = store::layout::get_settings(&conn)?
        .ok_or("Layout settings have not been configured")?;
    let mut ctx = BatchContext::new(settings, fonts)?;

    let recipients = store::roster::list(&conn)?;
    info!("Generating certificates for {} recipients", recipients.len());
    run_batch(&conn, &recipients, |recipient| {
        ctx.render(recipient, &cfg.output_dir)
    })
}

/// Drive one render call per recipient with per-item failure isolation.
///
/// Kept separate from [`generate_batch`] so the transition policy can be
/// exercised with an arbitrary render function.
fn run_batch<F>(
    conn: &Connection,
    recipients: &[Recipient],
    mut render: F,
) -> Result<Vec<GenerationResult>, String>
where
    F: FnMut(&Recipient) -> Result<PathBuf, String>,
{
    let mut files = Vec::new();
    for recipient in recipients {
        // Already-emailed recipients are settled; their status only resets
        // through a roster resync, never by re-rendering in place.
        if !recipient.status.can_transition(RecipientStatus::Generated) {
            info!(
                "Skipping {}: status '{}' does not regenerate",
                recipient.email,
                recipient.status.as_str()
            );
            continue;
        }
        match render(recipient) {
            Ok(path) => {
                store::roster::set_generated(conn, &recipient.id, &path.to_string_lossy())?;
                let filename = path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default();
                files.push(GenerationResult {
                    url: format!("/certificates/{}", filename),
                    name: recipient.name.clone(),
                    email: recipient.email.clone(),
                    id: recipient.id.clone(),
                });
            }
            Err(e) => {
                warn!("Certificate generation failed for {}: {}", recipient.email, e);
                store::roster::set_failed(conn, &recipient.id)?;
            }
        }
    }
    Ok(files)
}
