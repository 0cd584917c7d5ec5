use crate::config::Config;
use crate::services::roster::sync;
use crate::store::roster;
use crate::{db, store::roster::RosterRow};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use futures_util::StreamExt;
use log::info;
use std::fs;

/// HTTP handler wrapper that converts the internal result to an `HttpResponse`.
///
/// - On success: `200 OK` with the number of synced recipients.
/// - On failure: `400 Bad Request` with the error message.
pub(crate) async fn process(cfg: web::Data<Config>, payload: Multipart) -> impl Responder {
    match upload_roster(&cfg, payload).await {
        Ok(count) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Roster uploaded",
            "recipients": count,
        })),
        Err(e) => HttpResponse::BadRequest().body(format!("Error: {}", e)),
    }
}

/// Receives the roster CSV as a multipart `file` field, validates it, writes
/// it to the configured roster path and merge-syncs its rows into the store.
///
/// The file on disk is what the generation batch later treats as the source
/// of truth; the merge here only keeps the status view current between
/// uploads and generations.
async fn upload_roster(cfg: &Config, mut payload: Multipart) -> Result<usize, String> {
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| e.to_string())?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if field_name.as_deref() != Some("file") {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        if !filename.ends_with(".csv") {
            return Err("The roster file must end with .csv".to_string());
        }

        let mut buf = Vec::new();
        while let Some(chunk) = field.next().await {
            buf.extend_from_slice(&chunk.map_err(|e| e.to_string())?);
        }
        file_bytes = Some(buf);
    }

    let bytes = file_bytes.ok_or("Missing file")?;
    // Parsing doubles as validation: a file without name/email columns is
    // rejected before anything is persisted.
    let rows: Vec<RosterRow> = sync::parse_roster(bytes.as_slice())?;

    if let Some(parent) = cfg.roster_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
    }
    fs::write(&cfg.roster_path, &bytes).map_err(|e| e.to_string())?;

    let conn = db::open(cfg)?;
    let count = roster::merge_sync(&conn, &rows)?;
    info!("Roster upload synced {} recipients", count);
    Ok(count)
}
