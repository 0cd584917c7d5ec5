use crate::config::Config;
use crate::{db, store};
use actix_web::{web, HttpResponse, Responder};
use common::model::layout::LayoutSettings;

pub(crate) async fn process(cfg: web::Data<Config>) -> impl Responder {
    match get_settings(&cfg) {
        Ok(Some(settings)) => HttpResponse::Ok().json(settings),
        Ok(None) => HttpResponse::NotFound().body("Layout settings have not been saved yet"),
        Err(e) => {
            HttpResponse::ServiceUnavailable().body(format!("Error retrieving layout: {}", e))
        }
    }
}

fn get_settings(cfg: &Config) -> Result<Option<LayoutSettings>, String> {
    let conn = db::open(cfg)?;
    store::layout::get_settings(&conn)
}
