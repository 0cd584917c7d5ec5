use crate::config::Config;
use crate::rendering::render::parse_hex_color;
use crate::{db, store};
use actix_web::{web, HttpResponse, Responder};
use common::model::layout::LayoutSettings;

pub(crate) async fn process(
    cfg: web::Data<Config>,
    payload: web::Json<LayoutSettings>,
) -> impl Responder {
    match save_settings(&cfg, &payload) {
        Ok(()) => HttpResponse::Ok().body("Layout settings saved"),
        Err(e) => HttpResponse::BadRequest().body(format!("Error saving layout: {}", e)),
    }
}

fn save_settings(cfg: &Config, settings: &LayoutSettings) -> Result<(), String> {
    settings.validate()?;
    // The color is used at render time; reject garbage while the editor is
    // still attached instead of failing an entire batch later.
    parse_hex_color(&settings.color)?;
    let conn = db::open(cfg)?;
    store::layout::put_settings(&conn, settings)
}
