use crate::config::Config;
use crate::{db, store};
use actix_web::{web, HttpResponse, Responder};
use common::model::recipient::Recipient;

pub(crate) async fn process(cfg: web::Data<Config>) -> impl Responder {
    match roster_status(&cfg) {
        Ok(recipients) => HttpResponse::Ok().json(recipients),
        Err(e) => {
            HttpResponse::ServiceUnavailable().body(format!("Error retrieving roster: {}", e))
        }
    }
}

fn roster_status(cfg: &Config) -> Result<Vec<Recipient>, String> {
    let conn = db::open(cfg)?;
    store::roster::list(&conn)
}
