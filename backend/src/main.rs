mod config;
mod db;
mod mailer;
mod rendering;
mod services;
mod store;

use actix_files::Files;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let cfg = config::Config::from_env();

    db::init(&cfg).map_err(std::io::Error::other)?;
    std::fs::create_dir_all(&cfg.output_dir)?;

    // Fonts are registered exactly once, at startup; render calls only look
    // them up.
    let fonts = rendering::fonts::FontRegistry::scan(&cfg.fonts_dir);
    if fonts.is_empty() {
        warn!(
            "No usable fonts in {:?}; certificate generation will fail until fonts are installed",
            cfg.fonts_dir
        );
    } else {
        info!("Registered {} font variants from {:?}", fonts.len(), cfg.fonts_dir);
    }

    let smtp = match mailer::MailConfig::from_env() {
        Some(mail_cfg) => match mailer::SmtpMailer::new(mail_cfg) {
            Ok(mailer) => Some(mailer),
            Err(e) => {
                warn!("Mail transport disabled: {}", e);
                None
            }
        },
        None => {
            info!("SMTP_HOST not set; certificate distribution is disabled");
            None
        }
    };

    let bind = (cfg.host.clone(), cfg.port);
    info!("Server running at http://{}:{}", cfg.host, cfg.port);

    let output_dir = cfg.output_dir.clone();
    let cfg = web::Data::new(cfg);
    let fonts = web::Data::new(fonts);
    let smtp = web::Data::new(smtp);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(cfg.clone())
            .app_data(fonts.clone())
            .app_data(smtp.clone())
            .service(services::roster::configure_routes())
            .service(services::layout::configure_routes())
            .service(services::certificates::configure_routes())
            .service(Files::new("/certificates", output_dir.clone()))
    })
    .bind(bind)?
    .run()
    .await
}
