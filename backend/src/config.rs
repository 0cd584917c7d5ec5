use std::path::PathBuf;

/// Filesystem and network configuration, loaded once at startup.
///
/// Every knob has a default suited to running the portal from its own
/// directory; deployments override via `CLUBCERT_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Directory scanned for `.ttf`/`.otf` files at startup.
    pub fonts_dir: PathBuf,
    /// Directory where rendered certificates are written and served from.
    pub output_dir: PathBuf,
    /// The authoritative roster CSV, replaced on each upload.
    pub roster_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            db_path: env_path("CLUBCERT_DB", "clubcert.sqlite"),
            fonts_dir: env_path("CLUBCERT_FONTS_DIR", "fonts"),
            output_dir: env_path("CLUBCERT_OUTPUT_DIR", "certificates"),
            roster_path: env_path("CLUBCERT_ROSTER", "roster.csv"),
            host: std::env::var("CLUBCERT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("CLUBCERT_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
