// src/config.rs

use std::{env, net::SocketAddr};

use dotenvy::dotenv;

/// Maximum number of upcoming deadlines listed on the student dashboard.
pub const STUDENT_UPCOMING_LIMIT: usize = 3;

/// Maximum number of upcoming deadlines listed on the instructor dashboard.
pub const INSTRUCTOR_UPCOMING_LIMIT: usize = 5;

/// Placeholder body for freshly created non-link modules.
pub const DEFAULT_MODULE_CONTENT: &str = "# New Module\n\nAdd your content here...";

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    /// HS256 secret shared with the auth service that issues bearer tokens.
    pub jwt_secret: String,
    pub rust_log: String,
    pub log_dir: String,
    pub bind_addr: SocketAddr,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .expect("BIND_ADDR must be a socket address such as 0.0.0.0:3000");

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self {
            database_url,
            jwt_secret,
            rust_log,
            log_dir,
            bind_addr,
            allowed_origins,
        }
    }
}
