use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Upload cap for avatar images: 300 KiB.
pub const DEFAULT_AVATAR_MAX_UPLOAD_SIZE: u64 = 300 * 1024;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Allowed origins. Empty means any origin.
    #[serde(default)]
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Deployment profile name reported by `GET /port`.
    pub profile: String,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AvatarConfig {
    /// Root directory for per-student avatar files.
    pub directory: PathBuf,
    /// Largest accepted upload in bytes.
    pub max_upload_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub avatar: AvatarConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.profile", "default")?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://school.db?mode=rwc")?
            .set_default("avatar.directory", "./avatars")?
            .set_default("avatar.max_upload_size", DEFAULT_AVATAR_MAX_UPLOAD_SIZE)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., SCHOOL__AVATAR__DIRECTORY)
            .add_source(Environment::with_prefix("SCHOOL").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
