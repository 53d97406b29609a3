//! Settings come from Rocket's figment: `Rocket.toml`, `ROCKET_*` variables,
//! and the plain environment variables the deployment sets (optionally from
//! a `.env` file).

use std::env;
use std::path::PathBuf;

use rocket::figment::Figment;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

/// Environment variables copied into the figment under these keys.
const ENV_KEYS: &[(&str, &str)] = &[
    ("ADMIN_PASSWORD", "admin_password"),
    ("DATABASE_URL", "databases.rsvp.url"),
    ("REDIS_URL", "databases.redis.url"),
    ("COUPLE_NAMES", "couple_names"),
    ("WEDDING_DATE", "wedding_date"),
    ("PUBLIC_DIR", "public_dir"),
];

const SMTP_KEYS: &[(&str, &str)] = &[
    ("SMTP_HOST", "smtp.host"),
    ("SMTP_USER", "smtp.username"),
    ("SMTP_PASSWORD", "smtp.password"),
    ("SMTP_FROM", "smtp.from"),
    ("RSVP_NOTIFY", "smtp.notify"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub admin_password: String,
    #[serde(default = "default_couple_names")]
    pub couple_names: String,
    #[serde(default = "default_wedding_date")]
    pub wedding_date: String,
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    /// Comma separated mailboxes that receive RSVP notifications.
    pub notify: String,
}

/// Shown on every page.
#[derive(Debug, Clone, Serialize)]
pub struct SiteInfo {
    pub couple_names: String,
    pub wedding_date: String,
}

impl AppConfig {
    pub fn site(&self) -> SiteInfo {
        SiteInfo {
            couple_names: self.couple_names.clone(),
            wedding_date: self.wedding_date.clone(),
        }
    }
}

fn default_couple_names() -> String {
    "Your Names".to_string()
}

fn default_wedding_date() -> String {
    "Your Date".to_string()
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_smtp_port() -> u16 {
    587
}

/// Rocket wants 256 bits of key material; any passphrase is stretched to
/// that by hashing, and handed over hex encoded.
pub fn derive_secret_key(session_secret: &str) -> String {
    format!("{:x}", Sha256::digest(session_secret.as_bytes()))
}

fn merge_env(mut figment: Figment, keys: &[(&str, &'static str)]) -> Figment {
    for (var, key) in keys {
        if let Ok(value) = env::var(var) {
            figment = figment.merge((*key, value));
        }
    }
    figment
}

/// Rocket's default figment plus the deployment environment.
pub fn figment() -> Figment {
    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {e}"),
    }

    let mut figment = merge_env(rocket::Config::figment(), ENV_KEYS);

    if let Ok(secret) = env::var("SESSION_SECRET") {
        figment = figment.merge(("secret_key", derive_secret_key(&secret)));
    } else {
        warn!("SESSION_SECRET not set, admin sessions will not survive a restart");
    }

    match env::var("PORT").map(|p| p.parse::<u16>()) {
        Ok(Ok(port)) => figment = figment.merge(("port", port)),
        Ok(Err(e)) => warn!("Invalid PORT value: {e}"),
        Err(_) => {}
    }

    if env::var("SMTP_HOST").is_ok() {
        figment = merge_env(figment, SMTP_KEYS);
        match env::var("SMTP_PORT").map(|p| p.parse::<u16>()) {
            Ok(Ok(port)) => figment = figment.merge(("smtp.port", port)),
            Ok(Err(e)) => warn!("Invalid SMTP_PORT value: {e}"),
            Err(_) => {}
        }
    }

    figment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_key_is_256_bits_of_hex() {
        let key = derive_secret_key("correct horse battery staple");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, derive_secret_key("correct horse battery staple"));
        assert_ne!(key, derive_secret_key("another secret"));
    }

    #[test]
    fn defaults_fill_in_site_details() {
        let config: AppConfig = Figment::new()
            .merge(("admin_password", "pw"))
            .extract()
            .unwrap();
        assert_eq!(config.couple_names, "Your Names");
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert!(config.smtp.is_none());
    }

    #[test]
    fn admin_password_is_required() {
        let result = Figment::new().extract::<AppConfig>();
        assert!(result.is_err());
    }

    #[test]
    fn smtp_port_defaults_to_submission() {
        let config: AppConfig = Figment::new()
            .merge(("admin_password", "pw"))
            .merge(("smtp.host", "smtp.example.com"))
            .merge(("smtp.from", "noreply@example.com"))
            .merge(("smtp.notify", "a@example.com"))
            .extract()
            .unwrap();
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.port, 587);
        assert!(smtp.username.is_none());
    }
}
