//! Wedding website with RSVPs.
//!
//! Guests find themselves on the invitation list and RSVP against their own
//! record; anyone who cannot find their name leaves a fallback RSVP with
//! contact details instead. The couple reviews, edits and deletes responses
//! from a password protected dashboard.
//!
//! # Configuration
//!
//! Everything is read through Rocket's figment (see [`config::figment`]):
//!
//! | Variable          | Purpose                                           |
//! |-------------------|---------------------------------------------------|
//! | `ADMIN_PASSWORD`  | shared admin password (required)                  |
//! | `SESSION_SECRET`  | key material for the admin session cookie         |
//! | `DATABASE_URL`    | MySQL; without it RSVPs are kept in memory        |
//! | `REDIS_URL`       | failed login counters; without it no throttling   |
//! | `COUPLE_NAMES`    | shown in the page header                          |
//! | `WEDDING_DATE`    | shown in the page header                          |
//! | `SMTP_*`          | RSVP notification email, see [`config::SmtpConfig`] |

use rocket::fairing::AdHoc;
use rocket::figment::Figment;
use rocket::fs::FileServer;
use rocket::{Build, Rocket};
use rocket_db_pools::diesel::MysqlPool;
use rocket_db_pools::{deadpool_redis, Database};
use rocket_dyn_templates::Template;

pub mod admin;
pub mod config;
pub mod directory;
pub mod error;
pub mod forms;
pub mod gallery;
pub mod models;
pub mod notify;
pub mod routes;
pub mod schema;
pub mod store;
pub mod throttle;
pub mod workflow;

use config::AppConfig;
use notify::Notifier;
use store::{MemoryStore, MysqlStore, Records};
use throttle::LoginThrottle;

#[derive(Database)]
#[database("rsvp")]
pub struct Db(MysqlPool);

#[derive(Database)]
#[database("redis")]
pub struct Redis(deadpool_redis::Pool);

/// The site, with stores picked from configuration.
pub fn rocket(figment: Figment) -> Rocket<Build> {
    let rocket = rocket::custom(figment);

    let rocket = if rocket.figment().contains("databases.rsvp") {
        rocket
            .attach(Db::init())
            .attach(AdHoc::try_on_ignite("MySQL record store", |rocket| async move {
                match Db::fetch(&rocket) {
                    Some(db) => {
                        let store = MysqlStore::new(db.0.clone());
                        Ok(rocket.manage(Records::new(store)))
                    }
                    None => Err(rocket),
                }
            }))
    } else {
        tracing::warn!("no database configured, RSVPs are kept in memory only");
        rocket.manage(Records::new(MemoryStore::default()))
    };

    let rocket = if rocket.figment().contains("databases.redis") {
        rocket
            .attach(Redis::init())
            .attach(AdHoc::try_on_ignite("Login throttle", |rocket| async move {
                match Redis::fetch(&rocket) {
                    Some(redis) => {
                        let throttle = LoginThrottle::redis(redis.0.clone());
                        Ok(rocket.manage(throttle))
                    }
                    None => Err(rocket),
                }
            }))
    } else {
        rocket.manage(LoginThrottle::disabled())
    };

    assemble(rocket)
}

/// Mounts routes, templates and the fairings that do not depend on the
/// store. [`Records`] and [`LoginThrottle`] must be managed by the caller.
pub fn assemble(rocket: Rocket<Build>) -> Rocket<Build> {
    let rocket = rocket
        .mount("/", routes::all())
        .register("/", routes::catchers())
        .attach(Template::fairing())
        .attach(AdHoc::config::<AppConfig>())
        .attach(AdHoc::try_on_ignite("RSVP notifications", |rocket| async move {
            let config = rocket.state::<AppConfig>().cloned();
            let smtp = config.as_ref().and_then(|c| c.smtp.as_ref());
            match Notifier::from_config(smtp) {
                Ok(notifier) => {
                    if !notifier.is_enabled() {
                        tracing::info!("SMTP not configured, RSVP notifications disabled");
                    }
                    Ok(rocket.manage(notifier))
                }
                Err(e) => {
                    tracing::error!(error = %e, "invalid SMTP configuration");
                    Err(rocket)
                }
            }
        }));

    let public_dir = rocket
        .figment()
        .extract_inner::<std::path::PathBuf>("public_dir")
        .unwrap_or_else(|_| "public".into());
    if public_dir.is_dir() {
        rocket.mount("/", FileServer::from(public_dir))
    } else {
        tracing::warn!(dir = %public_dir.display(), "public directory missing, static files disabled");
        rocket
    }
}
