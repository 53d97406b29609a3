#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use rocket::local::asynchronous::Client;
use wedding_rsvp::config::derive_secret_key;
use wedding_rsvp::models::Guest;
use wedding_rsvp::store::{MemoryStore, Records};
use wedding_rsvp::throttle::LoginThrottle;

pub const ADMIN_PASSWORD: &str = "letmein";

pub fn guest(id: &str, name: &str) -> Guest {
    Guest::new(id.to_string(), name.to_string(), Utc::now().naive_utc())
}

pub fn sample_guests() -> Vec<Guest> {
    vec![
        guest("AAAAAAAAAAAA", "The Lee Family"),
        guest("BBBBBBBBBBBB", "Ortiz Family"),
        guest("CCCCCCCCCCCC", "Sam Hill"),
        guest("DDDDDDDDDDDD", "Jordan & Casey Rivers"),
    ]
}

/// Client over an in-memory store the test can inspect directly.
pub async fn client_with(store: Arc<MemoryStore>) -> Client {
    let figment = rocket::Config::figment()
        .merge(("admin_password", ADMIN_PASSWORD))
        .merge(("secret_key", derive_secret_key("test")))
        .merge(("log_level", "off"));

    let rocket = wedding_rsvp::assemble(
        rocket::custom(figment)
            .manage(Records::shared(store))
            .manage(LoginThrottle::disabled()),
    );

    Client::tracked(rocket).await.expect("valid rocket instance")
}

pub async fn client() -> (Client, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_guests(sample_guests()));
    (client_with(store.clone()).await, store)
}
