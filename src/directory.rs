//! The invited guest list: typeahead search, lookup, and registration.

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;

use crate::error::RsvpError;
use crate::models::Guest;
use crate::store::{RecordStore, StoreResult};

/// Shorter queries return nothing instead of scanning on every keystroke.
pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_MATCHES: usize = 10;

pub const CODE_LENGTH: usize = 12;

/// One typeahead suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestMatch {
    pub guest_id: String,
    pub name: String,
    pub rsvp_submitted: bool,
}

impl From<Guest> for GuestMatch {
    fn from(guest: Guest) -> Self {
        GuestMatch {
            guest_id: guest.id,
            name: guest.name,
            rsvp_submitted: guest.rsvp_submitted,
        }
    }
}

pub async fn search_guests(store: &dyn RecordStore, query: &str) -> StoreResult<Vec<GuestMatch>> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Ok(Vec::new());
    }

    let found = store.search_guests(query, MAX_MATCHES).await?;
    Ok(found.into_iter().map(GuestMatch::from).collect())
}

pub async fn find_guest(store: &dyn RecordStore, id: &str) -> StoreResult<Option<Guest>> {
    store.find_guest(id).await
}

/// Random uppercase alphanumeric code used as a record id.
pub fn generate_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Adds an invitee under a fresh code.
pub async fn register_guest(store: &dyn RecordStore, name: &str) -> Result<Guest, RsvpError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RsvpError::validation("Guest name cannot be empty."));
    }

    let code = loop {
        let code = generate_code();
        if store.find_guest(&code).await?.is_none() {
            break code;
        }
    };

    let guest = Guest::new(code, name.to_string(), Utc::now().naive_utc());
    store.insert_guest(&guest).await?;
    tracing::info!(guest_id = %guest.id, name = %guest.name, "guest registered");
    Ok(guest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    async fn store_with(names: &[&str]) -> MemoryStore {
        let store = MemoryStore::default();
        for name in names {
            register_guest(&store, name).await.unwrap();
        }
        store
    }

    #[test]
    fn codes_are_uppercase_alphanumeric() {
        let code = generate_code();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[rocket::async_test]
    async fn single_character_query_returns_nothing() {
        let store = store_with(&["Ann Lee", "Dan Moss"]).await;
        assert!(search_guests(&store, "a").await.unwrap().is_empty());
        assert!(search_guests(&store, " a ").await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn search_is_case_insensitive_and_capped() {
        let names: Vec<String> = (0..15).map(|i| format!("Hanson Family {i:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let store = store_with(&refs).await;

        let found = search_guests(&store, "AN").await.unwrap();
        assert_eq!(found.len(), MAX_MATCHES);
        assert!(found.iter().all(|m| m.name.starts_with("Hanson")));
        assert_eq!(found[0].name, "Hanson Family 00");
    }

    #[rocket::async_test]
    async fn register_rejects_blank_names() {
        let store = MemoryStore::default();
        let err = register_guest(&store, "   ").await.unwrap_err();
        assert!(matches!(err, RsvpError::Validation(_)));
        assert_eq!(store.guest_count().await, 0);
    }
}
