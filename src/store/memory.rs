use chrono::Utc;
use rocket::tokio::sync::Mutex;

use super::{RecordStore, StoreError, StoreResult};
use crate::models::{FallbackRsvp, Guest, GuestRsvp};

/// Keeps everything in process memory. Used for local development when no
/// database is configured, and by the tests.
#[derive(Default)]
pub struct MemoryStore {
    guests: Mutex<Vec<Guest>>,
    fallbacks: Mutex<Vec<FallbackRsvp>>,
}

impl MemoryStore {
    pub fn with_guests(guests: Vec<Guest>) -> Self {
        MemoryStore {
            guests: Mutex::new(guests),
            fallbacks: Mutex::default(),
        }
    }

    pub async fn guest_count(&self) -> usize {
        self.guests.lock().await.len()
    }

    pub async fn fallback_count(&self) -> usize {
        self.fallbacks.lock().await.len()
    }
}

fn by_name<T>(rows: &mut [T], name: impl Fn(&T) -> &str) {
    rows.sort_by_cached_key(|row| name(row).to_lowercase());
}

#[rocket::async_trait]
impl RecordStore for MemoryStore {
    async fn search_guests(&self, needle: &str, limit: usize) -> StoreResult<Vec<Guest>> {
        let needle = needle.to_lowercase();
        let mut found: Vec<Guest> = self
            .guests
            .lock()
            .await
            .iter()
            .filter(|g| g.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        by_name(&mut found, |g| g.name.as_str());
        found.truncate(limit);
        Ok(found)
    }

    async fn find_guest(&self, id: &str) -> StoreResult<Option<Guest>> {
        let guests = self.guests.lock().await;
        Ok(guests.iter().find(|g| g.id == id).cloned())
    }

    async fn insert_guest(&self, guest: &Guest) -> StoreResult<()> {
        let mut guests = self.guests.lock().await;
        if guests.iter().any(|g| g.id == guest.id) {
            return Err(StoreError::UniqueViolation);
        }
        guests.push(guest.clone());
        Ok(())
    }

    async fn update_guest(
        &self,
        id: &str,
        rsvp: &GuestRsvp,
        submitted: bool,
    ) -> StoreResult<Option<Guest>> {
        let mut guests = self.guests.lock().await;
        let Some(guest) = guests.iter_mut().find(|g| g.id == id) else {
            return Ok(None);
        };
        guest.apply(rsvp);
        if submitted {
            guest.rsvp_submitted = true;
        }
        guest.updated_at = Utc::now().naive_utc();
        Ok(Some(guest.clone()))
    }

    async fn delete_guest(&self, id: &str) -> StoreResult<bool> {
        let mut guests = self.guests.lock().await;
        let before = guests.len();
        guests.retain(|g| g.id != id);
        Ok(guests.len() != before)
    }

    async fn delete_all_guests(&self) -> StoreResult<usize> {
        let mut guests = self.guests.lock().await;
        let removed = guests.len();
        guests.clear();
        Ok(removed)
    }

    async fn submitted_guests(&self) -> StoreResult<Vec<Guest>> {
        let mut submitted: Vec<Guest> = self
            .guests
            .lock()
            .await
            .iter()
            .filter(|g| g.rsvp_submitted)
            .cloned()
            .collect();
        by_name(&mut submitted, |g| g.name.as_str());
        Ok(submitted)
    }

    async fn fallback_exists(&self, email: &str, name: &str) -> StoreResult<bool> {
        let name = name.to_lowercase();
        let fallbacks = self.fallbacks.lock().await;
        Ok(fallbacks
            .iter()
            .any(|r| r.email == email || r.name.to_lowercase() == name))
    }

    async fn insert_fallback(&self, rsvp: &FallbackRsvp) -> StoreResult<()> {
        let name = rsvp.name.to_lowercase();
        let mut fallbacks = self.fallbacks.lock().await;
        let taken = fallbacks
            .iter()
            .any(|r| r.id == rsvp.id || r.email == rsvp.email || r.name.to_lowercase() == name);
        if taken {
            return Err(StoreError::UniqueViolation);
        }
        fallbacks.push(rsvp.clone());
        Ok(())
    }

    async fn fallback_rsvps(&self) -> StoreResult<Vec<FallbackRsvp>> {
        let mut all = self.fallbacks.lock().await.clone();
        by_name(&mut all, |r| r.name.as_str());
        Ok(all)
    }
}
