//! Persistence for guests and fallback RSVPs.
//!
//! Handlers reach the store through [`Records`], which Rocket manages as
//! state. The MySQL implementation is used whenever `databases.rsvp` is
//! configured; otherwise the site runs on [`MemoryStore`].

use std::ops::Deref;
use std::sync::Arc;

use thiserror::Error;

use crate::models::{FallbackRsvp, Guest, GuestRsvp};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MysqlStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("query failed: {0}")]
    Query(diesel::result::Error),

    #[error("connection pool: {0}")]
    Pool(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                StoreError::UniqueViolation
            }
            other => StoreError::Query(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[rocket::async_trait]
pub trait RecordStore: Send + Sync {
    /// Guests whose name contains `needle`, ignoring case, ordered by name.
    async fn search_guests(&self, needle: &str, limit: usize) -> StoreResult<Vec<Guest>>;

    async fn find_guest(&self, id: &str) -> StoreResult<Option<Guest>>;

    async fn insert_guest(&self, guest: &Guest) -> StoreResult<()>;

    /// Overwrites the RSVP fields of a guest and returns the stored row, or
    /// `None` when the id does not resolve. `submitted` also raises the
    /// `rsvp_submitted` flag.
    async fn update_guest(
        &self,
        id: &str,
        rsvp: &GuestRsvp,
        submitted: bool,
    ) -> StoreResult<Option<Guest>>;

    /// Returns whether a row was removed.
    async fn delete_guest(&self, id: &str) -> StoreResult<bool>;

    async fn delete_all_guests(&self) -> StoreResult<usize>;

    /// Guests that have responded, ordered by name.
    async fn submitted_guests(&self) -> StoreResult<Vec<Guest>>;

    /// Whether a fallback RSVP already uses `email`, or `name` compared
    /// case-insensitively.
    async fn fallback_exists(&self, email: &str, name: &str) -> StoreResult<bool>;

    /// Fails with [`StoreError::UniqueViolation`] when the email or name is
    /// already taken.
    async fn insert_fallback(&self, rsvp: &FallbackRsvp) -> StoreResult<()>;

    /// All fallback RSVPs, ordered by name.
    async fn fallback_rsvps(&self) -> StoreResult<Vec<FallbackRsvp>>;
}

/// Shared handle to whichever store the site was launched with.
#[derive(Clone)]
pub struct Records(Arc<dyn RecordStore>);

impl Records {
    pub fn new(store: impl RecordStore + 'static) -> Self {
        Records(Arc::new(store))
    }

    pub fn shared(store: Arc<dyn RecordStore>) -> Self {
        Records(store)
    }

    /// The store as a trait object, for handlers holding `&State<Records>`.
    pub fn store(&self) -> &dyn RecordStore {
        self.0.as_ref()
    }
}

impl Deref for Records {
    type Target = dyn RecordStore;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
