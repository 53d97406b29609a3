//! RSVP submission: updates a known guest in place, or records a fallback
//! RSVP for someone who is not on the guest list.

use chrono::Utc;

use crate::directory::generate_code;
use crate::error::RsvpError;
use crate::forms::RsvpCommand;
use crate::models::{FallbackRsvp, Guest};
use crate::store::RecordStore;

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Guest { guest: Guest, is_update: bool },
    Fallback { rsvp: FallbackRsvp },
}

impl Confirmation {
    /// Whether this guest already had an RSVP on file. Always false for
    /// fallback RSVPs.
    pub fn is_update(&self) -> bool {
        match self {
            Confirmation::Guest { is_update, .. } => *is_update,
            Confirmation::Fallback { .. } => false,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Confirmation::Guest { guest, .. } => &guest.name,
            Confirmation::Fallback { rsvp } => &rsvp.name,
        }
    }
}

pub async fn submit_rsvp(
    store: &dyn RecordStore,
    command: RsvpCommand,
) -> Result<Confirmation, RsvpError> {
    match command {
        RsvpCommand::Guest { guest_id, rsvp } => {
            let previous = store
                .find_guest(&guest_id)
                .await?
                .ok_or(RsvpError::GuestNotFound)?;

            let guest = store
                .update_guest(&guest_id, &rsvp, true)
                .await?
                .ok_or(RsvpError::GuestNotFound)?;

            let is_update = previous.rsvp_submitted;
            tracing::info!(guest_id = %guest.id, is_update, "guest rsvp saved");
            Ok(Confirmation::Guest { guest, is_update })
        }
        RsvpCommand::Fallback(new) => {
            // The unique indexes still catch two submissions racing past
            // this check.
            if store.fallback_exists(&new.email, &new.name).await? {
                tracing::info!(email = %new.email, "duplicate fallback rsvp rejected");
                return Err(RsvpError::Duplicate);
            }

            let rsvp = new.into_record(generate_code(), Utc::now().naive_utc());
            store.insert_fallback(&rsvp).await?;
            tracing::info!(rsvp_id = %rsvp.id, attending = %rsvp.attending, "fallback rsvp saved");
            Ok(Confirmation::Fallback { rsvp })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::register_guest;
    use crate::models::{Attending, GuestRsvp, NewFallbackRsvp};
    use crate::store::MemoryStore;

    fn rsvp(adults: u32) -> GuestRsvp {
        GuestRsvp {
            adults_attending: adults,
            attending_wedding: true,
            ..GuestRsvp::default()
        }
    }

    fn fallback(name: &str, email: &str) -> RsvpCommand {
        RsvpCommand::Fallback(NewFallbackRsvp {
            name: name.into(),
            email: email.into(),
            attending: Attending::Yes,
            guests: 2,
            message: String::new(),
        })
    }

    #[rocket::async_test]
    async fn second_guest_submission_is_an_update() {
        let store = MemoryStore::default();
        let guest = register_guest(&store, "Lopez Family").await.unwrap();

        let first = submit_rsvp(
            &store,
            RsvpCommand::Guest {
                guest_id: guest.id.clone(),
                rsvp: rsvp(2),
            },
        )
        .await
        .unwrap();
        assert!(!first.is_update());

        let second = submit_rsvp(
            &store,
            RsvpCommand::Guest {
                guest_id: guest.id.clone(),
                rsvp: rsvp(3),
            },
        )
        .await
        .unwrap();
        assert!(second.is_update());
        assert_eq!(store.guest_count().await, 1);

        let stored = store.find_guest(&guest.id).await.unwrap().unwrap();
        assert!(stored.rsvp_submitted);
        assert_eq!(stored.adults_attending, 3);
    }

    #[rocket::async_test]
    async fn unknown_guest_id_is_rejected() {
        let store = MemoryStore::default();
        let err = submit_rsvp(
            &store,
            RsvpCommand::Guest {
                guest_id: "MISSING00000".into(),
                rsvp: rsvp(1),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RsvpError::GuestNotFound));
        assert_eq!(store.guest_count().await, 0);
    }

    #[rocket::async_test]
    async fn fallback_is_created_once() {
        let store = MemoryStore::default();

        let created = submit_rsvp(&store, fallback("Kim Tran", "kim@example.com"))
            .await
            .unwrap();
        assert!(!created.is_update());

        let same_email = submit_rsvp(&store, fallback("Someone Else", "kim@example.com")).await;
        assert!(matches!(same_email, Err(RsvpError::Duplicate)));

        let same_name = submit_rsvp(&store, fallback("KIM TRAN", "other@example.com")).await;
        assert!(matches!(same_name, Err(RsvpError::Duplicate)));

        assert_eq!(store.fallback_count().await, 1);
    }

    #[rocket::async_test]
    async fn fallback_never_touches_guests() {
        let store = MemoryStore::default();
        let guest = register_guest(&store, "Kim Tran").await.unwrap();

        submit_rsvp(&store, fallback("Kim Tran", "kim@example.com"))
            .await
            .unwrap();

        let stored = store.find_guest(&guest.id).await.unwrap().unwrap();
        assert!(!stored.rsvp_submitted);
        assert_eq!(store.fallback_count().await, 1);
    }
}
