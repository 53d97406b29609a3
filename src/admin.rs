//! Admin review: the password gate, the RSVP overview with its totals, and
//! edits to guest records.

use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::time::Duration;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::RsvpError;
use crate::models::{FallbackRsvp, Guest, GuestRsvp};
use crate::store::{RecordStore, StoreResult};

pub const SESSION_COOKIE: &str = "admin_session";
const SESSION_VALUE: &str = "admin";

/// Proof that the request carries a valid admin session cookie.
///
/// The cookie is private, so it is both signed and encrypted with the
/// Rocket secret key. Without it the guard forwards, and the catch-all admin
/// routes send the browser back to the login form.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminSession {
    type Error = std::convert::Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.cookies().get_private(SESSION_COOKIE) {
            Some(cookie) if cookie.value() == SESSION_VALUE => Outcome::Success(AdminSession),
            _ => Outcome::Forward(Status::Unauthorized),
        }
    }
}

impl AdminSession {
    pub fn start(cookies: &CookieJar<'_>) -> Self {
        let cookie = Cookie::build((SESSION_COOKIE, SESSION_VALUE))
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(Duration::days(1));
        cookies.add_private(cookie);
        AdminSession
    }

    pub fn end(cookies: &CookieJar<'_>) {
        cookies.remove_private(SESSION_COOKIE);
    }
}

/// Compares SHA-256 digests, so timing does not track how much of the
/// password matched.
pub fn password_matches(expected: &str, supplied: &str) -> bool {
    Sha256::digest(expected.as_bytes()) == Sha256::digest(supplied.as_bytes())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_attending: u64,
    pub wedding_attendees: usize,
    pub reception_attendees: usize,
    pub hotel_block_users: usize,
}

impl DashboardStats {
    pub fn from_guests(guests: &[Guest]) -> Self {
        DashboardStats {
            total_attending: guests.iter().map(|g| u64::from(g.adults_attending)).sum(),
            wedding_attendees: guests.iter().filter(|g| g.attending_wedding).count(),
            reception_attendees: guests.iter().filter(|g| g.attending_reception).count(),
            hotel_block_users: guests.iter().filter(|g| g.using_hotel_block).count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub guest_rsvps: Vec<Guest>,
    pub fallback_rsvps: Vec<FallbackRsvp>,
    pub stats: DashboardStats,
}

/// Everything the dashboard shows, read fresh on every view.
pub async fn overview(store: &dyn RecordStore) -> StoreResult<Overview> {
    let guest_rsvps = store.submitted_guests().await?;
    let fallback_rsvps = store.fallback_rsvps().await?;
    let stats = DashboardStats::from_guests(&guest_rsvps);
    Ok(Overview {
        guest_rsvps,
        fallback_rsvps,
        stats,
    })
}

/// Overwrites all five RSVP fields. Leaves `rsvp_submitted` alone.
pub async fn edit_guest(
    store: &dyn RecordStore,
    id: &str,
    rsvp: &GuestRsvp,
) -> Result<Guest, RsvpError> {
    let guest = store
        .update_guest(id, rsvp, false)
        .await?
        .ok_or(RsvpError::GuestNotFound)?;
    tracing::info!(guest_id = %guest.id, "guest rsvp edited by admin");
    Ok(guest)
}

pub async fn delete_guest(store: &dyn RecordStore, id: &str) -> StoreResult<bool> {
    let removed = store.delete_guest(id).await?;
    if removed {
        tracing::info!(guest_id = id, "guest deleted by admin");
    }
    Ok(removed)
}
