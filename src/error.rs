use rocket::http::Status;
use thiserror::Error;

use crate::store::StoreError;

/// Failures of the RSVP workflow and the admin mutations built on it.
#[derive(Error, Debug)]
pub enum RsvpError {
    #[error("guest not found")]
    GuestNotFound,

    #[error("an RSVP already exists for this name or email")]
    Duplicate,

    #[error("{0}")]
    Validation(String),

    #[error("record store failure: {0}")]
    Persistence(StoreError),
}

impl RsvpError {
    pub fn validation(message: impl Into<String>) -> Self {
        RsvpError::Validation(message.into())
    }

    /// Text shown next to the re-filled form. Store failures stay generic.
    pub fn user_message(&self) -> String {
        match self {
            RsvpError::GuestNotFound => {
                "We couldn't find that guest. Please search for your name again.".to_string()
            }
            RsvpError::Duplicate => "It looks like we already have an RSVP for you. \
                 Please contact us directly if you need to make changes."
                .to_string(),
            RsvpError::Validation(msg) => msg.clone(),
            RsvpError::Persistence(_) => "Please check your input and try again.".to_string(),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            RsvpError::GuestNotFound | RsvpError::Validation(_) => Status::BadRequest,
            RsvpError::Duplicate => Status::Conflict,
            RsvpError::Persistence(_) => Status::InternalServerError,
        }
    }
}

impl From<StoreError> for RsvpError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation => RsvpError::Duplicate,
            other => RsvpError::Persistence(other),
        }
    }
}
