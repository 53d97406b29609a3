//! Raw form bodies and the coercion rules that turn them into typed
//! commands.
//!
//! Every field arrives as an optional string. The rules here are the only
//! place numbers and yes/no answers are interpreted, so the RSVP form and the
//! admin edit form agree on them.

use rocket::FromForm;
use serde::Serialize;

use crate::error::RsvpError;
use crate::models::{Attending, GuestRsvp, NewFallbackRsvp};

pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Integer answers; anything that does not parse as a whole, including
/// `"3abc"`, counts as zero.
pub fn parse_count(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

/// Only the literal `"yes"` is true.
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw == Some("yes")
}

/// Trimmed message, empty when omitted.
pub fn parse_message(raw: Option<&str>) -> Result<String, RsvpError> {
    let message = raw.map(str::trim).unwrap_or_default();
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(RsvpError::validation(format!(
            "Messages are limited to {MAX_MESSAGE_CHARS} characters."
        )));
    }
    Ok(message.to_string())
}

fn non_blank(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// What a submission asks the workflow to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RsvpCommand {
    Guest { guest_id: String, rsvp: GuestRsvp },
    Fallback(NewFallbackRsvp),
}

/// `POST /rsvp` body. Carries both shapes; `guestId` picks the path.
#[derive(Debug, Clone, Default, FromForm, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpForm {
    #[field(name = "guestId")]
    pub guest_id: Option<String>,
    #[field(name = "guestName")]
    pub guest_name: Option<String>,
    #[field(name = "adultsAttending")]
    pub adults_attending: Option<String>,
    #[field(name = "attendingWedding")]
    pub attending_wedding: Option<String>,
    #[field(name = "attendingReception")]
    pub attending_reception: Option<String>,
    #[field(name = "usingHotelBlock")]
    pub using_hotel_block: Option<String>,
    pub message: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub attending: Option<String>,
    pub guests: Option<String>,
}

impl RsvpForm {
    pub fn to_command(&self) -> Result<RsvpCommand, RsvpError> {
        match non_blank(&self.guest_id) {
            Some(guest_id) => Ok(RsvpCommand::Guest {
                guest_id: guest_id.to_string(),
                rsvp: self.guest_rsvp()?,
            }),
            None => self.fallback().map(RsvpCommand::Fallback),
        }
    }

    fn guest_rsvp(&self) -> Result<GuestRsvp, RsvpError> {
        Ok(GuestRsvp {
            adults_attending: parse_count(self.adults_attending.as_deref()),
            attending_wedding: parse_flag(self.attending_wedding.as_deref()),
            attending_reception: parse_flag(self.attending_reception.as_deref()),
            using_hotel_block: parse_flag(self.using_hotel_block.as_deref()),
            message: parse_message(self.message.as_deref())?,
        })
    }

    fn fallback(&self) -> Result<NewFallbackRsvp, RsvpError> {
        let name = non_blank(&self.name)
            .ok_or_else(|| RsvpError::validation("Please enter your name."))?;
        let email = non_blank(&self.email)
            .ok_or_else(|| RsvpError::validation("Please enter your email address."))?
            .to_lowercase();
        let attending: Attending = non_blank(&self.attending)
            .and_then(|a| a.parse().ok())
            .ok_or_else(|| RsvpError::validation("Please let us know if you can attend."))?;
        let guests = match non_blank(&self.guests) {
            None => 0,
            Some(raw) => raw.parse().map_err(|_| {
                RsvpError::validation("Number of guests must be a whole number of zero or more.")
            })?,
        };

        Ok(NewFallbackRsvp {
            name: name.to_string(),
            email,
            attending,
            guests,
            message: parse_message(self.message.as_deref())?,
        })
    }
}

/// `POST /admin/edit/<id>` body. Missing fields take their coerced
/// defaults; nothing is carried over from the stored guest.
#[derive(Debug, Clone, Default, FromForm)]
pub struct GuestEditForm {
    #[field(name = "adultsAttending")]
    pub adults_attending: Option<String>,
    #[field(name = "attendingWedding")]
    pub attending_wedding: Option<String>,
    #[field(name = "attendingReception")]
    pub attending_reception: Option<String>,
    #[field(name = "usingHotelBlock")]
    pub using_hotel_block: Option<String>,
    pub message: Option<String>,
}

impl GuestEditForm {
    pub fn to_rsvp(&self) -> Result<GuestRsvp, RsvpError> {
        Ok(GuestRsvp {
            adults_attending: parse_count(self.adults_attending.as_deref()),
            attending_wedding: parse_flag(self.attending_wedding.as_deref()),
            attending_reception: parse_flag(self.attending_reception.as_deref()),
            using_hotel_block: parse_flag(self.using_hotel_block.as_deref()),
            message: parse_message(self.message.as_deref())?,
        })
    }
}

#[derive(Debug, FromForm)]
pub struct AdminLogin {
    pub password: String,
}

#[derive(Debug, FromForm)]
pub struct NewGuestForm {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback_form() -> RsvpForm {
        RsvpForm {
            name: Some("  Robin Park ".into()),
            email: Some(" Robin@Example.COM ".into()),
            attending: Some("maybe".into()),
            ..RsvpForm::default()
        }
    }

    #[test]
    fn adults_attending_coercion() {
        assert_eq!(parse_count(Some("3")), 3);
        assert_eq!(parse_count(Some(" 4 ")), 4);
        assert_eq!(parse_count(Some("abc")), 0);
        assert_eq!(parse_count(Some("-2")), 0);
        assert_eq!(parse_count(Some("3abc")), 0);
        assert_eq!(parse_count(Some("2.5")), 0);
        assert_eq!(parse_count(None), 0);
    }

    #[test]
    fn flags_are_true_only_for_yes() {
        assert!(parse_flag(Some("yes")));
        assert!(!parse_flag(Some("no")));
        assert!(!parse_flag(Some("true")));
        assert!(!parse_flag(Some("YES")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn message_defaults_to_empty_and_is_capped() {
        assert_eq!(parse_message(None).unwrap(), "");
        assert_eq!(parse_message(Some("  hi  ")).unwrap(), "hi");
        assert!(parse_message(Some(&"x".repeat(MAX_MESSAGE_CHARS))).is_ok());
        assert!(matches!(
            parse_message(Some(&"x".repeat(MAX_MESSAGE_CHARS + 1))),
            Err(RsvpError::Validation(_))
        ));
    }

    #[test]
    fn guest_id_selects_guest_path() {
        let form = RsvpForm {
            guest_id: Some("ABC123DEF456".into()),
            adults_attending: Some("2".into()),
            attending_wedding: Some("yes".into()),
            attending_reception: Some("no".into()),
            ..RsvpForm::default()
        };

        let command = form.to_command().unwrap();
        assert_eq!(
            command,
            RsvpCommand::Guest {
                guest_id: "ABC123DEF456".into(),
                rsvp: GuestRsvp {
                    adults_attending: 2,
                    attending_wedding: true,
                    attending_reception: false,
                    using_hotel_block: false,
                    message: String::new(),
                },
            }
        );
    }

    #[test]
    fn blank_guest_id_falls_back() {
        let form = RsvpForm {
            guest_id: Some("   ".into()),
            ..fallback_form()
        };
        assert!(matches!(form.to_command(), Ok(RsvpCommand::Fallback(_))));
    }

    #[test]
    fn fallback_normalizes_contact_details() {
        let RsvpCommand::Fallback(rsvp) = fallback_form().to_command().unwrap() else {
            panic!("expected a fallback command");
        };
        assert_eq!(rsvp.name, "Robin Park");
        assert_eq!(rsvp.email, "robin@example.com");
        assert_eq!(rsvp.attending, Attending::Maybe);
        assert_eq!(rsvp.guests, 0);
        assert_eq!(rsvp.message, "");
    }

    #[test]
    fn fallback_rejects_bad_answers() {
        let missing_email = RsvpForm {
            email: None,
            ..fallback_form()
        };
        assert!(missing_email.to_command().is_err());

        let odd_answer = RsvpForm {
            attending: Some("perhaps".into()),
            ..fallback_form()
        };
        assert!(odd_answer.to_command().is_err());

        let negative_guests = RsvpForm {
            guests: Some("-1".into()),
            ..fallback_form()
        };
        assert!(negative_guests.to_command().is_err());
    }

    #[test]
    fn edit_form_resets_omitted_fields() {
        let form = GuestEditForm {
            adults_attending: Some("5".into()),
            ..GuestEditForm::default()
        };
        let rsvp = form.to_rsvp().unwrap();
        assert_eq!(rsvp.adults_attending, 5);
        assert!(!rsvp.attending_wedding);
        assert!(!rsvp.attending_reception);
        assert!(!rsvp.using_hotel_block);
        assert_eq!(rsvp.message, "");
    }
}
