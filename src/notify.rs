//! Email to the couple whenever an RSVP comes in.
//!
//! Delivery problems are logged and swallowed; a guest's RSVP is already
//! saved by the time we try to send.

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Mailboxes};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::SmtpConfig;
use crate::workflow::Confirmation;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("email build error: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("no recipients configured")]
    NoRecipients,
}

struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailboxes,
}

/// Sends RSVP notifications when SMTP is configured; does nothing otherwise.
pub struct Notifier {
    mailer: Option<Mailer>,
}

impl Notifier {
    pub fn disabled() -> Self {
        Notifier { mailer: None }
    }

    pub fn from_config(config: Option<&SmtpConfig>) -> Result<Self, NotifyError> {
        let Some(config) = config else {
            return Ok(Notifier::disabled());
        };

        let to: Mailboxes = config.notify.parse()?;
        if to.iter().next().is_none() {
            return Err(NotifyError::NoRecipients);
        }

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .timeout(Some(SEND_TIMEOUT));
        if let (Some(user), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(Notifier {
            mailer: Some(Mailer {
                transport: builder.build(),
                from: config.from.parse()?,
                to,
            }),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    pub async fn rsvp_received(&self, confirmation: &Confirmation) {
        let Some(mailer) = &self.mailer else {
            tracing::debug!("smtp not configured, skipping rsvp notification");
            return;
        };

        match mailer.send(confirmation).await {
            Ok(()) => tracing::info!(name = confirmation.name(), "rsvp notification sent"),
            Err(e) => tracing::error!(error = %e, "could not send rsvp notification"),
        }
    }
}

impl Mailer {
    async fn send(&self, confirmation: &Confirmation) -> Result<(), NotifyError> {
        let (subject, body) = compose(confirmation);
        let email = Message::builder()
            .mailbox(lettre::message::header::To::from(self.to.clone()))
            .from(self.from.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;
        self.transport.send(email).await?;
        Ok(())
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Subject and plain-text body for one confirmation.
pub fn compose(confirmation: &Confirmation) -> (String, String) {
    match confirmation {
        Confirmation::Guest { guest, is_update } => {
            let verb = if *is_update { "updated" } else { "sent" };
            let subject = format!("{} has {} their RSVP", guest.name, verb);
            let mut body = format!(
                "{} has {} their RSVP.\n\
                 Adults attending: {}\n\
                 Wedding: {}\n\
                 Reception: {}\n\
                 Hotel block: {}\n",
                guest.name,
                verb,
                guest.adults_attending,
                yes_no(guest.attending_wedding),
                yes_no(guest.attending_reception),
                yes_no(guest.using_hotel_block),
            );
            if !guest.message.is_empty() {
                body.push_str(&format!("Message: {}\n", guest.message));
            }
            (subject, body)
        }
        Confirmation::Fallback { rsvp } => {
            let subject = format!("{} sent an RSVP (not on the guest list)", rsvp.name);
            let mut body = format!(
                "{} <{}> was not found on the guest list and RSVP'd directly.\n\
                 Attending: {}\n\
                 Guests: {}\n",
                rsvp.name, rsvp.email, rsvp.attending, rsvp.guests,
            );
            if !rsvp.message.is_empty() {
                body.push_str(&format!("Message: {}\n", rsvp.message));
            }
            (subject, body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attending, FallbackRsvp, Guest};
    use chrono::Utc;

    #[test]
    fn guest_update_mentions_update() {
        let mut guest = Guest::new("ABC".into(), "Nguyen Family".into(), Utc::now().naive_utc());
        guest.adults_attending = 4;
        guest.attending_wedding = true;

        let (subject, body) = compose(&Confirmation::Guest {
            guest,
            is_update: true,
        });
        assert_eq!(subject, "Nguyen Family has updated their RSVP");
        assert!(body.contains("Adults attending: 4"));
        assert!(body.contains("Wedding: yes"));
        assert!(body.contains("Reception: no"));
        assert!(!body.contains("Message:"));
    }

    #[test]
    fn fallback_includes_contact_details() {
        let now = Utc::now().naive_utc();
        let rsvp = FallbackRsvp {
            id: "F".into(),
            name: "Jo March".into(),
            email: "jo@example.com".into(),
            attending: Attending::Maybe,
            guests: 1,
            message: "Can't wait".into(),
            created_at: now,
            updated_at: now,
        };

        let (subject, body) = compose(&Confirmation::Fallback { rsvp });
        assert!(subject.starts_with("Jo March"));
        assert!(body.contains("<jo@example.com>"));
        assert!(body.contains("Attending: maybe"));
        assert!(body.contains("Message: Can't wait"));
    }

    #[test]
    fn missing_smtp_config_disables_mail() {
        let notifier = Notifier::from_config(None).unwrap();
        assert!(!notifier.is_enabled());
    }
}
