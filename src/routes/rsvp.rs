use rocket::form::Form;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use rocket_dyn_templates::{context, Template};

use crate::config::AppConfig;
use crate::directory::{self, GuestMatch};
use crate::error::RsvpError;
use crate::forms::RsvpForm;
use crate::notify::Notifier;
use crate::store::Records;
use crate::workflow::{self, Confirmation};

#[get("/rsvp")]
pub fn form(config: &State<AppConfig>) -> Template {
    Template::render("rsvp", context! {
        site: config.site(),
        title: "RSVP",
        values: RsvpForm::default(),
    })
}

#[get("/rsvp/search-guests?<q>")]
pub async fn search_guests(
    q: Option<&str>,
    records: &State<Records>,
) -> Result<Json<Vec<GuestMatch>>, Status> {
    match directory::search_guests(records.store(), q.unwrap_or_default()).await {
        Ok(matches) => Ok(Json(matches)),
        Err(e) => {
            tracing::error!(error = %e, "guest search failed");
            Err(Status::InternalServerError)
        }
    }
}

#[post("/rsvp", data = "<form>")]
pub async fn submit(
    form: Form<RsvpForm>,
    config: &State<AppConfig>,
    records: &State<Records>,
    notifier: &State<Notifier>,
) -> Result<Template, status::Custom<Template>> {
    let values = form.into_inner();
    let outcome = match values.to_command() {
        Ok(command) => workflow::submit_rsvp(records.store(), command).await,
        Err(e) => Err(e),
    };

    let confirmation = match outcome {
        Ok(confirmation) => confirmation,
        Err(err) => {
            if let RsvpError::Persistence(_) = err {
                tracing::error!(error = %err, "rsvp not saved");
            } else {
                tracing::info!(error = %err, "rsvp rejected");
            }
            let page = Template::render("rsvp", context! {
                site: config.site(),
                title: "RSVP",
                error: err.user_message(),
                values: &values,
            });
            return Err(status::Custom(err.status(), page));
        }
    };

    notifier.rsvp_received(&confirmation).await;

    let is_update = confirmation.is_update();
    let page = match confirmation {
        Confirmation::Guest { guest, .. } => Template::render("rsvp-success", context! {
            site: config.site(),
            title: "RSVP Received",
            is_update: is_update,
            guest: guest,
        }),
        Confirmation::Fallback { rsvp } => Template::render("rsvp-success", context! {
            site: config.site(),
            title: "RSVP Received",
            is_update: is_update,
            doc: rsvp,
        }),
    };
    Ok(page)
}
