use std::net::IpAddr;

use rocket::form::Form;
use rocket::http::{CookieJar, Status};
use rocket::response::{status, Redirect};
use rocket::{get, post, uri, State};
use rocket_dyn_templates::{context, Template};

use crate::admin::{self, AdminSession};
use crate::config::AppConfig;
use crate::directory;
use crate::error::RsvpError;
use crate::forms::{AdminLogin, GuestEditForm, NewGuestForm};
use crate::store::Records;
use crate::throttle::LoginThrottle;

fn login_page(config: &AppConfig, error: Option<&str>) -> Template {
    Template::render("admin-login", context! {
        site: config.site(),
        title: "Admin Login",
        error: error,
    })
}

#[get("/admin")]
pub fn login_form(config: &State<AppConfig>) -> Template {
    login_page(config, None)
}

#[post("/admin", data = "<login>")]
pub async fn login(
    login: Form<AdminLogin>,
    cookies: &CookieJar<'_>,
    config: &State<AppConfig>,
    throttle: &State<LoginThrottle>,
    client_ip: Option<IpAddr>,
) -> Result<Redirect, status::Custom<Template>> {
    if throttle.is_blocked(client_ip).await {
        let page = Template::render("slowdown", context! {
            site: config.site(),
            title: "Slow down",
        });
        return Err(status::Custom(Status::TooManyRequests, page));
    }

    if !admin::password_matches(&config.admin_password, &login.password) {
        throttle.record_failure(client_ip).await;
        let page = login_page(config, Some("Incorrect password. Please try again."));
        return Err(status::Custom(Status::Ok, page));
    }

    throttle.clear(client_ip).await;
    AdminSession::start(cookies);
    tracing::info!("admin logged in");
    Ok(Redirect::to(uri!("/admin/dashboard")))
}

#[get("/admin/dashboard")]
pub async fn dashboard(
    _session: AdminSession,
    config: &State<AppConfig>,
    records: &State<Records>,
) -> Result<Template, Status> {
    let overview = admin::overview(records.store()).await.map_err(|e| {
        tracing::error!(error = %e, "failed to load admin dashboard");
        Status::InternalServerError
    })?;

    Ok(Template::render("admin-dashboard", context! {
        site: config.site(),
        title: "RSVP Admin Dashboard",
        guest_rsvps: overview.guest_rsvps,
        fallback_rsvps: overview.fallback_rsvps,
        total_attending: overview.stats.total_attending,
        wedding_attendees: overview.stats.wedding_attendees,
        reception_attendees: overview.stats.reception_attendees,
        hotel_block_users: overview.stats.hotel_block_users,
    }))
}

#[get("/admin/edit/<id>")]
pub async fn edit_form(
    _session: AdminSession,
    id: &str,
    config: &State<AppConfig>,
    records: &State<Records>,
) -> Result<Template, Status> {
    let guest = directory::find_guest(records.store(), id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, guest_id = id, "failed to load guest");
            Status::InternalServerError
        })?
        .ok_or(Status::NotFound)?;

    Ok(Template::render("admin-edit", context! {
        site: config.site(),
        title: "Edit RSVP Entry",
        guest: guest,
    }))
}

#[post("/admin/edit/<id>", data = "<edit>")]
pub async fn edit(
    _session: AdminSession,
    id: &str,
    edit: Form<GuestEditForm>,
    config: &State<AppConfig>,
    records: &State<Records>,
) -> Result<Redirect, status::Custom<Template>> {
    let outcome = match edit.to_rsvp() {
        Ok(rsvp) => admin::edit_guest(records.store(), id, &rsvp).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(_) => Ok(Redirect::to(uri!("/admin/dashboard"))),
        Err(err) => {
            tracing::warn!(error = %err, guest_id = id, "admin edit failed");
            let status = match err {
                RsvpError::GuestNotFound => Status::NotFound,
                _ => err.status(),
            };
            let page = Template::render("error", context! {
                site: config.site(),
                title: "Could not save changes",
                message: err.user_message(),
            });
            Err(status::Custom(status, page))
        }
    }
}

#[post("/admin/delete/<id>")]
pub async fn delete(
    _session: AdminSession,
    id: &str,
    records: &State<Records>,
) -> Result<Redirect, Status> {
    admin::delete_guest(records.store(), id).await.map_err(|e| {
        tracing::error!(error = %e, guest_id = id, "failed to delete guest");
        Status::InternalServerError
    })?;
    Ok(Redirect::to(uri!("/admin/dashboard")))
}

#[get("/admin/add")]
pub fn add_form(_session: AdminSession, config: &State<AppConfig>) -> Template {
    Template::render("admin-add", context! {
        site: config.site(),
        title: "Add Guest",
    })
}

#[post("/admin/add", data = "<guest>")]
pub async fn add(
    _session: AdminSession,
    guest: Form<NewGuestForm>,
    config: &State<AppConfig>,
    records: &State<Records>,
) -> Result<Redirect, status::Custom<Template>> {
    match directory::register_guest(records.store(), &guest.name).await {
        Ok(_) => Ok(Redirect::to(uri!("/admin/dashboard"))),
        Err(err) => {
            tracing::warn!(error = %err, "failed to add guest");
            let page = Template::render("admin-add", context! {
                site: config.site(),
                title: "Add Guest",
                error: err.user_message(),
                name: &guest.name,
            });
            Err(status::Custom(err.status(), page))
        }
    }
}

#[post("/admin/logout")]
pub fn logout(_session: AdminSession, cookies: &CookieJar<'_>) -> Redirect {
    AdminSession::end(cookies);
    Redirect::to(uri!("/admin"))
}

/// Reached when an admin route's session guard forwards.
#[get("/admin/<_..>", rank = 20)]
pub fn login_redirect() -> Redirect {
    Redirect::to(uri!("/admin"))
}

#[post("/admin/<_..>", rank = 20)]
pub fn login_redirect_post() -> Redirect {
    Redirect::to(uri!("/admin"))
}
