use rocket::http::Status;
use rocket::serde::json::{json, Json, Value};
use rocket::{catch, get, Request, State};
use rocket_dyn_templates::{context, Template};

use crate::config::AppConfig;
use crate::gallery::{self, Gallery};

fn page(config: &AppConfig, name: &'static str, title: &str) -> Template {
    Template::render(name, context! {
        site: config.site(),
        title: title,
    })
}

#[get("/")]
pub fn home(config: &State<AppConfig>) -> Template {
    page(config, "home", "Home")
}

#[get("/our-story")]
pub fn our_story(config: &State<AppConfig>) -> Template {
    page(config, "our-story", "Our Story")
}

#[get("/ceremony")]
pub fn ceremony(config: &State<AppConfig>) -> Template {
    page(config, "ceremony", "Ceremony")
}

#[get("/event-schedule")]
pub fn event_schedule(config: &State<AppConfig>) -> Template {
    page(config, "event-schedule", "Event Schedule")
}

async fn background_page(
    config: &AppConfig,
    name: &'static str,
    title: &str,
    stem: &str,
) -> Template {
    let directory = format!("images/gallery/{stem}");
    let background = gallery::page_background(&config.public_dir, &directory, stem).await;
    let body_class = match background {
        Some(_) => format!("page-{stem}-bg"),
        None => String::new(),
    };
    Template::render(name, context! {
        site: config.site(),
        title: title,
        body_class: body_class,
        background: background,
    })
}

#[get("/faq")]
pub async fn faq(config: &State<AppConfig>) -> Template {
    background_page(config, "faq", "FAQ", "faq").await
}

#[get("/registry")]
pub async fn registry(config: &State<AppConfig>) -> Template {
    background_page(config, "registry", "Registry", "registry").await
}

async fn gallery_page(config: &AppConfig, gallery: &Gallery) -> Template {
    let listing = gallery::list(&config.public_dir, gallery).await;
    Template::render("gallery", context! {
        site: config.site(),
        title: gallery.title,
        body_class: gallery.body_class,
        images: listing.images,
        background: listing.background,
    })
}

#[get("/gallery")]
pub async fn wedding_gallery(config: &State<AppConfig>) -> Template {
    gallery_page(config, &gallery::GALLERIES[0]).await
}

#[get("/proposal-gallery")]
pub async fn proposal_gallery(config: &State<AppConfig>) -> Template {
    gallery_page(config, &gallery::GALLERIES[1]).await
}

/// Image list for client-side gallery rendering.
#[get("/api/gallery?<gallery>")]
pub async fn gallery_images(
    gallery: Option<&str>,
    config: &State<AppConfig>,
) -> Result<Json<Value>, (Status, Json<Value>)> {
    let Some(gallery) = gallery.and_then(gallery::find) else {
        return Err((
            Status::BadRequest,
            Json(json!({ "error": "Invalid gallery type" })),
        ));
    };
    let listing = gallery::list(&config.public_dir, gallery).await;
    Ok(Json(json!({ "images": listing.images })))
}

#[catch(404)]
pub fn not_found(req: &Request<'_>) -> Template {
    let site = req.rocket().state::<AppConfig>().map(AppConfig::site);
    Template::render("error", context! {
        site: site,
        title: "Not Found",
        message: "We couldn't find that page.",
    })
}

#[catch(500)]
pub fn internal_error(req: &Request<'_>) -> Template {
    let site = req.rocket().state::<AppConfig>().map(AppConfig::site);
    Template::render("error", context! {
        site: site,
        title: "Something went wrong",
        message: "Something went wrong on our side. Please try again in a moment.",
    })
}
