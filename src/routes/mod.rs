use rocket::{catchers, routes, Catcher, Route};

pub mod admin;
pub mod pages;
pub mod rsvp;

pub fn all() -> Vec<Route> {
    routes![
        pages::home,
        pages::our_story,
        pages::ceremony,
        pages::event_schedule,
        pages::faq,
        pages::registry,
        pages::wedding_gallery,
        pages::proposal_gallery,
        pages::gallery_images,
        rsvp::form,
        rsvp::search_guests,
        rsvp::submit,
        admin::login_form,
        admin::login,
        admin::dashboard,
        admin::edit_form,
        admin::edit,
        admin::delete,
        admin::add_form,
        admin::add,
        admin::logout,
        admin::login_redirect,
        admin::login_redirect_post,
    ]
}

pub fn catchers() -> Vec<Catcher> {
    catchers![pages::not_found, pages::internal_error]
}
