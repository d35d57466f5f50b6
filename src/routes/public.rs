use std::net::IpAddr;
use std::sync::Arc;

use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::render;
use crate::config::AppConfig;
use crate::contact::{self, Submission};
use crate::db::Db;
use crate::email::Mailer;
use crate::models::event::Event;
use crate::models::gallery::GalleryPhoto;
use crate::models::work::Work;
use crate::security::BotCheck;

/// Events shown on the homepage.
const HOMEPAGE_EVENTS: i64 = 3;

// ── Homepage ───────────────────────────────────────────

#[get("/")]
pub fn index(db: Db, config: &State<AppConfig>, flash: Option<FlashMessage<'_>>) -> Template {
    let context = json!({
        "page": "home",
        "events": Event::list(&db, Some(HOMEPAGE_EVENTS)),
        "gallery": GalleryPhoto::list(&db),
    });
    render("public/index", config, flash, context)
}

#[get("/bio")]
pub fn bio(config: &State<AppConfig>, flash: Option<FlashMessage<'_>>) -> Template {
    render("public/bio", config, flash, json!({ "page": "bio" }))
}

// ── Works & events ─────────────────────────────────────

#[get("/works")]
pub fn works(db: Db, config: &State<AppConfig>, flash: Option<FlashMessage<'_>>) -> Template {
    let context = json!({
        "page": "works",
        "works": Work::list_with_videos(&db),
    });
    render("public/works", config, flash, context)
}

#[get("/events")]
pub fn events(db: Db, config: &State<AppConfig>, flash: Option<FlashMessage<'_>>) -> Template {
    let context = json!({
        "page": "events",
        "events": Event::list(&db, None),
    });
    render("public/events", config, flash, context)
}

// ── Contact ────────────────────────────────────────────

#[get("/contact")]
pub fn contact_page(config: &State<AppConfig>, flash: Option<FlashMessage<'_>>) -> Template {
    let context = json!({
        "page": "contact",
        "turnstile_site_key": config.turnstile_site_key,
    });
    render("public/contact", config, flash, context)
}

#[derive(Debug, FromForm)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    #[field(name = "cf-turnstile-response")]
    pub token: Option<String>,
}

#[post("/contact", data = "<form>")]
pub async fn contact_submit(
    db: Db,
    config: &State<AppConfig>,
    bot: &State<Arc<dyn BotCheck>>,
    mailer: &State<Arc<dyn Mailer>>,
    ip: Option<IpAddr>,
    form: Form<ContactForm>,
) -> Flash<Redirect> {
    let form = form.into_inner();
    let submission = Submission {
        name: form.name.unwrap_or_default(),
        email: form.email.unwrap_or_default(),
        message: form.message.unwrap_or_default(),
        token: form.token.unwrap_or_default(),
        remote_ip: ip.map(|ip| ip.to_string()),
    };

    // Bot-check and SMTP are blocking network calls
    let conn = db.into_inner();
    let bot = Arc::clone(bot.inner());
    let mailer = Arc::clone(mailer.inner());
    let site_name = config.site_name.clone();
    let outcome = rocket::tokio::task::spawn_blocking(move || {
        contact::submit(&conn, bot.as_ref(), mailer.as_ref(), &site_name, &submission)
    })
    .await;

    match outcome {
        Ok(Ok(_)) => Flash::success(Redirect::to("/contact"), contact::SENT),
        Ok(Err(msg)) => Flash::error(Redirect::to("/contact"), msg),
        Err(e) => {
            log::error!("Contact submission task failed: {}", e);
            Flash::error(Redirect::to("/contact"), contact::SAVE_FAILED)
        }
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![index, bio, works, events, contact_page, contact_submit]
}
