use std::collections::HashMap;

use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::{non_empty, render, save_image};
use crate::auth::AdminUser;
use crate::config::AppConfig;
use crate::db::Db;
use crate::images;
use crate::models::event::{Event, EventForm};
use crate::models::gallery::GalleryPhoto;
use crate::models::message::Message;
use crate::models::ordering::{self, Direction, SortableList};
use crate::models::settings::Setting;
use crate::models::work::{Work, WorkForm, WorkVideo};

const DASHBOARD: &str = "/admin";

/// Log a failed write and send the admin back with a generic error.
fn failed(action: &str, err: String) -> Flash<Redirect> {
    log::error!("Failed to {}: {}", action, err);
    Flash::error(Redirect::to(DASHBOARD), format!("Could not {}.", action))
}

fn done(message: &str) -> Flash<Redirect> {
    Flash::success(Redirect::to(DASHBOARD), message)
}

fn move_in(db: &Db, list: SortableList, id: i64, dir: &str) -> Redirect {
    if let Some(direction) = Direction::parse(dir) {
        if let Err(e) = ordering::move_item(db, list, id, direction) {
            log::error!("Failed to move {:?} item {}: {}", list, id, e);
        }
    }
    Redirect::to(DASHBOARD)
}

// ── Dashboard ──────────────────────────────────────────

#[get("/")]
pub fn dashboard(
    admin: AdminUser,
    db: Db,
    config: &State<AppConfig>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let context = json!({
        "admin": admin.0,
        "works": Work::list_with_videos(&db),
        "events": Event::list(&db, None),
        "gallery": GalleryPhoto::list(&db),
        "messages": Message::list(&db),
        "message_count": Message::count(&db),
        "unread_count": Message::count_unread(&db),
        "settings": Setting::mail_group(&db),
    });
    render("admin/dashboard", config, flash, context)
}

// ── Gallery ────────────────────────────────────────────

#[derive(FromForm)]
pub struct GalleryUpload<'f> {
    pub image: Option<TempFile<'f>>,
    pub caption: Option<String>,
}

#[post("/gallery/add", data = "<form>")]
pub async fn gallery_add(
    _admin: AdminUser,
    db: Db,
    config: &State<AppConfig>,
    form: Form<GalleryUpload<'_>>,
) -> Flash<Redirect> {
    let filename = match save_image(config, form.image.as_ref()).await {
        Ok(Some(f)) => f,
        Ok(None) => {
            return Flash::error(Redirect::to(DASHBOARD), "Please select a valid image.");
        }
        Err(e) => {
            log::warn!("Gallery upload rejected: {}", e);
            return Flash::error(Redirect::to(DASHBOARD), "Please select a valid image.");
        }
    };

    let caption = non_empty(&form.caption);
    match GalleryPhoto::create(&db, &filename, caption.as_deref()) {
        Ok(_) => done("Photo added to gallery."),
        Err(e) => {
            images::delete_image(&config.upload_dir, &filename);
            failed("add the photo", e)
        }
    }
}

#[post("/gallery/<id>/delete")]
pub fn gallery_delete(
    _admin: AdminUser,
    db: Db,
    config: &State<AppConfig>,
    id: i64,
) -> Result<Flash<Redirect>, Redirect> {
    let photo = match GalleryPhoto::find_by_id(&db, id) {
        Some(p) => p,
        None => return Err(Redirect::to(DASHBOARD)),
    };

    images::delete_image(&config.upload_dir, &photo.image_filename);
    match GalleryPhoto::delete(&db, id) {
        Ok(()) => Ok(done("Photo removed.")),
        Err(e) => Ok(failed("remove the photo", e)),
    }
}

#[post("/gallery/<id>/move/<dir>")]
pub fn gallery_move(_admin: AdminUser, db: Db, id: i64, dir: &str) -> Redirect {
    move_in(&db, SortableList::Gallery, id, dir)
}

// ── Works ──────────────────────────────────────────────

#[derive(FromForm)]
pub struct WorkUpload<'f> {
    pub title: Option<String>,
    pub year: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub performers: Option<String>,
    pub video_urls: Vec<String>,
    pub remove_image: Option<String>,
    pub image: Option<TempFile<'f>>,
}

impl WorkUpload<'_> {
    /// Field values as stored; the image is resolved separately.
    fn to_work_form(&self, image_filename: Option<String>) -> WorkForm {
        WorkForm {
            title: non_empty(&self.title).unwrap_or_default(),
            year: non_empty(&self.year).and_then(|y| y.parse().ok()),
            duration: non_empty(&self.duration),
            description: non_empty(&self.description),
            performers: non_empty(&self.performers),
            image_filename,
            video_urls: self.video_urls.clone(),
        }
    }
}

#[get("/works/new")]
pub fn works_new(
    _admin: AdminUser,
    config: &State<AppConfig>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let context = json!({ "work": null, "videos": [] });
    render("admin/work_form", config, flash, context)
}

#[post("/works/new", data = "<form>")]
pub async fn works_create(
    _admin: AdminUser,
    db: Db,
    config: &State<AppConfig>,
    form: Form<WorkUpload<'_>>,
) -> Flash<Redirect> {
    if non_empty(&form.title).is_none() {
        return Flash::error(Redirect::to(DASHBOARD), "Title is required.");
    }

    let image = match save_image(config, form.image.as_ref()).await {
        Ok(f) => f,
        Err(e) => {
            log::warn!("Work image upload ignored: {}", e);
            None
        }
    };

    let work = form.to_work_form(image);
    match Work::create(&db, &work) {
        Ok(_) => done("Work added."),
        Err(e) => {
            if let Some(f) = &work.image_filename {
                images::delete_image(&config.upload_dir, f);
            }
            failed("add the work", e)
        }
    }
}

#[get("/works/<id>/edit")]
pub fn works_edit(
    _admin: AdminUser,
    db: Db,
    config: &State<AppConfig>,
    flash: Option<FlashMessage<'_>>,
    id: i64,
) -> Result<Template, Flash<Redirect>> {
    let work = Work::find_by_id(&db, id)
        .ok_or_else(|| Flash::error(Redirect::to(DASHBOARD), "Work not found."))?;

    let context = json!({
        "work": work,
        "videos": WorkVideo::for_work(&db, id),
    });
    Ok(render("admin/work_form", config, flash, context))
}

#[post("/works/<id>/edit", data = "<form>")]
pub async fn works_update(
    _admin: AdminUser,
    db: Db,
    config: &State<AppConfig>,
    id: i64,
    form: Form<WorkUpload<'_>>,
) -> Flash<Redirect> {
    let existing = match Work::find_by_id(&db, id) {
        Some(w) => w,
        None => return Flash::error(Redirect::to(DASHBOARD), "Work not found."),
    };

    if non_empty(&form.title).is_none() {
        return Flash::error(Redirect::to(DASHBOARD), "Title is required.");
    }

    let uploaded = match save_image(config, form.image.as_ref()).await {
        Ok(f) => f,
        Err(e) => {
            log::warn!("Work image upload ignored: {}", e);
            None
        }
    };

    // (image to store, file that becomes unreferenced once the row is saved)
    let (image, stale) = match (uploaded.clone(), existing.image_filename) {
        (Some(new), old) => (Some(new), old),
        (None, Some(old)) if non_empty(&form.remove_image).is_some() => (None, Some(old)),
        (None, old) => (old, None),
    };

    match Work::update(&db, id, &form.to_work_form(image)) {
        Ok(()) => {
            if let Some(old) = stale {
                images::delete_image(&config.upload_dir, &old);
            }
            done("Work updated.")
        }
        Err(e) => {
            if let Some(new) = uploaded {
                images::delete_image(&config.upload_dir, &new);
            }
            failed("update the work", e)
        }
    }
}

#[post("/works/<id>/delete")]
pub fn works_delete(
    _admin: AdminUser,
    db: Db,
    config: &State<AppConfig>,
    id: i64,
) -> Flash<Redirect> {
    let work = match Work::find_by_id(&db, id) {
        Some(w) => w,
        None => return Flash::error(Redirect::to(DASHBOARD), "Work not found."),
    };

    if let Some(f) = &work.image_filename {
        images::delete_image(&config.upload_dir, f);
    }
    match Work::delete(&db, id) {
        Ok(()) => done("Work deleted."),
        Err(e) => failed("delete the work", e),
    }
}

#[post("/works/<id>/move/<dir>")]
pub fn works_move(_admin: AdminUser, db: Db, id: i64, dir: &str) -> Redirect {
    move_in(&db, SortableList::Works, id, dir)
}

// ── Events ─────────────────────────────────────────────

#[derive(Debug, FromForm)]
pub struct EventFields {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl EventFields {
    fn to_event_form(&self) -> EventForm {
        EventForm {
            title: non_empty(&self.title).unwrap_or_default(),
            date: non_empty(&self.date),
            time: non_empty(&self.time),
            location: non_empty(&self.location),
            description: non_empty(&self.description),
        }
    }
}

#[get("/events/new")]
pub fn events_new(
    _admin: AdminUser,
    config: &State<AppConfig>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    render("admin/event_form", config, flash, json!({ "event": null }))
}

#[post("/events/new", data = "<form>")]
pub fn events_create(_admin: AdminUser, db: Db, form: Form<EventFields>) -> Flash<Redirect> {
    let event = form.to_event_form();
    if event.title.is_empty() {
        return Flash::error(Redirect::to(DASHBOARD), "Title is required.");
    }

    match Event::create(&db, &event) {
        Ok(_) => done("Event added."),
        Err(e) => failed("add the event", e),
    }
}

#[get("/events/<id>/edit")]
pub fn events_edit(
    _admin: AdminUser,
    db: Db,
    config: &State<AppConfig>,
    flash: Option<FlashMessage<'_>>,
    id: i64,
) -> Result<Template, Flash<Redirect>> {
    let event = Event::find_by_id(&db, id)
        .ok_or_else(|| Flash::error(Redirect::to(DASHBOARD), "Event not found."))?;
    Ok(render("admin/event_form", config, flash, json!({ "event": event })))
}

#[post("/events/<id>/edit", data = "<form>")]
pub fn events_update(
    _admin: AdminUser,
    db: Db,
    id: i64,
    form: Form<EventFields>,
) -> Flash<Redirect> {
    if Event::find_by_id(&db, id).is_none() {
        return Flash::error(Redirect::to(DASHBOARD), "Event not found.");
    }

    let event = form.to_event_form();
    if event.title.is_empty() {
        return Flash::error(Redirect::to(DASHBOARD), "Title is required.");
    }

    match Event::update(&db, id, &event) {
        Ok(()) => done("Event updated."),
        Err(e) => failed("update the event", e),
    }
}

#[post("/events/<id>/delete")]
pub fn events_delete(_admin: AdminUser, db: Db, id: i64) -> Flash<Redirect> {
    if Event::find_by_id(&db, id).is_none() {
        return Flash::error(Redirect::to(DASHBOARD), "Event not found.");
    }

    match Event::delete(&db, id) {
        Ok(()) => done("Event deleted."),
        Err(e) => failed("delete the event", e),
    }
}

#[post("/events/<id>/move/<dir>")]
pub fn events_move(_admin: AdminUser, db: Db, id: i64, dir: &str) -> Redirect {
    move_in(&db, SortableList::Events, id, dir)
}

// ── Messages ───────────────────────────────────────────

#[get("/messages/<id>")]
pub fn message_view(
    _admin: AdminUser,
    db: Db,
    config: &State<AppConfig>,
    flash: Option<FlashMessage<'_>>,
    id: i64,
) -> Result<Template, Flash<Redirect>> {
    let mut message = Message::find_by_id(&db, id)
        .ok_or_else(|| Flash::error(Redirect::to(DASHBOARD), "Message not found."))?;

    if !message.is_read {
        match Message::mark_read(&db, id) {
            Ok(()) => message.is_read = true,
            Err(e) => log::error!("Failed to mark message {} read: {}", id, e),
        }
    }

    Ok(render("admin/message_view", config, flash, json!({ "message": message })))
}

#[post("/messages/<id>/delete")]
pub fn message_delete(_admin: AdminUser, db: Db, id: i64) -> Flash<Redirect> {
    if Message::find_by_id(&db, id).is_none() {
        return Flash::error(Redirect::to(DASHBOARD), "Message not found.");
    }

    match Message::delete(&db, id) {
        Ok(()) => done("Message deleted."),
        Err(e) => failed("delete the message", e),
    }
}

// ── Settings ───────────────────────────────────────────

#[derive(Debug, FromForm)]
pub struct MailSettingsForm {
    pub recipient_email: Option<String>,
    pub mail_server: Option<String>,
    pub mail_port: Option<String>,
    pub mail_username: Option<String>,
    pub mail_password: Option<String>,
}

impl MailSettingsForm {
    /// Every mail key, trimmed; a missing field is stored as "".
    fn values(&self) -> HashMap<String, String> {
        [
            ("recipient_email", &self.recipient_email),
            ("mail_server", &self.mail_server),
            ("mail_port", &self.mail_port),
            ("mail_username", &self.mail_username),
            ("mail_password", &self.mail_password),
        ]
        .into_iter()
        .map(|(key, value)| {
            let value = value.as_deref().map(str::trim).unwrap_or("");
            (key.to_string(), value.to_string())
        })
        .collect()
    }
}

#[post("/settings", data = "<form>")]
pub fn settings_save(_admin: AdminUser, db: Db, form: Form<MailSettingsForm>) -> Flash<Redirect> {
    match Setting::set_many(&db, &form.values()) {
        Ok(()) => done("Settings updated."),
        Err(e) => failed("update the settings", e),
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        dashboard,
        gallery_add,
        gallery_delete,
        gallery_move,
        works_new,
        works_create,
        works_edit,
        works_update,
        works_delete,
        works_move,
        events_new,
        events_create,
        events_edit,
        events_update,
        events_delete,
        events_move,
        message_view,
        message_delete,
        settings_save,
    ]
}
