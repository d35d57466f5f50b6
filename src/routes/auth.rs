use std::path::PathBuf;

use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket::response::Redirect;
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::{non_empty, render, render_error};
use crate::auth::{self, AdminUser};
use crate::config::AppConfig;
use crate::db::Db;
use crate::models::admin::Admin;

const INVALID_CREDENTIALS: &str = "Invalid credentials.";

#[derive(Debug, FromForm)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub remember: Option<String>,
}

#[get("/login")]
pub fn login_page(
    admin: Option<AdminUser>,
    config: &State<AppConfig>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    if admin.is_some() {
        return Err(Redirect::to("/admin"));
    }
    Ok(render("admin/login", config, flash, json!({ "username": "" })))
}

#[post("/login", data = "<form>")]
pub fn login_submit(
    db: Db,
    config: &State<AppConfig>,
    cookies: &CookieJar<'_>,
    form: Form<LoginForm>,
) -> Result<Redirect, Template> {
    let username = form.username.as_deref().unwrap_or("").trim().to_string();
    let password = form.password.as_deref().unwrap_or("");

    let admin = Admin::find_by_username(&db, &username).filter(|a| a.check_password(password));

    match admin {
        Some(admin) => {
            let remember = non_empty(&form.remember).is_some();
            auth::set_session_cookie(cookies, admin.id, remember);
            log::info!("Admin '{}' logged in", admin.username);
            Ok(Redirect::to("/admin"))
        }
        None => {
            log::warn!("Failed login attempt for '{}'", username);
            Err(render_error(
                "admin/login",
                config,
                INVALID_CREDENTIALS,
                json!({ "username": username }),
            ))
        }
    }
}

#[get("/logout")]
pub fn logout(_admin: AdminUser, cookies: &CookieJar<'_>) -> Redirect {
    auth::clear_session_cookie(cookies);
    Redirect::to("/")
}

/// Catch-alls for anything under /admin that failed the [`AdminUser`]
/// guard. A catcher would keep the 401 status, which browsers don't follow.
#[get("/<_path..>", rank = 99)]
pub fn admin_redirect_to_login(_path: PathBuf) -> Redirect {
    Redirect::to("/admin/login")
}

#[post("/<_path..>", rank = 99)]
pub fn admin_post_to_login(_path: PathBuf) -> Redirect {
    Redirect::to("/admin/login")
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        login_page,
        login_submit,
        logout,
        admin_redirect_to_login,
        admin_post_to_login
    ]
}
