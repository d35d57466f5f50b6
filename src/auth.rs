use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::time::Duration;
use rocket::State;

use crate::db::DbPool;
use crate::models::admin::Admin;

const SESSION_COOKIE: &str = "repertoire_session";

/// How long a "remember me" login survives.
pub const REMEMBER_DAYS: i64 = 30;

/// Guard that ensures the request is from an authenticated admin
pub struct AdminUser(pub Admin);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let pool = match request.guard::<&State<DbPool>>().await {
            Outcome::Success(p) => p,
            _ => return Outcome::Forward(Status::Unauthorized),
        };

        let cookies = request.cookies();
        let admin_id = match session_admin_id(cookies) {
            Some(id) => id,
            None => return Outcome::Forward(Status::Unauthorized),
        };

        let admin = match pool.get() {
            Ok(conn) => Admin::find_by_id(&conn, admin_id),
            Err(_) => None,
        };

        match admin {
            Some(admin) => Outcome::Success(AdminUser(admin)),
            None => {
                // Admin row is gone; drop the stale cookie
                clear_session_cookie(cookies);
                Outcome::Forward(Status::Unauthorized)
            }
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| e.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Admin id carried by the private session cookie, if any.
pub fn session_admin_id(cookies: &CookieJar<'_>) -> Option<i64> {
    cookies
        .get_private(SESSION_COOKIE)
        .and_then(|c| c.value().parse().ok())
}

/// Private (encrypted, signed) cookie holding the admin id. Without
/// `remember` it lasts for the browser session only.
pub fn set_session_cookie(cookies: &CookieJar<'_>, admin_id: i64, remember: bool) {
    let mut cookie = Cookie::new(SESSION_COOKIE, admin_id.to_string());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if remember {
        cookie.set_max_age(Duration::days(REMEMBER_DAYS));
    }
    cookies.add_private(cookie);
}

pub fn clear_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::from(SESSION_COOKIE));
}
