use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

pub mod guards;
pub mod repo;

pub use repo::{Session, UserSnapshot};

/// Name of the httpOnly cookie carrying the opaque session id.
pub const SESSION_COOKIE: &str = "session_id";

/// Build the session cookie for a freshly started session.
pub fn session_cookie(id: Uuid, ttl_secs: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(ttl_secs))
        .build()
}

/// Expired removal cookie, set on logout.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    cookie
}

/// Parse the session id out of the request's cookie jar. Cookies that do
/// not hold a UUID are treated the same as no cookie at all.
pub fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
}
