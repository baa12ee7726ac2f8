use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;

use crate::{
    sessions::{self, Session, UserSnapshot},
    state::AppState,
    views,
};

/// Resolved session, if any. Never rejects; the handler decides what an
/// anonymous visitor sees.
pub struct MaybeSession(pub Option<UserSnapshot>);

/// Requires an active session; anonymous requests are redirected to /login.
pub struct AuthSession(pub UserSnapshot);

/// Requires an active session AND the admin role. Authentication is checked
/// first; a logged-in non-admin gets 403.
pub struct AdminSession(pub UserSnapshot);

async fn resolve_session(
    parts: &Parts,
    state: &AppState,
) -> Result<Option<UserSnapshot>, Response> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(id) = sessions::session_id(&jar) else {
        return Ok(None);
    };
    Session::resolve(&state.db, id).await.map_err(|e| {
        error!(error = %e, session_id = %id, "session lookup failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    })
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(resolve_session(parts, state).await?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_session(parts, state).await? {
            Some(user) => Ok(AuthSession(user)),
            None => Err(Redirect::to("/login").into_response()),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Authentication before role: role is meaningless without an identity.
        let AuthSession(user) = AuthSession::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            return Err((StatusCode::FORBIDDEN, views::forbidden_page()).into_response());
        }
        Ok(AdminSession(user))
    }
}
