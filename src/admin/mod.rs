use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    sessions::guards::AdminSession,
    state::AppState,
    users::{Role, User},
    views,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(list))
        .route("/admin/promote", get(promote))
        .route("/admin/demote", get(demote))
}

#[derive(Debug, Deserialize)]
struct Target {
    id: Option<String>,
}

#[instrument(skip(state, _admin))]
async fn list(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
) -> Result<Html<String>, (StatusCode, String)> {
    let users = User::list_all(&state.db).await.map_err(internal)?;
    Ok(views::admin_page(&users))
}

#[instrument(skip(state, admin))]
async fn promote(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Query(target): Query<Target>,
) -> Result<Response, (StatusCode, String)> {
    change_role(&state, &admin.email, target, Role::Admin).await
}

#[instrument(skip(state, admin))]
async fn demote(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Query(target): Query<Target>,
) -> Result<Response, (StatusCode, String)> {
    change_role(&state, &admin.email, target, Role::User).await
}

/// A missing or unparseable id is not an error; the admin just lands back
/// on the list.
async fn change_role(
    state: &AppState,
    acting_admin: &str,
    target: Target,
    role: Role,
) -> Result<Response, (StatusCode, String)> {
    let Some(id) = target.id.as_deref().and_then(|s| Uuid::parse_str(s).ok()) else {
        return Ok(Redirect::to("/admin").into_response());
    };

    let updated = User::set_role(&state.db, id, role)
        .await
        .map_err(internal)?;
    if updated == 0 {
        warn!(target_id = %id, "role change for unknown user");
    } else {
        info!(target_id = %id, %role, admin = %acting_admin, "role changed");
    }
    Ok(Redirect::to("/admin").into_response())
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal server error".to_string(),
    )
}
