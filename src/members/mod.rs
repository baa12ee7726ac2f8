use axum::{
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use rand::Rng;
use tracing::instrument;

use crate::{sessions::guards::MaybeSession, state::AppState, views};

/// Fixed members-area gallery, served from public/images.
const GALLERY: [&str; 3] = [
    "/images/photo1.jpg",
    "/images/photo2.jpg",
    "/images/photo3.jpg",
];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/members", get(members))
}

#[instrument(skip(user))]
async fn index(MaybeSession(user): MaybeSession) -> Html<String> {
    views::index_page(user.as_ref())
}

/// Anonymous visitors go back to the landing page, not to /login: browsing
/// past the members page is not an attempted privileged action.
#[instrument(skip(user))]
async fn members(MaybeSession(user): MaybeSession) -> Response {
    let Some(user) = user else {
        return Redirect::to("/").into_response();
    };
    let image = GALLERY[rand::thread_rng().gen_range(0..GALLERY.len())];
    views::members_page(&user.name, image).into_response()
}
