use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::dto::{LoginForm, SignupForm},
    sessions::{self, Session, UserSnapshot},
    state::AppState,
    users::{password, CreateUserError, User},
    views,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", get(signup_form).post(signup))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
}

async fn signup_form() -> Html<String> {
    views::signup_page(None)
}

async fn login_form() -> Html<String> {
    views::login_page(None)
}

/// Start a session for `user` and attach its cookie to the jar.
async fn open_session(
    state: &AppState,
    jar: CookieJar,
    user: &User,
) -> anyhow::Result<(CookieJar, Redirect)> {
    let snapshot = UserSnapshot {
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
    };
    let ttl = state.config.session.ttl_secs;
    let session = Session::start(&state.db, &snapshot, ttl).await?;
    let jar = jar.add(sessions::session_cookie(session.id, ttl));
    Ok((jar, Redirect::to("/members")))
}

#[instrument(skip(state, jar, form))]
async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Response, (StatusCode, String)> {
    let input = match form.validate() {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "signup validation failed");
            return Ok(views::signup_page(Some(&e.to_string())).into_response());
        }
    };

    let hash = password::hash_password(&input.password).map_err(internal)?;

    let user = match User::create(&state.db, &input.name, &input.email, &hash).await {
        Ok(u) => u,
        Err(CreateUserError::EmailTaken) => {
            warn!(email = %input.email, "signup email already registered");
            return Ok(
                views::signup_page(Some("That email is already registered.")).into_response(),
            );
        }
        Err(CreateUserError::Db(e)) => return Err(internal(e)),
    };

    info!(user_id = %user.id, email = %user.email, "user signed up");
    let (jar, redirect) = open_session(&state, jar, &user).await.map_err(internal)?;
    Ok((jar, redirect).into_response())
}

#[instrument(skip(state, jar, form))]
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, (StatusCode, String)> {
    let input = match form.validate() {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "login validation failed");
            return Ok(views::login_page(Some(&e.to_string())).into_response());
        }
    };

    // Unknown email and wrong password share one message by design of the
    // response, so neither can be probed separately.
    let user = match User::find_by_email(&state.db, &input.email)
        .await
        .map_err(internal)?
    {
        Some(u) => u,
        None => {
            warn!(email = %input.email, "login unknown email");
            return Ok(views::login_page(Some(views::LOGIN_FAILED_MSG)).into_response());
        }
    };

    if !password::verify_password(&input.password, &user.password_hash).map_err(internal)? {
        warn!(user_id = %user.id, "login invalid password");
        return Ok(views::login_page(Some(views::LOGIN_FAILED_MSG)).into_response());
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    let (jar, redirect) = open_session(&state, jar, &user).await.map_err(internal)?;
    Ok((jar, redirect).into_response())
}

/// Destroys the session unconditionally. Missing or already-destroyed
/// sessions redirect the same way.
#[instrument(skip(state, jar))]
async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(id) = sessions::session_id(&jar) {
        if let Err(e) = Session::destroy(&state.db, id).await {
            error!(error = %e, session_id = %id, "session destroy failed");
        } else {
            info!(session_id = %id, "session destroyed");
        }
    }
    let jar = jar.remove(sessions::removal_cookie());
    (jar, Redirect::to("/")).into_response()
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal server error".to_string(),
    )
}
