use std::net::SocketAddr;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{admin, auth, members, state::AppState, views};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(members::router())
        .merge(auth::router())
        .merge(admin::router())
        .nest_service("/images", ServeDir::new("public/images"))
        .fallback(not_found)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

async fn not_found() -> impl IntoResponse {
    let page: Html<String> = views::not_found_page();
    (StatusCode::NOT_FOUND, page)
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// Route-level tests run against a lazy pool; every request below resolves
// before any query would be issued.
#[cfg(test)]
mod route_tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        build_app(AppState::fake())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(res: axum::http::Response<Body>) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(res: &axum::http::Response<Body>) -> &str {
        res.headers()
            .get(header::LOCATION)
            .expect("Location header")
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let res = app().oneshot(get("/unknown-path")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(body_text(res).await.contains("404"));
    }

    #[tokio::test]
    async fn landing_and_forms_render_for_visitors() {
        for uri in ["/", "/signup", "/login"] {
            let res = app().oneshot(get(uri)).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK, "GET {uri}");
        }
    }

    #[tokio::test]
    async fn members_without_session_redirects_home() {
        let res = app().oneshot(get("/members")).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/");
    }

    #[tokio::test]
    async fn admin_without_session_redirects_to_login() {
        for uri in ["/admin", "/admin/promote?id=x", "/admin/demote"] {
            let res = app().oneshot(get(uri)).await.unwrap();
            assert_eq!(res.status(), StatusCode::SEE_OTHER, "GET {uri}");
            assert_eq!(location(&res), "/login");
        }
    }

    #[tokio::test]
    async fn logout_without_session_still_redirects_home() {
        let res = app().oneshot(get("/logout")).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/");
    }

    #[tokio::test]
    async fn invalid_signup_rerenders_form_with_error() {
        let res = app()
            .oneshot(post_form("/signup", "name=Ann&email=not-an-email&password=pw"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res)
            .await
            .contains("A valid email address is required."));
    }

    #[tokio::test]
    async fn signup_with_missing_field_rerenders_not_422() {
        let res = app()
            .oneshot(post_form("/signup", "email=ann@x.com&password=pw"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("Name is required."));
    }

    #[tokio::test]
    async fn invalid_login_rerenders_form_with_error() {
        let res = app()
            .oneshot(post_form("/login", "email=ann@x.com&password="))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("Password is required."));
    }
}
