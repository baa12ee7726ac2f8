//! Server-rendered HTML views. Small enough that a template engine would be
//! more machinery than markup.

use axum::response::Html;

use crate::sessions::UserSnapshot;
use crate::users::{Role, User};

/// Generic login failure copy. One message for unknown email and wrong
/// password alike, so the response does not leak which one it was.
pub const LOGIN_FAILED_MSG: &str = "User and password not found.";

/// Escape user-supplied text before interpolating it into markup.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n{body}\n</body>\n</html>\n"
    ))
}

fn error_banner(error: Option<&str>) -> String {
    match error {
        Some(msg) => format!("<p class=\"error\">{}</p>", escape(msg)),
        None => String::new(),
    }
}

pub fn index_page(user: Option<&UserSnapshot>) -> Html<String> {
    let body = match user {
        Some(u) => format!(
            "<h1>Hello, {}!</h1>\n\
             <p><a href=\"/members\">Members area</a> | <a href=\"/logout\">Log out</a></p>",
            escape(&u.name)
        ),
        None => "<h1>Welcome</h1>\n\
             <p><a href=\"/signup\">Sign up</a> | <a href=\"/login\">Log in</a></p>"
            .to_string(),
    };
    layout("Home", &body)
}

pub fn signup_page(error: Option<&str>) -> Html<String> {
    let body = format!(
        "<h1>Sign up</h1>\n{}\
         <form method=\"POST\" action=\"/signup\">\n\
         Name: <input name=\"name\"/><br/>\n\
         Email: <input name=\"email\"/><br/>\n\
         Password: <input name=\"password\" type=\"password\"/><br/>\n\
         <button>Sign Up</button>\n\
         </form>",
        error_banner(error)
    );
    layout("Sign up", &body)
}

pub fn login_page(error: Option<&str>) -> Html<String> {
    let body = format!(
        "<h1>Log in</h1>\n{}\
         <form method=\"POST\" action=\"/login\">\n\
         Email: <input name=\"email\"/><br/>\n\
         Password: <input name=\"password\" type=\"password\"/><br/>\n\
         <button>Log In</button>\n\
         </form>",
        error_banner(error)
    );
    layout("Log in", &body)
}

pub fn members_page(name: &str, image: &str) -> Html<String> {
    let body = format!(
        "<h1>Hello, {}</h1>\n\
         <img src=\"{image}\" style=\"max-width:300px;\"/><br/>\n\
         <a href=\"/logout\">Log out</a>",
        escape(name)
    );
    layout("Members", &body)
}

pub fn admin_page(users: &[User]) -> Html<String> {
    let mut rows = String::new();
    for u in users {
        let action = match u.role {
            Role::User => format!("<a href=\"/admin/promote?id={}\">promote</a>", u.id),
            Role::Admin => format!("<a href=\"/admin/demote?id={}\">demote</a>", u.id),
        };
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{action}</td></tr>\n",
            escape(&u.name),
            escape(&u.email),
            u.role
        ));
    }
    let body = format!(
        "<h1>Admin</h1>\n\
         <table>\n<tr><th>Name</th><th>Email</th><th>Role</th><th></th></tr>\n{rows}</table>\n\
         <p><a href=\"/\">Home</a></p>"
    );
    layout("Admin", &body)
}

pub fn forbidden_page() -> Html<String> {
    layout(
        "Forbidden",
        "<h1>403 Forbidden</h1>\n<p>You do not have access to this page.</p>",
    )
}

pub fn not_found_page() -> Html<String> {
    layout(
        "Not Found",
        "<h1>404 Not Found</h1>\n<p>That page does not exist. <a href=\"/\">Home</a></p>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn user(name: &str, role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{}@x.com", name.to_lowercase()),
            password_hash: "hash".into(),
            role,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape("<script>\"&'"),
            "&lt;script&gt;&quot;&amp;&#39;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn login_page_renders_generic_failure_message() {
        let Html(html) = login_page(Some(LOGIN_FAILED_MSG));
        assert!(html.contains("User and password not found."));
    }

    #[test]
    fn index_greets_session_holder_by_name() {
        let snap = UserSnapshot {
            name: "Ann <b>".into(),
            email: "ann@x.com".into(),
            role: Role::User,
        };
        let Html(html) = index_page(Some(&snap));
        assert!(html.contains("Hello, Ann &lt;b&gt;!"));
        assert!(html.contains("/members"));
    }

    #[test]
    fn index_offers_signup_and_login_to_visitors() {
        let Html(html) = index_page(None);
        assert!(html.contains("/signup"));
        assert!(html.contains("/login"));
    }

    #[test]
    fn admin_page_links_role_change_per_user() {
        let admin = user("Root", Role::Admin);
        let member = user("Ann", Role::User);
        let Html(html) = admin_page(&[admin.clone(), member.clone()]);
        assert!(html.contains(&format!("/admin/demote?id={}", admin.id)));
        assert!(html.contains(&format!("/admin/promote?id={}", member.id)));
    }

    #[test]
    fn not_found_page_says_404() {
        let Html(html) = not_found_page();
        assert!(html.contains("404"));
    }
}
