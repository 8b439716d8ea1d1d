//! Login page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::web::middleware::web_auth::AUTH_COOKIE;

/// Renders `templates/login.html`: a token field that stores the value in
/// the auth cookie.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
struct LoginTemplate {
    cookie_name: &'static str,
}

/// Renders the login page.
///
/// # Endpoint
///
/// `GET /dashboard/login`
///
/// Users paste an API token created with `admin token create`.
pub async fn login_handler() -> impl IntoResponse {
    LoginTemplate {
        cookie_name: AUTH_COOKIE,
    }
}
