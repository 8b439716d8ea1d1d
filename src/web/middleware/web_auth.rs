//! Cookie-based authentication middleware for web dashboard.

use axum::{
    extract::{Request, State},
    http::header::COOKIE,
    middleware::Next,
    response::{Redirect, Response},
};

use crate::state::AppState;

/// Name of the cookie carrying the API token.
pub const AUTH_COOKIE: &str = "auth_token";

/// Authenticates dashboard requests using cookie-based tokens.
///
/// # Cookie Format
///
/// ```text
/// Cookie: auth_token=<token>
/// ```
///
/// The cookie holds the same token the API accepts as a Bearer token. On
/// success the token's owner is inserted into request extensions, so
/// dashboard pages see exactly the records the API would return.
///
/// Unlike the API auth middleware which returns `401 Unauthorized`,
/// this middleware redirects to `/dashboard/login`.
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Redirect> {
    let token = req
        .headers()
        .get(COOKIE)
        .and_then(|cookie_header| cookie_header.to_str().ok())
        .and_then(extract_token);

    let Some(token) = token else {
        return Err(Redirect::to("/dashboard/login"));
    };

    match st.auth_service.authenticate(&token).await {
        Ok(owner) => {
            req.extensions_mut().insert(owner);
            Ok(next.run(req).await)
        }
        Err(_) => Err(Redirect::to("/dashboard/login")),
    }
}

fn extract_token(cookie_header: &str) -> Option<String> {
    cookie_header.split(';').find_map(|cookie| {
        let (name, value) = cookie.trim().split_once('=')?;
        (name == AUTH_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}
