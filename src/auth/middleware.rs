//! Authentication middleware and extractors

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::routes::ApiResponse;
use crate::api::SharedState;
use crate::auth::SessionStore;

/// Authenticated user, inserted into request extensions by [`require_auth`]
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub driver_id: String,
    pub user_id: i64,
    pub screen_name: String,
}

/// Extract the session id from the session cookie
pub fn session_id_from_request(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookie_str) = cookie_header.to_str() else {
            continue;
        };
        for cookie in cookie_str.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                if name == cookie_name && !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// `Set-Cookie` value carrying a session id
pub fn session_cookie(cookie_name: &str, session_id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", cookie_name, session_id)
}

/// `Set-Cookie` value removing the session cookie
pub fn clear_session_cookie(cookie_name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", cookie_name)
}

/// Middleware for requiring authentication
///
/// Runs the login hash check for the presented session and rejects the
/// request with 401 when it fails.
pub async fn require_auth(State(state): State<SharedState>, mut req: Request, next: Next) -> Response {
    let cookie_name = &state.config.session.cookie_name;
    let session_id = session_id_from_request(req.headers(), cookie_name);
    let had_cookie = session_id.is_some();

    let mut auth = state.authenticator(session_id);
    match auth.check_existing_session().await {
        Ok(true) => {
            if let (Some(identity), Some(screen_name)) = (auth.get_user_id(), auth.get_screen_name()) {
                req.extensions_mut().insert(CurrentUser {
                    driver_id: identity.driver_id,
                    user_id: identity.user_id,
                    screen_name: screen_name.to_string(),
                });
            }
            next.run(req).await
        }
        Ok(false) => {
            let mut response = (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::err("Not authenticated")),
            )
                .into_response();
            if had_cookie && auth.session().transport_token().is_none() {
                if let Ok(value) = HeaderValue::from_str(&clear_session_cookie(cookie_name)) {
                    response.headers_mut().insert(header::SET_COOKIE, value);
                }
            }
            response
        }
        Err(e) => {
            tracing::error!("Session check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err("Internal error")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_no_cookie() {
        let headers = HeaderMap::new();
        assert!(session_id_from_request(&headers, "easyauth_session").is_none());
    }

    #[test]
    fn test_session_id_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; easyauth_session=abc-123; lang=en"),
        );
        assert_eq!(
            session_id_from_request(&headers, "easyauth_session").as_deref(),
            Some("abc-123")
        );
        assert!(session_id_from_request(&headers, "other").is_none());
    }

    #[test]
    fn test_cookie_values() {
        assert!(session_cookie("sid", "x").starts_with("sid=x;"));
        assert!(clear_session_cookie("sid").contains("Max-Age=0"));
    }
}
