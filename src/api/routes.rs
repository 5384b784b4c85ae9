//! API route handlers

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Form, Json,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::server::SharedState;
use crate::auth::middleware::{clear_session_cookie, session_cookie};
use crate::auth::{session_id_from_request, CurrentUser, SessionStore, UserInfo};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn err(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn internal_error(e: crate::error::Error) -> Response {
    tracing::error!("Request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::err("Internal error")),
    )
        .into_response()
}

// Health check

pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok("healthy"))
}

// Session routes

/// Log in with the posted login id and password fields
pub async fn login(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let cookie_name = &state.config.session.cookie_name;
    let session_id = session_id_from_request(&headers, cookie_name);
    let mut auth = state.authenticator(session_id).with_input(Arc::new(form));

    match auth.login(None, None).await {
        Ok(true) => {
            let info = auth.user().map(UserInfo::from);
            let cookie = auth
                .session()
                .transport_token()
                .map(|id| session_cookie(cookie_name, id))
                .unwrap_or_else(|| clear_session_cookie(cookie_name));
            (
                StatusCode::OK,
                [(header::SET_COOKIE, cookie)],
                Json(ApiResponse::ok(info)),
            )
                .into_response()
        }
        Ok(false) => (
            StatusCode::UNAUTHORIZED,
            [(header::SET_COOKIE, clear_session_cookie(cookie_name))],
            Json(ApiResponse::err("Invalid login id or password")),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

/// Destroy the current session
pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let cookie_name = &state.config.session.cookie_name;
    let session_id = session_id_from_request(&headers, cookie_name);
    let mut auth = state.authenticator(session_id);

    match auth.logout().await {
        Ok(_) => (
            StatusCode::OK,
            [(header::SET_COOKIE, clear_session_cookie(cookie_name))],
            Json(ApiResponse::ok("logged out")),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

/// Identity of the authenticated user
pub async fn me(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    Json(ApiResponse::ok(user))
}
