//! Registration and login. These routes sit outside the auth layer.

use api_types::{
    ApiResponse,
    user::{Credentials, LoginView, UserCreated},
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{ServerError, server::ServerState};

pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<ApiResponse<UserCreated>>, ServerError> {
    let Json(payload) = payload?;
    let username = payload.username.trim().to_string();
    let email = payload
        .email
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty());
    let id = state
        .engine
        .register_user_with_email(&username, &payload.password, email.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(
        format!("User {username} created successfully"),
        UserCreated {
            id,
            username,
            email,
        },
    )))
}

pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginView>>, ServerError> {
    let Json(payload) = payload?;
    let session = state
        .engine
        .authenticate(&payload.username, &payload.password)
        .await?;
    Ok(Json(ApiResponse::ok(
        format!("Welcome {}", session.username),
        LoginView {
            token: session.token,
            user_id: session.user_id,
            username: session.username,
            expires_at: session.expires_at,
        },
    )))
}
