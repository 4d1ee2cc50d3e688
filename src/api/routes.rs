//! API route handlers

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::multipart::{stage_multipart, StagedForm};
use super::response::ApiResponse;
use super::server::SharedState;
use crate::accounts::PublicAccount;
use crate::auth::{CurrentAccount, TokenPair, REFRESH_TOKEN_COOKIE};
use crate::error::{Error, Result};
use crate::session::{Credentials, Registration};

// Request/Response types

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: PublicAccount,
    pub access_token: String,
    pub refresh_token: String,
}

type Reply<T> = Result<Json<ApiResponse<T>>>;

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| Error::Validation(e.body_text()))
}

async fn staged_form(
    state: &SharedState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<StagedForm> {
    let multipart = multipart.map_err(|e| Error::Validation(e.body_text()))?;
    stage_multipart(multipart, &state.config.server.staging_dir).await
}

// Health check

pub async fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::ok("OK", "healthy"))
}

pub async fn not_found() -> Error {
    Error::NotFound("Route not found".to_string())
}

pub async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}

// Session routes

pub async fn register(
    State(state): State<SharedState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ApiResponse<PublicAccount>>)> {
    let form = staged_form(&state, multipart).await?;

    let registration = Registration {
        username: form.text("username"),
        email: form.text("email"),
        password: form.text("password"),
        full_name: form.text("fullName"),
        avatar: form.file("avatar").map(Path::to_path_buf),
        cover_image: form.file("coverImage").map(Path::to_path_buf),
    };
    let account = state.sessions.register(registration).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED,
            "User registered successfully",
            account,
        )),
    ))
}

pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<ApiResponse<LoginData>>)> {
    let req = json_body(payload)?;
    let outcome = state
        .sessions
        .login(Credentials {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    let jar = state.cookies.set_tokens(jar, &outcome.tokens);
    let data = LoginData {
        user: outcome.account,
        access_token: outcome.tokens.access_token,
        refresh_token: outcome.tokens.refresh_token,
    };
    Ok((jar, Json(ApiResponse::ok("User logged in successfully", data))))
}

pub async fn logout(
    State(state): State<SharedState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<serde_json::Value>>)> {
    state.sessions.logout(&account.id).await?;
    let jar = state.cookies.clear_tokens(jar);
    Ok((jar, Json(ApiResponse::ok("User logged out", serde_json::json!({})))))
}

/// The refresh token cookie wins over a token in the body
pub async fn refresh_token(
    State(state): State<SharedState>,
    jar: CookieJar,
    payload: std::result::Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<ApiResponse<TokenPair>>)> {
    let presented = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| payload.ok().and_then(|Json(body)| body.refresh_token));

    let tokens = state.sessions.refresh(presented.as_deref()).await?;
    let jar = state.cookies.set_tokens(jar, &tokens);
    Ok((jar, Json(ApiResponse::ok("Access token refreshed", tokens))))
}

pub async fn change_password(
    State(state): State<SharedState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    jar: CookieJar,
    payload: std::result::Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<ApiResponse<serde_json::Value>>)> {
    let req = json_body(payload)?;
    state
        .sessions
        .change_password(
            &account.id,
            req.old_password.as_deref(),
            req.new_password.as_deref(),
        )
        .await?;

    let jar = state.cookies.clear_tokens(jar);
    Ok((
        jar,
        Json(ApiResponse::ok("Password changed successfully", serde_json::json!({}))),
    ))
}

// Profile routes

pub async fn current_user(
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> Reply<PublicAccount> {
    Ok(Json(ApiResponse::ok("Current user fetched successfully", account)))
}

pub async fn update_account(
    State(state): State<SharedState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    payload: std::result::Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> Reply<PublicAccount> {
    let req = json_body(payload)?;
    let updated = state
        .sessions
        .update_details(&account.id, req.full_name.as_deref(), req.email.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok("Account details updated successfully", updated)))
}

pub async fn update_avatar(
    State(state): State<SharedState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Reply<PublicAccount> {
    let form = staged_form(&state, multipart).await?;
    let updated = state
        .sessions
        .update_avatar(&account.id, form.file("avatar"))
        .await?;
    Ok(Json(ApiResponse::ok("Avatar image updated successfully", updated)))
}

pub async fn update_cover_image(
    State(state): State<SharedState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Reply<PublicAccount> {
    let form = staged_form(&state, multipart).await?;
    let updated = state
        .sessions
        .update_cover_image(&account.id, form.file("coverImage"))
        .await?;
    Ok(Json(ApiResponse::ok("Cover image updated successfully", updated)))
}
