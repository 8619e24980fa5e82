use crate::directory::{AccountType, Directory};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error_response;

#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginRequest {
    username: Option<String>,
    #[schema(value_type = Option<String>, format = Password)]
    password: Option<SecretString>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct LoginResponse {
    user_key: Uuid,
    account_type: AccountType,
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse, content_type = "application/json"),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid username or password"),
    ),
    tag = "accounts"
)]
#[instrument]
pub async fn login(
    directory: Extension<Directory>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing payload"})),
            )
        }
    };

    debug!("login request: {:?}", request);

    let username = request.username.unwrap_or_default();
    let password = request
        .password
        .unwrap_or_else(|| SecretString::from(String::new()));

    match directory
        .authenticate(&username, password.expose_secret())
        .await
    {
        Ok((user_key, account_type)) => (
            StatusCode::OK,
            Json(json!(LoginResponse {
                user_key,
                account_type
            })),
        ),
        Err(err) => error_response(&err),
    }
}
