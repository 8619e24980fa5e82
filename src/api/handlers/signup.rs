use crate::directory::{Directory, Registration};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error_response;

#[derive(ToSchema, Deserialize, Debug)]
pub struct SignupRequest {
    firstname: Option<String>,
    lastname: Option<String>,
    username: Option<String>,
    #[schema(value_type = Option<String>, format = Password)]
    password: Option<SecretString>,
    account_type: Option<String>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct SignupResponse {
    user_key: Uuid,
}

impl From<SignupRequest> for Registration {
    fn from(request: SignupRequest) -> Self {
        // Absent fields collapse to empty strings; the directory rejects
        // both the same way.
        Self {
            firstname: request.firstname.unwrap_or_default(),
            lastname: request.lastname.unwrap_or_default(),
            username: request.username.unwrap_or_default(),
            password: request
                .password
                .unwrap_or_else(|| SecretString::from(String::new())),
            account_type: request.account_type,
        }
    }
}

#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Registration successful", body = SignupResponse, content_type = "application/json"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Username already exists"),
    ),
    tag = "accounts"
)]
#[instrument]
pub async fn signup(
    directory: Extension<Directory>,
    payload: Option<Json<SignupRequest>>,
) -> impl IntoResponse {
    let request: SignupRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing payload"})),
            )
        }
    };

    debug!("signup request: {:?}", request);

    match directory.register(request.into()).await {
        Ok(user_key) => (
            StatusCode::CREATED,
            Json(json!(SignupResponse { user_key })),
        ),
        Err(err) => error_response(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::testing::MemoryStore;
    use axum::body::to_bytes;
    use axum::response::Response;
    use serde_json::Value;
    use std::sync::Arc;

    fn request(body: Value) -> Json<SignupRequest> {
        Json(serde_json::from_value(body).unwrap())
    }

    async fn response_parts(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn signup_returns_201_and_a_user_key() {
        let directory = Directory::new(Arc::new(MemoryStore::default()));

        let response = signup(
            Extension(directory),
            Some(request(json!({
                "firstname": "Ann",
                "lastname": "Lee",
                "username": "ann01",
                "password": "S3cret!"
            }))),
        )
        .await
        .into_response();

        let (status, body) = response_parts(response).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(Uuid::parse_str(body["user_key"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn missing_payload_is_a_400() {
        let directory = Directory::new(Arc::new(MemoryStore::default()));

        let response = signup(Extension(directory), None).await.into_response();

        let (status, body) = response_parts(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing payload"}));
    }

    #[tokio::test]
    async fn missing_field_is_a_400_without_a_write() {
        let store = Arc::new(MemoryStore::default());
        let directory = Directory::new(store.clone());

        let response = signup(
            Extension(directory),
            Some(request(json!({
                "firstname": "Ann",
                "username": "ann01",
                "password": "S3cret!"
            }))),
        )
        .await
        .into_response();

        let (status, body) = response_parts(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "All fields are required"}));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn duplicate_signup_is_a_409() {
        let directory = Directory::new(Arc::new(MemoryStore::default()));
        let body = json!({
            "firstname": "Ann",
            "lastname": "Lee",
            "username": "ann01",
            "password": "S3cret!"
        });

        let first = signup(Extension(directory.clone()), Some(request(body.clone())))
            .await
            .into_response();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = signup(Extension(directory), Some(request(body)))
            .await
            .into_response();

        let (status, body) = response_parts(second).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({"error": "Username already exists"}));
    }

    #[tokio::test]
    async fn unknown_account_type_is_a_400() {
        let directory = Directory::new(Arc::new(MemoryStore::default()));

        let response = signup(
            Extension(directory),
            Some(request(json!({
                "firstname": "Ann",
                "lastname": "Lee",
                "username": "ann01",
                "password": "S3cret!",
                "account_type": "superuser"
            }))),
        )
        .await
        .into_response();

        let (status, body) = response_parts(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid account type"}));
    }
}
