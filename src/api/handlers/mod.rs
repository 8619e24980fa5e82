//! HTTP handlers and the shared error-to-response mapping.

pub mod health;
pub mod login;
pub mod signup;

pub use self::login::login;
pub use self::signup::signup;

use crate::directory::DirectoryError;
use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::error;

/// Map a directory error onto the transport. Store faults are logged with
/// their source and surfaced as a generic 500 body.
pub(crate) fn error_response(err: &DirectoryError) -> (StatusCode, Json<Value>) {
    let status = match err {
        DirectoryError::Validation(_) => StatusCode::BAD_REQUEST,
        DirectoryError::Conflict => StatusCode::CONFLICT,
        DirectoryError::Authentication => StatusCode::UNAUTHORIZED,
        DirectoryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = match err {
        DirectoryError::Storage(source) => {
            error!("storage fault: {:?}", source);

            json!({"error": "Internal server error"})
        }
        other => json!({"error": other.to_string()}),
    };

    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        let cases = [
            (
                error_response(&DirectoryError::Validation("All fields are required")),
                StatusCode::BAD_REQUEST,
                "All fields are required",
            ),
            (
                error_response(&DirectoryError::Conflict),
                StatusCode::CONFLICT,
                "Username already exists",
            ),
            (
                error_response(&DirectoryError::Authentication),
                StatusCode::UNAUTHORIZED,
                "Invalid username or password",
            ),
        ];

        for ((status, body), expected_status, expected_message) in cases {
            assert_eq!(status, expected_status);
            assert_eq!(body.0, json!({"error": expected_message}));
        }
    }

    #[test]
    fn storage_faults_never_leak_their_source() {
        let err = DirectoryError::Storage(anyhow!("connection refused to db.internal:5432"));
        let (status, body) = error_response(&err);

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.0, json!({"error": "Internal server error"}));
    }
}
