use crate::api::handlers::{health, login, signup};
use crate::directory::AccountType;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(health::health, signup::signup, login::login),
    components(schemas(
        AccountType,
        health::Health,
        login::LoginRequest,
        login::LoginResponse,
        signup::SignupRequest,
        signup::SignupResponse,
    )),
    tags(
        (name = "accounts", description = "Account registration and login"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
