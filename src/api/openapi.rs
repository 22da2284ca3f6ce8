//! OpenAPI document for the HTTP surface.

use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::login::login,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,
    ),
    components(schemas(
        crate::users::store::UserRecord,
        handlers::login::LoginRequest,
        handlers::login::LoginResponse,
        handlers::users::CreateUserRequest,
        handlers::users::UpdateUserRequest,
    )),
    tags(
        (name = "auth", description = "Operator login"),
        (name = "users", description = "User management"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

pub async fn serve() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
