//! User management endpoints.
//!
//! Flow overview:
//! 1) The access guard has already admitted the request and attached the
//!    verified subject.
//! 2) Handlers bind typed payloads and delegate to the `UserDirectory`.
//! 3) Directory errors map onto status codes here, in one place.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{api::ApiContext, users::DirectoryError};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl IntoResponse for DirectoryError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
            Self::Conflict { field } => {
                (StatusCode::CONFLICT, format!("{field} already exists")).into_response()
            }
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Store(err) => {
                error!("failed to handle user request: {err:#}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/users",
    responses(
        (status = 200, description = "List all users", body = [crate::users::store::UserRecord]),
        (status = 401, description = "Missing or invalid token"),
    ),
    tag = "users"
)]
pub async fn list_users(Extension(ctx): Extension<ApiContext>) -> Response {
    match ctx.directory.list().await {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User detail", body = crate::users::store::UserRecord),
        (status = 400, description = "Invalid user id"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found"),
    ),
    tag = "users"
)]
pub async fn get_user(
    Path(id): Path<String>,
    Extension(ctx): Extension<ApiContext>,
) -> Response {
    let Ok(user_id) = Uuid::parse_str(id.trim()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    match ctx.directory.get(user_id).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = crate::users::store::UserRecord),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token"),
        (status = 409, description = "Username or email already exists"),
    ),
    tag = "users"
)]
pub async fn create_user(
    Extension(ctx): Extension<ApiContext>,
    payload: Option<Json<CreateUserRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload").into_response();
    };

    match ctx
        .directory
        .create(&request.username, &request.email, &request.password)
        .await
    {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    request_body = UpdateUserRequest,
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User replaced", body = crate::users::store::UserRecord),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username or email already exists"),
    ),
    tag = "users"
)]
pub async fn update_user(
    Path(id): Path<String>,
    Extension(ctx): Extension<ApiContext>,
    payload: Option<Json<UpdateUserRequest>>,
) -> Response {
    let Ok(user_id) = Uuid::parse_str(id.trim()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload").into_response();
    };

    match ctx
        .directory
        .update(user_id, &request.username, &request.email, &request.password)
        .await
    {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid user id"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found"),
    ),
    tag = "users"
)]
pub async fn delete_user(
    Path(id): Path<String>,
    Extension(ctx): Extension<ApiContext>,
) -> Response {
    let Ok(user_id) = Uuid::parse_str(id.trim()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    match ctx.directory.delete(user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}
