//! Operator login: credentials in, signed token out.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::{
    api::ApiContext,
    auth::{self, AuthError},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing or malformed payload"),
        (status = 401, description = "Invalid username or password"),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(ctx): Extension<ApiContext>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload").into_response();
    };

    match auth::login(
        ctx.store.as_ref(),
        &ctx.tokens,
        &request.username,
        &request.password,
    )
    .await
    {
        Ok(token) => (StatusCode::OK, Json(LoginResponse { token })).into_response(),
        Err(AuthError::InvalidCredentials) => {
            // Unknown username and wrong password answer identically.
            (StatusCode::UNAUTHORIZED, "Invalid username or password").into_response()
        }
        Err(AuthError::Internal(err)) => {
            error!("login failed: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
