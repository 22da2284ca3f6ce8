use crate::{
    api::handlers::{health, login, users},
    auth::{guard, token::TokenCodec},
    users::{pg::PgStore, store::UserStore, UserDirectory},
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
    Extension, Router,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub mod handlers;
mod openapi;

pub use openapi::ApiDoc;

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

/// Shared handles passed to every handler. No ambient singletons; the
/// store and codec are constructed once at startup and injected.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn UserStore>,
    pub directory: Arc<UserDirectory>,
    pub tokens: Arc<TokenCodec>,
}

impl ApiContext {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, tokens: Arc<TokenCodec>) -> Self {
        let directory = Arc::new(UserDirectory::new(store.clone()));
        Self {
            store,
            directory,
            tokens,
        }
    }
}

/// Build the application router around the given context.
///
/// Everything under `/v1/users` sits behind the access guard; `/v1/login`
/// and `/health` are open.
pub fn router(ctx: ApiContext) -> Router {
    let protected = Router::new()
        .route("/v1/users", get(users::list_users).post(users::create_user))
        .route(
            "/v1/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route_layer(middleware::from_fn(guard::require_token));

    let tokens = ctx.tokens.clone();

    Router::new()
        .merge(protected)
        .route("/v1/login", post(login::login))
        .route("/health", get(health::health))
        .route("/openapi.json", get(openapi::serve))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(ctx))
                .layer(Extension(tokens)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: &str, codec: TokenCodec) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn)
        .await
        .context("Failed to connect to database")?;

    apply_schema(&pool).await?;

    let ctx = ApiContext::new(
        Arc::new(PgStore::new(pool)),
        Arc::new(codec),
    );

    let app = router(ctx);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

/// Apply the embedded schema at startup. Statements are idempotent
/// (`IF NOT EXISTS`), so repeated startups are safe.
async fn apply_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA_SQL
        .split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
    {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("failed to apply schema statement")?;
    }
    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
