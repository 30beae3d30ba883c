use crate::adapters::database::DbPool;
use crate::config::Config;
use crate::services::account_service::AccountService;
use crate::services::auth_service::AuthService;
use crate::services::category_service::CategoryService;
use crate::services::health_service::HealthService;
use crate::services::post_service::PostService;
use crate::services::rate_limit_service::{RateLimitService, RateLimitTier, record_decisions};
use anyhow::Context;
use axum::body::Body;
use axum::http::Request;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod accounts;
pub mod categories;
pub mod health;
pub mod messages;
pub mod middleware;
pub mod schemas;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub account_service: AccountService,
    pub auth_service: AuthService,
    pub category_service: CategoryService,
    pub post_service: PostService,
    pub rate_limit_service: RateLimitService,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
}

#[derive(Clone, Debug)]
pub struct ServiceContainer {
    pub pool: DbPool,
    pub account_service: AccountService,
    pub auth_service: AuthService,
    pub category_service: CategoryService,
    pub post_service: PostService,
    pub rate_limit_service: RateLimitService,
}

/// Configures and returns the public API router.
///
/// # Errors
/// Returns an error if a rate limiter cannot be built from the configuration.
pub fn app_router(config: Config, services: ServiceContainer) -> anyhow::Result<Router> {
    let extractor = services.rate_limit_service.extractor.clone();
    let limiter = |tier: RateLimitTier| {
        let quota = tier.quota(&config.rate_limit);
        GovernorConfigBuilder::default()
            .per_nanosecond(quota.replenish_every_ns)
            .burst_size(quota.burst)
            .key_extractor(extractor.clone())
            .finish()
            .map(Arc::new)
            .with_context(|| format!("{} rate limiter rejected its configuration", tier.as_str()))
    };
    let standard_conf = limiter(RateLimitTier::Standard)?;
    // Registration and login hash passwords, so they get the stricter tier.
    let auth_conf = limiter(RateLimitTier::Auth)?;

    let state = AppState {
        config,
        account_service: services.account_service,
        auth_service: services.auth_service,
        category_service: services.category_service,
        post_service: services.post_service,
        rate_limit_service: services.rate_limit_service,
    };

    let auth_routes = Router::new()
        .route("/accounts/register", post(accounts::register))
        .route("/accounts/login", post(accounts::login))
        .layer(GovernorLayer::new(auth_conf));

    let api_routes = Router::new()
        .route("/categories", get(categories::list).post(categories::create))
        .route("/messages", get(messages::list_recent).post(messages::create))
        .route("/messages/{postId}", get(messages::get))
        .route("/messages/{postId}/reply", post(messages::reply))
        .route("/messages/{postId}/like", patch(messages::like))
        .route("/messages/{postId}/dislike", patch(messages::dislike))
        .route("/messages/categories/{categoryId}", get(messages::by_category))
        .route("/messages/categories/{categoryId}/active", get(messages::most_active))
        .route("/messages/categories/{categoryId}/history", get(messages::history))
        .layer(GovernorLayer::new(standard_conf));

    let router = Router::new()
        .nest("/api/v1", auth_routes.merge(api_routes))
        .layer(from_fn_with_state(state.rate_limit_service.clone(), record_decisions))
        .layer(PropagateRequestIdLayer::new(axum::http::HeaderName::from_static("x-request-id")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                        "user_id" = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        let status = response.status();
                        span.record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(
            axum::http::HeaderName::from_static("x-request-id"),
            middleware::MakeRequestUuidOrHeader,
        ))
        .with_state(state);

    Ok(router)
}

pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new().route("/livez", get(health::livez)).route("/readyz", get(health::readyz)).with_state(state)
}
