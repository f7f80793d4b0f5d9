use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::handlers::{
    app::{health_check, index},
    auth::{login_handler, login_page, logout_handler},
    dashboard::dashboard_handler,
    metrics::metrics,
    profile::profile_handler,
    resource::resource_routes,
};
use crate::middleware::auth::require_login;
use crate::resources::{Divisions, Positions, Roles, Users};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let server = state.settings.server.clone();

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(server.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            server.session_idle_minutes,
        )));

    let protected = Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/profile", get(profile_handler))
        .merge(resource_routes::<Users>())
        .merge(resource_routes::<Roles>())
        .merge(resource_routes::<Divisions>())
        .merge(resource_routes::<Positions>())
        .route_layer(from_fn(require_login));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/login", get(login_page).post(login_handler))
        .route("/logout", post(logout_handler))
        .merge(protected)
        .nest_service("/static", ServeDir::new(&server.static_dir))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
