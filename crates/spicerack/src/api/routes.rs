//! API route definitions.

use axum::http::{HeaderValue, Method, header};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};

use crate::auth::auth_middleware;

use super::handlers;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.allowed_origins);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let auth_state = state.auth.clone();

    // Protected routes (require authentication)
    let mut protected_routes = Router::new()
        .route("/auth/me", get(handlers::me))
        .route(
            "/spices",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/spices/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        );

    // Public routes
    let mut public_routes = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login));

    if state.catalog_requires_auth {
        protected_routes = protected_routes.merge(product_routes());
    } else {
        warn!("Product catalog routes are served without authentication");
        public_routes = public_routes.merge(product_routes());
    }

    let protected_routes = protected_routes
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", public_routes.merge(protected_routes))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION];

    let base = CorsLayer::new().allow_methods(methods).allow_headers(headers);

    if allowed_origins.is_empty() {
        info!("CORS: No origins configured, allowing any origin");
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                warn!("CORS: Invalid origin in config: {}", origin);
                None
            })
        })
        .collect();

    if origins.is_empty() {
        tracing::error!("CORS: All configured origins are invalid!");
        return base.allow_origin(AllowOrigin::exact(HeaderValue::from_static("null")));
    }

    info!("CORS: Allowing {} origin(s)", origins.len());
    base.allow_origin(origins)
}
