use std::time::Duration;

use axum::{middleware, routing::get, Extension, Router};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::middleware::AuthMiddleware;
use crate::gql::AppSchema;
use crate::routes::graphql::{graphiql, graphql_handler, graphql_ws_handler};
use crate::routes::health::health;
use crate::state::AppState;

/// Build the Axum router with health endpoint and GraphQL.
pub fn build_router(state: AppState, schema: AppSchema) -> Router {
    Router::new()
        // Simple liveness check; also proves store connectivity.
        .route("/health", get(health))
        // graphql post & subscription
        .route("/graphql", get(graphql_ws_handler).post(graphql_handler))
        .route("/graphiql", get(graphiql))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            AuthMiddleware::resolve_identity,
        ))
        .layer(Extension(schema))
        .with_state(state)
        // Useful default middlewares
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive()) // tighten later
}
