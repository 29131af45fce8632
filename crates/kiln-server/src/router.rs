use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::resolve_caller;
use crate::handler;
use crate::state::AppState;

/// Build the axum router. Everything under `/v3` requires a caller.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/v3/domains", get(handler::list_domains))
        .route("/v3/packages/:guid", get(handler::get_package))
        .route("/v3/routes", get(handler::list_routes))
        .route("/v3/routes/:guid", get(handler::get_route))
        .layer(middleware::from_fn(resolve_caller));

    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
