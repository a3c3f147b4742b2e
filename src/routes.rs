use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers::{protected, public};
use crate::middleware::{load_session, login_required, verify_csrf};
use crate::state::AppState;

/// Build the full application router.
///
/// Every request passes the body limit, then the anti-forgery check, then
/// session resolution. Resource routes add the login gate on top.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(public::health::get))
        .merge(auth_routes())
        .merge(resource_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
                .layer(middleware::from_fn(verify_csrf))
                .layer(middleware::from_fn_with_state(state.clone(), load_session)),
        );

    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use protected::auth as session_auth;
    use public::auth;

    Router::new()
        .route("/api/signup", post(auth::signup::post))
        .route("/api/signin", post(auth::signin::post))
        .route("/api/token", get(auth::token::get))
        .route("/api/signout", get(session_auth::signout::get))
}

fn resource_routes(state: AppState) -> Router<AppState> {
    use protected::{article, comment};

    Router::new()
        .route(
            "/api/article",
            get(article::collection::get).post(article::collection::post),
        )
        .route(
            "/api/article/:id",
            get(article::item::get)
                .put(article::item::put)
                .delete(article::item::delete),
        )
        .route(
            "/api/article/:id/comment",
            get(article::comments::get).post(article::comments::post),
        )
        .route(
            "/api/comment/:id",
            get(comment::item::get)
                .put(comment::item::put)
                .delete(comment::item::delete),
        )
        .route_layer(middleware::from_fn_with_state(state, login_required))
}
