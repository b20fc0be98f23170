pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/refresh", post(routes::auth::refresh))
        .route("/me", get(routes::auth::me))
        .route("/me", put(routes::auth::update_me));

    // Activity routes (list and get are public)
    let activity_routes = Router::new()
        .route("/", get(routes::activity::list))
        .route("/", post(routes::activity::create))
        .route("/{activity_id}", get(routes::activity::get))
        .route("/{activity_id}", put(routes::activity::update))
        .route("/{activity_id}", delete(routes::activity::delete))
        .route("/{activity_id}/join", post(routes::activity::join))
        .route("/{activity_id}/leave", post(routes::activity::leave))
        .route(
            "/{activity_id}/attendance",
            post(routes::activity::record_attendance),
        )
        .route("/{activity_id}/state", post(routes::activity::change_state));

    // User routes
    let user_routes = Router::new().route("/{user_id}/activities", get(routes::user::activities));

    // Admin routes (all handlers check the admin role themselves)
    let admin_routes = Router::new()
        .route("/users", get(routes::admin::list_users))
        .route("/users/{user_id}/role", put(routes::admin::change_role))
        .route("/users/{user_id}", delete(routes::admin::remove_user));

    // First-run bootstrap, unauthenticated until an admin exists
    let setup_routes =
        Router::new().route("/make-admin/{user_id}", put(routes::admin::make_first_admin));

    // Compose API
    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/activities", activity_routes)
        .nest("/users", user_routes)
        .nest("/admin", admin_routes)
        .nest("/setup", setup_routes);

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
