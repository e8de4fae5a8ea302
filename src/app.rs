use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/sw.js", get(handlers::service_worker))
        .route(
            "/api/subscriptions",
            get(handlers::list_subscriptions).post(handlers::save_subscription),
        )
        .route("/api/subscriptions/:id", delete(handlers::delete_subscription))
        .route("/api/summary", get(handlers::get_summary))
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::add_category),
        )
        .route("/api/categories/:name", delete(handlers::delete_category))
        .route("/api/reminders", get(handlers::get_reminders))
        .route("/api/export", get(handlers::export_backup))
        .route("/api/import", post(handlers::import_backup))
        .route("/api/theme", get(handlers::get_theme).put(handlers::set_theme))
        .with_state(state)
}
