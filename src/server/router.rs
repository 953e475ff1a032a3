use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use super::{export, projects, templates, value_sets, variables};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Directory rendered configurations are exported to.
    pub export_dir: PathBuf,
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Projects
        .route("/projects", get(projects::list_projects))
        .route("/projects", post(projects::create_project))
        .route("/projects/{id}", get(projects::get_project))
        .route("/projects/{id}", patch(projects::update_project))
        .route("/projects/{id}", delete(projects::delete_project))
        // Config templates
        .route("/projects/{id}/templates", get(templates::list_templates))
        .route("/projects/{id}/templates", post(templates::create_template))
        .route("/templates/{id}", get(templates::get_template))
        .route("/templates/{id}", patch(templates::update_template))
        .route("/templates/{id}", delete(templates::delete_template))
        // Template variables (created and removed by content reconciliation)
        .route("/templates/{id}/variables", get(variables::list_variables))
        .route("/variables/{id}", get(variables::get_variable))
        .route("/variables/{id}", patch(variables::update_variable))
        // Template value sets
        .route("/templates/{id}/value-sets", get(value_sets::list_value_sets))
        .route("/templates/{id}/value-sets", post(value_sets::create_value_set))
        .route("/value-sets/{id}", get(value_sets::get_value_set))
        .route("/value-sets/{id}", patch(value_sets::update_value_set))
        .route("/value-sets/{id}", delete(value_sets::delete_value_set))
        .route("/value-sets/{id}/values", get(value_sets::list_values))
        .route("/value-sets/{id}/values", put(value_sets::set_values))
        // Rendering and export
        .route("/value-sets/{id}/config", get(export::get_rendered_config))
        .route("/templates/{id}/export", post(export::export_template))
}
