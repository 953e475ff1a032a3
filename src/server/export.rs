use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::ExportResponse;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::store::Store;
use crate::template::render;

/// Returns the rendered configuration for a single value set as plain text.
pub async fn get_rendered_config(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let value_set = store
        .get_template_value_set_by_id(&id)
        .api_err("Failed to get template value set")?
        .or_not_found("Template Value Set not found")?;

    let template = store
        .get_config_template_by_id(&value_set.config_template_id)
        .api_err("Failed to get config template")?
        .or_not_found("Config Template not found")?;

    let values = value_map(store, &value_set.id)?;
    let rendered = render(&template.template_content, &values);

    Ok::<_, ApiError>((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        rendered,
    ))
}

/// Renders every value set of a template into the export directory, one file
/// per hostname.
pub async fn export_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let template = store
        .get_config_template_by_id(&id)
        .api_err("Failed to get config template")?
        .or_not_found("Config Template not found")?;

    let project = store
        .get_project(&template.project_id)
        .api_err("Failed to get project")?
        .or_not_found("Project not found")?;

    let value_sets = store
        .list_template_value_sets(&template.id, "", i32::MAX)
        .api_err("Failed to list template value sets")?;

    let target_dir = state.export_dir.join(&project.name).join(&template.name);
    fs::create_dir_all(&target_dir)
        .map_err(|_| ApiError::internal("Failed to create export directory"))?;

    let mut exported = Vec::with_capacity(value_sets.len());
    for value_set in &value_sets {
        let values = value_map(store, &value_set.id)?;
        let rendered = render(&template.template_content, &values);

        let path = target_dir.join(format!("{}.txt", value_set.hostname));
        fs::write(&path, rendered)
            .map_err(|_| ApiError::internal("Failed to write rendered configuration"))?;

        exported.push(value_set.hostname.clone());
    }

    tracing::info!(
        "exported {} configuration(s) for template '{}' to {}",
        exported.len(),
        template.name,
        target_dir.display()
    );

    Ok::<_, ApiError>(Json(ApiResponse::success(ExportResponse {
        exported,
        export_dir: target_dir.display().to_string(),
    })))
}

fn value_map(store: &dyn Store, value_set_id: &str) -> Result<HashMap<String, String>, ApiError> {
    let values = store
        .list_template_values(value_set_id)
        .api_err("Failed to list template values")?;

    Ok(values
        .into_iter()
        .map(|v| (v.variable_name, v.value))
        .collect())
}
