use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;

use crate::server::AppState;
use crate::server::dto::UpdateTemplateVariableRequest;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::template::{convert_variable_name, is_reserved, validate_variable_name};

pub async fn list_variables(
    State(state): State<Arc<AppState>>,
    Path(template_id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    store
        .get_config_template_by_id(&template_id)
        .api_err("Failed to get config template")?
        .or_not_found("Config Template not found")?;

    let variables = store
        .list_template_variables(&template_id)
        .api_err("Failed to list template variables")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(variables)))
}

pub async fn get_variable(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let variable = state
        .store
        .get_template_variable_by_id(&id)
        .api_err("Failed to get template variable")?
        .or_not_found("Template Variable not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(variable)))
}

pub async fn update_variable(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTemplateVariableRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let mut variable = store
        .get_template_variable_by_id(&id)
        .api_err("Failed to get template variable")?
        .or_not_found("Template Variable not found")?;

    if let Some(name) = req.name {
        let slug = convert_variable_name(&name);

        if slug != variable.name {
            if is_reserved(&variable.name) {
                return Err(ApiError::bad_request(
                    "the hostname variable cannot be renamed",
                ));
            }

            if let Err(e) = validate_variable_name(&slug) {
                return Err(ApiError::bad_request(e.to_string()));
            }

            if store
                .get_template_variable(&variable.config_template_id, &slug)
                .api_err("Failed to check template variable name")?
                .is_some()
            {
                return Err(ApiError::conflict(
                    "Template Variable name already exist, please use another one",
                ));
            }

            // Values reference the variable by id, so the rename is visible
            // across every value set of the template.
            variable.name = slug;
        }
    }

    if let Some(description) = req.description {
        variable.description = description;
    }

    variable.updated_at = Utc::now();
    store
        .update_template_variable(&variable)
        .api_err("Failed to update template variable")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(variable)))
}
