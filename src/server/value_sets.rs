use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{
    CreateTemplateValueSetRequest, PaginationParams, SetTemplateValuesRequest,
    UpdateTemplateValueSetRequest,
};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse, StoreOptionExt, StoreResultExt,
    paginate,
};
use crate::server::validation::validate_hostname;
use crate::store::Store;
use crate::template::is_reserved;
use crate::types::TemplateValueSet;

pub async fn list_value_sets(
    State(state): State<Arc<AppState>>,
    Path(template_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let cursor = params.cursor.as_deref().unwrap_or("");

    store
        .get_config_template_by_id(&template_id)
        .api_err("Failed to get config template")?
        .or_not_found("Config Template not found")?;

    let value_sets = store
        .list_template_value_sets(&template_id, cursor, DEFAULT_PAGE_SIZE + 1)
        .api_err("Failed to list template value sets")?;

    let (value_sets, next_cursor, has_more) =
        paginate(value_sets, DEFAULT_PAGE_SIZE as usize, |vs| {
            vs.hostname.clone()
        });

    Ok::<_, ApiError>(Json(PaginatedResponse::new(
        value_sets,
        next_cursor,
        has_more,
    )))
}

pub async fn create_value_set(
    State(state): State<Arc<AppState>>,
    Path(template_id): Path<String>,
    Json(req): Json<CreateTemplateValueSetRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    validate_hostname(&req.hostname)?;

    let template = store
        .get_config_template_by_id(&template_id)
        .api_err("Failed to get config template")?
        .or_not_found("Config Template not found")?;

    if store
        .get_template_value_set(&template.id, &req.hostname)
        .api_err("Failed to check template value set")?
        .is_some()
    {
        return Err(ApiError::conflict(
            "Template Value Set hostname already exist, please use another one",
        ));
    }

    let now = Utc::now();
    let value_set = TemplateValueSet {
        id: Uuid::new_v4().to_string(),
        config_template_id: template.id,
        hostname: req.hostname,
        created_at: now,
        updated_at: now,
    };

    store
        .create_template_value_set(&value_set)
        .api_err("Failed to create template value set")?;

    apply_values(store, &value_set.id, &req.values)?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(value_set))))
}

pub async fn get_value_set(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let value_set = state
        .store
        .get_template_value_set_by_id(&id)
        .api_err("Failed to get template value set")?
        .or_not_found("Template Value Set not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(value_set)))
}

pub async fn update_value_set(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTemplateValueSetRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let mut value_set = store
        .get_template_value_set_by_id(&id)
        .api_err("Failed to get template value set")?
        .or_not_found("Template Value Set not found")?;

    if let Some(hostname) = req.hostname {
        validate_hostname(&hostname)?;

        if hostname != value_set.hostname
            && store
                .get_template_value_set(&value_set.config_template_id, &hostname)
                .api_err("Failed to check template value set hostname")?
                .is_some()
        {
            return Err(ApiError::conflict(
                "Template Value Set hostname already exist, please use another one",
            ));
        }
        value_set.hostname = hostname;
    }

    value_set.updated_at = Utc::now();
    store
        .update_template_value_set(&value_set)
        .api_err("Failed to update template value set")?;

    if let Some(values) = req.values {
        apply_values(store, &value_set.id, &values)?;
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(value_set)))
}

pub async fn delete_value_set(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let value_set = state
        .store
        .get_template_value_set_by_id(&id)
        .api_err("Failed to get template value set")?
        .or_not_found("Template Value Set not found")?;

    state
        .store
        .delete_template_value_set(&value_set.id)
        .api_err("Failed to delete template value set")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn list_values(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    store
        .get_template_value_set_by_id(&id)
        .api_err("Failed to get template value set")?
        .or_not_found("Template Value Set not found")?;

    let values = store
        .list_template_values(&id)
        .api_err("Failed to list template values")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(values)))
}

pub async fn set_values(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetTemplateValuesRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    store
        .get_template_value_set_by_id(&id)
        .api_err("Failed to get template value set")?
        .or_not_found("Template Value Set not found")?;

    apply_values(store, &id, &req.values)?;

    let values = store
        .list_template_values(&id)
        .api_err("Failed to list template values")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(values)))
}

/// Writes user-supplied values into a value set. The reserved hostname
/// variable is read-only through this path and silently skipped.
fn apply_values(
    store: &dyn Store,
    value_set_id: &str,
    values: &HashMap<String, String>,
) -> Result<(), ApiError> {
    for (name, value) in values {
        if is_reserved(name) {
            continue;
        }

        match store.set_template_value(value_set_id, name, value) {
            Ok(()) => {}
            Err(Error::NotFound) => {
                return Err(ApiError::bad_request(format!(
                    "unknown template variable: {name}"
                )));
            }
            Err(_) => return Err(ApiError::internal("Failed to set template value")),
        }
    }
    Ok(())
}
