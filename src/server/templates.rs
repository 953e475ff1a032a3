use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::server::AppState;
use crate::server::dto::{
    CreateConfigTemplateRequest, PaginationParams, TemplateSyncResponse,
    UpdateConfigTemplateRequest,
};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse, StoreOptionExt, StoreResultExt,
    paginate,
};
use crate::server::validation::validate_template_name;
use crate::template::referenced_variables;
use crate::types::{ConfigTemplate, VariableReconciliation};

pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let cursor = params.cursor.as_deref().unwrap_or("");

    store
        .get_project(&project_id)
        .api_err("Failed to get project")?
        .or_not_found("Project not found")?;

    let templates = store
        .list_config_templates(&project_id, cursor, DEFAULT_PAGE_SIZE + 1)
        .api_err("Failed to list config templates")?;

    let (templates, next_cursor, has_more) =
        paginate(templates, DEFAULT_PAGE_SIZE as usize, |t| t.name.clone());

    Ok::<_, ApiError>(Json(PaginatedResponse::new(templates, next_cursor, has_more)))
}

pub async fn create_template(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
    Json(req): Json<CreateConfigTemplateRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    validate_template_name(&req.name)?;

    let project = store
        .get_project(&project_id)
        .api_err("Failed to get project")?
        .or_not_found("Project not found")?;

    if store
        .get_config_template(&project.id, &req.name)
        .api_err("Failed to check config template")?
        .is_some()
    {
        return Err(ApiError::conflict(
            "Config Template name already exist, please use another one",
        ));
    }

    let now = Utc::now();
    let template = ConfigTemplate {
        id: Uuid::new_v4().to_string(),
        project_id: project.id,
        name: req.name,
        template_content: req.template_content,
        created_at: now,
        updated_at: now,
    };

    store
        .create_config_template(&template)
        .api_err("Failed to create config template")?;

    let reconciliation = sync_variables(state.as_ref(), &template)?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(TemplateSyncResponse {
            template,
            reconciliation,
        })),
    ))
}

pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let template = state
        .store
        .get_config_template_by_id(&id)
        .api_err("Failed to get config template")?
        .or_not_found("Config Template not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(template)))
}

pub async fn update_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateConfigTemplateRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let mut template = store
        .get_config_template_by_id(&id)
        .api_err("Failed to get config template")?
        .or_not_found("Config Template not found")?;

    if let Some(name) = req.name {
        validate_template_name(&name)?;

        if name != template.name
            && store
                .get_config_template(&template.project_id, &name)
                .api_err("Failed to check config template name")?
                .is_some()
        {
            return Err(ApiError::conflict(
                "Config Template name already exist, please use another one",
            ));
        }
        template.name = name;
    }

    let mut content_changed = false;
    if let Some(content) = req.template_content {
        if content != template.template_content {
            template.template_content = content;
            content_changed = true;
        }
    }

    template.updated_at = Utc::now();
    store
        .update_config_template(&template)
        .api_err("Failed to update config template")?;

    let reconciliation = if content_changed {
        sync_variables(state.as_ref(), &template)?
    } else {
        VariableReconciliation::default()
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(TemplateSyncResponse {
        template,
        reconciliation,
    })))
}

pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let template = state
        .store
        .get_config_template_by_id(&id)
        .api_err("Failed to get config template")?
        .or_not_found("Config Template not found")?;

    state
        .store
        .delete_config_template(&template.id)
        .api_err("Failed to delete config template")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

/// Syncs variable rows against the names referenced by the template content.
fn sync_variables(
    state: &AppState,
    template: &ConfigTemplate,
) -> Result<VariableReconciliation, ApiError> {
    let referenced = referenced_variables(&template.template_content);

    let reconciliation = state
        .store
        .reconcile_template_variables(&template.id, &referenced)
        .api_err("Failed to reconcile template variables")?;

    if !reconciliation.added.is_empty() || !reconciliation.removed.is_empty() {
        tracing::info!(
            "reconciled variables for template '{}': added {:?}, removed {:?}",
            template.name,
            reconciliation.added,
            reconciliation.removed
        );
    }

    Ok(reconciliation)
}
