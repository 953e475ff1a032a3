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
use crate::server::dto::{CreateProjectRequest, PaginationParams, UpdateProjectRequest};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse, StoreOptionExt, StoreResultExt,
    paginate,
};
use crate::server::validation::validate_project_name;
use crate::types::Project;

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let cursor = params.cursor.as_deref().unwrap_or("");

    let projects = state
        .store
        .list_projects(cursor, DEFAULT_PAGE_SIZE + 1)
        .api_err("Failed to list projects")?;

    let (projects, next_cursor, has_more) =
        paginate(projects, DEFAULT_PAGE_SIZE as usize, |p| p.name.clone());

    Ok::<_, ApiError>(Json(PaginatedResponse::new(projects, next_cursor, has_more)))
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    validate_project_name(&req.name)?;

    if state
        .store
        .get_project_by_name(&req.name)
        .api_err("Failed to check existing project")?
        .is_some()
    {
        return Err(ApiError::conflict(
            "Project name already exist, please use another one",
        ));
    }

    let now = Utc::now();
    let project = Project {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_project(&project)
        .api_err("Failed to create project")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(project))))
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = state
        .store
        .get_project(&id)
        .api_err("Failed to get project")?
        .or_not_found("Project not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(project)))
}

pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProjectRequest>,
) -> impl IntoResponse {
    let mut project = state
        .store
        .get_project(&id)
        .api_err("Failed to get project")?
        .or_not_found("Project not found")?;

    if let Some(name) = req.name {
        validate_project_name(&name)?;

        if name != project.name
            && state
                .store
                .get_project_by_name(&name)
                .api_err("Failed to check project name")?
                .is_some()
        {
            return Err(ApiError::conflict(
                "Project name already exist, please use another one",
            ));
        }
        project.name = name;
    }

    project.updated_at = Utc::now();
    state
        .store
        .update_project(&project)
        .api_err("Failed to update project")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(project)))
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = state
        .store
        .get_project(&id)
        .api_err("Failed to get project")?
        .or_not_found("Project not found")?;

    state
        .store
        .delete_project(&project.id)
        .api_err("Failed to delete project")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
