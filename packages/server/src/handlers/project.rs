use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{judging_map, judging_project};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::SanitizedJson;
use crate::models::project::*;
use crate::state::AppState;
use crate::utils::lookup::find_hackathon;

fn new_project(hackathon_id: i32, payload: CreateProjectRequest) -> judging_project::ActiveModel {
    judging_project::ActiveModel {
        hackathon_id: Set(hackathon_id),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        team_name: Set(payload.team_name),
        project_url: Set(payload.project_url),
        table_number: Set(payload.table_number),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
}

fn map_table_conflict(e: DbErr) -> AppError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        AppError::Conflict("Table number is already used in this hackathon".into())
    } else {
        e.into()
    }
}

#[utoipa::path(
    post,
    path = "/hackathons/{id}/projects",
    tag = "Projects",
    operation_id = "createProject",
    summary = "Add a project to a hackathon",
    description = "Existing judge queues are not changed; rebuild them with initializeQueue to include the new project. Text fields, `project_url` included, are stored and returned HTML-escaped.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created; `project_url` is HTML-escaped", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Table number taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(hackathon_id, table = payload.table_number))]
pub async fn create_project(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
    SanitizedJson(payload): SanitizedJson<CreateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_project(&payload)?;
    find_hackathon(&state.db, hackathon_id).await?;

    let model = new_project(hackathon_id, payload)
        .insert(&state.db)
        .await
        .map_err(map_table_conflict)?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(model))))
}

#[utoipa::path(
    post,
    path = "/hackathons/{id}/projects/bulk",
    tag = "Projects",
    operation_id = "bulkCreateProjects",
    summary = "Add many projects at once",
    description = "All-or-nothing: a duplicate table number, in the payload or against existing projects, rejects the whole batch.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = BulkCreateProjectsRequest,
    responses(
        (status = 201, description = "Projects created", body = BulkCreateProjectsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Table number taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(hackathon_id, count = payload.projects.len()))]
pub async fn bulk_create_projects(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
    SanitizedJson(payload): SanitizedJson<BulkCreateProjectsRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_bulk_create_projects(&payload)?;

    let txn = state.db.begin().await?;
    find_hackathon(&txn, hackathon_id).await?;

    let created = payload.projects.len();
    let models: Vec<_> = payload
        .projects
        .into_iter()
        .map(|p| new_project(hackathon_id, p))
        .collect();
    judging_project::Entity::insert_many(models)
        .exec_without_returning(&txn)
        .await
        .map_err(map_table_conflict)?;
    txn.commit().await?;

    info!(hackathon_id, created, "Projects created");
    Ok((
        StatusCode::CREATED,
        Json(BulkCreateProjectsResponse { created }),
    ))
}

#[utoipa::path(
    post,
    path = "/hackathons/{id}/maps",
    tag = "Projects",
    operation_id = "addMap",
    summary = "Attach a floor plan to a hackathon",
    description = "`image_url` is stored and returned HTML-escaped, e.g. `https:&#x2F;&#x2F;cdn.example.org&#x2F;hall.png`.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = CreateMapRequest,
    responses(
        (status = 201, description = "Map added; `image_url` is HTML-escaped", body = MapResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(hackathon_id))]
pub async fn add_map(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
    SanitizedJson(payload): SanitizedJson<CreateMapRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_map(&payload)?;
    find_hackathon(&state.db, hackathon_id).await?;

    let model = judging_map::ActiveModel {
        hackathon_id: Set(hackathon_id),
        name: Set(payload.name.trim().to_string()),
        image_url: Set(payload.image_url.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(MapResponse::from(model))))
}
