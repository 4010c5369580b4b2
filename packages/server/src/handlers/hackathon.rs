use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::entity::{hackathon, hackathon_participant};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminUser, AuthUser};
use crate::extractors::json::{AppJson, SanitizedJson};
use crate::models::hackathon::*;
use crate::state::AppState;
use crate::utils::lookup::find_hackathon_for_update;

#[utoipa::path(
    get,
    path = "/",
    tag = "Hackathons",
    operation_id = "listHackathons",
    summary = "List hackathons, newest first",
    responses(
        (status = 200, description = "Hackathons", body = Vec<HackathonResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_hackathons(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<HackathonResponse>>, AppError> {
    let hackathons = hackathon::Entity::find()
        .order_by_desc(hackathon::Column::CreatedAt)
        .order_by_desc(hackathon::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(hackathons.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/{id}/register",
    tag = "Hackathons",
    operation_id = "registerForHackathon",
    summary = "Register the caller as a participant",
    description = "Only while the hackathon is `open`. The capacity check and the insert happen under a row lock, so concurrent registrations never exceed `max_participants`.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 201, description = "Registered", body = RegistrationResponse),
        (status = 400, description = "Not open for registration (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already registered (CONFLICT) or full (CAPACITY_EXCEEDED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(hackathon_id, user_id = auth_user.user_id))]
pub async fn register_for_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_hackathon_for_update(&txn, hackathon_id).await?;

    if !existing.status.accepts_registrations() {
        return Err(AppError::Validation(format!(
            "Hackathon is {}, not open for registration",
            existing.status
        )));
    }
    if let Some(max) = existing.max_participants
        && existing.participant_count >= max
    {
        warn!(hackathon_id, max, "Registration rejected: hackathon full");
        return Err(AppError::CapacityExceeded("Hackathon is full".into()));
    }

    let participant = hackathon_participant::ActiveModel {
        hackathon_id: Set(hackathon_id),
        user_id: Set(auth_user.user_id),
        registered_at: Set(chrono::Utc::now()),
    };
    match participant.insert(&txn).await {
        Ok(_) => {}
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict("Already registered".into()));
        }
        Err(e) => return Err(e.into()),
    }

    let participant_count = existing.participant_count + 1;
    let mut active: hackathon::ActiveModel = existing.into();
    active.participant_count = Set(participant_count);
    active.updated_at = Set(chrono::Utc::now());
    active.update(&txn).await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            hackathon_id,
            user_id: auth_user.user_id,
            participant_count,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/hackathons",
    tag = "Hackathons",
    operation_id = "createHackathon",
    summary = "Create a hackathon",
    request_body = CreateHackathonRequest,
    responses(
        (status = 201, description = "Hackathon created", body = HackathonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(name = %payload.name))]
pub async fn create_hackathon(
    _admin: AdminUser,
    State(state): State<AppState>,
    SanitizedJson(payload): SanitizedJson<CreateHackathonRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_hackathon(&payload)?;

    let now = chrono::Utc::now();
    let model = hackathon::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        status: Set(payload.status),
        max_participants: Set(payload.max_participants),
        participant_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(hackathon_id = model.id, "Hackathon created");
    Ok((StatusCode::CREATED, Json(HackathonResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/hackathons/{id}/status",
    tag = "Hackathons",
    operation_id = "updateHackathonStatus",
    summary = "Move a hackathon to another status",
    description = "Completed and cancelled hackathons cannot change status.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = UpdateHackathonStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = HackathonResponse),
        (status = 400, description = "Hackathon is final (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(id, status = %payload.status))]
pub async fn update_hackathon_status(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateHackathonStatusRequest>,
) -> Result<Json<HackathonResponse>, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_hackathon_for_update(&txn, id).await?;

    if existing.status.is_terminal() && existing.status != payload.status {
        return Err(AppError::Validation(format!(
            "Hackathon is {} and can no longer change status",
            existing.status
        )));
    }

    let mut active: hackathon::ActiveModel = existing.into();
    active.status = Set(payload.status);
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}
