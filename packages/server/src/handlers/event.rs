use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::entity::{event, event_checkin};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::{AppJson, SanitizedJson};
use crate::models::event::*;
use crate::state::AppState;
use crate::utils::lookup::{find_event_for_update, find_user};

#[utoipa::path(
    get,
    path = "/events",
    tag = "Events",
    operation_id = "listEvents",
    summary = "List events",
    responses(
        (status = 200, description = "Events", body = Vec<EventResponse>),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn list_events(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = event::Entity::find()
        .order_by_desc(event::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/events",
    tag = "Events",
    operation_id = "createEvent",
    summary = "Create an event",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(name = %payload.name))]
pub async fn create_event(
    _admin: AdminUser,
    State(state): State<AppState>,
    SanitizedJson(payload): SanitizedJson<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_event(&payload)?;

    let model = event::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        capacity: Set(payload.capacity),
        checkin_count: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(EventResponse::from(model))))
}

#[utoipa::path(
    post,
    path = "/events/{id}/check-in",
    tag = "Events",
    operation_id = "checkIn",
    summary = "Check a member in from their QR code",
    description = "The capacity check and the insert happen under a row lock, so concurrent scans never exceed `capacity`.",
    params(("id" = i32, Path, description = "Event ID")),
    request_body = CheckInRequest,
    responses(
        (status = 201, description = "Checked in", body = CheckInResponse),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Event or user not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already checked in (CONFLICT) or full (CAPACITY_EXCEEDED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin_user, payload), fields(event_id, user_id = payload.user_id))]
pub async fn check_in(
    admin_user: AdminUser,
    State(state): State<AppState>,
    Path(event_id): Path<i32>,
    AppJson(payload): AppJson<CheckInRequest>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_event_for_update(&txn, event_id).await?;
    find_user(&txn, payload.user_id).await?;

    if let Some(capacity) = existing.capacity
        && existing.checkin_count >= capacity
    {
        warn!(event_id, capacity, "Check-in rejected: event full");
        return Err(AppError::CapacityExceeded("Event is at capacity".into()));
    }

    let checkin = event_checkin::ActiveModel {
        event_id: Set(event_id),
        user_id: Set(payload.user_id),
        checked_in_by: Set(admin_user.user_id),
        checked_in_at: Set(chrono::Utc::now()),
    };
    match checkin.insert(&txn).await {
        Ok(_) => {}
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict("Already checked in".into()));
        }
        Err(e) => return Err(e.into()),
    }

    let checkin_count = existing.checkin_count + 1;
    let mut active: event::ActiveModel = existing.into();
    active.checkin_count = Set(checkin_count);
    active.update(&txn).await?;
    txn.commit().await?;

    info!(event_id, user_id = payload.user_id, checkin_count, "Checked in");
    Ok((
        StatusCode::CREATED,
        Json(CheckInResponse {
            event_id,
            user_id: payload.user_id,
            checkin_count,
        }),
    ))
}
