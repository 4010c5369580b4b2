use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{admin, judge, judge_assignment, judge_queue_entry, judge_vote, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::{AppJson, SanitizedJson};
use crate::judging::ranking::VoteRecord;
use crate::judging::{QueueService, RankingService, Rankings};
use crate::models::admin::*;
use crate::models::judge::*;
use crate::models::shared::validate_name;
use crate::state::AppState;
use crate::utils::access;
use crate::utils::lookup::{find_hackathon, find_judge, find_judge_for_update, find_user};

#[utoipa::path(
    get,
    path = "/admins",
    tag = "Admins",
    operation_id = "listAdmins",
    summary = "List users holding the admin capability",
    responses(
        (status = 200, description = "Admins", body = Vec<AdminResponse>),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn list_admins(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminResponse>>, AppError> {
    let admins = admin::Entity::find()
        .order_by_asc(admin::Column::Id)
        .all(&state.db)
        .await?;
    let usernames: HashMap<i32, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(admins.iter().map(|a| a.user_id)))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let data = admins
        .into_iter()
        .map(|a| AdminResponse {
            id: a.id,
            user_id: a.user_id,
            username: usernames.get(&a.user_id).cloned().unwrap_or_default(),
            created_at: a.created_at,
        })
        .collect();
    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/admins",
    tag = "Admins",
    operation_id = "grantAdmin",
    summary = "Grant the admin capability to a user",
    request_body = GrantAdminRequest,
    responses(
        (status = 201, description = "Admin granted"),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already an admin (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin_user, payload), fields(admin = admin_user.user_id, user_id = payload.user_id))]
pub async fn grant_admin(
    admin_user: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<GrantAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    find_user(&state.db, payload.user_id).await?;

    let model = admin::ActiveModel {
        user_id: Set(payload.user_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    match model.insert(&state.db).await {
        Ok(_) => {}
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict("User is already an admin".into()));
        }
        Err(e) => return Err(e.into()),
    }

    access::invalidate_user(&state, payload.user_id);
    info!(granted_by = admin_user.user_id, user_id = payload.user_id, "Admin granted");
    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    delete,
    path = "/admins/{user_id}",
    tag = "Admins",
    operation_id = "revokeAdmin",
    summary = "Revoke a user's admin capability",
    description = "Admins cannot revoke themselves.",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "Admin revoked"),
        (status = 400, description = "Self-revocation (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User is not an admin (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin_user), fields(admin = admin_user.user_id, user_id))]
pub async fn revoke_admin(
    admin_user: AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    if user_id == admin_user.user_id {
        return Err(AppError::Validation("Cannot revoke your own admin access".into()));
    }

    let result = admin::Entity::delete_many()
        .filter(admin::Column::UserId.eq(user_id))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("User is not an admin".into()));
    }

    access::invalidate_user(&state, user_id);
    info!(revoked_by = admin_user.user_id, user_id, "Admin revoked");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/judges",
    tag = "Judges",
    operation_id = "listJudges",
    summary = "List all judges",
    responses(
        (status = 200, description = "Judges", body = Vec<JudgeResponse>),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn list_judges(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<JudgeResponse>>, AppError> {
    let judges = judge::Entity::find()
        .order_by_asc(judge::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(judges.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/judges",
    tag = "Judges",
    operation_id = "createJudge",
    summary = "Make a user a judge",
    request_body = CreateJudgeRequest,
    responses(
        (status = 201, description = "Judge created", body = JudgeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already a judge (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(user_id = payload.user_id))]
pub async fn create_judge(
    _admin: AdminUser,
    State(state): State<AppState>,
    SanitizedJson(payload): SanitizedJson<CreateJudgeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = find_user(&state.db, payload.user_id).await?;
    let name = match payload.name {
        Some(name) => {
            validate_name(&name, "Name")?;
            name.trim().to_string()
        }
        None => user.username,
    };

    let model = judge::ActiveModel {
        user_id: Set(payload.user_id),
        name: Set(name),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let judge = match model.insert(&state.db).await {
        Ok(judge) => judge,
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict("User is already a judge".into()));
        }
        Err(e) => return Err(e.into()),
    };

    access::invalidate_user(&state, judge.user_id);
    info!(judge_id = judge.id, user_id = judge.user_id, "Judge created");
    Ok((StatusCode::CREATED, Json(JudgeResponse::from(judge))))
}

#[utoipa::path(
    patch,
    path = "/judges/{judge_id}",
    tag = "Judges",
    operation_id = "updateJudge",
    summary = "Activate or deactivate a judge",
    description = "An inactive judge fails the judge capability check immediately. Votes, queue and assignments are kept, so reactivation resumes where the judge left off.",
    params(("judge_id" = i32, Path, description = "Judge ID")),
    request_body = UpdateJudgeRequest,
    responses(
        (status = 200, description = "Judge updated", body = JudgeResponse),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Judge not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(judge_id, is_active = payload.is_active))]
pub async fn update_judge(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(judge_id): Path<i32>,
    AppJson(payload): AppJson<UpdateJudgeRequest>,
) -> Result<Json<JudgeResponse>, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_judge_for_update(&txn, judge_id).await?;
    let mut active: judge::ActiveModel = existing.into();
    active.is_active = Set(payload.is_active);
    let judge = active.update(&txn).await?;
    txn.commit().await?;

    access::invalidate_user(&state, judge.user_id);
    info!(judge_id, is_active = judge.is_active, "Judge updated");
    Ok(Json(JudgeResponse::from(judge)))
}

#[utoipa::path(
    delete,
    path = "/judges/{judge_id}",
    tag = "Judges",
    operation_id = "removeJudge",
    summary = "Remove a judge and everything they recorded",
    description = "Deletes the judge's votes, queue entries and assignments together with the judge.",
    params(("judge_id" = i32, Path, description = "Judge ID")),
    responses(
        (status = 204, description = "Judge removed"),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Judge not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(judge_id))]
pub async fn remove_judge(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(judge_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let judge = find_judge_for_update(&txn, judge_id).await?;

    let votes = judge_vote::Entity::delete_many()
        .filter(judge_vote::Column::JudgeId.eq(judge_id))
        .exec(&txn)
        .await?;
    judge_queue_entry::Entity::delete_many()
        .filter(judge_queue_entry::Column::JudgeId.eq(judge_id))
        .exec(&txn)
        .await?;
    judge_assignment::Entity::delete_many()
        .filter(judge_assignment::Column::JudgeId.eq(judge_id))
        .exec(&txn)
        .await?;
    judge::Entity::delete_by_id(judge_id).exec(&txn).await?;
    txn.commit().await?;

    access::invalidate_user(&state, judge.user_id);
    info!(judge_id, votes = votes.rows_affected, "Judge removed");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/judges/{judge_id}/assignments",
    tag = "Judges",
    operation_id = "assignToHackathon",
    summary = "Assign a judge to a hackathon",
    description = "Creates the assignment and a queue over all projects in table-number order. A second assignment of the same pair returns 409, also under concurrent requests.",
    params(("judge_id" = i32, Path, description = "Judge ID")),
    request_body = AssignJudgeRequest,
    responses(
        (status = 201, description = "Judge assigned", body = AssignmentResponse),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Judge or hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already assigned (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(judge_id, hackathon_id = payload.hackathon_id))]
pub async fn assign_to_hackathon(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(judge_id): Path<i32>,
    AppJson(payload): AppJson<AssignJudgeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_judge(&txn, judge_id).await?;
    find_hackathon(&txn, payload.hackathon_id).await?;

    let queued = QueueService::new(&txn)
        .assign(judge_id, payload.hackathon_id, payload.is_lead)
        .await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(AssignmentResponse {
            judge_id,
            hackathon_id: payload.hackathon_id,
            is_lead: payload.is_lead,
            queued,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/judges/{judge_id}/queue",
    tag = "Judges",
    operation_id = "initializeQueue",
    summary = "Rebuild a judge's queue",
    description = "Discards the judge's queue for the hackathon and rebuilds it from the current projects, in table-number order or shuffled. Votes are kept.",
    params(("judge_id" = i32, Path, description = "Judge ID")),
    request_body = InitializeQueueRequest,
    responses(
        (status = 200, description = "Queue rebuilt", body = InitializeQueueResponse),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Judge not assigned to the hackathon (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(judge_id, hackathon_id = payload.hackathon_id, shuffle = payload.shuffle))]
pub async fn initialize_queue(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(judge_id): Path<i32>,
    AppJson(payload): AppJson<InitializeQueueRequest>,
) -> Result<Json<InitializeQueueResponse>, AppError> {
    let txn = state.db.begin().await?;
    let queued = QueueService::new(&txn)
        .reinitialize(judge_id, payload.hackathon_id, payload.shuffle)
        .await?;
    txn.commit().await?;

    Ok(Json(InitializeQueueResponse { queued }))
}

#[utoipa::path(
    get,
    path = "/hackathons/{id}/rankings",
    tag = "Judges",
    operation_id = "getRankings",
    summary = "Leaderboard with tie detection",
    description = "Projects ordered by total score descending. Equal totals keep insertion order and are listed in `ties` for manual resolution.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Rankings", body = Rankings),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn get_rankings(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Rankings>, AppError> {
    find_hackathon(&state.db, id).await?;
    let rankings = RankingService::new(&state.db).rank_projects(id).await?;
    Ok(Json(rankings))
}

#[utoipa::path(
    get,
    path = "/hackathons/{id}/votes",
    tag = "Judges",
    operation_id = "getAllVotes",
    summary = "Every vote cast in a hackathon",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Votes", body = Vec<VoteRecord>),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn get_all_votes(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<VoteRecord>>, AppError> {
    find_hackathon(&state.db, id).await?;
    let votes = RankingService::new(&state.db).list_votes(id).await?;
    Ok(Json(votes))
}

