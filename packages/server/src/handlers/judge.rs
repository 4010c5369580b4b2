use axum::Json;
use axum::extract::{Path, State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{hackathon, judge_assignment, judging_map, judging_project};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, JudgeUser};
use crate::extractors::json::SanitizedJson;
use crate::judging::{Advance, NextTable, Progress, QueueService, VoteService};
use crate::models::judge::*;
use crate::models::project::{MapResponse, ProjectResponse};
use crate::state::AppState;
use crate::utils::access;
use crate::utils::lookup::find_hackathon;

#[utoipa::path(
    get,
    path = "/me",
    tag = "Judging",
    operation_id = "isJudge",
    summary = "Whether the caller is an active judge",
    description = "Never returns 403: non-judges get `is_judge = false`.",
    responses(
        (status = 200, description = "Judge status", body = IsJudgeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn is_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<IsJudgeResponse>, AppError> {
    let judge_id = access::judge_id_for_user(&state, auth_user.user_id).await?;
    Ok(Json(IsJudgeResponse {
        is_judge: judge_id.is_some(),
        judge_id,
    }))
}

#[utoipa::path(
    get,
    path = "/assignments",
    tag = "Judging",
    operation_id = "getMyAssignments",
    summary = "Hackathons the caller is assigned to judge",
    responses(
        (status = 200, description = "Assignments", body = Vec<MyAssignment>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a judge (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, judge_user), fields(judge_id = judge_user.judge_id))]
pub async fn get_my_assignments(
    judge_user: JudgeUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<MyAssignment>>, AppError> {
    let assignments = judge_assignment::Entity::find()
        .filter(judge_assignment::Column::JudgeId.eq(judge_user.judge_id))
        .order_by_asc(judge_assignment::Column::AssignedAt)
        .all(&state.db)
        .await?;

    let hackathons: std::collections::HashMap<i32, hackathon::Model> = hackathon::Entity::find()
        .filter(hackathon::Column::Id.is_in(assignments.iter().map(|a| a.hackathon_id)))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|h| (h.id, h))
        .collect();

    let data = assignments
        .into_iter()
        .filter_map(|a| {
            let h = hackathons.get(&a.hackathon_id)?;
            Some(MyAssignment {
                hackathon_id: a.hackathon_id,
                hackathon_name: h.name.clone(),
                status: h.status,
                is_lead: a.is_lead,
                assigned_at: a.assigned_at,
            })
        })
        .collect();

    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/hackathons/{hackathon_id}/next",
    tag = "Judging",
    operation_id = "getNextTable",
    summary = "Next project to visit",
    description = "Returns the lowest-order incomplete queue entry, or `done = true` when the queue is exhausted.",
    params(("hackathon_id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Next table", body = NextTable),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a judge (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, judge_user), fields(judge_id = judge_user.judge_id, hackathon_id))]
pub async fn get_next_table(
    judge_user: JudgeUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
) -> Result<Json<NextTable>, AppError> {
    let next = QueueService::new(&state.db)
        .next_for_judge(judge_user.judge_id, hackathon_id)
        .await?;
    Ok(Json(next))
}

#[utoipa::path(
    get,
    path = "/hackathons/{hackathon_id}/projects",
    tag = "Judging",
    operation_id = "getProjects",
    summary = "All projects in a hackathon, by table number",
    params(("hackathon_id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Projects", body = Vec<ProjectResponse>),
        (status = 403, description = "Not a judge (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _judge_user), fields(hackathon_id))]
pub async fn get_projects(
    _judge_user: JudgeUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    find_hackathon(&state.db, hackathon_id).await?;
    let projects = judging_project::Entity::find()
        .filter(judging_project::Column::HackathonId.eq(hackathon_id))
        .order_by_asc(judging_project::Column::TableNumber)
        .all(&state.db)
        .await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/hackathons/{hackathon_id}/maps",
    tag = "Judging",
    operation_id = "getMaps",
    summary = "Floor plans for a hackathon",
    params(("hackathon_id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Maps", body = Vec<MapResponse>),
        (status = 403, description = "Not a judge (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _judge_user), fields(hackathon_id))]
pub async fn get_maps(
    _judge_user: JudgeUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
) -> Result<Json<Vec<MapResponse>>, AppError> {
    find_hackathon(&state.db, hackathon_id).await?;
    let maps = judging_map::Entity::find()
        .filter(judging_map::Column::HackathonId.eq(hackathon_id))
        .order_by_asc(judging_map::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(maps.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/hackathons/{hackathon_id}/progress",
    tag = "Judging",
    operation_id = "getProgress",
    summary = "Visited and remaining counts",
    params(("hackathon_id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Progress", body = Progress),
        (status = 403, description = "Not a judge (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, judge_user), fields(judge_id = judge_user.judge_id, hackathon_id))]
pub async fn get_progress(
    judge_user: JudgeUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
) -> Result<Json<Progress>, AppError> {
    let progress = QueueService::new(&state.db)
        .progress(judge_user.judge_id, hackathon_id)
        .await?;
    Ok(Json(progress))
}

#[utoipa::path(
    post,
    path = "/votes",
    tag = "Judging",
    operation_id = "submitVote",
    summary = "Score a project",
    description = "Creates the caller's vote for the project or overwrites the existing one. Does not advance the queue.",
    request_body = SubmitVoteRequest,
    responses(
        (status = 200, description = "Vote stored", body = VoteResponse),
        (status = 400, description = "Score out of range (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Not a judge (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, judge_user, payload), fields(judge_id = judge_user.judge_id, project_id = payload.project_id))]
pub async fn submit_vote(
    judge_user: JudgeUser,
    State(state): State<AppState>,
    SanitizedJson(payload): SanitizedJson<SubmitVoteRequest>,
) -> Result<Json<VoteResponse>, AppError> {
    let vote = VoteService::new(&state.db, state.config.judging)
        .submit_score(
            judge_user.judge_id,
            payload.project_id,
            payload.score,
            payload.comment,
        )
        .await?;
    Ok(Json(vote.into()))
}

#[utoipa::path(
    post,
    path = "/queue/{queue_id}/complete",
    tag = "Judging",
    operation_id = "completeAndNext",
    summary = "Score the current project and move to the next",
    description = "Upserts the vote and marks the queue entry complete in one transaction, then returns the next table. The entry must belong to the caller (403 otherwise) and match `project_id` (400 otherwise).",
    params(("queue_id" = i32, Path, description = "Queue entry ID")),
    request_body = CompleteVisitRequest,
    responses(
        (status = 200, description = "Visit completed", body = Advance),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Not a judge or not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Queue entry or project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, judge_user, payload), fields(judge_id = judge_user.judge_id, queue_id))]
pub async fn complete_and_next(
    judge_user: JudgeUser,
    State(state): State<AppState>,
    Path(queue_id): Path<i32>,
    SanitizedJson(payload): SanitizedJson<CompleteVisitRequest>,
) -> Result<Json<Advance>, AppError> {
    let txn = state.db.begin().await?;
    let advance = VoteService::new(&txn, state.config.judging)
        .complete_and_advance(
            judge_user.judge_id,
            queue_id,
            payload.project_id,
            payload.score,
            payload.comment,
        )
        .await?;
    txn.commit().await?;

    Ok(Json(advance))
}
