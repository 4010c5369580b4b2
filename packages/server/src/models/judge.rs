use serde::{Deserialize, Serialize};

use crate::entity::{judge, judge_vote};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct JudgeResponse {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = 42)]
    pub user_id: i32,
    #[schema(example = "Dr. Ada")]
    pub name: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<judge::Model> for JudgeResponse {
    fn from(j: judge::Model) -> Self {
        Self {
            id: j.id,
            user_id: j.user_id,
            name: j.name,
            is_active: j.is_active,
            created_at: j.created_at,
        }
    }
}

/// Request body for making a user a judge.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateJudgeRequest {
    #[schema(example = 42)]
    pub user_id: i32,
    /// Display name. Defaults to the username.
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateJudgeRequest {
    #[schema(example = false)]
    pub is_active: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AssignJudgeRequest {
    #[schema(example = 1)]
    pub hackathon_id: i32,
    #[serde(default)]
    pub is_lead: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AssignmentResponse {
    pub judge_id: i32,
    pub hackathon_id: i32,
    pub is_lead: bool,
    /// Number of queue entries created.
    pub queued: usize,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct InitializeQueueRequest {
    #[schema(example = 1)]
    pub hackathon_id: i32,
    /// Visit projects in random order instead of by table number.
    #[serde(default)]
    pub shuffle: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct InitializeQueueResponse {
    pub queued: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct IsJudgeResponse {
    pub is_judge: bool,
    pub judge_id: Option<i32>,
}

/// One hackathon the caller judges.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MyAssignment {
    pub hackathon_id: i32,
    pub hackathon_name: String,
    pub status: common::HackathonStatus,
    pub is_lead: bool,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubmitVoteRequest {
    #[schema(example = 12)]
    pub project_id: i32,
    #[schema(example = 8)]
    pub score: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CompleteVisitRequest {
    #[schema(example = 12)]
    pub project_id: i32,
    #[schema(example = 8)]
    pub score: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VoteResponse {
    pub judge_id: i32,
    pub project_id: i32,
    pub score: i32,
    pub comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<judge_vote::Model> for VoteResponse {
    fn from(v: judge_vote::Model) -> Self {
        Self {
            judge_id: v.judge_id,
            project_id: v.project_id,
            score: v.score,
            comment: v.comment,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}
