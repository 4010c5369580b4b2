use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::JudgingConfig;
use crate::entity::{judge_queue_entry, judge_vote};
use crate::error::AppError;
use crate::judging::queue::QueueService;
use crate::models::project::ProjectResponse;
use crate::utils::lookup::find_project;

/// Result of completing a visit.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct Advance {
    pub done: bool,
    pub next_project: Option<ProjectResponse>,
    pub next_queue_id: Option<i32>,
    pub remaining: u64,
}

/// Reject scores outside the configured inclusive range.
pub fn validate_score(score: i32, bounds: &JudgingConfig) -> Result<(), AppError> {
    if score < bounds.min_score || score > bounds.max_score {
        return Err(AppError::Validation(format!(
            "Score must be between {} and {}",
            bounds.min_score, bounds.max_score
        )));
    }
    Ok(())
}

/// Blank comments are stored as NULL.
fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Records judges' scores.
pub struct VoteService<'a, C: ConnectionTrait> {
    db: &'a C,
    bounds: JudgingConfig,
}

impl<'a, C: ConnectionTrait> VoteService<'a, C> {
    pub fn new(db: &'a C, bounds: JudgingConfig) -> Self {
        Self { db, bounds }
    }

    /// Insert or overwrite the judge's vote for a project.
    ///
    /// A single `INSERT .. ON CONFLICT DO UPDATE`, so concurrent submissions
    /// for the same pair never produce two rows. Does not touch the queue.
    pub async fn submit_score(
        &self,
        judge_id: i32,
        project_id: i32,
        score: i32,
        comment: Option<String>,
    ) -> Result<judge_vote::Model, AppError> {
        validate_score(score, &self.bounds)?;
        find_project(self.db, project_id).await?;

        let now = chrono::Utc::now();
        let vote = judge_vote::ActiveModel {
            judge_id: Set(judge_id),
            project_id: Set(project_id),
            score: Set(score),
            comment: Set(normalize_comment(comment)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        judge_vote::Entity::insert(vote)
            .on_conflict(
                OnConflict::columns([judge_vote::Column::JudgeId, judge_vote::Column::ProjectId])
                    .update_columns([
                        judge_vote::Column::Score,
                        judge_vote::Column::Comment,
                        judge_vote::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;

        judge_vote::Entity::find_by_id((judge_id, project_id))
            .one(self.db)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Vote for judge {judge_id} on project {project_id} missing after upsert"
                ))
            })
    }

    /// Record the vote, mark the queue entry complete and return the next table.
    ///
    /// Must run inside a transaction so the vote and the completion commit
    /// together. The entry is locked and must belong to `judge_id` and point at
    /// `project_id`. Completing an already completed entry only updates the vote.
    pub async fn complete_and_advance(
        &self,
        judge_id: i32,
        queue_id: i32,
        project_id: i32,
        score: i32,
        comment: Option<String>,
    ) -> Result<Advance, AppError> {
        validate_score(score, &self.bounds)?;

        let entry = judge_queue_entry::Entity::find_by_id(queue_id)
            .lock(LockType::Update)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Queue entry not found".into()))?;

        if entry.judge_id != judge_id {
            warn!(judge_id, queue_id, owner = entry.judge_id, "Rejected completion of another judge's queue entry");
            return Err(AppError::PermissionDenied);
        }
        if entry.project_id != project_id {
            return Err(AppError::Validation(format!(
                "Queue entry {queue_id} is for project {}, not {project_id}",
                entry.project_id
            )));
        }

        self.submit_score(judge_id, project_id, score, comment)
            .await?;

        let hackathon_id = entry.hackathon_id;
        if !entry.is_completed {
            let mut active: judge_queue_entry::ActiveModel = entry.into();
            active.is_completed = Set(true);
            active.completed_at = Set(Some(chrono::Utc::now()));
            active.update(self.db).await?;
        }

        let next = QueueService::new(self.db)
            .next_for_judge(judge_id, hackathon_id)
            .await?;

        info!(judge_id, queue_id, project_id, score, done = next.done, "Visit completed");
        Ok(Advance {
            done: next.done,
            next_project: next.project,
            next_queue_id: next.queue_id,
            remaining: next.remaining,
        })
    }
}
