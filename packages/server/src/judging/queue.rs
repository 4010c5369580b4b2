use rand::seq::SliceRandom;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use serde::Serialize;
use tracing::info;

use crate::entity::{judge_assignment, judge_queue_entry, judging_project};
use crate::error::AppError;
use crate::models::project::ProjectResponse;

/// The next table a judge should visit.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct NextTable {
    /// True when the judge has no incomplete entries left.
    pub done: bool,
    pub project: Option<ProjectResponse>,
    /// Queue entry to pass back when completing the visit.
    pub queue_id: Option<i32>,
    /// Incomplete entries, including the one returned.
    pub remaining: u64,
}

/// Per-hackathon progress counts for one judge.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct Progress {
    pub total: u64,
    pub completed: u64,
    pub remaining: u64,
}

impl Progress {
    /// The counts come from separate queries, so a concurrent rebuild can
    /// leave `completed` above `total`.
    pub fn from_counts(total: u64, completed: u64) -> Self {
        let completed = std::cmp::Ord::min(completed, total);
        Self {
            total,
            completed,
            remaining: total - completed,
        }
    }
}

/// Builds and reads judges' visiting queues.
pub struct QueueService<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> QueueService<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Attach a judge to a hackathon and populate the queue in table order.
    ///
    /// Must run inside a transaction. A second assignment of the same pair is
    /// rejected by the primary key on `judge_assignment`, so concurrent callers
    /// see exactly one success. Returns the number of projects queued.
    pub async fn assign(
        &self,
        judge_id: i32,
        hackathon_id: i32,
        is_lead: bool,
    ) -> Result<usize, AppError> {
        let assignment = judge_assignment::ActiveModel {
            judge_id: Set(judge_id),
            hackathon_id: Set(hackathon_id),
            is_lead: Set(is_lead),
            assigned_at: Set(chrono::Utc::now()),
        };

        match judge_assignment::Entity::insert(assignment)
            .exec_without_returning(self.db)
            .await
        {
            Ok(_) => {}
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(AppError::Conflict(
                    "Judge is already assigned to this hackathon".into(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        let project_ids = self.project_ids_by_table(hackathon_id).await?;
        self.insert_entries(judge_id, hackathon_id, &project_ids)
            .await?;

        info!(judge_id, hackathon_id, count = project_ids.len(), "Judge assigned");
        Ok(project_ids.len())
    }

    /// Replace a judge's queue with a fresh one, optionally shuffled.
    ///
    /// Must run inside a transaction. The assignment row is locked so two
    /// concurrent re-inits for the same pair serialize instead of interleaving
    /// their deletes and inserts.
    pub async fn reinitialize(
        &self,
        judge_id: i32,
        hackathon_id: i32,
        shuffle: bool,
    ) -> Result<usize, AppError> {
        judge_assignment::Entity::find_by_id((judge_id, hackathon_id))
            .lock(LockType::Update)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Judge is not assigned to this hackathon".into()))?;

        judge_queue_entry::Entity::delete_many()
            .filter(judge_queue_entry::Column::JudgeId.eq(judge_id))
            .filter(judge_queue_entry::Column::HackathonId.eq(hackathon_id))
            .exec(self.db)
            .await?;

        let mut project_ids = self.project_ids_by_table(hackathon_id).await?;
        if shuffle {
            project_ids.shuffle(&mut rand::rng());
        }
        self.insert_entries(judge_id, hackathon_id, &project_ids)
            .await?;

        info!(judge_id, hackathon_id, shuffle, count = project_ids.len(), "Queue reinitialized");
        Ok(project_ids.len())
    }

    /// Lowest-order incomplete entry for the judge, with the remaining count.
    pub async fn next_for_judge(
        &self,
        judge_id: i32,
        hackathon_id: i32,
    ) -> Result<NextTable, AppError> {
        let incomplete = judge_queue_entry::Entity::find()
            .filter(judge_queue_entry::Column::JudgeId.eq(judge_id))
            .filter(judge_queue_entry::Column::HackathonId.eq(hackathon_id))
            .filter(judge_queue_entry::Column::IsCompleted.eq(false));

        let Some(entry) = incomplete
            .clone()
            .order_by_asc(judge_queue_entry::Column::VisitOrder)
            .one(self.db)
            .await?
        else {
            return Ok(NextTable {
                done: true,
                project: None,
                queue_id: None,
                remaining: 0,
            });
        };

        let remaining = incomplete.count(self.db).await?;
        let project = judging_project::Entity::find_by_id(entry.project_id)
            .one(self.db)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Queue entry {} references missing project {}",
                    entry.id, entry.project_id
                ))
            })?;

        Ok(NextTable {
            done: false,
            project: Some(project.into()),
            queue_id: Some(entry.id),
            remaining,
        })
    }

    pub async fn progress(&self, judge_id: i32, hackathon_id: i32) -> Result<Progress, AppError> {
        let entries = judge_queue_entry::Entity::find()
            .filter(judge_queue_entry::Column::JudgeId.eq(judge_id))
            .filter(judge_queue_entry::Column::HackathonId.eq(hackathon_id));

        let total = entries.clone().count(self.db).await?;
        let completed = entries
            .filter(judge_queue_entry::Column::IsCompleted.eq(true))
            .count(self.db)
            .await?;

        Ok(Progress::from_counts(total, completed))
    }

    async fn project_ids_by_table(&self, hackathon_id: i32) -> Result<Vec<i32>, AppError> {
        let ids = judging_project::Entity::find()
            .filter(judging_project::Column::HackathonId.eq(hackathon_id))
            .order_by_asc(judging_project::Column::TableNumber)
            .select_only()
            .column(judging_project::Column::Id)
            .into_tuple::<i32>()
            .all(self.db)
            .await?;
        Ok(ids)
    }

    async fn insert_entries(
        &self,
        judge_id: i32,
        hackathon_id: i32,
        project_ids: &[i32],
    ) -> Result<(), AppError> {
        if project_ids.is_empty() {
            return Ok(());
        }
        judge_queue_entry::Entity::insert_many(queue_entries(judge_id, hackathon_id, project_ids))
            .exec_without_returning(self.db)
            .await?;
        Ok(())
    }
}

/// Queue rows for `project_ids` in the given order, numbered from 1.
fn queue_entries(
    judge_id: i32,
    hackathon_id: i32,
    project_ids: &[i32],
) -> Vec<judge_queue_entry::ActiveModel> {
    project_ids
        .iter()
        .zip(1..)
        .map(|(&project_id, visit_order)| judge_queue_entry::ActiveModel {
            judge_id: Set(judge_id),
            hackathon_id: Set(hackathon_id),
            project_id: Set(project_id),
            visit_order: Set(visit_order),
            is_completed: Set(false),
            completed_at: Set(None),
            ..Default::default()
        })
        .collect()
}
