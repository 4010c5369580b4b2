use std::collections::HashMap;

use sea_orm::*;
use serde::Serialize;

use crate::entity::{judge, judge_vote, judging_project};
use crate::error::AppError;

/// One judge's vote as shown on the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct VoteDetail {
    pub judge_id: i32,
    pub judge_name: String,
    pub score: i32,
    pub comment: Option<String>,
}

/// A project and every vote cast for it, before aggregation.
#[derive(Debug, Clone)]
pub struct ProjectTally {
    pub project_id: i32,
    pub name: String,
    pub table_number: i32,
    pub votes: Vec<VoteDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct RankedProject {
    /// 1-based position in the ranking. Tied projects keep their list order.
    pub rank: usize,
    pub project_id: i32,
    pub name: String,
    pub table_number: i32,
    pub total_score: i64,
    pub vote_count: usize,
    /// Mean score rounded to two decimals; 0 without votes.
    pub avg_score: f64,
    pub votes: Vec<VoteDetail>,
}

/// Projects sharing a total score.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct Tie {
    pub score: i64,
    /// Project names in ranking order.
    pub projects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct Rankings {
    pub rankings: Vec<RankedProject>,
    pub ties: Vec<Tie>,
    pub has_ties: bool,
}

/// Mean of `total` over `count`, rounded to two decimal places.
pub fn average(total: i64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    ((total as f64 / count as f64) * 100.0).round() / 100.0
}

/// Aggregate tallies, order by total descending and collect ties.
///
/// The sort is stable and has no secondary key: equal totals keep the order
/// of `tallies`. Ties are reported for manual resolution instead.
pub fn rank(tallies: Vec<ProjectTally>) -> Rankings {
    let mut ranked: Vec<RankedProject> = tallies
        .into_iter()
        .map(|tally| {
            let total_score: i64 = tally.votes.iter().map(|v| i64::from(v.score)).sum();
            let vote_count = tally.votes.len();
            RankedProject {
                rank: 0,
                project_id: tally.project_id,
                name: tally.name,
                table_number: tally.table_number,
                total_score,
                vote_count,
                avg_score: average(total_score, vote_count),
                votes: tally.votes,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.total_score.cmp(&a.total_score));
    for (i, project) in ranked.iter_mut().enumerate() {
        project.rank = i + 1;
    }

    // Sorted, so equal totals are adjacent.
    let ties: Vec<Tie> = ranked
        .chunk_by(|a, b| a.total_score == b.total_score)
        .filter(|group| group.len() > 1)
        .map(|group| Tie {
            score: group[0].total_score,
            projects: group.iter().map(|p| p.name.clone()).collect(),
        })
        .collect();

    Rankings {
        has_ties: !ties.is_empty(),
        rankings: ranked,
        ties,
    }
}

/// Every vote cast in a hackathon, for the admin audit view.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VoteRecord {
    pub project_id: i32,
    pub project_name: String,
    pub table_number: i32,
    pub judge_id: i32,
    pub judge_name: String,
    pub score: i32,
    pub comment: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Loads votes and builds the leaderboard for a hackathon.
pub struct RankingService<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> RankingService<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn rank_projects(&self, hackathon_id: i32) -> Result<Rankings, AppError> {
        let projects = self.projects(hackathon_id).await?;
        let votes = self.votes_for(&projects).await?;
        let judge_names = self.judge_names(&votes).await?;

        let mut by_project: HashMap<i32, Vec<VoteDetail>> = HashMap::new();
        for vote in votes {
            by_project.entry(vote.project_id).or_default().push(VoteDetail {
                judge_id: vote.judge_id,
                judge_name: judge_name(&judge_names, vote.judge_id),
                score: vote.score,
                comment: vote.comment,
            });
        }

        let tallies = projects
            .into_iter()
            .map(|p| ProjectTally {
                votes: by_project.remove(&p.id).unwrap_or_default(),
                project_id: p.id,
                name: p.name,
                table_number: p.table_number,
            })
            .collect();

        Ok(rank(tallies))
    }

    /// Votes ordered by table number, then judge.
    pub async fn list_votes(&self, hackathon_id: i32) -> Result<Vec<VoteRecord>, AppError> {
        let mut projects = self.projects(hackathon_id).await?;
        projects.sort_by_key(|p| p.table_number);
        let votes = self.votes_for(&projects).await?;
        let judge_names = self.judge_names(&votes).await?;

        let mut by_project: HashMap<i32, Vec<judge_vote::Model>> = HashMap::new();
        for vote in votes {
            by_project.entry(vote.project_id).or_default().push(vote);
        }

        let mut records = Vec::new();
        for project in projects {
            for vote in by_project.remove(&project.id).unwrap_or_default() {
                records.push(VoteRecord {
                    project_id: project.id,
                    project_name: project.name.clone(),
                    table_number: project.table_number,
                    judge_id: vote.judge_id,
                    judge_name: judge_name(&judge_names, vote.judge_id),
                    score: vote.score,
                    comment: vote.comment,
                    updated_at: vote.updated_at,
                });
            }
        }
        Ok(records)
    }

    /// Projects in insertion order.
    async fn projects(&self, hackathon_id: i32) -> Result<Vec<judging_project::Model>, AppError> {
        Ok(judging_project::Entity::find()
            .filter(judging_project::Column::HackathonId.eq(hackathon_id))
            .order_by_asc(judging_project::Column::Id)
            .all(self.db)
            .await?)
    }

    async fn votes_for(
        &self,
        projects: &[judging_project::Model],
    ) -> Result<Vec<judge_vote::Model>, AppError> {
        if projects.is_empty() {
            return Ok(Vec::new());
        }
        Ok(judge_vote::Entity::find()
            .filter(judge_vote::Column::ProjectId.is_in(projects.iter().map(|p| p.id)))
            .order_by_asc(judge_vote::Column::JudgeId)
            .all(self.db)
            .await?)
    }

    async fn judge_names(
        &self,
        votes: &[judge_vote::Model],
    ) -> Result<HashMap<i32, String>, AppError> {
        if votes.is_empty() {
            return Ok(HashMap::new());
        }
        let judges = judge::Entity::find()
            .filter(judge::Column::Id.is_in(votes.iter().map(|v| v.judge_id)))
            .all(self.db)
            .await?;
        Ok(judges.into_iter().map(|j| (j.id, j.name)).collect())
    }
}

fn judge_name(names: &HashMap<i32, String>, judge_id: i32) -> String {
    names
        .get(&judge_id)
        .cloned()
        .unwrap_or_else(|| format!("Judge #{judge_id}"))
}
