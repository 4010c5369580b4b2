use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One project a judge must visit. `(judge_id, hackathon_id, project_id)` is
/// unique (see `seed::ensure_indexes`).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "judge_queue_entry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub judge_id: i32,
    #[sea_orm(belongs_to, from = "judge_id", to = "id")]
    pub judge: HasOne<super::judge::Entity>,

    pub hackathon_id: i32,
    #[sea_orm(belongs_to, from = "hackathon_id", to = "id")]
    pub hackathon: HasOne<super::hackathon::Entity>,

    pub project_id: i32,
    #[sea_orm(belongs_to, from = "project_id", to = "id")]
    pub project: HasOne<super::judging_project::Entity>,

    /// 1-based visiting position, dense per (judge, hackathon).
    pub visit_order: i32,
    pub is_completed: bool,
    /// Set together with `is_completed`, never cleared.
    pub completed_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
