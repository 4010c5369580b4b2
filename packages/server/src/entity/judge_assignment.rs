use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attaches a judge to a hackathon. The composite key makes a second
/// assignment of the same pair fail at insert time.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "judge_assignment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub judge_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub hackathon_id: i32,
    #[sea_orm(belongs_to, from = "judge_id", to = "id")]
    pub judge: HasOne<super::judge::Entity>,
    #[sea_orm(belongs_to, from = "hackathon_id", to = "id")]
    pub hackathon: HasOne<super::hackathon::Entity>,

    pub is_lead: bool,
    pub assigned_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
