use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A project judges visit. `(hackathon_id, table_number)` is unique
/// (see `seed::ensure_indexes`).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "judging_project")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub hackathon_id: i32,
    #[sea_orm(belongs_to, from = "hackathon_id", to = "id")]
    pub hackathon: HasOne<super::hackathon::Entity>,

    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub team_name: Option<String>,
    pub project_url: Option<String>,
    pub table_number: i32,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
