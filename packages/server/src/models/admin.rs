use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct GrantAdminRequest {
    #[schema(example = 42)]
    pub user_id: i32,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminResponse {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
