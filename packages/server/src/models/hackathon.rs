use common::HackathonStatus;
use serde::{Deserialize, Serialize};

use crate::entity::hackathon;
use crate::error::AppError;
use crate::models::shared::{validate_name, validate_optional_capacity};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HackathonResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Spring Hack 2026")]
    pub name: String,
    pub status: HackathonStatus,
    pub max_participants: Option<i32>,
    pub participant_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<hackathon::Model> for HackathonResponse {
    fn from(h: hackathon::Model) -> Self {
        Self {
            id: h.id,
            name: h.name,
            status: h.status,
            max_participants: h.max_participants,
            participant_count: h.participant_count,
            created_at: h.created_at,
            updated_at: h.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateHackathonRequest {
    #[schema(example = "Spring Hack 2026")]
    pub name: String,
    #[serde(default)]
    pub status: HackathonStatus,
    /// Omit for unlimited registrations.
    pub max_participants: Option<i32>,
}

pub fn validate_create_hackathon(payload: &CreateHackathonRequest) -> Result<(), AppError> {
    validate_name(&payload.name, "Name")?;
    validate_optional_capacity(payload.max_participants, "max_participants")
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateHackathonStatusRequest {
    pub status: HackathonStatus,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RegistrationResponse {
    pub hackathon_id: i32,
    pub user_id: i32,
    pub participant_count: i32,
}
