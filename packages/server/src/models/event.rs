use serde::{Deserialize, Serialize};

use crate::entity::event;
use crate::error::AppError;
use crate::models::shared::{validate_name, validate_optional_capacity};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EventResponse {
    pub id: i32,
    #[schema(example = "Welcome mixer")]
    pub name: String,
    pub capacity: Option<i32>,
    pub checkin_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<event::Model> for EventResponse {
    fn from(e: event::Model) -> Self {
        Self {
            id: e.id,
            name: e.name,
            capacity: e.capacity,
            checkin_count: e.checkin_count,
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateEventRequest {
    #[schema(example = "Welcome mixer")]
    pub name: String,
    /// Omit for unlimited check-ins.
    pub capacity: Option<i32>,
}

pub fn validate_create_event(payload: &CreateEventRequest) -> Result<(), AppError> {
    validate_name(&payload.name, "Name")?;
    validate_optional_capacity(payload.capacity, "Capacity")
}

/// Payload decoded from a member's QR code.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CheckInRequest {
    #[schema(example = 42)]
    pub user_id: i32,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CheckInResponse {
    pub event_id: i32,
    pub user_id: i32,
    pub checkin_count: i32,
}
