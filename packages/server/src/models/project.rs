use serde::{Deserialize, Serialize};

use crate::entity::{judging_map, judging_project};
use crate::error::AppError;
use crate::models::shared::{validate_name, validate_table_numbers};

/// Upper bound on projects per bulk insert.
pub const MAX_BULK_PROJECTS: usize = 500;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProjectResponse {
    #[schema(example = 12)]
    pub id: i32,
    pub hackathon_id: i32,
    #[schema(example = "Plant Whisperer")]
    pub name: String,
    pub description: String,
    pub team_name: Option<String>,
    /// HTML-escaped as submitted; unescape before using it as a link.
    #[schema(example = "https:&#x2F;&#x2F;devpost.example.org&#x2F;plant-whisperer")]
    pub project_url: Option<String>,
    #[schema(example = 7)]
    pub table_number: i32,
}

impl From<judging_project::Model> for ProjectResponse {
    fn from(p: judging_project::Model) -> Self {
        Self {
            id: p.id,
            hackathon_id: p.hackathon_id,
            name: p.name,
            description: p.description,
            team_name: p.team_name,
            project_url: p.project_url,
            table_number: p.table_number,
        }
    }
}

/// Request body for creating one project.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateProjectRequest {
    #[schema(example = "Plant Whisperer")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub team_name: Option<String>,
    /// Stored and returned HTML-escaped.
    #[schema(example = "https://devpost.example.org/plant-whisperer")]
    pub project_url: Option<String>,
    /// Visiting location, unique within the hackathon.
    #[schema(example = 7)]
    pub table_number: i32,
}

pub fn validate_create_project(payload: &CreateProjectRequest) -> Result<(), AppError> {
    validate_name(&payload.name, "Name")?;
    validate_table_numbers(&[payload.table_number])
}

/// Request body for creating many projects at once.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct BulkCreateProjectsRequest {
    pub projects: Vec<CreateProjectRequest>,
}

pub fn validate_bulk_create_projects(payload: &BulkCreateProjectsRequest) -> Result<(), AppError> {
    if payload.projects.is_empty() {
        return Err(AppError::Validation("projects must not be empty".into()));
    }
    if payload.projects.len() > MAX_BULK_PROJECTS {
        return Err(AppError::Validation(format!(
            "Too many projects: max {MAX_BULK_PROJECTS}"
        )));
    }
    for project in &payload.projects {
        validate_name(&project.name, "Name")?;
    }
    let tables: Vec<i32> = payload.projects.iter().map(|p| p.table_number).collect();
    validate_table_numbers(&tables)
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BulkCreateProjectsResponse {
    pub created: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MapResponse {
    pub id: i32,
    pub hackathon_id: i32,
    #[schema(example = "Main hall")]
    pub name: String,
    /// HTML-escaped as submitted; unescape before using it as a link.
    #[schema(example = "https:&#x2F;&#x2F;cdn.example.org&#x2F;maps&#x2F;main-hall.png")]
    pub image_url: String,
}

impl From<judging_map::Model> for MapResponse {
    fn from(m: judging_map::Model) -> Self {
        Self {
            id: m.id,
            hackathon_id: m.hackathon_id,
            name: m.name,
            image_url: m.image_url,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateMapRequest {
    #[schema(example = "Main hall")]
    pub name: String,
    /// Stored and returned HTML-escaped.
    #[schema(example = "https://cdn.example.org/maps/main-hall.png")]
    pub image_url: String,
}

pub fn validate_create_map(payload: &CreateMapRequest) -> Result<(), AppError> {
    validate_name(&payload.name, "Name")?;
    if payload.image_url.trim().is_empty() {
        return Err(AppError::Validation("image_url must not be empty".into()));
    }
    Ok(())
}
