use sea_orm::sea_query::LockType;
use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect};

use crate::entity::{event, hackathon, judge, judging_project, user};
use crate::error::AppError;

/// Look up a hackathon by ID, returning 404 if not found.
pub async fn find_hackathon<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<hackathon::Model, AppError> {
    hackathon::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))
}

/// Like [`find_hackathon`] but takes a row lock for the rest of the transaction.
pub async fn find_hackathon_for_update<C: ConnectionTrait>(
    txn: &C,
    id: i32,
) -> Result<hackathon::Model, AppError> {
    hackathon::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))
}

pub async fn find_event_for_update<C: ConnectionTrait>(
    txn: &C,
    id: i32,
) -> Result<event::Model, AppError> {
    event::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
}

pub async fn find_judge<C: ConnectionTrait>(db: &C, id: i32) -> Result<judge::Model, AppError> {
    judge::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Judge not found".into()))
}

pub async fn find_judge_for_update<C: ConnectionTrait>(
    txn: &C,
    id: i32,
) -> Result<judge::Model, AppError> {
    judge::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Judge not found".into()))
}

pub async fn find_project<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<judging_project::Model, AppError> {
    judging_project::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
}

pub async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
