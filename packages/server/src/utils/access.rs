use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use tracing::debug;

use crate::entity::{admin, judge};
use crate::error::AppError;
use crate::state::AppState;

pub fn admin_key(user_id: i32) -> String {
    format!("user:{user_id}:admin")
}

pub fn judge_key(user_id: i32) -> String {
    format!("user:{user_id}:judge")
}

/// Admin row id for `user_id`, memoized in the access cache.
pub async fn admin_id_for_user(state: &AppState, user_id: i32) -> Result<Option<i32>, AppError> {
    state
        .access_cache
        .get_or_set(
            &admin_key(user_id),
            Some(state.config.cache.access_ttl()),
            || query_admin_id(&state.db, user_id),
        )
        .await
}

/// Active judge row id for `user_id`, memoized in the access cache.
pub async fn judge_id_for_user(state: &AppState, user_id: i32) -> Result<Option<i32>, AppError> {
    state
        .access_cache
        .get_or_set(
            &judge_key(user_id),
            Some(state.config.cache.access_ttl()),
            || query_active_judge_id(&state.db, user_id),
        )
        .await
}

async fn query_admin_id<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Option<i32>, AppError> {
    let id = admin::Entity::find()
        .filter(admin::Column::UserId.eq(user_id))
        .select_only()
        .column(admin::Column::Id)
        .into_tuple::<i32>()
        .one(db)
        .await?;
    Ok(id)
}

async fn query_active_judge_id<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Option<i32>, AppError> {
    let id = judge::Entity::find()
        .filter(judge::Column::UserId.eq(user_id))
        .filter(judge::Column::IsActive.eq(true))
        .select_only()
        .column(judge::Column::Id)
        .into_tuple::<i32>()
        .one(db)
        .await?;
    Ok(id)
}

/// Drop every memoized capability for `user_id`. Call after any change to the
/// user's admin or judge status, once the change is committed.
pub fn invalidate_user(state: &AppState, user_id: i32) {
    let removed = state
        .access_cache
        .delete_pattern(&format!("user:{user_id}:*"));
    debug!(user_id, removed, "Invalidated access cache");
}
