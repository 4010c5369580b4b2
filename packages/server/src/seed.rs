use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::{info, warn};

use crate::entity::{admin, judge_queue_entry, judging_project, user};

/// Give `user_id` the admin capability. Already-admin users are left as is.
pub async fn grant_admin<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<(), DbErr> {
    let model = admin::ActiveModel {
        user_id: Set(user_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = admin::Entity::insert(model)
        .on_conflict(
            OnConflict::column(admin::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Grant admin to the configured bootstrap user, if they have registered.
pub async fn ensure_bootstrap_admin(
    db: &DatabaseConnection,
    username: Option<&str>,
) -> Result<(), DbErr> {
    let Some(username) = username else {
        return Ok(());
    };

    match user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
    {
        Some(u) => {
            grant_admin(db, u.id).await?;
            info!(username, user_id = u.id, "Bootstrap admin ensured");
        }
        None => {
            warn!(username, "Bootstrap admin not registered yet; will be granted on registration");
        }
    }
    Ok(())
}

/// Create the composite unique indexes schema-sync cannot express.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // One queue entry per (judge, hackathon, project).
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_queue_judge_hackathon_project")
        .table(judge_queue_entry::Entity)
        .col(judge_queue_entry::Column::JudgeId)
        .col(judge_queue_entry::Column::HackathonId)
        .col(judge_queue_entry::Column::ProjectId)
        .to_string(PostgresQueryBuilder);
    db.execute_unprepared(&stmt).await?;
    info!("Ensured index idx_queue_judge_hackathon_project exists");

    // Table numbers are unique within a hackathon.
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_project_hackathon_table")
        .table(judging_project::Entity)
        .col(judging_project::Column::HackathonId)
        .col(judging_project::Column::TableNumber)
        .to_string(PostgresQueryBuilder);
    db.execute_unprepared(&stmt).await?;
    info!("Ensured index idx_project_hackathon_table exists");

    Ok(())
}
