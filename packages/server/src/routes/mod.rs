use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{admin, auth, event, hackathon, judge, project};
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1_routes())
}

fn v1_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/hackathons", hackathon_routes())
        .nest("/judge", judge_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
        .routes(routes!(auth::me))
}

fn hackathon_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(hackathon::list_hackathons))
        .routes(routes!(hackathon::register_for_hackathon))
}

fn judge_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(judge::is_judge))
        .routes(routes!(judge::get_my_assignments))
        .routes(routes!(judge::get_next_table))
        .routes(routes!(judge::get_projects))
        .routes(routes!(judge::get_maps))
        .routes(routes!(judge::get_progress))
        .routes(routes!(judge::submit_vote))
        .routes(routes!(judge::complete_and_next))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(admin::list_admins, admin::grant_admin))
        .routes(routes!(admin::revoke_admin))
        .routes(routes!(admin::list_judges, admin::create_judge))
        .routes(routes!(admin::update_judge, admin::remove_judge))
        .routes(routes!(admin::assign_to_hackathon))
        .routes(routes!(admin::initialize_queue))
        .routes(routes!(admin::get_rankings))
        .routes(routes!(admin::get_all_votes))
        .routes(routes!(hackathon::create_hackathon))
        .routes(routes!(hackathon::update_hackathon_status))
        .routes(routes!(project::create_project))
        .routes(routes!(project::bulk_create_projects))
        .routes(routes!(project::add_map))
        .routes(routes!(event::list_events, event::create_event))
        .routes(routes!(event::check_in))
}
