use std::collections::HashSet;

use sea_orm::EntityTrait;
use serde_json::json;

use judging_server::entity::judge_queue_entry;

use crate::common::{TestApp, TestJudge, TestUser, routes};

/// An admin, an open hackathon with projects at tables 3, 1, 2 (created in that
/// order) and one judge not yet assigned.
struct Floor {
    admin: TestUser,
    hackathon_id: i32,
    /// Project ids ordered by table number.
    projects: Vec<i32>,
    judge: TestJudge,
}

async fn setup_floor(app: &TestApp) -> Floor {
    let admin = app.create_admin("organizer").await;
    let hackathon_id = app
        .create_hackathon(&admin.token, "Spring Hack", "in_progress", None)
        .await;
    let table3 = app.create_project(&admin.token, hackathon_id, "Gamma", 3).await;
    let table1 = app.create_project(&admin.token, hackathon_id, "Alpha", 1).await;
    let table2 = app.create_project(&admin.token, hackathon_id, "Beta", 2).await;
    let judge = app.create_judge(&admin.token, "judge_ada").await;

    Floor {
        admin,
        hackathon_id,
        projects: vec![table1, table2, table3],
        judge,
    }
}

fn queue_id(res: &crate::common::TestResponse) -> i32 {
    res.body["queue_id"]
        .as_i64()
        .expect("next table should carry a queue_id") as i32
}

fn project_id(res: &crate::common::TestResponse) -> i32 {
    res.body["project"]["id"]
        .as_i64()
        .expect("next table should carry a project") as i32
}

mod assignment {
    use super::*;

    #[tokio::test]
    async fn assignment_queues_every_project_in_table_order() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;

        let res = app
            .assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id)
            .await;
        assert_eq!(res.status, 201, "assign failed: {}", res.text);
        assert_eq!(res.body["queued"], 3);

        let next = app.next_table(&floor.judge.user.token, floor.hackathon_id).await;
        assert_eq!(next.body["done"], false);
        assert_eq!(next.body["remaining"], 3);
        assert_eq!(project_id(&next), floor.projects[0]);
        assert_eq!(next.body["project"]["table_number"], 1);
    }

    #[tokio::test]
    async fn assigned_hackathon_appears_in_judge_assignments() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;
        app.assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id)
            .await;

        let res = app
            .get_with_token(routes::JUDGE_ASSIGNMENTS, &floor.judge.user.token)
            .await;

        assert_eq!(res.status, 200);
        let list = res.body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["hackathon_id"], floor.hackathon_id);
        assert_eq!(list[0]["hackathon_name"], "Spring Hack");
        assert_eq!(list[0]["status"], "in_progress");
    }

    #[tokio::test]
    async fn second_assignment_conflicts_and_leaves_queue_unchanged() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;

        let first = app
            .assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id)
            .await;
        assert_eq!(first.status, 201);
        let second = app
            .assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id)
            .await;

        assert_eq!(second.status, 409);
        assert_eq!(second.body["code"], "CONFLICT");

        let progress = app
            .get_with_token(
                &routes::judge_progress(floor.hackathon_id),
                &floor.judge.user.token,
            )
            .await;
        assert_eq!(progress.body["total"], 3);
    }

    #[tokio::test]
    async fn concurrent_assignments_produce_one_queue() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;

        let (a, b) = tokio::join!(
            app.assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id),
            app.assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id),
        );

        let mut statuses = vec![a.status, b.status];
        statuses.sort();
        assert_eq!(statuses, vec![201, 409]);

        let progress = app
            .get_with_token(
                &routes::judge_progress(floor.hackathon_id),
                &floor.judge.user.token,
            )
            .await;
        assert_eq!(progress.body["total"], 3);
    }

    #[tokio::test]
    async fn assigning_to_missing_hackathon_is_not_found() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;

        let res = app.assign(&floor.admin.token, floor.judge.judge_id, 9999).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn judge_without_projects_is_done_immediately() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("organizer").await;
        let hackathon_id = app
            .create_hackathon(&admin.token, "Empty Hack", "in_progress", None)
            .await;
        let judge = app.create_judge(&admin.token, "judge_ada").await;

        let res = app.assign(&admin.token, judge.judge_id, hackathon_id).await;
        assert_eq!(res.body["queued"], 0);

        let next = app.next_table(&judge.user.token, hackathon_id).await;
        assert_eq!(next.body["done"], true);
        assert!(next.body["project"].is_null());
        assert_eq!(next.body["remaining"], 0);
    }
}

mod reinitialization {
    use super::*;

    async fn reinit(app: &TestApp, floor: &Floor, shuffle: bool) -> crate::common::TestResponse {
        app.post_with_token(
            &routes::judge_queue(floor.judge.judge_id),
            &json!({"hackathon_id": floor.hackathon_id, "shuffle": shuffle}),
            &floor.admin.token,
        )
        .await
    }

    #[tokio::test]
    async fn repeated_reinitialization_never_duplicates_entries() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;
        app.assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id)
            .await;

        for _ in 0..3 {
            let res = reinit(&app, &floor, false).await;
            assert_eq!(res.status, 200, "reinit failed: {}", res.text);
            assert_eq!(res.body["queued"], 3);
        }

        let progress = app
            .get_with_token(
                &routes::judge_progress(floor.hackathon_id),
                &floor.judge.user.token,
            )
            .await;
        assert_eq!(progress.body["total"], 3);
        assert_eq!(progress.body["completed"], 0);
    }

    #[tokio::test]
    async fn reinitialization_picks_up_new_projects() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;
        app.assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id)
            .await;
        app.create_project(&floor.admin.token, floor.hackathon_id, "Delta", 4)
            .await;

        let res = reinit(&app, &floor, false).await;

        assert_eq!(res.body["queued"], 4);
    }

    #[tokio::test]
    async fn shuffled_queue_visits_every_project_exactly_once() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;
        app.assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id)
            .await;
        let res = reinit(&app, &floor, true).await;
        assert_eq!(res.body["queued"], 3);

        let mut visited = Vec::new();
        loop {
            let next = app.next_table(&floor.judge.user.token, floor.hackathon_id).await;
            if next.body["done"] == true {
                break;
            }
            let pid = project_id(&next);
            visited.push(pid);
            let res = app
                .complete(&floor.judge.user.token, queue_id(&next), pid, 5)
                .await;
            assert_eq!(res.status, 200, "complete failed: {}", res.text);
        }

        assert_eq!(visited.len(), 3);
        let expected: HashSet<i32> = floor.projects.iter().copied().collect();
        assert_eq!(visited.into_iter().collect::<HashSet<_>>(), expected);
    }

    #[tokio::test]
    async fn reinitializing_an_unassigned_judge_is_not_found() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;

        let res = reinit(&app, &floor, false).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod scoring {
    use super::*;

    #[tokio::test]
    async fn resubmitting_a_vote_overwrites_it() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;
        let project = floor.projects[0];

        for (score, comment) in [(4, "first look"), (9, "demo was great")] {
            let res = app
                .post_with_token(
                    routes::JUDGE_VOTES,
                    &json!({"project_id": project, "score": score, "comment": comment}),
                    &floor.judge.user.token,
                )
                .await;
            assert_eq!(res.status, 200, "vote failed: {}", res.text);
        }

        let votes = app
            .get_with_token(&routes::votes(floor.hackathon_id), &floor.admin.token)
            .await;
        let list = votes.body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["score"], 9);
        assert_eq!(list[0]["comment"], "demo was great");
        assert_eq!(list[0]["judge_name"], "judge_ada");
    }

    #[tokio::test]
    async fn out_of_range_score_is_rejected() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;

        for score in [0, 11] {
            let res = app
                .post_with_token(
                    routes::JUDGE_VOTES,
                    &json!({"project_id": floor.projects[0], "score": score}),
                    &floor.judge.user.token,
                )
                .await;
            assert_eq!(res.status, 400);
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn vote_comment_is_sanitized() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;

        let res = app
            .post_with_token(
                routes::JUDGE_VOTES,
                &json!({"project_id": floor.projects[0], "score": 7, "comment": " <b>nice</b> "}),
                &floor.judge.user.token,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["comment"], "&lt;b&gt;nice&lt;&#x2F;b&gt;");
    }

    #[tokio::test]
    async fn non_judge_cannot_vote() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;
        let visitor = app.create_user("visitor").await;

        let res = app
            .post_with_token(
                routes::JUDGE_VOTES,
                &json!({"project_id": floor.projects[0], "score": 7}),
                &visitor.token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod completion {
    use super::*;

    #[tokio::test]
    async fn completing_advances_to_the_next_table() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;
        app.assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id)
            .await;

        let next = app.next_table(&floor.judge.user.token, floor.hackathon_id).await;
        let res = app
            .complete(&floor.judge.user.token, queue_id(&next), floor.projects[0], 8)
            .await;

        assert_eq!(res.status, 200, "complete failed: {}", res.text);
        assert_eq!(res.body["done"], false);
        assert_eq!(res.body["next_project"]["id"], floor.projects[1]);
        assert_eq!(res.body["remaining"], 2);

        let progress = app
            .get_with_token(
                &routes::judge_progress(floor.hackathon_id),
                &floor.judge.user.token,
            )
            .await;
        assert_eq!(progress.body["completed"], 1);
        assert_eq!(progress.body["remaining"], 2);
    }

    #[tokio::test]
    async fn finishing_the_last_table_reports_done() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;
        app.assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id)
            .await;

        let mut last = None;
        for _ in 0..3 {
            let next = app.next_table(&floor.judge.user.token, floor.hackathon_id).await;
            last = Some(
                app.complete(&floor.judge.user.token, queue_id(&next), project_id(&next), 6)
                    .await,
            );
        }

        let last = last.unwrap();
        assert_eq!(last.body["done"], true);
        assert!(last.body["next_project"].is_null());
        assert_eq!(last.body["remaining"], 0);
    }

    #[tokio::test]
    async fn completing_twice_keeps_first_completion_time() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;
        app.assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id)
            .await;
        let next = app.next_table(&floor.judge.user.token, floor.hackathon_id).await;
        let qid = queue_id(&next);

        let first = app
            .complete(&floor.judge.user.token, qid, floor.projects[0], 5)
            .await;
        assert_eq!(first.status, 200);
        let completed_at = judge_queue_entry::Entity::find_by_id(qid)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap()
            .completed_at;
        assert!(completed_at.is_some());

        let again = app
            .complete(&floor.judge.user.token, qid, floor.projects[0], 7)
            .await;
        assert_eq!(again.status, 200);

        let entry = judge_queue_entry::Entity::find_by_id(qid)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert!(entry.is_completed);
        assert_eq!(entry.completed_at, completed_at);

        // The vote itself is still updated.
        let votes = app
            .get_with_token(&routes::votes(floor.hackathon_id), &floor.admin.token)
            .await;
        assert_eq!(votes.body[0]["score"], 7);
    }

    #[tokio::test]
    async fn judge_cannot_complete_another_judges_entry() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;
        let other = app.create_judge(&floor.admin.token, "judge_bob").await;
        app.assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id)
            .await;
        let next = app.next_table(&floor.judge.user.token, floor.hackathon_id).await;

        let res = app
            .complete(&other.user.token, queue_id(&next), floor.projects[0], 5)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        let progress = app
            .get_with_token(
                &routes::judge_progress(floor.hackathon_id),
                &floor.judge.user.token,
            )
            .await;
        assert_eq!(progress.body["completed"], 0);
    }

    #[tokio::test]
    async fn project_must_match_the_queue_entry() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;
        app.assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id)
            .await;
        let next = app.next_table(&floor.judge.user.token, floor.hackathon_id).await;

        let res = app
            .complete(&floor.judge.user.token, queue_id(&next), floor.projects[2], 5)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_queue_entry_is_not_found() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;

        let res = app
            .complete(&floor.judge.user.token, 424242, floor.projects[0], 5)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn invalid_score_leaves_entry_incomplete() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;
        app.assign(&floor.admin.token, floor.judge.judge_id, floor.hackathon_id)
            .await;
        let next = app.next_table(&floor.judge.user.token, floor.hackathon_id).await;

        let res = app
            .complete(&floor.judge.user.token, queue_id(&next), floor.projects[0], 42)
            .await;
        assert_eq!(res.status, 400);

        let again = app.next_table(&floor.judge.user.token, floor.hackathon_id).await;
        assert_eq!(queue_id(&again), queue_id(&next));
    }
}

mod floor_info {
    use super::*;

    #[tokio::test]
    async fn judge_sees_projects_and_maps() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;
        let res = app
            .post_with_token(
                &routes::maps(floor.hackathon_id),
                &json!({"name": "Hall A", "image_url": "https://maps.example.com/hall-a.png"}),
                &floor.admin.token,
            )
            .await;
        assert_eq!(res.status, 201, "add_map failed: {}", res.text);

        let projects = app
            .get_with_token(
                &routes::judge_projects(floor.hackathon_id),
                &floor.judge.user.token,
            )
            .await;
        let tables: Vec<i64> = projects
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["table_number"].as_i64().unwrap())
            .collect();
        assert_eq!(tables, vec![1, 2, 3]);

        let maps = app
            .get_with_token(&routes::judge_maps(floor.hackathon_id), &floor.judge.user.token)
            .await;
        assert_eq!(maps.body.as_array().unwrap().len(), 1);
        assert_eq!(maps.body[0]["name"], "Hall A");
        assert_eq!(
            maps.body[0]["image_url"],
            "https:&#x2F;&#x2F;maps.example.com&#x2F;hall-a.png"
        );
    }

    #[tokio::test]
    async fn duplicate_table_number_conflicts() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;

        let res = app
            .post_with_token(
                &routes::projects(floor.hackathon_id),
                &json!({"name": "Copycat", "table_number": 2}),
                &floor.admin.token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn bulk_insert_is_all_or_nothing() {
        let app = TestApp::spawn().await;
        let floor = setup_floor(&app).await;

        let res = app
            .post_with_token(
                &routes::projects_bulk(floor.hackathon_id),
                &json!({"projects": [
                    {"name": "Delta", "table_number": 4},
                    {"name": "Echo", "table_number": 1},
                ]}),
                &floor.admin.token,
            )
            .await;
        assert_eq!(res.status, 409);

        let res = app
            .post_with_token(
                &routes::projects_bulk(floor.hackathon_id),
                &json!({"projects": [
                    {"name": "Delta", "table_number": 4},
                    {"name": "Echo", "table_number": 5},
                ]}),
                &floor.admin.token,
            )
            .await;
        assert_eq!(res.status, 201, "bulk failed: {}", res.text);
        assert_eq!(res.body["created"], 2);

        let projects = app
            .get_with_token(
                &routes::judge_projects(floor.hackathon_id),
                &floor.judge.user.token,
            )
            .await;
        assert_eq!(projects.body.as_array().unwrap().len(), 5);
    }
}
