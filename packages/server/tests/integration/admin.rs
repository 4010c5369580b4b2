use serde_json::json;

use crate::common::{TestApp, routes};

mod admin_capability {
    use super::*;

    #[tokio::test]
    async fn granted_admin_can_manage_immediately() {
        let app = TestApp::spawn().await;
        let root = app.create_admin("organizer").await;
        let alice = app.create_user("alice").await;

        // Prime the cache with the negative lookup.
        let before = app.get_with_token(routes::JUDGES, &alice.token).await;
        assert_eq!(before.status, 403);

        let res = app
            .post_with_token(routes::ADMINS, &json!({"user_id": alice.id}), &root.token)
            .await;
        assert_eq!(res.status, 201, "grant failed: {}", res.text);

        let after = app.get_with_token(routes::JUDGES, &alice.token).await;
        assert_eq!(after.status, 200);
    }

    #[tokio::test]
    async fn revoked_admin_loses_access_immediately() {
        let app = TestApp::spawn().await;
        let root = app.create_admin("organizer").await;
        let alice = app.create_admin("alice").await;

        let before = app.get_with_token(routes::JUDGES, &alice.token).await;
        assert_eq!(before.status, 200);

        let res = app
            .delete_with_token(&routes::admin(alice.id), &root.token)
            .await;
        assert_eq!(res.status, 204, "revoke failed: {}", res.text);

        let after = app.get_with_token(routes::JUDGES, &alice.token).await;
        assert_eq!(after.status, 403);
    }

    #[tokio::test]
    async fn granting_twice_conflicts() {
        let app = TestApp::spawn().await;
        let root = app.create_admin("organizer").await;
        let alice = app.create_user("alice").await;

        let body = json!({"user_id": alice.id});
        app.post_with_token(routes::ADMINS, &body, &root.token).await;
        let res = app.post_with_token(routes::ADMINS, &body, &root.token).await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn admin_cannot_revoke_themselves() {
        let app = TestApp::spawn().await;
        let root = app.create_admin("organizer").await;

        let res = app.delete_with_token(&routes::admin(root.id), &root.token).await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn admins_are_listed_with_usernames() {
        let app = TestApp::spawn().await;
        let root = app.create_admin("organizer").await;

        let res = app.get_with_token(routes::ADMINS, &root.token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body[0]["user_id"], root.id);
        assert_eq!(res.body[0]["username"], "organizer");
    }
}

mod judges {
    use super::*;

    #[tokio::test]
    async fn new_judge_is_recognized_despite_cached_negative_lookup() {
        let app = TestApp::spawn().await;
        let root = app.create_admin("organizer").await;
        let alice = app.create_user("alice").await;

        let before = app.get_with_token(routes::JUDGE_ME, &alice.token).await;
        assert_eq!(before.body["is_judge"], false);

        let res = app
            .post_with_token(routes::JUDGES, &json!({"user_id": alice.id, "name": "Alice L."}), &root.token)
            .await;
        assert_eq!(res.status, 201, "create_judge failed: {}", res.text);
        assert_eq!(res.body["name"], "Alice L.");

        let after = app.get_with_token(routes::JUDGE_ME, &alice.token).await;
        assert_eq!(after.body["is_judge"], true);
        assert_eq!(after.body["judge_id"], res.id());
    }

    #[tokio::test]
    async fn user_can_only_be_made_judge_once() {
        let app = TestApp::spawn().await;
        let root = app.create_admin("organizer").await;
        let alice = app.create_user("alice").await;

        let body = json!({"user_id": alice.id});
        let first = app.post_with_token(routes::JUDGES, &body, &root.token).await;
        assert_eq!(first.status, 201);
        let second = app.post_with_token(routes::JUDGES, &body, &root.token).await;

        assert_eq!(second.status, 409);
    }

    #[tokio::test]
    async fn deactivated_judge_loses_access_and_keeps_votes() {
        let app = TestApp::spawn().await;
        let root = app.create_admin("organizer").await;
        let hackathon_id = app
            .create_hackathon(&root.token, "Spring Hack", "in_progress", None)
            .await;
        let alpha = app.create_project(&root.token, hackathon_id, "Alpha", 1).await;
        app.create_project(&root.token, hackathon_id, "Beta", 2).await;
        let judge = app.create_judge(&root.token, "judge_ada").await;
        app.assign(&root.token, judge.judge_id, hackathon_id).await;
        let next = app.next_table(&judge.user.token, hackathon_id).await;
        let qid = next.body["queue_id"].as_i64().unwrap() as i32;
        app.complete(&judge.user.token, qid, alpha, 8).await;

        // Prime the cache with the positive lookup.
        let before = app.get_with_token(routes::JUDGE_ASSIGNMENTS, &judge.user.token).await;
        assert_eq!(before.status, 200);

        let res = app
            .patch_with_token(&routes::judge(judge.judge_id), &json!({"is_active": false}), &root.token)
            .await;
        assert_eq!(res.status, 200, "deactivate failed: {}", res.text);
        assert_eq!(res.body["is_active"], false);

        let denied = app.get_with_token(routes::JUDGE_ASSIGNMENTS, &judge.user.token).await;
        assert_eq!(denied.status, 403);
        let me = app.get_with_token(routes::JUDGE_ME, &judge.user.token).await;
        assert_eq!(me.body["is_judge"], false);

        let votes = app
            .get_with_token(&routes::votes(hackathon_id), &root.token)
            .await;
        assert_eq!(votes.body.as_array().unwrap().len(), 1);

        let res = app
            .patch_with_token(&routes::judge(judge.judge_id), &json!({"is_active": true}), &root.token)
            .await;
        assert_eq!(res.status, 200, "reactivate failed: {}", res.text);

        let restored = app.get_with_token(routes::JUDGE_ASSIGNMENTS, &judge.user.token).await;
        assert_eq!(restored.status, 200);
        let progress = app
            .get_with_token(&routes::judge_progress(hackathon_id), &judge.user.token)
            .await;
        assert_eq!(progress.body["completed"], 1);
        assert_eq!(progress.body["remaining"], 1);
    }

    #[tokio::test]
    async fn updating_unknown_judge_is_not_found() {
        let app = TestApp::spawn().await;
        let root = app.create_admin("organizer").await;

        let res = app
            .patch_with_token(&routes::judge(9999), &json!({"is_active": false}), &root.token)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn removing_a_judge_cascades_and_revokes_access() {
        let app = TestApp::spawn().await;
        let root = app.create_admin("organizer").await;
        let hackathon_id = app
            .create_hackathon(&root.token, "Spring Hack", "in_progress", None)
            .await;
        let project = app.create_project(&root.token, hackathon_id, "Alpha", 1).await;
        let judge = app.create_judge(&root.token, "judge_ada").await;
        app.assign(&root.token, judge.judge_id, hackathon_id).await;
        let next = app.next_table(&judge.user.token, hackathon_id).await;
        let qid = next.body["queue_id"].as_i64().unwrap() as i32;
        app.complete(&judge.user.token, qid, project, 8).await;

        let res = app
            .delete_with_token(&routes::judge(judge.judge_id), &root.token)
            .await;
        assert_eq!(res.status, 204, "remove failed: {}", res.text);

        let votes = app
            .get_with_token(&routes::votes(hackathon_id), &root.token)
            .await;
        assert_eq!(votes.body, json!([]));

        let denied = app.get_with_token(&routes::judge_next(hackathon_id), &judge.user.token).await;
        assert_eq!(denied.status, 403);

        let missing = app
            .delete_with_token(&routes::judge(judge.judge_id), &root.token)
            .await;
        assert_eq!(missing.status, 404);
    }
}

mod hackathons {
    use super::*;

    #[tokio::test]
    async fn status_can_be_changed_until_final() {
        let app = TestApp::spawn().await;
        let root = app.create_admin("organizer").await;
        let id = app.create_hackathon(&root.token, "Spring Hack", "draft", None).await;

        let res = app
            .patch_with_token(&routes::hackathon_status(id), &json!({"status": "completed"}), &root.token)
            .await;
        assert_eq!(res.status, 200, "update failed: {}", res.text);
        assert_eq!(res.body["status"], "completed");

        let res = app
            .patch_with_token(&routes::hackathon_status(id), &json!({"status": "open"}), &root.token)
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn unknown_status_is_rejected() {
        let app = TestApp::spawn().await;
        let root = app.create_admin("organizer").await;
        let id = app.create_hackathon(&root.token, "Spring Hack", "draft", None).await;

        let res = app
            .patch_with_token(&routes::hackathon_status(id), &json!({"status": "paused"}), &root.token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn any_user_can_list_hackathons() {
        let app = TestApp::spawn().await;
        let root = app.create_admin("organizer").await;
        app.create_hackathon(&root.token, "First", "draft", None).await;
        app.create_hackathon(&root.token, "Second", "open", Some(10)).await;
        let alice = app.create_user("alice").await;

        let res = app.get_with_token(routes::HACKATHONS, &alice.token).await;

        assert_eq!(res.status, 200);
        let names: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|h| h["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Second", "First"]);
    }
}
