use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn anonymous_callers_are_limited_per_address() {
    let app = TestApp::spawn_with(|cfg| {
        cfg.rate_limit.enabled = true;
        cfg.rate_limit.anonymous_max = 3;
        cfg.rate_limit.window_ms = 60_000;
    })
    .await;

    for _ in 0..3 {
        let res = app.get_without_token(routes::HACKATHONS).await;
        assert_eq!(res.status, 401);
    }
    let res = app.get_without_token(routes::HACKATHONS).await;

    assert_eq!(res.status, 429);
    assert_eq!(res.body["code"], "RATE_LIMITED");
    let retry_after: u64 = res
        .retry_after
        .as_deref()
        .expect("429 should carry Retry-After")
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
}

#[tokio::test]
async fn rotating_forwarded_for_does_not_reset_quota() {
    let app = TestApp::spawn_with(|cfg| {
        cfg.rate_limit.enabled = true;
        cfg.rate_limit.anonymous_max = 2;
    })
    .await;

    let statuses = get_with_forwarded_for(&app, ["203.0.113.1", "203.0.113.2", "203.0.113.3"]).await;
    assert_eq!(statuses, vec![401, 401, 429]);
}

#[tokio::test]
async fn trusted_proxy_headers_key_on_parsed_address() {
    let app = TestApp::spawn_with(|cfg| {
        cfg.rate_limit.enabled = true;
        cfg.rate_limit.anonymous_max = 1;
        cfg.rate_limit.trust_proxy_headers = true;
    })
    .await;

    // Unparseable values all land on the peer's bucket.
    let statuses = get_with_forwarded_for(&app, ["garbage-0", "garbage-1", "garbage-2"]).await;
    assert_eq!(statuses, vec![401, 429, 429]);

    // A real forwarded address gets its own bucket.
    let other = app
        .get_with_header(routes::HACKATHONS, "x-forwarded-for", "203.0.113.9")
        .await;
    assert_eq!(other.status, 401);
    let again = app
        .get_with_header(routes::HACKATHONS, "x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .await;
    assert_eq!(again.status, 429);
}

async fn get_with_forwarded_for<const N: usize>(app: &TestApp, values: [&str; N]) -> Vec<u16> {
    let mut statuses = Vec::with_capacity(N);
    for value in values {
        let res = app
            .get_with_header(routes::HACKATHONS, "x-forwarded-for", value)
            .await;
        statuses.push(res.status);
    }
    statuses
}

#[tokio::test]
async fn authenticated_callers_use_their_own_quota() {
    let app = TestApp::spawn_with(|cfg| {
        cfg.rate_limit.enabled = true;
        cfg.rate_limit.anonymous_max = 2;
        cfg.rate_limit.authenticated_max = 5;
    })
    .await;

    // Registration and login are anonymous and consume both anonymous slots.
    let alice = app.create_user("alice").await;

    for _ in 0..5 {
        let res = app.get_with_token(routes::HACKATHONS, &alice.token).await;
        assert_eq!(res.status, 200);
    }
    let res = app.get_with_token(routes::HACKATHONS, &alice.token).await;
    assert_eq!(res.status, 429);

    let anon = app
        .post_without_token(routes::LOGIN, &json!({"username": "alice", "password": "x"}))
        .await;
    assert_eq!(anon.status, 429);
}

#[tokio::test]
async fn window_resets_after_it_elapses() {
    let app = TestApp::spawn_with(|cfg| {
        cfg.rate_limit.enabled = true;
        cfg.rate_limit.anonymous_max = 1;
        cfg.rate_limit.window_ms = 300;
    })
    .await;

    assert_eq!(app.get_without_token(routes::HACKATHONS).await.status, 401);
    assert_eq!(app.get_without_token(routes::HACKATHONS).await.status, 429);

    tokio::time::sleep(std::time::Duration::from_millis(400)).await;

    assert_eq!(app.get_without_token(routes::HACKATHONS).await.status, 401);
}

#[tokio::test]
async fn health_is_never_limited() {
    let app = TestApp::spawn_with(|cfg| {
        cfg.rate_limit.enabled = true;
        cfg.rate_limit.anonymous_max = 1;
    })
    .await;

    for _ in 0..5 {
        assert_eq!(app.get_without_token(routes::HEALTH).await.status, 200);
    }
}
