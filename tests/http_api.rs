//! End-to-end tests driving the router the way a client would.
//!
//! Tests run under a paused clock, so every sleep advances virtual time
//! deterministically instead of stalling the suite.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use tokio::time;
use tower::ServiceExt;

use tollgate::server::build_router;
use tollgate::state::AppState;

fn app() -> Router {
    build_router(AppState::new(Duration::from_secs(5)))
}

async fn request(app: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    request(app, Method::GET, uri).await
}

async fn delete(app: &Router, uri: &str) -> (StatusCode, String) {
    request(app, Method::DELETE, uri).await
}

#[tokio::test(start_paused = true)]
async fn token_bucket_drains_and_refills() {
    let app = app();
    let uri = "/tokenbucket/t2/acquire?size=10&interval=1000&maxwait=10";

    for _ in 0..10 {
        let (status, _) = get(&app, uri).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
    let (status, _) = get(&app, uri).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);

    time::sleep(Duration::from_millis(1_100)).await;

    for _ in 0..10 {
        let (status, _) = get(&app, uri).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
    let (status, _) = get(&app, uri).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn semaphore_enforces_capacity_and_times_out() {
    let app = app();
    let uri = "/semaphore/s1/acquire?size=2&maxwait=100";

    let tasks: Vec<_> = (0..3)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { get(&app, uri).await })
        })
        .collect();

    let mut keys = vec![];
    let mut timeouts = 0;
    for task in tasks {
        let (status, body) = task.await.unwrap();
        match status {
            StatusCode::OK => keys.push(body),
            StatusCode::REQUEST_TIMEOUT => timeouts += 1,
            other => panic!("unexpected status: {other}"),
        }
    }
    assert_eq!(keys.len(), 2);
    assert_eq!(timeouts, 1);
    assert_ne!(keys[0], keys[1]);

    let (status, _) = get(
        &app,
        &format!("/semaphore/s1/release?key={}", keys[0]),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test(start_paused = true)]
async fn event_broadcasts_its_payload_to_all_waiters() {
    let app = app();

    let waiters: Vec<_> = (0..5)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { get(&app, "/event/e1/wait?maxwait=1000").await })
        })
        .collect();

    time::sleep(Duration::from_millis(100)).await;
    let (status, _) = get(&app, "/event/e1/send?message=all-ready").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for waiter in waiters {
        let (status, body) = waiter.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "all-ready");
    }

    let (status, _) = get(&app, "/event/e1/send?message=again").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test(start_paused = true)]
async fn barrier_rendezvous_is_reusable() {
    let app = app();

    for _ in 0..2 {
        let waiters: Vec<_> = (0..5)
            .map(|_| {
                let app = app.clone();
                tokio::spawn(async move { get(&app, "/barrier/b1/wait?size=5").await })
            })
            .collect();

        for waiter in waiters {
            let (status, _) = waiter.await.unwrap();
            assert_eq!(status, StatusCode::NO_CONTENT);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn watchdog_trips_after_expiry_but_not_before() {
    let app = app();

    let (status, _) = get(&app, "/watchdog/w1/kick?expires=100").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get(&app, "/watchdog/w1/wait?maxwait=200").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&app, "/watchdog/w2/kick?expires=500").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get(&app, "/watchdog/w2/wait?maxwait=100").await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn semaphore_lease_expires_and_frees_its_slot() {
    let app = app();

    let (status, key) = get(&app, "/semaphore/s2/acquire?expires=100").await;
    assert_eq!(status, StatusCode::OK);

    time::sleep(Duration::from_millis(200)).await;

    let (status, _) = get(&app, "/semaphore/s2/acquire?expires=100&maxwait=0").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, &format!("/semaphore/s2/release?key={key}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = get(&app, "/semaphore/s2/stats").await;
    assert_eq!(status, StatusCode::OK);
    let stats: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["expired"], 1);
    assert_eq!(stats["acquired"], 2);
}

#[tokio::test(start_paused = true)]
async fn semaphore_reacquire_and_release_round_trip() {
    let app = app();

    let (status, first) = get(&app, "/semaphore/s3/acquire?size=1&key=k1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, "k1");

    // re-acquisition of a held key returns the same key without waiting
    let (status, again) = get(&app, "/semaphore/s3/acquire?size=1&key=k1&maxwait=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again, "k1");

    let (status, _) = get(&app, "/semaphore/s3/release?key=k1").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // a fresh acquire of the released key succeeds immediately
    let (status, _) = get(&app, "/semaphore/s3/acquire?size=1&key=k1&maxwait=0").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, "/semaphore/s3/stats").await;
    assert_eq!(status, StatusCode::OK);
    let stats: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["acquired"], 2);
    assert_eq!(stats["reacquired"], 1);
    assert_eq!(stats["released"], 1);
}

#[tokio::test(start_paused = true)]
async fn deletion_releases_active_waiters_as_success() {
    let app = app();

    // park a waiter on each blocking primitive kind
    let event_waiter = {
        let app = app.clone();
        tokio::spawn(async move { get(&app, "/event/gone/wait").await })
    };
    let barrier_waiter = {
        let app = app.clone();
        tokio::spawn(async move { get(&app, "/barrier/gone/wait?size=3").await })
    };
    let watchdog_waiter = {
        let app = app.clone();
        tokio::spawn(async move { get(&app, "/watchdog/gone/wait").await })
    };

    time::sleep(Duration::from_millis(50)).await;

    for uri in ["/event/gone", "/barrier/gone", "/watchdog/gone"] {
        let (status, _) = delete(&app, uri).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (status, body) = event_waiter.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
    let (status, _) = barrier_waiter.await.unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = watchdog_waiter.await.unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn counter_counts_resets_and_reports() {
    let app = app();

    let (status, body) = get(&app, "/counter/c1/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "1");

    let (status, body) = get(&app, "/counter/c1/count?amount=41").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "42");

    let (status, body) = get(&app, "/counter/c1/count?amount=-2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "40");

    let (status, _) = get(&app, "/counter/c1/reset?value=7").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = get(&app, "/counter/c1/value").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "7");
}

#[tokio::test]
async fn stats_and_delete_of_missing_primitives_are_not_found() {
    let app = app();

    for uri in [
        "/tokenbucket/nope/stats",
        "/semaphore/nope/stats",
        "/event/nope/stats",
        "/watchdog/nope/stats",
        "/barrier/nope/stats",
        "/counter/nope/stats",
    ] {
        let (status, _) = get(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {uri}");
    }

    let (status, _) = delete(&app, "/semaphore/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn zero_size_is_a_bad_request() {
    let app = app();

    let (status, _) = get(&app, "/tokenbucket/bad/acquire?size=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = get(&app, "/tokenbucket/bad/acquire?interval=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = get(&app, "/semaphore/bad/acquire?size=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = get(&app, "/barrier/bad/wait?size=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // a rejected create leaves nothing behind
    let (status, _) = get(&app, "/tokenbucket/bad/stats").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_query_is_a_bad_request() {
    let app = app();
    let (status, _) = get(&app, "/tokenbucket/t/acquire?size=banana").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn poll_maxwait_returns_immediately() {
    let app = app();

    let (status, _) = get(&app, "/event/quick/wait?maxwait=0").await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);

    let (status, _) = get(&app, "/barrier/quick/wait?size=2&maxwait=0").await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);

    // the gauge rolled back: a later full cohort still trips
    let (status, body) = get(&app, "/barrier/quick/stats").await;
    assert_eq!(status, StatusCode::OK);
    let stats: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["waiting"], 0);
}

#[tokio::test]
async fn ready_endpoint_responds() {
    let app = app();
    let (status, body) = get(&app, "/.well-known/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "I'm ready!\n");
}

#[tokio::test(start_paused = true)]
async fn stats_report_wait_times_and_timeouts() {
    let app = app();
    let uri = "/tokenbucket/tb-stats/acquire?size=1&interval=100&maxwait=500";

    let (status, _) = get(&app, uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    // second acquire waits out the refill
    let (status, _) = get(&app, uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    // third with maxwait=0 cannot wait
    let (status, _) = get(&app, "/tokenbucket/tb-stats/acquire?size=1&interval=100&maxwait=0").await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);

    let (status, body) = get(&app, "/tokenbucket/tb-stats/stats").await;
    assert_eq!(status, StatusCode::OK);
    let stats: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["acquired"], 2);
    assert_eq!(stats["timed_out"], 1);
    assert_eq!(stats["total_wait_time"], 100);
    assert_eq!(stats["average_wait_time"], 50.0);
    assert!(stats["created_at"].is_string());
}
