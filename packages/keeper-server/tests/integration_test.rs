//! Integration tests for the keeper server API.
//!
//! Run with: cargo test --test integration_test -- --ignored --nocapture
//!
//! Prerequisites:
//! - PostgreSQL reachable via DATABASE_URI

use keeper_core::model::{sync_epoch, AuthUser, Status, Text};
use keeper_core::SyncBatch;
use keeper_server::api::{self, AppState};
use keeper_server::db;
use uuid::Uuid;

const TOKEN_SECRET: &str = "integration-test-secret";

/// Bind the full router on an ephemeral port and return its base URL.
async fn spawn_server() -> Option<String> {
    let database_uri = std::env::var("DATABASE_URI").ok()?;
    let pool = db::create_pool(&database_uri).await.ok()?;
    db::run_migrations(&pool).await.ok()?;

    let app = api::router(AppState::new(pool, TOKEN_SECRET.into()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Some(format!("http://{addr}"))
}

async fn register(base: &str, http: &reqwest::Client) -> (Uuid, String) {
    let login = format!("it-user-{}", Uuid::new_v4());
    let resp = http
        .post(format!("{base}/api/user/register"))
        .json(&AuthUser {
            login,
            password: "hunter2".into(),
        })
        .send()
        .await
        .expect("register request");
    assert_eq!(resp.status(), 200);
    let token = resp
        .headers()
        .get("authorization")
        .expect("token header")
        .to_str()
        .expect("token is ascii")
        .to_owned();
    let user: serde_json::Value = resp.json().await.expect("register body");
    assert_eq!(user["password"], "", "hash must be blanked");
    let user_id: Uuid = user["id"].as_str().expect("id").parse().expect("uuid");
    (user_id, token)
}

#[tokio::test]
#[ignore]
async fn register_sync_and_lww() {
    let Some(base) = spawn_server().await else {
        panic!("DATABASE_URI must be set for integration tests");
    };
    let http = reqwest::Client::new();
    let (user_id, token) = register(&base, &http).await;

    // Device A pushes one text; the pre-apply delta is empty.
    let text = Text::new("Denis the best".into(), user_id);
    let resp = http
        .post(format!("{base}/api/user/texts/sync"))
        .header("Authorization", &token)
        .json(&SyncBatch::new(sync_epoch(), vec![text.clone()]))
        .send()
        .await
        .expect("sync request");
    assert_eq!(resp.status(), 202);
    let delta: Vec<Text> = resp.json().await.expect("delta");
    assert!(delta.is_empty(), "caller must not see its own submission");

    // Device B pulls with an empty batch from the epoch.
    let resp = http
        .post(format!("{base}/api/user/texts/sync"))
        .header("Authorization", &token)
        .json(&SyncBatch::<Text>::new(sync_epoch(), Vec::new()))
        .send()
        .await
        .expect("pull-only sync");
    assert_eq!(resp.status(), 202, "empty batch is a valid pull-only sync");
    let delta: Vec<Text> = resp.json().await.expect("delta");
    assert_eq!(delta.len(), 1);
    assert_eq!(delta[0].id, text.id);
    assert_eq!(delta[0].text, "Denis the best");

    // An older rewrite of the same id is discarded by the LWW guard.
    let mut stale = text.clone();
    stale.text = "stale".into();
    stale.modified_tms = stale.modified_tms - chrono::Duration::hours(1);
    let resp = http
        .post(format!("{base}/api/user/texts/sync"))
        .header("Authorization", &token)
        .json(&SyncBatch::new(sync_epoch(), vec![stale]))
        .send()
        .await
        .expect("stale sync");
    assert_eq!(resp.status(), 202);

    let resp = http
        .get(format!("{base}/api/user/texts/{}", text.id))
        .header("Authorization", &token)
        .send()
        .await
        .expect("get request");
    assert_eq!(resp.status(), 200);
    let stored: Text = resp.json().await.expect("text body");
    assert_eq!(stored.text, "Denis the best");
}

#[tokio::test]
#[ignore]
async fn unauthenticated_requests_are_rejected() {
    let Some(base) = spawn_server().await else {
        panic!("DATABASE_URI must be set for integration tests");
    };
    let http = reqwest::Client::new();

    for path in [
        "/api/user/texts",
        "/api/user/cards",
        "/api/user/credentials",
        "/api/user/binaries",
    ] {
        let resp = http
            .get(format!("{base}{path}"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 401, "missing token on {path}");

        let resp = http
            .get(format!("{base}{path}"))
            .header("Authorization", "forged.token")
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 401, "forged token on {path}");
    }
}

#[tokio::test]
#[ignore]
async fn owner_is_rewritten_on_ingest() {
    let Some(base) = spawn_server().await else {
        panic!("DATABASE_URI must be set for integration tests");
    };
    let http = reqwest::Client::new();
    let (user_id, token) = register(&base, &http).await;

    // Submit an item claiming a different owner.
    let mut text = Text::new("mine anyway".into(), Uuid::new_v4());
    text.status = Status::Active;
    let resp = http
        .post(format!("{base}/api/user/texts/sync"))
        .header("Authorization", &token)
        .json(&SyncBatch::new(sync_epoch(), vec![text.clone()]))
        .send()
        .await
        .expect("sync request");
    assert_eq!(resp.status(), 202);

    let resp = http
        .get(format!("{base}/api/user/texts/{}", text.id))
        .header("Authorization", &token)
        .send()
        .await
        .expect("get request");
    assert_eq!(resp.status(), 200);
    let stored: Text = resp.json().await.expect("text body");
    assert_eq!(stored.user_id, user_id, "owner must be the principal");
}

#[tokio::test]
#[ignore]
async fn duplicate_registration_conflicts() {
    let Some(base) = spawn_server().await else {
        panic!("DATABASE_URI must be set for integration tests");
    };
    let http = reqwest::Client::new();

    let auth = AuthUser {
        login: format!("it-dup-{}", Uuid::new_v4()),
        password: "hunter2".into(),
    };
    let first = http
        .post(format!("{base}/api/user/register"))
        .json(&auth)
        .send()
        .await
        .expect("first register");
    assert_eq!(first.status(), 200);

    let second = http
        .post(format!("{base}/api/user/register"))
        .json(&auth)
        .send()
        .await
        .expect("second register");
    assert_eq!(second.status(), 409);
}
