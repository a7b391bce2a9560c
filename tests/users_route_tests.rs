use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use codegate::db::UsersStorage;
use codegate::router::{AppState, users_router};
use serde_json::{Value, json};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use std::{
    fs,
    path::PathBuf,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

const KEY: &str = "users-key";

/// Temporary SQLite file, removed on drop.
struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "codegate-{tag}-{}-{}.sqlite",
            std::process::id(),
            nanos
        ));
        Self { path }
    }

    fn url(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    async fn with_schema(tag: &str) -> Self {
        let db = Self::new(tag);
        UsersStorage::new(db.url())
            .init_schema()
            .await
            .expect("failed to create users table");
        db
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn app(database_url: Option<&str>) -> Router {
    users_router(AppState::new(Some(KEY), database_url))
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("request failed")
}

fn get_users(key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/users");
    if let Some(key) = key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::empty()).expect("failed to build request")
}

fn post_users(key: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("X-API-Key", key);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

async fn body_json(resp: Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not json")
}

fn valid_user() -> Value {
    json!({"name": "Ada Lovelace", "username": "ada", "password": "analytical"})
}

#[tokio::test]
async fn create_then_list_users() {
    let db = TempDb::with_schema("create-list").await;
    let url = db.url();
    let app = app(Some(&url));

    let resp = send(&app, get_users(Some(KEY))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!([]));

    let resp = send(&app, post_users(Some(KEY), valid_user())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp.headers()[header::LOCATION]
        .to_str()
        .expect("location header was not ascii")
        .to_string();
    let created = body_json(resp).await;
    let id = created["id"].as_i64().expect("id was not an integer");
    assert_eq!(location, format!("/users/{id}"));
    assert_eq!(created["name"], "Ada Lovelace");
    assert_eq!(created["username"], "ada");
    assert!(created.get("password").is_none());

    let resp = send(
        &app,
        post_users(
            Some(KEY),
            json!({"name": "Grace", "username": "grace", "password": "cobol"}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let second = body_json(resp).await["id"].as_i64().unwrap();
    assert!(second > id);

    let resp = send(&app, get_users(Some(KEY))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let rows = body_json(resp).await;
    let rows = rows.as_array().expect("users body was not an array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], id);
    assert_eq!(rows[0]["username"], "ada");
    assert_eq!(rows[0]["password"], "analytical");
    assert_eq!(rows[1]["name"], "Grace");
}

#[tokio::test]
async fn rejected_insert_never_reaches_the_database() {
    let db = TempDb::with_schema("gate").await;
    let url = db.url();
    let app = app(Some(&url));

    let resp = send(&app, post_users(None, valid_user())).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = send(&app, post_users(Some("wrong"), valid_user())).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = send(&app, get_users(None)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(&app, get_users(Some(KEY))).await;
    assert_eq!(body_json(resp).await, json!([]));
}

#[tokio::test]
async fn validation_precedes_database_access() {
    // No database configured at all: validation still answers 400.
    let app = app(None);
    let resp = send(
        &app,
        post_users(Some(KEY), json!({"name": "", "username": "a", "password": "b"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Name is required.");

    let resp = send(
        &app,
        post_users(Some(KEY), json!({"name": "n", "username": "u", "password": " "})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Password is required.");

    let req = Request::builder()
        .method("POST")
        .uri("/users")
        .header("X-API-Key", KEY)
        .body(Body::empty())
        .expect("failed to build request");
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Request body is required.");
}

#[tokio::test]
async fn missing_connection_string_is_a_problem_response() {
    let app = app(None);

    let resp = send(&app, get_users(Some(KEY))).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "application/problem+json"
    );
    assert_eq!(
        body_json(resp).await["detail"],
        "Database connection is not configured."
    );

    let resp = send(&app, post_users(Some(KEY), valid_user())).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp).await["detail"],
        "Database connection is not configured."
    );
}

#[tokio::test]
async fn unreachable_database_is_a_generic_500() {
    let url = "sqlite:/nonexistent-dir/codegate/missing.db";
    let app = app(Some(url));

    let resp = send(&app, get_users(Some(KEY))).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp).await["detail"],
        "An error occurred while fetching users."
    );

    let resp = send(&app, post_users(Some(KEY), valid_user())).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp).await["detail"],
        "An error occurred while creating the user."
    );
}

#[tokio::test]
async fn missing_table_is_a_generic_500() {
    // Database file exists but has no `users` table.
    let db = TempDb::new("no-table");
    fs::File::create(&db.path).expect("failed to create empty database file");
    let url = db.url();
    let app = app(Some(&url));

    let resp = send(&app, get_users(Some(KEY))).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "An error occurred while fetching users.");
    assert!(!body.to_string().contains("no such table"));

    let resp = send(&app, post_users(Some(KEY), valid_user())).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn ok_code_is_served_by_the_users_service() {
    let app = app(None);
    let req = Request::builder()
        .uri("/okCode")
        .header("X-API-Key", KEY)
        .body(Body::empty())
        .expect("failed to build request");
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Everything is awesome!");
}

#[tokio::test]
async fn insert_without_generated_id_is_a_500() {
    // `id` is plain TEXT with no default, so RETURNING id yields NULL.
    let db = TempDb::new("null-id");
    let mut conn = SqliteConnectOptions::from_str(&db.url())
        .expect("invalid sqlite url")
        .create_if_missing(true)
        .connect()
        .await
        .expect("failed to open database");
    sqlx::query("CREATE TABLE users (id TEXT, name TEXT, username TEXT, password TEXT)")
        .execute(&mut conn)
        .await
        .expect("failed to create users table");
    conn.close().await.expect("failed to close connection");

    let url = db.url();
    let app = app(Some(&url));
    let resp = send(&app, post_users(Some(KEY), valid_user())).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(resp.headers().get(header::LOCATION).is_none());
    assert_eq!(body_json(resp).await["detail"], "Failed to create user.");
}

#[tokio::test]
async fn capitalized_body_keys_are_accepted() {
    let db = TempDb::with_schema("capitalized").await;
    let url = db.url();
    let app = app(Some(&url));

    let resp = send(
        &app,
        post_users(
            Some(KEY),
            json!({"Name": "Ada", "Username": "ada", "Password": "pw"}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["name"], "Ada");
    assert_eq!(created["username"], "ada");
}
