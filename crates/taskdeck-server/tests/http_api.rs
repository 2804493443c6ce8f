//! End-to-end tests driving the full router: auth, task lifecycle, and
//! the error envelope, with in-memory SQLite and a tempdir store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use taskdeck_notify::MemoryNotifier;
use taskdeck_server::auth::{sha256_hex, AuthConfig};
use taskdeck_server::routes::{build_router, InnerAppState};
use taskdeck_service::LocalService;
use taskdeck_store::{create_store, StoreConfig};

const BOUNDARY: &str = "----taskdeck-integration-boundary";

struct TestApp {
    router: Router,
    notifier: Arc<MemoryNotifier>,
}

fn build_app(api_key: Option<&str>) -> TestApp {
    let db = Arc::new(taskdeck_db::SqliteDatabase::open_in_memory().unwrap());
    let notifier = Arc::new(MemoryNotifier::new());
    let service = Arc::new(LocalService::new(
        db.clone(),
        notifier.clone(),
        Some("ops@example.com".to_string()),
    ));
    let store = create_store(&StoreConfig {
        local_data_dir: Some(
            tempfile::tempdir()
                .unwrap()
                .keep()
                .to_string_lossy()
                .to_string(),
        ),
    })
    .unwrap();
    let auth = api_key.map(|key| {
        Arc::new(AuthConfig {
            env_key_hash: Some(sha256_hex(key)),
            db: db.clone(),
        })
    });
    let state = Arc::new(InnerAppState {
        service,
        db,
        auth,
        store,
    });
    TestApp {
        router: build_router(state),
        notifier,
    }
}

fn form_body(fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn form_request(method: Method, uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn full_task_lifecycle() {
    let app = build_app(None);

    // Create
    let resp = app
        .router
        .clone()
        .oneshot(form_request(
            Method::POST,
            "/api/tasks",
            form_body(&[
                ("title", "Quarterly report"),
                ("description", "Draft and circulate"),
                ("status", "pending"),
                ("category", "medium"),
                ("dueDate", "12/31/2026"),
                ("comments", r#"[{"text":"first pass by Friday"}]"#),
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await;
    let id = created["task"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["task"]["color"], "green");
    assert_eq!(created["task"]["dueDate"], "12/31/2026");
    assert_eq!(created["task"]["comments"][0]["text"], "first pass by Friday");
    assert!(created["task"]["comments"][0]["id"].is_string());

    // Status change notifies the operator.
    let resp = app
        .router
        .clone()
        .oneshot(form_request(
            Method::PUT,
            &format!("/api/tasks/{id}"),
            form_body(&[("status", "completed")]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = json_body(resp).await;
    assert_eq!(updated["task"]["status"], "completed");
    assert_eq!(app.notifier.sent_count(), 1);
    assert!(app.notifier.sent()[0]
        .subject
        .starts_with("Task Status Changed"));

    // List shows the single task.
    let resp = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/tasks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = json_body(resp).await;
    assert_eq!(listed["total"], 1);

    // Delete, then the list is empty.
    let resp = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/tasks/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/tasks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = json_body(resp).await;
    assert_eq!(listed["total"], 0);
}

#[tokio::test]
async fn due_date_filter_matches_stored_format() {
    let app = build_app(None);

    for (title, due) in [("a", "01/15/2027"), ("b", "2027-01-15"), ("c", "02/01/2027")] {
        let resp = app
            .router
            .clone()
            .oneshot(form_request(
                Method::POST,
                "/api/tasks",
                form_body(&[
                    ("title", title),
                    ("description", "d"),
                    ("status", "todo"),
                    ("category", "low"),
                    ("dueDate", due),
                ]),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // Both spellings of Jan 15 normalize to the same stored string.
    let resp = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/tasks?dueDate=01%2F15%2F2027")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = json_body(resp).await;
    assert_eq!(listed["total"], 2);
}

#[tokio::test]
async fn tasks_require_auth_when_configured() {
    let app = build_app(Some("td_integration_key"));

    let resp = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/tasks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let v = json_body(resp).await;
    assert_eq!(v["message"], "missing or invalid API key");

    let resp = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/tasks")
                .header("Authorization", "Bearer td_integration_key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Health stays open.
    let resp = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn validation_errors_use_message_envelope() {
    let app = build_app(None);

    let resp = app
        .router
        .clone()
        .oneshot(form_request(
            Method::POST,
            "/api/tasks",
            form_body(&[
                ("title", "t"),
                ("description", "d"),
                ("status", "someday"),
                ("category", "low"),
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v = json_body(resp).await;
    assert_eq!(v["message"], "invalid status value");

    let resp = app
        .router
        .oneshot(form_request(
            Method::POST,
            "/api/tasks",
            form_body(&[
                ("title", "t"),
                ("description", "d"),
                ("status", "pending"),
                ("category", "low"),
                ("dueDate", "not a date"),
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v = json_body(resp).await;
    assert_eq!(v["message"], "invalid due date");
}
