#![cfg(feature = "web")]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use expense_tracker::app::{AppState, StatusResponse, router};
use expense_tracker::visualization::{SharedVisualization, lock};
use expense_tracker::{Config, Expense, ExpenseStore, MemoryStore, NewExpense};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

struct TestApp {
    app: Router,
    store: MemoryStore,
    vis: SharedVisualization,
}

// Transitions are switched off so hit tests see final geometry right away
fn start() -> TestApp {
    let config = Config {
        transition: Duration::ZERO,
        hover_transition: Duration::ZERO,
        ..Config::default()
    };
    let store = MemoryStore::new("expenses");
    let state = AppState::start(store.clone(), &config);
    let vis = state.visualization();
    TestApp {
        app: router(state),
        store,
        vis,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_json(&self, uri: &str, json: Value) -> (StatusCode, Vec<u8>) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn submit(&self, form: &str) -> (StatusCode, StatusResponse) {
        let request = Request::post("/api/expenses")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// Waits until the subscription task has mirrored `count` records
    async fn mirrored(&self, count: usize) {
        for _ in 0..200 {
            if lock(&self.vis).mirror().len() == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("mirror never reached {} record(s)", count);
    }
}

#[tokio::test]
async fn index_page_has_the_form() {
    let app = start();
    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("id=\"expense-form\""));
    assert!(html.contains("/api/chart.svg"));
}

#[tokio::test]
async fn submitted_expense_reaches_the_mirror() {
    let app = start();
    let (status, reply) = app.submit("name=Coffee&cost=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply.status, "ok");
    let id = reply.id.unwrap();

    app.mirrored(1).await;
    let (status, body) = app.get("/api/expenses").await;
    assert_eq!(status, StatusCode::OK);
    let expenses: Vec<Expense> = serde_json::from_slice(&body).unwrap();
    assert_eq!(expenses, vec![Expense::new(id.as_str(), "Coffee", 5)]);
}

#[tokio::test]
async fn invalid_form_is_rejected_without_a_write() {
    let app = start();
    let (status, reply) = app.submit("name=&cost=5").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.status, "error");
    assert_eq!(
        reply.message.as_deref(),
        Some("Please enter values before submitting")
    );

    let (status, reply) = app.submit("name=Coffee&cost=lots").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.message.as_deref(), Some("Cost must be a whole number"));
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn chart_scene_describes_every_slice() {
    let app = start();
    app.store.create(NewExpense::new("Rent", 30)).await.unwrap();
    app.store.create(NewExpense::new("Food", 10)).await.unwrap();
    app.mirrored(2).await;

    let (status, body) = app.get("/api/chart").await;
    assert_eq!(status, StatusCode::OK);
    let scene: Value = serde_json::from_slice(&body).unwrap();
    let slices = scene["slices"].as_array().unwrap();
    assert_eq!(slices.len(), 2);
    assert_eq!(slices[0]["name"], "Rent");
    assert_eq!(slices[0]["fill"], "#8dd3c7");
    assert_eq!(slices[1]["phase"], "steady");
    assert!(slices[0]["path"].as_str().unwrap().starts_with("M0,-150"));
    assert_eq!(scene["legend"].as_array().unwrap().len(), 2);
    assert_eq!(scene["animating"], false);
}

#[tokio::test]
async fn chart_svg_is_served_as_svg() {
    let app = start();
    app.store.create(NewExpense::new("Rent", 30)).await.unwrap();
    app.mirrored(1).await;

    let response = app
        .app
        .clone()
        .oneshot(Request::get("/api/chart.svg").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "image/svg+xml"
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8(body.to_vec()).unwrap().contains("<svg"));
}

#[tokio::test]
async fn hover_shows_tooltip_and_leave_hides_it() {
    let app = start();
    app.store.create(NewExpense::new("Coffee", 5)).await.unwrap();
    app.mirrored(1).await;

    let (status, body) = app
        .post_json("/api/chart/hover", serde_json::json!({ "x": 255.0, "y": 155.0 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let tip: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(tip["name"], "Coffee");
    assert_eq!(tip["cost"], "$5");
    assert_eq!(tip["hint"], "Click slice to delete");

    let (status, _) = app.post_json("/api/chart/leave", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.get("/api/chart").await;
    let scene: Value = serde_json::from_slice(&body).unwrap();
    assert!(scene["tooltip"].is_null());
}

#[tokio::test]
async fn clicking_a_slice_deletes_its_record() {
    let app = start();
    let id = app.store.create(NewExpense::new("Coffee", 5)).await.unwrap();
    app.mirrored(1).await;

    // The donut hole is not part of any slice
    let (status, body) = app
        .post_json("/api/chart/click", serde_json::json!({ "x": 155.0, "y": 155.0 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let reply: StatusResponse = serde_json::from_slice(&body).unwrap();
    assert!(reply.id.is_none());
    assert_eq!(app.store.len(), 1);

    let (status, body) = app
        .post_json("/api/chart/click", serde_json::json!({ "x": 255.0, "y": 155.0 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let reply: StatusResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply.id, Some(id));
    assert!(app.store.is_empty());

    app.mirrored(0).await;
}

#[tokio::test]
async fn deleting_an_unknown_id_is_not_found() {
    let app = start();
    let request = Request::delete("/api/expenses/nope")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let reply: StatusResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply.status, "error");
    assert_eq!(reply.message.as_deref(), Some("Expense not found: nope"));
}

#[tokio::test]
async fn costs_at_the_integer_limit_keep_the_chart_in_sync() {
    let app = start();
    for _ in 0..3 {
        let (status, _) = app.submit("name=Yacht&cost=9223372036854775807").await;
        assert_eq!(status, StatusCode::OK);
    }
    app.mirrored(3).await;

    app.store.create(NewExpense::new("Coffee", 5)).await.unwrap();
    app.mirrored(4).await;

    let (status, body) = app.get("/api/chart").await;
    assert_eq!(status, StatusCode::OK);
    let scene: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(scene["slices"].as_array().unwrap().len(), 4);
}
