#![cfg(feature = "web")]
use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::chart::Tooltip;
use crate::config::Config;
use crate::error::{FormError, RenderError, StoreError, SubmitError};
use crate::expense::{Expense, ExpenseId};
use crate::form::ExpenseForm;
use crate::render::{render_png, render_svg};
use crate::store::{ExpenseStore, MemoryStore};
use crate::visualization::{
    Clock, SharedVisualization, Visualization, delete_at, lock, supervise_subscription,
};

/// State shared by every request handler
pub struct AppState<S: ExpenseStore> {
    store: S,
    vis: SharedVisualization,
    clock: Clock,
    mirroring: JoinHandle<()>,
}

impl<S: ExpenseStore> AppState<S> {
    /// Creates the state and starts mirroring the store into the chart
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(store: S, config: &Config) -> Self {
        let vis = Arc::new(Mutex::new(Visualization::new(config)));
        let clock = Clock::default();
        let mirroring = supervise_subscription(store.clone(), vis.clone(), clock);
        AppState {
            store,
            vis,
            clock,
            mirroring,
        }
    }

    pub fn visualization(&self) -> SharedVisualization {
        self.vis.clone()
    }

    /// Whether the chart is still following the store
    pub fn is_mirroring(&self) -> bool {
        !self.mirroring.is_finished()
    }
}

impl<S: ExpenseStore> Drop for AppState<S> {
    fn drop(&mut self) {
        self.mirroring.abort();
    }
}

/// Errors a handler can answer with
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Invalid(#[from] FormError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Invalid(e) => AppError::Invalid(e),
            SubmitError::Store(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = StatusResponse {
            status: "error".to_string(),
            message: Some(self.to_string()),
            id: None,
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Deserialize)]
struct ExpenseInput {
    #[serde(default)]
    name: String,
    #[serde(default)]
    cost: String,
}

#[derive(Deserialize)]
struct Pointer {
    x: f64,
    y: f64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StatusResponse {
    pub status: String,
    pub message: Option<String>,
    pub id: Option<ExpenseId>,
}

impl StatusResponse {
    fn ok(id: Option<ExpenseId>) -> Self {
        StatusResponse {
            status: "ok".to_string(),
            message: None,
            id,
        }
    }
}

type Shared<S> = State<Arc<AppState<S>>>;

/// Builds the HTTP routes around a started [`AppState`]
pub fn router<S: ExpenseStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route(
            "/api/expenses",
            get(list_expenses::<S>).post(submit_expense::<S>),
        )
        .route("/api/expenses/:id", delete(delete_expense::<S>))
        .route("/api/chart", get(chart_scene::<S>))
        .route("/api/chart.svg", get(chart_svg::<S>))
        .route("/api/chart.png", get(chart_png::<S>))
        .route("/api/chart/hover", post(chart_hover::<S>))
        .route("/api/chart/leave", post(chart_leave::<S>))
        .route("/api/chart/click", post(chart_click::<S>))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(Arc::new(state))
}

/// Runs the web server until it fails
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = match &config.snapshot {
        Some(path) => MemoryStore::open(config.collection.clone(), path)?,
        None => MemoryStore::new(config.collection.clone()),
    };
    let app = router(AppState::start(store, &config));

    let listener = TcpListener::bind(config.addr).await?;
    info!("Listening on http://{}", config.addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

async fn list_expenses<S: ExpenseStore>(State(state): Shared<S>) -> Json<Vec<Expense>> {
    Json(lock(&state.vis).mirror().snapshot())
}

async fn submit_expense<S: ExpenseStore>(
    State(state): Shared<S>,
    Form(input): Form<ExpenseInput>,
) -> Result<Json<StatusResponse>, AppError> {
    let mut form = ExpenseForm::new(input.name, input.cost);
    let id = form.submit(&state.store).await?;
    Ok(Json(StatusResponse::ok(Some(id))))
}

async fn delete_expense<S: ExpenseStore>(
    State(state): Shared<S>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let id = ExpenseId::new(id);
    state.store.delete(&id).await?;
    Ok(Json(StatusResponse::ok(Some(id))))
}

async fn chart_scene<S: ExpenseStore>(State(state): Shared<S>) -> impl IntoResponse {
    let now = state.clock.now();
    let mut vis = lock(&state.vis);
    vis.chart_mut().prune(now);
    Json(vis.frame(now))
}

async fn chart_svg<S: ExpenseStore>(State(state): Shared<S>) -> Result<Response, AppError> {
    let frame = lock(&state.vis).frame(state.clock.now());
    let svg = render_svg(&frame)?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

async fn chart_png<S: ExpenseStore>(State(state): Shared<S>) -> Result<Response, AppError> {
    let frame = lock(&state.vis).frame(state.clock.now());
    let png = render_png(&frame)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

async fn chart_hover<S: ExpenseStore>(
    State(state): Shared<S>,
    Json(pointer): Json<Pointer>,
) -> Json<Option<Tooltip>> {
    let now = state.clock.now();
    Json(lock(&state.vis).chart_mut().hover(pointer.x, pointer.y, now))
}

async fn chart_leave<S: ExpenseStore>(State(state): Shared<S>) -> StatusCode {
    let now = state.clock.now();
    lock(&state.vis).chart_mut().leave(now);
    StatusCode::NO_CONTENT
}

async fn chart_click<S: ExpenseStore>(
    State(state): Shared<S>,
    Json(pointer): Json<Pointer>,
) -> Result<Json<StatusResponse>, AppError> {
    let id = delete_at(&state.store, &state.vis, &state.clock, pointer.x, pointer.y).await?;
    Ok(Json(StatusResponse::ok(id)))
}
