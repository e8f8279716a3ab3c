use crate::config::Config;
use crate::planner::ranges::parse_bound;
use crate::planner::{Activity, ActivityDraft, Column, DateRange, DayKey, PlannerState, WeekendKey};
use crate::session::PlannerSession;
use crate::storage::SqliteStore;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type SharedSession = Arc<Mutex<PlannerSession<SqliteStore>>>;

#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
    pub session: SharedSession,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/status", get(status))
        .route("/api/v1/plan", get(plan))
        .route("/api/v1/ranges", get(ranges))
        .route("/api/v1/range", put(select_range))
        .route("/api/v1/navigate/previous", post(navigate_previous))
        .route("/api/v1/navigate/next", post(navigate_next))
        .route("/api/v1/catalog", get(catalog_list).post(catalog_add))
        .route("/api/v1/catalog/:id", delete(catalog_delete))
        .route(
            "/api/v1/columns/:day/activities",
            get(column_list).post(column_add),
        )
        .route(
            "/api/v1/activities/:id",
            put(activity_edit).delete(activity_delete),
        )
        .route("/api/v1/drag/start", post(drag_start))
        .route("/api/v1/drag/over", post(drag_over))
        .route("/api/v1/drag/end", post(drag_end))
        .route("/api/v1/drag/cancel", post(drag_cancel))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct StatusPayload {
    api_port: u16,
    db_path: String,
    country_code: String,
    weekend_key: Option<WeekendKey>,
    saved_ranges: usize,
    planned_days: usize,
}

#[derive(Debug, Serialize)]
struct PlanPayload {
    weekend_key: Option<WeekendKey>,
    selection: Option<DateRange>,
    columns: Vec<Column>,
    dragging: Option<String>,
    preview: Option<Activity>,
}

impl From<&PlannerState> for PlanPayload {
    fn from(state: &PlannerState) -> Self {
        Self {
            weekend_key: state.current_weekend_key(),
            selection: state.selection(),
            columns: state.columns().to_vec(),
            dragging: state.drag().dragged_id().map(str::to_string),
            preview: state.drag().preview().cloned(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LegendEntry {
    start: String,
    end: String,
    weekend_keys: Vec<WeekendKey>,
}

#[derive(Debug, Serialize)]
struct RangesPayload {
    ranges: Vec<LegendEntry>,
    entries: BTreeMap<WeekendKey, DateRange>,
    in_saved_range: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RangesQuery {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RangeUpdatePayload {
    start: String,
    end: String,
}

#[derive(Debug, Deserialize)]
struct ColumnAddPayload {
    catalog_id: Option<String>,
    activity: Option<ActivityDraft>,
}

#[derive(Debug, Deserialize)]
struct DragStartPayload {
    activity_id: String,
}

#[derive(Debug, Deserialize)]
struct DragTargetPayload {
    over_id: Option<String>,
}

async fn status(State(state): State<ApiState>) -> ApiResult<Json<StatusPayload>> {
    let session = state.session.lock().await;
    let planner = session.state();

    Ok(Json(StatusPayload {
        api_port: state.config.api_port,
        db_path: state.config.db_path.display().to_string(),
        country_code: state.config.country_code.clone(),
        weekend_key: planner.current_weekend_key(),
        saved_ranges: planner.ranges().legend().len(),
        planned_days: planner.plan().planned_days(),
    }))
}

async fn plan(State(state): State<ApiState>) -> ApiResult<Json<PlanPayload>> {
    let session = state.session.lock().await;
    Ok(Json(PlanPayload::from(session.state())))
}

async fn ranges(
    State(state): State<ApiState>,
    Query(query): Query<RangesQuery>,
) -> ApiResult<Json<RangesPayload>> {
    let day = query
        .date
        .as_deref()
        .map(parse_bound)
        .transpose()
        .map_err(|error| ApiError::BadRequest(error.to_string()))?;

    let session = state.session.lock().await;
    let registry = session.state().ranges();
    let ranges = registry
        .legend()
        .into_iter()
        .map(|(range, weekend_keys)| LegendEntry {
            start: range.start().format("%Y-%m-%d").to_string(),
            end: range.end().format("%Y-%m-%d").to_string(),
            weekend_keys,
        })
        .collect();

    Ok(Json(RangesPayload {
        ranges,
        entries: registry.all_entries().clone(),
        in_saved_range: day.map(|day| registry.contains_date(day)),
    }))
}

async fn select_range(
    State(state): State<ApiState>,
    Json(payload): Json<RangeUpdatePayload>,
) -> ApiResult<Json<PlanPayload>> {
    let range = parse_range(&payload.start, &payload.end)
        .map_err(|error| ApiError::BadRequest(error.to_string()))?;

    let mut session = state.session.lock().await;
    let next = session.apply(|planner| planner.select_range(range));
    Ok(Json(PlanPayload::from(next)))
}

async fn navigate_previous(State(state): State<ApiState>) -> ApiResult<Json<PlanPayload>> {
    let mut session = state.session.lock().await;
    let next = session.apply(PlannerState::previous);
    Ok(Json(PlanPayload::from(next)))
}

async fn navigate_next(State(state): State<ApiState>) -> ApiResult<Json<PlanPayload>> {
    let mut session = state.session.lock().await;
    let next = session.apply(PlannerState::next);
    Ok(Json(PlanPayload::from(next)))
}

async fn catalog_list(State(state): State<ApiState>) -> ApiResult<Json<Vec<Activity>>> {
    let session = state.session.lock().await;
    Ok(Json(session.state().catalog().activities().to_vec()))
}

async fn catalog_add(
    State(state): State<ApiState>,
    Json(draft): Json<ActivityDraft>,
) -> ApiResult<(StatusCode, Json<Vec<Activity>>)> {
    let mut session = state.session.lock().await;
    let next = session
        .try_apply(|planner| planner.add_to_catalog(draft))
        .map_err(|error| ApiError::BadRequest(error.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(next.catalog().activities().to_vec()),
    ))
}

async fn catalog_delete(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Activity>>> {
    let mut session = state.session.lock().await;
    if session.state().catalog().get(&id).is_none() {
        return Err(ApiError::NotFound(format!("Catalog activity not found: {id}")));
    }

    let next = session.apply(|planner| planner.delete_from_catalog(&id));
    Ok(Json(next.catalog().activities().to_vec()))
}

async fn column_list(
    State(state): State<ApiState>,
    Path(day): Path<String>,
) -> ApiResult<Json<Vec<Activity>>> {
    let column_id = day
        .parse::<DayKey>()
        .map_err(|error| ApiError::BadRequest(error.to_string()))?;

    let session = state.session.lock().await;
    Ok(Json(session.state().plan().activities_for(&column_id).to_vec()))
}

async fn column_add(
    State(state): State<ApiState>,
    Path(day): Path<String>,
    Json(payload): Json<ColumnAddPayload>,
) -> ApiResult<Json<PlanPayload>> {
    let column_id = day
        .parse::<DayKey>()
        .map_err(|error| ApiError::BadRequest(error.to_string()))?;

    let mut session = state.session.lock().await;
    let next = match (payload.catalog_id, payload.activity) {
        (Some(catalog_id), _) => session
            .try_apply(|planner| planner.add_from_catalog(&catalog_id, column_id))
            .map_err(|error| ApiError::NotFound(error.to_string()))?,
        (None, Some(draft)) => {
            let activity = draft
                .into_activity()
                .map_err(|error| ApiError::BadRequest(error.to_string()))?;
            session.apply(|planner| planner.add_activity(&activity, column_id))
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Provide either catalog_id or activity".to_string(),
            ));
        }
    };

    Ok(Json(PlanPayload::from(next)))
}

async fn activity_edit(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(draft): Json<ActivityDraft>,
) -> ApiResult<Json<PlanPayload>> {
    let replacement = draft
        .replacing(&id)
        .map_err(|error| ApiError::BadRequest(error.to_string()))?;

    let mut session = state.session.lock().await;
    if session.state().find_activity(&id).is_none() {
        return Err(ApiError::NotFound(format!("Activity not found: {id}")));
    }

    let next = session.apply(|planner| planner.edit_activity(&id, &replacement));
    Ok(Json(PlanPayload::from(next)))
}

async fn activity_delete(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PlanPayload>> {
    let mut session = state.session.lock().await;
    if session.state().plan().find_activity(&id).is_none() {
        return Err(ApiError::NotFound(format!("Planned activity not found: {id}")));
    }

    let next = session.apply(|planner| planner.delete_activity(&id));
    Ok(Json(PlanPayload::from(next)))
}

async fn drag_start(
    State(state): State<ApiState>,
    Json(payload): Json<DragStartPayload>,
) -> ApiResult<Json<PlanPayload>> {
    let mut session = state.session.lock().await;
    let next = session.apply(|planner| planner.drag_start(&payload.activity_id));
    Ok(Json(PlanPayload::from(next)))
}

async fn drag_over(
    State(state): State<ApiState>,
    Json(payload): Json<DragTargetPayload>,
) -> ApiResult<Json<PlanPayload>> {
    let mut session = state.session.lock().await;
    let next = session.apply(|planner| planner.drag_over(payload.over_id.as_deref()));
    Ok(Json(PlanPayload::from(next)))
}

async fn drag_end(
    State(state): State<ApiState>,
    Json(payload): Json<DragTargetPayload>,
) -> ApiResult<Json<PlanPayload>> {
    let mut session = state.session.lock().await;
    let next = session.apply(|planner| planner.drag_end(payload.over_id.as_deref()));
    Ok(Json(PlanPayload::from(next)))
}

async fn drag_cancel(State(state): State<ApiState>) -> ApiResult<Json<PlanPayload>> {
    let mut session = state.session.lock().await;
    let next = session.apply(PlannerState::drag_cancel);
    Ok(Json(PlanPayload::from(next)))
}

fn parse_range(start: &str, end: &str) -> anyhow::Result<DateRange> {
    DateRange::new(parse_bound(start)?, parse_bound(end)?)
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}
