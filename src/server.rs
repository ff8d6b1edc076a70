use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::FormError;
use crate::features::{
    Field, NumericKind, OceanProximity, SampleRow, MAP_BOUNDS, MAP_CENTER, MAP_MAX_ZOOM,
    MAP_MIN_ZOOM, MAP_ZOOM, SAMPLE_DATA,
};
use crate::form::{FeatureRecord, FormEvent, FormPolicy, FormStateController, GeoSource};
use crate::page::INDEX_HTML;
use crate::predict::PredictionClient;

pub type SessionId = u64;

pub const DEFAULT_MAX_SESSIONS: usize = 256;

struct Session {
    form: FormStateController,
    touched: Instant,
}

/// One form controller per page load. Sessions live in memory only and the
/// least recently touched one is evicted once `max_sessions` is reached.
pub struct AppState {
    sessions: Mutex<HashMap<SessionId, Session>>,
    next_id: AtomicU64,
    max_sessions: usize,
    policy: FormPolicy,
    client: PredictionClient,
}

impl AppState {
    pub fn new(policy: FormPolicy, client: PredictionClient) -> Self {
        AppState {
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            max_sessions: DEFAULT_MAX_SESSIONS,
            policy,
            client,
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    fn open_session(&self) -> Result<FormView, ApiError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let form = FormStateController::new(self.policy);
        let view = FormView::of(id, &form);
        let mut sessions = self.lock()?;
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, session)| session.touched)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            debug!(session = oldest, "evicted idle form session");
        }
        sessions.insert(
            id,
            Session {
                form,
                touched: Instant::now(),
            },
        );
        debug!(session = id, open = sessions.len(), "opened form session");
        Ok(view)
    }

    /// Runs `f` against one session's controller while holding the lock.
    fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut FormStateController) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut sessions = self.lock()?;
        let session = sessions.get_mut(&id).ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("unknown form session: {id}"),
            )
        })?;
        session.touched = Instant::now();
        f(&mut session.form)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, Session>>, ApiError> {
        self.sessions.lock().map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "form sessions poisoned".to_string(),
            )
        })
    }
}

type ApiError = (StatusCode, String);
type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/meta", get(api_meta))
        .route("/api/samples", get(api_samples))
        .route("/api/sessions", post(api_open))
        .route("/api/sessions/:id", get(api_form))
        .route("/api/sessions/:id/field", post(api_field))
        .route("/api/sessions/:id/geo", post(api_geo))
        .route("/api/sessions/:id/submit", post(api_submit))
        .route("/api/sessions/:id/reset", post(api_reset))
        .with_state(Arc::new(state))
}

pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!("Serving on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

fn bad_request(err: FormError) -> ApiError {
    (StatusCode::BAD_REQUEST, err.to_string())
}

#[derive(Debug, Serialize)]
pub struct FormView {
    pub session: SessionId,
    pub record: FeatureRecord,
    pub prediction: Option<f64>,
    pub error: Option<String>,
    pub display: Option<String>,
    pub marker: [f64; 2],
    pub unset: Vec<String>,
}

impl FormView {
    fn of(session: SessionId, form: &FormStateController) -> Self {
        let (lat, lon) = form.marker_position();
        FormView {
            session,
            record: form.record().clone(),
            prediction: form.result().prediction(),
            error: form.result().error().map(str::to_string),
            display: form.result().display(),
            marker: [lat, lon],
            unset: form
                .record()
                .unset_fields()
                .into_iter()
                .map(|f| f.as_str().to_string())
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct FieldMeta {
    name: &'static str,
    label: &'static str,
    min: f64,
    max: f64,
    kind: NumericKind,
}

#[derive(Serialize)]
struct MapMeta {
    center: [f64; 2],
    bounds: [[f64; 2]; 2],
    zoom: u8,
    min_zoom: u8,
    max_zoom: u8,
}

#[derive(Serialize)]
struct MetaView {
    fields: Vec<FieldMeta>,
    ocean_options: Vec<&'static str>,
    map: MapMeta,
    clamp_geo_select: bool,
    require_complete: bool,
}

/// Slider and number boxes post either a string or a JSON number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    Number(f64),
}

#[derive(Deserialize)]
struct FieldEdit {
    field: String,
    #[serde(default)]
    value: Option<RawValue>,
}

#[derive(Deserialize)]
struct GeoEdit {
    lat: f64,
    lon: f64,
    source: Option<GeoSource>,
}

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

async fn api_meta(State(state): State<Arc<AppState>>) -> Json<MetaView> {
    let fields = Field::NUMERIC
        .into_iter()
        .filter_map(|field| {
            field.range().map(|range| FieldMeta {
                name: field.as_str(),
                label: field.label(),
                min: range.min,
                max: range.max,
                kind: range.kind,
            })
        })
        .collect();
    let [(south, west), (north, east)] = MAP_BOUNDS;
    Json(MetaView {
        fields,
        ocean_options: OceanProximity::ALL.iter().map(|o| o.as_str()).collect(),
        map: MapMeta {
            center: [MAP_CENTER.0, MAP_CENTER.1],
            bounds: [[south, west], [north, east]],
            zoom: MAP_ZOOM,
            min_zoom: MAP_MIN_ZOOM,
            max_zoom: MAP_MAX_ZOOM,
        },
        clamp_geo_select: state.policy.clamp_geo_select,
        require_complete: state.policy.require_complete,
    })
}

async fn api_samples() -> Json<&'static [SampleRow]> {
    Json(&SAMPLE_DATA[..])
}

async fn api_open(State(state): State<Arc<AppState>>) -> ApiResult<FormView> {
    state.open_session().map(Json)
}

async fn api_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> ApiResult<FormView> {
    state
        .with_session(id, |form| Ok(FormView::of(id, form)))
        .map(Json)
}

async fn api_field(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(edit): Json<FieldEdit>,
) -> ApiResult<FormView> {
    let field: Field = edit.field.parse().map_err(bad_request)?;
    let raw = match edit.value {
        Some(RawValue::Text(text)) => text,
        Some(RawValue::Number(n)) => n.to_string(),
        None => String::new(),
    };
    state
        .with_session(id, |form| {
            form.dispatch(FormEvent::FieldEdit { field, raw })
                .map_err(bad_request)?;
            Ok(FormView::of(id, form))
        })
        .map(Json)
}

async fn api_geo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(edit): Json<GeoEdit>,
) -> ApiResult<FormView> {
    let event = FormEvent::GeoSelect {
        lat: edit.lat,
        lon: edit.lon,
        source: edit.source.unwrap_or(GeoSource::MapClick),
    };
    state
        .with_session(id, |form| {
            form.dispatch(event).map_err(bad_request)?;
            Ok(FormView::of(id, form))
        })
        .map(Json)
}

async fn api_submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> ApiResult<FormView> {
    // The lock is released while the service call is in flight.
    let request = state.with_session(id, |form| Ok(form.begin_submission()))?;
    let outcome = match request {
        Some(request) => {
            info!(session = id, endpoint = %state.client.endpoint(), "submitting prediction request");
            Some(state.client.predict(&request).await)
        }
        None => None,
    };
    state
        .with_session(id, |form| {
            if let Some(outcome) = outcome {
                form.finish_submission(outcome);
            }
            Ok(FormView::of(id, form))
        })
        .map(Json)
}

async fn api_reset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> ApiResult<FormView> {
    state
        .with_session(id, |form| {
            form.reset();
            Ok(FormView::of(id, form))
        })
        .map(Json)
}
