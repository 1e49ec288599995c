//! Request dispatch
//!
//! Path segments are validated against the schema registry and operator
//! table before any store call. Store calls run on the blocking pool.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{OriginalUri, Path, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::errors::{ApiError, ApiResult};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::query::{Operator, PredicateBuilder, QueryError, QueryResult};
use crate::schema::CREATE_TABLE_SQL;
use crate::store::{AddPayload, RecordStore, StoreError, StoreResult};

const ISS_EXAMPLE: [&str; 3] = [
    "ISS (ZARYA)",
    "1 25544U 98067A   19128.56248153  .00016717  00000-0  10270-3 0  9002",
    "2 25544  51.6390 198.1271 0001239 315.7000  44.4052 15.52641749  9097",
];

// ==================
// Shared State
// ==================

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    /// Whether `/add` and `/delete` are served
    pub writable: bool,
}

impl AppState {
    pub fn new(store: Arc<RecordStore>, writable: bool) -> Self {
        Self { store, writable }
    }

    fn require_writable(&self) -> ApiResult<()> {
        if self.writable {
            Ok(())
        } else {
            Err(ApiError::NotWritable)
        }
    }
}

/// Runs a store call on the blocking pool
async fn blocking<T, F>(store: &Arc<RecordStore>, f: F) -> ApiResult<T>
where
    F: FnOnce(&RecordStore) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .map_err(ApiError::from)
}

pub fn tle_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_routes))
        .route("/help", get(list_routes))
        .route("/list", get(list_routes))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/columns", get(columns))
        .route("/count", get(count))
        .route("/schema", get(schema))
        .route("/range", get(range_all))
        .route("/range/:column", get(range_column))
        .route("/search/:column/:op/*values", get(search))
        .route("/add", get(add_help).post(add_standard))
        .route("/add/classified", get(add_help).post(add_classified))
        .route("/delete/:catalog/:id", delete(delete_record))
        .fallback(no_route)
        .with_state(state)
}

// ==================
// Route Index
// ==================

#[derive(Debug, Serialize)]
pub struct RouteInfo {
    pub path: &'static str,
    pub methods: &'static str,
    pub help: String,
}

fn route_table() -> Vec<(RouteInfo, bool)> {
    let ops = Operator::tokens().join(", ");
    let route = |path, methods, help: &str, mutating| {
        (
            RouteInfo {
                path,
                methods,
                help: help.to_string(),
            },
            mutating,
        )
    };

    vec![
        route("/", "GET", "list the routes served", false),
        route("/add", "POST", "POST a 3-element JSON list [name, line1, line2]; 403 if not writable, 409 if the norad or international designator already exists", true),
        route("/add/classified", "POST", "as /add, also accepting [line1, line2]; the record is flagged classified", true),
        route("/columns", "GET", "list the searchable columns", false),
        route("/count", "GET", "number of records present", false),
        route("/delete/<catalog>/<id>", "DELETE", "delete by intldes or norad_catalog; 403 if not writable, 410 if no such record", true),
        route("/health", "GET", "liveness check", false),
        route("/help", "GET", "list the routes served", false),
        route("/list", "GET", "list the routes served", false),
        route("/metrics", "GET", "request and store counters", false),
        route("/range", "GET", "minimum and maximum of every searchable column", false),
        route("/range/<column>", "GET", "minimum and maximum of one column", false),
        route("/schema", "GET", "table DDL and column types", false),
        (
            RouteInfo {
                path: "/search/<column>/<op>/<v1>[/<v2>...]",
                methods: "GET",
                help: format!(
                    "compare <column> using <op>; operators are {}; the n-prefixed forms are negated, in/nin take one or more values",
                    ops
                ),
            },
            false,
        ),
    ]
}

async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteInfo>> {
    let routes = route_table()
        .into_iter()
        .filter(|(_, mutating)| state.writable || !mutating)
        .map(|(info, _)| info)
        .collect();
    Json(routes)
}

async fn no_route(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}

// ==================
// Service Routes
// ==================

async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.metrics().snapshot())
}

// ==================
// Read Routes
// ==================

async fn columns(State(state): State<AppState>) -> Json<Vec<&'static str>> {
    Json(state.store.registry().columns().to_vec())
}

async fn count(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let n = blocking(&state.store, |store| store.count()).await?;
    Ok(Json(json!({ "count": n })))
}

async fn schema(State(state): State<AppState>) -> Json<Value> {
    let columns: Map<String, Value> = state
        .store
        .registry()
        .describe()
        .into_iter()
        .map(|(name, ty)| (name.to_string(), Value::from(ty.type_name())))
        .collect();
    Json(json!({
        "sql": CREATE_TABLE_SQL,
        "columns": columns,
    }))
}

async fn range_all(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let ranges = blocking(&state.store, |store| store.range(None)).await?;
    Ok(Json(json!(ranges)))
}

async fn range_column(
    State(state): State<AppState>,
    Path(column): Path<String>,
) -> ApiResult<Json<Value>> {
    if state.store.registry().rangeable_column(&column).is_none() {
        return Err(ApiError::NotFound(format!("no rangeable column '{}'", column)));
    }
    let ranges = blocking(&state.store, move |store| store.range(Some(column.as_str()))).await?;
    Ok(Json(json!(ranges)))
}

async fn search(
    State(state): State<AppState>,
    Path((column, op, _)): Path<(String, String, String)>,
    uri: Uri,
) -> ApiResult<Json<Value>> {
    let predicate = match search_args(uri.path()).and_then(|args| {
        PredicateBuilder::new(state.store.registry()).build(&column, &op, &args)
    }) {
        Ok(predicate) => predicate,
        Err(err) => {
            state.store.metrics().increment_queries_rejected();
            log_event_with_fields(
                Event::QueryRejected,
                &[("code", err.code()), ("reason", &err.to_string())],
            );
            return Err(err.into());
        }
    };

    let records = blocking(&state.store, move |store| store.search(&predicate)).await?;
    let rows = records.len().to_string();
    Logger::trace(
        Event::QueryExecuted.as_str(),
        &[("column", &column), ("op", &op), ("rows", &rows)],
    );
    Ok(Json(json!({ "result": records })))
}

// ==================
// Mutation Routes
// ==================

async fn add_help(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state.require_writable()?;
    Ok((
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": "Method Not Allowed",
            "code": StatusCode::METHOD_NOT_ALLOWED.as_u16(),
            "help": "POST a TLE as a 3-element JSON list",
            "tle_example": ISS_EXAMPLE,
        })),
    ))
}

async fn add_standard(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    add_record(state, &headers, &body, false).await
}

async fn add_classified(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    add_record(state, &headers, &body, true).await
}

async fn add_record(
    state: AppState,
    headers: &HeaderMap,
    body: &[u8],
    classified: bool,
) -> ApiResult<impl IntoResponse> {
    state.require_writable()?;
    if !is_json(headers) {
        return Err(ApiError::NotAcceptable);
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|err| StoreError::MalformedPayload(format!("invalid JSON: {}", err)))?;
    let payload = AddPayload::parse(&value, classified)?;

    let record = blocking(&state.store, move |store| store.add(&payload)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn delete_record(
    State(state): State<AppState>,
    Path((catalog, id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    state.require_writable()?;

    let (catalog_out, id_out) = (catalog.clone(), id.clone());
    blocking(&state.store, move |store| store.delete(&catalog, &id)).await?;
    Ok(Json(json!({
        "status": "ok",
        "catalog": catalog_out,
        "id": id_out,
    })))
}

/// Values of a raw `/search/<column>/<op>/<v1>[/<v2>...]` path.
///
/// Segments are split before decoding, so `%2F` stays inside its value and
/// `a//b` carries an empty value. A single trailing slash is ignored.
fn search_args(path: &str) -> QueryResult<Vec<String>> {
    let mut segments: Vec<&str> = path.split('/').skip(4).collect();
    if segments.len() > 1 && segments.last() == Some(&"") {
        segments.pop();
    }
    segments.into_iter().map(decode_segment).collect()
}

fn decode_segment(raw: &str) -> QueryResult<String> {
    let invalid = || QueryError::InvalidEncoding(raw.to_string());
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3).ok_or_else(invalid)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return Err(invalid());
            }
            let text = std::str::from_utf8(hex).map_err(|_| invalid())?;
            out.push(u8::from_str_radix(text, 16).map_err(|_| invalid())?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| invalid())
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}
