//! The request pipeline and HTTP surface.
//!
//! Per request: measurement begins, the composite limiter decides
//! admission under a one-second deadline, the payload is validated, the
//! cache is probed, and misses are computed as a bounded batch on the
//! worker pool under a two-second deadline. Fully populated results are
//! promoted into the cache; partial results are returned but never
//! cached.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::error_handling::HandleErrorLayer;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Router};
use http::{HeaderValue, StatusCode, header};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tracing::info;

use roster_cache::{CacheConfig, ShardedCache};
use roster_limit::{CompositeLimiter, RateLimiter, SlidingWindow, TokenBucket};

use crate::config::ServerConfig;
use crate::dashboard;
use crate::error::ApiError;
use crate::generator::NameGenerator;
use crate::metrics::{MetricsCollector, RequestOutcome};

/// Admission must resolve within this bound.
const ADMISSION_DEADLINE: Duration = Duration::from_secs(1);

/// Cache-miss compute must resolve within this bound.
const COMPUTE_DEADLINE: Duration = Duration::from_secs(2);

/// Cached artifact type: one produced name list, shared without copying.
pub type NameList = Arc<Vec<String>>;

/// Process-wide components shared by all concurrent requests.
#[derive(Clone)]
pub struct AppState {
    pub metrics: MetricsCollector,
    pub cache: Arc<ShardedCache<NameList>>,
    pub generator: Arc<NameGenerator>,
    pub limiter: Arc<CompositeLimiter>,
}

/// Request-scoped cancellation handle, installed by the admission layer
/// and honored by every downstream suspension.
#[derive(Clone)]
pub struct RequestScope(pub CancellationToken);

#[derive(Debug, Deserialize)]
struct GeneratePayload {
    #[serde(default)]
    session_id: String,
    #[serde(default)]
    letter: String,
    #[serde(default)]
    num_of_entries: i64,
}

#[derive(Debug, Serialize)]
struct GenerateResponse<'a> {
    session_id: &'a str,
    names: &'a [String],
    num_of_entries: usize,
}

/// Build every shared component from configuration.
///
/// Must run inside a tokio runtime: the cache sweeper, metrics sampler,
/// and pool workers are spawned here.
pub fn build_state(config: &ServerConfig) -> AppState {
    let metrics = MetricsCollector::new(config.max_concurrent_requests);

    let cache = Arc::new(ShardedCache::new(CacheConfig {
        total_capacity: config.cache_size,
        num_shards: config.cache_shards,
        default_ttl: config.cache_expiration,
        cleanup_interval: config.cache_cleanup_interval(),
    }));

    let token_bucket: Arc<dyn RateLimiter> = Arc::new(TokenBucket::new(
        config.request_rate_limit,
        config.burst_capacity(),
    ));
    let sliding_window: Arc<dyn RateLimiter> = Arc::new(SlidingWindow::new(
        config.window_max_requests(),
        Duration::from_secs(1),
    ));
    let limiter = Arc::new(CompositeLimiter::new(vec![token_bucket, sliding_window]));

    let generator = Arc::new(NameGenerator::new(config.generator_workers));

    AppState {
        metrics,
        cache,
        generator,
        limiter,
    }
}

/// Assemble the router with its middleware chain: request timeout around
/// measurement around admission around the routes.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .route("/stats", get(stats_page))
        .route("/stats/data", get(stats_data))
        .layer(middleware::from_fn_with_state(state.clone(), admission))
        .layer(middleware::from_fn_with_state(state.clone(), measure))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(request_timed_out))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

async fn request_timed_out(_err: BoxError) -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

/// Outermost middleware: one ticket per request, completed from the final
/// status. The ticket also backs the access log.
async fn measure(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let ticket = state.metrics.record_request();

    let response = next.run(req).await;

    let status = response.status();
    let latency = ticket.elapsed();
    let outcome = if status.is_success() {
        RequestOutcome::Success
    } else {
        RequestOutcome::Failure
    };
    ticket.complete(outcome);
    info!(
        %method,
        %path,
        status = status.as_u16(),
        latency_us = latency.as_micros() as u64,
        "request completed"
    );
    response
}

/// Admission middleware: the composite limiter decides under a bounded
/// deadline; rejections advertise a retry-after hint.
async fn admission(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let scope = RequestScope(CancellationToken::new());
    let admit = deadline_token(&scope.0, ADMISSION_DEADLINE);
    let admitted = state.limiter.allow(&admit).await;
    // Retire the deadline watcher as soon as the decision is in.
    admit.cancel();

    if !admitted {
        info!(path = %req.uri().path(), "rate limit exceeded, rejecting request");
        return ApiError::RateLimited.into_response();
    }

    req.extensions_mut().insert(scope);
    next.run(req).await
}

async fn generate(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: GeneratePayload = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("invalid request body"))?;

    if payload.session_id.is_empty() {
        return Err(ApiError::BadRequest("session id is required"));
    }
    let count = payload.num_of_entries.clamp(1, 100) as usize;

    let cache_key = format!("{}:{}", payload.letter, count);
    if let Some(names) = state.cache.get(&cache_key) {
        return json_response(&payload.session_id, &names);
    }

    let compute = deadline_token(&scope.0, COMPUTE_DEADLINE);
    let generated = state
        .generator
        .generate(&compute, &payload.letter, count)
        .await;
    compute.cancel();

    let names: NameList = Arc::new(generated.names);
    if generated.complete {
        state.cache.set(cache_key, Arc::clone(&names));
    }
    json_response(&payload.session_id, &names)
}

fn json_response(session_id: &str, names: &[String]) -> Result<Response, ApiError> {
    let body = serde_json::to_vec(&GenerateResponse {
        session_id,
        names,
        num_of_entries: names.len(),
    })
    .map_err(|_| ApiError::Encoding)?;

    let mut response = Response::new(Body::from(body));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Ok(response)
}

async fn stats_page(State(state): State<AppState>) -> Response {
    state.metrics.refresh_resources();
    let snapshot = state.metrics.snapshot();
    html_response(dashboard::render_page(&snapshot))
}

async fn stats_data(State(state): State<AppState>) -> Response {
    state.metrics.refresh_resources();
    let snapshot = state.metrics.snapshot();
    html_response(dashboard::render_fragment(&snapshot))
}

fn html_response(body: String) -> Response {
    (
        [
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache, no-store, must-revalidate"),
            ),
            (header::PRAGMA, HeaderValue::from_static("no-cache")),
            (header::EXPIRES, HeaderValue::from_static("0")),
        ],
        Html(body),
    )
        .into_response()
}

/// Derive a child handle that is cancelled either with its parent or when
/// `deadline` elapses, whichever comes first.
///
/// Callers must cancel the returned token once the guarded operation
/// completes; that retires the watcher task instead of letting it sleep
/// out the remaining deadline.
fn deadline_token(parent: &CancellationToken, deadline: Duration) -> CancellationToken {
    let token = parent.child_token();
    let timer = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(deadline) => timer.cancel(),
            _ = timer.cancelled() => {}
        }
    });
    token
}
