use axum::{
    Json, Router,
    extract::{
        ConnectInfo, FromRequestParts, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use crate::error::LeadError;
use crate::model::{
    AdminUser, ContactInput, RequestMeta, SubmissionPage, SubmissionStats, SubmissionStatus,
    SubmitResponse, WeeklyReport,
};
use crate::rate_limit::RateLimiter;
use crate::service::LeadService;

#[derive(Clone)]
struct ApiState {
    service: Arc<LeadService>,
    report_limiter: Arc<RateLimiter>,
}

/// JSON API for the contact form and its admin views
pub fn router(service: Arc<LeadService>) -> Router {
    let settings = service.settings();
    let report_limiter = Arc::new(RateLimiter::new(
        settings.rate_limit_max,
        Duration::from_secs(settings.rate_limit_window_secs),
    ));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/contact.submit", post(submit))
        .route("/api/contact.getStats", get(get_stats))
        .route("/api/contact.list", get(list))
        .route("/api/contact.updateStatus", post(update_status))
        .route(
            "/api/analytics.generateWeeklyReport",
            post(generate_weekly_report),
        )
        .with_state(ApiState {
            service,
            report_limiter,
        })
}

impl FromRequestParts<ApiState> for RequestMeta {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let trust_forwarded_for = state.service.settings().trust_forwarded_for;

        Ok(RequestMeta {
            user_agent: header_string(&parts.headers, header::USER_AGENT),
            ip: client_ip(parts, trust_forwarded_for).map(|ip| ip.to_string()),
            referer: header_string(&parts.headers, header::REFERER),
        })
    }
}

/// The authenticated operator, if the request carried a valid bearer token
struct Caller(Option<AdminUser>);

impl FromRequestParts<ApiState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);
        Ok(Caller(state.service.authenticate(bearer)))
    }
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Longest `x-forwarded-for` entry worth parsing
const MAX_FORWARDED_LEN: usize = 64;

/// The caller's address: the first `x-forwarded-for` entry when the proxy is
/// trusted and the entry is an IP address, otherwise the socket peer.
fn client_ip(parts: &Parts, trust_forwarded_for: bool) -> Option<IpAddr> {
    trust_forwarded_for
        .then(|| forwarded_for(&parts.headers))
        .flatten()
        .or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
}

/// First entry of `x-forwarded-for`, if it parses as an IP address
fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    let raw = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = raw.split(',').next()?.trim();
    if first.is_empty() || first.len() > MAX_FORWARDED_LEN {
        return None;
    }
    first.parse().ok()
}

impl IntoResponse for LeadError {
    fn into_response(self) -> Response {
        let status = match &self {
            LeadError::Validation { .. } => StatusCode::BAD_REQUEST,
            LeadError::Unauthorized => StatusCode::UNAUTHORIZED,
            LeadError::NotFound(_) => StatusCode::NOT_FOUND,
            LeadError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            LeadError::Store(_) | LeadError::Notify(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal details stay in the log
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": { "code": self.code(), "message": message }
        }));
        let mut response = (status, body).into_response();

        if let LeadError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

type ApiResult<T> = Result<Json<T>, LeadError>;

fn default_stats_days() -> u32 {
    7
}

fn default_list_days() -> u32 {
    30
}

fn default_limit() -> u32 {
    50
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    #[serde(default = "default_stats_days")]
    days: u32,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default = "default_list_days")]
    days: u32,
    #[serde(default = "default_limit")]
    limit: u32,
    #[serde(default)]
    offset: u32,
}

#[derive(Debug, Deserialize)]
struct UpdateStatusBody {
    id: i64,
    status: String,
}

fn bad_body(rejection: JsonRejection) -> LeadError {
    LeadError::validation("body", rejection.body_text())
}

fn bad_query(rejection: QueryRejection) -> LeadError {
    LeadError::validation("query", rejection.body_text())
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn submit(
    State(state): State<ApiState>,
    meta: RequestMeta,
    body: Result<Json<ContactInput>, JsonRejection>,
) -> ApiResult<SubmitResponse> {
    let Json(input) = body.map_err(bad_body)?;
    Ok(Json(state.service.submit(input, &meta).await?))
}

async fn get_stats(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> ApiResult<SubmissionStats> {
    let Query(query) = query.map_err(bad_query)?;
    Ok(Json(
        state.service.get_stats(caller.as_ref(), query.days).await?,
    ))
}

async fn list(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<SubmissionPage> {
    let Query(query) = query.map_err(bad_query)?;
    let page = state
        .service
        .list(caller.as_ref(), query.days, query.limit, query.offset)
        .await?;
    Ok(Json(page))
}

async fn update_status(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    body: Result<Json<UpdateStatusBody>, JsonRejection>,
) -> ApiResult<serde_json::Value> {
    let Json(body) = body.map_err(bad_body)?;
    // Authenticate before the status string is looked at
    let caller = caller.ok_or(LeadError::Unauthorized)?;
    let status: SubmissionStatus = body.status.parse()?;
    state
        .service
        .update_status(Some(&caller), body.id, status)
        .await?;
    Ok(Json(json!({ "success": true })))
}

async fn generate_weekly_report(
    State(state): State<ApiState>,
    meta: RequestMeta,
) -> ApiResult<WeeklyReport> {
    let client = meta.ip.as_deref().unwrap_or("unknown");
    let status = state.report_limiter.check(client).await;
    if status.limited {
        return Err(LeadError::RateLimited {
            retry_after_secs: status.reset_in.as_secs().max(1),
        });
    }
    Ok(Json(state.service.generate_weekly_report().await?))
}
