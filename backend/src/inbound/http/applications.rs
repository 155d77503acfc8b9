//! Membership application HTTP handlers.
//!
//! ```text
//! POST /api/applications
//! GET  /api/applications?limit=10
//! ```

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT};
use crate::domain::{
    ApplicationReceipt, ApplicationSubmission, ApplicationSummary, Error, RecentApplications,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ApplicationSubmissionSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;

/// Response payload for an accepted application.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResponse {
    /// Always `true` for a created application.
    pub success: bool,
    /// Store-assigned identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
}

impl From<ApplicationReceipt> for SubmissionResponse {
    fn from(value: ApplicationReceipt) -> Self {
        Self {
            success: true,
            id: value.id.to_string(),
        }
    }
}

/// One entry of the recent listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummaryResponse {
    pub name: String,
    pub email: String,
    #[schema(example = "2nd")]
    pub year: Option<String>,
    /// RFC 3339 timestamp assigned by the server.
    pub created_at: String,
}

impl From<ApplicationSummary> for ApplicationSummaryResponse {
    fn from(value: ApplicationSummary) -> Self {
        Self {
            name: value.name,
            email: value.email,
            year: value.year.map(|year| year.to_string()),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Response payload for the recent listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecentApplicationsResponse {
    /// Database the applications were read from.
    pub db: String,
    /// Collection (table) holding applications.
    pub collection: String,
    pub recent: Vec<ApplicationSummaryResponse>,
}

impl From<RecentApplications> for RecentApplicationsResponse {
    fn from(value: RecentApplications) -> Self {
        Self {
            db: value.location.database,
            collection: value.location.collection,
            recent: value.recent.into_iter().map(Into::into).collect(),
        }
    }
}

/// Query parameters for the recent listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct RecentQuery {
    /// Number of applications to return (1-100, default 10).
    #[param(value_type = Option<u32>, example = 10)]
    pub limit: Option<String>,
}

fn parse_limit(raw: Option<&str>) -> Result<usize, Error> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_RECENT_LIMIT);
    };
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|limit| (1..=MAX_RECENT_LIMIT).contains(limit))
        .ok_or_else(|| {
            Error::invalid_format(
                "limit",
                format!("limit must be an integer between 1 and {MAX_RECENT_LIMIT}"),
            )
        })
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected unreadable application payload");
    let message = match &err {
        JsonPayloadError::ContentType => "Request body must be sent as application/json",
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body is too large"
        }
        _ => "Request body must be a JSON object",
    };
    Error::invalid_format("body", message).into()
}

/// JSON extractor configuration mapping body errors onto `invalid_format`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

/// Submit a membership application.
#[utoipa::path(
    post,
    path = "/api/applications",
    description = "Validate, de-duplicate and store one application.",
    request_body = ApplicationSubmissionSchema,
    responses(
        (status = 201, description = "Application created", body = SubmissionResponse),
        (status = 400, description = "Missing or malformed field", body = ErrorSchema),
        (status = 409, description = "Email, number or USN already registered", body = ErrorSchema),
        (status = 500, description = "Store unavailable or internal error", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "submitApplication"
)]
#[post("/applications")]
pub async fn submit_application(
    state: web::Data<HttpState>,
    payload: web::Json<ApplicationSubmission>,
) -> ApiResult<HttpResponse> {
    let receipt = state.intake.submit(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(SubmissionResponse::from(receipt)))
}

/// List the most recent applications.
#[utoipa::path(
    get,
    path = "/api/applications",
    description = "Most recent applications first, without contact numbers or USNs.",
    params(RecentQuery),
    responses(
        (status = 200, description = "Recent applications", body = RecentApplicationsResponse),
        (status = 400, description = "Invalid limit", body = ErrorSchema),
        (status = 500, description = "Store unavailable or internal error", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "listRecentApplications"
)]
#[get("/applications")]
pub async fn list_recent_applications(
    state: web::Data<HttpState>,
    query: web::Query<RecentQuery>,
) -> ApiResult<HttpResponse> {
    let limit = parse_limit(query.limit.as_deref())?;
    let recent = state.intake.list_recent(limit).await?;
    Ok(HttpResponse::Ok().json(RecentApplicationsResponse::from(recent)))
}

#[cfg(test)]
#[path = "applications_tests.rs"]
mod tests;
