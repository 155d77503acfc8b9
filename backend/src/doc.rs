//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the application and health endpoints together with
//! the wire schemas from the inbound layer. Swagger UI serves it in debug
//! builds.

use utoipa::OpenApi;

use crate::domain::ErrorCode;
use crate::inbound::http::applications::{
    ApplicationSummaryResponse, RecentApplicationsResponse, SubmissionResponse,
};
use crate::inbound::http::schemas::{ApplicationSubmissionSchema, ErrorSchema};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Club application intake API",
        description = "Accepts membership applications and lists recent ones."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::applications::submit_application,
        crate::inbound::http::applications::list_recent_applications,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ApplicationSubmissionSchema,
        SubmissionResponse,
        RecentApplicationsResponse,
        ApplicationSummaryResponse,
        ErrorSchema,
        ErrorCode,
    )),
    tags(
        (name = "applications", description = "Membership application intake"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
