//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic apart from `ErrorCode`; the wrappers
//! here mirror their wire shape for utoipa.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Human-readable message.
    #[schema(example = "Duplicate entry")]
    error: String,
    /// Stable machine-readable error code.
    code: crate::domain::ErrorCode,
    /// Offending or conflicting field, when one applies.
    #[schema(example = "email")]
    field: Option<String>,
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(example = "6f1c2a57-7f0e-4a0b-9a51-0d5b1b7c6e11")]
    trace_id: Option<String>,
    /// Supplementary error details.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::ApplicationSubmission`].
///
/// Must be a JSON object; unknown keys are ignored. `name`, `usn` and
/// `email` are required.
#[derive(ToSchema)]
#[schema(as = crate::domain::ApplicationSubmission)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ApplicationSubmissionSchema {
    #[schema(example = "Ada Lovelace")]
    name: String,
    /// One of `1st`, `2nd`, `3rd`.
    #[schema(example = "2nd")]
    year: Option<String>,
    fact: Option<String>,
    /// Contact number; unique across applications.
    #[schema(example = "9845012345")]
    number: Option<String>,
    /// Institutional identifier; case and spacing are normalised.
    #[schema(example = "1DS22CD017")]
    usn: String,
    /// Must be a gmail.com, x.com or .edu address.
    #[schema(example = "ada@gmail.com")]
    email: String,
}
