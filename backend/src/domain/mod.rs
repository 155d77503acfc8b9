//! Domain primitives, services and ports.
//!
//! Purpose: keep intake rules (validation, normalisation, uniqueness policy)
//! independent of HTTP and of the store. Adapters depend on this module, never
//! the other way round.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failures.
//! - `validation`: pure field checks (USN pattern, email domain policy).
//! - `Application` and friends: the record model and its projections.
//! - `ApplicationIntakeService`: the driving-port implementation.
//! - `ports`: driving and driven trait boundaries.

pub mod application;
pub mod error;
mod intake_service;
pub mod ports;
pub mod trace_id;
pub mod validation;

pub use self::application::{
    ApplicantName, Application, ApplicationId, ApplicationReceipt, ApplicationSubmission,
    ApplicationSummary, ConflictProbe, EmailAddress, NewApplication, ParseStudyYearError,
    PhoneNumber, RecentApplications, StoreLocation, StudyYear, UNKNOWN_CONFLICT_FIELD,
    UniqueField, Usn,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::intake_service::ApplicationIntakeService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
