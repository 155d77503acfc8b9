//! Driving port for application intake.
//!
//! Inbound adapters submit raw payloads and read the recent listing through
//! this port without knowing which store sits behind it.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::domain::{
    ApplicationId, ApplicationReceipt, ApplicationSubmission, ApplicationSummary, Error,
    NewApplication, RecentApplications, StoreLocation, StudyYear,
};

/// Listing size used when the caller does not ask for one.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Largest listing a caller may request.
pub const MAX_RECENT_LIMIT: usize = 100;

/// Domain use-case port for accepting and listing applications.
#[async_trait]
pub trait ApplicationIntake: Send + Sync {
    /// Validate, de-duplicate and store one application.
    async fn submit(&self, submission: ApplicationSubmission)
    -> Result<ApplicationReceipt, Error>;

    /// Return the most recently created applications, newest first.
    async fn list_recent(&self, limit: usize) -> Result<RecentApplications, Error>;
}

/// Deterministic intake used by HTTP adapter tests.
///
/// Validates like the real service but never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureApplicationIntake;

const FIXTURE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[async_trait]
impl ApplicationIntake for FixtureApplicationIntake {
    async fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationReceipt, Error> {
        NewApplication::try_from_submission(&submission)?;
        let id = FIXTURE_ID
            .parse()
            .map(ApplicationId::from_uuid)
            .map_err(|err| Error::internal(format!("invalid fixture id: {err}")))?;
        Ok(ApplicationReceipt { id })
    }

    async fn list_recent(&self, limit: usize) -> Result<RecentApplications, Error> {
        let created_at = Utc
            .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .ok_or_else(|| Error::internal("invalid fixture timestamp"))?;
        let recent = vec![ApplicationSummary {
            name: "Ada Lovelace".to_owned(),
            email: "ada@gmail.com".to_owned(),
            year: Some(StudyYear::Second),
            created_at,
        }];
        Ok(RecentApplications {
            location: StoreLocation {
                database: "fixture".to_owned(),
                collection: "applications".to_owned(),
            },
            recent: recent.into_iter().take(limit).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use serde_json::json;

    #[tokio::test]
    async fn fixture_rejects_invalid_submissions() {
        let submission: ApplicationSubmission =
            serde_json::from_value(json!({ "email": "ada@gmail.com" })).expect("payload");
        let err = FixtureApplicationIntake
            .submit(submission)
            .await
            .expect_err("missing name");
        assert_eq!(err.code(), ErrorCode::MissingField);
    }

    #[tokio::test]
    async fn fixture_listing_respects_limit() {
        let listing = FixtureApplicationIntake
            .list_recent(0)
            .await
            .expect("listing");
        assert!(listing.recent.is_empty());
        assert_eq!(listing.location.collection, "applications");
    }
}
