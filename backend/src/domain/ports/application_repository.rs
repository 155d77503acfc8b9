//! Driven port for application storage.
//!
//! The store is the authoritative enforcer of the three uniqueness
//! constraints (email, number, usn). Adapters must reject an insert that
//! would violate any of them with [`ApplicationRepositoryError::Duplicate`],
//! naming the violated field. The service-level pre-check in
//! [`ApplicationRepository::find_conflict`] only exists to produce a friendly
//! answer before attempting the write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Application, ApplicationId, ApplicationSummary, ConflictProbe, NewApplication, StoreLocation,
    UniqueField,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by application repository adapters.
    pub enum ApplicationRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "application store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "application store query failed: {message}",
        /// The store refused an insert because a unique key is taken.
        Duplicate { field: UniqueField } =>
            "application store rejected duplicate {field}",
    }
}

/// Port for append-only application storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Return the stored record colliding on the highest-priority key, if any.
    ///
    /// When different records hold the email and the number, the email
    /// holder is returned. See [`ConflictProbe::highest_priority_match`].
    async fn find_conflict(
        &self,
        probe: &ConflictProbe,
    ) -> Result<Option<Application>, ApplicationRepositoryError>;

    /// Insert a validated application and return the store-assigned id.
    async fn insert(
        &self,
        application: &NewApplication,
        created_at: DateTime<Utc>,
    ) -> Result<ApplicationId, ApplicationRepositoryError>;

    /// Most recent applications first, truncated to `limit`.
    async fn list_recent(
        &self,
        limit: usize,
    ) -> Result<Vec<ApplicationSummary>, ApplicationRepositoryError>;

    /// Database and collection the adapter writes to.
    fn location(&self) -> StoreLocation;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn duplicate_error_names_the_field() {
        let error = ApplicationRepositoryError::duplicate(UniqueField::Number);
        assert_eq!(
            error.to_string(),
            "application store rejected duplicate number"
        );
    }

    #[rstest]
    fn connection_error_keeps_message() {
        let error = ApplicationRepositoryError::connection("refused");
        assert!(matches!(
            error,
            ApplicationRepositoryError::Connection { ref message } if message == "refused"
        ));
    }
}
