//! Application intake service implementing the [`ApplicationIntake`] port.
//!
//! The flow per submission is validate, pre-check, insert. The pre-check
//! gives a friendly `Conflict(field)` for the common case; the insert is the
//! authoritative check because the store enforces the unique keys itself,
//! so two concurrent submissions with the same email cannot both land.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{ApplicationIntake, ApplicationRepository, ApplicationRepositoryError};
use crate::domain::{
    Application, ApplicationReceipt, ApplicationSubmission, ConflictProbe, Error,
    NewApplication, RecentApplications, UNKNOWN_CONFLICT_FIELD,
};

/// Intake service: the only writer of application records.
#[derive(Clone)]
pub struct ApplicationIntakeService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ApplicationIntakeService<R> {
    /// Create a new service over the given repository and clock.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// use intake_backend::domain::ApplicationIntakeService;
    /// use intake_backend::outbound::memory::InMemoryApplicationRepository;
    ///
    /// let service = ApplicationIntakeService::new(
    ///     Arc::new(InMemoryApplicationRepository::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }
}

impl<R> ApplicationIntakeService<R>
where
    R: ApplicationRepository,
{
    fn map_repository_error(error: ApplicationRepositoryError) -> Error {
        match error {
            ApplicationRepositoryError::Connection { message } => {
                error!(%message, "application store unavailable");
                Error::store_unavailable(format!("application store unavailable: {message}"))
            }
            ApplicationRepositoryError::Query { message } => {
                error!(%message, "application store query failed");
                Error::internal(format!("application store error: {message}"))
            }
            ApplicationRepositoryError::Duplicate { field } => Error::conflict(field.as_str()),
        }
    }

    /// First colliding field of `existing` by priority email > number > usn.
    fn conflicting_field(probe: &ConflictProbe, existing: &Application) -> &'static str {
        probe
            .colliding_fields(existing)
            .first()
            .map_or(UNKNOWN_CONFLICT_FIELD, |field| field.as_str())
    }
}

#[async_trait]
impl<R> ApplicationIntake for ApplicationIntakeService<R>
where
    R: ApplicationRepository,
{
    async fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationReceipt, Error> {
        let application = NewApplication::try_from_submission(&submission).inspect_err(|err| {
            debug!(code = ?err.code(), field = err.field(), "submission rejected by validation");
        })?;
        let probe = application.conflict_probe();

        if let Some(existing) = self
            .repository
            .find_conflict(&probe)
            .await
            .map_err(Self::map_repository_error)?
        {
            let field = Self::conflicting_field(&probe, &existing);
            info!(field, existing_id = %existing.id, "duplicate application rejected");
            return Err(Error::conflict(field));
        }

        let created_at = self.clock.utc();
        match self.repository.insert(&application, created_at).await {
            Ok(id) => {
                info!(%id, "application created");
                Ok(ApplicationReceipt { id })
            }
            Err(ApplicationRepositoryError::Duplicate { field }) => {
                warn!(%field, "store rejected duplicate after pre-check passed");
                Err(Error::conflict(field.as_str()))
            }
            Err(err) => Err(Self::map_repository_error(err)),
        }
    }

    async fn list_recent(&self, limit: usize) -> Result<RecentApplications, Error> {
        let recent = self
            .repository
            .list_recent(limit)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(RecentApplications {
            location: self.repository.location(),
            recent,
        })
    }
}

#[cfg(test)]
#[path = "intake_service_tests.rs"]
mod tests;
