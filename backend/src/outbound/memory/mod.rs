//! In-process application store.
//!
//! Backs the service when no database is configured and drives integration
//! tests. It enforces the same three unique keys as the PostgreSQL indexes:
//! the check and the append happen under one lock, so the insert is the
//! authoritative rejection exactly as with the real store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{ApplicationRepository, ApplicationRepositoryError};
use crate::domain::{
    Application, ApplicationId, ApplicationSummary, ConflictProbe, NewApplication, StoreLocation,
};

const MEMORY_DATABASE: &str = "memory";
const APPLICATIONS_COLLECTION: &str = "applications";

/// Mutex-guarded, append-only application store.
#[derive(Debug, Default)]
pub struct InMemoryApplicationRepository {
    records: Mutex<Vec<Application>>,
    unavailable: AtomicBool,
}

impl InMemoryApplicationRepository {
    /// Simulate the store becoming unreachable (or reachable again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    /// Number of stored applications.
    pub fn len(&self) -> Result<usize, ApplicationRepositoryError> {
        Ok(self.lock()?.len())
    }

    /// Whether the store holds no applications.
    pub fn is_empty(&self) -> Result<bool, ApplicationRepositoryError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Application>>, ApplicationRepositoryError> {
        if self.unavailable.load(Ordering::Acquire) {
            return Err(ApplicationRepositoryError::connection(
                "in-memory store marked unavailable",
            ));
        }
        self.records
            .lock()
            .map_err(|_| ApplicationRepositoryError::query("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn find_conflict(
        &self,
        probe: &ConflictProbe,
    ) -> Result<Option<Application>, ApplicationRepositoryError> {
        let records = self.lock()?;
        Ok(probe.highest_priority_match(
            records.iter().filter(|record| probe.matches(record)).cloned(),
        ))
    }

    async fn insert(
        &self,
        application: &NewApplication,
        created_at: DateTime<Utc>,
    ) -> Result<ApplicationId, ApplicationRepositoryError> {
        let mut records = self.lock()?;
        let probe = application.conflict_probe();
        // Any record colliding on any key blocks the write, mirroring one
        // unique index per field.
        let blocking = probe.highest_priority_match(
            records.iter().filter(|record| probe.matches(record)).cloned(),
        );
        if let Some(field) = blocking.and_then(|record| probe.colliding_fields(&record).first().copied()) {
            return Err(ApplicationRepositoryError::duplicate(field));
        }
        let id = ApplicationId::random();
        records.push(Application::from_new(id, application.clone(), created_at));
        Ok(id)
    }

    async fn list_recent(
        &self,
        limit: usize,
    ) -> Result<Vec<ApplicationSummary>, ApplicationRepositoryError> {
        let records = self.lock()?;
        let mut newest_first: Vec<&Application> = records.iter().collect();
        // Stable sort keeps insertion order for equal timestamps; reverse it
        // so the later insert wins ties.
        newest_first.reverse();
        newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(newest_first
            .into_iter()
            .take(limit)
            .map(Application::summary)
            .collect())
    }

    fn location(&self) -> StoreLocation {
        StoreLocation {
            database: MEMORY_DATABASE.to_owned(),
            collection: APPLICATIONS_COLLECTION.to_owned(),
        }
    }
}
