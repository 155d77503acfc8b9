//! Builders for the HTTP state and the repository behind it.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use intake_backend::domain::ApplicationIntakeService;
use intake_backend::domain::ports::{ApplicationIntake, ApplicationRepository};
use intake_backend::inbound::http::state::HttpState;
use intake_backend::outbound::memory::InMemoryApplicationRepository;
use intake_backend::outbound::persistence::{
    DieselApplicationRepository, LazyDbPool, run_pending_migrations,
};

use super::ServerConfig;
use super::config::DatabaseConfig;

async fn build_postgres_intake(
    database: &DatabaseConfig,
) -> std::io::Result<Arc<dyn ApplicationIntake>> {
    if database.run_migrations {
        run_pending_migrations(database.pool.database_url())
            .await
            .map_err(|err| std::io::Error::other(err.to_string()))?;
    }
    let repository = DieselApplicationRepository::new(
        LazyDbPool::new(database.pool.clone()),
        database.database_name.clone(),
    );
    let location = repository.location();
    info!(
        database = %location.database,
        collection = %location.collection,
        "using PostgreSQL application store"
    );
    Ok(Arc::new(ApplicationIntakeService::new(
        Arc::new(repository),
        Arc::new(DefaultClock),
    )))
}

fn build_memory_intake() -> Arc<dyn ApplicationIntake> {
    warn!("no database URL configured; applications are kept in memory only");
    Arc::new(ApplicationIntakeService::new(
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(DefaultClock),
    ))
}

/// Build the HTTP state, selecting the store from configuration.
///
/// # Errors
/// Returns [`std::io::Error`] when startup migrations fail.
pub(crate) async fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let intake = match &config.database {
        Some(database) => build_postgres_intake(database).await?,
        None => build_memory_intake(),
    };
    Ok(HttpState::new(intake))
}
