//! PostgreSQL-backed `ApplicationRepository` implementation using Diesel ORM.
//!
//! Uniqueness of `email`, `number` and `usn` is enforced by table
//! constraints. A unique violation on insert is translated back into the
//! field it protects so the service can answer `Conflict(field)` even when
//! the pre-check lost a race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::DatabaseErrorInformation;
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::domain::ports::{ApplicationRepository, ApplicationRepositoryError};
use crate::domain::{
    Application, ApplicationId, ApplicationSummary, ConflictProbe, NewApplication, StoreLocation,
    StudyYear, UniqueField,
};

use super::models::{ApplicationRow, ApplicationSummaryRow, NewApplicationRow};
use super::pool::{LazyDbPool, PoolError};
use super::schema::applications;

/// Collection name reported alongside the database name.
pub const APPLICATIONS_TABLE: &str = "applications";

const DEFAULT_DATABASE_NAME: &str = "postgres";

/// Diesel-backed implementation of the `ApplicationRepository` port.
///
/// Holds a [`LazyDbPool`], so constructing the repository never touches the
/// network; the first operation builds the pool.
pub struct DieselApplicationRepository {
    pool: LazyDbPool,
    location: StoreLocation,
}

impl DieselApplicationRepository {
    /// Create a repository over a lazily built pool.
    ///
    /// The reported database name is taken from the URL path unless
    /// `database_name` overrides it.
    pub fn new(pool: LazyDbPool, database_name: Option<String>) -> Self {
        let database = database_name
            .unwrap_or_else(|| database_name_from_url(pool.config().database_url()));
        Self {
            pool,
            location: StoreLocation {
                database,
                collection: APPLICATIONS_TABLE.to_owned(),
            },
        }
    }
}

/// Extract the database name from a PostgreSQL connection URL.
pub fn database_name_from_url(database_url: &str) -> String {
    Url::parse(database_url)
        .ok()
        .map(|url| url.path().trim_start_matches('/').to_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_owned())
}

fn map_pool_error(error: PoolError) -> ApplicationRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ApplicationRepositoryError::connection(message)
        }
    }
}

/// Identify the unique key protected by a violated constraint.
fn unique_field_for(info: &dyn DatabaseErrorInformation) -> Option<UniqueField> {
    let field_of = |text: &str| {
        UniqueField::PRIORITY
            .into_iter()
            .find(|field| text.contains(&format!("applications_{}_key", field.as_str())))
    };
    info.constraint_name()
        .and_then(field_of)
        .or_else(|| field_of(info.message()))
        .or_else(|| info.details().and_then(field_of))
}

fn map_diesel_error(error: diesel::result::Error) -> ApplicationRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => ApplicationRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => {
            ApplicationRepositoryError::query("database query error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match unique_field_for(&*info) {
                Some(field) => ApplicationRepositoryError::duplicate(field),
                None => {
                    warn!(
                        constraint_name = ?info.constraint_name(),
                        "unrecognised unique violation on applications"
                    );
                    ApplicationRepositoryError::query("unique constraint violation")
                }
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ApplicationRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => ApplicationRepositoryError::query("database error"),
        _ => ApplicationRepositoryError::query("database error"),
    }
}

fn parse_year(raw: Option<String>) -> Option<StudyYear> {
    let raw = raw?;
    match raw.parse() {
        Ok(year) => Some(year),
        Err(_) => {
            warn!(value = %raw, "unrecognised year value, omitting");
            None
        }
    }
}

fn row_to_application(row: ApplicationRow) -> Application {
    Application::restore(
        ApplicationId::from_uuid(row.id),
        row.name,
        parse_year(row.year),
        row.fact,
        row.number,
        row.usn,
        row.email,
        row.created_at,
    )
}

fn row_to_summary(row: ApplicationSummaryRow) -> ApplicationSummary {
    ApplicationSummary {
        name: row.name,
        email: row.email,
        year: parse_year(row.year),
        created_at: row.created_at,
    }
}

#[async_trait]
impl ApplicationRepository for DieselApplicationRepository {
    async fn find_conflict(
        &self,
        probe: &ConflictProbe,
    ) -> Result<Option<Application>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = applications::table
            .select(ApplicationRow::as_select())
            .filter(applications::email.eq(probe.email.as_str()))
            .or_filter(applications::usn.eq(probe.usn.as_str()))
            .into_boxed::<Pg>();
        if let Some(number) = &probe.number {
            query = query.or_filter(applications::number.eq(number.as_str()));
        }

        // One row per unique key at most.
        let rows: Vec<ApplicationRow> = query
            .limit(3)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(probe.highest_priority_match(rows.into_iter().map(row_to_application)))
    }

    async fn insert(
        &self,
        application: &NewApplication,
        created_at: DateTime<Utc>,
    ) -> Result<ApplicationId, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let id = Uuid::new_v4();
        let row = NewApplicationRow {
            id,
            name: application.name.as_str(),
            year: application.year.map(StudyYear::as_str),
            fact: application.fact.as_deref(),
            number: application.number.as_ref().map(|number| number.as_str()),
            usn: application.usn.as_str(),
            email: application.email.as_str(),
            created_at,
        };

        diesel::insert_into(applications::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(ApplicationId::from_uuid(id))
    }

    async fn list_recent(
        &self,
        limit: usize,
    ) -> Result<Vec<ApplicationSummary>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows: Vec<ApplicationSummaryRow> = applications::table
            .select(ApplicationSummaryRow::as_select())
            .order((applications::created_at.desc(), applications::id.desc()))
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    fn location(&self) -> StoreLocation {
        self.location.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::persistence::PoolConfig;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[derive(Debug)]
    struct ViolationInfo {
        message: &'static str,
        constraint: Option<&'static str>,
    }

    impl DatabaseErrorInformation for ViolationInfo {
        fn message(&self) -> &str {
            self.message
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            Some("applications")
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn unique_violation(message: &'static str, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(ViolationInfo {
                message,
                constraint,
            }),
        )
    }

    #[rstest]
    #[case("applications_email_key", UniqueField::Email)]
    #[case("applications_number_key", UniqueField::Number)]
    #[case("applications_usn_key", UniqueField::Usn)]
    fn unique_violation_names_the_field(#[case] constraint: &'static str, #[case] field: UniqueField) {
        let err = map_diesel_error(unique_violation("duplicate key value", Some(constraint)));
        assert_eq!(err, ApplicationRepositoryError::duplicate(field));
    }

    #[rstest]
    fn unique_violation_falls_back_to_message() {
        let err = map_diesel_error(unique_violation(
            "duplicate key value violates unique constraint \"applications_usn_key\"",
            None,
        ));
        assert_eq!(err, ApplicationRepositoryError::duplicate(UniqueField::Usn));
    }

    #[rstest]
    fn unknown_unique_violation_is_a_query_error() {
        let err = map_diesel_error(unique_violation("duplicate key", Some("applications_pkey")));
        assert!(matches!(err, ApplicationRepositoryError::Query { .. }));
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let err = map_diesel_error(DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        ));
        assert!(matches!(err, ApplicationRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, ApplicationRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    #[case("postgres://user:pw@db:5432/club", "club")]
    #[case("postgres://localhost", "postgres")]
    #[case("not a url", "postgres")]
    fn database_name_is_taken_from_url(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(database_name_from_url(url), expected);
    }

    #[rstest]
    fn location_prefers_explicit_database_name() {
        let pool = LazyDbPool::new(PoolConfig::new("postgres://localhost/club"));
        let repo = DieselApplicationRepository::new(pool, Some("membership".to_owned()));

        assert_eq!(
            repo.location(),
            StoreLocation {
                database: "membership".to_owned(),
                collection: APPLICATIONS_TABLE.to_owned(),
            }
        );
    }

    #[rstest]
    #[case(Some("2nd"), Some(StudyYear::Second))]
    #[case(Some("fifth"), None)]
    #[case(None, None)]
    fn stored_year_labels_are_parsed_leniently(
        #[case] raw: Option<&str>,
        #[case] expected: Option<StudyYear>,
    ) {
        assert_eq!(parse_year(raw.map(str::to_owned)), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn unreachable_database_is_a_connection_error() {
        let pool = LazyDbPool::new(
            PoolConfig::new("not a database url")
                .with_connection_timeout(std::time::Duration::from_millis(200)),
        );
        let repo = DieselApplicationRepository::new(pool, None);

        let err = repo.list_recent(10).await.expect_err("no database");
        assert!(matches!(err, ApplicationRepositoryError::Connection { .. }));
    }
}
