//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::applications;

/// Full row read back for the duplicate pre-check.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApplicationRow {
    pub id: Uuid,
    pub name: String,
    pub year: Option<String>,
    pub fact: Option<String>,
    pub number: Option<String>,
    pub usn: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Listing projection; sensitive columns are never selected.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApplicationSummaryRow {
    pub name: String,
    pub email: String,
    pub year: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new application records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = applications)]
pub(crate) struct NewApplicationRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub year: Option<&'a str>,
    pub fact: Option<&'a str>,
    pub number: Option<&'a str>,
    pub usn: &'a str,
    pub email: &'a str,
    pub created_at: DateTime<Utc>,
}
