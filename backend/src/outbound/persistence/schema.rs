//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the table, regenerate with `diesel print-schema` or
//! update by hand.

diesel::table! {
    /// Membership applications.
    ///
    /// `email`, `number` and `usn` each carry a unique constraint
    /// (`applications_<column>_key`). A NULL `number` never collides.
    applications (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        name -> Text,
        /// Study-year label (`1st`, `2nd`, `3rd`).
        year -> Nullable<Varchar>,
        fact -> Nullable<Text>,
        number -> Nullable<Varchar>,
        /// Normalised institutional identifier.
        usn -> Varchar,
        email -> Varchar,
        /// Server-assigned submission timestamp.
        created_at -> Timestamptz,
    }
}
