//! Membership application data model.
//!
//! Raw submissions arrive as [`ApplicationSubmission`], a bag of untyped JSON
//! fields. [`NewApplication::try_from_submission`] turns one into validated
//! newtypes; only then may it reach a repository. Stored records are
//! [`Application`]; the public listing sees the narrower
//! [`ApplicationSummary`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::validation::{
    FieldValue, USN_FORMAT_HINT, classify_field, has_email_shape, is_valid_email_domain,
    is_valid_usn, normalize_usn,
};

/// Store-assigned application identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(Uuid);

impl ApplicationId {
    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Fields that carry a uniqueness constraint, in conflict-reporting priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniqueField {
    Email,
    Number,
    Usn,
}

impl UniqueField {
    /// Priority order used when one record matches on several fields.
    pub const PRIORITY: [Self; 3] = [Self::Email, Self::Number, Self::Usn];

    /// Wire name of the field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Number => "number",
            Self::Usn => "usn",
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field reported when a conflicting record matches none of the unique keys.
pub const UNKNOWN_CONFLICT_FIELD: &str = "unknown";

/// Study-year label chosen on the application form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudyYear {
    #[serde(rename = "1st")]
    First,
    #[serde(rename = "2nd")]
    Second,
    #[serde(rename = "3rd")]
    Third,
}

impl StudyYear {
    /// Wire label of the year.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "1st",
            Self::Second => "2nd",
            Self::Third => "3rd",
        }
    }
}

impl fmt::Display for StudyYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown study-year label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("year must be one of 1st, 2nd, 3rd")]
pub struct ParseStudyYearError;

impl FromStr for StudyYear {
    type Err = ParseStudyYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1st" => Ok(Self::First),
            "2nd" => Ok(Self::Second),
            "3rd" => Ok(Self::Third),
            _ => Err(ParseStudyYearError),
        }
    }
}

macro_rules! text_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Borrow the inner text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

text_newtype!(
    /// Applicant's name; never empty.
    ApplicantName
);
text_newtype!(
    /// Contact phone number, kept as opaque text.
    PhoneNumber
);
text_newtype!(
    /// Institutional identifier, always normalised and pattern-checked.
    Usn
);
text_newtype!(
    /// Applicant email at an allowed domain.
    EmailAddress
);

impl Usn {
    /// Normalise and validate a raw USN.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let normalized = normalize_usn(raw);
        if is_valid_usn(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(Self::format_error())
        }
    }

    fn format_error() -> Error {
        Error::invalid_format(
            "usn",
            format!("USN must be in format {USN_FORMAT_HINT} (X = digits)"),
        )
    }
}

impl EmailAddress {
    /// Validate shape and domain policy.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        if !has_email_shape(raw) {
            return Err(Error::invalid_format(
                "email",
                "Please provide a valid email address",
            ));
        }
        if !is_valid_email_domain(raw) {
            return Err(Error::invalid_format(
                "email",
                "Email must be a gmail.com, x.com or .edu address",
            ));
        }
        Ok(Self(raw.to_owned()))
    }
}

/// Untrusted submission as received from a client.
///
/// Only a JSON object is accepted; its six known keys are read and anything
/// else is dropped. Values stay as raw JSON so the service can distinguish
/// missing fields from malformed ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplicationSubmission {
    pub name: Option<Value>,
    pub year: Option<Value>,
    pub fact: Option<Value>,
    pub number: Option<Value>,
    pub usn: Option<Value>,
    pub email: Option<Value>,
}

impl<'de> Deserialize<'de> for ApplicationSubmission {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Arrays and scalars fail here instead of binding positionally.
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self {
            name: fields.remove("name"),
            year: fields.remove("year"),
            fact: fields.remove("fact"),
            number: fields.remove("number"),
            usn: fields.remove("usn"),
            email: fields.remove("email"),
        })
    }
}

/// A validated application ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub name: ApplicantName,
    pub year: Option<StudyYear>,
    pub fact: Option<String>,
    pub number: Option<PhoneNumber>,
    pub usn: Usn,
    pub email: EmailAddress,
}

fn not_text(field: &str) -> Error {
    Error::invalid_format(field, format!("{field} must be a string"))
}

fn required_text(raw: Option<&Value>, field: &str) -> Result<String, Error> {
    match classify_field(raw) {
        FieldValue::Text(text) => Ok(text),
        FieldValue::Missing => Err(Error::missing_field(field)),
        FieldValue::NotText => Err(not_text(field)),
    }
}

/// Like [`required_text`] but hands back the string exactly as submitted.
fn required_verbatim<'a>(raw: Option<&'a Value>, field: &str) -> Result<&'a str, Error> {
    match (classify_field(raw), raw) {
        (FieldValue::Text(_), Some(Value::String(text))) => Ok(text.as_str()),
        (FieldValue::NotText, _) => Err(not_text(field)),
        _ => Err(Error::missing_field(field)),
    }
}

fn optional_text(raw: Option<&Value>, field: &str) -> Result<Option<String>, Error> {
    match classify_field(raw) {
        FieldValue::Text(text) => Ok(Some(text)),
        FieldValue::Missing => Ok(None),
        FieldValue::NotText => Err(not_text(field)),
    }
}

impl NewApplication {
    /// Validate and normalise a raw submission.
    ///
    /// Required-field checks run first (`name`, then `email`) so a payload
    /// missing both reports `MissingField` rather than a format problem. The
    /// email is checked as submitted, surrounding whitespace included. A
    /// missing or non-string `usn` fails the USN format check.
    ///
    /// # Examples
    /// ```
    /// use intake_backend::domain::{ApplicationSubmission, NewApplication};
    /// use serde_json::json;
    ///
    /// let submission: ApplicationSubmission = serde_json::from_value(json!({
    ///     "name": "Ada",
    ///     "email": "ada@gmail.com",
    ///     "usn": "1ds21cd042",
    /// }))
    /// .expect("valid payload");
    /// let application = NewApplication::try_from_submission(&submission).expect("valid");
    /// assert_eq!(application.usn.as_str(), "1DS21CD042");
    /// ```
    pub fn try_from_submission(submission: &ApplicationSubmission) -> Result<Self, Error> {
        let name = required_text(submission.name.as_ref(), "name")?;
        let email = required_verbatim(submission.email.as_ref(), "email")?;

        let email = EmailAddress::parse(email)?;
        let usn = match submission.usn.as_ref() {
            Some(Value::String(raw)) => Usn::parse(raw)?,
            _ => return Err(Usn::format_error()),
        };
        let number = optional_text(submission.number.as_ref(), "number")?.map(PhoneNumber);
        let year = optional_text(submission.year.as_ref(), "year")?
            .map(|raw| {
                raw.parse::<StudyYear>()
                    .map_err(|err| Error::invalid_format("year", err.to_string()))
            })
            .transpose()?;
        let fact = optional_text(submission.fact.as_ref(), "fact")?;

        Ok(Self {
            name: ApplicantName(name),
            year,
            fact,
            number,
            usn,
            email,
        })
    }

    /// Lookup keys used for the duplicate pre-check.
    #[must_use]
    pub fn conflict_probe(&self) -> ConflictProbe {
        ConflictProbe {
            email: self.email.clone(),
            number: self.number.clone(),
            usn: self.usn.clone(),
        }
    }
}

/// Disjunctive filter over the three unique keys.
///
/// An absent `number` does not participate in the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictProbe {
    pub email: EmailAddress,
    pub number: Option<PhoneNumber>,
    pub usn: Usn,
}

impl ConflictProbe {
    /// Fields of `existing` that collide with this probe, in priority order.
    #[must_use]
    pub fn colliding_fields(&self, existing: &Application) -> Vec<UniqueField> {
        UniqueField::PRIORITY
            .into_iter()
            .filter(|field| match field {
                UniqueField::Email => existing.email == self.email,
                UniqueField::Number => {
                    self.number.is_some() && existing.number == self.number
                }
                UniqueField::Usn => existing.usn == self.usn,
            })
            .collect()
    }

    /// Whether `existing` collides on any unique key.
    #[must_use]
    pub fn matches(&self, existing: &Application) -> bool {
        !self.colliding_fields(existing).is_empty()
    }

    /// Pick the candidate colliding on the highest-priority key.
    ///
    /// Each key is unique in the store, so at most three records can match;
    /// when they are different records the one holding the email wins, then
    /// the number, then the usn.
    #[must_use]
    pub fn highest_priority_match(
        &self,
        candidates: impl IntoIterator<Item = Application>,
    ) -> Option<Application> {
        candidates
            .into_iter()
            .filter_map(|candidate| {
                let strongest = *self.colliding_fields(&candidate).first()?;
                let rank = UniqueField::PRIORITY
                    .iter()
                    .position(|field| *field == strongest)?;
                Some((rank, candidate))
            })
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, candidate)| candidate)
    }
}

/// A stored application record. Append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: ApplicationId,
    pub name: ApplicantName,
    pub year: Option<StudyYear>,
    pub fact: Option<String>,
    pub number: Option<PhoneNumber>,
    pub usn: Usn,
    pub email: EmailAddress,
    pub created_at: DateTime<Utc>,
}

impl Application {
    /// Materialise a stored record from a validated application.
    #[must_use]
    pub fn from_new(id: ApplicationId, new: NewApplication, created_at: DateTime<Utc>) -> Self {
        let NewApplication {
            name,
            year,
            fact,
            number,
            usn,
            email,
        } = new;
        Self {
            id,
            name,
            year,
            fact,
            number,
            usn,
            email,
            created_at,
        }
    }

    /// Restore a record read back from storage without re-validating.
    ///
    /// Storage only ever receives validated values; adapters use this to
    /// rebuild the domain type from their row representation.
    #[expect(clippy::too_many_arguments, reason = "mirrors the stored row")]
    #[must_use]
    pub fn restore(
        id: ApplicationId,
        name: String,
        year: Option<StudyYear>,
        fact: Option<String>,
        number: Option<String>,
        usn: String,
        email: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: ApplicantName(name),
            year,
            fact,
            number: number.map(PhoneNumber),
            usn: Usn(usn),
            email: EmailAddress(email),
            created_at,
        }
    }

    /// Privacy-preserving projection for the recent listing.
    #[must_use]
    pub fn summary(&self) -> ApplicationSummary {
        ApplicationSummary {
            name: self.name.as_str().to_owned(),
            email: self.email.as_str().to_owned(),
            year: self.year,
            created_at: self.created_at,
        }
    }
}

/// Listing projection: `number`, `usn` and `fact` are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    pub name: String,
    pub email: String,
    pub year: Option<StudyYear>,
    pub created_at: DateTime<Utc>,
}

/// Where the store keeps applications, echoed by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLocation {
    pub database: String,
    pub collection: String,
}

/// Successful intake result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationReceipt {
    pub id: ApplicationId,
}

/// Recent applications together with the store they were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentApplications {
    pub location: StoreLocation,
    pub recent: Vec<ApplicationSummary>,
}

#[cfg(test)]
mod tests;
