//! Field validation and normalisation for application submissions.
//!
//! Everything here is pure: no I/O, no clock, results depend only on input.
//! The intake service calls these before it touches the store, and inbound
//! adapters may call them too for early feedback.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Human-readable shape of a valid USN, used in error messages.
pub const USN_FORMAT_HINT: &str = "1DSXXCDXXX";

/// Email domains accepted verbatim in addition to any `.edu` domain.
pub const ALLOWED_EMAIL_DOMAINS: [&str; 2] = ["gmail.com", "x.com"];

const ACADEMIC_DOMAIN_SUFFIX: &str = ".edu";

static USN_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_SHAPE_RE: OnceLock<Regex> = OnceLock::new();

fn usn_regex() -> &'static Regex {
    USN_RE.get_or_init(|| match Regex::new(r"^1DS\d{2}CD\d{3}$") {
        Ok(re) => re,
        Err(err) => panic!("USN regex failed to compile: {err}"),
    })
}

fn email_shape_regex() -> &'static Regex {
    EMAIL_SHAPE_RE.get_or_init(|| match Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$") {
        Ok(re) => re,
        Err(err) => panic!("email regex failed to compile: {err}"),
    })
}

/// Uppercase a raw USN and strip every whitespace character.
///
/// # Examples
/// ```
/// use intake_backend::domain::validation::normalize_usn;
///
/// assert_eq!(normalize_usn(" 1ds21 cd 042 "), "1DS21CD042");
/// ```
#[must_use]
pub fn normalize_usn(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Check a normalised USN against `1DS` + 2 digits + `CD` + 3 digits.
#[must_use]
pub fn is_valid_usn(normalized: &str) -> bool {
    usn_regex().is_match(normalized)
}

/// Generic `local@domain.tld` shape check with exactly one `@`.
#[must_use]
pub fn has_email_shape(email: &str) -> bool {
    email_shape_regex().is_match(email)
}

/// Accept only emails at `gmail.com`, `x.com`, or any `.edu` domain.
///
/// The domain comparison is case-insensitive. Addresses that fail the
/// generic shape check are rejected before the domain is inspected.
///
/// # Examples
/// ```
/// use intake_backend::domain::validation::is_valid_email_domain;
///
/// assert!(is_valid_email_domain("ada@Cs.Stanford.EDU"));
/// assert!(!is_valid_email_domain("ada@outlook.com"));
/// ```
#[must_use]
pub fn is_valid_email_domain(email: &str) -> bool {
    if !has_email_shape(email) {
        return false;
    }
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let domain = domain.to_lowercase();
    ALLOWED_EMAIL_DOMAINS.contains(&domain.as_str()) || domain.ends_with(ACADEMIC_DOMAIN_SUFFIX)
}

/// Interpretation of one raw submission field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Absent, `null`, or an empty/whitespace-only string.
    Missing,
    /// A non-empty string, trimmed.
    Text(String),
    /// Present but not a string.
    NotText,
}

/// Classify a raw JSON field without applying any policy.
#[must_use]
pub fn classify_field(raw: Option<&Value>) -> FieldValue {
    match raw {
        None | Some(Value::Null) => FieldValue::Missing,
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                FieldValue::Missing
            } else {
                FieldValue::Text(trimmed.to_owned())
            }
        }
        Some(_) => FieldValue::NotText,
    }
}
