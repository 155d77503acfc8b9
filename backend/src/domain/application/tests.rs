//! Tests for submission parsing and conflict matching.

use super::*;
use crate::domain::ErrorCode;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::json;

fn submission(value: Value) -> ApplicationSubmission {
    serde_json::from_value(value).expect("submission deserialises")
}

#[fixture]
fn complete_payload() -> Value {
    json!({
        "name": "Ada Lovelace",
        "year": "2nd",
        "fact": "Wrote the first program",
        "number": "+91 98450 12345",
        "usn": " 1ds22 cd 007 ",
        "email": "ada@gmail.com",
        "resume": "ignored.pdf",
        "isAdmin": true,
    })
}

fn stored(email: &str, number: Option<&str>, usn: &str) -> Application {
    Application::restore(
        ApplicationId::random(),
        "Existing".to_owned(),
        None,
        None,
        number.map(str::to_owned),
        usn.to_owned(),
        email.to_owned(),
        Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    )
}

#[rstest]
fn complete_submission_is_normalised(complete_payload: Value) {
    let application =
        NewApplication::try_from_submission(&submission(complete_payload)).expect("valid");

    assert_eq!(application.name.as_str(), "Ada Lovelace");
    assert_eq!(application.year, Some(StudyYear::Second));
    assert_eq!(application.fact.as_deref(), Some("Wrote the first program"));
    assert_eq!(
        application.number.as_ref().map(PhoneNumber::as_str),
        Some("+91 98450 12345")
    );
    assert_eq!(application.usn.as_str(), "1DS22CD007");
    assert_eq!(application.email.as_str(), "ada@gmail.com");
}

#[rstest]
#[case(json!([
    "Ada", "2nd", "fact", "555", "1DS22CD007", "ada@gmail.com"
]))]
#[case(json!("ada@gmail.com"))]
#[case(json!(null))]
#[case(json!(7))]
fn only_json_objects_deserialise(#[case] body: Value) {
    assert!(serde_json::from_value::<ApplicationSubmission>(body).is_err());
}

#[rstest]
fn unknown_keys_are_ignored(complete_payload: Value) {
    let parsed = submission(complete_payload);
    let reserialised = serde_json::to_value(&parsed).expect("serialise");
    let keys: Vec<&str> = reserialised
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    assert!(!keys.contains(&"resume"));
    assert!(!keys.contains(&"isAdmin"));
}

#[rstest]
#[case(json!({ "email": "a@gmail.com" }), "name")]
#[case(json!({ "name": "", "email": "a@gmail.com" }), "name")]
#[case(json!({ "name": "   ", "email": "a@gmail.com" }), "name")]
#[case(json!({ "name": null, "email": "a@gmail.com" }), "name")]
#[case(json!({ "name": "Ada" }), "email")]
#[case(json!({ "name": "Ada", "email": "" }), "email")]
#[case(json!({}), "name")]
#[case(json!({ "email": "not-an-email" }), "name")]
fn missing_required_fields(#[case] payload: Value, #[case] field: &str) {
    let err = NewApplication::try_from_submission(&submission(payload)).expect_err("missing");
    assert_eq!(err.code(), ErrorCode::MissingField);
    assert_eq!(err.field(), Some(field));
}

#[rstest]
#[case(json!({ "name": "Ada", "email": "ada@outlook.com", "usn": "1DS22CD007" }), "email")]
#[case(json!({ "name": "Ada", "email": "ada@", "usn": "1DS22CD007" }), "email")]
#[case(json!({ "name": "Ada", "email": " ada@gmail.com", "usn": "1DS22CD007" }), "email")]
#[case(json!({ "name": "Ada", "email": "ada@gmail.com\n", "usn": "1DS22CD007" }), "email")]
#[case(json!({ "name": "Ada", "email": "ada@gmail.com", "usn": "1DS22CD07" }), "usn")]
#[case(json!({ "name": "Ada", "email": "ada@gmail.com", "usn": 12345 }), "usn")]
#[case(json!({ "name": "Ada", "email": "ada@gmail.com", "usn": "1DS22CD007", "year": "4th" }), "year")]
#[case(json!({ "name": "Ada", "email": "ada@gmail.com", "usn": "1DS22CD007", "number": 9845012345_u64 }), "number")]
#[case(json!({ "name": 42, "email": "ada@gmail.com" }), "name")]
#[case(json!({ "name": "Ada", "email": ["ada@gmail.com"] }), "email")]
fn malformed_fields(#[case] payload: Value, #[case] field: &str) {
    let err = NewApplication::try_from_submission(&submission(payload)).expect_err("malformed");
    assert_eq!(err.code(), ErrorCode::InvalidFormat);
    assert_eq!(err.field(), Some(field));
}

#[rstest]
fn empty_optional_fields_are_absent() {
    let application = NewApplication::try_from_submission(&submission(json!({
        "name": "Ada",
        "email": "ada@mit.edu",
        "year": "",
        "fact": "",
        "number": "",
        "usn": "1DS22CD007",
    })))
    .expect("valid");

    assert!(application.year.is_none());
    assert!(application.fact.is_none());
    assert!(application.number.is_none());
}

#[rstest]
#[case(json!({ "name": "Ada", "email": "ada@gmail.com" }))]
#[case(json!({ "name": "Ada", "email": "ada@gmail.com", "usn": null }))]
#[case(json!({ "name": "Ada", "email": "ada@gmail.com", "usn": "" }))]
#[case(json!({ "name": "Ada", "email": "ada@gmail.com", "usn": "   " }))]
#[case(json!({ "name": "Ada", "email": "ada@gmail.com", "usn": ["1DS22CD007"] }))]
fn usn_is_required(#[case] payload: Value) {
    let err = NewApplication::try_from_submission(&submission(payload)).expect_err("no usn");
    assert_eq!(err.code(), ErrorCode::InvalidFormat);
    assert_eq!(err.field(), Some("usn"));
}

#[rstest]
fn probe_reports_fields_in_priority_order() {
    let new = NewApplication::try_from_submission(&submission(json!({
        "name": "Ada",
        "email": "ada@gmail.com",
        "number": "555",
        "usn": "1DS22CD007",
    })))
    .expect("valid");
    let existing = stored("ada@gmail.com", Some("555"), "1DS22CD007");

    assert_eq!(
        new.conflict_probe().colliding_fields(&existing),
        vec![UniqueField::Email, UniqueField::Number, UniqueField::Usn]
    );
}

#[rstest]
fn absent_number_never_collides() {
    let new = NewApplication::try_from_submission(&submission(json!({
        "name": "Ada",
        "email": "ada@gmail.com",
        "usn": "1DS22CD007",
    })))
    .expect("valid");
    let existing = stored("other@gmail.com", None, "1DS22CD008");

    assert!(!new.conflict_probe().matches(&existing));
}

#[rstest]
fn email_holder_wins_over_number_holder() {
    let new = NewApplication::try_from_submission(&submission(json!({
        "name": "Ada",
        "email": "ada@gmail.com",
        "number": "555",
        "usn": "1DS22CD007",
    })))
    .expect("valid");
    let usn_holder = stored("c@gmail.com", None, "1DS22CD007");
    let number_holder = stored("b@gmail.com", Some("555"), "1DS22CD001");
    let email_holder = stored("ada@gmail.com", None, "1DS22CD002");
    let unrelated = stored("z@gmail.com", Some("999"), "1DS22CD003");

    let probe = new.conflict_probe();
    let winner = probe
        .highest_priority_match(vec![
            unrelated,
            usn_holder.clone(),
            number_holder.clone(),
            email_holder.clone(),
        ])
        .expect("match");
    assert_eq!(winner.id, email_holder.id);

    let winner = probe
        .highest_priority_match(vec![usn_holder, number_holder.clone()])
        .expect("match");
    assert_eq!(winner.id, number_holder.id);

    assert!(probe.highest_priority_match(Vec::new()).is_none());
}

#[rstest]
fn record_holding_several_keys_ranks_by_its_strongest() {
    let new = NewApplication::try_from_submission(&submission(json!({
        "name": "Ada",
        "email": "ada@gmail.com",
        "number": "555",
        "usn": "1DS22CD007",
    })))
    .expect("valid");
    let number_and_usn = stored("b@gmail.com", Some("555"), "1DS22CD007");
    let email_only = stored("ada@gmail.com", None, "1DS22CD001");

    let probe = new.conflict_probe();
    let winner = probe
        .highest_priority_match(vec![number_and_usn.clone(), email_only.clone()])
        .expect("match");
    assert_eq!(winner.id, email_only.id);

    let winner = probe
        .highest_priority_match(vec![stored("z@gmail.com", None, "1DS22CD007"), number_and_usn.clone()])
        .expect("match");
    assert_eq!(winner.id, number_and_usn.id);
}

#[rstest]
fn summary_drops_private_fields() {
    let existing = stored("ada@gmail.com", Some("555"), "1DS22CD007");
    let value = serde_json::to_value(existing.summary()).expect("serialise summary");
    let object = value.as_object().expect("object");

    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["createdAt", "email", "name", "year"]);
}

#[rstest]
#[case("1st", StudyYear::First)]
#[case("2nd", StudyYear::Second)]
#[case("3rd", StudyYear::Third)]
fn study_year_round_trips_labels(#[case] label: &str, #[case] year: StudyYear) {
    assert_eq!(label.parse::<StudyYear>(), Ok(year));
    assert_eq!(year.to_string(), label);
    assert_eq!(serde_json::to_value(year).expect("serialise"), json!(label));
}
