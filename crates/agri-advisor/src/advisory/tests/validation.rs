use super::common::*;
use crate::advisory::{
    Field, FieldValue, InferenceKind, InputValidator, IssueReason, RawRequest, RawValue,
};

#[test]
fn revalidating_a_passing_request_is_identical() {
    let validator = InputValidator::default();
    for (request, kind) in [
        (crop_request(), InferenceKind::Crop),
        (fertilizer_request(), InferenceKind::Fertilizer),
        (yield_request(), InferenceKind::Yield),
    ] {
        let first = validator.validate(&request, kind).expect("valid request");
        let second = validator.validate(&request, kind).expect("valid request");
        assert_eq!(first, second);
    }
}

#[test]
fn missing_temperature_is_reported_alone() {
    let mut request = crop_request();
    request.remove("temperature");

    match InputValidator::default().validate(&request, InferenceKind::Crop) {
        Err(err) => {
            assert_eq!(err.missing_fields, vec![Field::Temperature]);
            assert!(err.out_of_range_fields.is_empty());
            assert_eq!(err.summary(), "Please fill in all fields: temperature");
        }
        other => panic!("expected missing temperature, got {other:?}"),
    }
}

#[test]
fn validation_error_displays_missing_and_invalid_fields() {
    let mut request = crop_request().with("ph", "acidic");
    request.remove("rainfall");

    let err = InputValidator::default()
        .validate(&request, InferenceKind::Crop)
        .expect_err("request rejected");
    assert_eq!(
        err.to_string(),
        "Please fill in all fields: rainfall. Invalid values: ph 'acidic' is not a number"
    );
    assert_eq!(err.to_string(), err.summary());
}

#[test]
fn blank_values_count_as_missing() {
    let request = crop_request().with("rainfall", "   ");

    let err = InputValidator::default()
        .validate(&request, InferenceKind::Crop)
        .expect_err("blank rainfall");
    assert_eq!(err.missing_field_names(), vec!["rainfall"]);
}

#[test]
fn every_problem_is_collected_in_declaration_order() {
    let request = RawRequest::new()
        .with("soil_type", "Peaty")
        .with("temperature", "warm")
        .with("humidity", "52");

    let err = InputValidator::default()
        .validate(&request, InferenceKind::Fertilizer)
        .expect_err("incomplete fertilizer form");

    assert_eq!(
        err.missing_fields,
        vec![
            Field::CropType,
            Field::Moisture,
            Field::Nitrogen,
            Field::Phosphorus,
            Field::Potassium
        ]
    );
    assert_eq!(err.invalid_field_names(), vec!["soil_type", "temperature"]);
    assert!(matches!(
        err.out_of_range_fields[0].reason,
        IssueReason::UnknownOption { .. }
    ));
    assert_eq!(err.out_of_range_fields[1].reason, IssueReason::NotNumeric);
}

#[test]
fn district_must_belong_to_state() {
    let request = yield_request().with("district", "Kolkata");

    let err = InputValidator::default()
        .validate(&request, InferenceKind::Yield)
        .expect_err("Kolkata is not in Punjab");

    assert!(err.missing_fields.is_empty());
    assert_eq!(err.out_of_range_fields.len(), 1);
    let issue = &err.out_of_range_fields[0];
    assert_eq!(issue.field, Field::District);
    assert_eq!(
        issue.reason,
        IssueReason::NotInState {
            state: "Punjab".to_string()
        }
    );
}

#[test]
fn changing_state_clears_district() {
    let mut request = yield_request();
    request.set("state", "Punjab");
    assert_eq!(
        request.get("district"),
        Some(&RawValue::from("Ludhiana")),
        "re-selecting the same state keeps the district"
    );

    request.set("state", "West Bengal");
    assert!(request.get("district").is_none());

    let err = InputValidator::default()
        .validate(&request, InferenceKind::Yield)
        .expect_err("district cleared");
    assert_eq!(err.missing_fields, vec![Field::District]);

    request.set("district", "Kolkata");
    InputValidator::default()
        .validate(&request, InferenceKind::Yield)
        .expect("Kolkata is in West Bengal");
}

#[test]
fn unknown_state_leaves_district_unresolved() {
    let request = RawRequest::new()
        .with("state", "Goa")
        .with("district", "Panaji")
        .with("season", "Kharif")
        .with("crop", "Rice")
        .with("area", "1")
        .with("production", "3");

    let err = InputValidator::default()
        .validate(&request, InferenceKind::Yield)
        .expect_err("Goa is not catalogued");
    let reasons: Vec<_> = err
        .out_of_range_fields
        .iter()
        .map(|issue| (issue.field, issue.reason.clone()))
        .collect();
    assert!(matches!(
        reasons.as_slice(),
        [
            (Field::State, IssueReason::UnknownOption { .. }),
            (Field::District, IssueReason::UnresolvedState)
        ]
    ));
}

#[test]
fn negative_area_is_rejected() {
    let request = yield_request().with("area", "-1");

    let err = InputValidator::default()
        .validate(&request, InferenceKind::Yield)
        .expect_err("negative area");
    assert_eq!(
        err.out_of_range_fields[0].reason,
        IssueReason::BelowMinimum { min: 0.0 }
    );
}

#[test]
fn readings_outside_advisory_range_pass_with_warning() {
    let request = crop_request().with("ph", "10.4");

    let input = InputValidator::default()
        .validate(&request, InferenceKind::Crop)
        .expect("pH 10.4 is unusual but accepted");

    assert_eq!(input.number(Field::Ph), Some(10.4));
    assert_eq!(input.warnings().len(), 1);
    assert_eq!(input.warnings()[0].field, Field::Ph);
}

#[test]
fn unrelated_fields_are_ignored() {
    let request = fertilizer_request().with("rainfall", "not a number");

    let input = InputValidator::default()
        .validate(&request, InferenceKind::Fertilizer)
        .expect("rainfall is not a fertilizer field");
    assert_eq!(input.fields().len(), 8);
    assert_eq!(
        input.fields()[0].value,
        FieldValue::Choice("Loamy".to_string())
    );
}
