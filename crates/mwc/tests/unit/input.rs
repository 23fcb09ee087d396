//! Tests for reading the input records and rejecting malformed data.

use mwc::{
    calibration_from_json, fit_calibration, fit_thermo, thermo_from_json, FitError, Inference,
    ValidationError,
};

const THERMO_JSON: &str = r#"{
    "J": 2,
    "N": 4,
    "temps": [25.0, 37.0],
    "idx": [1, 1, 2, 2],
    "Nns": 4600000,
    "R": [0.0, 260.0, 0.0, 260.0],
    "foldchange": [1.0, 0.3, 1.0, 0.25]
}"#;

#[test]
fn thermo_record_parses() {
    let input = thermo_from_json(THERMO_JSON).unwrap();
    assert_eq!(input.j, 2);
    assert_eq!(input.idx, [1, 1, 2, 2]);
    assert_eq!(input.n_ns, 4.6e6);
    assert_eq!(input.repressors, [0.0, 260.0, 0.0, 260.0]);
}

#[test]
fn thermo_record_round_trips_field_names() {
    let input = thermo_from_json(THERMO_JSON).unwrap();
    let json = mwc::to_json(&input).unwrap();
    assert!(json.contains("\"Nns\":4600000.0"));
    assert!(json.contains("\"R\":[0.0,260.0,0.0,260.0]"));
    assert_eq!(thermo_from_json(&json).unwrap(), input);
}

#[test]
fn out_of_range_index_is_validation_error() {
    let mut input = thermo_from_json(THERMO_JSON).unwrap();
    input.idx[0] = 5;
    let err = fit_thermo(&input, &Inference::new()).unwrap_err();
    assert!(
        matches!(
            err,
            FitError::Validation(ValidationError::InvalidIndex {
                field: "idx",
                value: 5,
                max: 2,
                ..
            })
        ),
        "unexpected error: {}",
        err
    );
}

#[test]
fn negative_level_index_is_validation_error() {
    let json = THERMO_JSON.replace("[1, 1, 2, 2]", "[1, -1, 2, 2]");
    let input = thermo_from_json(&json).unwrap();
    let err = fit_thermo(&input, &Inference::new()).unwrap_err();
    assert!(
        matches!(
            err,
            FitError::Validation(ValidationError::InvalidIndex {
                field: "idx",
                position: 1,
                value: -1,
                max: 2,
            })
        ),
        "unexpected error: {}",
        err
    );
}

#[test]
fn negative_experiment_index_is_validation_error() {
    let json = r#"{
        "J1": 1, "J2": 1, "N": 1,
        "index_1": [1],
        "index_2": [-2],
        "I_1": [100.0],
        "I_2": [90.0]
    }"#;
    let input = calibration_from_json(json).unwrap();
    let err = fit_calibration(&input, &Inference::new()).unwrap_err();
    assert!(
        matches!(
            err,
            FitError::Validation(ValidationError::InvalidIndex {
                field: "index_2",
                value: -2,
                ..
            })
        ),
        "unexpected error: {}",
        err
    );
}

#[test]
fn non_positive_fold_change_is_validation_error() {
    let mut input = thermo_from_json(THERMO_JSON).unwrap();
    input.foldchange[2] = 0.0;
    let err = fit_thermo(&input, &Inference::new()).unwrap_err();
    assert!(matches!(
        err,
        FitError::Validation(ValidationError::InvalidDomain {
            field: "foldchange",
            position: Some(2),
            ..
        })
    ));
}

#[test]
fn calibration_length_mismatch_is_validation_error() {
    let json = r#"{
        "J1": 1, "J2": 1, "N": 3,
        "index_1": [1],
        "index_2": [1, 1, 1],
        "I_1": [100.0, 200.0, 300.0],
        "I_2": [90.0, 210.0]
    }"#;
    let input = calibration_from_json(json).unwrap();
    let err = fit_calibration(&input, &Inference::new()).unwrap_err();
    assert!(matches!(
        err,
        FitError::Validation(ValidationError::LengthMismatch {
            field: "I_2",
            expected: 3,
            actual: 2,
        })
    ));
}

#[test]
fn all_dark_pairs_still_fit() {
    let json = r#"{
        "J1": 1, "J2": 1, "N": 2,
        "index_1": [1],
        "index_2": [1, 1],
        "I_1": [0.0, 0.0],
        "I_2": [0.0, 0.0]
    }"#;
    let input = calibration_from_json(json).unwrap();
    // Zero intensities are valid data: the fit proceeds from the prior
    let fit = fit_calibration(&input, &Inference::new().warmup(200).draws(200).chains(1));
    assert!(fit.is_ok());
}
