// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for settings validation through the public API

use orthomosaic_client::errors::{MatchError, SchemaError, TargetError, Warning};
use orthomosaic_client::ingest::SettingsUpload;
use orthomosaic_client::settings::validate;
use orthomosaic_client::{
    AppendRequest, ImageAsset, Ingested, OrthomosaicTarget, Upload, ValidationError, Validator,
};

const HEADER: &str = "file_name,roll[deg],pitch[deg],heading[deg],projectedX[m],projectedY[m]";

fn image(name: &str) -> ImageAsset {
    ImageAsset::new(format!("{}.png", name), vec![0x89, b'P', b'N', b'G'])
}

fn settings(text: &str) -> SettingsUpload {
    SettingsUpload::from_bytes("settings.csv", text.as_bytes().to_vec()).unwrap()
}

fn table(rows: &[&str]) -> String {
    let mut text = HEADER.to_string();
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text
}

#[test]
fn test_complete_table_gives_full_plan() {
    let images = [image("a"), image("b"), image("c")];
    let text = table(&[
        "a,1,-45,10,100,200",
        "b,2,-46,20,110,210",
        "c,3,-47,30,120,220",
    ]);

    let plan = validate(&images, Some(&settings(&text))).unwrap();
    assert_eq!(plan.len(), 3);
    assert!(plan.is_complete());

    let names: Vec<&str> = plan.entries().iter().map(|e| e.image.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    let b = plan.entries()[1].settings.unwrap();
    assert_eq!(b.roll_deg, 2.0);
    assert_eq!(b.projected_y_m, 210.0);
}

#[test]
fn test_unmatched_image_gives_one_error_and_null_slot() {
    let images = [image("a"), image("missing"), image("c")];
    let text = table(&["a,1,-45,10,100,200", "c,3,-47,30,120,220"]);

    let ingested = Ingested {
        images: images.to_vec(),
        settings: Some(settings(&text)),
        warnings: Vec::new(),
    };
    let report = Validator::default().validate(&ingested, None);

    assert_eq!(
        report.errors,
        vec![ValidationError::Match(MatchError::NoSettingsForImage {
            image: "missing".to_string()
        })]
    );
    assert_eq!(report.plan.len(), 3);
    assert!(report.plan.entries()[0].is_valid());
    assert!(!report.plan.entries()[1].is_valid());
    assert!(report.plan.entries()[2].is_valid());
}

#[test]
fn test_invalid_pitch_replaced_with_warning() {
    for pitch in ["0", "-90", "5", "-120"] {
        let text = table(&[&format!("a,1,{},10,100,200", pitch)]);
        let ingested = Ingested {
            images: vec![image("a")],
            settings: Some(settings(&text)),
            warnings: Vec::new(),
        };
        let report = Validator::default().validate(&ingested, None);

        assert!(report.errors.is_empty(), "pitch {} should not block", pitch);
        assert_eq!(
            report.plan.entries()[0].settings.unwrap().pitch_deg,
            -48.0,
            "pitch {} should be replaced",
            pitch
        );
        assert!(
            report
                .warnings
                .iter()
                .any(|w| matches!(w, Warning::Leniency(l) if l.original == pitch)),
            "pitch {} should raise a warning",
            pitch
        );
    }
}

#[test]
fn test_valid_pitch_unchanged() {
    let text = table(&["a,1,-45,10,100,200"]);
    let ingested = Ingested {
        images: vec![image("a")],
        settings: Some(settings(&text)),
        warnings: Vec::new(),
    };
    let report = Validator::default().validate(&ingested, None);

    assert!(report.warnings.is_empty());
    assert_eq!(report.plan.entries()[0].settings.unwrap().pitch_deg, -45.0);
}

#[test]
fn test_semicolon_table_detected_and_parsed() {
    let text = HEADER.replace(',', ";") + "\na;1;-45;10;100;200\nb;2;-46;20;110;210";
    let ingested = Ingested {
        images: vec![image("a"), image("b")],
        settings: Some(settings(&text)),
        warnings: Vec::new(),
    };
    let report = Validator::default().validate(&ingested, None);

    assert_eq!(report.delimiter, Some(';'));
    assert!(report.errors.is_empty());
    assert_eq!(report.plan.entries()[1].settings.unwrap().heading_deg, 20.0);
}

#[test]
fn test_missing_columns_counted() {
    let images = [image("a")];

    let no_key = "roll[deg],pitch[deg],heading[deg],projectedX[m],projectedY[m]\n1,-45,10,100,200";
    let errors = validate(&images, Some(&settings(no_key))).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        ValidationError::Schema(SchemaError::MissingColumn { column, .. }) if column == "file_name"
    ));

    let two_missing = "file_name,roll[deg],pitch[deg],heading[deg]\na,1,-45,10";
    let errors = validate(&images, Some(&settings(two_missing))).unwrap_err();
    let missing: Vec<&str> = errors
        .iter()
        .filter_map(|e| match e {
            ValidationError::Schema(SchemaError::MissingColumn { column, .. }) => {
                Some(column.as_str())
            }
            _ => None,
        })
        .collect();
    assert_eq!(missing, vec!["projectedX[m]", "projectedY[m]"]);
}

#[test]
fn test_missing_inputs_block() {
    let text = table(&["a,1,-45,10,100,200"]);
    let errors = validate(&[], Some(&settings(&text))).unwrap_err();
    assert!(errors.contains(&ValidationError::MissingImages));

    let errors = validate(&[image("a")], None).unwrap_err();
    assert_eq!(errors, vec![ValidationError::MissingSettingsFile]);
}

#[test]
fn test_append_target_rules() {
    let text = table(&["a,1,-45,10,100,200"]);
    let ingested = Ingested {
        images: vec![image("a")],
        settings: Some(settings(&text)),
        warnings: Vec::new(),
    };
    let validator = Validator::default();

    let bad = AppendRequest {
        target: Some(OrthomosaicTarget::Id("abc".to_string())),
        confirmed: true,
    };
    let report = validator.validate(&ingested, Some(&bad));
    assert_eq!(
        report.errors,
        vec![ValidationError::Target(TargetError::InvalidId(
            "abc".to_string()
        ))]
    );
    // Settings errors are counted separately from target errors
    assert_eq!(report.settings_error_count(), 0);

    let good = AppendRequest {
        target: Some(OrthomosaicTarget::Id("orthomosaic_42".to_string())),
        confirmed: true,
    };
    assert!(validator.validate(&ingested, Some(&good)).is_submittable());

    let unconfirmed = AppendRequest {
        confirmed: false,
        ..good
    };
    let report = validator.validate(&ingested, Some(&unconfirmed));
    assert_eq!(
        report.errors,
        vec![ValidationError::Target(TargetError::Unconfirmed)]
    );
}

#[test]
fn test_uploads_classified_and_first_settings_used() {
    let uploads = vec![
        Upload::from_bytes("a.PNG", vec![1, 2, 3]).unwrap(),
        Upload::from_bytes("first.csv", table(&["a,1,-45,10,100,200"]).into_bytes()).unwrap(),
        Upload::from_bytes("second.tsv", b"ignored".to_vec()).unwrap(),
    ];
    let ingested = Ingested::from_uploads(uploads, None);

    assert_eq!(ingested.images.len(), 1);
    assert_eq!(ingested.images[0].name, "a");
    assert_eq!(
        ingested.settings.as_ref().map(|s| s.file_name.as_str()),
        Some("first.csv")
    );
    assert_eq!(
        ingested.warnings,
        vec![Warning::MultipleSettingsFiles {
            used: "first.csv".to_string(),
            count: 2
        }]
    );

    let report = Validator::default().validate(&ingested, None);
    assert!(report.is_submittable());
}

#[test]
fn test_unsupported_upload_rejected() {
    assert!(Upload::from_bytes("notes.txt", b"hello".to_vec()).is_err());
}

#[test]
fn test_validation_is_repeatable() {
    let text = table(&["a,1,0,10,100,200"]);
    let ingested = Ingested {
        images: vec![image("a"), image("b")],
        settings: Some(settings(&text)),
        warnings: Vec::new(),
    };
    let validator = Validator::default();
    assert_eq!(
        validator.validate(&ingested, None),
        validator.validate(&ingested, None)
    );
}
