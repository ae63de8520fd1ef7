// SPDX-License-Identifier: GPL-3.0-only

//! Settings validation: from uploaded images and a settings table to an
//! upload plan
//!
//! Problems are accumulated, never fail-fast, so the operator sees every
//! issue at once. The plan always has one entry per image, in upload order,
//! with `None` settings for images that could not be resolved.
//!
//! Validation performs no I/O and may be repeated on the same input.

use crate::constants::columns;
use crate::errors::{LeniencyWarning, MatchError, SchemaError, ValidationError, Warning};
use crate::ingest::{ImageAsset, Ingested, SettingsUpload};
use crate::orthomosaic::AppendRequest;
use crate::settings::leniency::PitchPolicy;
use crate::settings::plan::{CameraSettings, PlanEntry, UploadPlan};
use crate::settings::table::SettingsTable;
use tracing::{debug, info, warn};

/// Everything learned while validating one submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// One entry per image, in upload order
    pub plan: UploadPlan,
    /// Blocking problems, in the order they were found
    pub errors: Vec<ValidationError>,
    /// Non-blocking diagnostics
    pub warnings: Vec<Warning>,
    /// Detected settings delimiter, when a table was parsed
    pub delimiter: Option<char>,
    /// Name of the settings file used
    pub settings_file: Option<String>,
}

impl ValidationReport {
    /// Submission is permitted
    pub fn is_submittable(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors that come from the settings table (schema and matching)
    pub fn settings_error_count(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| matches!(e, ValidationError::Schema(_) | ValidationError::Match(_)))
            .count()
    }

    pub fn into_result(self) -> Result<UploadPlan, Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(self.plan)
        } else {
            Err(self.errors)
        }
    }
}

/// Outcome of resolving images against one settings table
#[derive(Debug, Clone, Default, PartialEq)]
struct TableResolution {
    plan: UploadPlan,
    errors: Vec<ValidationError>,
    warnings: Vec<Warning>,
    delimiter: Option<char>,
}

/// Settings validator
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    pitch: PitchPolicy,
}

impl Validator {
    pub fn new(pitch: PitchPolicy) -> Self {
        Self { pitch }
    }

    /// Validate a whole submission
    ///
    /// Table problems come first, then missing inputs, then problems with the
    /// append target. Target problems are independent of the table.
    pub fn validate(&self, ingested: &Ingested, append: Option<&AppendRequest>) -> ValidationReport {
        let mut report = ValidationReport {
            warnings: ingested.warnings.clone(),
            ..Default::default()
        };

        match &ingested.settings {
            Some(settings) => {
                let resolution = self.resolve(&ingested.images, settings);
                report.plan = resolution.plan;
                report.errors.extend(resolution.errors);
                report.warnings.extend(resolution.warnings);
                report.delimiter = resolution.delimiter;
                report.settings_file = Some(settings.file_name.clone());
            }
            None => {
                report.plan = UploadPlan::unresolved(ingested.images.iter().map(|i| i.name.as_str()));
            }
        }

        if ingested.images.is_empty() {
            report.errors.push(ValidationError::MissingImages);
        }
        if ingested.settings.is_none() {
            report.errors.push(ValidationError::MissingSettingsFile);
        }
        if let Some(append) = append {
            report
                .errors
                .extend(append.check().into_iter().map(ValidationError::from));
        }

        info!(
            images = ingested.images.len(),
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Validation finished"
        );
        report
    }

    /// Resolve every image against the settings table
    fn resolve(&self, images: &[ImageAsset], settings: &SettingsUpload) -> TableResolution {
        let names = || images.iter().map(|i| i.name.as_str());

        let table = match SettingsTable::from_upload(settings) {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "Settings table unusable");
                return TableResolution {
                    plan: UploadPlan::unresolved(names()),
                    errors: vec![e.into()],
                    ..Default::default()
                };
            }
        };

        let mut resolution = TableResolution {
            delimiter: Some(table.delimiter()),
            ..Default::default()
        };

        for column in columns::NUMERIC.into_iter().chain([columns::FILE_NAME]) {
            if !table.has_column(column) {
                resolution.errors.push(
                    SchemaError::MissingColumn {
                        column: column.to_string(),
                        file: table.file_name().to_string(),
                    }
                    .into(),
                );
            }
        }

        let Some(key_column) = table.column_index(columns::FILE_NAME) else {
            resolution.plan = UploadPlan::unresolved(names());
            return resolution;
        };

        let mut entries = Vec::with_capacity(images.len());
        for image in images {
            let settings = match table.find_row(key_column, &image.name) {
                Some(row) => self.resolve_row(&table, &image.name, row, &mut resolution),
                None => {
                    debug!(image = %image.name, "No settings row");
                    resolution.errors.push(
                        MatchError::NoSettingsForImage {
                            image: image.name.clone(),
                        }
                        .into(),
                    );
                    None
                }
            };
            entries.push(PlanEntry {
                image: image.name.clone(),
                settings,
            });
        }
        resolution.plan = UploadPlan::new(entries);
        resolution
    }

    /// Read the five numeric cells of a matched row
    ///
    /// Columns missing from the table leave the entry unresolved without a
    /// further error, since the missing column is already reported.
    fn resolve_row(
        &self,
        table: &SettingsTable,
        image: &str,
        row: &[String],
        resolution: &mut TableResolution,
    ) -> Option<CameraSettings> {
        let mut values = [None; 5];

        for (slot, column) in columns::NUMERIC.into_iter().enumerate() {
            let Some(index) = table.column_index(column) else {
                continue;
            };
            let raw = row.get(index).map(String::as_str).unwrap_or("");

            if column == columns::PITCH {
                let parsed = if raw.is_empty() {
                    None
                } else {
                    match raw.parse::<f64>() {
                        Ok(value) => Some(value),
                        Err(_) => {
                            resolution.errors.push(invalid_value(image, column, raw));
                            continue;
                        }
                    }
                };
                let (pitch, substituted) = self.pitch.resolve(parsed);
                if substituted {
                    warn!(image, pitch = raw, default = pitch, "Invalid pitch replaced");
                    resolution.warnings.push(
                        LeniencyWarning {
                            image: image.to_string(),
                            original: raw.to_string(),
                            replacement: pitch,
                        }
                        .into(),
                    );
                }
                values[slot] = Some(pitch);
                continue;
            }

            match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => values[slot] = Some(value),
                _ => resolution.errors.push(invalid_value(image, column, raw)),
            }
        }

        let [Some(roll_deg), Some(pitch_deg), Some(heading_deg), Some(projected_x_m), Some(projected_y_m)] =
            values
        else {
            return None;
        };

        Some(CameraSettings {
            roll_deg,
            pitch_deg,
            heading_deg,
            projected_x_m,
            projected_y_m,
        })
    }
}

fn invalid_value(image: &str, column: &str, raw: &str) -> ValidationError {
    MatchError::InvalidValue {
        image: image.to_string(),
        column: column.to_string(),
        value: raw.to_string(),
    }
    .into()
}

/// Validate images against an optional settings table with the default
/// pitch policy
pub fn validate(
    images: &[ImageAsset],
    settings: Option<&SettingsUpload>,
) -> Result<UploadPlan, Vec<ValidationError>> {
    let ingested = Ingested {
        images: images.to_vec(),
        settings: settings.cloned(),
        warnings: Vec::new(),
    };
    Validator::default().validate(&ingested, None).into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TargetError;
    use crate::orthomosaic::OrthomosaicTarget;

    const HEADER: &str = "file_name,roll[deg],pitch[deg],heading[deg],projectedX[m],projectedY[m]";

    fn images(names: &[&str]) -> Vec<ImageAsset> {
        names
            .iter()
            .map(|n| ImageAsset::new(format!("{n}.jpg"), vec![0xff, 0xd8]))
            .collect()
    }

    fn settings(text: &str) -> SettingsUpload {
        SettingsUpload {
            file_name: "settings.csv".to_string(),
            text: text.to_string(),
        }
    }

    fn ingested(names: &[&str], text: &str) -> Ingested {
        Ingested {
            images: images(names),
            settings: Some(settings(text)),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_full_table_produces_plan() {
        let text = format!("{HEADER}\nimg1,1.5,-45,90,100.0,200.0\nimg2,0,-30,180,101,201\n");
        let plan = validate(&images(&["img1", "img2"]), Some(&settings(&text))).unwrap();

        assert_eq!(plan.len(), 2);
        assert!(plan.is_complete());
        assert_eq!(
            plan.entries()[0].settings,
            Some(CameraSettings {
                roll_deg: 1.5,
                pitch_deg: -45.0,
                heading_deg: 90.0,
                projected_x_m: 100.0,
                projected_y_m: 200.0,
            })
        );
        assert_eq!(plan.entries()[1].image, "img2");
    }

    #[test]
    fn test_unmatched_image_gets_null_slot() {
        let text = format!("{HEADER}\nimg1,0,-45,0,0,0\n");
        let report = Validator::default().validate(&ingested(&["img1", "ghost", "img1"], &text), None);

        assert_eq!(report.plan.len(), 3);
        assert!(report.plan.entries()[0].is_valid());
        assert_eq!(report.plan.entries()[1].settings, None);
        assert!(report.plan.entries()[2].is_valid());
        assert_eq!(
            report.errors,
            vec![ValidationError::Match(MatchError::NoSettingsForImage {
                image: "ghost".to_string()
            })]
        );
        assert_eq!(report.settings_error_count(), 1);
    }

    #[test]
    fn test_out_of_range_pitch_is_warning() {
        for pitch in ["0", "-90", "5", "-120", ""] {
            let text = format!("{HEADER}\nimg1,0,{pitch},0,0,0\n");
            let report = Validator::default().validate(&ingested(&["img1"], &text), None);

            assert!(report.is_submittable(), "pitch {pitch:?}");
            assert_eq!(report.plan.entries()[0].settings.unwrap().pitch_deg, -48.0);
            assert_eq!(
                report.warnings,
                vec![Warning::Leniency(LeniencyWarning {
                    image: "img1".to_string(),
                    original: pitch.to_string(),
                    replacement: -48.0,
                })]
            );
        }
    }

    #[test]
    fn test_valid_pitch_unchanged() {
        let text = format!("{HEADER}\nimg1,0,-45,0,0,0\n");
        let report = Validator::default().validate(&ingested(&["img1"], &text), None);
        assert!(report.warnings.is_empty());
        assert_eq!(report.plan.entries()[0].settings.unwrap().pitch_deg, -45.0);
    }

    #[test]
    fn test_custom_pitch_policy() {
        let validator = Validator::new(PitchPolicy {
            lower_deg: -60.0,
            upper_deg: -10.0,
            default_deg: -35.0,
        });
        let text = format!("{HEADER}\nimg1,0,-5,0,0,0\n");
        let report = validator.validate(&ingested(&["img1"], &text), None);
        assert_eq!(report.plan.entries()[0].settings.unwrap().pitch_deg, -35.0);
    }

    #[test]
    fn test_semicolon_table() {
        let text = HEADER.replace(',', ";") + "\nimg1;1;-45;2;3;4\n";
        let report = Validator::default().validate(&ingested(&["img1"], &text), None);
        assert_eq!(report.delimiter, Some(';'));
        assert!(report.is_submittable());
        assert_eq!(report.plan.entries()[0].settings.unwrap().projected_y_m, 4.0);
    }

    #[test]
    fn test_missing_file_name_column() {
        let text = "roll[deg],pitch[deg],heading[deg],projectedX[m],projectedY[m]\n0,-45,0,0,0\n";
        let report = Validator::default().validate(&ingested(&["img1", "img2"], text), None);

        assert_eq!(report.settings_error_count(), 1);
        assert_eq!(
            report.errors,
            vec![ValidationError::Schema(SchemaError::MissingColumn {
                column: "file_name".to_string(),
                file: "settings.csv".to_string(),
            })]
        );
        assert_eq!(report.plan.len(), 2);
        assert!(report.plan.entries().iter().all(|e| !e.is_valid()));
    }

    #[test]
    fn test_missing_two_numeric_columns() {
        let text = "file_name,roll[deg],pitch[deg],heading[deg]\nimg1,0,-45,0\n";
        let report = Validator::default().validate(&ingested(&["img1"], text), None);

        assert_eq!(report.settings_error_count(), 2);
        let missing: Vec<_> = report
            .errors
            .iter()
            .filter_map(|e| match e {
                ValidationError::Schema(SchemaError::MissingColumn { column, .. }) => {
                    Some(column.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(missing, ["projectedX[m]", "projectedY[m]"]);
        // Matched row stays unresolved without a further error
        assert_eq!(report.plan.entries()[0].settings, None);
    }

    #[test]
    fn test_non_numeric_cell_is_error() {
        let text = format!("{HEADER}\nimg1,abc,-45,0,0,0\n");
        let report = Validator::default().validate(&ingested(&["img1"], &text), None);
        assert_eq!(
            report.errors,
            vec![ValidationError::Match(MatchError::InvalidValue {
                image: "img1".to_string(),
                column: "roll[deg]".to_string(),
                value: "abc".to_string(),
            })]
        );
        assert_eq!(report.plan.entries()[0].settings, None);
    }

    #[test]
    fn test_missing_inputs() {
        let report = Validator::default().validate(&Ingested::default(), None);
        assert_eq!(
            report.errors,
            vec![
                ValidationError::MissingImages,
                ValidationError::MissingSettingsFile
            ]
        );
    }

    #[test]
    fn test_images_without_settings() {
        let ingested = Ingested {
            images: images(&["img1"]),
            ..Default::default()
        };
        let report = Validator::default().validate(&ingested, None);
        assert_eq!(report.errors, vec![ValidationError::MissingSettingsFile]);
        assert_eq!(report.plan.len(), 1);
    }

    #[test]
    fn test_undetectable_delimiter_blocks() {
        let report = Validator::default().validate(&ingested(&["img1"], "file_name\nimg1\n"), None);
        assert_eq!(report.delimiter, None);
        assert!(matches!(
            report.errors.as_slice(),
            [ValidationError::Schema(SchemaError::UndetectableDelimiter { .. })]
        ));
        assert_eq!(report.plan.len(), 1);
    }

    #[test]
    fn test_append_target_checked_independently() {
        let text = format!("{HEADER}\nimg1,0,-45,0,0,0\n");
        let append = AppendRequest {
            target: Some(OrthomosaicTarget::Id("abc".to_string())),
            confirmed: true,
        };
        let report = Validator::default().validate(&ingested(&["img1"], &text), Some(&append));

        assert_eq!(report.settings_error_count(), 0);
        assert_eq!(
            report.errors,
            vec![ValidationError::Target(TargetError::InvalidId("abc".to_string()))]
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let text = format!("{HEADER}\nimg1,0,7,0,0,0\n");
        let input = ingested(&["img1", "img2"], &text);
        let validator = Validator::default();
        assert_eq!(validator.validate(&input, None), validator.validate(&input, None));
    }
}
