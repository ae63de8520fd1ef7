// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use orthomosaic_client::constants::{
    DEFAULT_ENDPOINT, DELIMITER_CANDIDATES, IMAGE_EXTENSIONS, SETTINGS_EXTENSIONS, columns, pitch,
};

#[test]
fn test_numeric_columns_exclude_key() {
    assert_eq!(columns::NUMERIC.len(), 5);
    assert!(!columns::NUMERIC.contains(&columns::FILE_NAME));
}

#[test]
fn test_pitch_default_inside_bounds() {
    // The replacement value must itself be acceptable
    assert!(pitch::DEFAULT_DEG > pitch::LOWER_DEG);
    assert!(pitch::DEFAULT_DEG < pitch::UPPER_DEG);
}

#[test]
fn test_comma_preferred_delimiter() {
    assert_eq!(DELIMITER_CANDIDATES[0], ',');
    assert!(DELIMITER_CANDIDATES.contains(&'\t'));
}

#[test]
fn test_extensions_lowercase_and_disjoint() {
    for ext in IMAGE_EXTENSIONS.iter().chain(SETTINGS_EXTENSIONS.iter()) {
        assert_eq!(*ext, ext.to_lowercase(), "Extension {} should be lowercase", ext);
    }
    for ext in IMAGE_EXTENSIONS {
        assert!(!SETTINGS_EXTENSIONS.contains(&ext));
    }
}

#[test]
fn test_default_endpoint_has_trailing_slash() {
    assert!(DEFAULT_ENDPOINT.ends_with('/'));
}
