// SPDX-License-Identifier: GPL-3.0-only

//! Orthomosaic references
//!
//! An upload either creates a new orthomosaic or adds to an existing one,
//! referenced by id or by its full reference point metadata.

use crate::constants::ORTHOMOSAIC_ID_PREFIX;
use crate::errors::TargetError;
use serde::{Deserialize, Serialize};

/// Reference point of an existing orthomosaic, as reported by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrthomosaicMetadata {
    pub id: String,
    pub x_m: f64,
    pub y_m: f64,
    pub x_m_per_pixel: f64,
    pub y_m_per_pixel: f64,
}

/// Existing orthomosaic to add images to
#[derive(Debug, Clone, PartialEq)]
pub enum OrthomosaicTarget {
    Id(String),
    Metadata(OrthomosaicMetadata),
}

impl OrthomosaicTarget {
    pub fn id(&self) -> &str {
        match self {
            OrthomosaicTarget::Id(id) => id,
            OrthomosaicTarget::Metadata(metadata) => &metadata.id,
        }
    }
}

/// Check a manually entered orthomosaic id
pub fn validate_orthomosaic_id(id: &str) -> Result<(), TargetError> {
    if id.trim().is_empty() || !id.starts_with(ORTHOMOSAIC_ID_PREFIX) {
        return Err(TargetError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// The "add to existing orthomosaic" option of a submission
#[derive(Debug, Clone, PartialEq)]
pub struct AppendRequest {
    /// `None` when the option is on but no id was given or remembered
    pub target: Option<OrthomosaicTarget>,
    /// Operator confirmed the target
    pub confirmed: bool,
}

impl AppendRequest {
    /// Every reason this request blocks submission
    ///
    /// Ids are held to the prefix rule; stored metadata came from the service
    /// and is only subject to confirmation.
    pub fn check(&self) -> Vec<TargetError> {
        let mut errors = Vec::new();
        match &self.target {
            Some(OrthomosaicTarget::Id(id)) => {
                if let Err(e) = validate_orthomosaic_id(id) {
                    errors.push(e);
                }
            }
            Some(OrthomosaicTarget::Metadata(_)) => {}
            None => errors.push(TargetError::MissingId),
        }
        if !self.confirmed {
            errors.push(TargetError::Unconfirmed);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> OrthomosaicMetadata {
        OrthomosaicMetadata {
            id: "orthomosaic_7".to_string(),
            x_m: 512_000.0,
            y_m: 6_150_000.0,
            x_m_per_pixel: 0.1,
            y_m_per_pixel: -0.1,
        }
    }

    #[test]
    fn test_validate_orthomosaic_id() {
        assert!(validate_orthomosaic_id("orthomosaic_42").is_ok());
        assert_eq!(
            validate_orthomosaic_id("abc"),
            Err(TargetError::InvalidId("abc".to_string()))
        );
        assert!(validate_orthomosaic_id("").is_err());
        assert!(validate_orthomosaic_id("Orthomosaic_42").is_err());
    }

    #[test]
    fn test_append_request_errors_are_independent() {
        let request = AppendRequest {
            target: Some(OrthomosaicTarget::Id("abc".to_string())),
            confirmed: false,
        };
        assert_eq!(
            request.check(),
            vec![
                TargetError::InvalidId("abc".to_string()),
                TargetError::Unconfirmed
            ]
        );
    }

    #[test]
    fn test_append_request_confirmed_valid() {
        let request = AppendRequest {
            target: Some(OrthomosaicTarget::Id("orthomosaic_42".to_string())),
            confirmed: true,
        };
        assert!(request.check().is_empty());
    }

    #[test]
    fn test_append_without_target() {
        let request = AppendRequest {
            target: None,
            confirmed: true,
        };
        assert_eq!(request.check(), vec![TargetError::MissingId]);
        assert_eq!(
            TargetError::MissingId.to_string(),
            "No orthomosaic id given and none remembered; please enter the id to add to"
        );
    }

    #[test]
    fn test_metadata_target_skips_prefix_rule() {
        let request = AppendRequest {
            target: Some(OrthomosaicTarget::Metadata(metadata())),
            confirmed: true,
        };
        assert!(request.check().is_empty());
        assert_eq!(request.target.unwrap().id(), "orthomosaic_7");
    }

    #[test]
    fn test_metadata_json_shape() {
        let json = serde_json::to_value(metadata()).unwrap();
        assert_eq!(json["id"], "orthomosaic_7");
        assert_eq!(json["x_m_per_pixel"], 0.1);
    }
}
