// SPDX-License-Identifier: GPL-3.0-only

//! Request bodies sent to the orthomosaic service

use crate::encoding::encode_image;
use crate::ingest::ImageAsset;
use crate::orthomosaic::{OrthomosaicMetadata, OrthomosaicTarget};
use crate::settings::CameraSettings;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gps {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackdownImageMetadata {
    pub roll_deg: f64,
    pub pitch_deg: f64,
}

/// Which orthomosaic a request refers to
///
/// Flattened into the request body as either `"orthomosaic_id"` (null when
/// creating a new orthomosaic) or `"orthomosaic_metadata"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetField {
    OrthomosaicId(Option<String>),
    OrthomosaicMetadata(OrthomosaicMetadata),
}

impl From<Option<&OrthomosaicTarget>> for TargetField {
    fn from(target: Option<&OrthomosaicTarget>) -> Self {
        match target {
            Some(OrthomosaicTarget::Metadata(metadata)) => {
                TargetField::OrthomosaicMetadata(metadata.clone())
            }
            Some(OrthomosaicTarget::Id(id)) => TargetField::OrthomosaicId(Some(id.clone())),
            None => TargetField::OrthomosaicId(None),
        }
    }
}

/// One backdown image with its camera and GPS settings
///
/// Used both for adding to an orthomosaic and for single-image orthorectify.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackdownImageRequest {
    pub backdown_image_b64: String,
    pub gps: Gps,
    pub backdown_image_metadata: BackdownImageMetadata,
    #[serde(flatten)]
    pub target: TargetField,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_crop_pixels: Option<u32>,
}

impl BackdownImageRequest {
    /// Request adding `image` to the target (or to a new orthomosaic)
    pub fn update(
        image: &ImageAsset,
        settings: &CameraSettings,
        target: Option<&OrthomosaicTarget>,
        side_crop_pixels: u32,
    ) -> Self {
        Self {
            backdown_image_b64: encode_image(&image.bytes),
            gps: Gps {
                x: settings.projected_x_m,
                y: settings.projected_y_m,
                heading: settings.heading_deg,
            },
            backdown_image_metadata: BackdownImageMetadata {
                roll_deg: settings.roll_deg,
                pitch_deg: settings.pitch_deg,
            },
            target: target.into(),
            side_crop_pixels: Some(side_crop_pixels),
        }
    }

    /// Request orthorectifying a single image; position is irrelevant
    pub fn orthorectify(
        image: &ImageAsset,
        roll_deg: f64,
        pitch_deg: f64,
        target: Option<&OrthomosaicTarget>,
    ) -> Self {
        Self {
            backdown_image_b64: encode_image(&image.bytes),
            gps: Gps {
                x: 0.0,
                y: 0.0,
                heading: 0.0,
            },
            backdown_image_metadata: BackdownImageMetadata {
                roll_deg,
                pitch_deg,
            },
            target: target.into(),
            side_crop_pixels: None,
        }
    }
}

/// Build an orthomosaic from a folder in the service's storage account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderUpdateRequest {
    pub location: String,
    pub side_crop_pixels: u32,
}

/// Query string of a download request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadQuery {
    pub orthomosaic_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_y: Option<f64>,
}
