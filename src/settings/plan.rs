// SPDX-License-Identifier: GPL-3.0-only

//! Resolved per-image upload plan

use serde::Serialize;

/// Camera attitude and GPS position for one backdown image
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraSettings {
    pub roll_deg: f64,
    pub pitch_deg: f64,
    pub heading_deg: f64,
    pub projected_x_m: f64,
    pub projected_y_m: f64,
}

/// One slot of the plan; `settings` is `None` when the image could not be resolved
#[derive(Debug, Clone, PartialEq)]
pub struct PlanEntry {
    /// Image name (file stem)
    pub image: String,
    pub settings: Option<CameraSettings>,
}

impl PlanEntry {
    pub fn is_valid(&self) -> bool {
        self.settings.is_some()
    }
}

/// Plan entries in image upload order, one per image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadPlan {
    entries: Vec<PlanEntry>,
}

impl UploadPlan {
    pub fn new(entries: Vec<PlanEntry>) -> Self {
        Self { entries }
    }

    /// Plan of null entries, one per image name
    pub fn unresolved<'a>(images: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(
            images
                .into_iter()
                .map(|image| PlanEntry {
                    image: image.to_string(),
                    settings: None,
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every entry has settings
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(PlanEntry::is_valid)
    }
}

impl<'a> IntoIterator for &'a UploadPlan {
    type Item = &'a PlanEntry;
    type IntoIter = std::slice::Iter<'a, PlanEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
