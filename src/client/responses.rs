// SPDX-License-Identifier: GPL-3.0-only

//! Lines of the service's NDJSON response streams

use crate::constants::PROGRESS_PREFIX;
use crate::orthomosaic::OrthomosaicMetadata;
use serde::Deserialize;

/// Status line of an upload or folder stream
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusLine {
    pub status_message: String,
    #[serde(default)]
    pub orthomosaic_id: Option<String>,
    #[serde(default)]
    pub orthomosaic_metadata: Option<OrthomosaicMetadata>,
}

impl StatusLine {
    /// Milestone messages are highlighted
    pub fn is_milestone(&self) -> bool {
        self.status_message.starts_with(PROGRESS_PREFIX)
    }
}

/// Line of a download stream; `image` is a base64 chunk, possibly absent
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TileLine {
    pub status_message: String,
    #[serde(default)]
    pub image: Option<String>,
}
