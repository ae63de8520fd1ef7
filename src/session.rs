// SPDX-License-Identifier: GPL-3.0-only

//! Session context shared between commands
//!
//! Holds the orthomosaic most recently reported by the service. It is passed
//! explicitly to whatever needs it and persisted by [`crate::storage`].

use crate::client::StatusLine;
use crate::orthomosaic::{OrthomosaicMetadata, OrthomosaicTarget};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Id of the current orthomosaic
    pub orthomosaic_id: Option<String>,
    /// Reference point of the current orthomosaic, when known
    pub orthomosaic_metadata: Option<OrthomosaicMetadata>,
}

impl Session {
    /// Reset to the target of a new batch (`None` starts a new orthomosaic)
    pub fn begin(&mut self, target: Option<&OrthomosaicTarget>) {
        match target {
            Some(OrthomosaicTarget::Id(id)) => {
                self.orthomosaic_id = Some(id.clone());
                self.orthomosaic_metadata = None;
            }
            Some(OrthomosaicTarget::Metadata(metadata)) => self.set_metadata(metadata.clone()),
            None => {
                self.orthomosaic_id = None;
                self.orthomosaic_metadata = None;
            }
        }
    }

    /// Take the orthomosaic reference carried by a status line, if any
    ///
    /// Returns true when the session changed.
    pub fn apply_status(&mut self, line: &StatusLine) -> bool {
        if let Some(metadata) = &line.orthomosaic_metadata {
            let changed = self.orthomosaic_metadata.as_ref() != Some(metadata);
            self.set_metadata(metadata.clone());
            return changed;
        }
        if let Some(id) = &line.orthomosaic_id {
            if self.orthomosaic_id.as_deref() == Some(id.as_str()) {
                return false;
            }
            debug!(orthomosaic_id = %id, "Session orthomosaic changed");
            self.orthomosaic_id = Some(id.clone());
            if self
                .orthomosaic_metadata
                .as_ref()
                .is_some_and(|m| m.id != *id)
            {
                self.orthomosaic_metadata = None;
            }
            return true;
        }
        false
    }

    /// Target for the next request; metadata is preferred over a bare id
    pub fn target(&self) -> Option<OrthomosaicTarget> {
        if let Some(metadata) = &self.orthomosaic_metadata {
            return Some(OrthomosaicTarget::Metadata(metadata.clone()));
        }
        self.orthomosaic_id.clone().map(OrthomosaicTarget::Id)
    }

    fn set_metadata(&mut self, metadata: OrthomosaicMetadata) {
        self.orthomosaic_id = Some(metadata.id.clone());
        self.orthomosaic_metadata = Some(metadata);
    }
}
