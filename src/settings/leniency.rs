// SPDX-License-Identifier: GPL-3.0-only

//! Camera pitch leniency
//!
//! An out-of-range pitch is replaced by a default rather than rejected.

use crate::constants::pitch;
use serde::{Deserialize, Serialize};

/// Acceptable pitch interval (exclusive at both ends) and its replacement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchPolicy {
    pub lower_deg: f64,
    pub upper_deg: f64,
    pub default_deg: f64,
}

impl Default for PitchPolicy {
    fn default() -> Self {
        Self {
            lower_deg: pitch::LOWER_DEG,
            upper_deg: pitch::UPPER_DEG,
            default_deg: pitch::DEFAULT_DEG,
        }
    }
}

impl PitchPolicy {
    /// Strictly inside the interval; NaN is never valid
    pub fn is_valid(&self, pitch_deg: f64) -> bool {
        pitch_deg > self.lower_deg && pitch_deg < self.upper_deg
    }

    /// Pitch to use, and whether the default was substituted
    pub fn resolve(&self, pitch_deg: Option<f64>) -> (f64, bool) {
        match pitch_deg {
            Some(p) if self.is_valid(p) => (p, false),
            _ => (self.default_deg, true),
        }
    }
}
