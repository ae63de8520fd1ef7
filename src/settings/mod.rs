// SPDX-License-Identifier: GPL-3.0-only

//! Per-image camera and GPS settings
//!
//! Operators describe each backdown image in one delimited text file with the
//! columns `file_name`, `roll[deg]`, `pitch[deg]`, `heading[deg]`,
//! `projectedX[m]` and `projectedY[m]`. The delimiter is detected, not assumed.
//!
//! - `sniffer`: delimiter detection
//! - `table`: parsed table and row lookup
//! - `leniency`: pitch substitution policy
//! - `plan`: resolved per-image settings
//! - `validator`: ties the above together into a [`ValidationReport`]

pub mod leniency;
pub mod plan;
pub mod sniffer;
pub mod table;
pub mod validator;

pub use leniency::PitchPolicy;
pub use plan::{CameraSettings, PlanEntry, UploadPlan};
pub use sniffer::detect_delimiter;
pub use table::SettingsTable;
pub use validator::{ValidationReport, Validator, validate};
