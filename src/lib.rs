// SPDX-License-Identifier: MPL-2.0

//! Orthomosaic Client - submit backdown images to an orthomosaic stitching service
//!
//! Stitching, orthorectification and tiling all happen in a remote HTTP
//! service. This crate prepares the requests: it validates the operator's
//! per-image camera/GPS settings table, wraps image bytes in base64, streams
//! the service's NDJSON status responses and keeps a little local state.
//!
//! # Architecture
//!
//! - [`ingest`]: Classification of uploaded files into images and settings
//! - [`settings`]: Settings table sniffing, parsing and validation
//! - [`orthomosaic`]: Orthomosaic references and append targets
//! - [`client`]: HTTP client, request bodies and NDJSON streaming
//! - [`upload`]: Sequential request drivers
//! - [`session`]: Current orthomosaic, passed explicitly between steps
//! - [`storage`]: Persisted state files
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! let ingested = Ingested::from_paths(&paths, None)?;
//! let report = Validator::new(config.pitch).validate(&ingested, None);
//! let plan = report.into_result()?;
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod encoding;
pub mod errors;
pub mod ingest;
pub mod orthomosaic;
pub mod session;
pub mod settings;
pub mod storage;
pub mod upload;

// Re-export commonly used types
pub use client::OrthomosaicClient;
pub use config::Config;
pub use errors::{AppError, AppResult, RemoteError, ValidationError, Warning};
pub use ingest::{ImageAsset, Ingested, Upload};
pub use orthomosaic::{AppendRequest, OrthomosaicMetadata, OrthomosaicTarget};
pub use session::Session;
pub use settings::{UploadPlan, ValidationReport, Validator};
pub use storage::StateStore;
pub use upload::StatusReporter;
