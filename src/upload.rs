// SPDX-License-Identifier: GPL-3.0-only

//! Request drivers
//!
//! Each operation issues its requests strictly one after another and feeds
//! the streamed status lines to a [`StatusReporter`]:
//! - [`upload_batch`]: add images to an orthomosaic, one request per image
//! - [`create_from_folder`]: build an orthomosaic from a storage folder
//! - [`download_orthomosaic`]: fetch and reassemble an orthomosaic image
//! - [`orthorectify_image`]: orthorectify a single image
//!
//! A failed request stops the operation. A line that cannot be parsed is
//! reported and the rest of its stream is still consumed.

use crate::client::{
    BackdownImageRequest, DownloadQuery, FolderUpdateRequest, OrthomosaicClient, StatusLine,
    TileLine, ndjson_lines, parse_line,
};
use crate::encoding::decode_image;
use crate::errors::{AppError, AppResult, MatchError, RemoteError, ValidationError};
use crate::ingest::ImageAsset;
use crate::orthomosaic::OrthomosaicTarget;
use crate::session::Session;
use crate::settings::UploadPlan;
use futures::StreamExt;
use tracing::{error, info, warn};

/// Receives progress and status updates while requests run
pub trait StatusReporter {
    /// Called before request `current` of `total` (1-based)
    fn progress(&mut self, current: usize, total: usize, label: &str);

    /// A status message from the service
    fn status(&mut self, message: &str, milestone: bool);

    /// A response line that could not be used
    fn line_error(&mut self, error: &RemoteError);
}

/// Outcome of an upload batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadSummary {
    /// Images whose request completed
    pub uploaded: usize,
    /// Orthomosaic the batch ended on
    pub orthomosaic_id: Option<String>,
    /// Response lines that could not be parsed
    pub malformed_lines: usize,
}

/// Upload every image of a validated plan, in order
///
/// The first request goes to `target` (or creates a new orthomosaic); every
/// later request goes to the orthomosaic most recently reported by the
/// service, so the batch builds one orthomosaic.
pub async fn upload_batch(
    client: &OrthomosaicClient,
    session: &mut Session,
    images: &[ImageAsset],
    plan: &UploadPlan,
    target: Option<&OrthomosaicTarget>,
    side_crop_pixels: u32,
    reporter: &mut dyn StatusReporter,
) -> AppResult<UploadSummary> {
    if images.len() != plan.len() {
        return Err(AppError::Other(format!(
            "Upload plan has {} entries for {} images",
            plan.len(),
            images.len()
        )));
    }

    let run_id = uuid::Uuid::new_v4();
    info!(%run_id, images = images.len(), target = ?target.map(|t| t.id()), "Starting upload batch");

    session.begin(target);
    let mut summary = UploadSummary::default();
    let total = images.len();

    for (index, (image, entry)) in images.iter().zip(plan).enumerate() {
        let Some(settings) = &entry.settings else {
            return Err(AppError::Validation(vec![ValidationError::Match(
                MatchError::NoSettingsForImage {
                    image: entry.image.clone(),
                },
            )]));
        };

        let current_target = session.target();
        reporter.progress(
            index + 1,
            total,
            &format!(
                "Adding Backdown Image {} to Orthomosaic {}",
                image.file_name,
                current_target.as_ref().map_or("(new)", |t| t.id())
            ),
        );

        let request =
            BackdownImageRequest::update(image, settings, current_target.as_ref(), side_crop_pixels);
        let response = client.update_image(&request).await.inspect_err(|e| {
            error!(%run_id, image = %image.name, error = %e, "Upload request failed");
        })?;

        summary.malformed_lines += consume_status_stream(response, session, reporter, false).await?;
        summary.uploaded += 1;
        info!(%run_id, image = %image.name, orthomosaic_id = ?session.orthomosaic_id, "Image uploaded");
    }

    summary.orthomosaic_id = session.orthomosaic_id.clone();
    Ok(summary)
}

/// Outcome of a folder-based build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderSummary {
    /// Orthomosaic reported by the service, if any
    pub orthomosaic_id: Option<String>,
    /// Response lines that could not be parsed
    pub malformed_lines: usize,
}

/// Build an orthomosaic from a folder in the service's storage account
pub async fn create_from_folder(
    client: &OrthomosaicClient,
    session: &mut Session,
    location: &str,
    side_crop_pixels: u32,
    reporter: &mut dyn StatusReporter,
) -> AppResult<FolderSummary> {
    reporter.progress(
        1,
        1,
        &format!("Downloading images from Azure Storage: {}", location),
    );

    let request = FolderUpdateRequest {
        location: location.to_string(),
        side_crop_pixels,
    };
    let response = client.update_folder(&request).await?;
    session.begin(None);
    let malformed_lines = consume_status_stream(response, session, reporter, true).await?;
    Ok(FolderSummary {
        orthomosaic_id: session.orthomosaic_id.clone(),
        malformed_lines,
    })
}

/// Read a status stream into the session
///
/// With `announce_id`, every milestone is followed by the current orthomosaic
/// id. Returns the number of malformed lines.
async fn consume_status_stream(
    response: reqwest::Response,
    session: &mut Session,
    reporter: &mut dyn StatusReporter,
    announce_id: bool,
) -> Result<usize, RemoteError> {
    let lines = ndjson_lines(response);
    futures::pin_mut!(lines);

    let mut malformed = 0;
    while let Some(line) = lines.next().await {
        match line.and_then(|line| parse_line::<StatusLine>(&line)) {
            Ok(status) => {
                session.apply_status(&status);
                let milestone = status.is_milestone();
                reporter.status(&status.status_message, milestone);
                if milestone
                    && announce_id
                    && let Some(id) = &session.orthomosaic_id
                {
                    reporter.status(&format!("Orthomosaics: {}", id), true);
                }
            }
            Err(e @ RemoteError::MalformedLine { .. }) => {
                warn!(error = %e, "Skipping malformed status line");
                malformed += 1;
                reporter.line_error(&e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(malformed)
}

/// A downloaded orthomosaic image
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedOrthomosaic {
    pub orthomosaic_id: String,
    pub image_bytes: Vec<u8>,
    /// Number of image chunks received
    pub chunks: usize,
}

/// Download an orthomosaic, concatenating its base64 chunks before decoding
pub async fn download_orthomosaic(
    client: &OrthomosaicClient,
    query: &DownloadQuery,
    reporter: &mut dyn StatusReporter,
) -> AppResult<DownloadedOrthomosaic> {
    reporter.progress(
        1,
        1,
        &format!("Downloading tiles for orthomosaic {}", query.orthomosaic_id),
    );

    let response = client.download(query).await?;
    let lines = ndjson_lines(response);
    futures::pin_mut!(lines);

    let mut image_b64 = String::new();
    let mut chunks = 0;
    while let Some(line) = lines.next().await {
        match line.and_then(|line| parse_line::<TileLine>(&line)) {
            Ok(tile) => {
                reporter.status(&tile.status_message, false);
                if let Some(chunk) = tile.image.filter(|c| !c.is_empty()) {
                    image_b64.push_str(&chunk);
                    chunks += 1;
                }
            }
            Err(e @ RemoteError::MalformedLine { .. }) => {
                warn!(error = %e, "Skipping malformed tile line");
                reporter.line_error(&e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if image_b64.is_empty() {
        return Err(AppError::Other(format!(
            "No image data received for orthomosaic {}",
            query.orthomosaic_id
        )));
    }

    let image_bytes = decode_image(&image_b64)?;
    info!(
        orthomosaic_id = %query.orthomosaic_id,
        chunks,
        size = image_bytes.len(),
        "Orthomosaic downloaded"
    );
    Ok(DownloadedOrthomosaic {
        orthomosaic_id: query.orthomosaic_id.clone(),
        image_bytes,
        chunks,
    })
}

/// Orthorectify one image against the session's orthomosaic, if any
///
/// A roll and pitch of exactly zero is rejected before any request is made.
pub async fn orthorectify_image(
    client: &OrthomosaicClient,
    session: &Session,
    image: &ImageAsset,
    roll_deg: f64,
    pitch_deg: f64,
) -> AppResult<Vec<u8>> {
    if roll_deg == 0.0 && pitch_deg == 0.0 {
        return Err(AppError::Other(
            "Camera roll or pitch must be non-zero to orthorectify".to_string(),
        ));
    }

    let target = session.orthomosaic_id.clone().map(OrthomosaicTarget::Id);
    let request = BackdownImageRequest::orthorectify(image, roll_deg, pitch_deg, target.as_ref());
    let bytes = client.orthorectify(&request).await?;
    info!(image = %image.name, size = bytes.len(), "Image orthorectified");
    Ok(bytes)
}
