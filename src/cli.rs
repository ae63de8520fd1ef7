// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for orthomosaic operations
//!
//! This module provides command-line functionality for:
//! - Validating a settings table against backdown images
//! - Uploading images to new or existing orthomosaics
//! - Downloading and orthorectifying images

use chrono::Local;
use orthomosaic_client::client::DownloadQuery;
use orthomosaic_client::errors::RemoteError;
use orthomosaic_client::upload::{
    create_from_folder, download_orthomosaic, orthorectify_image, upload_batch,
};
use orthomosaic_client::{
    AppendRequest, Config, Ingested, OrthomosaicClient, OrthomosaicTarget, StateStore,
    StatusReporter, Upload, ValidationReport, Validator,
};
use std::path::{Path, PathBuf};

/// Prints service progress to the terminal
struct ConsoleReporter;

impl StatusReporter for ConsoleReporter {
    fn progress(&mut self, current: usize, total: usize, label: &str) {
        println!("[{}/{}] {}", current, total, label);
    }

    fn status(&mut self, message: &str, milestone: bool) {
        if milestone {
            println!("  * {}", message);
        } else {
            println!("    {}", message);
        }
    }

    fn line_error(&mut self, error: &RemoteError) {
        eprintln!("    Ignoring response line: {}", error);
    }
}

/// Options of the upload command beyond the input files
pub struct UploadArgs {
    pub side_crop_pixels: u32,
    /// `Some(None)` appends to the remembered orthomosaic
    pub append: Option<Option<String>>,
    pub append_origin: bool,
    pub confirm: bool,
}

/// Validate a settings table against images without uploading
pub fn validate(
    config: &Config,
    files: &[PathBuf],
    settings: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ingested = Ingested::from_paths(files, settings.as_deref())?;
    let report = Validator::new(config.pitch).validate(&ingested, None);
    print_report(&ingested, &report);

    if report.is_submittable() {
        println!();
        println!("Ready to upload {} image(s).", report.plan.len());
        Ok(())
    } else {
        Err(blocked_message(&report).into())
    }
}

/// Validate, then upload images one by one
pub fn upload(
    config: &Config,
    files: &[PathBuf],
    settings: Option<PathBuf>,
    args: UploadArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let store = StateStore::new(config.state_dir());
    let mut session = rt.block_on(store.load_session())?;

    let append = if let Some(id) = args.append {
        let target = id
            .or_else(|| session.orthomosaic_id.clone())
            .map(OrthomosaicTarget::Id);
        Some(AppendRequest {
            target,
            confirmed: args.confirm,
        })
    } else if args.append_origin {
        let metadata = match session.orthomosaic_metadata.clone() {
            Some(metadata) => Some(metadata),
            None => rt.block_on(store.load_origin())?,
        };
        Some(AppendRequest {
            target: metadata.map(OrthomosaicTarget::Metadata),
            confirmed: args.confirm,
        })
    } else {
        None
    };

    if let Some(target) = append.as_ref().and_then(|a| a.target.as_ref()) {
        println!("Adding to orthomosaic: {}", target.id());
    }

    let ingested = Ingested::from_paths(files, settings.as_deref())?;
    let report = Validator::new(config.pitch).validate(&ingested, append.as_ref());
    print_report(&ingested, &report);

    if !report.is_submittable() {
        return Err(blocked_message(&report).into());
    }

    println!();
    let client = OrthomosaicClient::new(config)?;
    let mut reporter = ConsoleReporter;
    let result = rt.block_on(upload_batch(
        &client,
        &mut session,
        &ingested.images,
        &report.plan,
        append.as_ref().and_then(|a| a.target.as_ref()),
        args.side_crop_pixels,
        &mut reporter,
    ));

    // Keep whatever the service reported, even when the batch stopped early
    rt.block_on(store.save_session(&session))?;

    let summary = result?;
    println!();
    println!("Uploaded {} image(s).", summary.uploaded);
    if let Some(id) = &summary.orthomosaic_id {
        println!("Orthomosaic: {}", id);
    }
    if summary.malformed_lines > 0 {
        println!(
            "{} response line(s) could not be read.",
            summary.malformed_lines
        );
    }

    Ok(())
}

/// Build an orthomosaic from a folder in the service's storage
pub fn folder(
    config: &Config,
    location: &str,
    side_crop_pixels: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let store = StateStore::new(config.state_dir());
    let mut session = rt.block_on(store.load_session())?;

    let client = OrthomosaicClient::new(config)?;
    let mut reporter = ConsoleReporter;
    let result = rt.block_on(create_from_folder(
        &client,
        &mut session,
        location,
        side_crop_pixels,
        &mut reporter,
    ));
    rt.block_on(store.save_session(&session))?;

    let summary = result?;
    println!();
    match &summary.orthomosaic_id {
        Some(id) => println!("Orthomosaic: {}", id),
        None => println!("The service did not report an orthomosaic id."),
    }
    if summary.malformed_lines > 0 {
        println!(
            "{} response line(s) could not be read.",
            summary.malformed_lines
        );
    }
    Ok(())
}

/// Download an orthomosaic into the state directory
pub fn download(
    config: &Config,
    id: Option<String>,
    resolution: f64,
    origin_x: f64,
    origin_y: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let store = StateStore::new(config.state_dir());
    let mut session = rt.block_on(store.load_session())?;

    let Some(orthomosaic_id) = id.or_else(|| session.orthomosaic_id.clone()) else {
        return Err("No orthomosaic id given and none remembered; use --id".into());
    };

    let query = DownloadQuery {
        orthomosaic_id,
        resolution: Some(resolution),
        origin_x: Some(origin_x),
        origin_y: Some(origin_y),
    };

    let client = OrthomosaicClient::new(config)?;
    let mut reporter = ConsoleReporter;
    let downloaded = rt.block_on(download_orthomosaic(&client, &query, &mut reporter))?;
    let path = rt.block_on(store.save_orthomosaic(&downloaded.image_bytes))?;

    if session.orthomosaic_id.as_deref() != Some(downloaded.orthomosaic_id.as_str()) {
        session.begin(Some(&OrthomosaicTarget::Id(downloaded.orthomosaic_id.clone())));
        rt.block_on(store.save_session(&session))?;
    }

    println!();
    println!(
        "Orthomosaic {} saved to: {} ({} chunk(s), {} bytes)",
        downloaded.orthomosaic_id,
        path.display(),
        downloaded.chunks,
        downloaded.image_bytes.len()
    );
    Ok(())
}

/// Orthorectify a single image and save the result
pub fn orthorectify(
    config: &Config,
    image: &Path,
    roll_deg: f64,
    pitch_deg: f64,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let Upload::Image(asset) = Upload::read(image)? else {
        return Err(format!("{} is not a backdown image", image.display()).into());
    };

    let rt = tokio::runtime::Runtime::new()?;
    let store = StateStore::new(config.state_dir());
    let session = rt.block_on(store.load_session())?;
    let client = OrthomosaicClient::new(config)?;

    println!(
        "Orthorectifying {} (roll {}, pitch {})...",
        asset.file_name, roll_deg, pitch_deg
    );
    let bytes = rt.block_on(orthorectify_image(
        &client, &session, &asset, roll_deg, pitch_deg,
    ))?;

    let output_path = output.unwrap_or_else(|| {
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        PathBuf::from(format!("orthorectified_{}.png", timestamp))
    });
    std::fs::write(&output_path, &bytes)?;

    println!("Orthorectified image saved to: {}", output_path.display());
    Ok(())
}

/// Show the remembered orthomosaic and stored files
pub fn show_session(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let store = StateStore::new(config.state_dir());
    let session = rt.block_on(store.load_session())?;
    let origin = rt.block_on(store.load_origin())?;

    println!("State directory: {}", store.dir().display());
    println!();
    match &session.orthomosaic_id {
        Some(id) => println!("Current orthomosaic: {}", id),
        None => println!("Current orthomosaic: none"),
    }

    match origin {
        Some(origin) => {
            println!("Stored origin ({}):", origin.id);
            println!("  x: {} m, y: {} m", origin.x_m, origin.y_m);
            println!(
                "  scale: {} x {} m/pixel",
                origin.x_m_per_pixel, origin.y_m_per_pixel
            );
        }
        None => println!("Stored origin: none"),
    }

    let image_path = store.orthomosaic_path();
    if image_path.exists() {
        println!("Downloaded orthomosaic: {}", image_path.display());
    }

    Ok(())
}

/// Print the detected delimiter, diagnostics and the resolved plan
fn print_report(ingested: &Ingested, report: &ValidationReport) {
    if let Some(file) = &report.settings_file {
        match report.delimiter {
            Some(delimiter) => println!(
                "{} delimiter detected for settings file {}",
                delimiter_name(delimiter),
                file
            ),
            None => println!("Settings file: {}", file),
        }
    }
    println!("Images: {}", ingested.images.len());

    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }

    if !report.plan.is_empty() {
        println!();
        println!(
            "  {:<24} {:>9} {:>9} {:>9} {:>14} {:>14}",
            "IMAGE", "ROLL", "PITCH", "HEADING", "X (m)", "Y (m)"
        );
        for entry in &report.plan {
            match &entry.settings {
                Some(s) => println!(
                    "  {:<24} {:>9.3} {:>9.3} {:>9.3} {:>14.3} {:>14.3}",
                    entry.image,
                    s.roll_deg,
                    s.pitch_deg,
                    s.heading_deg,
                    s.projected_x_m,
                    s.projected_y_m
                ),
                None => println!("  {:<24} {:>9}", entry.image, "-"),
            }
        }
    }

    if !report.errors.is_empty() {
        println!();
        for error in &report.errors {
            println!("Error: {}", error);
        }
    }
}

fn blocked_message(report: &ValidationReport) -> String {
    if report.settings_error_count() > 0 {
        "Please fix errors related to the settings (csv file)".to_string()
    } else {
        format!("Submission blocked by {} error(s)", report.errors.len())
    }
}

fn delimiter_name(delimiter: char) -> String {
    match delimiter {
        ',' => "Comma".to_string(),
        '\t' => "Tab".to_string(),
        ';' => "Semicolon".to_string(),
        '|' => "Pipe".to_string(),
        ' ' => "Space".to_string(),
        other => format!("'{}'", other),
    }
}
