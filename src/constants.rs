// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Default orthomosaic service endpoint (must end with a slash)
pub const DEFAULT_ENDPOINT: &str = "https://ortho-mosaic.azurewebsites.net/orthomosaic/";

/// Default single-image orthorectify endpoint
pub const DEFAULT_ORTHORECTIFY_ENDPOINT: &str =
    "https://ortho-mosaic.azurewebsites.net/orthorectify/image/";

/// Path (relative to the endpoint) for adding one image to an orthomosaic
pub const UPDATE_IMAGE_PATH: &str = "update/image/";

/// Path (relative to the endpoint) for building an orthomosaic from a storage folder
pub const UPDATE_FOLDER_PATH: &str = "update/folder/";

/// Status messages starting with this prefix are milestones
pub const PROGRESS_PREFIX: &str = "Progress";

/// Manually entered orthomosaic ids must start with this prefix
pub const ORTHOMOSAIC_ID_PREFIX: &str = "orthomosaic_";

/// Settings table columns
pub mod columns {
    /// Key column matched against image names
    pub const FILE_NAME: &str = "file_name";
    pub const ROLL: &str = "roll[deg]";
    pub const PITCH: &str = "pitch[deg]";
    pub const HEADING: &str = "heading[deg]";
    pub const PROJECTED_X: &str = "projectedX[m]";
    pub const PROJECTED_Y: &str = "projectedY[m]";

    /// Required numeric columns, in the order they are checked
    pub const NUMERIC: [&str; 5] = [ROLL, PITCH, HEADING, PROJECTED_X, PROJECTED_Y];
}

/// Pitch leniency defaults (degrees)
pub mod pitch {
    /// Exclusive lower bound of an acceptable pitch
    pub const LOWER_DEG: f64 = -90.0;
    /// Exclusive upper bound of an acceptable pitch
    pub const UPPER_DEG: f64 = 0.0;
    /// Replacement for out-of-range pitch values
    pub const DEFAULT_DEG: f64 = -48.0;
}

/// Image file extensions accepted as backdown images (lowercase)
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// File extensions accepted as settings tables (lowercase)
pub const SETTINGS_EXTENSIONS: [&str; 2] = ["csv", "tsv"];

/// Candidate delimiters for the settings sniffer, in preference order
pub const DELIMITER_CANDIDATES: [char; 6] = [',', '\t', ';', '|', ':', ' '];

/// Minimum fraction of lines that must agree on a delimiter count
pub const DELIMITER_MIN_CONSISTENCY: f64 = 0.9;

/// Side crop is limited to this many pixels
pub const MAX_SIDE_CROP_PIXELS: u32 = 1000;

/// Default download resolution (metres per pixel)
pub const DEFAULT_DOWNLOAD_RESOLUTION: f64 = 0.1;

/// Directory name used under the platform config/data directories
pub const APP_DIR_NAME: &str = "orthomosaic-client";

/// Configuration file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Persisted orthomosaic reference point
pub const ORIGIN_FILE_NAME: &str = "origin.json";

/// Persisted last downloaded orthomosaic image
pub const ORTHOMOSAIC_FILE_NAME: &str = "orthomosaic.png";

/// Persisted session (last orthomosaic id)
pub const SESSION_FILE_NAME: &str = "session.json";
