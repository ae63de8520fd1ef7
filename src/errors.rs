// SPDX-License-Identifier: MPL-2.0

//! Error types for the orthomosaic client
//!
//! Validation problems are accumulated rather than returned one at a time, so
//! [`ValidationError`] values are collected into a `Vec` and only wrapped in
//! [`AppError::Validation`] at the submission gate.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Submission blocked by one or more validation errors
    Validation(Vec<ValidationError>),
    /// Remote service errors
    Remote(RemoteError),
    /// Input files could not be read or classified
    Ingest(String),
    /// Local state could not be read or written
    Storage(String),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Problems that block submission of an upload batch
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// No backdown image was supplied
    MissingImages,
    /// No settings table was supplied
    MissingSettingsFile,
    /// The settings table itself is unusable
    Schema(SchemaError),
    /// A single image could not be resolved against the table
    Match(MatchError),
    /// The append target is invalid or unconfirmed
    Target(TargetError),
}

/// Settings table structure errors
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// No candidate delimiter was consistent across lines
    UndetectableDelimiter { file: String },
    /// The table could not be parsed with the detected delimiter
    Malformed { file: String, reason: String },
    /// A required column is absent
    MissingColumn { column: String, file: String },
}

/// Per-image resolution errors
#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    /// No row with a matching `file_name`
    NoSettingsForImage { image: String },
    /// A cell of the matched row is empty or not a real number
    InvalidValue {
        image: String,
        column: String,
        value: String,
    },
}

/// Append target errors
#[derive(Debug, Clone, PartialEq)]
pub enum TargetError {
    /// Manually supplied id lacks the required prefix
    InvalidId(String),
    /// Appending was requested but no id was given or remembered
    MissingId,
    /// The operator did not confirm the target
    Unconfirmed,
}

/// Non-blocking diagnostics produced during validation
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// More than one settings candidate was uploaded
    MultipleSettingsFiles { used: String, count: usize },
    /// An invalid pitch was replaced by the default
    Leniency(LeniencyWarning),
}

/// Pitch substitution record
#[derive(Debug, Clone, PartialEq)]
pub struct LeniencyWarning {
    /// Image whose row was corrected
    pub image: String,
    /// Original cell text
    pub original: String,
    /// Value used instead
    pub replacement: f64,
}

/// Errors reported by or while talking to the remote service
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteError {
    /// Non-success HTTP status
    Http { status: u16, reason: String },
    /// Connection or body transfer failure
    Transport(String),
    /// A response line was not the expected JSON
    MalformedLine { line: String, reason: String },
    /// Downloaded image payload was not valid base64
    Decode(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => {
                write!(f, "Validation failed with {} error(s)", errors.len())?;
                for error in errors {
                    write!(f, "\n  - {}", error)?;
                }
                Ok(())
            }
            AppError::Remote(e) => write!(f, "Remote error: {}", e),
            AppError::Ingest(msg) => write!(f, "Input error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingImages => write!(f, "Please add at least one backdown image"),
            ValidationError::MissingSettingsFile => write!(
                f,
                "Please also include a (csv) file to specify the gps and camera settings for the images provided"
            ),
            ValidationError::Schema(e) => write!(f, "{}", e),
            ValidationError::Match(e) => write!(f, "{}", e),
            ValidationError::Target(e) => write!(f, "{}", e),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::UndetectableDelimiter { file } => {
                write!(f, "Could not determine the delimiter of settings file {}", file)
            }
            SchemaError::Malformed { file, reason } => {
                write!(f, "Could not parse settings file {}: {}", file, reason)
            }
            SchemaError::MissingColumn { column, file } => write!(
                f,
                "Could not find column '{}' in settings file {}",
                column, file
            ),
        }
    }
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::NoSettingsForImage { image } => {
                write!(f, "No settings were provided for image: {}", image)
            }
            MatchError::InvalidValue {
                image,
                column,
                value,
            } => write!(
                f,
                "Invalid value '{}' in column '{}' for image: {}",
                value, column, image
            ),
        }
    }
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetError::InvalidId(id) => write!(f, "{} is an invalid id", id),
            TargetError::MissingId => write!(
                f,
                "No orthomosaic id given and none remembered; please enter the id to add to"
            ),
            TargetError::Unconfirmed => write!(
                f,
                "Please confirm the orthomosaic reference point you wish to add to"
            ),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MultipleSettingsFiles { used, count } => write!(
                f,
                "Multiple settings files detected ({}). Only the first ({}) will be considered",
                count, used
            ),
            Warning::Leniency(w) => write!(f, "{}", w),
        }
    }
}

impl fmt::Display for LeniencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid pitch '{}' for image {}. Using default value {}",
            self.original, self.image, self.replacement
        )
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Http { status, reason } => write!(f, "HTTP {}: {}", status, reason),
            RemoteError::Transport(msg) => write!(f, "Request failed: {}", msg),
            RemoteError::MalformedLine { line, reason } => {
                write!(f, "Malformed response line ({}): {}", reason, line)
            }
            RemoteError::Decode(msg) => write!(f, "Invalid image payload: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for SchemaError {}
impl std::error::Error for MatchError {}
impl std::error::Error for TargetError {}
impl std::error::Error for RemoteError {}

// Conversions from sub-errors
impl From<SchemaError> for ValidationError {
    fn from(err: SchemaError) -> Self {
        ValidationError::Schema(err)
    }
}

impl From<MatchError> for ValidationError {
    fn from(err: MatchError) -> Self {
        ValidationError::Match(err)
    }
}

impl From<TargetError> for ValidationError {
    fn from(err: TargetError) -> Self {
        ValidationError::Target(err)
    }
}

impl From<LeniencyWarning> for Warning {
    fn from(warning: LeniencyWarning) -> Self {
        Warning::Leniency(warning)
    }
}

impl From<Vec<ValidationError>> for AppError {
    fn from(errors: Vec<ValidationError>) -> Self {
        AppError::Validation(errors)
    }
}

impl From<RemoteError> for AppError {
    fn from(err: RemoteError) -> Self {
        AppError::Remote(err)
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Transport(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Remote(err.into())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

// Conversions for I/O and serialization errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
