// SPDX-License-Identifier: GPL-3.0-only

//! Parsed settings table

use crate::errors::SchemaError;
use crate::ingest::SettingsUpload;
use crate::settings::sniffer::detect_delimiter;
use tracing::{debug, info};

/// Header and rows of a delimited settings file, cells kept as text
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsTable {
    file_name: String,
    delimiter: char,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SettingsTable {
    /// Sniff the delimiter of an uploaded table and parse it
    pub fn from_upload(upload: &SettingsUpload) -> Result<Self, SchemaError> {
        let delimiter =
            detect_delimiter(&upload.text).ok_or_else(|| SchemaError::UndetectableDelimiter {
                file: upload.file_name.clone(),
            })?;
        info!(file = %upload.file_name, delimiter = ?delimiter, "Delimiter detected");
        Self::parse(&upload.file_name, &upload.text, delimiter)
    }

    /// Parse text with a known delimiter
    ///
    /// Cells are trimmed and rows may be shorter or longer than the header.
    pub fn parse(file_name: &str, text: &str, delimiter: char) -> Result<Self, SchemaError> {
        let malformed = |reason: String| SchemaError::Malformed {
            file: file_name.to_string(),
            reason,
        };

        let delimiter_byte = u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| malformed(format!("unsupported delimiter {:?}", delimiter)))?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter_byte)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| malformed(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| malformed(e.to_string()))?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!(
            file = file_name,
            columns = headers.len(),
            rows = rows.len(),
            "Parsed settings table"
        );

        Ok(Self {
            file_name: file_name.to_string(),
            delimiter,
            headers,
            rows,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Index of the first column with this exact header
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// First row whose `key_column` cell equals `key` exactly
    pub fn find_row(&self, key_column: usize, key: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|row| row.get(key_column).is_some_and(|cell| cell == key))
            .map(Vec::as_slice)
    }
}
