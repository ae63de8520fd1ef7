// SPDX-License-Identifier: MPL-2.0

//! Base64 wrapping of image payloads
//!
//! Images travel to and from the service as standard (padded) base64 text.
//! No image codec work happens here.

use crate::errors::RemoteError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Encode raw image bytes as base64 text
pub fn encode_image(image_bytes: &[u8]) -> String {
    STANDARD.encode(image_bytes)
}

/// Decode base64 text back into image bytes
///
/// Surrounding whitespace is ignored so that chunked payloads joined with
/// stray newlines still decode.
pub fn decode_image(image_b64: &str) -> Result<Vec<u8>, RemoteError> {
    STANDARD
        .decode(image_b64.trim())
        .map_err(|e| RemoteError::Decode(e.to_string()))
}
