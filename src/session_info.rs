//! Session info text extraction
//!
//! The session-info block is structured text describing the track, car and
//! session. This module only locates and cleans it; parsing is left to callers.

use crate::{Result, TelemetryError};

/// Extract the session-info text from a capture buffer
///
/// Handles NUL-terminated strings and validates UTF-8 encoding.
pub fn extract_session_info(data: &[u8], offset: i32, length: i32) -> Result<String> {
    if offset < 0 {
        return Err(TelemetryError::malformed(
            "Session info extraction",
            format!("Invalid offset: {}", offset),
        ));
    }

    if length <= 0 {
        return Ok(String::new());
    }

    let offset = offset as usize;
    let length = length as usize;

    let text_data = data.get(offset..offset + length).ok_or_else(|| {
        TelemetryError::malformed(
            "Session info extraction",
            format!(
                "Session info extends beyond buffer bounds: offset={}, len={}, buffer_size={}",
                offset,
                length,
                data.len()
            ),
        )
    })?;

    let text_len = text_data.iter().position(|&b| b == 0).unwrap_or(length);

    let text = std::str::from_utf8(&text_data[..text_len]).map_err(|e| {
        TelemetryError::malformed("Session info UTF-8 conversion", e.to_string())
    })?;

    Ok(text.to_string())
}

/// Remove control characters other than newline, carriage return and tab.
pub fn strip_control_characters(text: &str) -> String {
    text.chars()
        .filter(|ch| !matches!(ch, '\x00'..='\x08' | '\x0B'..='\x0C' | '\x0E'..='\x1F'))
        .collect()
}
