//! IBT file format structures and parsing
//!
//! Defines the binary structures used in iRacing's IBT file format and the
//! functions that decode them from an in-memory capture.
//!
//! ## IBT File Structure
//!
//! 1. **Main Header** (112 bytes) - `irsdk_header` compatible structure
//! 2. **Disk Sub-Header** (32 bytes) - capture timing, lap and record counts
//! 3. **Variable Headers** - `numVars` records of 144 bytes at `varHeaderOffset`
//! 4. **Session Info** - session configuration text
//! 5. **Frame Data** - `bufLen`-byte samples starting at `bufOffset`
//!
//! All fields are little-endian and addressed by absolute offset, so decoding
//! works on a byte slice without any reader state.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::types::{VariableDescriptor, VariableTable};
use crate::{Result, TelemetryError};

// Size constants for IBT format structures
pub const IRSDK_HEADER_SIZE: usize = 112;
pub const IRSDK_DISK_SUBHEADER_SIZE: usize = 32;
pub const IRSDK_VAR_HEADER_SIZE: usize = 144;
const IRSDK_VAR_NAME_SIZE: usize = 32;
const IRSDK_VAR_DESC_SIZE: usize = 64;
const IRSDK_VAR_UNIT_SIZE: usize = 32;

const VAR_NAME_OFFSET: usize = 16;
const VAR_DESC_OFFSET: usize = VAR_NAME_OFFSET + IRSDK_VAR_NAME_SIZE;
const VAR_UNIT_OFFSET: usize = VAR_DESC_OFFSET + IRSDK_VAR_DESC_SIZE;

/// IBT file header structure (matches iRacing's irsdk_header)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryHeader {
    pub version: i32,
    pub status: i32,
    pub tick_rate: i32,
    pub session_info_update: i32,
    pub session_info_len: i32,
    pub session_info_offset: i32,
    pub num_vars: i32,
    pub var_header_offset: i32,
    pub num_buf: i32,
    pub buf_len: i32,
    pub buf_offset: i32,
}

/// IBT disk sub-header
/// struct irsdk_diskSubHeader {
///   double sessionStartDate;   // 8 bytes
///   double sessionStartTime;   // 8 bytes
///   double sessionEndTime;     // 8 bytes
///   int sessionLapCount;       // 4 bytes
///   int sessionRecordCount;    // 4 bytes
/// }
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskSubHeader {
    pub start_date: f64,
    pub start_time: f64,
    pub end_time: f64,
    pub lap_count: i32,
    pub record_count: i32,
}

impl TelemetryHeader {
    /// Size of the irsdk_header structure in bytes
    pub const HEADER_SIZE: usize = IRSDK_HEADER_SIZE;

    /// Decode the header from the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        trace!("Decoding IBT header ({} bytes)", IRSDK_HEADER_SIZE);
        let header_data = data.get(..IRSDK_HEADER_SIZE).ok_or_else(|| {
            TelemetryError::malformed(
                "IBT header",
                format!("need {} bytes, have {}", IRSDK_HEADER_SIZE, data.len()),
            )
        })?;

        // struct irsdk_header {
        //   int ver;                    // offset 0
        //   int status;                 // offset 4
        //   int tickRate;               // offset 8
        //   int sessionInfoUpdate;      // offset 12
        //   int sessionInfoLen;         // offset 16
        //   int sessionInfoOffset;      // offset 20
        //   int numVars;                // offset 24
        //   int varHeaderOffset;        // offset 28
        //   int numBuf;                 // offset 32
        //   int bufLen;                 // offset 36
        //   int pad1[2];                // offset 40
        //   irsdk_varBuf varBuf[4];     // offset 48, varBuf[0].bufOffset at 52
        // }
        let header = Self {
            version: parse_i32_le(header_data, 0)?,
            status: parse_i32_le(header_data, 4)?,
            tick_rate: parse_i32_le(header_data, 8)?,
            session_info_update: parse_i32_le(header_data, 12)?,
            session_info_len: parse_i32_le(header_data, 16)?,
            session_info_offset: parse_i32_le(header_data, 20)?,
            num_vars: parse_i32_le(header_data, 24)?,
            var_header_offset: parse_i32_le(header_data, 28)?,
            num_buf: parse_i32_le(header_data, 32)?,
            buf_len: parse_i32_le(header_data, 36)?,
            buf_offset: parse_i32_le(header_data, 52)?,
        };

        debug!(
            "Parsed IBT header: version={}, tick_rate={}, num_vars={}, buf_len={}, buf_offset={}",
            header.version, header.tick_rate, header.num_vars, header.buf_len, header.buf_offset
        );

        Ok(header)
    }

    /// Structural checks: counts, lengths and offsets must be non-negative.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("Number of variables", self.num_vars),
            ("Variable header offset", self.var_header_offset),
            ("Buffer length", self.buf_len),
            ("Buffer offset", self.buf_offset),
            ("Session info length", self.session_info_len),
            ("Session info offset", self.session_info_offset),
        ];

        for (what, value) in fields {
            if value < 0 {
                return Err(TelemetryError::malformed(
                    "Header validation",
                    format!("{} cannot be negative (found {})", what, value),
                ));
            }
        }

        Ok(())
    }
}

impl DiskSubHeader {
    /// Size of the disk sub-header structure in bytes
    pub const DISK_HEADER_SIZE: usize = IRSDK_DISK_SUBHEADER_SIZE;

    /// Decode the disk sub-header, which starts right after the main header.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let end = IRSDK_HEADER_SIZE + IRSDK_DISK_SUBHEADER_SIZE;
        let disk_header_data = data.get(IRSDK_HEADER_SIZE..end).ok_or_else(|| {
            TelemetryError::malformed(
                "IBT disk sub-header",
                format!("need {} bytes, have {}", end, data.len()),
            )
        })?;

        Ok(Self {
            start_date: parse_f64_le(disk_header_data, 0)?,
            start_time: parse_f64_le(disk_header_data, 8)?,
            end_time: parse_f64_le(disk_header_data, 16)?,
            lap_count: parse_i32_le(disk_header_data, 24)?,
            record_count: parse_i32_le(disk_header_data, 28)?,
        })
    }
}

/// Decode both fixed headers from the start of a capture.
pub fn decode_headers(data: &[u8]) -> Result<(TelemetryHeader, DiskSubHeader)> {
    let minimum = IRSDK_HEADER_SIZE + IRSDK_DISK_SUBHEADER_SIZE;
    if data.len() < minimum {
        return Err(TelemetryError::malformed(
            "IBT headers",
            format!("capture is {} bytes, headers need {}", data.len(), minimum),
        ));
    }

    Ok((TelemetryHeader::parse(data)?, DiskSubHeader::parse(data)?))
}

/// Build the case-insensitive variable table from the descriptor records.
///
/// Record 0 never enters the table. Captures have been seen where it does not
/// decode to a usable descriptor, so it is skipped unconditionally; no other
/// index gets this treatment.
pub fn build_variable_table(data: &[u8], header: &TelemetryHeader) -> Result<VariableTable> {
    let num_vars = usize::try_from(header.num_vars).map_err(|_| {
        TelemetryError::malformed(
            "Variable count conversion",
            format!("Number of variables {} cannot be converted to usize", header.num_vars),
        )
    })?;
    let table_offset = usize::try_from(header.var_header_offset).map_err(|_| {
        TelemetryError::malformed(
            "Variable table offset",
            format!("offset {} is negative", header.var_header_offset),
        )
    })?;
    let frame_size = usize::try_from(header.buf_len).unwrap_or(0);

    debug!("Building variable table for {} records at offset {}", num_vars, table_offset);

    let table_end = num_vars
        .checked_mul(IRSDK_VAR_HEADER_SIZE)
        .and_then(|len| len.checked_add(table_offset))
        .ok_or_else(|| {
            TelemetryError::malformed("Variable table", "table size calculation overflowed")
        })?;
    let records = data.get(table_offset..table_end).ok_or_else(|| {
        TelemetryError::malformed(
            "Variable table",
            format!(
                "{} records at offset {} need {} bytes, capture has {}",
                num_vars,
                table_offset,
                table_end,
                data.len()
            ),
        )
    })?;

    let mut table = VariableTable::new(frame_size);

    for (index, record) in records.chunks_exact(IRSDK_VAR_HEADER_SIZE).enumerate().skip(1) {
        let Some(descriptor) = decode_descriptor(record)? else {
            debug!("Skipping unaddressable variable record {}", index);
            continue;
        };

        trace!(
            "Variable {}: {} type={} offset={} count={}",
            index, descriptor.name, descriptor.type_code, descriptor.offset, descriptor.count
        );

        if let Some(previous) = table.insert(descriptor) {
            debug!("Duplicate variable name '{}' at record {}; keeping the later one", previous.name, index);
        }
    }

    debug!("Built variable table with {} entries, frame size {}", table.len(), frame_size);
    Ok(table)
}

/// Decode one 144-byte descriptor record.
///
/// Returns `None` for records that cannot be addressed: empty name, negative
/// offset, or a count that is not positive.
fn decode_descriptor(record: &[u8]) -> Result<Option<VariableDescriptor>> {
    let type_code = parse_i32_le(record, 0)?;
    let offset = parse_i32_le(record, 4)?;
    let count = parse_i32_le(record, 8)?;
    let count_as_time = record.get(12).is_some_and(|&b| b != 0);

    let name = extract_padded_string(&record[VAR_NAME_OFFSET..VAR_NAME_OFFSET + IRSDK_VAR_NAME_SIZE]);
    let description =
        extract_padded_string(&record[VAR_DESC_OFFSET..VAR_DESC_OFFSET + IRSDK_VAR_DESC_SIZE]);
    let unit = extract_padded_string(&record[VAR_UNIT_OFFSET..VAR_UNIT_OFFSET + IRSDK_VAR_UNIT_SIZE]);

    let (Ok(offset), Ok(count)) = (usize::try_from(offset), usize::try_from(count)) else {
        return Ok(None);
    };
    if name.is_empty() || count == 0 {
        return Ok(None);
    }

    Ok(Some(VariableDescriptor { name, description, unit, type_code, offset, count, count_as_time }))
}

/// Safe byte parsing helpers with bounds checking
fn parse_i32_le(data: &[u8], offset: usize) -> Result<i32> {
    let bytes = data.get(offset..offset + 4).ok_or_else(|| {
        TelemetryError::malformed(
            "Integer parsing",
            format!(
                "Insufficient data for i32 at offset {} (need 4 bytes, have {})",
                offset,
                data.len().saturating_sub(offset)
            ),
        )
    })?;
    Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn parse_f64_le(data: &[u8], offset: usize) -> Result<f64> {
    let bytes = data.get(offset..offset + 8).ok_or_else(|| {
        TelemetryError::malformed(
            "Double precision float parsing",
            format!(
                "Insufficient data for f64 at offset {} (need 8 bytes, have {})",
                offset,
                data.len().saturating_sub(offset)
            ),
        )
    })?;
    Ok(f64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ]))
}

/// Extract a fixed-width text field, cutting at the first NUL.
///
/// Bytes after the terminator are dropped even when they are not NUL padding;
/// some writers leave stale text there, so `b"RPM\0garbage"` reads as `"RPM"`
/// rather than `"RPMgarbage"`.
fn extract_padded_string(bytes: &[u8]) -> String {
    let null_pos = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..null_pos]).to_string()
}
