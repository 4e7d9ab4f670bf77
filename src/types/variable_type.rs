//! Telemetry variable type definitions

use serde::{Deserialize, Serialize};

/// Numeric kinds a telemetry channel can decode to.
///
/// Each kind has a fixed on-disk width and a little-endian decode routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableType {
    /// 32-bit signed integer (irsdk_int)
    Int32,
    /// 32-bit IEEE float (irsdk_float)
    Float32,
    /// 64-bit IEEE float (irsdk_double)
    Float64,
}

impl VariableType {
    /// Returns the size in bytes of this data type.
    pub const fn size(&self) -> usize {
        match self {
            VariableType::Int32 | VariableType::Float32 => 4,
            VariableType::Float64 => 8,
        }
    }

    /// Decode one value from the start of `bytes`.
    ///
    /// Reads exactly [`size`](Self::size) bytes; returns `None` when fewer are available.
    pub fn decode(&self, bytes: &[u8]) -> Option<SampleValue> {
        match self {
            VariableType::Int32 => {
                let raw: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
                Some(SampleValue::Int32(i32::from_le_bytes(raw)))
            }
            VariableType::Float32 => {
                let raw: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
                Some(SampleValue::Float32(f32::from_le_bytes(raw)))
            }
            VariableType::Float64 => {
                let raw: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
                Some(SampleValue::Float64(f64::from_le_bytes(raw)))
            }
        }
    }
}

/// A decoded sample value, tagged by its numeric kind.
///
/// Serializes externally tagged (`{"Float64": 1234.5}`) so the kind survives a
/// round trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SampleValue {
    Int32(i32),
    Float32(f32),
    Float64(f64),
}

impl SampleValue {
    /// The kind this value was decoded as.
    pub const fn kind(&self) -> VariableType {
        match self {
            SampleValue::Int32(_) => VariableType::Int32,
            SampleValue::Float32(_) => VariableType::Float32,
            SampleValue::Float64(_) => VariableType::Float64,
        }
    }

    /// Widen to `f64` for arithmetic and display.
    pub fn as_f64(&self) -> f64 {
        match *self {
            SampleValue::Int32(v) => f64::from(v),
            SampleValue::Float32(v) => f64::from(v),
            SampleValue::Float64(v) => v,
        }
    }

    /// Integer view; `None` for floating point values.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            SampleValue::Int32(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for SampleValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleValue::Int32(v) => write!(f, "{}", v),
            SampleValue::Float32(v) => write!(f, "{}", v),
            SampleValue::Float64(v) => write!(f, "{}", v),
        }
    }
}
