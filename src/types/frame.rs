//! Frame and sample types

use serde::{Deserialize, Serialize};

use super::SampleValue;

/// One fixed-length window of the sample region.
///
/// Borrows from the capture buffer; frames are never mutated and never outlive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Zero-based frame index
    pub index: usize,
    /// Absolute byte offset of the frame within the capture
    pub offset: usize,
    data: &'a [u8],
}

impl<'a> Frame<'a> {
    pub fn new(index: usize, offset: usize, data: &'a [u8]) -> Self {
        Self { index, offset, data }
    }

    /// Raw frame bytes.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A named, typed value decoded from one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub name: String,
    pub value: SampleValue,
}

impl Sample {
    pub fn new(name: impl Into<String>, value: SampleValue) -> Self {
        Self { name: name.into(), value }
    }
}
