//! Telemetry variable table types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name-indexed table of variable descriptors.
///
/// Keys are lowercased names, so lookups are case-insensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableTable {
    variables: HashMap<String, VariableDescriptor>,
    /// Total size of a telemetry frame in bytes
    pub frame_size: usize,
}

impl VariableTable {
    /// Create an empty table for frames of `frame_size` bytes.
    pub fn new(frame_size: usize) -> Self {
        Self { variables: HashMap::new(), frame_size }
    }

    /// Insert a descriptor under its lowercased name.
    ///
    /// Returns the descriptor previously stored under the same key, if any.
    pub fn insert(&mut self, descriptor: VariableDescriptor) -> Option<VariableDescriptor> {
        self.variables.insert(descriptor.key(), descriptor)
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&VariableDescriptor> {
        self.variables.get(&name.to_lowercase())
    }

    /// Check if a variable exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get the number of variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Iterate descriptors in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.variables.values()
    }

    /// Descriptors sorted by frame offset, then name.
    pub fn sorted_by_offset(&self) -> Vec<&VariableDescriptor> {
        let mut descriptors: Vec<_> = self.variables.values().collect();
        descriptors.sort_by(|a, b| a.offset.cmp(&b.offset).then_with(|| a.name.cmp(&b.name)));
        descriptors
    }
}

/// Metadata for one recorded channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    /// Variable name as written by the simulator
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Units of measurement (e.g., "m/s", "%", "s")
    pub unit: String,
    /// Physical type code, resolved through a `TypeRegistry` at extraction time
    pub type_code: i32,
    /// Byte offset within the telemetry frame
    pub offset: usize,
    /// Number of elements (1 for scalar, >1 for arrays)
    pub count: usize,
    /// Whether the simulator treats the sample count as elapsed time
    pub count_as_time: bool,
}

impl VariableDescriptor {
    /// Table key: the lowercased name.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}
