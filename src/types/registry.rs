//! Physical type code registry
//!
//! Maps the `type` field of a variable descriptor to a [`VariableType`].
//! The registry is built once and passed by reference to whatever needs it;
//! extending it produces a new value instead of mutating shared state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::VariableType;
use crate::{Result, TelemetryError};

/// irsdk_int
pub const TYPE_CODE_INT: i32 = 2;
/// irsdk_bitField
pub const TYPE_CODE_BITFIELD: i32 = 3;
/// irsdk_float
pub const TYPE_CODE_FLOAT: i32 = 4;
/// irsdk_double
pub const TYPE_CODE_DOUBLE: i32 = 5;

/// Resolved physical type: the code as stored on disk plus its decoded kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub code: i32,
    pub kind: VariableType,
}

impl TypeDescriptor {
    /// Byte width of a single element.
    pub const fn width(&self) -> usize {
        self.kind.size()
    }
}

/// Immutable lookup table from physical type code to [`TypeDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRegistry {
    types: HashMap<i32, TypeDescriptor>,
}

impl TypeRegistry {
    /// Registry with the codes observed in IBT captures: int, float and double.
    pub fn standard() -> Self {
        Self::empty()
            .with_type(TYPE_CODE_INT, VariableType::Int32)
            .with_type(TYPE_CODE_FLOAT, VariableType::Float32)
            .with_type(TYPE_CODE_DOUBLE, VariableType::Float64)
    }

    /// Registry that resolves nothing.
    pub fn empty() -> Self {
        Self { types: HashMap::new() }
    }

    /// Returns a registry that additionally maps `code` to `kind`.
    ///
    /// ```rust
    /// use ibtrace::types::{TypeRegistry, VariableType, TYPE_CODE_BITFIELD};
    ///
    /// let registry = TypeRegistry::standard().with_type(TYPE_CODE_BITFIELD, VariableType::Int32);
    /// assert_eq!(registry.lookup(TYPE_CODE_BITFIELD).unwrap().width(), 4);
    /// ```
    pub fn with_type(mut self, code: i32, kind: VariableType) -> Self {
        self.types.insert(code, TypeDescriptor { code, kind });
        self
    }

    /// Resolve a type code, failing with `UnsupportedType` for unregistered codes.
    pub fn lookup(&self, code: i32) -> Result<TypeDescriptor> {
        self.types.get(&code).copied().ok_or(TelemetryError::UnsupportedType { code })
    }

    /// Whether `code` resolves.
    pub fn supports(&self, code: i32) -> bool {
        self.types.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
