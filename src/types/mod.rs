//! Core types for telemetry data representation.
//!
//! This module provides the foundational data structures for decoding IBT
//! telemetry: channel metadata, the type-code registry, frames and samples.
//!
//! ## Architecture
//!
//! - [`VariableType`] is the closed set of numeric kinds with their widths
//! - [`TypeRegistry`] maps on-disk type codes to a [`TypeDescriptor`]
//! - [`VariableTable`] holds [`VariableDescriptor`]s keyed by lowercased name
//! - [`Frame`] is a borrowed window over one recorded tick
//! - [`Sample`] pairs a channel name with a tagged [`SampleValue`]
//!
//! ## Usage Example
//!
//! ```rust
//! use ibtrace::types::{SampleValue, TypeRegistry, VariableDescriptor, VariableTable};
//!
//! let mut table = VariableTable::new(4);
//! table.insert(VariableDescriptor {
//!     name: "RPM".to_string(),
//!     description: "Engine rpm".to_string(),
//!     unit: "revs/min".to_string(),
//!     type_code: 4,
//!     offset: 0,
//!     count: 1,
//!     count_as_time: false,
//! });
//!
//! let registry = TypeRegistry::standard();
//! let rpm = table.get("rpm").unwrap();
//! let kind = registry.lookup(rpm.type_code).unwrap().kind;
//! let frame = 4500.0f32.to_le_bytes();
//! assert_eq!(kind.decode(&frame[rpm.offset..]), Some(SampleValue::Float32(4500.0)));
//! ```

mod frame;
mod registry;
mod schema;
mod variable_type;

pub use frame::{Frame, Sample};
pub use registry::{
    TYPE_CODE_BITFIELD, TYPE_CODE_DOUBLE, TYPE_CODE_FLOAT, TYPE_CODE_INT, TypeDescriptor,
    TypeRegistry,
};
pub use schema::{VariableDescriptor, VariableTable};
pub use variable_type::{SampleValue, VariableType};
