//! Named sample extraction from frames

use tracing::trace;

use crate::types::{
    Frame, Sample, SampleValue, TypeDescriptor, TypeRegistry, VariableDescriptor, VariableTable,
};
use crate::{Result, TelemetryError};

/// Decodes named channels out of frames using a variable table and a type registry.
#[derive(Debug, Clone, Copy)]
pub struct SampleExtractor<'a> {
    table: &'a VariableTable,
    registry: &'a TypeRegistry,
}

impl<'a> SampleExtractor<'a> {
    pub fn new(table: &'a VariableTable, registry: &'a TypeRegistry) -> Self {
        Self { table, registry }
    }

    /// Resolve a channel name to its descriptor and physical type.
    pub fn resolve(&self, name: &str) -> Result<(&'a VariableDescriptor, TypeDescriptor)> {
        let descriptor = self.table.get(name).ok_or_else(|| TelemetryError::unknown_variable(name))?;
        let ty = self.registry.lookup(descriptor.type_code)?;
        Ok((descriptor, ty))
    }

    /// Decode the first element of channel `name` from `frame`.
    ///
    /// Returns [`TelemetryError::EndOfData`] when the value lies past the end of
    /// a truncated frame. A value that does not fit inside a complete frame is a
    /// corrupt descriptor and fails with [`TelemetryError::MalformedHeader`].
    pub fn extract(&self, frame: &Frame<'_>, name: &str) -> Result<Sample> {
        let (descriptor, ty) = self.resolve(name)?;
        let value = self.decode_element(frame, descriptor, ty, 0)?;
        Ok(Sample::new(descriptor.name.clone(), value))
    }

    /// Decode every element of an array channel.
    pub fn extract_array(&self, frame: &Frame<'_>, name: &str) -> Result<Vec<SampleValue>> {
        let (descriptor, ty) = self.resolve(name)?;
        (0..descriptor.count).map(|i| self.decode_element(frame, descriptor, ty, i)).collect()
    }

    /// Decode a fixed list of channels from one frame, stopping at the first error.
    pub fn extract_row<S: AsRef<str>>(&self, frame: &Frame<'_>, channels: &[S]) -> Result<Vec<Sample>> {
        channels.iter().map(|name| self.extract(frame, name.as_ref())).collect()
    }

    fn decode_element(
        &self,
        frame: &Frame<'_>,
        descriptor: &VariableDescriptor,
        ty: TypeDescriptor,
        element: usize,
    ) -> Result<SampleValue> {
        let window = element
            .checked_mul(ty.width())
            .and_then(|rel| descriptor.offset.checked_add(rel))
            .and_then(|start| start.checked_add(ty.width()).map(|end| (start, end)));

        let bytes = window.and_then(|(start, end)| frame.data().get(start..end));
        if let Some(bytes) = bytes {
            return ty.kind.decode(bytes).ok_or(TelemetryError::EndOfData);
        }

        let frame_size = self.table.frame_size;
        if frame_size > 0 && frame.len() >= frame_size {
            return Err(TelemetryError::malformed(
                "Variable window",
                format!(
                    "'{}' element {} ({} bytes at offset {}) lies outside the {}-byte frame",
                    descriptor.name,
                    element,
                    ty.width(),
                    descriptor.offset,
                    frame_size
                ),
            ));
        }

        trace!(
            "Frame {} ends before '{}' element {} ({} of {} bytes present)",
            frame.index,
            descriptor.name,
            element,
            frame.len(),
            frame_size
        );
        Err(TelemetryError::EndOfData)
    }
}
