//! IBT file reading and decoding support
//!
//! Header and variable-table decoding live in [`format`], frame slicing in
//! [`frames`], typed channel extraction in [`extract`], and [`IbtReader`] ties
//! them together over one in-memory capture.

pub mod extract;
pub mod format;
pub mod frames;
pub mod reader;

pub use extract::SampleExtractor;
pub use format::{DiskSubHeader, TelemetryHeader, build_variable_table, decode_headers};
pub use frames::FrameIterator;
pub use reader::{ChannelScan, IbtReader, lap_equals};
