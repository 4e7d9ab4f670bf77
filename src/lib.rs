//! Decoder for iRacing IBT telemetry captures.
//!
//! An IBT file is a fixed main header, a disk sub-header, a table of variable
//! descriptors and a run of fixed-length frames recorded at the tick rate.
//! ibtrace decodes the headers and the variable table once, then walks the
//! frames and pulls out named, typed samples.
//!
//! # Features
//!
//! - **Bounds-checked decoding**: truncated captures end iteration cleanly
//! - **Case-insensitive channels**: `"Speed"`, `"speed"` and `"SPEED"` are the same
//! - **Closed type set**: int, float and double samples as a tagged [`SampleValue`]
//! - **CLI**: the `ibtrace` binary prints channel traces (feature `cli`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use ibtrace::IbtReader;
//!
//! fn main() -> ibtrace::Result<()> {
//!     let reader = IbtReader::open("/path/to/session.ibt")?;
//!
//!     for frame in reader.frames() {
//!         let speed = reader.extract(&frame, "Speed")?;
//!         println!("{}: {}", frame.index, speed.value);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

pub mod ibt;
pub mod session_info;

pub use error::*;
pub use types::*;

pub use ibt::{IbtReader, SampleExtractor};
