//! Error types for telemetry decoding.
//!
//! This module provides the single error type used across the ibtrace decoder.
//! All errors implement the `std::error::Error` trait and carry structured context
//! for debugging and recovery guidance.
//!
//! ## Error Categories
//!
//! - **Malformed Header**: the source is too short or structurally inconsistent
//!   for header or variable-table decoding. Aborts the whole parse.
//! - **Unknown Variable**: a requested channel name is absent from the table.
//! - **Unsupported Type**: a descriptor carries a type code the registry does not know.
//! - **End Of Data**: graceful termination of a frame scan, not a failure.
//! - **File Errors**: problems loading an IBT file from disk.
//!
//! ## Stopping a scan
//!
//! ```rust
//! use ibtrace::TelemetryError;
//!
//! let error = TelemetryError::EndOfData;
//! if error.is_end_of_data() {
//!     // stop iterating, nothing to report
//! }
//!
//! let error = TelemetryError::unknown_variable("Speeed");
//! assert!(error.is_fatal());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Malformed header in {context}: {details}")]
    MalformedHeader { context: String, details: String },

    #[error("Variable '{name}' not found in telemetry data")]
    UnknownVariable { name: String },

    #[error("Unsupported variable type code {code}")]
    UnsupportedType { code: i32 },

    #[error("End of telemetry data")]
    EndOfData,

    #[error("IBT file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TelemetryError {
    /// Returns true for the graceful end-of-data signal.
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, TelemetryError::EndOfData)
    }

    /// Returns whether this error should abort the current operation.
    ///
    /// `EndOfData` is a clean stop condition and is never fatal.
    pub fn is_fatal(&self) -> bool {
        match self {
            TelemetryError::MalformedHeader { .. } => true,
            TelemetryError::UnknownVariable { .. } => true,
            TelemetryError::UnsupportedType { .. } => true,
            TelemetryError::File { .. } => true,
            TelemetryError::EndOfData => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TelemetryError::MalformedHeader { .. } => vec![
                "Check the file is a complete IBT capture",
                "Verify the file was not truncated while the simulator was writing it",
                "Re-export the session from the simulator",
            ],
            TelemetryError::UnknownVariable { .. } => vec![
                "Check channel name spelling",
                "List available channels with `ibtrace --list`",
                "Verify the channel is recorded for this car",
            ],
            TelemetryError::UnsupportedType { .. } => vec![
                "Register the type code with TypeRegistry::with_type",
                "Request a different channel",
            ],
            TelemetryError::EndOfData => vec!["Stop iterating; no more frames are available"],
            TelemetryError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
        }
    }

    /// Helper constructor for malformed header errors.
    pub fn malformed(context: impl Into<String>, details: impl Into<String>) -> Self {
        TelemetryError::MalformedHeader { context: context.into(), details: details.into() }
    }

    /// Helper constructor for unknown variable errors.
    pub fn unknown_variable(name: impl Into<String>) -> Self {
        TelemetryError::UnknownVariable { name: name.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TelemetryError::File { path, source }
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        TelemetryError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn error_messages_carry_their_context(
            context in ".*",
            details in ".*",
            name in "\\w+",
            code in any::<i32>()
          ) {
            let malformed = TelemetryError::malformed(context.clone(), details.clone());
            let msg = malformed.to_string();
            prop_assert!(msg.contains(&context));
            prop_assert!(msg.contains(&details));

            let unknown = TelemetryError::unknown_variable(name.clone());
            prop_assert!(unknown.to_string().contains(&name));

            let unsupported = TelemetryError::UnsupportedType { code };
            prop_assert!(unsupported.to_string().contains(&code.to_string()));
          }

          #[test]
          fn io_errors_convert_to_file_errors(reason in ".*") {
            let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, reason.clone());
            let converted: TelemetryError = io_err.into();
            match converted {
              TelemetryError::File { source, .. } => {
                prop_assert_eq!(source.to_string(), reason);
              }
              _ => prop_assert!(false, "Expected File error from io::Error conversion"),
            }
          }
        }
    }

    #[test]
    fn end_of_data_is_not_fatal() {
        let eod = TelemetryError::EndOfData;
        assert!(eod.is_end_of_data());
        assert!(!eod.is_fatal());

        let unsupported = TelemetryError::UnsupportedType { code: 99 };
        assert!(!unsupported.is_end_of_data());
        assert!(unsupported.is_fatal());
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<TelemetryError>();

        let error = TelemetryError::malformed("test", "test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn recovery_suggestions_are_descriptive() {
        let errors = [
            TelemetryError::malformed("header", "too short"),
            TelemetryError::unknown_variable("Speed"),
            TelemetryError::UnsupportedType { code: 99 },
            TelemetryError::EndOfData,
            TelemetryError::file_error(
                PathBuf::from("/test.ibt"),
                std::io::Error::new(std::io::ErrorKind::NotFound, "test"),
            ),
        ];

        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            for suggestion in suggestions {
                assert!(suggestion.len() > 5);
            }
        }
    }

    #[test]
    fn file_error_keeps_source() {
        let err = TelemetryError::file_error(
            PathBuf::from("/missing.ibt"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let source = std::error::Error::source(&err).expect("source should be preserved");
        assert_eq!(source.to_string(), "missing");
    }
}
