//! Error types for drillstat

use thiserror::Error;

/// Main error type for drillstat operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed zone geometry or unparseable request
    #[error("Invalid input: {0}")]
    Input(String),

    /// Raster sample type with no known byte size
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Reprojection, intersection or rasterization failure
    #[error("Geometry operation '{op}' failed: {reason}")]
    GeoOp { op: &'static str, reason: String },

    /// Failure reported by the raster source while decoding or encoding
    #[error("Raster source error: {0}")]
    Raster(String),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Band {band} out of range (raster has {count} bands)")]
    BandOutOfRange { band: usize, count: usize },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Coarse classification of an [`Error`], as reported to callers of a drill request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    UnsupportedFormat,
    GeoOp,
}

impl Error {
    /// Shorthand for a [`Error::GeoOp`] failure
    pub fn geo_op(op: &'static str, reason: impl Into<String>) -> Self {
        Error::GeoOp {
            op,
            reason: reason.into(),
        }
    }

    /// Map this error onto the request-level taxonomy.
    ///
    /// I/O and decoding failures come from the external raster collaborator
    /// and are reported alongside geometry failures.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Input(_)
            | Error::InvalidParameter { .. }
            | Error::BandOutOfRange { .. } => ErrorKind::Input,
            Error::UnsupportedFormat(_) | Error::InvalidDimensions { .. } => {
                ErrorKind::UnsupportedFormat
            }
            Error::Io(_) | Error::Raster(_) | Error::GeoOp { .. } => ErrorKind::GeoOp,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Input(e.to_string())
    }
}

/// Result type alias for drillstat operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::Input("bad".into()).kind(), ErrorKind::Input);
        assert_eq!(
            Error::BandOutOfRange { band: 4, count: 3 }.kind(),
            ErrorKind::Input
        );
        assert_eq!(
            Error::UnsupportedFormat("complex".into()).kind(),
            ErrorKind::UnsupportedFormat
        );
        assert_eq!(Error::geo_op("rasterize", "empty").kind(), ErrorKind::GeoOp);
    }

    #[test]
    fn test_json_error_is_input() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Input);
    }
}
