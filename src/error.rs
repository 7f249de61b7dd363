//! Error types shared by the readers and the analysis pipeline.

use std::path::{Path, PathBuf};

/// Errors raised while loading or analysing gridded data.
///
/// `ResourceNotFound` is recoverable: callers turn it into an empty result
/// with [`crate::reading::recover_missing`]. `InvalidInput` marks caller
/// misuse and is surfaced. Everything else is fatal.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A requested input file does not exist.
    #[error("file not found: {}", path.display())]
    ResourceNotFound { path: PathBuf },

    /// Malformed header, wrong dimensionality or misaligned time axis.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A query coordinate lies outside the loaded extent.
    #[error("coordinate ({lon}, {lat}) outside the loaded grid")]
    OutOfRange { lon: f64, lat: f64 },

    /// A numeric literal or binary record could not be decoded.
    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("netcdf error: {reason}")]
    Netcdf { reason: String },
}

impl GridError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        GridError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn not_found(path: &Path) -> Self {
        GridError::ResourceNotFound {
            path: path.to_path_buf(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GridError::ResourceNotFound { .. })
    }
}

#[cfg(feature = "netcdf")]
impl From<netcdf::Error> for GridError {
    fn from(e: netcdf::Error) -> Self {
        GridError::Netcdf {
            reason: e.to_string(),
        }
    }
}

/// Opens a file, mapping an absent path to [`GridError::ResourceNotFound`].
pub fn open_file(path: &Path) -> Result<std::fs::File, GridError> {
    std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => GridError::not_found(path),
        _ => GridError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_not_found() {
        let err = GridError::not_found(Path::new("/tmp/missing.nc"));
        assert_eq!(err.to_string(), "file not found: /tmp/missing.nc");
        assert!(err.is_not_found());
    }

    #[test]
    fn should_display_parse_location() {
        let err = GridError::Parse {
            path: PathBuf::from("grid.asc"),
            line: 7,
            reason: "bad value `x1`".to_string(),
        };
        assert_eq!(err.to_string(), "grid.asc:7: bad value `x1`");
    }

    #[test]
    fn should_map_missing_file_to_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_file(&dir.path().join("nope.asc")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn should_be_send_sync() {
        fn assert_bounds<T: Send + Sync + std::error::Error + 'static>() {}
        assert_bounds::<GridError>();
    }
}
