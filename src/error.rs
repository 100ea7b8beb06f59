use thiserror::Error;

/// Errors raised while validating inputs or producing a figure.
///
/// Every validation error is returned before any pixel is drawn.
#[derive(Debug, Error)]
pub enum PlotError {
    /// Input array has an unsupported shape or dimensionality
    #[error("invalid image data: {0}")]
    InvalidData(String),

    /// Slicing axis outside `-ndim..ndim`
    #[error("axis {axis} is out of bounds for an array with {ndim} dimensions")]
    InvalidAxis { axis: isize, ndim: usize },

    /// A per-cell option was given with the wrong number of values
    #[error("'{name}' has {got} values but the grid has {expected} cells")]
    ParamLength {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Two options that cannot be used together
    #[error("{0}")]
    ExclusiveOptions(String),

    /// An option value that cannot be interpreted
    #[error("invalid value for '{name}': {reason}")]
    InvalidOption { name: String, reason: String },

    #[error("'{name}' filter is not implemented. Available filters: {available}")]
    UnknownFilter { name: String, available: String },

    #[error("unknown colormap '{name}'. Available colormaps: {available}")]
    UnknownColormap { name: String, available: String },

    #[error("unknown dataset '{name}'. Available datasets: {available}")]
    UnknownDataset { name: String, available: String },

    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    Checksum {
        file: String,
        expected: String,
        actual: String,
    },

    /// Drawing backend failure
    #[error("render error: {0}")]
    Render(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("NPY error: {0}")]
    Npy(#[from] ndarray_npy::ReadNpyError),
}

impl PlotError {
    pub(crate) fn invalid_option(name: impl Into<String>, reason: impl Into<String>) -> Self {
        PlotError::InvalidOption {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Type alias for Results using PlotError
pub type Result<T> = std::result::Result<T, PlotError>;
