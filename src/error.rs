use thiserror::Error;

/// Structural failures of the binary spectral format.
///
/// These mean the input is not a file of the claimed format at all.
/// Truncated or inconsistent bodies are not errors: the decoder keeps
/// whatever samples it managed to read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("file too small for an SPC header: {len} bytes, need at least {min}")]
    TooSmall { len: usize, min: usize },

    #[error("unsupported SPC version byte 0x{0:02X} (expected 0x4B or 0x4D)")]
    UnsupportedVersion(u8),

    #[error("no curves found in SPC file")]
    NoCurves,
}

/// A processing step name that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepParseError {
    #[error("unknown processing step '{0}'")]
    Unknown(String),

    #[error("invalid window '{0}' for smoothing step")]
    InvalidWindow(String),
}
