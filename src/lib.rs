//! Spectral curve decoding, processing and rendering support.
//!
//! - [`data`]: the [`Curve`](data::model::Curve) model, the SPC binary
//!   decoder and the text/Parquet decoders behind a registry.
//! - [`processing`]: baseline, smoothing, derivatives, normalisation,
//!   peaks, curve algebra and interpolation.
//! - [`view`]: LTTB decimation and nearest-sample lookup for plots.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod processing;
pub mod view;

pub use config::Config;
pub use data::loader::{CurveDecoder, DecoderRegistry, TextDecoding};
pub use data::model::{Curve, CurveId, DecimatedPoint, IdSource, Peak, SequentialIds};
pub use error::{FormatError, StepParseError};
