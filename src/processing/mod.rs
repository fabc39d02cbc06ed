//! Pure numerical transforms on curves.
//!
//! Nothing in here mutates its input. Functions working on raw slices read
//! the first `min(len(x), len(y))` samples; functions taking a [`Curve`]
//! return a new curve with an id drawn from the caller's
//! [`IdSource`](crate::data::model::IdSource).
//!
//! [`Curve`]: crate::data::model::Curve

pub mod algebra;
pub mod baseline;
pub mod derivative;
pub mod interpolate;
pub mod normalize;
pub mod peaks;
pub mod pipeline;
pub mod smoothing;

pub use peaks::PeakParams;
pub use pipeline::{apply_steps, ProcessingStep};
