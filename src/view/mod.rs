//! Screen-side helpers: LTTB decimation, nearest-sample lookup and the
//! viewport glue that ties them to a plot.

pub mod decimate;
pub mod lookup;
pub mod viewport;

pub use decimate::decimate;
pub use lookup::binary_search_closest;
pub use viewport::{render_window, visible_range, LinearPixelMap, RenderSettings};
