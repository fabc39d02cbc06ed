/// Data layer: core types and decoding.
///
/// Architecture:
/// ```text
///  .spc / .csv / .json / .txt / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  DecoderRegistry → CurveDecoder by extension
///   └──────────┘
///        │            (.spc goes through `spc::decode`)
///        ▼
///   ┌──────────┐
///   │  Curve    │  shared Arc<[f64]> axes, ids from an IdSource
///   └──────────┘
///        │
///        ▼
///   processing / view
/// ```

pub mod loader;
pub mod model;
pub mod spc;
