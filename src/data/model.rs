use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MetaValue – a single provenance entry
// ---------------------------------------------------------------------------

/// A loosely-typed provenance value (format name, version, header codes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Text(s) => write!(f, "{s}"),
            MetaValue::Integer(i) => write!(f, "{i}"),
            MetaValue::Float(v) => write!(f, "{v:.4}"),
        }
    }
}

impl MetaValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Float(v) => Some(*v),
            MetaValue::Integer(i) => Some(*i as f64),
            MetaValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Integer(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Float(value)
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identifier stamped on every curve at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurveId(pub u64);

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "curve-{}", self.0)
    }
}

/// Strategy for minting curve identifiers.
///
/// Every operation that creates a curve takes one of these, so callers
/// decide whether ids come from a counter, an arena index or anything else.
pub trait IdSource {
    fn next_id(&mut self) -> CurveId;
}

/// Monotonic counter starting at a caller-chosen value.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> CurveId {
        let id = CurveId(self.next);
        self.next += 1;
        id
    }
}

// ---------------------------------------------------------------------------
// Classification and styling
// ---------------------------------------------------------------------------

/// Spectroscopy technique a curve was recorded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurveKind {
    Infrared,
    Raman,
    NearInfrared,
    UvVis,
    Fluorescence,
    Other,
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CurveKind::Infrared => "infrared",
            CurveKind::Raman => "raman",
            CurveKind::NearInfrared => "near-infrared",
            CurveKind::UvVis => "uv-visible",
            CurveKind::Fluorescence => "fluorescence",
            CurveKind::Other => "other",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Presentation metadata. The processing core copies it, never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveStyle {
    /// `#rrggbb` colour, assigned by the loader.
    pub color: Option<String>,
    pub visible: bool,
    pub line_style: LineStyle,
    pub line_width: f32,
}

impl Default for CurveStyle {
    fn default() -> Self {
        Self {
            color: None,
            visible: true,
            line_style: LineStyle::Solid,
            line_width: 1.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Curve – one spectrum
// ---------------------------------------------------------------------------

/// A single spectrum: paired x/y samples plus metadata.
///
/// The sample arrays are immutable and reference counted. Derived curves
/// that keep the same x-axis share its allocation with their parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curve {
    pub id: CurveId,
    pub label: String,
    /// Wavenumber / wavelength / shift axis.
    pub x: Arc<[f64]>,
    /// Intensity axis. Should match `x` in length; readers truncate if not.
    pub y: Arc<[f64]>,
    pub x_unit: Option<String>,
    pub y_unit: Option<String>,
    pub kind: Option<CurveKind>,
    pub style: CurveStyle,
    pub meta: BTreeMap<String, MetaValue>,
}

impl Curve {
    pub fn new(
        id: CurveId,
        label: impl Into<String>,
        x: impl Into<Arc<[f64]>>,
        y: impl Into<Arc<[f64]>>,
    ) -> Self {
        Curve {
            id,
            label: label.into(),
            x: x.into(),
            y: y.into(),
            x_unit: None,
            y_unit: None,
            kind: None,
            style: CurveStyle::default(),
            meta: BTreeMap::new(),
        }
    }

    /// Number of usable samples, `min(len(x), len(y))`.
    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Both axes truncated to [`Curve::len`].
    pub fn samples(&self) -> (&[f64], &[f64]) {
        let n = self.len();
        (&self.x[..n], &self.y[..n])
    }

    /// The x-axis truncated to `n` samples, sharing the allocation when
    /// no truncation is needed.
    pub fn x_prefix(&self, n: usize) -> Arc<[f64]> {
        if n >= self.x.len() {
            Arc::clone(&self.x)
        } else {
            Arc::from(&self.x[..n])
        }
    }

    /// Build a new curve from this one with replaced intensities.
    ///
    /// Units, kind, style and metadata are carried over, `meta["source"]`
    /// records the parent id and the label becomes `"<label> (<operation>)"`.
    pub fn derive(&self, id: CurveId, operation: &str, y: Vec<f64>) -> Curve {
        let x = self.x_prefix(y.len());
        let mut meta = self.meta.clone();
        meta.insert("source".to_string(), MetaValue::Text(self.id.to_string()));
        Curve {
            id,
            label: format!("{} ({operation})", self.label),
            x,
            y: y.into(),
            x_unit: self.x_unit.clone(),
            y_unit: self.y_unit.clone(),
            kind: self.kind,
            style: self.style.clone(),
            meta,
        }
    }

    pub fn with_units(mut self, x_unit: Option<String>, y_unit: Option<String>) -> Self {
        self.x_unit = x_unit;
        self.y_unit = y_unit;
        self
    }

    pub fn with_kind(mut self, kind: Option<CurveKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Analysis outputs
// ---------------------------------------------------------------------------

/// A detected local maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub x: f64,
    pub y: f64,
    /// Sample index within the source curve.
    pub index: usize,
    pub prominence: f64,
    pub label: Option<String>,
    pub curve_id: Option<CurveId>,
}

/// A screen-space point tied back to the sample it was picked from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecimatedPoint {
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub source_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_predictable() {
        let mut ids = SequentialIds::starting_at(10);
        assert_eq!(ids.next_id(), CurveId(10));
        assert_eq!(ids.next_id(), CurveId(11));
        assert_eq!(CurveId(11).to_string(), "curve-11");
    }

    #[test]
    fn samples_truncate_to_shorter_axis() {
        let curve = Curve::new(CurveId(0), "c", vec![1.0, 2.0, 3.0], vec![5.0, 6.0]);
        let (x, y) = curve.samples();
        assert_eq!(curve.len(), 2);
        assert_eq!(x, &[1.0, 2.0]);
        assert_eq!(y, &[5.0, 6.0]);
    }

    #[test]
    fn derive_shares_x_axis() {
        let curve = Curve::new(CurveId(0), "raw", vec![1.0, 2.0], vec![3.0, 4.0])
            .with_meta("format", "SPC");
        let derived = curve.derive(CurveId(1), "scaled", vec![6.0, 8.0]);
        assert!(Arc::ptr_eq(&curve.x, &derived.x));
        assert_eq!(derived.label, "raw (scaled)");
        assert_eq!(derived.meta["source"], MetaValue::Text("curve-0".into()));
        assert_eq!(derived.meta["format"], MetaValue::Text("SPC".into()));
        assert_eq!(&*curve.y, &[3.0, 4.0]);
    }

    #[test]
    fn meta_value_numeric_view() {
        assert_eq!(MetaValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(MetaValue::Text(" 2.5".into()).as_f64(), Some(2.5));
        assert_eq!(MetaValue::Text("SPC".into()).as_f64(), None);
    }
}
