//! Decoder for the Galactic/Thermo SPC binary spectral format.
//!
//! The format is read strictly front to back:
//!
//! ```text
//!   main header (512 bytes)
//!   [x-values block]                 X_VALUES without XY_PER_CURVE
//!   for each sub-curve:
//!       [sub-header (32 bytes)]      multi-curve files only
//!       [sub-curve x-values]         XY_PER_CURVE
//!       y-values                     f32, or i16 with Y16
//! ```
//!
//! A broken header is fatal ([`FormatError`]). A body that ends early is
//! not: the curve being read is cut short and decoding stops there.

mod builder;
pub mod header;
pub mod tables;

use std::sync::Arc;

use log::{debug, warn};

pub use builder::SpcBuilder;
use header::{SpcFlags, SpcHeader, SubHeader, HEADER_SIZE, SUBHEADER_SIZE};

use crate::data::model::{Curve, IdSource, MetaValue};
use crate::error::FormatError;

const DEFAULT_LABEL: &str = "SPC spectrum";

/// Decode an SPC buffer into its curves.
pub fn decode(buffer: &[u8], ids: &mut dyn IdSource) -> Result<Vec<Curve>, FormatError> {
    let header = SpcHeader::parse(buffer)?;
    debug!(
        "SPC v0x{:02X}: flags {:?}, {} points, {} sub-curves, x type {}, y type {}",
        header.version,
        header.flags,
        header.point_count,
        header.curve_count,
        header.x_type,
        header.y_type
    );

    let multi = header.is_multi();
    let per_curve_x = header.flags.contains(SpcFlags::XY_PER_CURVE);
    let y16 = header.flags.contains(SpcFlags::Y16);
    let mut cursor = Cursor::new(buffer, HEADER_SIZE);

    let shared_x: Option<Arc<[f64]>> =
        if header.flags.contains(SpcFlags::X_VALUES) && !per_curve_x {
            let xs = cursor.read_f32s(header.point_count as usize);
            if xs.len() < header.point_count as usize {
                warn!(
                    "SPC x-values block truncated: {} of {} values",
                    xs.len(),
                    header.point_count
                );
            }
            Some(xs.into())
        } else {
            None
        };

    let curve_count = if multi { header.curve_count as usize } else { 1 };
    let mut curves = Vec::with_capacity(curve_count.min(1024));

    for index in 0..curve_count {
        let sub = if multi {
            match cursor.take_array::<SUBHEADER_SIZE>() {
                Some(raw) => Some(SubHeader::parse(raw)),
                None => {
                    warn!("SPC body ends before sub-header {index} of {curve_count}");
                    break;
                }
            }
        } else {
            None
        };

        let expected = sub
            .as_ref()
            .map(|s| s.point_count)
            .filter(|&n| n > 0)
            .unwrap_or(header.point_count) as usize;
        if expected == 0 {
            warn!("SPC sub-curve {index} declares no samples, skipping");
            continue;
        }

        let own_x = per_curve_x.then(|| cursor.read_f32s(expected));
        let mut y = if y16 {
            cursor.read_i16s(expected)
        } else {
            cursor.read_f32s(expected)
        };

        if let Some(xs) = &own_x {
            y.truncate(xs.len());
        }
        let n = y.len();
        if n == 0 {
            warn!("SPC sub-curve {index} has no readable samples");
            break;
        }
        if n < expected {
            warn!("SPC sub-curve {index} truncated: {n} of {expected} samples");
        }

        let x: Arc<[f64]> = match (own_x, &shared_x) {
            (Some(mut xs), _) => {
                xs.truncate(n);
                xs.into()
            }
            (None, Some(shared)) if shared.len() == n => Arc::clone(shared),
            (None, Some(shared)) if shared.len() > n => Arc::from(&shared[..n]),
            (None, Some(shared)) => {
                y.truncate(shared.len());
                Arc::clone(shared)
            }
            (None, None) => {
                let (first, last) = sub
                    .as_ref()
                    .and_then(SubHeader::x_range)
                    .unwrap_or((header.first_x, header.last_x));
                linear_grid(first, last, expected, n).into()
            }
        };
        if y.is_empty() {
            break;
        }

        curves.push(build_curve(&header, sub.as_ref(), index, x, y, ids));
    }

    if curves.is_empty() {
        return Err(FormatError::NoCurves);
    }
    debug!("SPC decoded {} curve(s)", curves.len());
    Ok(curves)
}

/// `count` evenly spaced values of the grid `first..=last` with `points` steps.
fn linear_grid(first: f64, last: f64, points: usize, count: usize) -> Vec<f64> {
    if points < 2 {
        return vec![first; count.min(1)];
    }
    let step = (last - first) / (points - 1) as f64;
    (0..count).map(|i| first + i as f64 * step).collect()
}

fn build_curve(
    header: &SpcHeader,
    sub: Option<&SubHeader>,
    index: usize,
    x: Arc<[f64]>,
    y: Vec<f64>,
    ids: &mut dyn IdSource,
) -> Curve {
    let base = if header.memo.is_empty() {
        DEFAULT_LABEL
    } else {
        header.memo.as_str()
    };
    let label = if sub.is_some() {
        format!("{base} #{}", index + 1)
    } else {
        base.to_string()
    };

    let mut curve = Curve::new(ids.next_id(), label, x, y)
        .with_units(
            Some(tables::x_unit_label(header.x_type).to_string()),
            Some(tables::y_unit_label(header.y_type).to_string()),
        )
        .with_kind(Some(tables::classify(header.x_type, header.y_type)))
        .with_meta("format", "SPC")
        .with_meta("version", format!("0x{:02X}", header.version))
        .with_meta("flags", i64::from(header.flags.bits()))
        .with_meta("experiment", i64::from(header.experiment))
        .with_meta("exponent", i64::from(header.exponent))
        .with_meta("x_type", i64::from(header.x_type))
        .with_meta("y_type", i64::from(header.y_type))
        .with_meta("z_type", i64::from(header.z_type));

    if let Some(sub) = sub {
        curve
            .meta
            .insert("sub_index".to_string(), MetaValue::Integer(i64::from(sub.index)));
        curve.meta.insert(
            "sub_exponent".to_string(),
            MetaValue::Integer(i64::from(sub.exponent)),
        );
    }
    curve
}

// ---------------------------------------------------------------------------
// Bounds-checked sequential reader
// ---------------------------------------------------------------------------

struct Cursor<'a> {
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buffer: &'a [u8], pos: usize) -> Self {
        Cursor { buffer, pos }
    }

    fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.pos)
    }

    fn take_array<const N: usize>(&mut self) -> Option<&'a [u8; N]> {
        let bytes = self.buffer.get(self.pos..self.pos + N)?;
        self.pos += N;
        bytes.try_into().ok()
    }

    /// Up to `count` little-endian f32 values, fewer if the buffer runs out.
    fn read_f32s(&mut self, count: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(count.min(self.remaining() / 4));
        for _ in 0..count {
            match self.take_array::<4>() {
                Some(raw) => out.push(f64::from(f32::from_le_bytes(*raw))),
                None => break,
            }
        }
        out
    }

    /// Up to `count` little-endian i16 values, fewer if the buffer runs out.
    fn read_i16s(&mut self, count: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(count.min(self.remaining() / 2));
        for _ in 0..count {
            match self.take_array::<2>() {
                Some(raw) => out.push(f64::from(i16::from_le_bytes(*raw))),
                None => break,
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CurveKind, SequentialIds};

    #[test]
    fn implied_grid_is_evenly_spaced() {
        assert_eq!(
            linear_grid(400.0, 4000.0, 5, 5),
            vec![400.0, 1300.0, 2200.0, 3100.0, 4000.0]
        );
        assert_eq!(linear_grid(400.0, 4000.0, 5, 2), vec![400.0, 1300.0]);
        assert_eq!(linear_grid(7.0, 9.0, 1, 1), vec![7.0]);
    }

    #[test]
    fn header_only_buffer_has_no_curves() {
        let mut buf = vec![0u8; HEADER_SIZE];
        buf[1] = header::VERSION_NEW;
        buf[4..8].copy_from_slice(&10u32.to_le_bytes());
        let err = decode(&buf, &mut SequentialIds::new()).unwrap_err();
        assert_eq!(err, FormatError::NoCurves);
    }

    #[test]
    fn truncated_body_keeps_partial_curve() {
        let mut buf = SpcBuilder::new(0.0, 9.0)
            .curve((0..10).map(f64::from).collect())
            .build();
        buf.truncate(HEADER_SIZE + 4 * 6 + 2);

        let curves = decode(&buf, &mut SequentialIds::new()).unwrap();
        assert_eq!(curves.len(), 1);
        assert_eq!(&*curves[0].y, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(&*curves[0].x, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn truncated_multi_file_keeps_complete_curves() {
        let mut buf = SpcBuilder::new(0.0, 3.0)
            .curve(vec![1.0, 2.0, 3.0, 4.0])
            .curve(vec![5.0, 6.0, 7.0, 8.0])
            .curve(vec![9.0, 10.0, 11.0, 12.0])
            .build();
        // Cut inside the third sub-header.
        let per_curve = SUBHEADER_SIZE + 4 * 4;
        buf.truncate(HEADER_SIZE + 2 * per_curve + 10);

        let curves = decode(&buf, &mut SequentialIds::new()).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(&*curves[1].y, &[5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn metadata_and_units() {
        let buf = SpcBuilder::new(400.0, 4000.0)
            .axis_types(1, 2)
            .memo("Polystyrene film")
            .curve(vec![0.1, 0.2, 0.3])
            .build();
        let mut ids = SequentialIds::starting_at(7);
        let curves = decode(&buf, &mut ids).unwrap();
        let curve = &curves[0];

        assert_eq!(curve.id.0, 7);
        assert_eq!(curve.label, "Polystyrene film");
        assert_eq!(curve.x_unit.as_deref(), Some("Wavenumber (cm-1)"));
        assert_eq!(curve.y_unit.as_deref(), Some("Absorbance"));
        assert_eq!(curve.kind, Some(CurveKind::Infrared));
        assert_eq!(curve.meta["format"], MetaValue::Text("SPC".into()));
        assert_eq!(curve.meta["version"], MetaValue::Text("0x4B".into()));
    }

    #[test]
    fn empty_memo_uses_default_label() {
        let buf = SpcBuilder::new(0.0, 1.0).curve(vec![1.0, 2.0]).build();
        let curves = decode(&buf, &mut SequentialIds::new()).unwrap();
        assert_eq!(curves[0].label, DEFAULT_LABEL);
    }

    #[test]
    fn shared_x_block_is_shared_between_sub_curves() {
        let buf = SpcBuilder::new(0.0, 0.0)
            .explicit_x(vec![10.0, 20.0, 40.0])
            .curve(vec![1.0, 2.0, 3.0])
            .curve(vec![4.0, 5.0, 6.0])
            .build();
        let curves = decode(&buf, &mut SequentialIds::new()).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(&*curves[0].x, &[10.0, 20.0, 40.0]);
        assert!(Arc::ptr_eq(&curves[0].x, &curves[1].x));
    }
}
