use super::header::{
    SpcFlags, HEADER_SIZE, MEMO_LEN, MEMO_OFFSET, SUBHEADER_SIZE, VERSION_NEW,
};

struct SubCurve {
    x: Option<Vec<f64>>,
    y: Vec<f64>,
    range: Option<(f32, f32)>,
}

/// Writes SPC buffers in the layout [`decode`](super::decode) reads.
///
/// The variant flags follow from what was added: more than one curve (or
/// [`SpcBuilder::multi`]) sets `MULTI`, [`SpcBuilder::explicit_x`] sets
/// `X_VALUES`, [`SpcBuilder::curve_with_x`] sets `XY_PER_CURVE`.
pub struct SpcBuilder {
    version: u8,
    first_x: f64,
    last_x: f64,
    x_type: u8,
    y_type: u8,
    memo: String,
    int16: bool,
    force_multi: bool,
    shared_x: Option<Vec<f64>>,
    curves: Vec<SubCurve>,
}

impl SpcBuilder {
    pub fn new(first_x: f64, last_x: f64) -> Self {
        SpcBuilder {
            version: VERSION_NEW,
            first_x,
            last_x,
            x_type: 0,
            y_type: 0,
            memo: String::new(),
            int16: false,
            force_multi: false,
            shared_x: None,
            curves: Vec::new(),
        }
    }

    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    pub fn axis_types(mut self, x_type: u8, y_type: u8) -> Self {
        self.x_type = x_type;
        self.y_type = y_type;
        self
    }

    pub fn memo(mut self, memo: &str) -> Self {
        self.memo = memo.to_string();
        self
    }

    /// Store samples as 16-bit integers (values are rounded and saturated).
    pub fn int16(mut self, int16: bool) -> Self {
        self.int16 = int16;
        self
    }

    /// Write sub-headers even for a single curve.
    pub fn multi(mut self, multi: bool) -> Self {
        self.force_multi = multi;
        self
    }

    /// One x-values block shared by every curve.
    pub fn explicit_x(mut self, x: Vec<f64>) -> Self {
        self.shared_x = Some(x);
        self
    }

    pub fn curve(mut self, y: Vec<f64>) -> Self {
        self.curves.push(SubCurve { x: None, y, range: None });
        self
    }

    pub fn curve_with_x(mut self, x: Vec<f64>, y: Vec<f64>) -> Self {
        self.curves.push(SubCurve { x: Some(x), y, range: None });
        self
    }

    /// Sub-header x-range of the curve at `index`. Ignored for curves
    /// not added yet.
    pub fn sub_range(mut self, index: usize, start: f32, end: f32) -> Self {
        if let Some(curve) = self.curves.get_mut(index) {
            curve.range = Some((start, end));
        }
        self
    }

    fn flags(&self) -> SpcFlags {
        let mut flags = SpcFlags::empty();
        flags.set(SpcFlags::Y16, self.int16);
        flags.set(SpcFlags::MULTI, self.force_multi || self.curves.len() > 1);
        flags.set(SpcFlags::X_VALUES, self.shared_x.is_some());
        if self.curves.iter().any(|c| c.x.is_some()) {
            flags.insert(SpcFlags::XY_PER_CURVE | SpcFlags::MULTI);
        }
        flags
    }

    pub fn build(self) -> Vec<u8> {
        let flags = self.flags();
        let multi = flags.contains(SpcFlags::MULTI);
        let per_curve_x = flags.contains(SpcFlags::XY_PER_CURVE);
        let point_count = self
            .shared_x
            .as_ref()
            .map(Vec::len)
            .or_else(|| self.curves.first().map(|c| c.y.len()))
            .unwrap_or(0);

        let mut buf = vec![0u8; HEADER_SIZE];
        buf[0] = flags.bits();
        buf[1] = self.version;
        buf[3] = 0x80;
        buf[4..8].copy_from_slice(&(point_count as u32).to_le_bytes());
        buf[8..16].copy_from_slice(&self.first_x.to_le_bytes());
        buf[16..24].copy_from_slice(&self.last_x.to_le_bytes());
        buf[24..28].copy_from_slice(&(self.curves.len() as u32).to_le_bytes());
        buf[28] = self.x_type;
        buf[29] = self.y_type;
        let memo = self.memo.as_bytes();
        let memo_len = memo.len().min(MEMO_LEN - 1);
        buf[MEMO_OFFSET..MEMO_OFFSET + memo_len].copy_from_slice(&memo[..memo_len]);

        if let Some(x) = &self.shared_x {
            if !per_curve_x {
                write_f32s(&mut buf, x);
            }
        }

        for (index, curve) in self.curves.iter().enumerate() {
            if multi {
                let mut sub = [0u8; SUBHEADER_SIZE];
                sub[1] = 0x80;
                sub[2..4].copy_from_slice(&(index as u16).to_le_bytes());
                if let Some((start, end)) = curve.range {
                    sub[4..8].copy_from_slice(&start.to_le_bytes());
                    sub[8..12].copy_from_slice(&end.to_le_bytes());
                }
                sub[16..20].copy_from_slice(&(curve.y.len() as u32).to_le_bytes());
                buf.extend_from_slice(&sub);
            }
            if per_curve_x {
                let fallback = vec![0.0; curve.y.len()];
                write_f32s(&mut buf, curve.x.as_ref().unwrap_or(&fallback));
            }
            if self.int16 {
                for &v in &curve.y {
                    let raw = v.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
                    buf.extend_from_slice(&raw.to_le_bytes());
                }
            } else {
                write_f32s(&mut buf, &curve.y);
            }
        }
        buf
    }
}

fn write_f32s(buf: &mut Vec<u8>, values: &[f64]) {
    for &v in values {
        buf.extend_from_slice(&(v as f32).to_le_bytes());
    }
}
