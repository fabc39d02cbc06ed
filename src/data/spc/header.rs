//! Fixed-layout headers of the SPC format. All fields are little-endian.

use bitflags::bitflags;

use crate::error::FormatError;

pub const HEADER_SIZE: usize = 512;
pub const SUBHEADER_SIZE: usize = 32;
pub const MEMO_OFFSET: usize = 88;
pub const MEMO_LEN: usize = 130;

/// "New" LSB-first format tag.
pub const VERSION_NEW: u8 = 0x4B;
/// "Old" format tag.
pub const VERSION_OLD: u8 = 0x4D;

bitflags! {
    /// The `ftflgs` byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SpcFlags: u8 {
        /// Y samples are 16-bit signed integers instead of 32-bit floats.
        const Y16 = 0x01;
        const CGRAM = 0x02;
        /// The file holds several sub-curves, each with a sub-header.
        const MULTI = 0x04;
        const RANDOM_Z = 0x08;
        const ORDERED_Z = 0x10;
        const AXIS_LABELS = 0x20;
        /// Each sub-curve carries its own x-values block.
        const XY_PER_CURVE = 0x40;
        /// A single x-values block follows the main header.
        const X_VALUES = 0x80;
    }
}

/// Parsed main header.
#[derive(Debug, Clone, PartialEq)]
pub struct SpcHeader {
    pub flags: SpcFlags,
    pub version: u8,
    pub experiment: u8,
    pub exponent: i8,
    pub point_count: u32,
    pub first_x: f64,
    pub last_x: f64,
    pub curve_count: u32,
    pub x_type: u8,
    pub y_type: u8,
    pub z_type: u8,
    pub memo: String,
}

impl SpcHeader {
    pub fn parse(buffer: &[u8]) -> Result<Self, FormatError> {
        if buffer.len() < HEADER_SIZE {
            return Err(FormatError::TooSmall {
                len: buffer.len(),
                min: HEADER_SIZE,
            });
        }
        let version = buffer[1];
        if version != VERSION_NEW && version != VERSION_OLD {
            return Err(FormatError::UnsupportedVersion(version));
        }

        Ok(SpcHeader {
            flags: SpcFlags::from_bits_retain(buffer[0]),
            version,
            experiment: buffer[2],
            exponent: buffer[3] as i8,
            point_count: u32_at(buffer, 4),
            first_x: f64_at(buffer, 8),
            last_x: f64_at(buffer, 16),
            curve_count: u32_at(buffer, 24),
            x_type: buffer[28],
            y_type: buffer[29],
            z_type: buffer[30],
            memo: read_memo(&buffer[MEMO_OFFSET..MEMO_OFFSET + MEMO_LEN]),
        })
    }

    pub fn is_multi(&self) -> bool {
        self.flags.intersects(SpcFlags::MULTI | SpcFlags::XY_PER_CURVE)
    }
}

/// Parsed 32-byte sub-header. Bytes 12..16 and 20..32 are not interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct SubHeader {
    pub flags: u8,
    pub exponent: i8,
    pub index: u16,
    pub start_x: f32,
    pub end_x: f32,
    pub point_count: u32,
}

impl SubHeader {
    pub fn parse(bytes: &[u8; SUBHEADER_SIZE]) -> Self {
        SubHeader {
            flags: bytes[0],
            exponent: bytes[1] as i8,
            index: u16::from_le_bytes([bytes[2], bytes[3]]),
            start_x: f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            end_x: f32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            point_count: u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
        }
    }

    /// The sub-curve's own x-range, when it is usable for an implied grid.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        let (start, end) = (f64::from(self.start_x), f64::from(self.end_x));
        (start.is_finite() && end.is_finite() && start != end).then_some((start, end))
    }
}

fn u32_at(buffer: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&buffer[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

fn f64_at(buffer: &[u8], offset: usize) -> f64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buffer[offset..offset + 8]);
    f64::from_le_bytes(raw)
}

/// NUL-terminated memo text; invalid UTF-8 is replaced rather than rejected.
fn read_memo(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).trim().to_string()
}
