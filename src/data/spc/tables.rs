//! Axis-type lookup tables of the SPC format.

use crate::data::model::CurveKind;

/// Label used for any code missing from the tables.
pub const UNKNOWN_UNIT: &str = "Arbitrary";

/// X-axis unit label for an SPC `fxtype` code.
pub fn x_unit_label(code: u8) -> &'static str {
    match code {
        0 => "Arbitrary",
        1 => "Wavenumber (cm-1)",
        2 => "Micrometers (um)",
        3 => "Nanometers (nm)",
        4 => "Seconds",
        5 => "Minutes",
        6 => "Hertz (Hz)",
        7 => "Kilohertz (KHz)",
        8 => "Megahertz (MHz)",
        9 => "Mass (M/z)",
        10 => "Parts per million (PPM)",
        11 => "Days",
        12 => "Years",
        13 => "Raman Shift (cm-1)",
        14 => "eV",
        15 => "XYZ text labels",
        16 => "Diode Number",
        17 => "Channel",
        18 => "Degrees",
        19 => "Temperature (F)",
        20 => "Temperature (C)",
        21 => "Temperature (K)",
        22 => "Data Points",
        23 => "Milliseconds (mSec)",
        24 => "Microseconds (uSec)",
        25 => "Nanoseconds (nSec)",
        26 => "Gigahertz (GHz)",
        255 => "Double Interferogram",
        _ => UNKNOWN_UNIT,
    }
}

/// Y-axis unit label for an SPC `fytype` code.
pub fn y_unit_label(code: u8) -> &'static str {
    match code {
        0 => "Arbitrary Intensity",
        1 => "Interferogram",
        2 => "Absorbance",
        3 => "Kubelka-Munk",
        4 => "Counts",
        5 => "Volts",
        6 => "Degrees",
        7 => "Milliamps",
        8 => "Millimeters",
        9 => "Millivolts",
        10 => "Log(1/R)",
        11 => "Percent",
        12 => "Intensity",
        13 => "Relative Intensity",
        14 => "Energy",
        16 => "Decibel",
        19 => "Temperature (F)",
        20 => "Temperature (C)",
        21 => "Temperature (K)",
        22 => "Index of Refraction [N]",
        23 => "Extinction Coeff. [K]",
        24 => "Real",
        25 => "Imaginary",
        26 => "Complex",
        128 => "Transmission",
        129 => "Reflectance",
        130 => "Arbitrary or Single Beam with Valley Peaks",
        131 => "Emission",
        _ => UNKNOWN_UNIT,
    }
}

/// One classification rule: `None` matches any code. First match wins.
struct KindRule {
    x: Option<u8>,
    y: Option<u8>,
    kind: CurveKind,
}

const KIND_RULES: &[KindRule] = &[
    KindRule { x: Some(13), y: None, kind: CurveKind::Raman },
    KindRule { x: Some(1), y: None, kind: CurveKind::Infrared },
    KindRule { x: Some(2), y: None, kind: CurveKind::NearInfrared },
    KindRule { x: Some(3), y: Some(131), kind: CurveKind::Fluorescence },
    KindRule { x: Some(3), y: Some(2), kind: CurveKind::UvVis },
    KindRule { x: Some(3), y: Some(128), kind: CurveKind::UvVis },
    KindRule { x: Some(3), y: Some(10), kind: CurveKind::NearInfrared },
    KindRule { x: Some(3), y: Some(129), kind: CurveKind::NearInfrared },
];

/// Classify a curve from its axis-type codes.
pub fn classify(x_type: u8, y_type: u8) -> CurveKind {
    KIND_RULES
        .iter()
        .find(|rule| {
            rule.x.map_or(true, |code| code == x_type) && rule.y.map_or(true, |code| code == y_type)
        })
        .map(|rule| rule.kind)
        .unwrap_or(CurveKind::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_codes() {
        assert_eq!(x_unit_label(0), "Arbitrary");
        assert_eq!(x_unit_label(14), "eV");
        assert_eq!(x_unit_label(26), "Gigahertz (GHz)");
        assert_eq!(x_unit_label(255), "Double Interferogram");
        assert_eq!(x_unit_label(128), UNKNOWN_UNIT);
        assert_eq!(x_unit_label(27), UNKNOWN_UNIT);
        assert_eq!(x_unit_label(30), UNKNOWN_UNIT);
        assert_eq!(y_unit_label(14), "Energy");
        assert_eq!(y_unit_label(128), "Transmission");
        assert_eq!(y_unit_label(131), "Emission");
        assert_eq!(y_unit_label(15), UNKNOWN_UNIT);
        assert_eq!(y_unit_label(255), UNKNOWN_UNIT);
    }

    #[test]
    fn classification_priority() {
        assert_eq!(classify(1, 2), CurveKind::Infrared);
        assert_eq!(classify(13, 4), CurveKind::Raman);
        assert_eq!(classify(3, 2), CurveKind::UvVis);
        assert_eq!(classify(3, 131), CurveKind::Fluorescence);
        assert_eq!(classify(3, 129), CurveKind::NearInfrared);
        assert_eq!(classify(2, 0), CurveKind::NearInfrared);
        assert_eq!(classify(3, 4), CurveKind::Other);
        assert_eq!(classify(0, 0), CurveKind::Other);
        assert_eq!(classify(255, 255), CurveKind::Other);
    }
}
