use palette::white_point::D65;
use palette::{FromColor, Srgb, Xyz};
use thiserror::Error;

/// CIELAB under the D65 white point, the space every catalog comparison uses.
pub type Lab = palette::Lab<D65, f64>;

/// D65 reference white, scaled to match XYZ in the 0-100 range.
const WHITE_X: f64 = 95.047;
const WHITE_Y: f64 = 100.0;
const WHITE_Z: f64 = 108.883;

/// Below this the CIE cube root is replaced by its linear segment.
const EPSILON: f64 = 0.008856;

/// Why a hex string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseHexError {
    #[error("invalid hex color: expected 3 or 6 hex digits, got {0}")]
    InvalidLength(usize),
    #[error("invalid hex color: {0:?} is not a hex digit")]
    InvalidDigit(char),
}

/// An sRGB color with u8 components, as carried by hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or the `#rgb` shorthand. Case-insensitive, the `#` is
    /// optional and surrounding whitespace is ignored.
    pub fn from_hex(hex: &str) -> Result<Self, ParseHexError> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let digits = hex
            .chars()
            .map(|c| {
                c.to_digit(16)
                    .map(|d| d as u8)
                    .ok_or(ParseHexError::InvalidDigit(c))
            })
            .collect::<Result<Vec<u8>, _>>()?;

        match digits.as_slice() {
            &[r, g, b] => Ok(Self::new(r * 17, g * 17, b * 17)),
            &[r1, r2, g1, g2, b1, b2] => Ok(Self::new(
                (r1 << 4) | r2,
                (g1 << 4) | g2,
                (b1 << 4) | b2,
            )),
            other => Err(ParseHexError::InvalidLength(other.len())),
        }
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CIE XYZ in the 0-100 range, using the four-digit sRGB/D65 matrix.
    ///
    /// Precomputed catalog Lab values are made with this exact matrix, and
    /// hex-only entries have to reproduce them.
    pub fn to_xyz(self) -> Xyz<D65, f64> {
        let r = linearize(self.r);
        let g = linearize(self.g);
        let b = linearize(self.b);
        Xyz::new(
            100.0 * (0.4124 * r + 0.3576 * g + 0.1805 * b),
            100.0 * (0.2126 * r + 0.7152 * g + 0.0722 * b),
            100.0 * (0.0193 * r + 0.1192 * g + 0.9505 * b),
        )
    }

    /// Convert to CIELAB through [`Color::to_xyz`].
    pub fn to_lab(self) -> Lab {
        lab_from_xyz(self.to_xyz())
    }

    /// Nearest displayable color for a Lab value. Only used for previews, so
    /// palette's own conversion is good enough here.
    pub fn from_lab(lab: Lab) -> Self {
        let srgb: Srgb<f64> = Srgb::from_color(lab);
        Self::from_srgb_f64_clamped(srgb)
    }

    fn from_srgb_f64_clamped(srgb: Srgb<f64>) -> Self {
        let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self {
            r: channel(srgb.red),
            g: channel(srgb.green),
            b: channel(srgb.blue),
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Convert a hex color string straight to Lab.
///
/// Returns `None` for anything that does not normalize to six hex digits;
/// never panics.
pub fn hex_to_lab(hex: &str) -> Option<Lab> {
    Color::from_hex(hex).ok().map(Color::to_lab)
}

/// sRGB transfer function, inverted.
fn linearize(c: u8) -> f64 {
    let c = f64::from(c) / 255.0;
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn lab_from_xyz(xyz: Xyz<D65, f64>) -> Lab {
    let fx = cie_f(xyz.x / WHITE_X);
    let fy = cie_f(xyz.y / WHITE_Y);
    let fz = cie_f(xyz.z / WHITE_Z);
    Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

fn cie_f(t: f64) -> f64 {
    if t > EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    fn assert_lab_near(actual: Lab, expected: (f64, f64, f64), tolerance: f64) {
        let (l, a, b) = expected;
        assert!(
            (actual.l - l).abs() < tolerance
                && (actual.a - a).abs() < tolerance
                && (actual.b - b).abs() < tolerance,
            "expected Lab ({l}, {a}, {b}) within {tolerance}, got ({}, {}, {})",
            actual.l,
            actual.a,
            actual.b
        );
    }

    #[test]
    fn hex_round_trip() {
        let original = Color::from_hex("#ff8800").unwrap();
        assert_eq!(original.r, 255);
        assert_eq!(original.g, 136);
        assert_eq!(original.b, 0);
        assert_eq!(original.to_hex(), "#ff8800");
    }

    #[test]
    fn hex_uppercase_input() {
        let color = Color::from_hex("#FF8800").unwrap();
        assert_eq!(color.to_hex(), "#ff8800");
    }

    #[test]
    fn hex_without_hash() {
        let color = Color::from_hex("aabbcc").unwrap();
        assert_eq!(color.to_hex(), "#aabbcc");
    }

    #[test]
    fn hex_shorthand_expands_each_digit() {
        let color = Color::from_hex("#abc").unwrap();
        assert_eq!(color.to_hex(), "#aabbcc");
        assert_eq!(Color::from_hex("FFF").unwrap(), WHITE);
    }

    #[test]
    fn hex_surrounding_whitespace_is_ignored() {
        let color = Color::from_hex("  #3b2a20\n").unwrap();
        assert_eq!(color, Color::new(0x3b, 0x2a, 0x20));
    }

    #[test]
    fn hex_invalid_length() {
        assert_eq!(
            Color::from_hex("#abcd"),
            Err(ParseHexError::InvalidLength(4))
        );
        assert_eq!(Color::from_hex(""), Err(ParseHexError::InvalidLength(0)));
        assert_eq!(Color::from_hex("#"), Err(ParseHexError::InvalidLength(0)));
    }

    #[test]
    fn hex_invalid_chars() {
        assert_eq!(
            Color::from_hex("#gggggg"),
            Err(ParseHexError::InvalidDigit('g'))
        );
        // from_str_radix would accept a sign, hex colors must not.
        assert!(Color::from_hex("+fffff").is_err());
        assert!(Color::from_hex("#ééé").is_err());
    }

    #[test]
    fn hex_to_lab_rejects_garbage() {
        for input in ["not-a-color", "", "#12", "#1234567", "##123456", "12 456"] {
            assert!(
                hex_to_lab(input).is_none(),
                "{input:?} should not convert"
            );
        }
    }

    #[test]
    fn black_is_origin() {
        assert_lab_near(BLACK.to_lab(), (0.0, 0.0, 0.0), 1e-3);
    }

    #[test]
    fn white_has_full_lightness() {
        let lab = WHITE.to_lab();
        assert!((lab.l - 100.0).abs() < 1e-3, "white L should be 100, got {}", lab.l);
        // The four-digit matrix rows do not sum exactly to the D65 white, so a
        // and b sit a hair off zero.
        assert_lab_near(lab, (100.0, 0.0, 0.0), 0.02);
    }

    #[test]
    fn mid_gray_reference_value() {
        let lab = hex_to_lab("#808080").unwrap();
        assert!(
            (lab.l - 53.585).abs() < 0.01,
            "mid gray L should be ~53.585, got {}",
            lab.l
        );
        assert!(lab.a.abs() < 0.02 && lab.b.abs() < 0.02);
    }

    #[test]
    fn saturated_red_reference_value() {
        // Red only touches the first matrix column: X = 41.24, Y = 21.26, Z = 1.93.
        let xyz = Color::new(255, 0, 0).to_xyz();
        assert!((xyz.x - 41.24).abs() < 1e-9, "X = {}", xyz.x);
        assert!((xyz.y - 21.26).abs() < 1e-9, "Y = {}", xyz.y);
        assert!((xyz.z - 1.93).abs() < 1e-9, "Z = {}", xyz.z);

        let lab = Color::new(255, 0, 0).to_lab();
        assert_lab_near(lab, (53.233, 80.109, 67.220), 0.01);
    }

    #[test]
    fn dark_channels_use_linear_segment() {
        // 10/255 < 0.04045, and Y/100 lands under the CIE epsilon.
        let lab = Color::new(10, 10, 10).to_lab();
        let y = 100.0 * (10.0 / 255.0 / 12.92) / 100.0;
        let expected_l = 116.0 * (7.787 * y + 16.0 / 116.0) - 16.0;
        assert!(
            (lab.l - expected_l).abs() < 1e-9,
            "expected L {expected_l}, got {}",
            lab.l
        );
    }

    #[test]
    fn conversion_is_deterministic() {
        let first = hex_to_lab("#7a4b2c").unwrap();
        let second = hex_to_lab("#7A4B2C").unwrap();
        assert_eq!(first.l.to_bits(), second.l.to_bits());
        assert_eq!(first.a.to_bits(), second.a.to_bits());
        assert_eq!(first.b.to_bits(), second.b.to_bits());
    }

    #[test]
    fn lab_to_display_round_trip() {
        let colors = [
            Color::new(200, 100, 50),
            Color::new(59, 42, 32),
            Color::new(128, 128, 128),
            BLACK,
            WHITE,
        ];
        for original in colors {
            let recovered = Color::from_lab(original.to_lab());
            for (channel, a, b) in [
                ("R", original.r, recovered.r),
                ("G", original.g, recovered.g),
                ("B", original.b, recovered.b),
            ] {
                assert!(
                    (a as i16 - b as i16).unsigned_abs() <= 2,
                    "{channel} mismatch for {original}: {a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn display_matches_to_hex() {
        let color = Color::new(171, 205, 239);
        assert_eq!(format!("{color}"), color.to_hex());
    }
}
