//! Hex color parsing and HSV conversion
//!
//! Colors travel through the model as `#RRGGBB` or `#RRGGBBAA` strings.
//! The alpha pair is accepted by the parser but never used when building
//! an output color.

use serde::{Deserialize, Serialize};

/// Normalized RGB color (each component in 0..=1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` / `#RRGGBBAA` (leading `#` optional, case-insensitive)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .ok()
                .map(|v| v as f64 / 255.0)
        };
        // Validate the alpha pair even though it is discarded
        if digits.len() == 8 {
            channel(6..8)?;
        }
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn components(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_hsv(&self) -> Hsv {
        Hsv::from_rgb(*self)
    }
}

/// Hue in whole degrees (0..=360), saturation and value in percent
/// rounded to two decimals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

impl Hsv {
    pub fn from_rgb(color: Rgb) -> Self {
        let Rgb { r, g, b } = color;
        let v = r.max(g).max(b);
        let diff = v - r.min(g).min(b);

        let (mut h, s) = if diff == 0.0 {
            (0.0, 0.0)
        } else {
            let shift = |c: f64| (v - c) / 6.0 / diff + 0.5;
            let (rr, gg, bb) = (shift(r), shift(g), shift(b));
            let h = if r == v {
                bb - gg
            } else if g == v {
                1.0 / 3.0 + rr - bb
            } else {
                2.0 / 3.0 + gg - rr
            };
            (h, diff / v)
        };
        if h < 0.0 {
            h += 1.0;
        } else if h > 1.0 {
            h -= 1.0;
        }

        let percent = |x: f64| (x * 100.0 * 100.0).round() / 100.0;
        Self {
            hue: (h * 360.0).round(),
            saturation: percent(s),
            value: percent(v),
        }
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        Rgb::from_hex(hex).map(Self::from_rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_six_digit_hex() {
        let c = Rgb::from_hex("#FF8000").unwrap();
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-9);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn test_parse_without_hash_and_lowercase() {
        assert_eq!(Rgb::from_hex("00ff00"), Some(Rgb::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_alpha_is_accepted_but_ignored() {
        assert_eq!(Rgb::from_hex("#0000FF80"), Rgb::from_hex("#0000FF"));
    }

    #[test]
    fn test_rejects_malformed_hex() {
        assert_eq!(Rgb::from_hex("#FFF"), None);
        assert_eq!(Rgb::from_hex("#GG0000"), None);
        assert_eq!(Rgb::from_hex("#0000FFZZ"), None);
        assert_eq!(Rgb::from_hex(""), None);
    }

    #[test]
    fn test_hsv_primaries() {
        let red = Hsv::from_hex("#FF0000").unwrap();
        assert_eq!(red.hue, 0.0);
        assert_eq!(red.saturation, 100.0);
        assert_eq!(red.value, 100.0);

        let green = Hsv::from_hex("#00FF00").unwrap();
        assert_eq!(green.hue, 120.0);

        let blue = Hsv::from_hex("#0000FF").unwrap();
        assert_eq!(blue.hue, 240.0);
    }

    #[test]
    fn test_hsv_gray_has_no_saturation() {
        let gray = Hsv::from_hex("#808080").unwrap();
        assert_eq!(gray.saturation, 0.0);
        assert_eq!(gray.hue, 0.0);
        assert_eq!(gray.value, 50.2);
    }
}
