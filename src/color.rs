//! Tint colours as sRGB hex strings.
//!
//! The debug panel edits the shirt tint as a `#rrggbb` string, the shaders
//! want linear floats. This module owns the conversion in both directions.

use anyhow::{Result, anyhow};

/// An 8-bit sRGB colour, the unit the panel and the bindings trade in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Parse a `#rrggbb` string. The leading `#` is required.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| anyhow!("colour {hex:?} is missing the leading '#'"))?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(anyhow!("colour {hex:?} is not of the form #rrggbb"));
        }
        let channel = |range| u8::from_str_radix(&digits[range], 16).map_err(anyhow::Error::from);
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear RGBA as the material uniform expects it, alpha fixed at 1.
    pub fn to_linear(self) -> [f32; 4] {
        [
            srgb_channel_to_linear(self.r),
            srgb_channel_to_linear(self.g),
            srgb_channel_to_linear(self.b),
            1.0,
        ]
    }
}

fn srgb_channel_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_default_shirt_tint() {
        let tint = Rgb::from_hex("#110d0d").unwrap();
        assert_eq!(
            tint,
            Rgb {
                r: 0x11,
                g: 0x0d,
                b: 0x0d
            }
        );
    }

    #[test]
    fn hex_roundtrip() {
        for hex in ["#000000", "#ffffff", "#110d0d", "#3fa9c1"] {
            assert_eq!(Rgb::from_hex(hex).unwrap().to_hex(), hex);
        }
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in ["110d0d", "#110d0", "#110d0dff", "#gg0000", "", "#"] {
            assert!(Rgb::from_hex(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn linear_endpoints() {
        assert_eq!(Rgb { r: 0, g: 0, b: 0 }.to_linear(), [0.0, 0.0, 0.0, 1.0]);
        let white = Rgb::WHITE.to_linear();
        for c in &white[..3] {
            assert!((c - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn linear_is_below_srgb_for_midtones() {
        let mid = Rgb {
            r: 128,
            g: 128,
            b: 128,
        }
        .to_linear();
        assert!(mid[0] > 0.2 && mid[0] < 0.25);
    }
}
