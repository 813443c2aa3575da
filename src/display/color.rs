/*
 *  display/color.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Color schemes, intensity scaling and hex color parsing
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Unlit pixel
pub const BACKGROUND: Rgb888 = Rgb888::BLACK;

/// Named palette applied by the generators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    White,
    Red,
    Green,
    Blue,
    Cyan,
    Yellow,
    Purple,
    Rainbow,
}

impl ColorScheme {
    /// Full-intensity base color; rainbow has none
    pub fn base(&self) -> Option<Rgb888> {
        match self {
            ColorScheme::White => Some(Rgb888::WHITE),
            ColorScheme::Red => Some(Rgb888::RED),
            ColorScheme::Green => Some(Rgb888::GREEN),
            ColorScheme::Blue => Some(Rgb888::BLUE),
            ColorScheme::Cyan => Some(Rgb888::CYAN),
            ColorScheme::Yellow => Some(Rgb888::YELLOW),
            ColorScheme::Purple => Some(Rgb888::new(160, 32, 240)),
            ColorScheme::Rainbow => None,
        }
    }

    /// Map an intensity to a pixel color. Zero is always background.
    ///
    /// Rainbow derives hue from position and phase so a static field still
    /// shows the full spectrum.
    pub fn colorize(&self, value: u8, x: u32, y: u32, phase: u32) -> Rgb888 {
        if value == 0 {
            return BACKGROUND;
        }
        match self.base() {
            Some(c) => scale(c, value),
            None => {
                // each term reduced to one turn first so long runs cannot overflow
                let hue = ((x % 45) * 8 + (y % 90) * 4 + (phase % 90) * 4) % 360;
                hsv_to_rgb(hue as u16, 255, value)
            }
        }
    }
}

/// Scale each channel by value/255
pub fn scale(color: Rgb888, value: u8) -> Rgb888 {
    let f = |c: u8| ((c as u16 * value as u16) / 255) as u8;
    Rgb888::new(f(color.r()), f(color.g()), f(color.b()))
}

/// Integer HSV to RGB, hue in degrees
pub fn hsv_to_rgb(hue: u16, sat: u8, val: u8) -> Rgb888 {
    let h = (hue % 360) as u32;
    let s = sat as u32;
    let v = val as u32;
    let region = h / 60;
    let rem = (h % 60) * 255 / 60;
    let p = v * (255 - s) / 255;
    let q = v * (255 - (s * rem) / 255) / 255;
    let t = v * (255 - (s * (255 - rem)) / 255) / 255;
    let (r, g, b) = match region {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgb888::new(r as u8, g as u8, b as u8)
}

/// Parse "#RRGGBB" or "RRGGBB"
pub fn parse_hex(s: &str) -> Option<Rgb888> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb888::new(r, g, b))
}

/// Rgb888 that (de)serializes as a "#rrggbb" string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(pub Rgb888);

impl HexColor {
    pub const WHITE: HexColor = HexColor(Rgb888::WHITE);
    pub const BLACK: HexColor = HexColor(Rgb888::BLACK);
    pub const GREEN: HexColor = HexColor(Rgb888::GREEN);
    pub const CYAN: HexColor = HexColor(Rgb888::CYAN);

    pub fn rgb(&self) -> Rgb888 {
        self.0
    }
}

impl From<Rgb888> for HexColor {
    fn from(c: Rgb888) -> Self {
        HexColor(c)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0.r(), self.0.g(), self.0.b())
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_hex(&s)
            .map(HexColor)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color '{s}', expected #rrggbb")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_background() {
        for scheme in [ColorScheme::White, ColorScheme::Rainbow, ColorScheme::Purple] {
            assert_eq!(scheme.colorize(0, 3, 4, 9), BACKGROUND);
        }
    }

    #[test]
    fn test_rainbow_survives_huge_phase() {
        let r = ColorScheme::Rainbow;
        assert_eq!(r.colorize(255, u32::MAX, u32::MAX, u32::MAX), r.colorize(255, u32::MAX % 45, u32::MAX % 90, u32::MAX % 90));
        // one full turn of phase lands on the same hue
        assert_eq!(r.colorize(200, 5, 2, 90), r.colorize(200, 5, 2, 0));
        assert_eq!(r.colorize(200, 50, 2, 7), r.colorize(200, 5, 2, 7));
    }

    #[test]
    fn test_scale_full_and_half() {
        assert_eq!(scale(Rgb888::WHITE, 255), Rgb888::WHITE);
        assert_eq!(scale(Rgb888::new(200, 100, 0), 128), Rgb888::new(100, 50, 0));
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_to_rgb(0, 255, 255), Rgb888::RED);
        assert_eq!(hsv_to_rgb(120, 255, 255), Rgb888::GREEN);
        assert_eq!(hsv_to_rgb(240, 255, 255), Rgb888::BLUE);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#00ffff"), Some(Rgb888::CYAN));
        assert_eq!(parse_hex("FF0000"), Some(Rgb888::RED));
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#gg0000"), None);
    }

    #[test]
    fn test_hex_color_serde() {
        let c: HexColor = serde_json::from_str("\"#00ff00\"").unwrap();
        assert_eq!(c, HexColor::GREEN);
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#00ff00\"");
        assert!(serde_json::from_str::<HexColor>("\"green\"").is_err());
    }
}
