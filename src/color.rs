use serde::{Serialize, Serializer};
use std::fmt;

/// An opaque RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);

    /// Parses `#rrggbb` or `rrggbb`
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Channel-wise interpolation, `t` in `[0, 1]`
    pub fn lerp(&self, to: &Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8;
        Rgb(mix(self.0, to.0), mix(self.1, to.1), mix(self.2, to.2))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Twelve pastel categorical colors ("Set3")
pub const SCHEME_SET3: [Rgb; 12] = [
    Rgb(0x8d, 0xd3, 0xc7),
    Rgb(0xff, 0xff, 0xb3),
    Rgb(0xbe, 0xba, 0xda),
    Rgb(0xfb, 0x80, 0x72),
    Rgb(0x80, 0xb1, 0xd3),
    Rgb(0xfd, 0xb4, 0x62),
    Rgb(0xb3, 0xde, 0x69),
    Rgb(0xfc, 0xcd, 0xe5),
    Rgb(0xd9, 0xd9, 0xd9),
    Rgb(0xbc, 0x80, 0xbd),
    Rgb(0xcc, 0xeb, 0xc5),
    Rgb(0xff, 0xed, 0x6f),
];

/// Ordinal color scale keyed by expense name
///
/// The domain is the list of distinct names in encounter order. A name's
/// color is the palette entry at its domain position, wrapping around, so the
/// mapping shifts whenever the order of first appearance changes.
#[derive(Clone, Debug)]
pub struct ColorScale {
    domain: Vec<String>,
    palette: Vec<Rgb>,
}

impl Default for ColorScale {
    fn default() -> Self {
        ColorScale::new(SCHEME_SET3.to_vec())
    }
}

impl ColorScale {
    pub fn new(palette: Vec<Rgb>) -> Self {
        ColorScale {
            domain: Vec::new(),
            palette,
        }
    }

    /// Replaces the domain with the distinct names, first occurrence first
    pub fn set_domain<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        self.domain.clear();
        for name in names {
            if !self.domain.iter().any(|n| n == name) {
                self.domain.push(name.to_string());
            }
        }
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// Color of `name`; names outside the domain take the next free slot
    pub fn color(&self, name: &str) -> Rgb {
        if self.palette.is_empty() {
            return Rgb::WHITE;
        }
        let index = self
            .domain
            .iter()
            .position(|n| n == name)
            .unwrap_or(self.domain.len());
        self.palette[index % self.palette.len()]
    }
}
