//! Stable per-country colors for chart series and legend swatches.
//!
//! A country's color is derived from a hash of its name, so it never
//! depends on selection order: Brazil is the same green-ish line whether
//! it was picked first or fifth, and stays so across re-renders.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Clone, Copy, Debug)]
pub struct Hsl {
    pub h_deg: f64, // 0..360
    pub s: f64,     // 0..1
    pub l: f64,     // 0..1
}

#[derive(Clone, Debug)]
pub struct SeriesStyle {
    pub country: String,
    pub hsl: Hsl,
    pub rgb: Rgb8,
    pub hex: String,
    pub marker_size: u32,
    pub line_width: u32,
}

impl SeriesStyle {
    /// Build the consistent style for a country name.
    pub fn for_country(country: &str) -> Self {
        let hsl = Hsl {
            h_deg: stable_hue_deg(country),
            s: 0.60,
            l: 0.45,
        };
        let rgb = hsl_to_rgb8(hsl);
        let hex = rgb_to_hex(rgb);
        SeriesStyle {
            country: country.to_string(),
            hsl,
            rgb,
            hex,
            marker_size: 3,
            line_width: 2,
        }
    }
}

fn stable_hue_deg(key: &str) -> f64 {
    // Hash to 0..359 for a hue angle
    let h = stable_hash64(key);
    (h % 360) as f64
}

fn stable_hash64<T: Hash>(t: T) -> u64 {
    let mut hasher = DefaultHasher::new();
    t.hash(&mut hasher);
    hasher.finish()
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

// HSL -> RGB conversion (linear; sufficient for chart colors)
fn hsl_to_rgb8(hsl: Hsl) -> Rgb8 {
    let h = (hsl.h_deg % 360.0) / 360.0;
    let s = clamp01(hsl.s);
    let l = clamp01(hsl.l);

    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return Rgb8 { r: v, g: v, b: v };
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 1.0 / 2.0 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    }

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    Rgb8 {
        r: (r * 255.0).round() as u8,
        g: (g * 255.0).round() as u8,
        b: (b * 255.0).round() as u8,
    }
}

fn rgb_to_hex(rgb: Rgb8) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb.r, rgb.g, rgb.b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_country_same_color() {
        let a = SeriesStyle::for_country("Brazil");
        let b = SeriesStyle::for_country("Brazil");
        assert_eq!(a.rgb, b.rgb);
        assert_eq!(a.hex, b.hex);
    }

    #[test]
    fn a_spread_of_countries_gets_more_than_one_hue() {
        let names = [
            "Brazil", "Germany", "Norway", "China", "India", "Chile", "Kenya", "Japan",
        ];
        let distinct: std::collections::HashSet<(u8, u8, u8)> = names
            .iter()
            .map(|n| {
                let s = SeriesStyle::for_country(n);
                (s.rgb.r, s.rgb.g, s.rgb.b)
            })
            .collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn hex_is_well_formed() {
        let s = SeriesStyle::for_country("Norway");
        assert_eq!(s.hex.len(), 7);
        assert!(s.hex.starts_with('#'));
    }
}
