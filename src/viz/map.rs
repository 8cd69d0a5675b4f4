//! Choropleth world map: Natural Earth projection, sequential Greens
//! ramp over 0–100%, and a fixed "no data" gray distinct from the low end
//! of the ramp.

use crate::geo::CountryShape;
use crate::models::{self, EnergyKind, Record};
use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::Path;

/// Fill for features with no matching record or a null share. Deliberately
/// off the ramp so "unknown" never reads as "low".
pub const NO_DATA_FILL: RGBColor = RGBColor(0xe0, 0xe0, 0xe0);

const BORDER: RGBColor = RGBColor(0xcc, 0xcc, 0xcc);
const SELECTED_OUTLINE: RGBColor = RGBColor(0xd9, 0x53, 0x1e);

/// ColorBrewer "Greens" anchors, light to dark.
const GREENS: [(u8, u8, u8); 9] = [
    (247, 252, 245),
    (229, 245, 224),
    (199, 233, 192),
    (161, 217, 155),
    (116, 196, 118),
    (65, 171, 93),
    (35, 139, 69),
    (0, 109, 44),
    (0, 68, 27),
];

/// Map a share in 0–100 onto the Greens ramp (piecewise-linear between
/// anchors, clamped at the ends).
pub fn share_color(share: f64) -> RGBColor {
    let t = (share / 100.0).clamp(0.0, 1.0) * (GREENS.len() - 1) as f64;
    let i = (t.floor() as usize).min(GREENS.len() - 2);
    let f = t - i as f64;
    let (r0, g0, b0) = GREENS[i];
    let (r1, g1, b1) = GREENS[i + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

// Natural Earth projected extents: |x| <= PI * l(0), |y| <= d(PI/2).
const X_EXTENT: f64 = 2.7354;
const Y_EXTENT: f64 = 1.4231;

fn ne_l(phi: f64) -> f64 {
    let p2 = phi * phi;
    let p4 = p2 * p2;
    0.8707 - 0.131979 * p2 - 0.013791 * p4 + p4 * p4 * (0.003971 * p2 - 0.001529 * p4)
}

fn ne_d(phi: f64) -> f64 {
    let p2 = phi * phi;
    let p4 = p2 * p2;
    phi * (1.007226 + 0.015085 * p2 + p4 * (-0.044475 * p2 + 0.028874 * p4 - 0.005916 * p4 * p2))
}

fn ne_d_prime(phi: f64) -> f64 {
    let p2 = phi * phi;
    let p4 = p2 * p2;
    1.007226
        + 3.0 * 0.015085 * p2
        + p4 * (-7.0 * 0.044475 * p2 + 9.0 * 0.028874 * p4 - 11.0 * 0.005916 * p4 * p2)
}

/// Project (lon, lat) degrees to Natural Earth plane coordinates.
pub fn project(lon_deg: f64, lat_deg: f64) -> (f64, f64) {
    let lambda = lon_deg.to_radians();
    let phi = lat_deg.to_radians();
    (lambda * ne_l(phi), ne_d(phi))
}

/// Invert the projection; `None` outside the projected globe.
pub fn unproject(x: f64, y: f64) -> Option<(f64, f64)> {
    if y.abs() > Y_EXTENT + 1e-6 {
        return None;
    }
    // Newton's method on d(phi) = y; y itself is a good starting point.
    let mut phi = y;
    for _ in 0..12 {
        let delta = (ne_d(phi) - y) / ne_d_prime(phi);
        phi -= delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }
    phi = phi.clamp(-std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2);
    let l = ne_l(phi);
    if l.abs() < 1e-12 {
        return None;
    }
    let lambda = x / l;
    if lambda.abs() > std::f64::consts::PI + 1e-6 {
        return None;
    }
    Some((lambda.to_degrees(), phi.to_degrees()))
}

/// Geographic-to-pixel mapping for one rendered frame. Shared between the
/// renderer and GUI hit-testing so clicks land on the drawn shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapTransform {
    pub width: u32,
    pub height: u32,
    /// 1.0 = whole world fitted; bounded to 1..=8 like the source's zoom.
    pub zoom: f64,
    /// Pan offset in pixels, applied after scaling.
    pub pan: (f64, f64),
}

impl MapTransform {
    pub fn new(width: u32, height: u32) -> Self {
        MapTransform {
            width,
            height,
            zoom: 1.0,
            pan: (0.0, 0.0),
        }
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = (self.zoom * factor).clamp(1.0, 8.0);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.0 += dx;
        self.pan.1 += dy;
    }

    fn scale(&self) -> f64 {
        let fit_x = self.width as f64 / (2.0 * X_EXTENT);
        let fit_y = self.height as f64 / (2.0 * Y_EXTENT);
        self.zoom * fit_x.min(fit_y)
    }

    /// Pixel position of a (lon, lat) point.
    pub fn to_pixel(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let (x, y) = project(lon_deg, lat_deg);
        let s = self.scale();
        (
            self.width as f64 / 2.0 + x * s + self.pan.0,
            self.height as f64 / 2.0 - y * s + self.pan.1,
        )
    }

    /// (lon, lat) under a pixel, if it lies on the projected globe.
    pub fn to_lonlat(&self, px: f64, py: f64) -> Option<(f64, f64)> {
        let s = self.scale();
        let x = (px - self.width as f64 / 2.0 - self.pan.0) / s;
        let y = (self.height as f64 / 2.0 + self.pan.1 - py) / s;
        unproject(x, y)
    }

    fn pixel_ring(&self, ring: &[(f64, f64)]) -> Vec<(i32, i32)> {
        ring.iter()
            .map(|&(lon, lat)| {
                let (px, py) = self.to_pixel(lon, lat);
                (px.round() as i32, py.round() as i32)
            })
            .collect()
    }
}

/// Render the choropleth to an SVG or PNG file (picked by extension, like
/// the chart renderer).
#[allow(clippy::too_many_arguments)]
pub fn render_map<P: AsRef<Path>>(
    shapes: &[CountryShape],
    records: &[Record],
    kind: EnergyKind,
    year: i32,
    selected: Option<&str>,
    transform: &MapTransform,
    out_path: P,
) -> Result<()> {
    super::ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let dims = (transform.width, transform.height);

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), dims).into_drawing_area();
        draw_map(&root, shapes, records, kind, year, selected, transform)?;
        root.present().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), dims).into_drawing_area();
        draw_map(&root, shapes, records, kind, year, selected, transform)?;
        root.present().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    }
    Ok(())
}

/// Render the choropleth into an RGB888 buffer (GUI texture path).
/// `buf` must hold exactly `width * height * 3` bytes.
#[allow(clippy::too_many_arguments)]
pub fn render_map_into(
    buf: &mut [u8],
    shapes: &[CountryShape],
    records: &[Record],
    kind: EnergyKind,
    year: i32,
    selected: Option<&str>,
    transform: &MapTransform,
) -> Result<()> {
    super::ensure_fonts_registered();
    let dims = (transform.width, transform.height);
    let root = BitMapBackend::with_buffer(buf, dims).into_drawing_area();
    draw_map(&root, shapes, records, kind, year, selected, transform)?;
    root.present().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_map<DB>(
    root: &DrawingArea<DB, Shift>,
    shapes: &[CountryShape],
    records: &[Record],
    kind: EnergyKind,
    year: i32,
    selected: Option<&str>,
    transform: &MapTransform,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow::anyhow!("{:?}", e))?;

    // Fill pass, then borders, so strokes stay visible between neighbors.
    for shape in shapes {
        let fill = match models::find_record(records, &shape.name, year)
            .and_then(|r| kind.share_of(r))
        {
            Some(share) => share_color(share),
            None => NO_DATA_FILL,
        };
        for ring in &shape.rings {
            let px = transform.pixel_ring(ring);
            if px.len() < 3 {
                continue;
            }
            root.draw(&Polygon::new(px, fill.filled()))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        }
    }
    for shape in shapes {
        let is_selected = selected == Some(shape.name.as_str());
        let stroke = if is_selected {
            SELECTED_OUTLINE.stroke_width(2)
        } else {
            BORDER.stroke_width(1)
        };
        for ring in &shape.rings {
            let mut px = transform.pixel_ring(ring);
            if px.len() < 2 {
                continue;
            }
            if px.first() != px.last() {
                px.push(px[0]);
            }
            root.draw(&PathElement::new(px, stroke))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        }
    }

    let caption = format!("{} — {}", kind.axis_label(), year);
    root.draw(&Text::new(
        caption,
        (10, 10),
        TextStyle::from((FontFamily::SansSerif, 16).into_font()).color(&BLACK),
    ))
    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_is_monotone_and_clamped() {
        let lo = share_color(0.0);
        let hi = share_color(100.0);
        assert_eq!((lo.0, lo.1, lo.2), GREENS[0]);
        assert_eq!((hi.0, hi.1, hi.2), GREENS[8]);
        assert_eq!(share_color(-5.0), share_color(0.0));
        assert_eq!(share_color(150.0), share_color(100.0));
        // Greener (darker) as share grows.
        assert!(share_color(80.0).1 < share_color(20.0).1);
    }

    #[test]
    fn no_data_fill_is_off_the_ramp() {
        for i in 0..=100 {
            let c = share_color(i as f64);
            assert_ne!((c.0, c.1, c.2), (NO_DATA_FILL.0, NO_DATA_FILL.1, NO_DATA_FILL.2));
        }
    }

    #[test]
    fn projection_roundtrip() {
        for &(lon, lat) in &[(0.0, 0.0), (13.4, 52.5), (-70.0, -33.4), (151.2, -33.9)] {
            let (x, y) = project(lon, lat);
            let (lon2, lat2) = unproject(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-6, "lon {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-6, "lat {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn transform_pixel_roundtrip_and_zoom_bounds() {
        let mut t = MapTransform::new(800, 600);
        let (px, py) = t.to_pixel(13.4, 52.5);
        let (lon, lat) = t.to_lonlat(px, py).unwrap();
        assert!((lon - 13.4).abs() < 1e-6);
        assert!((lat - 52.5).abs() < 1e-6);

        t.zoom_by(100.0);
        assert_eq!(t.zoom, 8.0);
        t.zoom_by(0.0001);
        assert_eq!(t.zoom, 1.0);
    }
}
