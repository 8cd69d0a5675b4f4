//! Visualization: render the multi-series share chart to **SVG**, **PNG**,
//! or an in-memory RGB buffer (the GUI texture path).
//!
//! - One monotone-interpolated line per selected country, markers at the
//!   observations, optional dashed least-squares trend per series
//! - Stable per-country colors (hash of the name, not selection order)
//! - Legend placement: `Inside`, `Right`, `Top`, `Bottom`
//! - Empty selection falls back to the first country in the dataset

pub mod curve;
pub mod legend;
pub mod map;
pub mod text;
pub mod types;
pub mod util;

pub use types::{LegendMode, DEFAULT_LEGEND_MODE};

use crate::app::ChartSelection;
use crate::models::{self, EnergyKind, Record};
use crate::stats::fit_trend;
use crate::style::SeriesStyle;
use anyhow::{anyhow, Result};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::FontFamily;

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::Once;

use legend::{draw_legend_panel, estimate_top_bottom_legend_height_px};
use util::{compute_left_label_area_px, map_locale};

/// One-time registration for a fallback "sans-serif" font when using the
/// `ab_glyph` text path. Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

pub(crate) fn ensure_fonts_registered() {
    // Safe to call many times; only runs once.
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

/// Convenience: default locale (`"en"`), default legend (`Bottom`),
/// derived title.
pub fn plot_lines<P: AsRef<Path>>(
    records: &[Record],
    selection: &ChartSelection,
    kind: EnergyKind,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    plot_chart(
        records,
        selection,
        kind,
        out_path,
        width,
        height,
        "en",
        DEFAULT_LEGEND_MODE,
        "",
    )
}

/// Fully-configurable entry point: locale, legend placement, custom title.
#[allow(clippy::too_many_arguments)]
pub fn plot_chart<P: AsRef<Path>>(
    records: &[Record],
    selection: &ChartSelection,
    kind: EnergyKind,
    out_path: P,
    width: u32,
    height: u32,
    locale_tag: &str,
    legend: LegendMode,
    title: &str,
) -> Result<()> {
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let (_, dec_sep) = map_locale(locale_tag);

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, records, selection, kind, dec_sep, legend, title)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, records, selection, kind, dec_sep, legend, title)?;
    }
    Ok(())
}

/// Render the chart into an RGB888 buffer (`width * height * 3` bytes).
#[allow(clippy::too_many_arguments)]
pub fn render_chart_into(
    buf: &mut [u8],
    records: &[Record],
    selection: &ChartSelection,
    kind: EnergyKind,
    width: u32,
    height: u32,
    locale_tag: &str,
    legend: LegendMode,
    title: &str,
) -> Result<()> {
    ensure_fonts_registered();
    let (_, dec_sep) = map_locale(locale_tag);
    let root = BitMapBackend::with_buffer(buf, (width, height)).into_drawing_area();
    draw_chart(root, records, selection, kind, dec_sep, legend, title)
}

/// Countries actually drawn: the selection in insertion order, or the
/// first country of the dataset when nothing is selected.
pub fn drawn_countries(records: &[Record], selection: &ChartSelection) -> Vec<String> {
    if !selection.is_empty() {
        return selection.countries().to_vec();
    }
    records
        .first()
        .map(|r| vec![r.country.clone()])
        .unwrap_or_default()
}

fn draw_chart<DB>(
    root: DrawingArea<DB, Shift>,
    records: &[Record],
    selection: &ChartSelection,
    kind: EnergyKind,
    dec_sep: char,
    legend: LegendMode,
    title: &str,
) -> Result<()>
where
    DB: DrawingBackend,
{
    const MARGIN: u32 = 16;

    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let drawn = drawn_countries(records, selection);
    let values: Vec<f64> = records.iter().filter_map(|r| kind.share_of(r)).collect();

    // Empty dataset (or one with no numeric values): placeholder, not an error.
    if drawn.is_empty() || values.is_empty() {
        let (w, h) = root.dim_in_pixel();
        root.draw(&Text::new(
            "No data available",
            (w as i32 / 2 - 60, h as i32 / 2),
            TextStyle::from((FontFamily::SansSerif, 16).into_font()).color(&BLACK),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
        return Ok(());
    }

    // Domains span the whole dataset, not just the drawn series; the
    // trend paths below reuse these x endpoints.
    let (mut min_year, mut max_year) =
        models::year_bounds(records).ok_or_else(|| anyhow!("no years in dataset"))?;
    if min_year == max_year {
        min_year -= 1;
        max_year += 1;
    }
    let max_val = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let y_max = if max_val <= 0.0 { 1.0 } else { max_val };
    let x_min = min_year as f64;
    let x_max = max_year as f64;

    let x_label_fmt = |x: &f64| (x.round() as i32).to_string();
    let y_label_fmt = move |v: &f64| {
        if y_max < 10.0 {
            format!("{:.1}", *v).replace('.', &dec_sep.to_string())
        } else {
            format!("{:.0}", *v)
        }
    };
    let x_label_count = ((max_year - min_year + 1) as usize).min(12);
    let y_label_count = 10usize;

    let left_label_width_px = compute_left_label_area_px(0.0, y_max, y_label_count, 12);
    let axis_x_start_px = MARGIN as i32 + left_label_width_px as i32;

    let legend_texts: Vec<String> = drawn.clone();
    let (root_w_u32, root_h_u32) = root.dim_in_pixel();
    let root_w = root_w_u32 as i32;
    let root_h = root_h_u32 as i32;

    let legend_needed_h = if matches!(legend, LegendMode::Top | LegendMode::Bottom) {
        estimate_top_bottom_legend_height_px(&legend_texts, axis_x_start_px, root_w)
    } else {
        0
    };

    let (plot_area, legend_area_opt): (DrawingArea<DB, Shift>, Option<DrawingArea<DB, Shift>>) =
        match legend {
            LegendMode::Right => {
                let (plot, legend) = root.split_horizontally((85).percent_width());
                (plot, Some(legend))
            }
            LegendMode::Top => {
                let h = legend_needed_h.max(40);
                let (legend, plot) = root.split_vertically(h);
                (plot, Some(legend))
            }
            LegendMode::Bottom => {
                let h = legend_needed_h.max(40);
                // keep at least 40px for plot area
                let (plot, legend) = root.split_vertically((root_h - h).max(40));
                (plot, Some(legend))
            }
            LegendMode::Inside => (root, None),
        };

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(MARGIN)
        .caption(
            if title.trim().is_empty() {
                kind.axis_label().to_string()
            } else {
                title.trim().to_string()
            },
            (FontFamily::SansSerif, 24),
        )
        .set_label_area_size(LabelAreaPosition::Left, left_label_width_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(kind.axis_label())
        .x_labels(x_label_count)
        .y_labels(y_label_count)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let mut legend_items: Vec<(String, RGBAColor)> = Vec::new();
    let inside_mode = matches!(legend, LegendMode::Inside);

    for country in &drawn {
        let style = SeriesStyle::for_country(country);
        let color = RGBColor(style.rgb.r, style.rgb.g, style.rgb.b).to_rgba();
        let series = models::series_for(records, country, kind);

        let series_f: Vec<(f64, f64)> = series
            .iter()
            .map(|(y, v)| (*y as f64, *v))
            .collect();
        let path = curve::monotone_path(&series_f, 16);

        let stroke = ShapeStyle {
            color,
            filled: false,
            stroke_width: style.line_width,
        };
        chart
            .draw_series(LineSeries::new(path, stroke))
            .map_err(|e| anyhow!("{:?}", e))?;
        let elem = chart
            .draw_series(
                series_f
                    .iter()
                    .map(|(x, y)| Circle::new((*x, *y), style.marker_size as i32, color.filled())),
            )
            .map_err(|e| anyhow!("{:?}", e))?;

        if inside_mode {
            let legend_color = color;
            let legend_text = country.clone();
            elem.label(legend_text.clone()).legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + Circle::new((x + 8, y), 4, legend_color.filled())
                    + Text::new(legend_text.clone(), (x + 20, y), (FontFamily::SansSerif, 14))
            });
        } else {
            legend_items.push((country.clone(), color));
        }

        if selection.show_trend {
            // Two-point dashed path spanning the chart's x-domain, not the
            // series' own year range. Silently absent under 2 points.
            if let Some(trend) = fit_trend(&series) {
                chart
                    .draw_series(DashedLineSeries::new(
                        [(x_min, trend.eval(x_min)), (x_max, trend.eval(x_max))],
                        6,
                        4,
                        color.stroke_width(1),
                    ))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
    }

    if inside_mode {
        chart
            .configure_series_labels()
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.85))
            .label_font((FontFamily::SansSerif, 14))
            .draw()
            .map_err(|e| anyhow!("{:?}", e))?;
    } else if let Some(ref legend_area) = legend_area_opt {
        draw_legend_panel(legend_area, &legend_items, legend, axis_x_start_px)?;
    }

    plot_area.present().map_err(|e| anyhow!("{:?}", e))?;
    if let Some(ref legend_area) = legend_area_opt {
        legend_area.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}
