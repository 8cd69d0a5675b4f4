//! Legend layout and drawing for external legend placement.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontFamily;

use super::text::{estimate_text_width_px, truncate_to_width};
use super::types::LegendMode;

const FONT_PX: u32 = 14;
const LINE_H: i32 = FONT_PX as i32 + 2;
const PAD: i32 = 8;
const MARKER_R: i32 = 4;
const MARKER_GAP: i32 = 12;
const TRAILING: i32 = 12;

fn block_width(label: &str) -> i32 {
    MARKER_GAP + MARKER_R + estimate_text_width_px(label, FONT_PX) as i32 + TRAILING
}

/// Estimate how tall the TOP/BOTTOM legend band must be to fit all items.
/// Mirrors the flow logic in [`draw_legend_panel`] so the band never clips.
pub fn estimate_top_bottom_legend_height_px(labels: &[String], start_x: i32, total_w: i32) -> i32 {
    let usable = total_w - PAD;
    let mut rows = 1;
    let mut x = start_x;
    for label in labels {
        let w = block_width(label);
        if x + w > usable && x > start_x {
            rows += 1;
            x = start_x;
        }
        x += w;
    }
    PAD + rows * (LINE_H + 4) + PAD
}

/// Draw the legend items into their own drawing area.
///
/// `Right` stacks items vertically; `Top`/`Bottom` flow them in rows,
/// starting at `axis_x_start_px` so the first item aligns with the plot's
/// x-axis. Labels too wide for the panel are truncated with an ellipsis.
pub fn draw_legend_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    items: &[(String, RGBAColor)],
    mode: LegendMode,
    axis_x_start_px: i32,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let (w_u32, _h) = area.dim_in_pixel();
    let w = w_u32 as i32;
    let text_style = TextStyle::from((FontFamily::SansSerif, FONT_PX).into_font())
        .pos(Pos::new(HPos::Left, VPos::Center));

    match mode {
        LegendMode::Right => {
            let max_text_px = (w - (PAD + MARKER_GAP + MARKER_R + TRAILING)).max(40) as u32;
            let mut y = PAD + LINE_H / 2;
            for (label, color) in items {
                let label = truncate_to_width(label, FONT_PX, max_text_px);
                area.draw(&Circle::new((PAD + MARKER_R, y), MARKER_R, color.filled()))
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
                area.draw(&Text::new(
                    label,
                    (PAD + MARKER_R + MARKER_GAP, y),
                    text_style.clone(),
                ))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
                y += LINE_H + 4;
            }
        }
        LegendMode::Top | LegendMode::Bottom => {
            let usable = w - PAD;
            let mut x = axis_x_start_px;
            let mut y = PAD + LINE_H / 2;
            for (label, color) in items {
                let bw = block_width(label);
                if x + bw > usable && x > axis_x_start_px {
                    x = axis_x_start_px;
                    y += LINE_H + 4;
                }
                area.draw(&Circle::new((x + MARKER_R, y), MARKER_R, color.filled()))
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
                area.draw(&Text::new(
                    label.clone(),
                    (x + MARKER_R + MARKER_GAP, y),
                    text_style.clone(),
                ))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
                x += bw;
            }
        }
        LegendMode::Inside => {}
    }
    Ok(())
}
