//! Formatting helpers for axis ticks and tooltips.

use num_format::Locale;

use super::text::estimate_text_width_px;

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal
/// separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`,
/// `german`, `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

/// Format a share to one decimal with the locale's decimal separator,
/// e.g. `45.2%` / `45,2%`. Used by tooltips and stats output.
pub fn format_share(value: f64, dec_sep: char) -> String {
    let s = format!("{:.1}", value);
    let s = if dec_sep == '.' {
        s
    } else {
        s.replace('.', &dec_sep.to_string())
    };
    format!("{s}%")
}

/// Compute a tight left label area width for the percent Y axis (pixels),
/// based on the formatted tick labels that will appear.
pub fn compute_left_label_area_px(ymin: f64, ymax: f64, ticks: usize, font_px: u32) -> u32 {
    // Must match the formatter used in .configure_mesh().y_label_formatter(...)
    let y_label_fmt = |v: f64| format!("{:.0}", v);

    let mut max_px = 0u32;
    for i in 0..=ticks {
        let t = if ticks == 0 {
            0.0
        } else {
            i as f64 / ticks as f64
        };
        let v = ymin + (ymax - ymin) * t;
        max_px = max_px.max(estimate_text_width_px(&y_label_fmt(v), font_px));
    }

    // Padding for tick marks, clamped to avoid extremes.
    max_px.saturating_add(18).clamp(40, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_formatting_rounds_to_one_decimal() {
        assert_eq!(format_share(45.26, '.'), "45.3%");
        assert_eq!(format_share(45.26, ','), "45,3%");
        assert_eq!(format_share(0.0, '.'), "0.0%");
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        let (_, sep) = map_locale("xx");
        assert_eq!(sep, '.');
        let (_, sep) = map_locale("de");
        assert_eq!(sep, ',');
    }
}
