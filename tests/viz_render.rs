use renewatlas::app::ChartSelection;
use renewatlas::geo;
use renewatlas::models::{EnergyKind, Record};
use renewatlas::viz::map::{share_color, MapTransform, NO_DATA_FILL};
use renewatlas::viz::{self, LegendMode};
use std::fs;
use tempfile::tempdir;

fn rec(country: &str, year: i32, share: Option<f64>) -> Record {
    Record {
        country: country.into(),
        year,
        renewable_share: share,
        solar_share: None,
        wind_share: None,
        hydro_share: None,
    }
}

fn sample() -> Vec<Record> {
    vec![
        rec("Germany", 2000, Some(10.0)),
        rec("Germany", 2010, Some(20.0)),
        rec("Germany", 2020, Some(30.0)),
        rec("Brazil", 2000, Some(80.0)),
        rec("Brazil", 2010, Some(82.0)),
        rec("Brazil", 2020, Some(85.0)),
    ]
}

#[test]
fn chart_svg_lists_selected_series_in_legend_order() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("chart.svg");
    let mut sel = ChartSelection::default();
    sel.set(["Brazil", "Germany"]);

    viz::plot_chart(
        &sample(),
        &sel,
        EnergyKind::Renewable,
        &out,
        800,
        500,
        "en",
        LegendMode::Bottom,
        "",
    )
    .unwrap();

    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
    // Insertion order drives the legend order.
    let brazil = svg.find("Brazil").unwrap();
    let germany = svg.find("Germany").unwrap();
    assert!(brazil < germany);
}

#[test]
fn trend_flag_adds_series_without_erroring_on_short_ones() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("trend.svg");
    let mut records = sample();
    // One-point series: no trend is fitted, drawing must still succeed.
    records.push(rec("Iceland", 2020, Some(99.0)));

    let mut sel = ChartSelection::default();
    sel.set(["Germany", "Iceland"]);
    sel.show_trend = true;

    viz::plot_chart(
        &records,
        &sel,
        EnergyKind::Renewable,
        &out,
        800,
        500,
        "en",
        LegendMode::Right,
        "Trends",
    )
    .unwrap();

    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("Trends"));
    assert!(svg.contains("Iceland"));
}

#[test]
fn empty_dataset_renders_placeholder() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("empty.svg");
    let sel = ChartSelection::default();

    viz::plot_lines(&[], &sel, EnergyKind::Renewable, &out, 400, 300).unwrap();

    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("No data available"));
}

#[test]
fn chart_renders_into_rgb_buffer() {
    let (w, h) = (400u32, 300u32);
    let mut buf = vec![0u8; (w * h * 3) as usize];
    let mut sel = ChartSelection::default();
    sel.set(["Germany"]);

    viz::render_chart_into(
        &mut buf,
        &sample(),
        &sel,
        EnergyKind::Renewable,
        w,
        h,
        "en",
        LegendMode::Bottom,
        "",
    )
    .unwrap();

    // White background means the buffer can no longer be all zero.
    assert!(buf.iter().any(|&b| b == 0xff));
}

#[test]
fn map_fills_matched_country_with_ramp_color() {
    // Square in the southern hemisphere, clear of the caption text.
    let shapes = geo::parse_features(
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"Atlantis"},
             "geometry":{"type":"Polygon",
              "coordinates":[[[0,-40],[10,-40],[10,-30],[0,-30],[0,-40]]]}}
        ]}"#,
    )
    .unwrap();
    let records = vec![rec("Atlantis", 2020, Some(50.0))];

    let (w, h) = (400u32, 300u32);
    let transform = MapTransform::new(w, h);
    let mut buf = vec![0u8; (w * h * 3) as usize];
    viz::map::render_map_into(
        &mut buf,
        &shapes,
        &records,
        EnergyKind::Renewable,
        2020,
        None,
        &transform,
    )
    .unwrap();

    let (px, py) = transform.to_pixel(5.0, -35.0);
    let idx = ((py.round() as usize) * w as usize + px.round() as usize) * 3;
    let expected = share_color(50.0);
    assert_eq!(
        (buf[idx], buf[idx + 1], buf[idx + 2]),
        (expected.0, expected.1, expected.2)
    );
}

#[test]
fn map_uses_gray_when_the_join_misses() {
    let shapes = geo::parse_features(
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"Atlantis"},
             "geometry":{"type":"Polygon",
              "coordinates":[[[0,-40],[10,-40],[10,-30],[0,-30],[0,-40]]]}}
        ]}"#,
    )
    .unwrap();
    // Record exists for another year only: the 1999 frame has no data.
    let records = vec![rec("Atlantis", 2020, Some(50.0))];

    let (w, h) = (400u32, 300u32);
    let transform = MapTransform::new(w, h);
    let mut buf = vec![0u8; (w * h * 3) as usize];
    viz::map::render_map_into(
        &mut buf,
        &shapes,
        &records,
        EnergyKind::Renewable,
        1999,
        None,
        &transform,
    )
    .unwrap();

    let (px, py) = transform.to_pixel(5.0, -35.0);
    let idx = ((py.round() as usize) * w as usize + px.round() as usize) * 3;
    assert_eq!(
        (buf[idx], buf[idx + 1], buf[idx + 2]),
        (NO_DATA_FILL.0, NO_DATA_FILL.1, NO_DATA_FILL.2)
    );
}

#[test]
fn map_svg_export_carries_caption_year() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("map.svg");
    let shapes = geo::parse_features(
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"Atlantis"},
             "geometry":{"type":"Polygon",
              "coordinates":[[[0,-40],[10,-40],[10,-30],[0,-30],[0,-40]]]}}
        ]}"#,
    )
    .unwrap();
    let records = vec![rec("Atlantis", 2020, Some(50.0))];

    viz::map::render_map(
        &shapes,
        &records,
        EnergyKind::Renewable,
        2020,
        Some("Atlantis"),
        &MapTransform::new(400, 300),
        &out,
    )
    .unwrap();

    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("2020"));
}
