use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const SAMPLE_CSV: &str = "\
country,year,renewable_share,solar_share,wind_share,hydro_share
Germany,2000,10,1,2,3
Germany,2010,20,5,8,4
Germany,2020,30,10,15,5
Brazil,2000,80,0.5,1,70
Brazil,2010,82,1,3,72
Brazil,2020,85,4,6,70
";

const SQUARE_GEOJSON: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": { "name": "Germany" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[6,47],[15,47],[15,55],[6,55],[6,47]]]
            }
        },
        {
            "type": "Feature",
            "properties": { "name": "Atlantis" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-40,20],[-30,20],[-30,30],[-40,30],[-40,20]]]
            }
        }
    ]
}"#;

fn write_sample_csv(dir: &Path) -> PathBuf {
    let p = dir.join("shares.csv");
    fs::write(&p, SAMPLE_CSV).unwrap();
    p
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("renewatlas")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("chart")
                .and(predicate::str::contains("map"))
                .and(predicate::str::contains("stats")),
        );
}

#[test]
fn chart_writes_svg_with_series_and_trend() {
    let dir = tempdir().unwrap();
    let csv = write_sample_csv(dir.path());
    let out = dir.path().join("chart.svg");

    Command::cargo_bin("renewatlas")
        .unwrap()
        .args([
            "chart",
            "-i",
            csv.to_str().unwrap(),
            "-c",
            "Germany,Brazil",
            "--trend",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote chart"));

    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Germany"));
    assert!(svg.contains("Brazil"));
}

#[test]
fn chart_with_empty_selection_falls_back_to_first_country() {
    let dir = tempdir().unwrap();
    let csv = write_sample_csv(dir.path());
    let out = dir.path().join("fallback.svg");

    Command::cargo_bin("renewatlas")
        .unwrap()
        .args(["chart", "-i", csv.to_str().unwrap(), "-o", out.to_str().unwrap()])
        .assert()
        .success();

    // First country in the file is Germany.
    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("Germany"));
    assert!(!svg.contains("Brazil"));
}

#[test]
fn chart_rejects_missing_input() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("x.svg");
    Command::cargo_bin("renewatlas")
        .unwrap()
        .args(["chart", "-i", "does-not-exist.csv", "-o", out.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn stats_prints_per_country_summary() {
    let dir = tempdir().unwrap();
    let csv = write_sample_csv(dir.path());

    Command::cargo_bin("renewatlas")
        .unwrap()
        .args(["stats", "-i", csv.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(
                "Brazil  count=3 missing=0  min=80 max=85 mean=82.3333 median=82",
            )
            .and(predicate::str::contains(
                "Germany  count=3 missing=0  min=10 max=30 mean=20 median=20",
            )),
        );
}

#[test]
fn stats_with_solar_metric_uses_that_column() {
    let dir = tempdir().unwrap();
    let csv = write_sample_csv(dir.path());

    Command::cargo_bin("renewatlas")
        .unwrap()
        .args(["stats", "-i", csv.to_str().unwrap(), "-m", "solar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Germany  count=3 missing=0  min=1 max=10"));
}

#[test]
fn map_renders_from_local_boundaries() {
    let dir = tempdir().unwrap();
    let csv = write_sample_csv(dir.path());
    let geo = dir.path().join("world.geo.json");
    fs::write(&geo, SQUARE_GEOJSON).unwrap();
    let out = dir.path().join("map.svg");

    Command::cargo_bin("renewatlas")
        .unwrap()
        .args([
            "map",
            "-i",
            csv.to_str().unwrap(),
            "-b",
            geo.to_str().unwrap(),
            "-y",
            "2020",
            "--select",
            "Germany",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote map for 2020"));

    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.len() > 500);
}
