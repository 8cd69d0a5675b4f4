use crate::models::Record;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Load records from a CSV file with columns
/// `country, year, renewable_share, solar_share, wind_share, hydro_share`.
///
/// Numeric coercion is lenient: a share that fails to parse becomes `None`;
/// a row with an unparseable country or year is skipped with a warning.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_csv(file)
}

/// Load records from CSV text already in memory (e.g. fetched over HTTP).
pub fn load_csv_str(text: &str) -> Result<Vec<Record>> {
    read_csv(text.as_bytes())
}

/// Fetch a CSV resource by URL and parse it. Uses the same lenient
/// coercion as [`load_csv`].
pub fn fetch_csv(url: &str) -> Result<Vec<Record>> {
    let http = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .connect_timeout(std::time::Duration::from_secs(10))
        .user_agent(concat!("renewatlas/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("build http client")?;
    let body = http
        .get(url)
        .send()
        .with_context(|| format!("GET {}", url))?
        .error_for_status()
        .with_context(|| format!("GET {}", url))?
        .text()
        .context("read csv body")?;
    load_csv_str(&body)
}

fn read_csv<R: Read>(rdr: R) -> Result<Vec<Record>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(rdr);

    let headers = reader.headers().context("read csv header")?.clone();
    let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let country_col = col("country").context("missing `country` column")?;
    let year_col = col("year").context("missing `year` column")?;
    let share_cols = [
        col("renewable_share"),
        col("solar_share"),
        col("wind_share"),
        col("hydro_share"),
    ];

    let mut out = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("csv row {}", i + 2))?;
        let country = match row.get(country_col) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => {
                log::warn!("skipping csv row {}: empty country", i + 2);
                continue;
            }
        };
        let year = match row.get(year_col).and_then(|y| y.parse::<i32>().ok()) {
            Some(y) => y,
            None => {
                log::warn!("skipping csv row {}: unparseable year", i + 2);
                continue;
            }
        };
        let share = |idx: Option<usize>| -> Option<f64> {
            idx.and_then(|c| row.get(c))
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };
        out.push(Record {
            country,
            year,
            renewable_share: share(share_cols[0]),
            solar_share: share(share_cols[1]),
            wind_share: share(share_cols[2]),
            hydro_share: share(share_cols[3]),
        });
    }
    Ok(out)
}

/// Save records as CSV with header (same schema the loader accepts).
pub fn save_csv<P: AsRef<Path>>(records: &[Record], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize((
        "country",
        "year",
        "renewable_share",
        "solar_share",
        "wind_share",
        "hydro_share",
    ))?;
    for r in records {
        wtr.serialize((
            &r.country,
            r.year,
            r.renewable_share,
            r.solar_share,
            r.wind_share,
            r.hydro_share,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save records as pretty JSON array.
pub fn save_json<P: AsRef<Path>>(records: &[Record], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(records)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
