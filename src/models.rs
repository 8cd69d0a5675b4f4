use serde::{Deserialize, Serialize};

/// One row of the renewable-energy dataset (one country, one year).
///
/// Share columns are percentages in 0–100. Values that failed numeric
/// coercion at load time are `None` and treated as absent downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub country: String,
    pub year: i32,
    pub renewable_share: Option<f64>,
    pub solar_share: Option<f64>,
    pub wind_share: Option<f64>,
    pub hydro_share: Option<f64>,
}

/// Which share column a chart or map reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyKind {
    Renewable,
    Solar,
    Wind,
    Hydro,
}

impl EnergyKind {
    pub const ALL: [EnergyKind; 4] = [
        EnergyKind::Renewable,
        EnergyKind::Solar,
        EnergyKind::Wind,
        EnergyKind::Hydro,
    ];

    /// Axis/legend label, e.g. "Renewable Energy Share (%)".
    pub fn axis_label(&self) -> &'static str {
        match self {
            EnergyKind::Renewable => "Renewable Energy Share (%)",
            EnergyKind::Solar => "Solar Share (%)",
            EnergyKind::Wind => "Wind Share (%)",
            EnergyKind::Hydro => "Hydro Share (%)",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyKind::Renewable => "renewable",
            EnergyKind::Solar => "solar",
            EnergyKind::Wind => "wind",
            EnergyKind::Hydro => "hydro",
        }
    }

    /// Read this kind's share column from a record.
    pub fn share_of(&self, r: &Record) -> Option<f64> {
        match self {
            EnergyKind::Renewable => r.renewable_share,
            EnergyKind::Solar => r.solar_share,
            EnergyKind::Wind => r.wind_share,
            EnergyKind::Hydro => r.hydro_share,
        }
    }
}

/// Look up the first record matching both country name and year.
///
/// This is the map's join: names must match verbatim, no normalization.
/// A miss means "no data" for the caller, never an error.
pub fn find_record<'a>(records: &'a [Record], country: &str, year: i32) -> Option<&'a Record> {
    records
        .iter()
        .find(|r| r.country == country && r.year == year)
}

/// Extract one country's series for a share column: (year, value) pairs
/// with non-null values only, sorted ascending by year.
pub fn series_for(records: &[Record], country: &str, kind: EnergyKind) -> Vec<(i32, f64)> {
    let mut out: Vec<(i32, f64)> = records
        .iter()
        .filter(|r| r.country == country)
        .filter_map(|r| kind.share_of(r).map(|v| (r.year, v)))
        .collect();
    out.sort_by_key(|(y, _)| *y);
    out
}

/// Distinct country names in first-appearance order.
pub fn country_names(records: &[Record]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for r in records {
        if seen.insert(r.country.as_str()) {
            out.push(r.country.clone());
        }
    }
    out
}

/// Inclusive (min, max) year range of the dataset, if non-empty.
pub fn year_bounds(records: &[Record]) -> Option<(i32, i32)> {
    let min = records.iter().map(|r| r.year).min()?;
    let max = records.iter().map(|r| r.year).max()?;
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn find_record_matches_name_and_year() {
        let data = vec![
            rec("Germany", 2019, Some(40.0)),
            rec("Germany", 2020, Some(45.0)),
            rec("Brazil", 2020, Some(80.0)),
        ];
        assert_eq!(
            find_record(&data, "Germany", 2020).map(|r| r.renewable_share),
            Some(Some(45.0))
        );
        assert!(find_record(&data, "Atlantis", 2020).is_none());
        assert!(find_record(&data, "Germany", 1900).is_none());
    }

    #[test]
    fn series_sorted_and_nulls_skipped() {
        let data = vec![
            rec("Norway", 2021, Some(98.0)),
            rec("Norway", 2019, None),
            rec("Norway", 2020, Some(97.0)),
        ];
        let s = series_for(&data, "Norway", EnergyKind::Renewable);
        assert_eq!(s, vec![(2020, 97.0), (2021, 98.0)]);
    }

    #[test]
    fn country_names_keep_first_appearance_order() {
        let data = vec![
            rec("Brazil", 2020, None),
            rec("Germany", 2020, None),
            rec("Brazil", 2021, None),
        ];
        assert_eq!(country_names(&data), vec!["Brazil", "Germany"]);
    }
}
