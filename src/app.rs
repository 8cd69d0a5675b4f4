//! Application context: one object owning the shared dataset, the boundary
//! shapes, and both views' mutable state.
//!
//! The dataset is read-only after load; the chart and map each own a small
//! piece of UI state. The map never talks to the chart directly: a map
//! click goes through [`AppContext::handle_map_click`], the single seam
//! between the two views.

use crate::geo::CountryShape;
use crate::models::{self, Record};

/// Default slider bounds when the dataset is empty.
pub const DEFAULT_YEAR_MIN: i32 = 1990;
pub const DEFAULT_YEAR_MAX: i32 = 2023;

/// Quick-select presets surfaced as one-click buttons.
pub const QUICK_SELECT: &[(&str, &[&str])] = &[
    ("Top producers", &["China", "United States", "Brazil", "India", "Germany"]),
    ("Nordics", &["Norway", "Sweden", "Denmark", "Finland", "Iceland"]),
    ("South America", &["Brazil", "Argentina", "Chile", "Colombia", "Paraguay"]),
];

/// The line chart's selection state: an ordered set of country names
/// (insertion order = draw/legend order) plus the trend-line flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSelection {
    countries: Vec<String>,
    pub show_trend: bool,
}

impl ChartSelection {
    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Append a country if not already selected. Returns true on change.
    pub fn add(&mut self, name: &str) -> bool {
        if self.countries.iter().any(|c| c == name) {
            return false;
        }
        self.countries.push(name.to_string());
        true
    }

    /// Toggle one country's membership (legend-item click).
    pub fn toggle(&mut self, name: &str) {
        if let Some(pos) = self.countries.iter().position(|c| c == name) {
            self.countries.remove(pos);
        } else {
            self.countries.push(name.to_string());
        }
    }

    /// Replace the whole selection (multi-select / quick-select buttons).
    /// Duplicates in the input are dropped, first occurrence wins.
    pub fn set<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.countries.clear();
        for n in names {
            self.add(n.as_ref());
        }
    }

    pub fn clear(&mut self) {
        self.countries.clear();
    }
}

/// The map view's state: the slider-bound year and the exclusively
/// selected (clicked) shape, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct MapState {
    year: i32,
    pub year_min: i32,
    pub year_max: i32,
    pub selected: Option<String>,
}

impl MapState {
    /// Bounds come from the dataset's year range; an empty dataset falls
    /// back to 1990–2023. The initial year is the upper bound.
    pub fn new(records: &[Record]) -> Self {
        let (year_min, year_max) =
            models::year_bounds(records).unwrap_or((DEFAULT_YEAR_MIN, DEFAULT_YEAR_MAX));
        MapState {
            year: year_max,
            year_min,
            year_max,
            selected: None,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Set the current year, clamped to the slider bounds.
    pub fn set_year(&mut self, year: i32) {
        self.year = year.clamp(self.year_min, self.year_max);
    }
}

/// Owns the shared dataset and both views' state.
pub struct AppContext {
    pub records: Vec<Record>,
    pub shapes: Vec<CountryShape>,
    pub chart: ChartSelection,
    pub map: MapState,
}

impl AppContext {
    pub fn new(records: Vec<Record>, shapes: Vec<CountryShape>) -> Self {
        let map = MapState::new(&records);
        AppContext {
            records,
            shapes,
            chart: ChartSelection::default(),
            map,
        }
    }

    /// The map→chart seam: mark the clicked shape as the map's exclusive
    /// selection and append the country to the chart selection (at most
    /// once). Returns true if the chart selection changed.
    pub fn handle_map_click(&mut self, country: &str) -> bool {
        self.map.selected = Some(country.to_string());
        self.chart.add(country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    fn rec(country: &str, year: i32) -> Record {
        Record {
            country: country.into(),
            year,
            renewable_share: Some(1.0),
            solar_share: None,
            wind_share: None,
            hydro_share: None,
        }
    }

    #[test]
    fn map_click_appends_once() {
        let mut app = AppContext::new(vec![rec("Brazil", 2020)], vec![]);
        assert!(app.handle_map_click("Brazil"));
        assert!(!app.handle_map_click("Brazil"));
        assert_eq!(app.chart.countries(), ["Brazil"]);
        assert_eq!(app.map.selected.as_deref(), Some("Brazil"));
    }

    #[test]
    fn selection_roundtrip_is_idempotent() {
        let mut sel = ChartSelection::default();
        sel.set(["Germany", "Brazil", "Norway"]);
        let direct = sel.clone();
        sel.clear();
        assert!(sel.is_empty());
        sel.set(["Germany", "Brazil", "Norway"]);
        assert_eq!(sel, direct);
    }

    #[test]
    fn toggle_removes_and_reinserts_at_end() {
        let mut sel = ChartSelection::default();
        sel.set(["Germany", "Brazil"]);
        sel.toggle("Germany");
        assert_eq!(sel.countries(), ["Brazil"]);
        sel.toggle("Germany");
        assert_eq!(sel.countries(), ["Brazil", "Germany"]);
    }

    #[test]
    fn year_is_clamped_to_bounds() {
        let mut map = MapState::new(&[rec("Brazil", 2000), rec("Brazil", 2010)]);
        assert_eq!(map.year(), 2010);
        map.set_year(1800);
        assert_eq!(map.year(), 2000);
        map.set_year(2999);
        assert_eq!(map.year(), 2010);
    }

    #[test]
    fn empty_dataset_uses_default_bounds() {
        let map = MapState::new(&[]);
        assert_eq!((map.year_min, map.year_max), (1990, 2023));
        assert_eq!(map.year(), 2023);
    }
}
