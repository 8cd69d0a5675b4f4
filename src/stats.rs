use crate::models::{EnergyKind, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics for one country's share column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub country: String,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute per-country statistics for the chosen share column.
pub fn grouped_summary(records: &[Record], kind: EnergyKind) -> Vec<Summary> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut missing: BTreeMap<String, usize> = BTreeMap::new();
    for r in records {
        match kind.share_of(r) {
            Some(v) => groups.entry(r.country.clone()).or_default().push(v),
            None => *missing.entry(r.country.clone()).or_default() += 1,
        }
    }

    let mut out = Vec::new();
    for (country, mut vals) in groups {
        vals.sort_by(|a, b| a.total_cmp(b));
        let count = vals.len();
        let min = vals.first().cloned();
        let max = vals.last().cloned();
        let mean = if count > 0 {
            Some(vals.iter().copied().sum::<f64>() / count as f64)
        } else {
            None
        };
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2])
        } else {
            Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
        };
        let miss = missing.remove(&country).unwrap_or(0);
        out.push(Summary {
            country,
            count,
            missing: miss,
            min,
            max,
            mean,
            median,
        });
    }
    // Countries with only missing values still get a row.
    for (country, miss) in missing {
        out.push(Summary {
            country,
            count: 0,
            missing: miss,
            min: None,
            max: None,
            mean: None,
            median: None,
        });
    }
    out.sort_by(|a, b| a.country.cmp(&b.country));
    out
}

/// Ordinary least-squares line fitted over one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// Evaluate the fitted line at `x` (a year).
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit an OLS trend over (year, share) points via closed-form sums.
///
/// Returns `None` for fewer than two points, and also when all years are
/// identical (zero denominator). Both mean "no trend line", silently.
pub fn fit_trend(points: &[(i32, f64)]) -> Option<TrendLine> {
    let n = points.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| *x as f64).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| *y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| *x as f64 * *y).sum();
    let sum_xx: f64 = points.iter().map(|(x, _)| (*x as f64).powi(2)).sum();

    let denom = nf * sum_xx - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let slope = (nf * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / nf;
    Some(TrendLine { slope, intercept })
}
