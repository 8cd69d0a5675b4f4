//! renewatlas
//!
//! A lightweight Rust library for loading, storing, visualizing, and
//! analyzing renewable-energy shares per country and year. Pairs with the
//! `renewatlas` CLI and the `renewatlas-gui` desktop app.
//!
//! ### Features
//! - Load the share dataset from a CSV file or URL (lenient numeric coercion)
//! - Multi-series line charts with per-series least-squares trend lines
//! - Choropleth world map joined by country name for a selectable year
//! - Quick summary statistics (min, max, mean, median) per country
//!
//! ### Example
//! ```no_run
//! use renewatlas::app::ChartSelection;
//! use renewatlas::models::EnergyKind;
//!
//! let records = renewatlas::storage::load_csv("renewables.csv")?;
//! let mut selection = ChartSelection::default();
//! selection.set(["Germany", "Brazil"]);
//! selection.show_trend = true;
//! renewatlas::viz::plot_lines(
//!     &records,
//!     &selection,
//!     EnergyKind::Renewable,
//!     "shares.svg",
//!     1000,
//!     600,
//! )?;
//! let stats = renewatlas::stats::grouped_summary(&records, EnergyKind::Renewable);
//! println!("{:#?}", stats);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod app;
pub mod geo;
pub mod models;
pub mod stats;
pub mod storage;
pub mod style;
pub mod viz;

pub use app::{AppContext, ChartSelection, MapState};
pub use models::{EnergyKind, Record};
