use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use renewatlas::app::{ChartSelection, MapState};
use renewatlas::models::EnergyKind;
use renewatlas::viz::map::MapTransform;
use renewatlas::viz::LegendMode;
use renewatlas::{geo, stats, storage, viz};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "renewatlas",
    version,
    about = "Chart & map renewable-energy shares from a country/year CSV"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a multi-series line chart (optionally with trend lines).
    Chart(ChartArgs),
    /// Render a choropleth world map for one year.
    Map(MapArgs),
    /// Print per-country summary statistics to stdout.
    Stats(StatsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Metric {
    Renewable,
    Solar,
    Wind,
    Hydro,
}

impl From<Metric> for EnergyKind {
    fn from(m: Metric) -> Self {
        match m {
            Metric::Renewable => EnergyKind::Renewable,
            Metric::Solar => EnergyKind::Solar,
            Metric::Wind => EnergyKind::Wind,
            Metric::Hydro => EnergyKind::Hydro,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LegendOpt {
    Inside,
    Right,
    Top,
    Bottom,
}

impl From<LegendOpt> for LegendMode {
    fn from(l: LegendOpt) -> Self {
        match l {
            LegendOpt::Inside => LegendMode::Inside,
            LegendOpt::Right => LegendMode::Right,
            LegendOpt::Top => LegendMode::Top,
            LegendOpt::Bottom => LegendMode::Bottom,
        }
    }
}

#[derive(Args, Debug)]
struct ChartArgs {
    /// CSV path or http(s) URL with country/year share columns.
    #[arg(short, long)]
    input: String,
    /// Country names separated by comma or semicolon. Empty = first
    /// country in the dataset.
    #[arg(short, long, default_value = "")]
    countries: String,
    /// Which share column to chart.
    #[arg(short, long, value_enum, default_value_t = Metric::Renewable)]
    metric: Metric,
    /// Draw a dashed least-squares trend line per series.
    #[arg(long, default_value_t = false)]
    trend: bool,
    /// Output path (.svg or .png).
    #[arg(short, long)]
    out: PathBuf,
    /// Width of the chart (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the chart (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Locale for number formatting (en, de, fr, es, it, pt, nl).
    #[arg(long, default_value = "en")]
    locale: String,
    /// Legend placement.
    #[arg(long, value_enum, default_value_t = LegendOpt::Bottom)]
    legend: LegendOpt,
    /// Custom chart title.
    #[arg(long, default_value = "")]
    title: String,
}

#[derive(Args, Debug)]
struct MapArgs {
    /// CSV path or http(s) URL with country/year share columns.
    #[arg(short, long)]
    input: String,
    /// Boundary GeoJSON path or URL (defaults to the world countries file).
    #[arg(short, long)]
    boundaries: Option<String>,
    /// Year to color by (default: latest year in the dataset).
    #[arg(short, long)]
    year: Option<i32>,
    /// Which share column to map.
    #[arg(short, long, value_enum, default_value_t = Metric::Renewable)]
    metric: Metric,
    /// Country name to outline as selected.
    #[arg(long)]
    select: Option<String>,
    /// Output path (.svg or .png).
    #[arg(short, long)]
    out: PathBuf,
    /// Width of the map (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the map (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// CSV path or http(s) URL with country/year share columns.
    #[arg(short, long)]
    input: String,
    /// Which share column to summarize.
    #[arg(short, long, value_enum, default_value_t = Metric::Renewable)]
    metric: Metric,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn load_records(input: &str) -> Result<Vec<renewatlas::Record>> {
    if input.starts_with("http://") || input.starts_with("https://") {
        storage::fetch_csv(input)
    } else {
        storage::load_csv(input)
    }
}

fn load_shapes(source: Option<&str>) -> Result<Vec<geo::CountryShape>> {
    match source {
        Some(s) if s.starts_with("http://") || s.starts_with("https://") => {
            geo::fetch_boundaries(s)
        }
        Some(s) => geo::load_file(s),
        None => geo::fetch_boundaries(geo::DEFAULT_BOUNDARIES_URL),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Chart(args) => cmd_chart(args),
        Command::Map(args) => cmd_map(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

fn cmd_chart(args: ChartArgs) -> Result<()> {
    let records = load_records(&args.input)?;
    let mut selection = ChartSelection::default();
    selection.set(parse_list(&args.countries));
    selection.show_trend = args.trend;

    viz::plot_chart(
        &records,
        &selection,
        args.metric.into(),
        &args.out,
        args.width,
        args.height,
        &args.locale,
        args.legend.into(),
        &args.title,
    )?;
    eprintln!("Wrote chart to {}", args.out.display());
    Ok(())
}

fn cmd_map(args: MapArgs) -> Result<()> {
    let records = load_records(&args.input)?;
    let shapes = load_shapes(args.boundaries.as_deref())?;
    let map_state = MapState::new(&records);
    let year = args.year.unwrap_or_else(|| map_state.year());

    let transform = MapTransform::new(args.width, args.height);
    viz::map::render_map(
        &shapes,
        &records,
        args.metric.into(),
        year,
        args.select.as_deref(),
        &transform,
        &args.out,
    )?;
    eprintln!(
        "Wrote map for {} ({} shapes) to {}",
        year,
        shapes.len(),
        args.out.display()
    );
    Ok(())
}

fn cmd_stats(args: StatsArgs) -> Result<()> {
    let records = load_records(&args.input)?;
    let summaries = stats::grouped_summary(&records, args.metric.into());
    for s in summaries {
        println!(
            "{}  count={} missing={}  min={} max={} mean={} median={}",
            s.country,
            s.count,
            s.missing,
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.mean),
            fmt_opt(s.median)
        );
    }
    Ok(())
}
