/*!
 * GUI application for renewatlas - interactive renewable-energy dashboard
 *
 * A cross-platform desktop application with two tabs over one shared
 * dataset:
 * - a choropleth world map with a year slider, pan/zoom and click-to-select
 * - a multi-series line chart with country selection and trend lines
 *
 * Platform support: Windows, macOS, Linux
 */

use eframe::egui;
use renewatlas::app::{AppContext, QUICK_SELECT};
use renewatlas::geo::{self, CountryShape};
use renewatlas::models::{self, EnergyKind, Record};
use renewatlas::style::SeriesStyle;
use renewatlas::viz::map::MapTransform;
use renewatlas::viz::{self, LegendMode};
use renewatlas::{stats, storage};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

const CHART_W: u32 = 960;
const CHART_H: u32 = 540;
const MAP_W: u32 = 960;
const MAP_H: u32 = 560;

fn main() -> Result<(), eframe::Error> {
    // Enable logging for better debugging
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1240.0, 760.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Renewable Energy Atlas"),
        ..Default::default()
    };

    eframe::run_native(
        "Renewable Energy Atlas",
        options,
        Box::new(|_cc| Ok(Box::new(AtlasApp::new()))),
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tab {
    Map,
    Chart,
}

/// Outcome of the background data load. Boundary failure is non-fatal:
/// the chart still works, the map just never populates.
struct LoadResult {
    records: Result<Vec<Record>, String>,
    shapes: Result<Vec<CountryShape>, String>,
}

/// Main application state
struct AtlasApp {
    // Data sources
    csv_source: String,
    boundaries_source: String,

    // Loaded state (None until the first successful load)
    app: Option<AppContext>,
    metric: EnergyKind,
    locale: String,

    // View state
    tab: Tab,
    transform: MapTransform,
    chart_dirty: bool,
    map_dirty: bool,
    chart_texture: Option<egui::TextureHandle>,
    map_texture: Option<egui::TextureHandle>,

    // UI state
    is_loading: bool,
    status_message: String,
    error_message: String,

    // Background operation
    load_receiver: Option<mpsc::Receiver<LoadResult>>,
}

impl AtlasApp {
    fn new() -> Self {
        Self {
            csv_source: String::new(),
            boundaries_source: geo::DEFAULT_BOUNDARIES_URL.to_string(),
            app: None,
            metric: EnergyKind::Renewable,
            locale: "en".to_string(),
            tab: Tab::Map,
            transform: MapTransform::new(MAP_W, MAP_H),
            chart_dirty: false,
            map_dirty: false,
            chart_texture: None,
            map_texture: None,
            is_loading: false,
            status_message: String::new(),
            error_message: String::new(),
            load_receiver: None,
        }
    }

    fn start_load(&mut self) {
        if self.csv_source.trim().is_empty() {
            self.error_message = "Please choose a CSV file or URL".to_string();
            return;
        }
        self.is_loading = true;
        self.error_message.clear();
        self.status_message = "Loading dataset…".to_string();

        let (sender, receiver) = mpsc::channel();
        self.load_receiver = Some(receiver);

        let csv_source = self.csv_source.trim().to_string();
        let boundaries_source = self.boundaries_source.trim().to_string();

        thread::spawn(move || {
            let records = load_records(&csv_source).map_err(|e| format!("{e:#}"));
            let shapes = if boundaries_source.is_empty() {
                Ok(Vec::new())
            } else {
                load_shapes(&boundaries_source).map_err(|e| format!("{e:#}"))
            };
            let _ = sender.send(LoadResult { records, shapes });
        });
    }

    fn check_load_result(&mut self) {
        if let Some(receiver) = &self.load_receiver {
            if let Ok(result) = receiver.try_recv() {
                self.is_loading = false;
                self.load_receiver = None;

                // CSV failure falls back to an empty dataset; the views
                // render their "no data" placeholders instead of erroring.
                let records = match result.records {
                    Ok(r) => {
                        self.status_message = format!("Loaded {} rows", r.len());
                        r
                    }
                    Err(e) => {
                        log::error!("csv load failed: {}", e);
                        self.error_message = format!("Failed to load CSV: {}", e);
                        Vec::new()
                    }
                };
                let shapes = match result.shapes {
                    Ok(s) => s,
                    Err(e) => {
                        log::error!("boundary load failed: {}", e);
                        self.status_message
                            .push_str(" (map boundaries unavailable)");
                        Vec::new()
                    }
                };

                self.app = Some(AppContext::new(records, shapes));
                self.transform = MapTransform::new(MAP_W, MAP_H);
                self.chart_dirty = true;
                self.map_dirty = true;
            }
        }
    }

    fn refresh_chart(&mut self, ctx: &egui::Context) {
        let Some(app) = &self.app else { return };
        let mut buf = vec![0u8; (CHART_W * CHART_H * 3) as usize];
        match viz::render_chart_into(
            &mut buf,
            &app.records,
            &app.chart,
            self.metric,
            CHART_W,
            CHART_H,
            &self.locale,
            LegendMode::Bottom,
            "",
        ) {
            Ok(()) => {
                let image = egui::ColorImage::from_rgb([CHART_W as usize, CHART_H as usize], &buf);
                match &mut self.chart_texture {
                    Some(tex) => tex.set(image, egui::TextureOptions::LINEAR),
                    None => {
                        self.chart_texture = Some(ctx.load_texture(
                            "chart",
                            image,
                            egui::TextureOptions::LINEAR,
                        ))
                    }
                }
                self.chart_dirty = false;
            }
            Err(e) => {
                log::error!("chart render failed: {}", e);
                self.error_message = format!("Chart render failed: {}", e);
                self.chart_dirty = false;
            }
        }
    }

    fn refresh_map(&mut self, ctx: &egui::Context) {
        let Some(app) = &self.app else { return };
        let mut buf = vec![0u8; (MAP_W * MAP_H * 3) as usize];
        match viz::map::render_map_into(
            &mut buf,
            &app.shapes,
            &app.records,
            self.metric,
            app.map.year(),
            app.map.selected.as_deref(),
            &self.transform,
        ) {
            Ok(()) => {
                let image = egui::ColorImage::from_rgb([MAP_W as usize, MAP_H as usize], &buf);
                match &mut self.map_texture {
                    Some(tex) => tex.set(image, egui::TextureOptions::LINEAR),
                    None => {
                        self.map_texture =
                            Some(ctx.load_texture("map", image, egui::TextureOptions::LINEAR))
                    }
                }
                self.map_dirty = false;
            }
            Err(e) => {
                log::error!("map render failed: {}", e);
                self.error_message = format!("Map render failed: {}", e);
                self.map_dirty = false;
            }
        }
    }

    fn source_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("CSV:");
            ui.add(
                egui::TextEdit::singleline(&mut self.csv_source)
                    .desired_width(320.0)
                    .hint_text("path or https:// URL"),
            );
            if ui.button("Browse").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("CSV", &["csv"])
                    .pick_file()
                {
                    self.csv_source = path.to_string_lossy().to_string();
                }
            }
            ui.label("Boundaries:");
            ui.add(
                egui::TextEdit::singleline(&mut self.boundaries_source)
                    .desired_width(260.0)
                    .hint_text("GeoJSON path or URL"),
            );
            if ui
                .add_enabled(!self.is_loading, egui::Button::new("Load"))
                .clicked()
            {
                self.start_load();
            }
            if self.is_loading {
                ui.spinner();
            }
        });
    }

    fn metric_selector(&mut self, ui: &mut egui::Ui) {
        let before = self.metric;
        ui.horizontal(|ui| {
            ui.label("Metric:");
            egui::ComboBox::from_id_salt("metric")
                .selected_text(self.metric.axis_label())
                .show_ui(ui, |ui| {
                    for kind in EnergyKind::ALL {
                        ui.selectable_value(&mut self.metric, kind, kind.axis_label());
                    }
                });
        });
        if self.metric != before {
            self.chart_dirty = true;
            self.map_dirty = true;
        }
    }

    fn chart_tab(&mut self, ui: &mut egui::Ui) {
        let Some(app) = &mut self.app else {
            ui.label("Load a dataset to see the chart.");
            return;
        };

        let names = models::country_names(&app.records);
        let mut dirty = false;

        ui.horizontal(|ui| {
            for (label, countries) in QUICK_SELECT {
                if ui.button(*label).clicked() {
                    app.chart.set(countries.iter().copied());
                    dirty = true;
                }
            }
            if ui.button("Clear").clicked() {
                app.chart.clear();
                dirty = true;
            }
            let mut show_trend = app.chart.show_trend;
            if ui.checkbox(&mut show_trend, "Show trend lines").changed() {
                app.chart.show_trend = show_trend;
                dirty = true;
            }
        });

        ui.add_space(4.0);
        ui.horizontal_top(|ui| {
            // Country multi-select
            ui.vertical(|ui| {
                ui.set_width(200.0);
                ui.label("Countries");
                egui::ScrollArea::vertical()
                    .id_salt("country_list")
                    .max_height(CHART_H as f32 - 40.0)
                    .show(ui, |ui| {
                        for name in &names {
                            let mut checked = app.chart.countries().iter().any(|c| c == name);
                            if ui.checkbox(&mut checked, name).changed() {
                                app.chart.toggle(name);
                                dirty = true;
                            }
                        }
                    });
            });

            ui.vertical(|ui| {
                if let Some(tex) = &self.chart_texture {
                    ui.image(tex);
                } else {
                    ui.label("Rendering…");
                }
                // Clickable legend: one colored entry per drawn series.
                ui.horizontal_wrapped(|ui| {
                    for country in viz::drawn_countries(&app.records, &app.chart) {
                        let style = SeriesStyle::for_country(&country);
                        let color =
                            egui::Color32::from_rgb(style.rgb.r, style.rgb.g, style.rgb.b);
                        if ui
                            .add(egui::Button::new(
                                egui::RichText::new(&country).color(color),
                            ))
                            .on_hover_text("Click to toggle this series")
                            .clicked()
                        {
                            app.chart.toggle(&country);
                            dirty = true;
                        }
                    }
                });
            });
        });

        if dirty {
            self.chart_dirty = true;
        }
    }

    fn map_tab(&mut self, ui: &mut egui::Ui) {
        let Some(app) = &mut self.app else {
            ui.label("Load a dataset to see the map.");
            return;
        };
        if app.shapes.is_empty() {
            ui.label("No boundary data available.");
            return;
        }

        let mut chart_dirty = false;
        let mut map_dirty = false;

        ui.horizontal(|ui| {
            let mut year = app.map.year();
            let slider = egui::Slider::new(&mut year, app.map.year_min..=app.map.year_max)
                .text("Year");
            if ui.add(slider).changed() {
                app.map.set_year(year);
                map_dirty = true;
            }
            ui.label(format!("Showing {}", app.map.year()));
            if let Some(sel) = &app.map.selected {
                ui.label(format!("Selected: {}", sel));
            }
        });

        if let Some(tex) = &self.map_texture {
            let response = ui
                .add(egui::Image::new(tex).sense(egui::Sense::click_and_drag()));

            // Pixel position within the rendered buffer.
            let to_buffer = |pos: egui::Pos2, rect: egui::Rect| {
                (
                    (pos.x - rect.min.x) as f64 * MAP_W as f64 / rect.width() as f64,
                    (pos.y - rect.min.y) as f64 * MAP_H as f64 / rect.height() as f64,
                )
            };

            // Hover tooltip: country, year, share to one decimal.
            if let Some(pos) = response.hover_pos() {
                let (px, py) = to_buffer(pos, response.rect);
                if let Some(country) = hit_test(&self.transform, &app.shapes, px, py) {
                    let year = app.map.year();
                    let text = match models::find_record(&app.records, &country, year)
                        .and_then(|r| self.metric.share_of(r))
                    {
                        Some(share) => {
                            let (_, sep) = viz::util::map_locale(&self.locale);
                            format!(
                                "{}\nYear: {}\nShare: {}",
                                country,
                                year,
                                viz::util::format_share(share, sep)
                            )
                        }
                        None => format!("{}\nYear: {}\nData not available", country, year),
                    };
                    response.clone().on_hover_text(text);
                }
            }

            // Click selects the shape and forwards the country to the chart.
            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let (px, py) = to_buffer(pos, response.rect);
                    if let Some(country) = hit_test(&self.transform, &app.shapes, px, py) {
                        if app.handle_map_click(&country) {
                            chart_dirty = true;
                        }
                        map_dirty = true;
                    }
                }
            }

            // Drag pans, scroll zooms.
            if response.dragged() {
                let d = response.drag_delta();
                if d != egui::Vec2::ZERO {
                    self.transform.pan_by(d.x as f64, d.y as f64);
                    map_dirty = true;
                }
            }
            if response.hovered() {
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    self.transform.zoom_by(1.0015f64.powf(scroll as f64));
                    map_dirty = true;
                }
            }
        } else {
            ui.label("Rendering…");
        }

        if chart_dirty {
            self.chart_dirty = true;
        }
        if map_dirty {
            self.map_dirty = true;
        }
    }

    fn export_bar(&mut self, ui: &mut egui::Ui) {
        let Some(app) = &self.app else { return };
        let default_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        ui.horizontal(|ui| {
            if ui.button("Export CSV").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .set_directory(&default_dir)
                    .set_file_name("renewables.csv")
                    .save_file()
                {
                    report(&mut self.status_message, &mut self.error_message,
                        storage::save_csv(&app.records, &path), &path);
                }
            }
            if ui.button("Export JSON").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .set_directory(&default_dir)
                    .set_file_name("renewables.json")
                    .save_file()
                {
                    report(&mut self.status_message, &mut self.error_message,
                        storage::save_json(&app.records, &path), &path);
                }
            }
            if ui.button("Save chart…").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .set_directory(&default_dir)
                    .set_file_name("chart.svg")
                    .save_file()
                {
                    let r = viz::plot_chart(
                        &app.records,
                        &app.chart,
                        self.metric,
                        &path,
                        1000,
                        600,
                        &self.locale,
                        LegendMode::Bottom,
                        "",
                    );
                    report(&mut self.status_message, &mut self.error_message, r, &path);
                }
            }
            if ui.button("Save map…").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .set_directory(&default_dir)
                    .set_file_name("map.png")
                    .save_file()
                {
                    let r = viz::map::render_map(
                        &app.shapes,
                        &app.records,
                        self.metric,
                        app.map.year(),
                        app.map.selected.as_deref(),
                        &MapTransform::new(1200, 700),
                        &path,
                    );
                    report(&mut self.status_message, &mut self.error_message, r, &path);
                }
            }
            if ui.button("Print stats").clicked() {
                for s in stats::grouped_summary(&app.records, self.metric) {
                    log::info!(
                        "{}: count={} missing={} mean={:?}",
                        s.country,
                        s.count,
                        s.missing,
                        s.mean
                    );
                }
                self.status_message = "Stats written to log".to_string();
            }
        });
    }
}

/// Which country shape lies under a map-buffer pixel.
fn hit_test(
    transform: &MapTransform,
    shapes: &[CountryShape],
    px: f64,
    py: f64,
) -> Option<String> {
    let (lon, lat) = transform.to_lonlat(px, py)?;
    shapes
        .iter()
        .find(|s| geo::point_in_shape(s, lon, lat))
        .map(|s| s.name.clone())
}

fn report(
    status: &mut String,
    error: &mut String,
    result: anyhow::Result<()>,
    path: &PathBuf,
) {
    match result {
        Ok(()) => {
            *status = format!("Saved {}", path.display());
            error.clear();
        }
        Err(e) => *error = format!("Failed to save {}: {}", path.display(), e),
    }
}

fn load_records(input: &str) -> anyhow::Result<Vec<Record>> {
    if input.starts_with("http://") || input.starts_with("https://") {
        storage::fetch_csv(input)
    } else {
        storage::load_csv(input)
    }
}

fn load_shapes(input: &str) -> anyhow::Result<Vec<CountryShape>> {
    if input.starts_with("http://") || input.starts_with("https://") {
        geo::fetch_boundaries(input)
    } else {
        geo::load_file(input)
    }
}

impl eframe::App for AtlasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed background loads
        self.check_load_result();

        // Request repaint if loading (for spinner animation)
        if self.is_loading {
            ctx.request_repaint();
        }

        if self.chart_dirty {
            self.refresh_chart(ctx);
        }
        if self.map_dirty {
            self.refresh_map(ctx);
        }

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.heading("Renewable Energy Atlas");
            self.source_bar(ui);
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.tab, Tab::Map, "World Map");
                ui.selectable_value(&mut self.tab, Tab::Chart, "Line Chart");
                ui.separator();
                self.metric_selector(ui);
            });
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            if !self.status_message.is_empty() {
                ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
            }
            if !self.error_message.is_empty() {
                ui.colored_label(egui::Color32::RED, &self.error_message);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                match self.tab {
                    Tab::Map => self.map_tab(ui),
                    Tab::Chart => self.chart_tab(ui),
                }
                ui.add_space(8.0);
                self.export_bar(ui);
            });
        });
    }
}
