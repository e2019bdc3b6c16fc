/*!
 * GUI application for rcx-rs - REST Countries explorer
 *
 * A cross-platform desktop application providing:
 * - A description of the dataset and its source
 * - Data interaction: raw table, column statistics, sorting, population filter, CSV export
 * - Charts: scatter, line, bar, and pie charts with optional axis ranges and PNG export
 *
 * Platform support: Windows, macOS, Linux
 */

use eframe::egui;
use rcx_rs::session::{CollectingNotifier, Session};
use rcx_rs::stats::{self, ColumnSummary, format_number};
use rcx_rs::viz::{self, ChartKind, ChartSpec};
use rcx_rs::{Client, FetchConfig, Field, SortOrder, Source, Table, storage};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

/// Size of the chart preview rendered inside the window.
const PREVIEW_SIZE: (u32, u32) = (900, 540);

fn main() -> Result<(), eframe::Error> {
    // Enable logging for better debugging
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([700.0, 450.0])
            .with_title("Country data explorer - rcx-rs"),
        ..Default::default()
    };

    eframe::run_native(
        "Country data explorer",
        options,
        Box::new(|_cc| Ok(Box::new(RcxApp::new()))),
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Page {
    Description,
    Data,
    Charts,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SourceOption {
    Mirror,
    Live,
    Custom,
}

/// What the background loader hands back to the UI thread.
struct LoadResult {
    session: Session,
    messages: Vec<String>,
}

/// Main application state
struct RcxApp {
    page: Page,

    // Source options
    source: SourceOption,
    custom_url: String,
    max_retries: u32,

    // Loaded data
    session: Session,

    // Data page
    show_raw: bool,
    stats_field: Field,
    sort_field: Field,
    sort_desc: bool,
    pop_min: i64,
    pop_max: i64,
    output_path: String,

    // Charts page
    x_field: Field,
    y_field: Field,
    chart_kind: ChartKind,
    override_x: bool,
    x_range: (f64, f64),
    override_y: bool,
    y_range: (f64, f64),
    chart_texture: Option<egui::TextureHandle>,

    // UI state
    is_loading: bool,
    status_message: String,
    error_message: String,

    // Background operation
    load_receiver: Option<mpsc::Receiver<LoadResult>>,
}

impl RcxApp {
    fn new() -> Self {
        // Default to user's home directory for output
        let home_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .to_string_lossy()
            .to_string();

        let mut app = Self {
            page: Page::Description,

            source: SourceOption::Mirror,
            custom_url: String::new(),
            max_retries: 3,

            session: Session::default(),

            show_raw: false,
            stats_field: Field::Population,
            sort_field: Field::CommonName,
            sort_desc: false,
            pop_min: 0,
            pop_max: 0,
            output_path: home_dir,

            x_field: Field::Area,
            y_field: Field::Population,
            chart_kind: ChartKind::Scatter,
            override_x: false,
            x_range: (0.0, 1.0),
            override_y: false,
            y_range: (0.0, 1.0),
            chart_texture: None,

            is_loading: false,
            status_message: String::new(),
            error_message: String::new(),
            load_receiver: None,
        };
        app.start_load();
        app
    }

    fn fetch_config(&self) -> Result<FetchConfig, String> {
        let source = match self.source {
            SourceOption::Mirror => Source::StaticMirror,
            SourceOption::Live => Source::LiveApi,
            SourceOption::Custom => {
                let url = self.custom_url.trim();
                if url.is_empty() {
                    return Err("Please enter a URL for the custom source".to_string());
                }
                Source::Custom(url.to_string())
            }
        };
        Ok(FetchConfig::default()
            .with_source(source)
            .with_max_retries(self.max_retries))
    }

    fn start_load(&mut self) {
        let config = match self.fetch_config() {
            Ok(config) => config,
            Err(err) => {
                self.error_message = format!("Validation error: {}", err);
                return;
            }
        };

        self.is_loading = true;
        self.error_message.clear();
        self.status_message = "Fetching country data...".to_string();

        let (sender, receiver) = mpsc::channel();
        self.load_receiver = Some(receiver);

        thread::spawn(move || {
            let result = match Client::new(config) {
                Ok(client) => {
                    let mut notes = CollectingNotifier::default();
                    let session = Session::load(&client, &mut notes);
                    LoadResult {
                        session,
                        messages: notes.messages,
                    }
                }
                Err(err) => LoadResult {
                    session: Session::default(),
                    messages: vec![err.user_message()],
                },
            };
            let _ = sender.send(result);
        });
    }

    fn check_load_result(&mut self) {
        if let Some(receiver) = &self.load_receiver
            && let Ok(result) = receiver.try_recv()
        {
            self.is_loading = false;
            self.load_receiver = None;
            self.session = result.session;
            self.chart_texture = None;

            // Range selector defaults to (0, max), as the filter starts unrestricted.
            let (_, max) = self.session.table().population_bounds().unwrap_or((0, 0));
            self.pop_min = 0;
            self.pop_max = max;

            if result.messages.is_empty() {
                self.status_message = format!("Loaded {} countries.", self.session.table().len());
                self.error_message.clear();
            } else {
                self.status_message.clear();
                self.error_message = result.messages.join("\n");
            }
        }
    }

    /// The population-filtered, sorted view shown on the data page.
    fn filtered_view(&self) -> Table {
        let order = if self.sort_desc {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        self.session
            .table()
            .filter_population(self.pop_min, self.pop_max)
            .sorted_by(self.sort_field, order)
    }

    fn export_csv(&mut self) {
        if self.output_path.trim().is_empty() {
            self.error_message = "Please specify an output directory".to_string();
            return;
        }
        let path = PathBuf::from(&self.output_path).join(storage::FILTERED_CSV_FILENAME);
        let view = self.filtered_view();
        match storage::save_csv(&view, &path) {
            Ok(()) => {
                self.status_message = format!("Saved {} rows to {}", view.len(), path.display());
                self.error_message.clear();
            }
            Err(err) => self.error_message = format!("Failed to save CSV: {:#}", err),
        }
    }

    fn chart_spec(&self) -> ChartSpec {
        let mut spec = ChartSpec::new(self.x_field, self.y_field, self.chart_kind);
        if self.override_x {
            spec = spec.with_x_range(self.x_range.0, self.x_range.1);
        }
        if self.override_y {
            spec = spec.with_y_range(self.y_range.0, self.y_range.1);
        }
        spec
    }

    fn draw_preview(&mut self, ctx: &egui::Context) {
        let (w, h) = PREVIEW_SIZE;
        match viz::render_rgb(self.session.table(), &self.chart_spec(), w, h) {
            Ok(rgb) => {
                let image = egui::ColorImage::from_rgb([w as usize, h as usize], &rgb);
                self.chart_texture =
                    Some(ctx.load_texture("chart-preview", image, egui::TextureOptions::default()));
                self.error_message.clear();
            }
            Err(err) => {
                self.chart_texture = None;
                self.error_message = format!("Failed to create chart: {:#}", err);
            }
        }
    }

    fn export_chart(&mut self) {
        if self.output_path.trim().is_empty() {
            self.error_message = "Please specify an output directory".to_string();
            return;
        }
        let path = PathBuf::from(&self.output_path).join(storage::CHART_PNG_FILENAME);
        match viz::render_chart(
            self.session.table(),
            &self.chart_spec(),
            &path,
            viz::DEFAULT_WIDTH,
            viz::DEFAULT_HEIGHT,
        ) {
            Ok(()) => {
                self.status_message = format!("Wrote chart to {}", path.display());
                self.error_message.clear();
            }
            Err(err) => self.error_message = format!("Failed to create chart: {:#}", err),
        }
    }

    fn output_dir_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Output folder:");
            ui.text_edit_singleline(&mut self.output_path);
            if ui.button("Browse").clicked()
                && let Some(path) = rfd::FileDialog::new().pick_folder()
            {
                self.output_path = path.to_string_lossy().to_string();
            }
        });
    }

    fn show_description(&mut self, ui: &mut egui::Ui) {
        ui.heading("About this tool");
        ui.add_space(8.0);
        ui.label(
            "This application loads country records from the REST Countries dataset and \
             lets you explore population, area, languages, borders and time zones.",
        );
        ui.hyperlink_to("REST Countries API", "https://restcountries.com");
        ui.add_space(8.0);
        ui.label("Pages:");
        ui.label("• Description: information about the project and the data source.");
        ui.label("• Data: browse, summarize, sort, filter and export the table.");
        ui.label("• Charts: build scatter, line, bar and pie charts and export them.");
        ui.add_space(12.0);

        ui.group(|ui| {
            ui.label("Data source");
            ui.radio_value(&mut self.source, SourceOption::Mirror, "Static JSON mirror");
            ui.radio_value(&mut self.source, SourceOption::Live, "Live REST Countries API");
            ui.horizontal(|ui| {
                ui.radio_value(&mut self.source, SourceOption::Custom, "Custom URL:");
                ui.add_enabled(
                    self.source == SourceOption::Custom,
                    egui::TextEdit::singleline(&mut self.custom_url),
                );
            });
            ui.horizontal(|ui| {
                ui.label("Retries:");
                ui.add(egui::DragValue::new(&mut self.max_retries).range(0..=5));
            });
        });
    }

    fn show_data(&mut self, ui: &mut egui::Ui) {
        ui.heading("Data interaction");
        if self.session.is_empty() {
            ui.label("No data loaded.");
            return;
        }
        let table = self.session.table().clone();

        ui.checkbox(&mut self.show_raw, "Show original data");
        if self.show_raw {
            ui.push_id("raw", |ui| table_grid(ui, &table));
        }
        ui.separator();

        ui.label("Statistics");
        field_combo(ui, "Statistics column", &mut self.stats_field, &Field::ALL);
        match stats::summarize(&table, self.stats_field) {
            Some(ColumnSummary::Numeric(s)) => {
                ui.label(format!("Mean: {}", format_number(s.mean)));
                ui.label(format!("Median: {}", format_number(s.median)));
                ui.label(format!(
                    "Standard deviation: {}",
                    s.std_dev.map(format_number).unwrap_or_else(|| "NA".into())
                ));
                ui.label(format!(
                    "Min: {}   Max: {}   Count: {}",
                    format_number(s.min),
                    format_number(s.max),
                    s.count
                ));
            }
            Some(ColumnSummary::Text(s)) => {
                ui.label(format!(
                    "Count: {}   Missing: {}   Distinct: {}   Most common: {}",
                    s.count,
                    s.missing,
                    s.distinct,
                    s.most_common.as_deref().unwrap_or("NA")
                ));
            }
            None => {
                ui.label("Statistics undefined for an empty table.");
            }
        }
        ui.separator();

        ui.label("Sort and filter");
        ui.horizontal(|ui| {
            field_combo(ui, "Sort by", &mut self.sort_field, &Field::ALL);
            ui.radio_value(&mut self.sort_desc, false, "Ascending");
            ui.radio_value(&mut self.sort_desc, true, "Descending");
        });
        let (lo, hi) = table.population_bounds().unwrap_or((0, 0));
        let lo = lo.min(0);
        ui.add(egui::Slider::new(&mut self.pop_min, lo..=hi).text("min population"));
        ui.add(egui::Slider::new(&mut self.pop_max, lo..=hi).text("max population"));
        if self.pop_min > self.pop_max {
            ui.colored_label(egui::Color32::RED, "Minimum is above maximum; no rows match.");
        }

        let view = self.filtered_view();
        ui.label(format!("{} of {} rows", view.len(), table.len()));
        ui.push_id("filtered", |ui| table_grid(ui, &view));

        ui.add_space(6.0);
        self.output_dir_row(ui);
        if ui.button("Export filtered data (CSV)").clicked() {
            self.export_csv();
        }
    }

    fn show_charts(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.heading("Charts");
        if self.session.is_empty() {
            ui.label("No data loaded.");
            return;
        }

        ui.horizontal(|ui| {
            let x_options: &[Field] = if self.chart_kind == ChartKind::Pie {
                &Field::ALL
            } else {
                &Field::NUMERIC
            };
            field_combo(ui, "X axis", &mut self.x_field, x_options);
            field_combo(ui, "Y axis", &mut self.y_field, &Field::NUMERIC);
            egui::ComboBox::from_label("Chart type")
                .selected_text(self.chart_kind.label())
                .show_ui(ui, |ui| {
                    for kind in ChartKind::ALL {
                        ui.selectable_value(&mut self.chart_kind, kind, kind.label());
                    }
                });
        });
        if self.chart_kind != ChartKind::Pie {
            ui.horizontal(|ui| {
                ui.checkbox(&mut self.override_x, "Fix X range");
                ui.add_enabled(self.override_x, egui::DragValue::new(&mut self.x_range.0));
                ui.add_enabled(self.override_x, egui::DragValue::new(&mut self.x_range.1));
                ui.checkbox(&mut self.override_y, "Fix Y range");
                ui.add_enabled(self.override_y, egui::DragValue::new(&mut self.y_range.0));
                ui.add_enabled(self.override_y, egui::DragValue::new(&mut self.y_range.1));
            });
        }

        ui.horizontal(|ui| {
            if ui.button("Draw chart").clicked() {
                self.draw_preview(ctx);
            }
            if ui.button("Export chart (PNG)").clicked() {
                self.export_chart();
            }
        });
        self.output_dir_row(ui);

        if let Some(texture) = &self.chart_texture {
            ui.add(egui::Image::new((texture.id(), texture.size_vec2())).shrink_to_fit());
        }
    }
}

impl eframe::App for RcxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed background operations
        self.check_load_result();

        // Request repaint if loading (for spinner animation)
        if self.is_loading {
            ctx.request_repaint();
        }

        egui::SidePanel::left("navigation").show(ctx, |ui| {
            ui.heading("Navigation");
            ui.add_space(6.0);
            ui.selectable_value(&mut self.page, Page::Description, "Description");
            ui.selectable_value(&mut self.page, Page::Data, "Data interaction");
            ui.selectable_value(&mut self.page, Page::Charts, "Charts");
            ui.add_space(12.0);
            if ui
                .add_enabled(!self.is_loading, egui::Button::new("Reload data"))
                .clicked()
            {
                self.start_load();
            }
            if self.is_loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading...");
                });
            }
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
            egui::ScrollArea::vertical().show(ui, |ui| match self.page {
                Page::Description => self.show_description(ui),
                Page::Data => self.show_data(ui),
                Page::Charts => self.show_charts(ui, ctx),
            });
        });
    }
}

fn field_combo(ui: &mut egui::Ui, label: &str, value: &mut Field, options: &[Field]) {
    egui::ComboBox::from_label(label)
        .selected_text(value.label())
        .show_ui(ui, |ui| {
            for &field in options {
                ui.selectable_value(value, field, field.label());
            }
        });
}

fn table_grid(ui: &mut egui::Ui, table: &Table) {
    egui::ScrollArea::both().max_height(280.0).show(ui, |ui| {
        egui::Grid::new("rows").striped(true).show(ui, |ui| {
            for field in Field::ALL {
                ui.strong(field.label());
            }
            ui.end_row();
            for row in table {
                for field in Field::ALL {
                    ui.label(row.get(field).display());
                }
                ui.end_row();
            }
        });
    });
}
