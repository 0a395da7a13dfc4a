use std::time::Duration;

use app::RunState;
use eframe::egui::{self, Color32, RichText};

use crate::{
    config::Config,
    rows::{format_value, DerivedRow},
    symbols::CatalogStatus,
    ticker::Ticker,
};

const TITLE: &str = "Crypticker";
const REPAINT_EVERY: Duration = Duration::from_millis(250);
const BACKGROUND: Color32 = Color32::from_rgb(12, 16, 22);
const HIGHLIGHT: Color32 = Color32::from_rgb(250, 200, 90);
const RISING: Color32 = Color32::from_rgb(90, 200, 120);
const FALLING: Color32 = Color32::from_rgb(235, 90, 90);

pub struct TickerApp {
    ticker: Ticker,
    display_currency: String,
    interval_text: String,
    search_text: String,
    status: Option<String>,
}

impl TickerApp {
    pub fn new(ticker: Ticker, config: &Config) -> Self {
        let interval_text = format!("{}", ticker.interval().as_secs_f64());
        Self {
            ticker,
            display_currency: config.display_currency.to_uppercase(),
            interval_text,
            search_text: String::new(),
            status: None,
        }
    }

    fn start(&mut self) {
        self.status = match self.ticker.submit(&self.interval_text) {
            Ok(()) => None,
            Err(e) => Some(e.to_string()),
        };
    }

    /// Applies the edited interval to a running loop; the next sleep uses it.
    fn apply_interval(&mut self) {
        self.status = match self.ticker.set_interval(&self.interval_text) {
            Ok(_) => None,
            Err(e) => Some(e.to_string()),
        };
    }

    fn top_bar(&mut self, ui: &mut egui::Ui) {
        let running = self.ticker.run_state() == RunState::Running;

        ui.horizontal(|ui| {
            ui.heading(TITLE);
            ui.separator();

            ui.label("Refresh every");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.interval_text).desired_width(50.0),
            );
            ui.label("s");
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if running && response.lost_focus() {
                self.apply_interval();
            }
            if ui.add_enabled(!running, egui::Button::new("Start")).clicked()
                || (submitted && !running)
            {
                self.start();
            }
            if ui.add_enabled(running, egui::Button::new("Stop")).clicked() {
                self.ticker.stop();
            }
            ui.separator();

            let (state, color) = match self.ticker.run_state() {
                RunState::Running => ("Running", RISING),
                RunState::Stopped => ("Stopped", Color32::GRAY),
            };
            ui.label(RichText::new(state).strong().color(color));

            if let Some(snapshot) = self.ticker.snapshot() {
                ui.label(format!(
                    "Updated {}, rate {:.6}",
                    snapshot.updated_at.format("%H:%M:%S"),
                    snapshot.rate
                ));
            }
        });

        ui.horizontal(|ui| {
            let symbols = self.ticker.symbols();
            let total = symbols.len();
            let catalog = match self.ticker.catalog_status() {
                CatalogStatus::Loading if symbols.is_empty() => "Listing exchange...".to_string(),
                CatalogStatus::Loading => format!("{total} cached symbols, listing exchange..."),
                CatalogStatus::Fresh => format!("{total} symbols"),
                CatalogStatus::Failed(e) => format!("{total} cached symbols, listing failed: {e}"),
            };
            ui.label(RichText::new(catalog).small().color(Color32::GRAY));

            if let Some(status) = &self.status {
                ui.separator();
                ui.label(RichText::new(status).color(FALLING));
            }
        });
    }

    fn table(&self, ui: &mut egui::Ui) {
        let Some(snapshot) = self.ticker.snapshot() else {
            ui.label(RichText::new("No data yet. Select symbols and press Start.").italics());
            return;
        };

        let currency = &self.display_currency;
        let headers = [
            "Symbol".to_string(),
            format!("Price ({currency})"),
            "Volatility (%)".to_string(),
            "% Change".to_string(),
            format!("Open ({currency})"),
            format!("VWAP ({currency})"),
            format!("Day high ({currency})"),
            format!("Day low ({currency})"),
        ];

        egui::ScrollArea::vertical()
            .id_salt("quotes")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("quotes_grid")
                    .num_columns(headers.len())
                    .striped(true)
                    .min_col_width(90.0)
                    .spacing([16.0, 6.0])
                    .show(ui, |ui| {
                        for header in &headers {
                            ui.label(RichText::new(header).strong());
                        }
                        ui.end_row();

                        for row in &snapshot.rows {
                            table_row(ui, row);
                        }
                    });
            });
    }

    fn symbol_list(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Search");
            ui.add(
                egui::TextEdit::singleline(&mut self.search_text)
                    .hint_text("e.g. BTC")
                    .desired_width(200.0),
            );
            if !self.search_text.is_empty() && ui.button("Clear").clicked() {
                self.search_text.clear();
            }
            ui.separator();
            ui.label(format!("{} selected", self.ticker.selected_count()));
        });
        ui.separator();

        let entries = self.ticker.filter(&self.search_text);
        egui::ScrollArea::vertical()
            .id_salt("symbols")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if entries.is_empty() && !self.search_text.is_empty() {
                    ui.label(RichText::new("No matching symbols").italics());
                }
                for symbol in &entries {
                    let mut checked = self.ticker.is_selected(symbol);
                    let text = if checked {
                        RichText::new(symbol.to_string()).strong().color(HIGHLIGHT)
                    } else {
                        RichText::new(symbol.to_string())
                    };
                    if ui.checkbox(&mut checked, text).changed() {
                        self.ticker.toggle(symbol);
                    }
                }
            });
    }
}

fn table_row(ui: &mut egui::Ui, row: &DerivedRow) {
    ui.label(RichText::new(row.symbol.to_string()).strong());
    ui.label(format_value(row.price));
    ui.label(format_value(row.volatility_pct));

    let change = RichText::new(format_value(row.percent_change_pct));
    let change = match row.percent_change_pct {
        Some(v) if v > 0.0 => change.color(RISING),
        Some(v) if v < 0.0 => change.color(FALLING),
        _ => change,
    };
    ui.label(change);

    ui.label(format_value(row.open));
    ui.label(format_value(row.vwap));
    ui.label(format_value(row.high));
    ui.label(format_value(row.low));
    ui.end_row();
}

fn dark_visuals(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.window_fill = BACKGROUND;
    visuals.panel_fill = BACKGROUND;
    ctx.set_visuals(visuals);
}

impl eframe::App for TickerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_space(4.0);
            self.top_bar(ui);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("symbols")
            .resizable(true)
            .default_height(220.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                self.symbol_list(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| self.table(ui));

        // Snapshots arrive from the background task.
        ctx.request_repaint_after(REPAINT_EVERY);
    }
}

fn native_options(size: [f32; 2]) -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(size)
            .with_title(TITLE),
        ..Default::default()
    }
}

/// Blocks the calling thread until the window is closed.
pub fn run(ticker: Ticker, config: &Config) -> eframe::Result {
    let app = TickerApp::new(ticker, config);
    eframe::run_native(
        TITLE,
        native_options([1100.0, 750.0]),
        Box::new(|cc| {
            dark_visuals(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
}

struct FatalErrorApp {
    message: String,
}

impl eframe::App for FatalErrorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(RichText::new("Cannot start").color(FALLING));
            ui.add_space(8.0);
            ui.label(self.message.as_str());
            ui.add_space(16.0);
            if ui.button("Close").clicked() {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });
    }
}

/// Shows `message` in a small window and returns once it is closed.
pub fn show_fatal_error(message: impl Into<String>) -> eframe::Result {
    let app = FatalErrorApp {
        message: message.into(),
    };
    eframe::run_native(
        TITLE,
        native_options([420.0, 160.0]),
        Box::new(|cc| {
            dark_visuals(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
}
