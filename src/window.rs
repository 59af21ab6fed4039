use super::plot::{TITLE_FMT, X_FMT, Y_MAX};
use super::stats::Summary;
use super::{Dataset, Error};
use chrono::prelude::*;
use eframe::egui;
use egui_plot::{Corner, GridMark, Legend, Line, Plot, PlotBounds, PlotPoints};
use std::ops::RangeInclusive;

const WINDOW_TITLE: &str = "SpeedTest Logs";
const DAY: f64 = 86400.;

const DOWNLOAD_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(0, 110, 0, 180);
const UPLOAD_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(230, 120, 0, 180);
const WHEAT: egui::Color32 = egui::Color32::from_rgb(245, 222, 179);

/// Interactive chart of one dataset, timestamps as seconds since the epoch on x.
pub struct SpeedChart {
    title: String,
    download: Vec<[f64; 2]>,
    upload: Vec<[f64; 2]>,
    labels: [String; 2],
    x_range: (f64, f64),
    bounds_set: bool,
}

impl SpeedChart {
    /// The dataset must not be empty.
    pub fn new(dataset: &Dataset, download: &Summary, upload: &Summary) -> Result<Self, Error> {
        let (first, last) = dataset
            .span()
            .ok_or_else(|| Error::Plot("nothing to plot".to_string()))?;
        let xs: Vec<f64> = dataset.time.iter().map(|t| epoch_seconds(t)).collect();
        let points = |ys: &[f64]| -> Vec<[f64; 2]> {
            xs.iter().zip(ys).map(|(x, y)| [*x, *y]).collect()
        };
        let (xmin, xmax) = super::min_and_max(&xs[..]);
        let x_range = if xmax > xmin {
            (xmin, xmax)
        } else {
            (xmin - DAY / 2., xmax + DAY / 2.)
        };
        Ok(SpeedChart {
            title: format!(
                "SpeedTest Logs from {} to {}",
                first.format(TITLE_FMT),
                last.format(TITLE_FMT)
            ),
            download: points(&dataset.download),
            upload: points(&dataset.upload),
            labels: [
                download.label("Download Statistics:"),
                upload.label("Upload Statistics:"),
            ],
            x_range,
            bounds_set: false,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

fn epoch_seconds(t: &NaiveDateTime) -> f64 {
    Utc.from_utc_datetime(t).timestamp() as f64
}

/// x tick label for a grid mark, `DD Mon YY`
pub fn format_day(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    match Utc.timestamp_opt(mark.value as i64, 0).single() {
        Some(t) => t.format(X_FMT).to_string(),
        None => String::new(),
    }
}

impl eframe::App for SpeedChart {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::right("statistics")
            .resizable(false)
            .min_width(230.0)
            .show(ctx, |ui| {
                ui.add_space(40.0);
                for label in self.labels.iter() {
                    egui::Frame::group(ui.style()).fill(WHEAT).show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(label)
                                .monospace()
                                .size(15.0)
                                .color(egui::Color32::BLACK),
                        );
                    });
                    ui.add_space(120.0);
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(&self.title);
            });
            let set_bounds = !self.bounds_set;
            let (xmin, xmax) = self.x_range;
            let download = Line::new(PlotPoints::from(self.download.clone()))
                .color(DOWNLOAD_COLOR)
                .fill(0.0f32)
                .name("Download");
            let upload = Line::new(PlotPoints::from(self.upload.clone()))
                .color(UPLOAD_COLOR)
                .fill(0.0f32)
                .name("Upload");
            Plot::new("speed")
                .legend(Legend::default().position(Corner::LeftBottom))
                .x_axis_label("Timestamp")
                .y_axis_label("Speed (Megabits per second)")
                .x_axis_formatter(format_day)
                .x_grid_spacer(egui_plot::uniform_grid_spacer(|_| [7. * DAY, DAY, DAY / 4.]))
                .show(ui, |plot_ui| {
                    if set_bounds {
                        plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                            [xmin, 0.],
                            [xmax, Y_MAX],
                        ));
                    }
                    plot_ui.line(download);
                    plot_ui.line(upload);
                });
            self.bounds_set = true;
        });
    }
}

/// Opens the chart window and blocks until it is closed.
pub fn render(dataset: &Dataset, download: &Summary, upload: &Summary) -> Result<(), Error> {
    let chart = SpeedChart::new(dataset, download, upload)?;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([1400.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(WINDOW_TITLE, options, Box::new(|_cc| Ok(Box::new(chart))))
        .map_err(|e| Error::Plot(e.to_string()))
}
