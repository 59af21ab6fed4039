use super::stats::Summary;
use super::{min_and_max, Dataset, Error, VERSION};
use chrono::prelude::*;
use clap::{App, Arg};
use plotters::prelude::*;
use plotters::coord::Shift;
use plotters::style::FontTransform;
use std::path::{Path, PathBuf};

pub const X_FMT: &str = "%d %b %y";
pub const TITLE_FMT: &str = "%d %b %Y";
pub const Y_MAX: f64 = 210.;

const CANVAS: (u32, u32) = (1600, 800);
const CHART_WIDTH: i32 = 1280;

const DOWNLOAD_FILL: RGBColor = RGBColor(143, 188, 143);
const DOWNLOAD_EDGE: RGBColor = RGBColor(0, 128, 0);
const UPLOAD_FILL: RGBColor = RGBColor(255, 165, 0);
const UPLOAD_EDGE: RGBColor = RGBColor(255, 140, 0);
const GRID: RGBColor = RGBColor(211, 211, 211);
const WHEAT: RGBColor = RGBColor(245, 222, 179);

/// Settings of the plotting cli.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotArgs {
    pub file: Option<PathBuf>,
    pub svgout: Option<PathBuf>,
    pub threshold: Option<i64>,
    pub verbose: bool,
}

fn cli_app<'a, 'b>() -> App<'a, 'b> {
    let arg_threshold = Arg::with_name("threshold")
        .help("minimum download speed threshold for data points, in Mb/s")
        .short("t")
        .long("threshold")
        .takes_value(true)
        .allow_hyphen_values(true)
        .validator(|v| v.parse::<i64>().map(|_| ()).map_err(|e| e.to_string()));
    let arg_csvin = Arg::with_name("input_csvfile")
        .help("path of the csv file to parse, a file dialog opens if missing")
        .short("f")
        .long("file")
        .takes_value(true);
    let arg_svgout = Arg::with_name("output_svgfile")
        .help("also save the chart to this svg file")
        .short("o")
        .long("svgfile")
        .takes_value(true);
    let arg_verbose = Arg::with_name("verbose")
        .help("print the filtered lines too")
        .short("v")
        .long("verbose")
        .takes_value(false);
    App::new("speedtest_plot")
        .version(VERSION.unwrap_or("unknown"))
        .author("Luca Peruzzo")
        .about("cli app to plot the speed test logs with their statistics")
        .arg(arg_threshold)
        .arg(arg_csvin)
        .arg(arg_svgout)
        .arg(arg_verbose)
}

/// Takes the CLI arguments that control the plotting of the speed time series.
pub fn parse_cli() -> PlotArgs {
    args_from(cli_app().get_matches())
}

fn args_from(cli_args: clap::ArgMatches<'_>) -> PlotArgs {
    PlotArgs {
        file: cli_args.value_of("input_csvfile").map(PathBuf::from),
        svgout: cli_args.value_of("output_svgfile").map(PathBuf::from),
        threshold: cli_args
            .value_of("threshold")
            .and_then(|t| t.parse::<i64>().ok()),
        verbose: cli_args.is_present("verbose"),
    }
}

/// Draws the download and upload areas with their statistics to svg.
/// The dataset must not be empty.
pub fn export_svg(
    dataset: &Dataset,
    download: &Summary,
    upload: &Summary,
    fout: &Path,
) -> Result<(), Error> {
    draw(dataset, download, upload, fout).map_err(|e| Error::Plot(e.to_string()))
}

fn draw(
    dataset: &Dataset,
    download: &Summary,
    upload: &Summary,
    fout: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let (first, last) = dataset.span().ok_or("nothing to plot")?;
    let (xmindt, xmaxdt) = min_and_max(&dataset.time[..]);
    let xmargin = if xmaxdt > xmindt {
        (xmaxdt - xmindt) / 50
    } else {
        chrono::Duration::hours(12)
    };
    let xmindt = xmindt - xmargin;
    let xmaxdt = xmaxdt + xmargin;
    let days = (xmaxdt - xmindt).num_days() as usize + 1;
    let xminlocal = TimeZone::from_utc_datetime(&Utc, &xmindt);
    let xmaxlocal = TimeZone::from_utc_datetime(&Utc, &xmaxdt);

    let root = SVGBackend::new(fout, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;
    let (chart_area, stats_area) = root.split_horizontally(CHART_WIDTH);

    let mut chart = ChartBuilder::on(&chart_area)
        .caption(
            format!(
                "SpeedTest Logs from {} to {}",
                first.format(TITLE_FMT),
                last.format(TITLE_FMT)
            ),
            ("sans-serif", 30),
        )
        .margin(20)
        .x_label_area_size(110)
        .y_label_area_size(90)
        .build_cartesian_2d(xminlocal..xmaxlocal, 0f64..Y_MAX)?;
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(GRID.stroke_width(1))
        .set_all_tick_mark_size(2)
        .label_style(("sans-serif", 18))
        .x_label_style(
            ("sans-serif", 16)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .x_labels(days.max(2))
        .y_labels(22)
        .x_label_formatter(&|x: &DateTime<Utc>| x.format(X_FMT).to_string())
        .y_label_formatter(&|y: &f64| format!("{:.0}", y))
        .x_desc("Timestamp")
        .y_desc("Speed (Megabits per second)")
        .draw()?;

    let series = [
        ("Download", &dataset.download, DOWNLOAD_FILL, DOWNLOAD_EDGE),
        ("Upload", &dataset.upload, UPLOAD_FILL, UPLOAD_EDGE),
    ];
    for (name, values, fill, edge) in series.iter() {
        let area = AreaSeries::new(
            dataset
                .time
                .iter()
                .zip(values.iter())
                .map(|(x, y)| (TimeZone::from_utc_datetime(&Utc, x), *y)),
            0.0,
            &fill.mix(0.5),
        )
        .border_style(edge.stroke_width(1));
        let fill = *fill;
        chart
            .draw_series(area)?
            .label(*name)
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 6), (x + 20, y + 6)], fill.mix(0.5).filled())
            });
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 20))
        .draw()?;

    let (_, height) = CANVAS;
    let boxes = [
        (download.label("Download Statistics:"), 70),
        (upload.label("Upload Statistics:"), height as i32 / 2),
    ];
    for (text, top) in boxes.iter() {
        draw_text_box(&stats_area, text, *top)?;
    }
    root.present()?;
    Ok(())
}

fn draw_text_box(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    text: &str,
    top: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    let line_height = 26;
    let (width, _) = area.dim_in_pixel();
    let bottom = top + 20 + line_height * text.lines().count() as i32;
    let corners = [(10, top), (width as i32 - 20, bottom)];
    area.draw(&Rectangle::new(corners, WHEAT.mix(0.75).filled()))?;
    area.draw(&Rectangle::new(corners, BLACK.stroke_width(1)))?;
    for (i, line) in text.lines().enumerate() {
        area.draw(&Text::new(
            line,
            (22, top + 12 + line_height * i as i32),
            ("sans-serif", 22).into_font(),
        ))?;
    }
    Ok(())
}
