use anyhow::{Context, Result};
use speedtest_plot::input::resolve_input_path;
use speedtest_plot::plot::{export_svg, parse_cli};
use speedtest_plot::stats::Summary;
use speedtest_plot::{window, Dataset};
use std::io;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = parse_cli();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let threshold = match args.threshold {
        Some(t) => {
            println!("Minimum threshold for download speed = {} Mbps.", t);
            t as f64
        }
        None => 0.,
    };

    let csvin = resolve_input_path(args.file.clone())?;
    let dataset = Dataset::from_csv(&csvin, threshold)?;
    debug!("accepted records:\n{}", dataset);

    let download = Summary::compute(&dataset.download).context("download statistics")?;
    let upload = Summary::compute(&dataset.upload).context("upload statistics")?;

    if let Some(svgout) = &args.svgout {
        export_svg(&dataset, &download, &upload, svgout)
            .with_context(|| format!("plotting to {}", svgout.display()))?;
        println!("plotted {} records to {}", dataset.len(), svgout.display());
    }
    window::render(&dataset, &download, &upload).context("showing the chart")?;
    Ok(())
}
