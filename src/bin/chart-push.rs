use clap::Parser;
use std::path::PathBuf;

/// Push a chart directory to an OCI registry as a split meta/content artifact
#[derive(Debug, Parser)]
#[clap(version)]
struct Opt {
    /// Path of the chart directory to push
    #[clap(parse(from_os_str))]
    chart_directory: PathBuf,

    /// Registry reference to push to, e.g. `localhost:5000/charts/demo:1.0.0`
    remote_ref: String,
}

fn run(opt: Opt) -> chartpkg::error::Result<()> {
    println!(
        "Attempting to push {} to {}...",
        opt.chart_directory.display(),
        opt.remote_ref
    );
    let image_name = chartpkg::ImageName::parse(&opt.remote_ref)?;
    chartpkg::artifact::push_chart(&opt.chart_directory, &image_name)?;
    println!("Success!");
    Ok(())
}

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(e) = run(Opt::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
