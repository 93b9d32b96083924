use clap::Parser;
use std::path::Path;

/// Pull a chart artifact from an OCI registry and expand it into ./output
#[derive(Debug, Parser)]
#[clap(version)]
struct Opt {
    /// Registry reference to pull, e.g. `localhost:5000/charts/demo:1.0.0`
    remote_ref: String,
}

fn run(opt: Opt) -> chartpkg::error::Result<()> {
    println!("Attempting to pull {} into ./output...", opt.remote_ref);
    let image_name = chartpkg::ImageName::parse(&opt.remote_ref)?;
    let saved = chartpkg::artifact::pull_chart(&image_name, Path::new("output"))?;
    println!("Success! Chart saved to ./{}", saved.display());
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
