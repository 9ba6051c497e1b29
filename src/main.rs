// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use libfusion::FusionError;
use libfusion::merge::MergeMethod;
use libfusion::pipeline::{FusionOptions, run};
use libfusion::transform::FilterConfig;
use std::path::PathBuf;
use std::process;

/// Construct a fused image from several input frames.
#[derive(Parser)]
#[command(
    name = "imgfuse",
    version,
    about = "Fuse aligned image frames in a complex multi-resolution transform domain"
)]
struct Cli {
    /// Path the fused image is written to, in PNG format.
    output: PathBuf,

    /// Input frames; all must share the same dimensions.
    images: Vec<PathBuf>,

    /// Increase verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of transform levels.
    #[arg(long, default_value_t = 4)]
    level_count: usize,

    /// Method used to merge frames: mean or separate_phase.
    #[arg(long, default_value = "separate_phase")]
    merge_method: String,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = fuse(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn fuse(cli: &Cli) -> Result<(), FusionError> {
    let options = FusionOptions {
        level_count: cli.level_count,
        filters: FilterConfig::default(),
        method: MergeMethod::from_name(&cli.merge_method)?,
    };
    run(&cli.output, &cli.images, &options)
}

/// Mapping: 0 -> warn, 1 -> info, 2+ -> debug.
/// `RUST_LOG` overrides the CLI flag if set.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
