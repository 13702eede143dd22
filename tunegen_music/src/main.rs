// Tunegen harmony generator: CLI entry point.
//
// Loads a parameter file (or the built-in defaults), applies command-line
// overrides, runs the cadence and chord generators, and prints either a
// bar-by-bar summary or the whole tune as JSON.
//
// Usage:
//   cargo run -p tunegen_music --bin generate -- [--params FILE] [--seed N]
//     [--opening CADENCE] [--json] [-v...]

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tunegen_music::cli::Cli;
use tunegen_music::{TuneGenerator, TuneParameters, logging, summary};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut params = match &cli.params {
        Some(path) => {
            info!(path = %path.display(), "loading parameters");
            TuneParameters::load(path)?
        }
        None => TuneParameters::default(),
    };
    if let Some(state) = cli.seed {
        params.reseed(state);
    }
    if let Some(opening) = cli.opening {
        params.cadence.opening = Some(opening);
    }

    let tune = TuneGenerator::new(params)
        .generate()
        .context("generation failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&tune)?);
    } else {
        let progression: String = tune.cadence.iter().map(|e| e.value.symbol()).collect();
        println!(
            "Key {} | {}/{} | {progression}",
            tunegen_music::tune::pitch_name(tune.scale.root()),
            tune.time_measure[0],
            tune.time_measure[1],
        );
        print!("{}", summary(&tune));
    }
    Ok(())
}
