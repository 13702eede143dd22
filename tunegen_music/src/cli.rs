// Command-line arguments of the `generate` binary.
//
// Every flag maps onto a `TuneParameters` override or an output choice; the
// parameter file itself is read in `main.rs`.

use crate::tune::Cadence;
use clap::Parser;
use std::path::PathBuf;

/// Generate a cadence and chord progression from a parameter file.
#[derive(Parser, Debug)]
#[command(name = "generate", version, about = "Markov-bridge harmony generator")]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// JSON parameter file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    pub params: Option<PathBuf>,

    /// Override the state half of every generator seed.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Cadence the first slot must have (Tonic, Dominant, Subdominant or
    /// T, D, S).
    #[arg(long)]
    pub opening: Option<Cadence>,

    /// Print the generated tune as JSON instead of the bar summary.
    #[arg(long)]
    pub json: bool,
}
