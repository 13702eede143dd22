// Tunegen music layer
//
// Turns a parameter file into a phrase: a cadence progression (Tonic /
// Dominant / Subdominant) drawn from a Markov chain that is forced into a
// fixed ending, a chord for each cadence slot, and a rhythm whose notes
// take their pitches from the sounding chord. All randomness comes from
// seeded `TuneRng`s, one per generator, so a parameter file always
// produces the same tune.
//
// Architecture:
// - tune.rs: Scale, Chord, Cadence, Note and the Tune container
// - cadence.rs: Cadence progression via backward (bridged) chain steps
// - chord.rs: Chord roots per cadence plus weighted tone sets
// - rhythm.rs: Per-beat subdivision trees with smoothstep split odds
// - note.rs: Notes and rests on the rhythm leaves, pitched from the chords
// - generator.rs: Pipeline over the generators and the text summary
// - config.rs: JSON parameter files with per-field defaults
// - logging.rs: tracing-subscriber setup for the binary
// - cli.rs: Command-line arguments of the `generate` binary
// - error.rs: `MusicError`
//
// The chain engine itself (sampling, timelines, bridges) lives in
// `tunegen_chain`.

pub mod cadence;
pub mod chord;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod note;
pub mod rhythm;
pub mod tune;

pub use config::TuneParameters;
pub use error::MusicError;
pub use generator::{TuneGenerator, summary};
pub use tune::{Cadence, Chord, Note, Scale, Tune};
