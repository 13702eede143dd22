// Top-level pipeline: parameters → cadence layer → chord layer → notes.
//
// Each stage reads the tune produced so far and fills in its own timeline.

use crate::cadence::CadenceGenerator;
use crate::chord::ChordGenerator;
use crate::config::TuneParameters;
use crate::error::MusicError;
use crate::note::NoteGenerator;
use crate::tune::{Tune, pitch_name};
use tracing::info;

#[derive(Clone, Debug, Default)]
pub struct TuneGenerator {
    pub params: TuneParameters,
}

impl TuneGenerator {
    pub fn new(params: TuneParameters) -> Self {
        TuneGenerator { params }
    }

    /// Generate one phrase.
    pub fn generate(&self) -> Result<Tune, MusicError> {
        self.params.validate()?;
        let mut tune = self.params.blank_tune();

        tune.cadence = CadenceGenerator::new(self.params.cadence.clone()).generate(&tune)?;
        info!(events = tune.cadence.len(), "cadence layer done");

        tune.chord = ChordGenerator::new(self.params.chord.clone()).generate(&tune)?;
        info!(events = tune.chord.len(), "chord layer done");

        tune.notes = NoteGenerator::new(self.params.note.clone()).generate(&tune)?;
        info!(
            events = tune.notes.len(),
            sounding = tune.notes.iter().filter(|n| n.value.is_note_on).count(),
            "note layer done"
        );

        Ok(tune)
    }
}

/// Bar-by-bar text rendering of the cadence and chord layers, one line per
/// bar: each cadence slot as its symbol followed by the chord's pitches.
pub fn summary(tune: &Tune) -> String {
    let bar_beats = f64::from(tune.time_measure[0]);
    let bars = (tune.length / bar_beats).ceil() as usize;
    let mut out = String::new();
    for bar in 0..bars {
        let start = bar as f64 * bar_beats;
        let end = start + bar_beats;
        out.push_str(&format!("{:>4} |", bar + 1));
        for event in tune.cadence.iter().filter(|e| e.t >= start && e.t < end) {
            out.push(' ');
            out.push(event.value.symbol());
            match tune.chord.get(event.t) {
                Ok(chord) => {
                    let names: Vec<String> =
                        chord.value.notenums().into_iter().map(pitch_name).collect();
                    out.push_str(&format!(" {:<12}", names.join("-")));
                }
                Err(_) => out.push_str(&format!(" {:<12}", "?")),
            }
        }
        out.truncate(out.trim_end().len());
        out.push('\n');
    }
    out
}
