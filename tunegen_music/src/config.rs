// Parameter files for a generation run.
//
// `TuneParameters` gathers everything the generators read: the key, the
// metre, each generator's tables and seeds, and the rhythm ramps. Files are
// JSON; every field is optional and falls back to the built-in defaults, so
// `{}` is a valid parameter file and reproduces the default tune.
//
// Example (`data/default_params.json` holds the full default set):
//
//     {
//       "scale": {"root": 57, "tones": [0, 2, 3, 5, 7, 8, 10]},
//       "cadence": {"seed": {"state": 1, "sequence": 2}, "opening": "Tonic"}
//     }

use crate::cadence::CadenceParameters;
use crate::chord::ChordParameters;
use crate::error::MusicError;
use crate::note::NoteParameters;
use crate::tune::{Scale, Tune};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tunegen_chain::WeightedItem;
use tunegen_prng::Seed;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuneParameters {
    pub scale: Scale,
    /// Beats per bar, bars per phrase.
    pub time_measure: [u32; 2],
    pub cadence: CadenceParameters,
    pub chord: ChordParameters,
    pub note: NoteParameters,
}

impl Default for TuneParameters {
    fn default() -> Self {
        let tune = Tune::default();
        TuneParameters {
            scale: tune.scale,
            time_measure: tune.time_measure,
            cadence: CadenceParameters::default(),
            chord: ChordParameters::default(),
            note: NoteParameters::default(),
        }
    }
}

impl TuneParameters {
    pub fn from_json(json: &str) -> Result<Self, MusicError> {
        let params: TuneParameters = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn load(path: &Path) -> Result<Self, MusicError> {
        let json = std::fs::read_to_string(path).map_err(|source| MusicError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, MusicError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that serde cannot express. Table shape is checked later by
    /// the chain engine, with the offending state in the message.
    pub fn validate(&self) -> Result<(), MusicError> {
        if self.time_measure.contains(&0) {
            return Err(MusicError::invalid(format!(
                "time_measure entries must be positive, got {:?}",
                self.time_measure
            )));
        }
        let duration = self.cadence.duration;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(MusicError::invalid(format!(
                "cadence duration must be positive, got {duration}"
            )));
        }
        if self.cadence.ending.is_empty() {
            return Err(MusicError::invalid("cadence ending must not be empty"));
        }
        if let Some(item) = self.chord.tone.items.iter().find(|item| item.value.is_empty()) {
            return Err(MusicError::invalid(format!(
                "chord tone set with weight {} is empty",
                item.weight
            )));
        }
        for (cadence, items) in &self.chord.root.probabilities {
            check_weights(&format!("chord root weights for {cadence}"), items)?;
        }
        check_weights("chord tone weights", &self.chord.tone.items)?;
        self.note.rhythm.validate()?;
        Ok(())
    }

    /// Replace the state half of every generator's seed, keeping each
    /// generator's sequence.
    pub fn reseed(&mut self, state: u64) {
        self.cadence.seed = Seed::new(state, self.cadence.seed.sequence);
        self.chord.root.seed = Seed::new(state, self.chord.root.seed.sequence);
        self.chord.tone.seed = Seed::new(state, self.chord.tone.seed.sequence);
        self.note.seed = Seed::new(state, self.note.seed.sequence);
        self.note.rhythm.seed = Seed::new(state, self.note.rhythm.seed.sequence);
    }

    /// An empty tune with this key and metre, one phrase long.
    pub fn blank_tune(&self) -> Tune {
        let mut tune = Tune {
            scale: self.scale.clone(),
            time_measure: self.time_measure,
            ..Tune::default()
        };
        tune.length = tune.phrase_beats();
        tune
    }
}

fn check_weights<T>(what: &str, items: &[WeightedItem<T>]) -> Result<(), MusicError> {
    match items
        .iter()
        .find(|item| !item.weight.is_finite() || item.weight < 0.0)
    {
        Some(item) => Err(MusicError::invalid(format!(
            "{what} must be finite and >= 0, got {}",
            item.weight
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tune::Cadence;

    #[test]
    fn empty_object_is_default() {
        let params = TuneParameters::from_json("{}").unwrap();
        assert_eq!(params, TuneParameters::default());
        assert_eq!(params.scale, Scale::major(64));
        assert_eq!(params.time_measure, [4, 4]);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let params = TuneParameters::from_json(
            r#"{
                "scale": {"root": 57, "tones": [0, 2, 3, 5, 7, 8, 10]},
                "cadence": {"seed": {"state": 1, "sequence": 2}, "opening": "Tonic"}
            }"#,
        )
        .unwrap();
        assert_eq!(params.scale, Scale::minor(57));
        assert_eq!(params.cadence.seed, Seed::new(1, 2));
        assert_eq!(params.cadence.opening, Some(Cadence::Tonic));
        assert_eq!(params.cadence.duration, 2.0);
        assert_eq!(params.chord, ChordParameters::default());
    }

    #[test]
    fn tables_use_pair_arrays() {
        let params = TuneParameters::from_json(
            r#"{"chord": {"root": {"probabilities": [
                ["Tonic", [{"weight": 1, "value": 0}, {"weight": 1, "value": 5}]],
                ["Dominant", [{"weight": 1, "value": 4}]],
                ["Subdominant", [{"weight": 1, "value": 3}]]
            ]}}}"#,
        )
        .unwrap();
        let tonic = &params.chord.root.probabilities[0];
        assert_eq!(tonic.0, Cadence::Tonic);
        assert_eq!(tonic.1.len(), 2);
        assert_eq!(tonic.1[1].value, 5);
    }

    #[test]
    fn json_round_trip() {
        let params = TuneParameters::default();
        let json = params.to_json().unwrap();
        assert_eq!(TuneParameters::from_json(&json).unwrap(), params);
    }

    #[test]
    fn invalid_values_rejected() {
        let err = TuneParameters::from_json(r#"{"time_measure": [4, 0]}"#).unwrap_err();
        assert!(err.to_string().contains("time_measure"));
        let err = TuneParameters::from_json(r#"{"cadence": {"duration": -1}}"#).unwrap_err();
        assert!(err.to_string().contains("duration"));
        let err = TuneParameters::from_json(r#"{"cadence": {"ending": []}}"#).unwrap_err();
        assert!(err.to_string().contains("ending"));
        let err = TuneParameters::from_json(r#"{"scale": {"root": 60, "tones": []}}"#).unwrap_err();
        assert!(matches!(err, MusicError::Json(_)));
        let err = TuneParameters::from_json(r#"{"cadence": {"ending": ["Mediant"]}}"#).unwrap_err();
        assert!(matches!(err, MusicError::Json(_)));
        let err = TuneParameters::from_json(
            r#"{"note": {"rhythm": {"max_beat_division_depth": 40}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("max_beat_division_depth"));
    }

    #[test]
    fn negative_or_nan_weights_rejected() {
        let mut params = TuneParameters::default();
        params.chord.root.probabilities[1].1[0].weight = -1.0;
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("chord root weights for Dominant"), "{err}");

        let mut params = TuneParameters::default();
        params.chord.tone.items[0].weight = f64::NAN;
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("chord tone weights"), "{err}");

        let err = TuneParameters::from_json(
            r#"{"chord": {"tone": {"items": [{"weight": -2, "value": [0, 2, 4]}]}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, MusicError::InvalidParameter { .. }), "{err}");

        // Zero weights are fine; the sampler falls back to the first item.
        let mut params = TuneParameters::default();
        params.chord.tone.items[0].weight = 0.0;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn reseed_keeps_sequences() {
        let mut params = TuneParameters::default();
        params.chord.tone.seed = Seed::new(0, 99);
        params.reseed(42);
        assert_eq!(params.cadence.seed, Seed::new(42, 459));
        assert_eq!(params.chord.tone.seed, Seed::new(42, 99));
        assert_eq!(params.note.seed, Seed::new(42, 459));
        assert_eq!(params.note.rhythm.seed, Seed::new(42, 459));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = TuneParameters::load(Path::new("/nonexistent/params.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/params.json"));
    }

    #[test]
    fn default_params_file_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/default_params.json");
        assert_eq!(TuneParameters::load(&path).unwrap(), TuneParameters::default());
    }
}
