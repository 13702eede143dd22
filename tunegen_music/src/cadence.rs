// Cadence progression generator.
//
// Lays one cadence per `duration` beats across a phrase of
// `time_measure[0] * time_measure[1]` beats. The last slots are fixed by the
// ending (default Dominant → Tonic, an authentic cadence). Everything before
// is filled right to left by stepping the cadence chain backward in time
// from the first ending slot, so the generated part leads naturally into
// the ending. If an opening cadence is set, the backward steps are bridged
// so that slot 0 lands on it; an opening the chain cannot connect to the
// ending, or one that would overwrite the ending, is an error.
//
// See also: `chord.rs`, which reads the cadence timeline produced here.

use crate::error::MusicError;
use crate::tune::{Cadence, Tune};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tunegen_chain::{Direction, MarkovBridge, Timeline, TimelineItem, TransitionTable, WeightedItem};
use tunegen_prng::Seed;

/// Cadence-to-cadence weight table, one row per cadence.
pub type CadenceTable = Vec<(Cadence, Vec<WeightedItem<Cadence>>)>;

/// Weights for moving from one harmonic function to the next.
pub fn default_cadence_table() -> CadenceTable {
    use Cadence::*;
    let row = |t: f64, d: f64, s: f64| {
        vec![
            WeightedItem::new(Tonic, t),
            WeightedItem::new(Dominant, d),
            WeightedItem::new(Subdominant, s),
        ]
    };
    vec![
        (Tonic, row(0.1, 0.6, 0.3)),
        (Dominant, row(0.6, 0.1, 0.3)),
        (Subdominant, row(0.9, 0.0, 0.1)),
    ]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceParameters {
    pub seed: Seed,
    pub probabilities: CadenceTable,
    /// Beats per cadence slot.
    pub duration: f64,
    /// Closing cadences in playing order.
    pub ending: Vec<Cadence>,
    /// Required cadence for the first slot, if any.
    pub opening: Option<Cadence>,
}

impl Default for CadenceParameters {
    fn default() -> Self {
        CadenceParameters {
            seed: Seed::default(),
            probabilities: default_cadence_table(),
            duration: 2.0,
            ending: vec![Cadence::Dominant, Cadence::Tonic],
            opening: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CadenceGenerator {
    pub params: CadenceParameters,
}

impl CadenceGenerator {
    pub fn new(params: CadenceParameters) -> Self {
        CadenceGenerator { params }
    }

    /// Slot start times for one phrase of `tune`.
    fn slot_times(&self, tune: &Tune) -> Result<Vec<f64>, MusicError> {
        let duration = self.params.duration;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(MusicError::invalid(format!(
                "cadence duration must be positive, got {duration}"
            )));
        }
        let beats = tune.phrase_beats();
        let mut times = Vec::new();
        let mut t = 0.0;
        while t < beats {
            times.push(t);
            t += duration;
        }
        Ok(times)
    }

    pub fn generate(&self, tune: &Tune) -> Result<Timeline<Cadence>, MusicError> {
        let times = self.slot_times(tune)?;
        let slots = times.len();
        let ending = &self.params.ending;
        let Some(&anchor) = ending.first() else {
            return Err(MusicError::invalid("cadence ending must not be empty"));
        };

        // Ending longer than the phrase: keep its tail.
        if ending.len() >= slots {
            let tail = &ending[ending.len() - slots..];
            if let Some(opening) = self.params.opening.filter(|o| tail.first() != Some(o)) {
                return Err(MusicError::invalid(format!(
                    "opening {opening} cannot be placed: the ending fills all {slots} slots"
                )));
            }
            return Ok(to_timeline(&times, tail));
        }

        let table = TransitionTable::new(self.params.probabilities.clone())?;
        let mut chain = MarkovBridge::new(table, anchor, self.params.seed.rng())?;

        let free = slots - ending.len();
        if let Some(opening) = self.params.opening {
            let reach = chain
                .chain()
                .distribution_after(&opening, free, Direction::Forward)?;
            let to_anchor = chain.chain().index_of(&anchor).map_or(0.0, |i| reach[i]);
            if to_anchor <= 0.0 {
                return Err(MusicError::invalid(format!(
                    "opening {opening} cannot lead into {anchor} after {free} free slot(s)"
                )));
            }
        }

        let mut reversed = Vec::with_capacity(free);
        for remaining in (1..=free).rev() {
            let cadence = match self.params.opening {
                Some(opening) => {
                    chain.step_conditional_in(remaining, &opening, Direction::Backward)?
                }
                None => chain.step_in(Direction::Backward),
            };
            reversed.push(cadence);
        }

        let mut cadences: Vec<Cadence> = reversed.into_iter().rev().collect();
        cadences.extend_from_slice(ending);
        debug!(
            slots,
            progression = %cadences.iter().map(|c| c.symbol()).collect::<String>(),
            "generated cadence progression"
        );
        Ok(to_timeline(&times, &cadences))
    }
}

fn to_timeline(times: &[f64], cadences: &[Cadence]) -> Timeline<Cadence> {
    Timeline::from_items(
        times
            .iter()
            .zip(cadences)
            .map(|(&t, &c)| TimelineItem::new(t, c))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(timeline: &Timeline<Cadence>) -> Vec<Cadence> {
        timeline.iter().map(|item| item.value).collect()
    }

    #[test]
    fn default_phrase_has_eight_slots_ending_d_t() {
        let generator = CadenceGenerator::default();
        let timeline = generator.generate(&Tune::default()).unwrap();
        assert_eq!(timeline.len(), 8);
        let times: Vec<f64> = timeline.iter().map(|item| item.t).collect();
        assert_eq!(times, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0]);
        let cadences = values(&timeline);
        assert_eq!(&cadences[6..], &[Cadence::Dominant, Cadence::Tonic]);
    }

    #[test]
    fn progression_uses_only_allowed_moves() {
        // Subdominant never moves to Dominant in the default table.
        for state in 0..100 {
            let generator = CadenceGenerator::new(CadenceParameters {
                seed: Seed::new(state, 459),
                ..CadenceParameters::default()
            });
            let cadences = values(&generator.generate(&Tune::default()).unwrap());
            for pair in cadences.windows(2) {
                assert!(
                    !(pair[0] == Cadence::Subdominant && pair[1] == Cadence::Dominant),
                    "seed {state}: {cadences:?}"
                );
            }
        }
    }

    #[test]
    fn same_seed_same_progression() {
        let generator = CadenceGenerator::default();
        let a = generator.generate(&Tune::default()).unwrap();
        let b = generator.generate(&Tune::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn opening_anchor_is_honoured() {
        for state in 0..50 {
            let generator = CadenceGenerator::new(CadenceParameters {
                seed: Seed::new(state, 7),
                opening: Some(Cadence::Subdominant),
                ..CadenceParameters::default()
            });
            let cadences = values(&generator.generate(&Tune::default()).unwrap());
            assert_eq!(cadences[0], Cadence::Subdominant, "seed {state}");
            assert_eq!(&cadences[6..], &[Cadence::Dominant, Cadence::Tonic]);
        }
    }

    #[test]
    fn opening_covered_by_the_ending_is_rejected() {
        // Two slots: the ending D T fills the phrase, so slot 0 is fixed.
        let tune = Tune {
            time_measure: [2, 2],
            ..Tune::default()
        };
        let generator = CadenceGenerator::new(CadenceParameters {
            opening: Some(Cadence::Subdominant),
            ..CadenceParameters::default()
        });
        let err = generator.generate(&tune).unwrap_err();
        assert!(matches!(err, MusicError::InvalidParameter { .. }), "{err}");
        assert!(err.to_string().contains("Subdominant"), "{err}");

        // An opening that agrees with the ending is already honoured.
        let generator = CadenceGenerator::new(CadenceParameters {
            opening: Some(Cadence::Dominant),
            ..CadenceParameters::default()
        });
        let cadences = values(&generator.generate(&tune).unwrap());
        assert_eq!(cadences, vec![Cadence::Dominant, Cadence::Tonic]);
    }

    #[test]
    fn unreachable_opening_is_rejected() {
        // Three slots leave one free slot before D T, and Subdominant never
        // moves straight to Dominant.
        let tune = Tune {
            time_measure: [3, 2],
            ..Tune::default()
        };
        let generator = CadenceGenerator::new(CadenceParameters {
            opening: Some(Cadence::Subdominant),
            ..CadenceParameters::default()
        });
        let err = generator.generate(&tune).unwrap_err();
        assert!(matches!(err, MusicError::InvalidParameter { .. }), "{err}");
        assert!(err.to_string().contains("cannot lead into Dominant"), "{err}");

        // Tonic can precede Dominant, so the same phrase works with it.
        let generator = CadenceGenerator::new(CadenceParameters {
            opening: Some(Cadence::Tonic),
            ..CadenceParameters::default()
        });
        let cadences = values(&generator.generate(&tune).unwrap());
        assert_eq!(cadences, vec![Cadence::Tonic, Cadence::Dominant, Cadence::Tonic]);
    }

    #[test]
    fn short_phrase_keeps_ending_tail() {
        let tune = Tune {
            time_measure: [1, 1],
            ..Tune::default()
        };
        let generator = CadenceGenerator::default();
        let timeline = generator.generate(&tune).unwrap();
        assert_eq!(values(&timeline), vec![Cadence::Tonic]);
        assert_eq!(timeline.list()[0].t, 0.0);
    }

    #[test]
    fn bad_parameters_rejected() {
        let generator = CadenceGenerator::new(CadenceParameters {
            duration: 0.0,
            ..CadenceParameters::default()
        });
        assert!(matches!(
            generator.generate(&Tune::default()),
            Err(MusicError::InvalidParameter { .. })
        ));

        let generator = CadenceGenerator::new(CadenceParameters {
            ending: Vec::new(),
            ..CadenceParameters::default()
        });
        assert!(generator.generate(&Tune::default()).is_err());

        let mut probabilities = default_cadence_table();
        probabilities.pop();
        let generator = CadenceGenerator::new(CadenceParameters {
            probabilities,
            ..CadenceParameters::default()
        });
        assert!(matches!(
            generator.generate(&Tune::default()),
            Err(MusicError::Chain(_))
        ));
    }

    #[test]
    fn parameters_fill_defaults_from_json() {
        let params: CadenceParameters =
            serde_json::from_str(r#"{"duration": 4, "opening": "Tonic"}"#).unwrap();
        assert_eq!(params.duration, 4.0);
        assert_eq!(params.opening, Some(Cadence::Tonic));
        assert_eq!(params.seed, Seed::new(4649, 459));
        assert_eq!(params.probabilities, default_cadence_table());
    }
}
