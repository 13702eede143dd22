// Chord generator.
//
// For every cadence event, draws a root degree from a table keyed by the
// cadence, then a tone set (degree offsets) from a weighted list, and
// places the resulting chord at the cadence's time. Roots and tones come
// from two sub-generators with their own seeds, so changing the tone list
// does not reshuffle the roots.

use crate::error::MusicError;
use crate::tune::{Cadence, Chord, Degree, Tune};
use serde::{Deserialize, Serialize};
use tunegen_chain::{Timeline, TimelineItem, WeightedItem, WeightedRandom};
use tunegen_prng::Seed;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootParameters {
    pub seed: Seed,
    /// Root degree weights per cadence.
    pub probabilities: Vec<(Cadence, Vec<WeightedItem<Degree>>)>,
}

impl Default for RootParameters {
    fn default() -> Self {
        RootParameters {
            seed: Seed::default(),
            probabilities: vec![
                (Cadence::Tonic, vec![WeightedItem::new(0, 1.0)]),
                (Cadence::Dominant, vec![WeightedItem::new(4, 1.0)]),
                (Cadence::Subdominant, vec![WeightedItem::new(3, 1.0)]),
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneParameters {
    pub seed: Seed,
    /// Candidate tone sets, as degree offsets from the chord root.
    pub items: Vec<WeightedItem<Vec<Degree>>>,
}

impl Default for ToneParameters {
    fn default() -> Self {
        ToneParameters {
            seed: Seed::default(),
            items: vec![WeightedItem::new(vec![0, 2, 4], 1.0)],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChordParameters {
    pub root: RootParameters,
    pub tone: ToneParameters,
}

#[derive(Clone, Debug, Default)]
pub struct ChordGenerator {
    pub params: ChordParameters,
}

impl ChordGenerator {
    pub fn new(params: ChordParameters) -> Self {
        ChordGenerator { params }
    }

    /// One root degree per cadence event, at the same times.
    pub fn generate_roots(&self, tune: &Tune) -> Result<Timeline<Degree>, MusicError> {
        let mut samplers: Vec<(Cadence, WeightedRandom<Degree>)> = Vec::new();
        for (cadence, items) in &self.params.root.probabilities {
            samplers.push((*cadence, WeightedRandom::new(items.clone())?));
        }

        let mut rng = self.params.root.seed.rng();
        let mut items = Vec::with_capacity(tune.cadence.len());
        for event in &tune.cadence {
            let sampler = samplers
                .iter()
                .find(|(c, _)| *c == event.value)
                .map(|(_, s)| s)
                .ok_or(MusicError::MissingCadence {
                    cadence: event.value,
                })?;
            items.push(TimelineItem::new(event.t, *sampler.get(&mut rng)));
        }
        Ok(Timeline::from_items(items))
    }

    /// Attach a tone set to every root.
    pub fn generate_tones(
        &self,
        tune: &Tune,
        roots: &Timeline<Degree>,
    ) -> Result<Timeline<Chord>, MusicError> {
        let sampler = WeightedRandom::new(self.params.tone.items.clone())?;
        let mut rng = self.params.tone.seed.rng();
        let mut items = Vec::with_capacity(roots.len());
        for root in roots {
            let tones = sampler.get(&mut rng).clone();
            items.push(TimelineItem::new(
                root.t,
                Chord::new(tune.scale.clone(), root.value, tones)?,
            ));
        }
        Ok(Timeline::from_items(items))
    }

    pub fn generate(&self, tune: &Tune) -> Result<Timeline<Chord>, MusicError> {
        let roots = self.generate_roots(tune)?;
        self.generate_tones(tune, &roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tune::Scale;

    fn tune_with(cadences: &[Cadence]) -> Tune {
        let mut tune = Tune {
            scale: Scale::major(60),
            ..Tune::default()
        };
        for (i, &c) in cadences.iter().enumerate() {
            tune.cadence.add(TimelineItem::new(2.0 * i as f64, c));
        }
        tune
    }

    #[test]
    fn default_roots_follow_cadence() {
        use Cadence::*;
        let tune = tune_with(&[Tonic, Subdominant, Dominant, Tonic]);
        let chords = ChordGenerator::default().generate(&tune).unwrap();
        let roots: Vec<(f64, Degree)> = chords.iter().map(|c| (c.t, c.value.root)).collect();
        assert_eq!(roots, vec![(0.0, 0), (2.0, 3), (4.0, 4), (6.0, 0)]);
        // C major: IV = F A C, V = G B D.
        assert_eq!(chords.list()[1].value.notenums(), vec![65, 69, 72]);
        assert_eq!(chords.list()[2].value.notenums(), vec![67, 71, 74]);
    }

    #[test]
    fn tone_sets_drawn_from_list() {
        let params = ChordParameters {
            tone: ToneParameters {
                seed: Seed::new(754, 489),
                items: vec![
                    WeightedItem::new(vec![0, 2, 4], 1.0),
                    WeightedItem::new(vec![0, 2, 4, 6], 1.0),
                ],
            },
            ..ChordParameters::default()
        };
        let tune = tune_with(&[Cadence::Tonic; 4]);
        let chords = ChordGenerator::new(params).generate(&tune).unwrap();
        let sizes: Vec<usize> = chords.iter().map(|c| c.value.tones().len()).collect();
        // Draws 0.788, 0.308, 0.006, 0.682 against a 50/50 split.
        assert_eq!(sizes, vec![4, 3, 3, 4]);
    }

    #[test]
    fn missing_cadence_row_is_reported() {
        let params = ChordParameters {
            root: RootParameters {
                probabilities: vec![(Cadence::Tonic, vec![WeightedItem::new(0, 1.0)])],
                ..RootParameters::default()
            },
            ..ChordParameters::default()
        };
        let tune = tune_with(&[Cadence::Tonic, Cadence::Dominant]);
        let err = ChordGenerator::new(params).generate(&tune).unwrap_err();
        assert!(matches!(
            err,
            MusicError::MissingCadence {
                cadence: Cadence::Dominant
            }
        ));
    }

    #[test]
    fn empty_tone_list_is_rejected() {
        let params = ChordParameters {
            tone: ToneParameters {
                items: Vec::new(),
                ..ToneParameters::default()
            },
            ..ChordParameters::default()
        };
        let tune = tune_with(&[Cadence::Tonic]);
        assert!(matches!(
            ChordGenerator::new(params).generate(&tune),
            Err(MusicError::Chain(_))
        ));
    }

    #[test]
    fn no_cadences_no_chords() {
        let chords = ChordGenerator::default().generate(&Tune::default()).unwrap();
        assert!(chords.is_empty());
    }
}
