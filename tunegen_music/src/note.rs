// Note generator.
//
// Takes the rhythm tree for the phrase and gives every leaf a pitch drawn
// from the chord sounding at the leaf's start, left to right, one draw per
// leaf. Rests draw a pitch too, so turning a leaf into a rest does not
// shift the pitches of the notes after it.
//
// The chord layer must already cover the phrase: a leaf before the first
// chord event is an error.

use crate::error::MusicError;
use crate::rhythm::{RhythmGenerator, RhythmParameters};
use crate::tune::{Note, Tune};
use serde::{Deserialize, Serialize};
use tunegen_chain::{Timeline, TimelineItem, WeightedItem, WeightedRandom};
use tunegen_prng::Seed;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteParameters {
    pub seed: Seed,
    pub rhythm: RhythmParameters,
}

#[derive(Clone, Debug, Default)]
pub struct NoteGenerator {
    pub params: NoteParameters,
}

impl NoteGenerator {
    pub fn new(params: NoteParameters) -> Self {
        NoteGenerator { params }
    }

    pub fn generate(&self, tune: &Tune) -> Result<Timeline<Note>, MusicError> {
        let tree = RhythmGenerator::new(self.params.rhythm.clone()).generate(tune)?;
        let mut rng = self.params.seed.rng();

        let leaves = tree.leaves();
        let mut items = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            let chord = &tune.chord.get(leaf.t)?.value;
            let pitches = WeightedRandom::new(
                chord
                    .notenums()
                    .into_iter()
                    .map(|pitch| WeightedItem::new(pitch, 1.0))
                    .collect(),
            )?;
            let note = Note {
                pitch: *pitches.get(&mut rng),
                duration: leaf.duration,
                is_note_on: leaf.is_note_on,
            };
            items.push(TimelineItem::new(leaf.t, note));
        }
        Ok(Timeline::from_items(items))
    }
}
