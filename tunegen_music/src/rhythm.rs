// Rhythm generator: per-beat binary subdivision trees.
//
// Every bar is split into one-beat nodes. Each beat is recursively halved
// while a coin weighted by `branch` (a smoothstep over the node's duration)
// comes up heads, down to `max_beat_division_depth` levels; a node that is
// not split becomes a leaf and draws whether it sounds (`note_on`, also a
// smoothstep over duration) or rests. Afterwards neighbouring beats in a
// bar may be merged into one two-beat leaf, with probability
// `1 - branch(duration)`, so long values appear where splitting is unlikely.
//
// The leaves of the phrase tree partition the phrase in time order. The
// note layer (`note.rs`) gives each leaf a pitch.
//
// Draw order is fixed: beats left to right, depth first within a beat, then
// the merge pass for the bar, then the next bar.

use crate::error::MusicError;
use crate::tune::Tune;
use serde::{Deserialize, Serialize};
use tunegen_prng::{Seed, TuneRng};

/// Deepest subdivision accepted from a parameter file (1/2^n of a beat).
pub const MAX_DIVISION_DEPTH: u32 = 8;

/// Hermite ramp from 0 at `edge0` to 1 at `edge1`, clamped outside.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Smoothstep {
    pub edge0: f64,
    pub edge1: f64,
}

impl Smoothstep {
    pub fn new(edge0: f64, edge1: f64) -> Self {
        Smoothstep { edge0, edge1 }
    }

    /// Equal edges give a hard step at the edge.
    pub fn at(&self, x: f64) -> f64 {
        if self.edge0 == self.edge1 {
            return if x < self.edge0 { 0.0 } else { 1.0 };
        }
        let t = ((x - self.edge0) / (self.edge1 - self.edge0)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmParameters {
    pub seed: Seed,
    pub max_beat_division_depth: u32,
    /// Probability of splitting a node, by its duration in beats.
    pub branch: Smoothstep,
    /// Probability that a leaf sounds, by its duration in beats.
    pub note_on: Smoothstep,
}

impl Default for RhythmParameters {
    fn default() -> Self {
        RhythmParameters {
            seed: Seed::default(),
            max_beat_division_depth: 3,
            branch: Smoothstep::new(0.5, 3.0),
            note_on: Smoothstep::new(0.0, 1.2),
        }
    }
}

impl RhythmParameters {
    pub fn validate(&self) -> Result<(), MusicError> {
        if self.max_beat_division_depth > MAX_DIVISION_DEPTH {
            return Err(MusicError::invalid(format!(
                "max_beat_division_depth must be at most {MAX_DIVISION_DEPTH}, got {}",
                self.max_beat_division_depth
            )));
        }
        for (name, ramp) in [("branch", self.branch), ("note_on", self.note_on)] {
            if !ramp.edge0.is_finite() || !ramp.edge1.is_finite() {
                return Err(MusicError::invalid(format!(
                    "rhythm {name} edges must be finite, got [{}, {}]",
                    ramp.edge0, ramp.edge1
                )));
            }
        }
        Ok(())
    }
}

/// A span of the phrase. Leaves are notes or rests.
#[derive(Clone, Debug, PartialEq)]
pub struct RhythmNode {
    pub t: f64,
    pub duration: f64,
    pub is_note_on: bool,
    pub children: Vec<RhythmNode>,
}

impl RhythmNode {
    fn new(t: f64, duration: f64) -> Self {
        RhythmNode {
            t,
            duration,
            is_note_on: true,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaves in time order.
    pub fn leaves(&self) -> Vec<&RhythmNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a RhythmNode>) {
        if self.is_leaf() {
            out.push(self);
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RhythmGenerator {
    pub params: RhythmParameters,
}

impl RhythmGenerator {
    pub fn new(params: RhythmParameters) -> Self {
        RhythmGenerator { params }
    }

    /// Phrase → bars → beats → subdivisions, for one phrase of `tune`.
    pub fn generate(&self, tune: &Tune) -> Result<RhythmNode, MusicError> {
        self.params.validate()?;
        let [beats_per_bar, bars] = tune.time_measure;
        let bar_beats = f64::from(beats_per_bar);
        let mut rng = self.params.seed.rng();

        let mut phrase = RhythmNode::new(0.0, tune.phrase_beats());
        for bar_index in 0..bars {
            let mut bar = RhythmNode::new(f64::from(bar_index) * bar_beats, bar_beats);
            for beat_index in 0..beats_per_bar {
                let mut beat = RhythmNode::new(bar.t + f64::from(beat_index), 1.0);
                self.subdivide(&mut beat, &mut rng, self.params.max_beat_division_depth);
                bar.children.push(beat);
            }
            self.merge_beats(&mut bar, &mut rng);
            phrase.children.push(bar);
        }
        Ok(phrase)
    }

    fn subdivide(&self, node: &mut RhythmNode, rng: &mut TuneRng, depth: u32) {
        node.children.clear();
        let split = depth > 0 && rng.next_f64() < self.params.branch.at(node.duration);
        if split {
            let half = node.duration / 2.0;
            node.children = vec![
                RhythmNode::new(node.t, half),
                RhythmNode::new(node.t + half, half),
            ];
            for child in &mut node.children {
                self.subdivide(child, rng, depth - 1);
            }
        } else {
            node.is_note_on = rng.next_f64() < self.params.note_on.at(node.duration);
        }
    }

    /// Walk adjacent beat pairs left to right; a merged pair becomes one
    /// leaf on the first beat and the pair is skipped.
    fn merge_beats(&self, bar: &mut RhythmNode, rng: &mut TuneRng) {
        let mut i = 0;
        while i + 1 < bar.children.len() {
            let duration = bar.children[i].duration + bar.children[i + 1].duration;
            let merge = 1.0 - self.params.branch.at(duration);
            if rng.next_f64() < merge {
                let first = &mut bar.children[i];
                // The merged leaf keeps the onset of the first beat.
                first.is_note_on = first.leaves()[0].is_note_on;
                first.duration = duration;
                first.children.clear();
                bar.children[i + 1].duration = 0.0;
                bar.children[i + 1].children.clear();
                i += 1;
            }
            i += 1;
        }
        bar.children.retain(|beat| beat.duration > 0.0);
    }
}
