// Tune data model: scales, chords, cadences, notes and the `Tune` container.
//
// Pitches are MIDI note numbers (12-TET, 69 = A4 = 440 Hz). A `Scale` is a
// root note plus semitone offsets; a `Chord` is a root *degree* plus degree
// offsets on a scale, so the same chord shape follows the key. Degrees wrap
// by octave: degree `len` of a seven-tone scale is the root an octave up,
// and negative degrees go below the root.
//
// A `Tune` carries one timeline per layer (cadence, chord, notes). Every
// generator reads the layers above it and fills in its own.

use crate::error::MusicError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tunegen_chain::Timeline;

/// MIDI note number.
pub type NoteNum = i32;

/// Index into a scale or chord; may be negative or exceed the tone count.
pub type Degree = i32;

/// Frequency of a MIDI note in equal temperament, A4 = 440 Hz.
pub fn notenum_to_hertz(pitch: NoteNum) -> f64 {
    440.0 * 2f64.powf(f64::from(pitch - 69) / 12.0)
}

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Scientific pitch name, e.g. 69 → "A4".
pub fn pitch_name(pitch: NoteNum) -> String {
    let name = NOTE_NAMES[pitch.rem_euclid(12) as usize];
    format!("{name}{}", pitch.div_euclid(12) - 1)
}

// ---------------------------------------------------------------------------
// Scale
// ---------------------------------------------------------------------------

/// A key: root note plus ascending semitone offsets from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScaleFields")]
pub struct Scale {
    root: NoteNum,
    tones: Vec<i32>,
}

#[derive(Deserialize)]
struct ScaleFields {
    root: NoteNum,
    tones: Vec<i32>,
}

impl TryFrom<ScaleFields> for Scale {
    type Error = MusicError;

    fn try_from(fields: ScaleFields) -> Result<Self, MusicError> {
        Scale::new(fields.root, fields.tones)
    }
}

impl Scale {
    /// Fails if `tones` is empty.
    pub fn new(root: NoteNum, tones: Vec<i32>) -> Result<Self, MusicError> {
        if tones.is_empty() {
            return Err(MusicError::invalid("a scale needs at least one tone"));
        }
        Ok(Scale { root, tones })
    }

    pub fn major(root: NoteNum) -> Self {
        Scale {
            root,
            tones: vec![0, 2, 4, 5, 7, 9, 11],
        }
    }

    /// Natural minor.
    pub fn minor(root: NoteNum) -> Self {
        Scale {
            root,
            tones: vec![0, 2, 3, 5, 7, 8, 10],
        }
    }

    pub fn root(&self) -> NoteNum {
        self.root
    }

    pub fn tones(&self) -> &[i32] {
        &self.tones
    }

    /// Number of tones per octave.
    pub fn len(&self) -> usize {
        self.tones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    /// Note numbers of one octave starting at the root.
    pub fn notenums(&self) -> Vec<NoteNum> {
        self.tones.iter().map(|t| self.root + t).collect()
    }

    /// Whether `note` belongs to the scale in any octave.
    pub fn includes(&self, note: NoteNum) -> bool {
        includes_pitch_class(&self.notenums(), note)
    }

    /// Whether `note` has the root's pitch class.
    pub fn is_root(&self, note: NoteNum) -> bool {
        same_pitch_class(self.root + self.tones[0], note)
    }

    /// Note number of a scale degree, wrapping by octave.
    pub fn get(&self, degree: Degree) -> NoteNum {
        let len = self.tones.len() as i32;
        self.root + self.tones[degree.rem_euclid(len) as usize] + 12 * degree.div_euclid(len)
    }
}

fn same_pitch_class(a: NoteNum, b: NoteNum) -> bool {
    a.rem_euclid(12) == b.rem_euclid(12)
}

fn includes_pitch_class(notes: &[NoteNum], note: NoteNum) -> bool {
    notes.iter().any(|&n| same_pitch_class(n, note))
}

// ---------------------------------------------------------------------------
// Chord
// ---------------------------------------------------------------------------

/// A chord built on a scale degree from degree offsets, e.g. `[0, 2, 4]`
/// for a triad.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChordFields")]
pub struct Chord {
    pub scale: Scale,
    pub root: Degree,
    tones: Vec<Degree>,
}

#[derive(Deserialize)]
struct ChordFields {
    scale: Scale,
    root: Degree,
    tones: Vec<Degree>,
}

impl TryFrom<ChordFields> for Chord {
    type Error = MusicError;

    fn try_from(fields: ChordFields) -> Result<Self, MusicError> {
        Chord::new(fields.scale, fields.root, fields.tones)
    }
}

impl Chord {
    /// Fails if `tones` is empty.
    pub fn new(scale: Scale, root: Degree, tones: Vec<Degree>) -> Result<Self, MusicError> {
        if tones.is_empty() {
            return Err(MusicError::invalid("a chord needs at least one tone"));
        }
        Ok(Chord { scale, root, tones })
    }

    pub fn tones(&self) -> &[Degree] {
        &self.tones
    }

    /// Note numbers, in tone order (not necessarily ascending after `rot`).
    pub fn notenums(&self) -> Vec<NoteNum> {
        self.tones
            .iter()
            .map(|t| self.scale.get(self.root + t))
            .collect()
    }

    pub fn includes(&self, note: NoteNum) -> bool {
        includes_pitch_class(&self.notenums(), note)
    }

    pub fn is_root(&self, note: NoteNum) -> bool {
        same_pitch_class(self.scale.get(self.root + self.tones[0]), note)
    }

    /// Inversion by `n` steps. Each positive step raises the lowest
    /// remaining tone (in tone order) by an octave; each negative step
    /// lowers the highest by an octave.
    pub fn rot(&self, n: i32) -> Chord {
        let octave = self.scale.len() as i32;
        let len = self.tones.len();
        let mut tones = self.tones.clone();
        for i in 0..n.unsigned_abs() as usize {
            if n > 0 {
                tones[i % len] += octave;
            } else {
                tones[len - 1 - i % len] -= octave;
            }
        }
        Chord {
            scale: self.scale.clone(),
            root: self.root,
            tones,
        }
    }
}

// ---------------------------------------------------------------------------
// Cadence, Note
// ---------------------------------------------------------------------------

/// Harmonic function of a span of the piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cadence {
    Tonic,
    Dominant,
    Subdominant,
}

impl Cadence {
    pub const ALL: [Cadence; 3] = [Cadence::Tonic, Cadence::Dominant, Cadence::Subdominant];

    /// One-letter label: T, D or S.
    pub fn symbol(self) -> char {
        match self {
            Cadence::Tonic => 'T',
            Cadence::Dominant => 'D',
            Cadence::Subdominant => 'S',
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Accepts the full name or the one-letter symbol, in any case.
impl FromStr for Cadence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        Cadence::ALL
            .into_iter()
            .find(|c| {
                s.eq_ignore_ascii_case(&c.to_string())
                    || s.eq_ignore_ascii_case(&c.symbol().to_string())
            })
            .ok_or_else(|| format!("unknown cadence {s:?}, expected Tonic, Dominant or Subdominant"))
    }
}

/// A note or, with `is_note_on` false, a rest that still carries the pitch
/// it was drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: NoteNum,
    /// In beats.
    pub duration: f64,
    pub is_note_on: bool,
}

// ---------------------------------------------------------------------------
// Tune
// ---------------------------------------------------------------------------

/// A piece (or a section of one). Times are in beats from the start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tune {
    pub length: f64,
    /// Beats per bar, bars per phrase.
    pub time_measure: [u32; 2],
    pub scale: Scale,
    pub cadence: Timeline<Cadence>,
    pub chord: Timeline<Chord>,
    pub notes: Timeline<Note>,
}

impl Default for Tune {
    fn default() -> Self {
        Tune {
            length: 0.0,
            time_measure: [4, 4],
            scale: Scale::major(64),
            cadence: Timeline::new(),
            chord: Timeline::new(),
            notes: Timeline::new(),
        }
    }
}

impl Tune {
    /// Beats covered by one phrase of `time_measure`.
    pub fn phrase_beats(&self) -> f64 {
        f64::from(self.time_measure[0]) * f64::from(self.time_measure[1])
    }

    /// `self` followed by `next`. Metre and scale come from `self`.
    pub fn merge(&self, next: &Tune) -> Tune {
        let mut merged = Tune {
            length: self.length + next.length,
            time_measure: self.time_measure,
            scale: self.scale.clone(),
            ..Tune::default()
        };
        merged.cadence.merge(0.0, &self.cadence);
        merged.cadence.merge(self.length, &next.cadence);
        merged.chord.merge(0.0, &self.chord);
        merged.chord.merge(self.length, &next.chord);
        merged.notes.merge(0.0, &self.notes);
        merged.notes.merge(self.length, &next.notes);
        merged
    }
}
