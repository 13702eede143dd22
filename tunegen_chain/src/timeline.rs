// Time-stamped event storage with sample-and-hold lookup.
//
// A `Timeline<T>` is a list of `(t, value)` items kept sorted by `t`. Lookup
// returns the last item at or before the query time: a step function, never
// an interpolation. Equal times are allowed; insertion is stable, so among
// ties the most recently added item is the one `get` returns.
//
// Generators pass timelines to each other (cadence → chord → notes), and
// `Tune::merge` concatenates them with a time offset.

use crate::error::TimelineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One time-stamped value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineItem<T> {
    pub t: f64,
    pub value: T,
}

impl<T> TimelineItem<T> {
    pub fn new(t: f64, value: T) -> Self {
        TimelineItem { t, value }
    }
}

/// Sorted step-function container.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline<T> {
    items: Vec<TimelineItem<T>>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Timeline { items: Vec::new() }
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from items in any order. Items with equal `t` keep their
    /// relative order.
    pub fn from_items(mut items: Vec<TimelineItem<T>>) -> Self {
        items.sort_by(|a, b| a.t.total_cmp(&b.t));
        Timeline { items }
    }

    /// Insert an item after every existing item with `t <=` its time.
    pub fn add(&mut self, item: TimelineItem<T>) {
        let at = self.items.partition_point(|existing| existing.t <= item.t);
        self.items.insert(at, item);
    }

    /// Position of the last item with time `<= t`.
    pub fn get_index(&self, t: f64) -> Result<usize, TimelineError> {
        match self.items.partition_point(|item| item.t <= t) {
            0 => Err(TimelineError::NotFound { t }),
            n => Ok(n - 1),
        }
    }

    /// The last item with time `<= t`.
    pub fn get(&self, t: f64) -> Result<&TimelineItem<T>, TimelineError> {
        self.get_index(t).map(|i| &self.items[i])
    }

    /// Remove and return the item `get(t)` would return.
    pub fn remove(&mut self, t: f64) -> Result<TimelineItem<T>, TimelineError> {
        let i = self.get_index(t)?;
        Ok(self.items.remove(i))
    }

    pub fn list(&self) -> &[TimelineItem<T>] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimelineItem<T>> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<TimelineItem<T>> {
        self.items
    }
}

impl<T: Clone> Timeline<T> {
    /// Fold `other` in with every time shifted by `offset`. On ties, items
    /// already present stay ahead of merged ones.
    pub fn merge(&mut self, offset: f64, other: &Timeline<T>) {
        for item in &other.items {
            self.add(TimelineItem::new(item.t + offset, item.value.clone()));
        }
    }
}

impl<T> From<Vec<TimelineItem<T>>> for Timeline<T> {
    fn from(items: Vec<TimelineItem<T>>) -> Self {
        Timeline::from_items(items)
    }
}

impl<'a, T> IntoIterator for &'a Timeline<T> {
    type Item = &'a TimelineItem<T>;
    type IntoIter = std::slice::Iter<'a, TimelineItem<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// Serialized as a bare list of `{t, value}` records. Deserializing re-sorts,
// so hand-edited files need not be ordered.
impl<T: Serialize> Serialize for Timeline<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Timeline<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<TimelineItem<T>>::deserialize(deserializer).map(Timeline::from_items)
    }
}
