//! Interval domain model for regions and smoking labels.
//!
//! # Responsibility
//! - Define the `{start, end}` record persisted for both interval kinds.
//! - Hold the in-memory regions/labels sequences of one project.
//!
//! # Invariants
//! - `start <= end` for every constructed or validated interval.
//! - Sequences keep insertion order; duplicates and overlaps are allowed.
//! - Containment checks are strict on both bounds.

use crate::model::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Which of the two per-project sequences an interval belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    /// Generic interval of interest.
    Region,
    /// Smoking event.
    Label,
}

impl IntervalKind {
    pub const ALL: [IntervalKind; 2] = [IntervalKind::Region, IntervalKind::Label];

    pub fn name(self) -> &'static str {
        match self {
            IntervalKind::Region => "region",
            IntervalKind::Label => "label",
        }
    }

    /// File name of the persisted sequence inside a project directory.
    pub fn file_name(self) -> &'static str {
        match self {
            IntervalKind::Region => "regions.json",
            IntervalKind::Label => "labels.json",
        }
    }
}

/// Interval validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntervalValidationError {
    Reversed { start: Timestamp, end: Timestamp },
}

impl Display for IntervalValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reversed { start, end } => {
                write!(f, "interval end `{end}` is earlier than start `{start}`")
            }
        }
    }
}

impl Error for IntervalValidationError {}

/// Persisted `{start, end}` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Interval {
    /// Creates a validated interval.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, IntervalValidationError> {
        let interval = Self { start, end };
        interval.validate()?;
        Ok(interval)
    }

    pub fn validate(&self) -> Result<(), IntervalValidationError> {
        if self.end < self.start {
            return Err(IntervalValidationError::Reversed {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Returns whether this interval touches `[first, last]`.
    pub fn overlaps(&self, first: Timestamp, last: Timestamp) -> bool {
        !(self.end < first || self.start > last)
    }
}

/// Pan/zoom window used to place and find intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Selection {
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, IntervalValidationError> {
        Interval::new(start, end)?;
        Ok(Self { start, end })
    }

    /// Returns whether both interval bounds lie strictly inside this window.
    pub fn strictly_contains(&self, interval: &Interval) -> bool {
        self.start < interval.start && self.end > interval.end
    }

    pub fn to_interval(self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }
}

/// In-memory regions and labels of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalSet {
    pub regions: Vec<Interval>,
    pub labels: Vec<Interval>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: IntervalKind) -> &[Interval] {
        match kind {
            IntervalKind::Region => &self.regions,
            IntervalKind::Label => &self.labels,
        }
    }

    fn get_mut(&mut self, kind: IntervalKind) -> &mut Vec<Interval> {
        match kind {
            IntervalKind::Region => &mut self.regions,
            IntervalKind::Label => &mut self.labels,
        }
    }

    /// Appends without any uniqueness or overlap check.
    pub fn append(&mut self, kind: IntervalKind, interval: Interval) {
        self.get_mut(kind).push(interval);
    }

    /// Returns every interval of `kind` strictly inside `selection`.
    pub fn find_containing(&self, kind: IntervalKind, selection: &Selection) -> Vec<Interval> {
        self.get(kind)
            .iter()
            .filter(|interval| selection.strictly_contains(interval))
            .copied()
            .collect()
    }

    /// Removes the first structurally equal interval.
    ///
    /// Returns `false` when nothing matched.
    pub fn remove(&mut self, kind: IntervalKind, interval: &Interval) -> bool {
        let items = self.get_mut(kind);
        match items.iter().position(|item| item == interval) {
            Some(index) => {
                items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len() + self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() && self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Interval, IntervalKind, IntervalSet, Selection};
    use crate::model::timestamp::Timestamp;

    fn interval(start: i64, end: i64) -> Interval {
        Interval::new(Timestamp::from_nanos(start), Timestamp::from_nanos(end)).unwrap()
    }

    fn selection(start: i64, end: i64) -> Selection {
        Selection::new(Timestamp::from_nanos(start), Timestamp::from_nanos(end)).unwrap()
    }

    #[test]
    fn containment_is_strict_on_both_bounds() {
        let window = selection(100, 200);
        assert!(window.strictly_contains(&interval(101, 199)));
        assert!(!window.strictly_contains(&interval(100, 150)));
        assert!(!window.strictly_contains(&interval(150, 200)));
        assert!(!window.strictly_contains(&interval(50, 250)));
    }

    #[test]
    fn remove_drops_only_first_equal_match() {
        let mut set = IntervalSet::new();
        set.append(IntervalKind::Label, interval(1, 2));
        set.append(IntervalKind::Label, interval(1, 2));
        set.append(IntervalKind::Region, interval(1, 2));

        assert!(set.remove(IntervalKind::Label, &interval(1, 2)));
        assert_eq!(set.labels.len(), 1);
        assert_eq!(set.regions.len(), 1);
        assert!(!set.remove(IntervalKind::Region, &interval(3, 4)));
    }

    #[test]
    fn overlaps_includes_touching_bounds() {
        let span = (Timestamp::from_nanos(1000), Timestamp::from_nanos(2000));
        assert!(interval(900, 1000).overlaps(span.0, span.1));
        assert!(interval(2000, 2100).overlaps(span.0, span.1));
        assert!(!interval(500, 900).overlaps(span.0, span.1));
        assert!(!interval(2001, 2100).overlaps(span.0, span.1));
    }

    #[test]
    fn reversed_bounds_are_rejected() {
        let start = Timestamp::from_nanos(10);
        let end = Timestamp::from_nanos(5);
        assert!(Interval::new(start, end).is_err());
        assert!(Selection::new(start, end).is_err());
    }
}
