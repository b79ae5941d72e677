// DAA Display - telemetry core for a cockpit situational display
// Copyright (C) 2017-2018  Datong Sun (dndx@idndx.com)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Kinematic resolution bands, one table per flight parameter.
//!
//! A band set can span several `ICAROUS_KINEMATIC_BANDS` frames of at most
//! five entries each. A frame with `numBands <= 5`, or any frame following a
//! terminator entry, starts a fresh table for its category. Everything else
//! appends.

use crate::message::{self, NUM_BAND_ENTRIES};

pub const NUM_CATEGORIES: usize = 4;
const TYPES_PER_CATEGORY: i64 = 7;

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Category {
    Heading,
    HorizontalSpeed,
    Altitude,
    VerticalSpeed,
}

impl Category {
    /// Derives the category from a raw band type, `None` past vertical speed.
    pub fn from_type(kind: i64) -> Option<Category> {
        match kind.div_euclid(TYPES_PER_CATEGORY) {
            0 => Some(Category::Heading),
            1 => Some(Category::HorizontalSpeed),
            2 => Some(Category::Altitude),
            3 => Some(Category::VerticalSpeed),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Far,
    Mid,
    Near,
    Recovery,
    Unknown,
    /// Conflict free
    #[serde(rename = "NONE")]
    Clear,
}

impl Severity {
    /// `None` marks the end of the band set.
    pub fn from_type(kind: i64) -> Option<Severity> {
        match kind % TYPES_PER_CATEGORY {
            5 => Some(Severity::Far),
            4 => Some(Severity::Mid),
            3 => Some(Severity::Near),
            2 => Some(Severity::Recovery),
            1 => Some(Severity::Clear),
            0 => Some(Severity::Unknown),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Copy, Clone, Serialize)]
pub struct Range {
    pub from: f64,
    pub to: f64,
}

#[derive(Debug, PartialEq, Clone, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct BandsTable {
    pub far: Vec<Range>,
    pub mid: Vec<Range>,
    pub near: Vec<Range>,
    pub recovery: Vec<Range>,
    pub unknown: Vec<Range>,
    pub none: Vec<Range>,
}

impl BandsTable {
    pub fn push(&mut self, sev: Severity, r: Range) {
        let list = match sev {
            Severity::Far => &mut self.far,
            Severity::Mid => &mut self.mid,
            Severity::Near => &mut self.near,
            Severity::Recovery => &mut self.recovery,
            Severity::Unknown => &mut self.unknown,
            Severity::Clear => &mut self.none,
        };

        list.push(r);
    }

    pub fn is_empty(&self) -> bool {
        self.far.is_empty() && self.mid.is_empty() && self.near.is_empty() &&
        self.recovery.is_empty() && self.unknown.is_empty() && self.none.is_empty()
    }
}

#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct CategoryBands {
    pub bands: BandsTable,
    /// `numBands` of the last frame, may exceed what was stored
    pub num_bands: i64,
    /// Set by a terminator, the next frame rebuilds the table
    #[serde(skip)]
    pub set_received: bool,
}

#[derive(Debug, PartialEq, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct KinematicBands {
    categories: [CategoryBands; NUM_CATEGORIES],
}

impl KinematicBands {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn category(&self, c: Category) -> &CategoryBands {
        &self.categories[c.index()]
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|c| c.bands.is_empty())
    }

    /// Folds one frame into its category. Returns the category touched, or
    /// `None` when `type1` does not name one and the frame was ignored.
    pub fn ingest(&mut self, m: &message::KinematicBands) -> Option<Category> {
        let cat = m.entries[0].kind.and_then(Category::from_type)?;
        let c = &mut self.categories[cat.index()];

        c.num_bands = m.num_bands;

        let mut num = NUM_BAND_ENTRIES;
        if m.num_bands <= NUM_BAND_ENTRIES as i64 {
            num = m.num_bands.max(0) as usize;
            c.set_received = true;
        }

        if c.set_received {
            c.bands = BandsTable::default();
            c.set_received = false;
        }

        for e in &m.entries[..num] {
            match (e.kind.and_then(Severity::from_type), e.min, e.max) {
                (Some(sev), Some(from), Some(to)) => c.bands.push(sev, Range { from, to }),
                _ => {
                    trace!("band set terminated, {:?} rebuilds on next frame", cat);
                    c.set_received = true;
                    break;
                }
            }
        }

        Some(cat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::BandEntry;

    fn frame(num_bands: i64, entries: &[(i64, f64, f64)]) -> message::KinematicBands {
        let mut m = message::KinematicBands {
            num_bands,
            entries: [BandEntry::default(); NUM_BAND_ENTRIES],
        };

        for (i, &(kind, min, max)) in entries.iter().enumerate() {
            m.entries[i] = BandEntry {
                kind: Some(kind),
                min: Some(min),
                max: Some(max),
            };
        }

        m
    }

    #[test]
    fn test_category_and_severity() {
        assert_eq!(Category::from_type(5), Some(Category::Heading));
        assert_eq!(Category::from_type(7), Some(Category::HorizontalSpeed));
        assert_eq!(Category::from_type(20), Some(Category::Altitude));
        assert_eq!(Category::from_type(21), Some(Category::VerticalSpeed));
        assert_eq!(Category::from_type(28), None);
        assert_eq!(Category::from_type(-1), None);

        assert_eq!(Severity::from_type(21), Some(Severity::Unknown));
        assert_eq!(Severity::from_type(12), Some(Severity::Far));
        assert_eq!(Severity::from_type(8), Some(Severity::Clear));
        assert_eq!(Severity::from_type(6), None);
        assert_eq!(Severity::from_type(-3), None);
    }

    #[test]
    fn test_single_far_band() {
        let mut b = KinematicBands::new();

        assert_eq!(b.ingest(&frame(1, &[(5, 10_f64, 20_f64)])), Some(Category::Heading));

        let h = b.category(Category::Heading);
        assert_eq!(h.bands.far, vec![Range { from: 10_f64, to: 20_f64 }]);
        assert_eq!(h.num_bands, 1);
        assert!(h.bands.mid.is_empty() && h.bands.near.is_empty());
        assert!(h.bands.recovery.is_empty() && h.bands.unknown.is_empty());
        assert!(h.bands.none.is_empty());

        for c in &[Category::HorizontalSpeed, Category::Altitude, Category::VerticalSpeed] {
            assert!(b.category(*c).bands.is_empty());
        }
    }

    #[test]
    fn test_complete_set_replaces_table() {
        let mut b = KinematicBands::new();

        b.ingest(&frame(1, &[(5, 10_f64, 20_f64)]));
        b.ingest(&frame(2, &[(3, 0_f64, 45_f64), (1, 45_f64, 360_f64)]));

        let h = &b.category(Category::Heading).bands;
        assert!(h.far.is_empty());
        assert_eq!(h.near, vec![Range { from: 0_f64, to: 45_f64 }]);
        assert_eq!(h.none, vec![Range { from: 45_f64, to: 360_f64 }]);
    }

    #[test]
    fn test_large_set_appends_until_terminated() {
        let mut b = KinematicBands::new();
        let five = [(16, 0_f64, 1_f64); 5];

        // altitude recovery bands, more than fit into one frame
        b.ingest(&frame(12, &five));
        b.ingest(&frame(12, &five));

        let a = &b.category(Category::Altitude).bands;
        assert!(a.far.is_empty());
        assert_eq!(a.recovery.len(), 10);

        // a terminator ends the set, the next frame starts over
        b.ingest(&frame(12, &[(16, 1_f64, 2_f64), (20, 0_f64, 0_f64)]));
        assert_eq!(b.category(Category::Altitude).bands.recovery.len(), 11);
        assert!(b.category(Category::Altitude).set_received);

        b.ingest(&frame(12, &[(17, 7_f64, 8_f64)]));
        let a = &b.category(Category::Altitude).bands;
        assert!(a.recovery.is_empty());
        assert_eq!(a.near, vec![Range { from: 7_f64, to: 8_f64 }]);
    }

    #[test]
    fn test_missing_entry_terminates() {
        let mut b = KinematicBands::new();

        // numBands claims three but only one entry is present
        b.ingest(&frame(3, &[(26, -5_f64, 5_f64)]));

        let v = b.category(Category::VerticalSpeed);
        assert_eq!(v.bands.far, vec![Range { from: -5_f64, to: 5_f64 }]);
        assert!(v.set_received);
    }

    #[test]
    fn test_unknown_category_ignored() {
        let mut b = KinematicBands::new();

        assert_eq!(b.ingest(&frame(1, &[(30, 0_f64, 1_f64)])), None);
        assert!(b.is_empty());
    }
}
