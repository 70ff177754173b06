//! Time slot and half-period model.
//!
//! A time slot is one atomic weekly unit (`day × period`, e.g. `Mon_AM`).
//! Every slot splits into two halves, `H1` and `H2`. A long course books the
//! synthetic half `Long`, which overlaps both.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sub-unit of a time slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Half {
    /// First half of the slot.
    H1,
    /// Second half of the slot.
    H2,
    /// The whole slot (overlaps `H1` and `H2`).
    Long,
}

impl Half {
    /// Whether two bookings at the same slot overlap.
    ///
    /// `overlaps(a, b) := a == b || a == Long || b == Long`
    #[inline]
    pub fn overlaps(self, other: Half) -> bool {
        self == other || self == Half::Long || other == Half::Long
    }

    /// Cells marked busy when this half is booked.
    ///
    /// Expanding a booking into every half it overlaps turns overlap checks
    /// into exact lookups: a `Long` booking marks all three cells, a short
    /// booking marks its own half and `Long`.
    pub fn expansion(self) -> &'static [Half] {
        match self {
            Half::H1 => &[Half::H1, Half::Long],
            Half::H2 => &[Half::H2, Half::Long],
            Half::Long => &[Half::Long, Half::H1, Half::H2],
        }
    }

    /// Label used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Half::H1 => "H1",
            Half::H2 => "H2",
            Half::Long => "Long",
        }
    }
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weekly time slot (`day × period`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Day label (e.g. "Mon").
    pub day: String,
    /// Period label within the day (e.g. "AM").
    pub period: String,
}

impl TimeSlot {
    /// Creates a time slot.
    pub fn new(day: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            period: period.into(),
        }
    }

    /// Parses a `Day_Period` identifier.
    ///
    /// Returns `None` if the identifier has no `_` separator or an empty part.
    pub fn parse(id: &str) -> Option<Self> {
        let (day, period) = id.split_once('_')?;
        if day.is_empty() || period.is_empty() {
            return None;
        }
        Some(Self::new(day, period))
    }

    /// Slot identifier, `Day_Period`.
    pub fn id(&self) -> String {
        format!("{}_{}", self.day, self.period)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.day, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_relation() {
        assert!(Half::H1.overlaps(Half::H1));
        assert!(!Half::H1.overlaps(Half::H2));
        assert!(Half::H1.overlaps(Half::Long));
        assert!(Half::Long.overlaps(Half::H2));
        assert!(Half::Long.overlaps(Half::Long));
    }

    #[test]
    fn test_expansion_matches_overlap() {
        let all = [Half::H1, Half::H2, Half::Long];
        for booked in all {
            for other in all {
                assert_eq!(
                    booked.expansion().contains(&other),
                    booked.overlaps(other),
                    "{booked} vs {other}"
                );
            }
        }
    }

    #[test]
    fn test_slot_id_and_parse() {
        let s = TimeSlot::new("Mon", "AM");
        assert_eq!(s.id(), "Mon_AM");
        assert_eq!(s.to_string(), "Mon_AM");
        assert_eq!(TimeSlot::parse("Fri_PM"), Some(TimeSlot::new("Fri", "PM")));
        assert_eq!(TimeSlot::parse("Fri"), None);
        assert_eq!(TimeSlot::parse("_PM"), None);
    }
}
