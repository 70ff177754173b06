//! Hard and soft group conflicts.
//!
//! A candidate booking is in **hard** conflict when one of its mandatory
//! groups is already held at an overlapping half by a course that also
//! lists the group as mandatory, unless the group is excluded (see
//! [`GroupExclusion`]). Any shared group at an overlapping half, mandatory
//! or not, is a **soft** conflict.

use std::collections::BTreeSet;
use std::fmt::Debug;

use super::{Catalog, OccupancyTracker};
use crate::error::Result;
use crate::models::{Assignment, Course, GroupTag, Half, TimeSlot};

/// Predicate over group IDs whose mandatory conflicts are ignored.
///
/// Used for administrative cohorts (e.g. shared tutorial groups) that
/// appear on many course lists without actually binding students.
pub trait GroupExclusion: Send + Sync + Debug {
    /// Whether `group` never produces a hard conflict.
    fn is_excluded(&self, group: &str) -> bool;
}

/// Excludes groups whose ID contains one of the markers, case-insensitive.
///
/// An empty denylist excludes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstringDenylist {
    markers: Vec<String>,
}

impl SubstringDenylist {
    /// Creates a denylist. Empty markers are ignored.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().to_uppercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }
}

impl GroupExclusion for SubstringDenylist {
    fn is_excluded(&self, group: &str) -> bool {
        if self.markers.is_empty() {
            return false;
        }
        let upper = group.to_uppercase();
        self.markers.iter().any(|m| upper.contains(m.as_str()))
    }
}

/// Conflicts of one candidate (slot, half).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Mandatory groups in hard conflict.
    pub hard_groups: Vec<String>,
    /// Courses causing the hard conflicts, sorted.
    pub blockers: Vec<String>,
    /// Every group already held at an overlapping half.
    pub soft_groups: Vec<String>,
    /// `soft_groups / max(distinct groups, 1)`.
    pub soft_score: f64,
}

impl Classification {
    /// Whether the candidate is blocked by a hard conflict.
    #[inline]
    pub fn is_hard(&self) -> bool {
        !self.hard_groups.is_empty()
    }
}

/// Classifies candidate bookings against the current occupancy.
#[derive(Debug, Clone, Copy)]
pub struct ConflictClassifier<'x> {
    exclusion: &'x dyn GroupExclusion,
}

impl<'x> ConflictClassifier<'x> {
    /// Creates a classifier with the given exclusion predicate.
    pub fn new(exclusion: &'x dyn GroupExclusion) -> Self {
        Self { exclusion }
    }

    /// Whether `group` is ignored for hard conflicts.
    pub fn is_excluded(&self, group: &str) -> bool {
        self.exclusion.is_excluded(group)
    }

    /// Classifies booking `course` at `slot`/`half`.
    ///
    /// Bookings of `course` itself are ignored.
    pub fn classify(
        &self,
        course: &Course,
        slot: &TimeSlot,
        half: Half,
        tracker: &OccupancyTracker,
    ) -> Classification {
        let mut hard_groups = Vec::new();
        let mut blockers = BTreeSet::new();
        let mut soft_groups = Vec::new();

        for g in &course.groups {
            let Some(holders) = tracker.group_holders(&g.group, slot, half) else {
                continue;
            };
            if !holders.keys().any(|other| *other != course.id) {
                continue;
            }
            soft_groups.push(g.group.clone());

            if g.tag != GroupTag::Mandatory || self.exclusion.is_excluded(&g.group) {
                continue;
            }
            let mut hit = false;
            for (other, tag) in holders {
                if *other != course.id && *tag == GroupTag::Mandatory {
                    blockers.insert(other.clone());
                    hit = true;
                }
            }
            if hit {
                hard_groups.push(g.group.clone());
            }
        }

        let soft_score = soft_groups.len() as f64 / course.group_count().max(1) as f64;
        Classification {
            hard_groups,
            blockers: blockers.into_iter().collect(),
            soft_groups,
            soft_score,
        }
    }
}

/// Recomputes every `soft_conflict` flag against the whole assignment set.
///
/// Returns the number of flagged assignments.
pub fn refresh_soft_conflicts(assignments: &mut [Assignment], catalog: &Catalog<'_>) -> Result<usize> {
    let courses = assignments
        .iter()
        .map(|a| catalog.course(&a.course))
        .collect::<Result<Vec<_>>>()?;

    let mut flags = vec![false; assignments.len()];
    for i in 0..assignments.len() {
        for j in (i + 1)..assignments.len() {
            if assignments[i].overlaps(&assignments[j]) && shares_group(courses[i], courses[j]) {
                flags[i] = true;
                flags[j] = true;
            }
        }
    }

    for (a, flag) in assignments.iter_mut().zip(&flags) {
        a.soft_conflict = *flag;
    }
    Ok(flags.iter().filter(|f| **f).count())
}

/// Whether two courses list a common group, whatever the tags.
pub fn shares_group(a: &Course, b: &Course) -> bool {
    a.groups
        .iter()
        .any(|ga| b.groups.iter().any(|gb| ga.group == gb.group))
}
