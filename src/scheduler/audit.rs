//! Post-run conflict audit.
//!
//! Scans the final assignment set for residual hard conflicts: two
//! mandatory courses in the same slot at overlapping halves sharing a
//! group that both list as mandatory (excluded groups aside). Forced
//! placements are the only way such a pair survives the engine, so a clean
//! report means no cohort is double-booked.
//!
//! The audit is read-only and idempotent.

use std::collections::BTreeSet;

use super::{Catalog, GroupExclusion};
use crate::error::Result;
use crate::models::{
    Assignment, AuditReport, ConflictRecord, GroupTag, SharedGroup, SoftConflictDetail,
};

/// Residual conflict scanner.
#[derive(Debug, Clone, Copy)]
pub struct ConflictAuditor<'x> {
    exclusion: &'x dyn GroupExclusion,
}

impl<'x> ConflictAuditor<'x> {
    /// Creates an auditor with the given exclusion predicate.
    pub fn new(exclusion: &'x dyn GroupExclusion) -> Self {
        Self { exclusion }
    }

    /// Lists every course pair in hard conflict, once per unordered pair.
    pub fn audit(&self, catalog: &Catalog<'_>, assignments: &[Assignment]) -> Result<AuditReport> {
        let mut mandatory = Vec::new();
        for a in assignments {
            let course = catalog.course(&a.course)?;
            if course.is_mandatory() {
                let groups: BTreeSet<&str> = course.mandatory_groups().collect();
                mandatory.push((a, groups));
            }
        }

        let mut reported = BTreeSet::new();
        let mut conflicts = Vec::new();
        for (i, (a, groups_a)) in mandatory.iter().enumerate() {
            for (b, groups_b) in &mandatory[i + 1..] {
                if a.course == b.course || !a.overlaps(b) {
                    continue;
                }
                let shared: Vec<String> = groups_a
                    .intersection(groups_b)
                    .filter(|g| !self.exclusion.is_excluded(g))
                    .map(|g| g.to_string())
                    .collect();
                if shared.is_empty() {
                    continue;
                }

                let (first, second) = if a.course <= b.course { (a, b) } else { (b, a) };
                if !reported.insert((first.course.as_str(), second.course.as_str())) {
                    continue;
                }
                conflicts.push(ConflictRecord {
                    slot: first.slot.clone(),
                    course_a: first.course.clone(),
                    room_a: first.room.clone(),
                    half_a: first.half,
                    course_b: second.course.clone(),
                    room_b: second.room.clone(),
                    half_b: second.half,
                    shared_groups: shared,
                });
            }
        }
        Ok(AuditReport { conflicts })
    }

    /// Explains every soft-conflicted assignment: which of its regular
    /// groups it shares at an overlapping half and with whom.
    ///
    /// Mandatory groups are left out; clashes on those show up in
    /// [`audit`](Self::audit) instead.
    pub fn soft_conflict_details(
        &self,
        catalog: &Catalog<'_>,
        assignments: &[Assignment],
    ) -> Result<Vec<SoftConflictDetail>> {
        let mut details = Vec::new();
        for a in assignments.iter().filter(|a| a.soft_conflict) {
            let course = catalog.course(&a.course)?;
            let mut shared = Vec::new();
            for other in assignments {
                if other.course == a.course || !a.overlaps(other) {
                    continue;
                }
                let other_course = catalog.course(&other.course)?;
                for g in course.groups.iter().filter(|g| g.tag == GroupTag::Regular) {
                    if let Some(tag) = other_course.tag_of(&g.group) {
                        shared.push(SharedGroup {
                            group: g.group.clone(),
                            other_course: other.course.clone(),
                            mandatory_for_other: tag == GroupTag::Mandatory,
                        });
                    }
                }
            }
            details.push(SoftConflictDetail {
                course: a.course.clone(),
                slot: a.slot.clone(),
                room: a.room.clone(),
                half: a.half,
                shared,
            });
        }
        Ok(details)
    }
}
