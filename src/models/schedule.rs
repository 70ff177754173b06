//! Schedule (solution) model.
//!
//! A schedule is the result of one engine run: the final course-slot-room-half
//! assignments, the courses that could not be placed together with the reason
//! why, and the audit report of residual hard conflicts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{Half, TimeSlot};

/// Rung of the retry ladder that produced an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rung {
    /// Hard conflicts blocking, no eviction.
    Strict,
    /// Placed after evicting lower-priority blockers.
    Preemptive,
    /// Placed with hard conflicts ignored. Flagged for audit.
    Forced,
}

/// A course placed in a slot, half and room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Course ID.
    pub course: String,
    /// Time slot.
    pub slot: TimeSlot,
    /// Room ID.
    pub room: String,
    /// Booked half (`Long` for long courses).
    pub half: Half,
    /// Whether a group of this course overlaps another assigned course.
    pub soft_conflict: bool,
    /// Rung that produced this assignment.
    pub rung: Rung,
}

impl Assignment {
    /// Creates a strict, conflict-free assignment.
    pub fn new(
        course: impl Into<String>,
        slot: TimeSlot,
        room: impl Into<String>,
        half: Half,
    ) -> Self {
        Self {
            course: course.into(),
            slot,
            room: room.into(),
            half,
            soft_conflict: false,
            rung: Rung::Strict,
        }
    }

    /// Sets the rung.
    pub fn with_rung(mut self, rung: Rung) -> Self {
        self.rung = rung;
        self
    }

    /// Whether this assignment was placed with hard conflicts ignored.
    #[inline]
    pub fn is_forced(&self) -> bool {
        self.rung == Rung::Forced
    }

    /// Whether two assignments share a slot at overlapping halves.
    #[inline]
    pub fn overlaps(&self, other: &Assignment) -> bool {
        self.slot == other.slot && self.half.overlaps(other.half)
    }
}

/// Why a candidate (slot, half, room) was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RejectionReason {
    /// The room is already booked at an overlapping half.
    RoomOccupied,
    /// Mandatory groups are already booked by courses that also list them
    /// as mandatory.
    HardConflict {
        /// Conflicting mandatory groups.
        groups: Vec<String>,
        /// Courses holding those groups.
        blockers: Vec<String>,
    },
    /// The room seats fewer students than expected (best-fit only).
    CapacityShortfall {
        /// Room capacity.
        capacity: i32,
        /// Estimated students.
        required: u32,
    },
}

/// A rejected candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    /// Candidate slot.
    pub slot: TimeSlot,
    /// Candidate half.
    pub half: Half,
    /// Candidate room.
    pub room: String,
    /// Reason for rejection.
    pub reason: RejectionReason,
}

/// Rejection trace of an unplaced course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Every rejected candidate, in enumeration order.
    pub rejections: Vec<Rejection>,
}

impl Diagnostics {
    /// Rejections caused by hard group conflicts.
    pub fn hard_conflicts(&self) -> impl Iterator<Item = &Rejection> {
        self.rejections
            .iter()
            .filter(|r| matches!(r.reason, RejectionReason::HardConflict { .. }))
    }

    /// Whether any candidate was rejected for lack of seats.
    pub fn has_capacity_shortfall(&self) -> bool {
        self.rejections
            .iter()
            .any(|r| matches!(r.reason, RejectionReason::CapacityShortfall { .. }))
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rejections.is_empty() {
            return f.write_str("No candidate slot, half or room available");
        }
        write!(f, "Rejected in all candidates:")?;
        for r in &self.rejections {
            write!(f, "\n  {} @ {} ({}): ", r.slot, r.room, r.half)?;
            match &r.reason {
                RejectionReason::RoomOccupied => f.write_str("room occupied")?,
                RejectionReason::HardConflict { groups, blockers } => write!(
                    f,
                    "mandatory conflict on {} with {}",
                    groups.join(", "),
                    blockers.join(", ")
                )?,
                RejectionReason::CapacityShortfall { capacity, required } => {
                    write!(f, "overload, {required} students for {capacity} seats")?
                }
            }
        }
        Ok(())
    }
}

/// A residual hard conflict between two mandatory courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Shared slot.
    pub slot: TimeSlot,
    /// First course (lexicographically smaller ID).
    pub course_a: String,
    /// Room of the first course.
    pub room_a: String,
    /// Half of the first course.
    pub half_a: Half,
    /// Second course.
    pub course_b: String,
    /// Room of the second course.
    pub room_b: String,
    /// Half of the second course.
    pub half_b: Half,
    /// Groups mandatory for both courses.
    pub shared_groups: Vec<String>,
}

/// Output of the conflict audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Residual hard conflicts, one per unordered course pair.
    pub conflicts: Vec<ConflictRecord>,
}

impl AuditReport {
    /// Whether no hard conflict remains.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Whether `course` takes part in a reported conflict.
    pub fn involves(&self, course: &str) -> bool {
        self.conflicts
            .iter()
            .any(|c| c.course_a == course || c.course_b == course)
    }
}

/// A group shared with another course at an overlapping half.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedGroup {
    /// Group ID.
    pub group: String,
    /// The other course.
    pub other_course: String,
    /// Whether the group is mandatory for the other course.
    pub mandatory_for_other: bool,
}

/// Explanation of one soft-conflicted assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftConflictDetail {
    /// Conflicted course.
    pub course: String,
    /// Its slot.
    pub slot: TimeSlot,
    /// Its room.
    pub room: String,
    /// Its half.
    pub half: Half,
    /// Regular groups of the course shared with an overlapping booking.
    pub shared: Vec<SharedGroup>,
}

/// Counters of the rebalancing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceStats {
    /// Soft-conflicted assignments reviewed.
    pub reviewed: usize,
    /// Moves kept.
    pub improved: usize,
    /// Trials restored from snapshot.
    pub rolled_back: usize,
}

/// A complete engine result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Final assignments, at most one per course.
    pub assignments: Vec<Assignment>,
    /// Courses that exhausted every rung.
    pub unassigned: Vec<String>,
    /// Rejection trace per unassigned course.
    pub diagnostics: BTreeMap<String, Diagnostics>,
    /// Residual hard conflicts.
    pub audit: AuditReport,
    /// Every eviction, in order (a course appears once per eviction).
    pub evicted: Vec<String>,
    /// Rebalancing counters.
    pub rebalance: RebalanceStats,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the assignment of a course.
    pub fn assignment_for_course(&self, course: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.course == course)
    }

    /// Returns all assignments in a slot.
    pub fn assignments_in_slot(&self, slot: &TimeSlot) -> Vec<&Assignment> {
        self.assignments.iter().filter(|a| &a.slot == slot).collect()
    }

    /// Returns all assignments in a room.
    pub fn assignments_for_room(&self, room: &str) -> Vec<&Assignment> {
        self.assignments.iter().filter(|a| a.room == room).collect()
    }

    /// Number of soft-conflicted assignments.
    pub fn soft_conflict_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.soft_conflict).count()
    }

    /// Courses placed with hard conflicts ignored.
    pub fn forced_courses(&self) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|a| a.is_forced())
            .map(|a| a.course.as_str())
            .collect()
    }

    /// Whether every course was placed.
    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }

    /// Whether the audit found no hard conflict.
    pub fn is_valid(&self) -> bool {
        self.audit.is_clean()
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}
