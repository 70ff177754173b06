//! Course model.
//!
//! A course is the unit of work to place: it needs one slot, one half
//! (or the whole slot when long) and one room. Student cohorts attend it
//! either as a mandatory or a regular course; the tag belongs to the
//! (course, group) pair, not to the group.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Half;

/// Duration class of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseKind {
    /// Occupies both halves of a slot atomically.
    Long,
    /// Occupies exactly one half.
    Short,
}

impl CourseKind {
    /// Maps an ingestion type code to a kind.
    ///
    /// `"L"` and `"Long"` (any case) are long; everything else is short.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        if code.eq_ignore_ascii_case("l") || code.eq_ignore_ascii_case("long") {
            CourseKind::Long
        } else {
            CourseKind::Short
        }
    }

    /// Halves this kind of course may book.
    pub fn halves(self) -> &'static [Half] {
        match self {
            CourseKind::Long => &[Half::Long],
            CourseKind::Short => &[Half::H1, Half::H2],
        }
    }
}

/// How a group attends a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupTag {
    /// The group must attend; imposes hard non-overlap constraints.
    Mandatory,
    /// Optional attendance; only contributes to soft conflicts.
    Regular,
}

/// A group attending a course, with its tag for that course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    /// Group (cohort) identifier, e.g. "CS_S3".
    pub group: String,
    /// Attendance tag for this course.
    pub tag: GroupTag,
}

/// A course to be placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: String,
    /// Long or short.
    pub kind: CourseKind,
    /// Expected enrollment (0 when unknown).
    pub estimated_students: u32,
    /// Attending groups.
    pub groups: Vec<GroupRef>,
    /// Admissible rooms. Empty = any room.
    pub room_candidates: Vec<String>,
}

impl Course {
    /// Creates a course with no groups.
    pub fn new(id: impl Into<String>, kind: CourseKind) -> Self {
        Self {
            id: id.into(),
            kind,
            estimated_students: 0,
            groups: Vec::new(),
            room_candidates: Vec::new(),
        }
    }

    /// Creates a short (half-slot) course.
    pub fn short(id: impl Into<String>) -> Self {
        Self::new(id, CourseKind::Short)
    }

    /// Creates a long (full-slot) course.
    pub fn long(id: impl Into<String>) -> Self {
        Self::new(id, CourseKind::Long)
    }

    /// Sets the estimated enrollment.
    pub fn with_students(mut self, estimated_students: u32) -> Self {
        self.estimated_students = estimated_students;
        self
    }

    /// Adds a group tagged mandatory for this course.
    pub fn with_mandatory_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(GroupRef {
            group: group.into(),
            tag: GroupTag::Mandatory,
        });
        self
    }

    /// Adds a group tagged regular for this course.
    pub fn with_regular_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(GroupRef {
            group: group.into(),
            tag: GroupTag::Regular,
        });
        self
    }

    /// Restricts the course to the given rooms.
    pub fn with_room_candidates(mut self, rooms: Vec<String>) -> Self {
        self.room_candidates = rooms;
        self
    }

    /// Groups tagged mandatory for this course.
    pub fn mandatory_groups(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .filter(|g| g.tag == GroupTag::Mandatory)
            .map(|g| g.group.as_str())
    }

    /// Number of mandatory groups.
    pub fn mandatory_count(&self) -> usize {
        self.mandatory_groups().collect::<BTreeSet<_>>().len()
    }

    /// Number of distinct groups.
    pub fn group_count(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.group.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Whether at least one group attends this course as mandatory.
    pub fn is_mandatory(&self) -> bool {
        self.groups.iter().any(|g| g.tag == GroupTag::Mandatory)
    }

    /// Tag of `group` for this course, if it attends.
    pub fn tag_of(&self, group: &str) -> Option<GroupTag> {
        self.groups.iter().find(|g| g.group == group).map(|g| g.tag)
    }

    /// Whether the course may use `room_id`.
    pub fn allows_room(&self, room_id: &str) -> bool {
        self.room_candidates.is_empty() || self.room_candidates.iter().any(|r| r == room_id)
    }
}
