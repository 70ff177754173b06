//! Read-only view over the static input of one run.

use std::collections::{BTreeSet, HashMap};

use crate::error::{Result, ScheduleError};
use crate::models::{Course, Room, TimeSlot};

/// Course, room and slot lookup shared by every pass of a run.
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    courses: HashMap<&'a str, &'a Course>,
    rooms: &'a [Room],
    slots: &'a [TimeSlot],
}

impl<'a> Catalog<'a> {
    /// Indexes the input. Assumes IDs are unique (see
    /// [`validate_input`](crate::validation::validate_input)).
    pub fn new(courses: &'a [Course], rooms: &'a [Room], slots: &'a [TimeSlot]) -> Self {
        Self {
            courses: courses.iter().map(|c| (c.id.as_str(), c)).collect(),
            rooms,
            slots,
        }
    }

    /// Looks up a course.
    ///
    /// A miss means an assignment or reservation names a course that was
    /// never loaded, which only an internal defect can cause.
    pub fn course(&self, id: &str) -> Result<&'a Course> {
        self.courses
            .get(id)
            .copied()
            .ok_or_else(|| ScheduleError::invariant(format!("unknown course '{id}'")))
    }

    /// Room catalog, in input order.
    pub fn rooms(&self) -> &'a [Room] {
        self.rooms
    }

    /// Time slots, in input order.
    pub fn slots(&self) -> &'a [TimeSlot] {
        self.slots
    }

    /// Distinct days of the slot list.
    pub fn days(&self) -> BTreeSet<&'a str> {
        self.slots.iter().map(|s| s.day.as_str()).collect()
    }
}
