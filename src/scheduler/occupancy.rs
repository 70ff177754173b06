//! Occupancy state of a run.
//!
//! The tracker records, per slot and half, which rooms and which groups are
//! booked and by which course, plus the day and half load counters the
//! scorer balances. It holds no policy: callers decide what to book, the
//! tracker only keeps the books.
//!
//! # Expansion
//!
//! A booking marks every cell its half overlaps (see [`Half::expansion`]):
//! a `Long` booking marks `Long`, `H1` and `H2`; a short booking marks its
//! own half and `Long`. Overlap checks are then exact cell lookups.
//!
//! # Invariant
//!
//! `reserve` followed by `release` of the same booking restores the tracker
//! exactly (structural equality), so a tracker rebuilt from an assignment
//! set compares equal to one maintained incrementally.

use std::collections::{BTreeMap, BTreeSet};

use super::Catalog;
use crate::error::{Result, ScheduleError};
use crate::models::{Assignment, Course, GroupTag, Half, TimeSlot};

type RoomCells = BTreeMap<Half, BTreeMap<String, BTreeSet<String>>>;
type GroupCells = BTreeMap<TimeSlot, BTreeMap<Half, BTreeMap<String, GroupTag>>>;

/// Room, group and load bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyTracker {
    /// slot → cell → room → holding courses
    rooms: BTreeMap<TimeSlot, RoomCells>,
    /// group → slot → cell → holding course → tag
    groups: BTreeMap<String, GroupCells>,
    day_load: BTreeMap<String, u32>,
    /// slot → [H1, H2] of short bookings; long bookings are not counted
    half_load: BTreeMap<TimeSlot, [u32; 2]>,
}

impl OccupancyTracker {
    /// Creates an empty tracker with zeroed counters for every day and slot.
    pub fn new(slots: &[TimeSlot]) -> Self {
        Self {
            rooms: BTreeMap::new(),
            groups: BTreeMap::new(),
            day_load: slots.iter().map(|s| (s.day.clone(), 0)).collect(),
            half_load: slots.iter().map(|s| (s.clone(), [0, 0])).collect(),
        }
    }

    /// Rebuilds the tracker implied by an assignment set.
    pub fn rebuild(catalog: &Catalog<'_>, assignments: &[Assignment]) -> Result<Self> {
        let mut tracker = Self::new(catalog.slots());
        for a in assignments {
            let course = catalog.course(&a.course)?;
            tracker.reserve(course, &a.slot, a.half, &a.room)?;
        }
        Ok(tracker)
    }

    /// Whether no booking of `room` overlaps `half` at `slot`.
    pub fn is_free(&self, slot: &TimeSlot, half: Half, room: &str) -> bool {
        !self
            .rooms
            .get(slot)
            .and_then(|cells| cells.get(&half))
            .is_some_and(|by_room| by_room.contains_key(room))
    }

    /// Whether `group` is booked at a half overlapping `half`.
    pub fn is_group_busy(&self, group: &str, slot: &TimeSlot, half: Half) -> bool {
        self.group_holders(group, slot, half).is_some()
    }

    /// Courses holding `group` at a half overlapping `half`, with their tag.
    pub fn group_holders(
        &self,
        group: &str,
        slot: &TimeSlot,
        half: Half,
    ) -> Option<&BTreeMap<String, GroupTag>> {
        self.groups
            .get(group)
            .and_then(|slots| slots.get(slot))
            .and_then(|cells| cells.get(&half))
    }

    /// Bookings per day.
    pub fn day_loads(&self) -> &BTreeMap<String, u32> {
        &self.day_load
    }

    /// Bookings on one day.
    pub fn day_load(&self, day: &str) -> u32 {
        self.day_load.get(day).copied().unwrap_or(0)
    }

    /// `[H1, H2]` short bookings of a slot.
    pub fn half_load(&self, slot: &TimeSlot) -> [u32; 2] {
        self.half_load.get(slot).copied().unwrap_or([0, 0])
    }

    /// Books `room` and every group of `course` at `slot`/`half`.
    ///
    /// # Errors
    /// [`ScheduleError::InvariantViolation`] if the room is already booked at
    /// an overlapping half or `half` does not suit the course kind.
    pub fn reserve(&mut self, course: &Course, slot: &TimeSlot, half: Half, room: &str) -> Result<()> {
        if !course.kind.halves().contains(&half) {
            return Err(ScheduleError::invariant(format!(
                "course '{}' cannot book half {half}",
                course.id
            )));
        }
        if !self.is_free(slot, half, room) {
            return Err(ScheduleError::invariant(format!(
                "room '{room}' already booked at {slot} ({half}), cannot place '{}'",
                course.id
            )));
        }

        let cells = self.rooms.entry(slot.clone()).or_default();
        for &cell in half.expansion() {
            cells
                .entry(cell)
                .or_default()
                .entry(room.to_string())
                .or_default()
                .insert(course.id.clone());
        }

        for g in &course.groups {
            let cells = self
                .groups
                .entry(g.group.clone())
                .or_default()
                .entry(slot.clone())
                .or_default();
            for &cell in half.expansion() {
                cells.entry(cell).or_default().insert(course.id.clone(), g.tag);
            }
        }

        *self.day_load.entry(slot.day.clone()).or_insert(0) += 1;
        let halves = self.half_load.entry(slot.clone()).or_insert([0, 0]);
        match half {
            Half::H1 => halves[0] += 1,
            Half::H2 => halves[1] += 1,
            Half::Long => {}
        }
        Ok(())
    }

    /// Exact inverse of [`reserve`](Self::reserve).
    ///
    /// # Errors
    /// [`ScheduleError::InvariantViolation`] if the booking is not held; the
    /// tracker is left untouched in that case.
    pub fn release(&mut self, course: &Course, slot: &TimeSlot, half: Half, room: &str) -> Result<()> {
        if !self.holds(course, slot, half, room) {
            return Err(ScheduleError::invariant(format!(
                "'{}' holds no booking of room '{room}' at {slot} ({half})",
                course.id
            )));
        }

        if let Some(cells) = self.rooms.get_mut(slot) {
            for cell in half.expansion() {
                if let Some(by_room) = cells.get_mut(cell) {
                    if let Some(holders) = by_room.get_mut(room) {
                        holders.remove(&course.id);
                        if holders.is_empty() {
                            by_room.remove(room);
                        }
                    }
                    if by_room.is_empty() {
                        cells.remove(cell);
                    }
                }
            }
            if cells.is_empty() {
                self.rooms.remove(slot);
            }
        }

        for g in &course.groups {
            let Some(slots) = self.groups.get_mut(&g.group) else {
                continue;
            };
            if let Some(cells) = slots.get_mut(slot) {
                for cell in half.expansion() {
                    if let Some(holders) = cells.get_mut(cell) {
                        holders.remove(&course.id);
                        if holders.is_empty() {
                            cells.remove(cell);
                        }
                    }
                }
                if cells.is_empty() {
                    slots.remove(slot);
                }
            }
            if slots.is_empty() {
                self.groups.remove(&g.group);
            }
        }

        if let Some(load) = self.day_load.get_mut(&slot.day) {
            *load -= 1;
        }
        if let Some(halves) = self.half_load.get_mut(slot) {
            match half {
                Half::H1 => halves[0] -= 1,
                Half::H2 => halves[1] -= 1,
                Half::Long => {}
            }
        }
        Ok(())
    }

    /// Whether `course` holds exactly this booking (room and all groups).
    fn holds(&self, course: &Course, slot: &TimeSlot, half: Half, room: &str) -> bool {
        let room_held = half.expansion().iter().all(|cell| {
            self.rooms
                .get(slot)
                .and_then(|cells| cells.get(cell))
                .and_then(|by_room| by_room.get(room))
                .is_some_and(|holders| holders.contains(&course.id))
        });
        let groups_held = course.groups.iter().all(|g| {
            half.expansion().iter().all(|&cell| {
                self.group_holders(&g.group, slot, cell)
                    .is_some_and(|holders| holders.contains_key(&course.id))
            })
        });
        let counted = self.day_load(&slot.day) > 0;
        room_held && groups_held && counted
    }
}
