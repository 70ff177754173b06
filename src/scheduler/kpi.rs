//! Schedule quality metrics (KPIs).
//!
//! Computes timetable indicators from a completed schedule and its input.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Placement rate | Assigned / all courses |
//! | Soft conflicts | Assignments sharing a group at an overlapping half |
//! | Hard conflicts | Pairs reported by the audit |
//! | Total overload | Sum of max(0, students - capacity) |
//! | Total underuse | Sum of max(0, capacity - students) |
//! | Avg fill ratio | Mean students / capacity |
//! | Slot usage | Assignments per slot and per (slot, half) |

use std::collections::BTreeMap;

use crate::models::{Course, Half, Room, Schedule, TimeSlot};

/// Timetable performance indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleKpi {
    /// Placed courses.
    pub assigned: usize,
    /// Courses that exhausted every rung.
    pub unassigned: usize,
    /// Fraction of courses placed (0.0..1.0).
    pub placement_rate: f64,
    /// Soft-conflicted assignments.
    pub soft_conflicts: usize,
    /// Residual hard-conflict pairs.
    pub hard_conflicts: usize,
    /// Assignments placed with hard conflicts ignored.
    pub forced: usize,
    /// Evictions during the run.
    pub evictions: usize,
    /// Students without a seat, summed over assignments.
    pub total_overload: u64,
    /// Empty seats, summed over assignments.
    pub total_underuse: u64,
    /// Mean students / capacity over assignments.
    pub avg_fill_ratio: f64,
    /// Assignments per slot ID; every slot is listed.
    pub courses_by_slot: BTreeMap<String, usize>,
    /// Assignments per slot ID and half.
    pub half_usage: BTreeMap<String, BTreeMap<Half, usize>>,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its input.
    ///
    /// Assignments naming an unknown course or room are left out of the
    /// seat metrics.
    pub fn calculate(schedule: &Schedule, courses: &[Course], rooms: &[Room], slots: &[TimeSlot]) -> Self {
        let mut total_overload: u64 = 0;
        let mut total_underuse: u64 = 0;
        let mut fill_sum: f64 = 0.0;
        let mut fill_count: usize = 0;

        let mut courses_by_slot: BTreeMap<String, usize> =
            slots.iter().map(|s| (s.id(), 0)).collect();
        let mut half_usage: BTreeMap<String, BTreeMap<Half, usize>> = BTreeMap::new();

        for a in &schedule.assignments {
            let slot_id = a.slot.id();
            *courses_by_slot.entry(slot_id.clone()).or_insert(0) += 1;
            *half_usage.entry(slot_id).or_default().entry(a.half).or_insert(0) += 1;

            let course = courses.iter().find(|c| c.id == a.course);
            let room = rooms.iter().find(|r| r.id == a.room);
            if let (Some(course), Some(room)) = (course, room) {
                let students = i64::from(course.estimated_students);
                let capacity = i64::from(room.capacity);
                total_overload += (students - capacity).max(0) as u64;
                total_underuse += (capacity - students).max(0) as u64;
                if capacity > 0 {
                    fill_sum += students as f64 / capacity as f64;
                    fill_count += 1;
                }
            }
        }

        let assigned = schedule.assignments.len();
        let total = assigned + schedule.unassigned.len();
        let placement_rate = if total == 0 {
            1.0
        } else {
            assigned as f64 / total as f64
        };
        let avg_fill_ratio = if fill_count == 0 {
            0.0
        } else {
            fill_sum / fill_count as f64
        };

        Self {
            assigned,
            unassigned: schedule.unassigned.len(),
            placement_rate,
            soft_conflicts: schedule.soft_conflict_count(),
            hard_conflicts: schedule.audit.conflicts.len(),
            forced: schedule.forced_courses().len(),
            evictions: schedule.evicted.len(),
            total_overload,
            total_underuse,
            avg_fill_ratio,
            courses_by_slot,
            half_usage,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_unassigned: usize, max_hard_conflicts: usize) -> bool {
        self.unassigned <= max_unassigned && self.hard_conflicts <= max_hard_conflicts
    }
}
