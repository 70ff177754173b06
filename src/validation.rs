//! Input validation for timetabling problems.
//!
//! Checks structural integrity of courses, rooms, and time slots before
//! scheduling. Detects:
//! - Duplicate IDs
//! - Non-positive room capacities
//! - An empty time-slot list or unlabeled slots
//! - Course room restrictions naming unknown rooms
//! - A group listed twice on the same course
//!
//! The engine refuses to schedule anything when validation fails.

use std::collections::HashSet;
use thiserror::Error;

use crate::models::{Course, Room, TimeSlot};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A course references a room that doesn't exist.
    InvalidRoomReference,
    /// A room has zero or negative capacity.
    InvalidCapacity,
    /// No time slots were supplied.
    EmptyTimeSlots,
    /// A time slot has an empty day or period.
    InvalidTimeSlot,
    /// A course lists the same group twice.
    DuplicateGroup,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the static input of a scheduling run.
///
/// Checks:
/// 1. At least one time slot, each with a day and a period
/// 2. No duplicate slot IDs
/// 3. No duplicate room IDs, every capacity positive
/// 4. No duplicate course IDs
/// 5. No group listed twice on one course
/// 6. All room restrictions point to existing rooms
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(courses: &[Course], rooms: &[Room], slots: &[TimeSlot]) -> ValidationResult {
    let mut errors = Vec::new();

    if slots.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyTimeSlots,
            "No time slots supplied",
        ));
    }

    let mut slot_ids = HashSet::new();
    for slot in slots {
        if slot.day.trim().is_empty() || slot.period.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeSlot,
                format!("Time slot '{slot}' needs both a day and a period"),
            ));
        }
        if !slot_ids.insert(slot) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate time slot: {slot}"),
            ));
        }
    }

    let mut room_ids = HashSet::new();
    for r in rooms {
        if !room_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
        if r.capacity <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCapacity,
                format!("Room '{}' has non-positive capacity {}", r.id, r.capacity),
            ));
        }
    }

    let mut course_ids = HashSet::new();
    for course in courses {
        if !course_ids.insert(course.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course ID: {}", course.id),
            ));
        }

        let mut groups = HashSet::new();
        for g in &course.groups {
            if !groups.insert(g.group.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateGroup,
                    format!("Course '{}' lists group '{}' twice", course.id, g.group),
                ));
            }
        }

        for room in &course.room_candidates {
            if !room_ids.contains(room.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidRoomReference,
                    format!("Course '{}' references unknown room '{}'", course.id, room),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rooms() -> Vec<Room> {
        vec![Room::new("Amphi", 201), Room::new("101", 95)]
    }

    fn sample_slots() -> Vec<TimeSlot> {
        vec![TimeSlot::new("Mon", "AM"), TimeSlot::new("Mon", "PM")]
    }

    fn sample_courses() -> Vec<Course> {
        vec![
            Course::short("ALG")
                .with_mandatory_group("CS_S1")
                .with_regular_group("MATH_S1"),
            Course::long("DB")
                .with_mandatory_group("CS_S3")
                .with_room_candidates(vec!["101".into()]),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_courses(), &sample_rooms(), &sample_slots()).is_ok());
    }

    #[test]
    fn test_duplicate_course_id() {
        let courses = vec![Course::short("ALG"), Course::long("ALG")];
        let errors = validate_input(&courses, &sample_rooms(), &sample_slots()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("course")));
    }

    #[test]
    fn test_duplicate_room_id() {
        let rooms = vec![Room::new("101", 95), Room::new("101", 49)];
        let errors = validate_input(&sample_courses(), &rooms, &sample_slots()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("room")));
    }

    #[test]
    fn test_duplicate_slot() {
        let slots = vec![TimeSlot::new("Mon", "AM"), TimeSlot::new("Mon", "AM")];
        let errors = validate_input(&[], &sample_rooms(), &slots).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("Mon_AM")));
    }

    #[test]
    fn test_non_positive_capacity() {
        let rooms = vec![Room::new("10", 0), Room::new("12", -15)];
        let errors = validate_input(&[], &rooms, &sample_slots()).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::InvalidCapacity)
                .count(),
            2
        );
    }

    #[test]
    fn test_empty_time_slots() {
        let errors = validate_input(&sample_courses(), &sample_rooms(), &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyTimeSlots));
    }

    #[test]
    fn test_unlabeled_slot() {
        let slots = vec![TimeSlot::new("Mon", "")];
        let errors = validate_input(&[], &sample_rooms(), &slots).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidTimeSlot));
    }

    #[test]
    fn test_unknown_room_reference() {
        let courses = vec![Course::short("LAB1").with_room_candidates(vec!["NOWHERE".into()])];
        let errors = validate_input(&courses, &sample_rooms(), &sample_slots()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidRoomReference));
    }

    #[test]
    fn test_duplicate_group_on_course() {
        let courses = vec![Course::short("ALG")
            .with_mandatory_group("CS_S1")
            .with_regular_group("CS_S1")];
        let errors = validate_input(&courses, &sample_rooms(), &sample_slots()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateGroup));
    }

    #[test]
    fn test_multiple_errors() {
        let courses = vec![Course::short("X").with_room_candidates(vec!["UNKNOWN".into()])];
        let rooms = vec![Room::new("10", -1)];
        let errors = validate_input(&courses, &rooms, &[]).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
