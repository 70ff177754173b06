//! Course timetabling for the U-Engine ecosystem.
//!
//! Assigns every course a time slot, a half (or the whole slot for long
//! courses) and a room so that no room is double-booked and no student
//! cohort has to attend two mandatory courses at once. Courses that cannot
//! be placed are reported with the reason why.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Course`, `Room`, `TimeSlot`, `Half`,
//!   `Assignment`, `Schedule`
//! - **`config`**: Engine knobs, loadable from TOML
//! - **`dispatching`**: Priority rules deciding placement order
//! - **`scheduler`**: Allocation engine, conflict audit, KPIs
//! - **`validation`**: Input integrity checks (duplicate IDs, capacities, room refs)
//!
//! # Example
//!
//! ```
//! use u_timetable::models::{Course, Room, TimeSlot};
//!
//! let courses = vec![
//!     Course::long("DB").with_mandatory_group("CS_S3").with_students(80),
//!     Course::short("NET").with_mandatory_group("CS_S3").with_students(40),
//! ];
//! let rooms = vec![Room::new("Amphi", 120), Room::new("101", 45)];
//! let slots = vec![TimeSlot::new("Mon", "AM"), TimeSlot::new("Mon", "PM")];
//!
//! let schedule = u_timetable::schedule(&courses, &rooms, &slots).unwrap();
//! assert!(schedule.is_complete());
//! assert!(schedule.is_valid());
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"

pub mod config;
pub mod dispatching;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{Result, ScheduleError};

use models::{Course, Room, Schedule, TimeSlot};

/// Schedules with the default [`EngineConfig`](config::EngineConfig).
pub fn schedule(courses: &[Course], rooms: &[Room], slots: &[TimeSlot]) -> Result<Schedule> {
    scheduler::AssignmentEngine::default().schedule(courses, rooms, slots)
}
