//! Timetabling domain models.
//!
//! Provides the data types for describing a course timetabling problem
//! and its solution.
//!
//! # Resource Mapping
//!
//! | u-timetable | Resource-allocation view |
//! |-------------|--------------------------|
//! | Course | Job |
//! | (TimeSlot, Half, Room) | Resource unit |
//! | Group | Tenant holding mutually exclusive leases |
//! | Schedule | Allocation plan |

mod course;
mod room;
mod schedule;
mod slot;

pub use course::{Course, CourseKind, GroupRef, GroupTag};
pub use room::Room;
pub use schedule::{
    Assignment, AuditReport, ConflictRecord, Diagnostics, RebalanceStats, Rejection,
    RejectionReason, Rung, Schedule, SharedGroup, SoftConflictDetail,
};
pub use slot::{Half, TimeSlot};
