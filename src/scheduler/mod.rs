//! Allocation engine and schedule evaluation.
//!
//! # Algorithm
//!
//! [`AssignmentEngine`] is a greedy, priority-driven heuristic. Courses are
//! placed one at a time on the lowest-penalty (slot, half, room) candidate,
//! falling back to eviction and then forced placement for mandatory
//! courses. A snapshot-and-rollback pass then tries to clear soft
//! conflicts, and an audit lists the hard conflicts that remain. It is not
//! optimal, but it is deterministic and never leaves a room double-booked.
//!
//! # Components
//!
//! - [`OccupancyTracker`]: room, group and load bookkeeping
//! - [`ConflictClassifier`]: hard/soft conflicts of a candidate
//! - [`CandidateScorer`]: candidate enumeration and penalty
//! - [`ConflictAuditor`]: residual hard conflicts and soft-conflict details
//! - [`ScheduleKpi`]: timetable quality metrics

mod audit;
mod catalog;
mod conflict;
mod engine;
mod kpi;
mod occupancy;
mod rebalance;
mod scorer;

pub use audit::ConflictAuditor;
pub use catalog::Catalog;
pub use conflict::{
    refresh_soft_conflicts, shares_group, Classification, ConflictClassifier, GroupExclusion,
    SubstringDenylist,
};
pub use engine::{AssignmentEngine, CourseState};
pub use kpi::ScheduleKpi;
pub use occupancy::OccupancyTracker;
pub use scorer::{Candidate, CandidateScorer, ConflictMode, Evaluation};
