//! Priority rules and rule engine for course ordering.
//!
//! Courses are placed greedily, so the order decides who gets first pick
//! of scarce slots and rooms. Ordering is expressed as a chain of rules
//! evaluated sequentially: the next rule only breaks ties of the previous.
//!
//! # Usage
//!
//! ```
//! use u_timetable::dispatching::{rules, RuleEngine};
//! use u_timetable::models::Course;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::MostMandatoryGroups)
//!     .with_rule(rules::LargestEnrollment);
//!
//! let courses = vec![
//!     Course::short("SEM").with_students(200),
//!     Course::short("ALG").with_mandatory_group("CS_S1").with_students(40),
//! ];
//! let order = engine.sort_indices(&courses);
//! assert_eq!(courses[order[0]].id, "ALG");
//! ```

mod engine;
pub mod rules;

pub use engine::{RuleEngine, TieBreaker};

use crate::models::Course;
use std::fmt::Debug;

/// Score returned by a priority rule.
///
/// Lower scores = higher priority (placed first).
pub type RuleScore = f64;

/// A rule that evaluates course priority.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules that favor larger quantities
/// return the negated quantity.
pub trait PriorityRule: Send + Sync + Debug {
    /// Rule name (e.g., "MANDATORY").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of a course. Lower = placed earlier.
    fn evaluate(&self, course: &Course) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
