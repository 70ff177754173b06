//! Built-in priority rules.
//!
//! All rules return lower scores for courses that should be placed first.

use super::{PriorityRule, RuleScore};
use crate::models::Course;

/// Most mandatory groups first.
///
/// Courses binding many cohorts are the hardest to place without hard
/// conflicts, so they pick first.
#[derive(Debug, Clone, Copy)]
pub struct MostMandatoryGroups;

impl PriorityRule for MostMandatoryGroups {
    fn name(&self) -> &'static str {
        "MANDATORY"
    }

    fn evaluate(&self, course: &Course) -> RuleScore {
        -(course.mandatory_count() as f64)
    }

    fn description(&self) -> &'static str {
        "Most Mandatory Groups"
    }
}

/// Most distinct groups first.
#[derive(Debug, Clone, Copy)]
pub struct MostGroups;

impl PriorityRule for MostGroups {
    fn name(&self) -> &'static str {
        "GROUPS"
    }

    fn evaluate(&self, course: &Course) -> RuleScore {
        -(course.group_count() as f64)
    }

    fn description(&self) -> &'static str {
        "Most Distinct Groups"
    }
}

/// Largest estimated enrollment first.
///
/// Large courses need the few large rooms.
#[derive(Debug, Clone, Copy)]
pub struct LargestEnrollment;

impl PriorityRule for LargestEnrollment {
    fn name(&self) -> &'static str {
        "ENROLLMENT"
    }

    fn evaluate(&self, course: &Course) -> RuleScore {
        -f64::from(course.estimated_students)
    }

    fn description(&self) -> &'static str {
        "Largest Estimated Enrollment"
    }
}
