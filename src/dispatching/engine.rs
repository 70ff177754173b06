//! Rule engine for multi-criteria course ordering.
//!
//! Composes priority rules sequentially: each rule only decides between
//! courses the previous rules tied on.

use std::sync::Arc;

use super::{rules, PriorityRule, RuleScore};
use crate::config::PriorityOrder;
use crate::models::Course;

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Default)]
pub enum TieBreaker {
    /// Keep input order (stable sort).
    #[default]
    InputOrder,
    /// Deterministic by course ID (lexicographic).
    ById,
}

/// A composable rule engine for course prioritization.
///
/// # Example
/// ```
/// use u_timetable::config::PriorityOrder;
/// use u_timetable::dispatching::RuleEngine;
///
/// let engine = RuleEngine::for_order(PriorityOrder::EnrollmentFirst);
/// assert_eq!(engine.rule_names(), vec!["ENROLLMENT", "MANDATORY", "GROUPS"]);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn PriorityRule>>,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            tie_breaker: TieBreaker::InputOrder,
            epsilon: 1e-9,
        }
    }

    /// Builds the rule chain for a configured ordering.
    pub fn for_order(order: PriorityOrder) -> Self {
        match order {
            PriorityOrder::MandatoryFirst => Self::new()
                .with_rule(rules::MostMandatoryGroups)
                .with_rule(rules::MostGroups)
                .with_rule(rules::LargestEnrollment),
            PriorityOrder::EnrollmentFirst => Self::new()
                .with_rule(rules::LargestEnrollment)
                .with_rule(rules::MostMandatoryGroups)
                .with_rule(rules::MostGroups),
        }
    }

    /// Appends a rule to the chain.
    pub fn with_rule<R: PriorityRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Names of the chained rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Sorts courses by priority (highest priority first).
    ///
    /// Returns indices into the original slice.
    pub fn sort_indices(&self, courses: &[Course]) -> Vec<usize> {
        let scores: Vec<Vec<RuleScore>> = courses.iter().map(|c| self.evaluate(c)).collect();
        let mut indices: Vec<usize> = (0..courses.len()).collect();
        indices.sort_by(|&a, &b| {
            for (sa, sb) in scores[a].iter().zip(&scores[b]) {
                if (sa - sb).abs() > self.epsilon {
                    return sa.partial_cmp(sb).unwrap_or(std::cmp::Ordering::Equal);
                }
            }
            match self.tie_breaker {
                TieBreaker::InputOrder => std::cmp::Ordering::Equal,
                TieBreaker::ById => courses[a].id.cmp(&courses[b].id),
            }
        });
        indices
    }

    /// Evaluates a single course and returns the score of each rule.
    pub fn evaluate(&self, course: &Course) -> Vec<RuleScore> {
        self.rules.iter().map(|r| r.evaluate(course)).collect()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
