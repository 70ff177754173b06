//! Priority-driven greedy allocation with a retry ladder.
//!
//! # Algorithm
//!
//! 1. Validate the input; refuse to run on any violation.
//! 2. Order courses with the configured [`RuleEngine`].
//! 3. Place each course with the retry ladder:
//!    - **Strict**: best candidate with hard conflicts blocking.
//!    - **Preemptive** (mandatory courses): evict the blockers of the first
//!      hard-conflict rejection if every blocker has strictly fewer
//!      mandatory groups and is under the eviction cap, then retry Strict.
//!    - **Forced** (mandatory courses): best candidate with hard conflicts
//!      ignored. Room occupancy still applies.
//!
//!    A course failing every rung is recorded as unassigned with its
//!    rejection trace.
//! 4. Drain the requeue of evicted courses (FIFO) with the same ladder.
//! 5. Recompute soft-conflict flags, rebalance, audit.
//! 6. Check that the occupancy state matches the final assignment set.
//!
//! # Complexity
//! O(n · s · h · r) per pass, n=courses, s=slots, h=halves, r=rooms. The
//! eviction cap bounds how often a course re-enters the queue.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::audit::ConflictAuditor;
use super::rebalance::ConflictRebalancer;
use super::scorer::{Candidate, CandidateScorer, ConflictMode};
use super::{refresh_soft_conflicts, Catalog, ConflictClassifier, GroupExclusion, OccupancyTracker, SubstringDenylist};
use crate::config::EngineConfig;
use crate::dispatching::RuleEngine;
use crate::error::{Result, ScheduleError};
use crate::models::{
    Assignment, Course, Diagnostics, Rejection, RejectionReason, Room, Rung, Schedule, TimeSlot,
};
use crate::validation::validate_input;

/// Lifecycle of a course within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseState {
    /// Waiting for (re)placement.
    Pending,
    /// Holds an assignment.
    Placed,
    /// Removed by a higher-priority course; queued for replacement.
    Evicted,
    /// Exhausted every rung.
    Unassigned,
}

/// Outcome of one ladder run.
#[derive(Debug, Clone)]
pub(crate) enum Placement {
    Placed(Rung),
    Unplaced(Diagnostics),
}

impl Placement {
    pub(crate) fn is_placed(&self) -> bool {
        matches!(self, Placement::Placed(_))
    }
}

/// Mutable state of one run.
///
/// Cloned wholesale to snapshot before a rebalancing trial.
#[derive(Debug, Clone)]
pub(crate) struct RunState {
    pub(crate) tracker: OccupancyTracker,
    pub(crate) assignments: Vec<Assignment>,
    pub(crate) states: BTreeMap<String, CourseState>,
    pub(crate) requeue: VecDeque<String>,
    pub(crate) eviction_counts: BTreeMap<String, u32>,
    pub(crate) evicted: Vec<String>,
    pub(crate) diagnostics: BTreeMap<String, Diagnostics>,
}

impl RunState {
    fn new(courses: &[Course], slots: &[TimeSlot]) -> Self {
        Self {
            tracker: OccupancyTracker::new(slots),
            assignments: Vec::new(),
            states: courses
                .iter()
                .map(|c| (c.id.clone(), CourseState::Pending))
                .collect(),
            requeue: VecDeque::new(),
            eviction_counts: BTreeMap::new(),
            evicted: Vec::new(),
            diagnostics: BTreeMap::new(),
        }
    }

    pub(crate) fn state(&self, course: &str) -> CourseState {
        self.states
            .get(course)
            .copied()
            .unwrap_or(CourseState::Pending)
    }

    fn evictions(&self, course: &str) -> u32 {
        self.eviction_counts.get(course).copied().unwrap_or(0)
    }

    fn commit(&mut self, course: &Course, candidate: &Candidate, rung: Rung) -> Result<()> {
        if self.assignments.iter().any(|a| a.course == course.id) {
            return Err(ScheduleError::invariant(format!(
                "course '{}' assigned twice",
                course.id
            )));
        }
        self.tracker
            .reserve(course, &candidate.slot, candidate.half, &candidate.room)?;

        let mut assignment = Assignment::new(
            course.id.clone(),
            candidate.slot.clone(),
            candidate.room.clone(),
            candidate.half,
        )
        .with_rung(rung);
        assignment.soft_conflict = candidate.soft_score > 0.0;
        self.assignments.push(assignment);

        self.states.insert(course.id.clone(), CourseState::Placed);
        self.diagnostics.remove(&course.id);
        Ok(())
    }

    /// Releases and removes the assignment of `course`.
    pub(crate) fn unassign(&mut self, catalog: &Catalog<'_>, course: &str) -> Result<Assignment> {
        let idx = self
            .assignments
            .iter()
            .position(|a| a.course == course)
            .ok_or_else(|| ScheduleError::invariant(format!("course '{course}' is not assigned")))?;
        let assignment = self.assignments.remove(idx);
        self.tracker.release(
            catalog.course(course)?,
            &assignment.slot,
            assignment.half,
            &assignment.room,
        )?;
        self.states.insert(course.to_string(), CourseState::Pending);
        Ok(assignment)
    }

    fn evict(&mut self, catalog: &Catalog<'_>, victim: &str, by: &str) -> Result<()> {
        let freed = self.unassign(catalog, victim)?;
        self.states.insert(victim.to_string(), CourseState::Evicted);
        *self.eviction_counts.entry(victim.to_string()).or_insert(0) += 1;
        self.requeue.push_back(victim.to_string());
        self.evicted.push(victim.to_string());
        debug!(
            victim,
            by,
            slot = %freed.slot,
            room = %freed.room,
            half = %freed.half,
            "evicted"
        );
        Ok(())
    }

    fn mark_unassigned(&mut self, course: &str, diagnostics: Diagnostics) {
        self.states.insert(course.to_string(), CourseState::Unassigned);
        self.diagnostics.insert(course.to_string(), diagnostics);
    }
}

/// Course timetabling engine.
///
/// Owns the configuration, the course ordering and the group exclusion
/// predicate. Holds no run state, so one engine can serve concurrent runs.
///
/// # Example
///
/// ```
/// use u_timetable::models::{Course, Room, TimeSlot};
/// use u_timetable::scheduler::AssignmentEngine;
///
/// let courses = vec![
///     Course::short("ALG").with_mandatory_group("CS_S1").with_students(40),
///     Course::short("NET").with_mandatory_group("CS_S1").with_students(40),
/// ];
/// let rooms = vec![Room::new("101", 50)];
/// let slots = vec![TimeSlot::new("Mon", "AM")];
///
/// let schedule = AssignmentEngine::default().schedule(&courses, &rooms, &slots).unwrap();
/// assert!(schedule.is_complete());
/// assert!(schedule.is_valid());
/// // One room, two halves: the courses split the slot.
/// assert_ne!(schedule.assignments[0].half, schedule.assignments[1].half);
/// ```
#[derive(Debug, Clone)]
pub struct AssignmentEngine {
    config: EngineConfig,
    rules: RuleEngine,
    exclusion: Arc<dyn GroupExclusion>,
}

impl AssignmentEngine {
    /// Creates an engine. The exclusion predicate is a
    /// [`SubstringDenylist`] over `config.excluded_group_markers`.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            rules: RuleEngine::for_order(config.priority),
            exclusion: Arc::new(SubstringDenylist::new(&config.excluded_group_markers)),
            config,
        }
    }

    /// Replaces the group exclusion predicate.
    pub fn with_exclusion<E: GroupExclusion + 'static>(mut self, exclusion: E) -> Self {
        self.exclusion = Arc::new(exclusion);
        self
    }

    /// Replaces the course ordering.
    pub fn with_rule_engine(mut self, rules: RuleEngine) -> Self {
        self.rules = rules;
        self
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Group exclusion predicate.
    pub fn exclusion(&self) -> &dyn GroupExclusion {
        self.exclusion.as_ref()
    }

    /// Assigns every course a slot, half and room.
    ///
    /// # Errors
    /// - [`ScheduleError::InvalidInput`] if validation fails; nothing is
    ///   scheduled.
    /// - [`ScheduleError::InvariantViolation`] on an internal inconsistency.
    pub fn schedule(&self, courses: &[Course], rooms: &[Room], slots: &[TimeSlot]) -> Result<Schedule> {
        validate_input(courses, rooms, slots).map_err(ScheduleError::InvalidInput)?;
        let catalog = Catalog::new(courses, rooms, slots);
        let mut run = RunState::new(courses, slots);

        info!(
            courses = courses.len(),
            rooms = rooms.len(),
            slots = slots.len(),
            rules = ?self.rules.rule_names(),
            "allocation started"
        );

        for idx in self.rules.sort_indices(courses) {
            self.place_or_give_up(&catalog, &courses[idx], &mut run)?;
        }

        while let Some(id) = run.requeue.pop_front() {
            let course = catalog.course(&id)?;
            self.place_or_give_up(&catalog, course, &mut run)?;
        }

        let soft = refresh_soft_conflicts(&mut run.assignments, &catalog)?;
        info!(
            placed = run.assignments.len(),
            evictions = run.evicted.len(),
            soft_conflicts = soft,
            "greedy pass finished"
        );

        let rebalance = if self.config.rebalance {
            ConflictRebalancer::new(self).run(&catalog, &mut run)?
        } else {
            Default::default()
        };
        refresh_soft_conflicts(&mut run.assignments, &catalog)?;

        self.verify(&catalog, &run)?;
        let audit = ConflictAuditor::new(self.exclusion()).audit(&catalog, &run.assignments)?;
        if !audit.is_clean() {
            warn!(conflicts = audit.conflicts.len(), "residual hard conflicts");
        }

        let unassigned: Vec<String> = courses
            .iter()
            .filter(|c| run.state(&c.id) == CourseState::Unassigned)
            .map(|c| c.id.clone())
            .collect();
        run.diagnostics.retain(|id, _| unassigned.contains(id));

        info!(
            placed = run.assignments.len(),
            unassigned = unassigned.len(),
            soft_conflicts = run.assignments.iter().filter(|a| a.soft_conflict).count(),
            hard_conflicts = audit.conflicts.len(),
            "allocation finished"
        );

        Ok(Schedule {
            assignments: run.assignments,
            unassigned,
            diagnostics: run.diagnostics,
            audit,
            evicted: run.evicted,
            rebalance,
        })
    }

    fn scorer(&self) -> CandidateScorer<'_> {
        CandidateScorer::new(&self.config, ConflictClassifier::new(self.exclusion()))
    }

    fn place_or_give_up(&self, catalog: &Catalog<'_>, course: &Course, run: &mut RunState) -> Result<()> {
        match self.place(catalog, course, run, true)? {
            Placement::Placed(rung) => debug!(course = %course.id, ?rung, "settled"),
            Placement::Unplaced(diagnostics) => {
                warn!(course = %course.id, rejections = diagnostics.rejections.len(), "unassigned");
                run.mark_unassigned(&course.id, diagnostics);
            }
        }
        Ok(())
    }

    /// Runs the retry ladder for one course.
    ///
    /// With `allow_preempt` unset the Preemptive rung is skipped.
    pub(crate) fn place(
        &self,
        catalog: &Catalog<'_>,
        course: &Course,
        run: &mut RunState,
        allow_preempt: bool,
    ) -> Result<Placement> {
        run.states.insert(course.id.clone(), CourseState::Pending);
        let scorer = self.scorer();

        let strict = scorer.evaluate(course, catalog, &run.tracker, ConflictMode::Block);
        if let Some(best) = &strict.best {
            run.commit(course, best, Rung::Strict)?;
            debug!(course = %course.id, slot = %best.slot, room = %best.room, half = %best.half, "placed");
            return Ok(Placement::Placed(Rung::Strict));
        }

        let diagnostics = Diagnostics {
            rejections: strict.rejections,
        };
        if !course.is_mandatory() {
            return Ok(Placement::Unplaced(diagnostics));
        }

        if allow_preempt {
            if let Some(victims) = self.eviction_targets(catalog, course, &diagnostics.rejections, run)? {
                for victim in &victims {
                    run.evict(catalog, victim, &course.id)?;
                }
                let retry = scorer.evaluate(course, catalog, &run.tracker, ConflictMode::Block);
                if let Some(best) = &retry.best {
                    run.commit(course, best, Rung::Preemptive)?;
                    debug!(course = %course.id, evicted = ?victims, "placed by preemption");
                    return Ok(Placement::Placed(Rung::Preemptive));
                }
            }
        }

        let forced = scorer.evaluate(course, catalog, &run.tracker, ConflictMode::Ignore);
        if let Some(best) = &forced.best {
            run.commit(course, best, Rung::Forced)?;
            warn!(course = %course.id, slot = %best.slot, room = %best.room, "forced placement");
            return Ok(Placement::Placed(Rung::Forced));
        }

        Ok(Placement::Unplaced(diagnostics))
    }

    /// Blockers of the first hard-conflict rejection that may all be evicted.
    fn eviction_targets(
        &self,
        catalog: &Catalog<'_>,
        course: &Course,
        rejections: &[Rejection],
        run: &RunState,
    ) -> Result<Option<Vec<String>>> {
        let priority = course.mandatory_count();
        for rejection in rejections {
            let RejectionReason::HardConflict { blockers, .. } = &rejection.reason else {
                continue;
            };
            let mut evictable = !blockers.is_empty();
            for blocker in blockers {
                let outranked =
                    blocker != &course.id && catalog.course(blocker)?.mandatory_count() < priority;
                let capped = run.evictions(blocker) >= self.config.max_evictions_per_course;
                if outranked && capped {
                    warn!(course = %course.id, blocker = %blocker, "eviction cap reached");
                }
                evictable &= outranked && !capped;
            }
            if evictable {
                return Ok(Some(blockers.clone()));
            }
        }
        Ok(None)
    }

    /// Cross-checks the occupancy state against the assignment set.
    fn verify(&self, catalog: &Catalog<'_>, run: &RunState) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for a in &run.assignments {
            if !seen.insert(a.course.as_str()) {
                return Err(ScheduleError::invariant(format!(
                    "course '{}' assigned twice",
                    a.course
                )));
            }
        }
        if OccupancyTracker::rebuild(catalog, &run.assignments)? != run.tracker {
            return Err(ScheduleError::invariant(
                "occupancy state diverged from assignments",
            ));
        }
        Ok(())
    }
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
