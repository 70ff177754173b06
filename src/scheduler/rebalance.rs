//! Soft-conflict rebalancing.
//!
//! Every assignment flagged with a soft conflict gets one trial move: take
//! it out, run the placement ladder again (evicting if the course is
//! mandatory), re-place whatever the trial evicted without further
//! eviction, then compare. The move is kept only if the course is placed
//! and clear of soft conflicts, every evictee is placed again, and the
//! global soft-conflict count went strictly down. Otherwise the whole run
//! state is restored from the snapshot taken before the trial.
//!
//! The soft-conflict count therefore never increases across the pass.

use tracing::{debug, info};

use super::engine::{AssignmentEngine, RunState};
use super::{refresh_soft_conflicts, Catalog};
use crate::error::Result;
use crate::models::RebalanceStats;

/// Snapshot-and-rollback local search over soft-conflicted assignments.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConflictRebalancer<'e> {
    engine: &'e AssignmentEngine,
}

impl<'e> ConflictRebalancer<'e> {
    pub(crate) fn new(engine: &'e AssignmentEngine) -> Self {
        Self { engine }
    }

    /// Runs one pass over the currently flagged assignments.
    pub(crate) fn run(&self, catalog: &Catalog<'_>, run: &mut RunState) -> Result<RebalanceStats> {
        let mut current = refresh_soft_conflicts(&mut run.assignments, catalog)?;
        let flagged: Vec<String> = run
            .assignments
            .iter()
            .filter(|a| a.soft_conflict)
            .map(|a| a.course.clone())
            .collect();
        info!(flagged = flagged.len(), "rebalancing soft conflicts");

        let mut stats = RebalanceStats::default();
        for id in flagged {
            // An earlier kept move may already have cleared it.
            let still_flagged = run
                .assignments
                .iter()
                .any(|a| a.course == id && a.soft_conflict);
            if !still_flagged {
                continue;
            }
            stats.reviewed += 1;

            let snapshot = run.clone();
            match self.trial(catalog, &id, run, current)? {
                Some(improved) => {
                    debug!(course = %id, before = current, after = improved, "move kept");
                    current = improved;
                    stats.improved += 1;
                }
                None => {
                    *run = snapshot;
                    stats.rolled_back += 1;
                }
            }
        }

        info!(
            reviewed = stats.reviewed,
            improved = stats.improved,
            rolled_back = stats.rolled_back,
            soft_conflicts = current,
            "rebalancing finished"
        );
        Ok(stats)
    }

    /// Moves `id` and returns the new soft count if the move is acceptable.
    /// Leaves `run` dirty on rejection; the caller restores it.
    fn trial(&self, catalog: &Catalog<'_>, id: &str, run: &mut RunState, baseline: usize) -> Result<Option<usize>> {
        let course = catalog.course(id)?;
        run.unassign(catalog, id)?;

        if !self
            .engine
            .place(catalog, course, run, course.is_mandatory())?
            .is_placed()
        {
            return Ok(None);
        }

        while let Some(evictee) = run.requeue.pop_front() {
            let other = catalog.course(&evictee)?;
            if !self.engine.place(catalog, other, run, false)?.is_placed() {
                return Ok(None);
            }
        }

        let total = refresh_soft_conflicts(&mut run.assignments, catalog)?;
        let cleared = run
            .assignments
            .iter()
            .any(|a| a.course == id && !a.soft_conflict);
        Ok((cleared && total < baseline).then_some(total))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EngineConfig;
    use crate::dispatching::RuleEngine;
    use crate::models::{Course, Half, Room, TimeSlot};
    use crate::scheduler::AssignmentEngine;

    #[test]
    fn test_rebalance_clears_soft_conflict() {
        // A takes Mon in the big room. B may only use 101, which Y holds on
        // Tue, so B lands next to A. Once both are placed, A can move to Tue.
        let courses = vec![
            Course::long("A").with_regular_group("G"),
            Course::long("Y").with_room_candidates(vec!["101".into()]),
            Course::long("B")
                .with_regular_group("G")
                .with_room_candidates(vec!["101".into()]),
        ];
        let rooms = vec![Room::new("101", 50), Room::new("102", 80)];
        let slots = vec![TimeSlot::new("Mon", "AM"), TimeSlot::new("Tue", "AM")];

        let plain = AssignmentEngine::new(EngineConfig::default().with_rebalance(false))
            .with_rule_engine(RuleEngine::new())
            .schedule(&courses, &rooms, &slots)
            .unwrap();
        assert_eq!(plain.soft_conflict_count(), 2);
        assert_eq!(plain.assignment_for_course("A").unwrap().slot, slots[0]);

        let rebalanced = AssignmentEngine::default()
            .with_rule_engine(RuleEngine::new())
            .schedule(&courses, &rooms, &slots)
            .unwrap();
        assert_eq!(rebalanced.soft_conflict_count(), 0);
        assert_eq!(rebalanced.rebalance.reviewed, 1);
        assert_eq!(rebalanced.rebalance.improved, 1);
        let a = rebalanced.assignment_for_course("A").unwrap();
        assert_eq!(a.slot, slots[1]);
        assert_eq!(a.room, "102");
        assert!(rebalanced.is_complete());
    }

    #[test]
    fn test_rebalance_rolls_back_lateral_move() {
        // Only one slot: nothing can improve.
        let courses = vec![
            Course::short("A").with_regular_group("G"),
            Course::long("B").with_regular_group("G"),
        ];
        let rooms = vec![Room::new("101", 50), Room::new("102", 50)];
        let slots = vec![TimeSlot::new("Mon", "AM")];

        let s = AssignmentEngine::default()
            .schedule(&courses, &rooms, &slots)
            .unwrap();
        assert_eq!(s.soft_conflict_count(), 2);
        assert_eq!(s.rebalance.improved, 0);
        assert_eq!(s.rebalance.rolled_back, s.rebalance.reviewed);
        assert!(s.rebalance.reviewed > 0);
        assert_eq!(s.assignment_for_course("B").unwrap().half, Half::Long);
    }

    #[test]
    fn test_rebalance_never_increases_soft_count() {
        let groups = ["G1", "G2", "G3"];
        let courses: Vec<Course> = (0..12)
            .map(|i| {
                let c = if i % 3 == 0 {
                    Course::long(format!("C{i}"))
                } else {
                    Course::short(format!("C{i}"))
                };
                c.with_regular_group(groups[i % 3])
                    .with_mandatory_group(groups[(i + 1) % 3])
            })
            .collect();
        let rooms = vec![Room::new("101", 50), Room::new("102", 80)];
        let slots = vec![
            TimeSlot::new("Mon", "AM"),
            TimeSlot::new("Mon", "PM"),
            TimeSlot::new("Tue", "AM"),
        ];

        let before = AssignmentEngine::new(EngineConfig::default().with_rebalance(false))
            .schedule(&courses, &rooms, &slots)
            .unwrap();
        let after = AssignmentEngine::default()
            .schedule(&courses, &rooms, &slots)
            .unwrap();
        assert!(after.soft_conflict_count() <= before.soft_conflict_count());
        assert_eq!(after.assignment_count(), before.assignment_count());
    }
}
