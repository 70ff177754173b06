//! Candidate enumeration and scoring.
//!
//! For one course the scorer walks every (slot, half, room) candidate and
//! keeps the one with the lowest penalty:
//!
//! ```text
//! penalty = α·softScore + β·σ(dayLoad + 1 on the slot's day)
//!                       + γ·σ(halfLoad[slot] + the booked half)
//! ```
//!
//! where σ is the population standard deviation. Long bookings span both
//! halves, so their γ term is 0 and they never enter `halfLoad`. Slots are visited by
//! ascending day load, halves in kind order, rooms by the configured
//! [`RoomSelection`]. Only a strictly smaller penalty replaces the current
//! best, so ties go to the first candidate visited.

use super::{Catalog, ConflictClassifier, OccupancyTracker};
use crate::config::{EngineConfig, RoomSelection, ScoringWeights};
use crate::models::{Course, Half, Rejection, RejectionReason, Room, TimeSlot};

/// Treatment of hard conflicts during enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictMode {
    /// Hard-conflicting candidates are rejected.
    Block,
    /// Hard conflicts are ignored (forced placement).
    Ignore,
}

/// A scored candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Slot.
    pub slot: TimeSlot,
    /// Half.
    pub half: Half,
    /// Room ID.
    pub room: String,
    /// Total penalty.
    pub penalty: f64,
    /// Soft-conflict fraction at this candidate.
    pub soft_score: f64,
}

/// Result of one enumeration.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Lowest-penalty admissible candidate.
    pub best: Option<Candidate>,
    /// Every rejected candidate, in enumeration order.
    pub rejections: Vec<Rejection>,
}

/// Enumerates and scores candidates for one course.
#[derive(Debug, Clone, Copy)]
pub struct CandidateScorer<'x> {
    weights: ScoringWeights,
    selection: RoomSelection,
    classifier: ConflictClassifier<'x>,
}

impl<'x> CandidateScorer<'x> {
    /// Creates a scorer.
    pub fn new(config: &EngineConfig, classifier: ConflictClassifier<'x>) -> Self {
        Self {
            weights: config.weights,
            selection: config.room_selection,
            classifier,
        }
    }

    /// Finds the best candidate for `course`.
    pub fn evaluate(
        &self,
        course: &Course,
        catalog: &Catalog<'_>,
        tracker: &OccupancyTracker,
        mode: ConflictMode,
    ) -> Evaluation {
        let (rooms, undersized) = self.room_order(course, catalog.rooms());
        let mut eval = Evaluation::default();

        for slot in slot_order(catalog.slots(), tracker) {
            let day_sigma = day_deviation(tracker, &slot.day);
            for &half in course.kind.halves() {
                let conflicts = self.classifier.classify(course, slot, half, tracker);
                let half_sigma = half_deviation(tracker.half_load(slot), half);
                let penalty = self.weights.soft_conflict * conflicts.soft_score
                    + self.weights.day_balance * day_sigma
                    + self.weights.half_balance * half_sigma;

                for room in &rooms {
                    let reason = if !tracker.is_free(slot, half, &room.id) {
                        Some(RejectionReason::RoomOccupied)
                    } else if mode == ConflictMode::Block && conflicts.is_hard() {
                        Some(RejectionReason::HardConflict {
                            groups: conflicts.hard_groups.clone(),
                            blockers: conflicts.blockers.clone(),
                        })
                    } else {
                        None
                    };

                    if let Some(reason) = reason {
                        eval.rejections.push(Rejection {
                            slot: slot.clone(),
                            half,
                            room: room.id.clone(),
                            reason,
                        });
                        continue;
                    }

                    if eval.best.as_ref().map_or(true, |b| penalty < b.penalty) {
                        eval.best = Some(Candidate {
                            slot: slot.clone(),
                            half,
                            room: room.id.clone(),
                            penalty,
                            soft_score: conflicts.soft_score,
                        });
                    }
                }

                for room in &undersized {
                    eval.rejections.push(Rejection {
                        slot: slot.clone(),
                        half,
                        room: room.id.clone(),
                        reason: RejectionReason::CapacityShortfall {
                            capacity: room.capacity,
                            required: course.estimated_students,
                        },
                    });
                }
            }
        }
        eval
    }

    /// Rooms the course may use, in visiting order, and the rooms best-fit
    /// rejects for lack of seats.
    pub fn room_order<'r>(&self, course: &Course, rooms: &'r [Room]) -> (Vec<&'r Room>, Vec<&'r Room>) {
        let mut allowed: Vec<&Room> = rooms.iter().filter(|r| course.allows_room(&r.id)).collect();
        match self.selection {
            RoomSelection::FirstFit => {
                allowed.sort_by(|a, b| b.capacity.cmp(&a.capacity));
                (allowed, Vec::new())
            }
            RoomSelection::BestFit => {
                allowed.sort_by_key(|r| r.capacity);
                allowed
                    .into_iter()
                    .partition(|r| r.fits(course.estimated_students))
            }
        }
    }
}

/// Slots by ascending day load; ties keep catalog order.
fn slot_order<'s>(slots: &'s [TimeSlot], tracker: &OccupancyTracker) -> Vec<&'s TimeSlot> {
    let mut ordered: Vec<&TimeSlot> = slots.iter().collect();
    ordered.sort_by_key(|s| tracker.day_load(&s.day));
    ordered
}

/// σ of the day loads after one more booking on `day`.
fn day_deviation(tracker: &OccupancyTracker, day: &str) -> f64 {
    let loads: Vec<f64> = tracker
        .day_loads()
        .iter()
        .map(|(d, &n)| f64::from(n) + if d == day { 1.0 } else { 0.0 })
        .collect();
    population_std_dev(&loads)
}

/// σ of `[H1, H2]` after booking `half`; 0 for long bookings.
fn half_deviation(load: [u32; 2], half: Half) -> f64 {
    let [h1, h2] = load.map(f64::from);
    match half {
        Half::H1 => population_std_dev(&[h1 + 1.0, h2]),
        Half::H2 => population_std_dev(&[h1, h2 + 1.0]),
        Half::Long => 0.0,
    }
}

/// Population standard deviation; 0 for an empty sample.
pub(crate) fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::SubstringDenylist;

    fn slots() -> Vec<TimeSlot> {
        vec![
            TimeSlot::new("Mon", "AM"),
            TimeSlot::new("Mon", "PM"),
            TimeSlot::new("Tue", "AM"),
        ]
    }

    fn rooms() -> Vec<Room> {
        vec![Room::new("S", 30), Room::new("L", 120), Room::new("M", 60)]
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(population_std_dev(&[]), 0.0);
        assert!((population_std_dev(&[2.0, 2.0]) - 0.0).abs() < 1e-10);
        assert!((population_std_dev(&[1.0, 0.0]) - 0.5).abs() < 1e-10);
        assert!((population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_half_deviation_long_is_zero() {
        assert_eq!(half_deviation([0, 0], Half::Long), 0.0);
        assert_eq!(half_deviation([3, 0], Half::Long), 0.0);
        assert!((half_deviation([0, 0], Half::H1) - 0.5).abs() < 1e-10);
        assert!((half_deviation([1, 0], Half::H2)).abs() < 1e-10);
    }

    #[test]
    fn test_room_order_first_fit() {
        let d = SubstringDenylist::default();
        let scorer = CandidateScorer::new(&EngineConfig::default(), ConflictClassifier::new(&d));
        let r = rooms();
        let (order, undersized) = scorer.room_order(&Course::short("A").with_students(500), &r);
        let ids: Vec<&str> = order.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["L", "M", "S"]);
        assert!(undersized.is_empty());
    }

    #[test]
    fn test_room_order_best_fit() {
        let d = SubstringDenylist::default();
        let config = EngineConfig::default().with_room_selection(RoomSelection::BestFit);
        let scorer = CandidateScorer::new(&config, ConflictClassifier::new(&d));
        let r = rooms();
        let (order, undersized) = scorer.room_order(&Course::short("A").with_students(45), &r);
        let ids: Vec<&str> = order.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["M", "L"]);
        assert_eq!(undersized[0].id, "S");
    }

    #[test]
    fn test_room_candidates_restrict_order() {
        let d = SubstringDenylist::default();
        let scorer = CandidateScorer::new(&EngineConfig::default(), ConflictClassifier::new(&d));
        let r = rooms();
        let course = Course::short("A").with_room_candidates(vec!["S".into(), "M".into()]);
        let (order, _) = scorer.room_order(&course, &r);
        let ids: Vec<&str> = order.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["M", "S"]);
    }

    #[test]
    fn test_empty_tracker_picks_first_candidate() {
        let d = SubstringDenylist::default();
        let scorer = CandidateScorer::new(&EngineConfig::default(), ConflictClassifier::new(&d));
        let (c, r, s) = (vec![Course::short("A")], rooms(), slots());
        let catalog = Catalog::new(&c, &r, &s);
        let t = OccupancyTracker::new(&s);

        let eval = scorer.evaluate(&c[0], &catalog, &t, ConflictMode::Block);
        let best = eval.best.unwrap();
        assert_eq!(best.slot, s[0]);
        assert_eq!(best.half, Half::H1);
        assert_eq!(best.room, "L");
        assert!(eval.rejections.is_empty());
    }

    #[test]
    fn test_prefers_lighter_day() {
        let d = SubstringDenylist::default();
        let scorer = CandidateScorer::new(&EngineConfig::default(), ConflictClassifier::new(&d));
        let (c, r, s) = (
            vec![Course::short("A"), Course::short("B")],
            rooms(),
            slots(),
        );
        let catalog = Catalog::new(&c, &r, &s);
        let mut t = OccupancyTracker::new(&s);
        t.reserve(&c[0], &s[0], Half::H1, "L").unwrap();

        let best = scorer
            .evaluate(&c[1], &catalog, &t, ConflictMode::Block)
            .best
            .unwrap();
        assert_eq!(best.slot.day, "Tue");
    }

    #[test]
    fn test_long_course_ignores_half_imbalance() {
        let d = SubstringDenylist::default();
        let scorer = CandidateScorer::new(&EngineConfig::default(), ConflictClassifier::new(&d));
        let c = vec![Course::short("S"), Course::long("L")];
        let r = vec![Room::new("R1", 50), Room::new("R2", 50)];
        let s = vec![TimeSlot::new("Mon", "AM"), TimeSlot::new("Mon", "PM")];
        let catalog = Catalog::new(&c, &r, &s);
        let mut t = OccupancyTracker::new(&s);
        t.reserve(&c[0], &s[0], Half::H1, "R1").unwrap();

        let eval = scorer.evaluate(&c[1], &catalog, &t, ConflictMode::Block);
        let best = eval.best.unwrap();
        // Mon_AM/R2 and Mon_PM/R1 both score 0; the first one visited wins
        assert_eq!(best.slot, s[0]);
        assert_eq!(best.room, "R2");
        assert_eq!(best.penalty, 0.0);
        assert_eq!(eval.rejections.len(), 1);
    }

    #[test]
    fn test_weights_change_best_candidate() {
        let d = SubstringDenylist::default();
        let c = vec![
            Course::short("Y").with_regular_group("G"),
            Course::short("Z"),
            Course::short("W"),
            Course::long("X").with_regular_group("G"),
        ];
        let r = vec![Room::new("R1", 50), Room::new("R2", 50)];
        let s = vec![TimeSlot::new("Mon", "AM"), TimeSlot::new("Tue", "AM")];
        let catalog = Catalog::new(&c, &r, &s);
        let mut t = OccupancyTracker::new(&s);
        t.reserve(&c[0], &s[0], Half::H1, "R1").unwrap();
        t.reserve(&c[1], &s[1], Half::H1, "R1").unwrap();
        t.reserve(&c[2], &s[1], Half::H2, "R1").unwrap();

        // Mon: shares G with Y, days even. Tue: no conflict, days 1 vs 3.
        let default = CandidateScorer::new(&EngineConfig::default(), ConflictClassifier::new(&d));
        let best = default
            .evaluate(&c[3], &catalog, &t, ConflictMode::Block)
            .best
            .unwrap();
        assert_eq!(best.slot, s[1]);
        assert!((best.penalty - 1.0).abs() < 1e-10);

        let config = EngineConfig::default().with_weights(ScoringWeights {
            day_balance: 5.0,
            ..ScoringWeights::default()
        });
        let balanced = CandidateScorer::new(&config, ConflictClassifier::new(&d));
        let best = balanced
            .evaluate(&c[3], &catalog, &t, ConflictMode::Block)
            .best
            .unwrap();
        assert_eq!(best.slot, s[0]);
        assert_eq!(best.room, "R2");
        assert!((best.soft_score - 1.0).abs() < 1e-10);
        assert!((best.penalty - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_block_and_ignore_modes() {
        let d = SubstringDenylist::default();
        let scorer = CandidateScorer::new(&EngineConfig::default(), ConflictClassifier::new(&d));
        let c = vec![
            Course::long("X").with_mandatory_group("G"),
            Course::short("Y").with_mandatory_group("G"),
        ];
        let r = vec![Room::new("101", 50), Room::new("102", 50)];
        let s = vec![TimeSlot::new("Mon", "AM")];
        let catalog = Catalog::new(&c, &r, &s);
        let mut t = OccupancyTracker::new(&s);
        t.reserve(&c[0], &s[0], Half::Long, "101").unwrap();

        let blocked = scorer.evaluate(&c[1], &catalog, &t, ConflictMode::Block);
        assert!(blocked.best.is_none());
        // 2 halves × 2 rooms
        assert_eq!(blocked.rejections.len(), 4);
        assert!(blocked.rejections.iter().any(|r| matches!(
            &r.reason,
            RejectionReason::HardConflict { blockers, .. } if blockers == &vec!["X".to_string()]
        )));

        let forced = scorer.evaluate(&c[1], &catalog, &t, ConflictMode::Ignore);
        let best = forced.best.unwrap();
        assert_eq!(best.room, "102");
        assert!((best.soft_score - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_best_fit_records_shortfall() {
        let d = SubstringDenylist::default();
        let config = EngineConfig::default().with_room_selection(RoomSelection::BestFit);
        let scorer = CandidateScorer::new(&config, ConflictClassifier::new(&d));
        let c = vec![Course::long("BIG").with_students(200)];
        let r = rooms();
        let s = vec![TimeSlot::new("Mon", "AM")];
        let catalog = Catalog::new(&c, &r, &s);
        let t = OccupancyTracker::new(&s);

        let eval = scorer.evaluate(&c[0], &catalog, &t, ConflictMode::Ignore);
        assert!(eval.best.is_none());
        assert_eq!(eval.rejections.len(), 3);
        assert!(eval.rejections.iter().all(|r| matches!(
            r.reason,
            RejectionReason::CapacityShortfall { required: 200, .. }
        )));
    }
}
