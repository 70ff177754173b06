//! Engine configuration.
//!
//! Every knob of the allocation heuristic lives here so a deployment can
//! tune it without code changes, either through the `with_*` builders or
//! from a TOML document:
//!
//! ```
//! use u_timetable::config::{EngineConfig, RoomSelection};
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     room_selection = "best_fit"
//!     excluded_group_markers = ["TU"]
//!
//!     [weights]
//!     soft_conflict = 5.0
//! "#).unwrap();
//!
//! assert_eq!(config.room_selection, RoomSelection::BestFit);
//! assert_eq!(config.weights.soft_conflict, 5.0);
//! assert_eq!(config.weights.day_balance, 1.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Weights of the candidate penalty.
///
/// `penalty = soft_conflict·softScore + day_balance·σ(dayLoad) + half_balance·σ(halfLoad[slot])`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Weight of the soft-conflict fraction (α).
    pub soft_conflict: f64,
    /// Weight of the day-load standard deviation (β).
    pub day_balance: f64,
    /// Weight of the half-load standard deviation within the slot (γ).
    pub half_balance: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            soft_conflict: 3.0,
            day_balance: 1.0,
            half_balance: 0.3,
        }
    }
}

/// Room iteration policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomSelection {
    /// Largest room first. Capacity never excludes a room; overload is
    /// only reported by the KPIs.
    #[default]
    FirstFit,
    /// Smallest sufficient room first. Rooms below the estimated
    /// enrollment are rejected.
    BestFit,
}

/// Course ordering before allocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityOrder {
    /// Mandatory groups, then distinct groups, then enrollment (all descending).
    #[default]
    MandatoryFirst,
    /// Enrollment, then mandatory groups, then distinct groups (all descending).
    EnrollmentFirst,
}

/// Configuration of an [`AssignmentEngine`](crate::scheduler::AssignmentEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Penalty weights.
    pub weights: ScoringWeights,
    /// Room iteration policy.
    pub room_selection: RoomSelection,
    /// Course ordering.
    pub priority: PriorityOrder,
    /// Case-insensitive substrings marking administrative groups whose
    /// mandatory conflicts are ignored.
    pub excluded_group_markers: Vec<String>,
    /// Whether to run the soft-conflict rebalancing pass.
    pub rebalance: bool,
    /// How many times one course may be evicted before it stops being an
    /// eviction target.
    pub max_evictions_per_course: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            room_selection: RoomSelection::FirstFit,
            priority: PriorityOrder::MandatoryFirst,
            excluded_group_markers: Vec::new(),
            rebalance: true,
            max_evictions_per_course: 3,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Sets the penalty weights.
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the room iteration policy.
    pub fn with_room_selection(mut self, room_selection: RoomSelection) -> Self {
        self.room_selection = room_selection;
        self
    }

    /// Sets the course ordering.
    pub fn with_priority(mut self, priority: PriorityOrder) -> Self {
        self.priority = priority;
        self
    }

    /// Adds an administrative group marker.
    pub fn with_excluded_marker(mut self, marker: impl Into<String>) -> Self {
        self.excluded_group_markers.push(marker.into());
        self
    }

    /// Enables or disables the rebalancing pass.
    pub fn with_rebalance(mut self, rebalance: bool) -> Self {
        self.rebalance = rebalance;
        self
    }

    /// Sets the per-course eviction cap.
    pub fn with_max_evictions(mut self, max_evictions_per_course: u32) -> Self {
        self.max_evictions_per_course = max_evictions_per_course;
        self
    }
}
