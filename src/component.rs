//! Component data structures
//!
//! A component is the finest-grained unit the engine tracks: a task, a
//! function, a service. Components accumulate maturity and dependency edges
//! until a group of related ones is mature enough to become a module.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a component (or of a formed module)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    /// Newly identified
    #[default]
    Proposed,
    /// Work in progress
    InProgress,
    /// Under testing
    Testing,
    /// Ready to be considered for grouping
    Mature,
    /// Stable, or absorbed into a module
    Stable,
}

impl ComponentStatus {
    /// All statuses in lifecycle order
    pub const ALL: [ComponentStatus; 5] = [
        ComponentStatus::Proposed,
        ComponentStatus::InProgress,
        ComponentStatus::Testing,
        ComponentStatus::Mature,
        ComponentStatus::Stable,
    ];

    /// Status implied by a maturity score, if the score crosses a threshold
    ///
    /// - `>= 0.9` → Stable
    /// - `>= 0.8` → Mature
    /// - `>= 0.5` → Testing
    pub fn from_maturity(score: f64) -> Option<Self> {
        if score >= 0.9 {
            Some(ComponentStatus::Stable)
        } else if score >= 0.8 {
            Some(ComponentStatus::Mature)
        } else if score >= 0.5 {
            Some(ComponentStatus::Testing)
        } else {
            None
        }
    }

    /// Whether this status makes a component eligible for grouping
    pub fn is_mature(&self) -> bool {
        matches!(self, ComponentStatus::Mature | ComponentStatus::Stable)
    }

    /// Wire name (`"in_progress"`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Proposed => "proposed",
            ComponentStatus::InProgress => "in_progress",
            ComponentStatus::Testing => "testing",
            ComponentStatus::Mature => "mature",
            ComponentStatus::Stable => "stable",
        }
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentStatus::Proposed => write!(f, "Proposed"),
            ComponentStatus::InProgress => write!(f, "In Progress"),
            ComponentStatus::Testing => write!(f, "Testing"),
            ComponentStatus::Mature => write!(f, "Mature"),
            ComponentStatus::Stable => write!(f, "Stable"),
        }
    }
}

/// Error returned when a status string is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown component status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for ComponentStatus {
    type Err = ParseStatusError;

    /// Case-insensitive; accepts `in_progress`, `in-progress` and `inprogress`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "proposed" => Ok(ComponentStatus::Proposed),
            "inprogress" => Ok(ComponentStatus::InProgress),
            "testing" => Ok(ComponentStatus::Testing),
            "mature" => Ok(ComponentStatus::Mature),
            "stable" => Ok(ComponentStatus::Stable),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// A tracked unit with maturity and dependency edges
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// Opaque unique identifier
    pub id: String,
    pub name: String,
    pub description: String,
    /// Grouping key used by clustering
    pub category: String,
    pub status: ComponentStatus,
    /// Always within 0.0..=1.0
    pub maturity_score: f64,
    /// Externally supplied quality score
    pub cohesion_score: f64,
    /// Components this one depends on (outgoing edges)
    pub dependencies: BTreeSet<String>,
    /// Components depending on this one (incoming edges)
    pub dependents: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Component {
    /// Create a new `Proposed` component with a fresh id
    pub fn new(name: String, description: String, category: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            category,
            status: ComponentStatus::Proposed,
            maturity_score: 0.0,
            cohesion_score: 0.0,
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            created_at: now,
            last_activity_at: now,
        }
    }

    /// Record an outgoing edge
    pub fn add_dependency(&mut self, component_id: &str) {
        self.dependencies.insert(component_id.to_string());
    }

    /// Record an incoming edge
    pub fn add_dependent(&mut self, component_id: &str) {
        self.dependents.insert(component_id.to_string());
    }

    /// Whether any edge links this component to `other_id`, in either direction
    pub fn is_linked_to(&self, other_id: &str) -> bool {
        self.dependencies.contains(other_id) || self.dependents.contains(other_id)
    }

    /// Total number of edges touching this component
    pub fn degree(&self) -> usize {
        self.dependencies.len() + self.dependents.len()
    }

    /// Add to the maturity score and re-derive the status from it
    ///
    /// The score is clamped to 1.0 and never decreases. When the new score
    /// crosses a threshold the derived status replaces the current one.
    pub fn boost_maturity(&mut self, amount: f64) {
        self.last_activity_at = Utc::now();
        if amount > 0.0 {
            self.maturity_score = (self.maturity_score + amount).clamp(0.0, 1.0);
        }

        if let Some(status) = ComponentStatus::from_maturity(self.maturity_score) {
            self.status = status;
        }
    }

    /// Set the externally computed cohesion score, clamped to 0.0..=1.0
    pub fn set_cohesion(&mut self, score: f64) {
        self.last_activity_at = Utc::now();
        self.cohesion_score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str) -> Component {
        Component::new(name.to_string(), String::new(), "utility".to_string())
    }

    #[test]
    fn test_new_component_defaults() {
        let c = component("parser");
        assert_eq!(c.status, ComponentStatus::Proposed);
        assert_eq!(c.maturity_score, 0.0);
        assert_eq!(c.cohesion_score, 0.0);
        assert!(c.dependencies.is_empty());
        assert!(c.dependents.is_empty());
        assert_eq!(c.created_at, c.last_activity_at);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(component("a").id, component("a").id);
    }

    #[test]
    fn test_status_from_maturity() {
        assert_eq!(ComponentStatus::from_maturity(0.0), None);
        assert_eq!(ComponentStatus::from_maturity(0.49), None);
        assert_eq!(
            ComponentStatus::from_maturity(0.5),
            Some(ComponentStatus::Testing)
        );
        assert_eq!(
            ComponentStatus::from_maturity(0.8),
            Some(ComponentStatus::Mature)
        );
        assert_eq!(
            ComponentStatus::from_maturity(0.9),
            Some(ComponentStatus::Stable)
        );
    }

    #[test]
    fn test_boost_clamps_to_one() {
        let mut c = component("a");
        for _ in 0..5 {
            c.boost_maturity(0.4);
            assert!((0.0..=1.0).contains(&c.maturity_score));
        }
        assert_eq!(c.maturity_score, 1.0);
        assert_eq!(c.status, ComponentStatus::Stable);
    }

    #[test]
    fn test_boost_never_decreases() {
        let mut c = component("a");
        c.boost_maturity(0.6);
        c.boost_maturity(-0.5);
        assert_eq!(c.maturity_score, 0.6);
        assert_eq!(c.status, ComponentStatus::Testing);
    }

    #[test]
    fn test_boost_below_threshold_keeps_status() {
        let mut c = component("a");
        c.status = ComponentStatus::InProgress;
        c.boost_maturity(0.2);
        assert_eq!(c.status, ComponentStatus::InProgress);
    }

    #[test]
    fn test_edges_are_sets() {
        let mut c = component("a");
        c.add_dependency("b");
        c.add_dependency("b");
        c.add_dependent("c");
        assert_eq!(c.dependencies.len(), 1);
        assert_eq!(c.degree(), 2);
        assert!(c.is_linked_to("b"));
        assert!(c.is_linked_to("c"));
        assert!(!c.is_linked_to("d"));
    }

    #[test]
    fn test_set_cohesion_clamps() {
        let mut c = component("a");
        c.set_cohesion(1.7);
        assert_eq!(c.cohesion_score, 1.0);
        c.set_cohesion(-0.2);
        assert_eq!(c.cohesion_score, 0.0);
        c.set_cohesion(f64::NAN);
        assert_eq!(c.cohesion_score, 0.0);
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(
            "MATURE".parse::<ComponentStatus>(),
            Ok(ComponentStatus::Mature)
        );
        assert_eq!(
            "in_progress".parse::<ComponentStatus>(),
            Ok(ComponentStatus::InProgress)
        );
        assert_eq!(
            "InProgress".parse::<ComponentStatus>(),
            Ok(ComponentStatus::InProgress)
        );
        assert_eq!(
            " stable ".parse::<ComponentStatus>(),
            Ok(ComponentStatus::Stable)
        );
        assert!("finished".parse::<ComponentStatus>().is_err());
    }

    #[test]
    fn test_status_round_trips_through_wire_name() {
        for status in ComponentStatus::ALL {
            assert_eq!(status.as_str().parse::<ComponentStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_is_mature() {
        assert!(ComponentStatus::Mature.is_mature());
        assert!(ComponentStatus::Stable.is_mature());
        assert!(!ComponentStatus::Testing.is_mature());
        assert!(!ComponentStatus::Proposed.is_mature());
    }
}
