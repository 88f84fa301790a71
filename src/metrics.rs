//! Aggregate metrics for a group of components
//!
//! Used twice during formation: once to check a candidate cluster against the
//! formation criteria, and again as the recorded metrics of the module it
//! becomes.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::component::Component;

/// Aggregated metrics for a cluster or module
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ModuleMetrics {
    /// Number of members found in the registry
    pub member_count: usize,
    /// Mean maturity score of the members
    pub average_maturity: f64,
    /// Mean cohesion score of the members
    pub average_cohesion: f64,
    /// Dependency edges whose target is also a member
    pub internal_edges: usize,
    /// Dependency edges whose target is outside the member set
    pub external_edges: usize,
    /// `internal / (internal + external)`, 1.0 when there are no edges
    pub encapsulation_ratio: f64,
}

impl ModuleMetrics {
    /// Calculate metrics for the given member ids
    ///
    /// Ids that are not present in `components` are ignored.
    pub fn calculate(members: &[String], components: &HashMap<String, Component>) -> Self {
        let member_set: HashSet<&str> = members.iter().map(String::as_str).collect();

        let mut metrics = ModuleMetrics::default();
        let mut total_maturity = 0.0;
        let mut total_cohesion = 0.0;

        for component in members.iter().filter_map(|id| components.get(id)) {
            metrics.member_count += 1;
            total_maturity += component.maturity_score;
            total_cohesion += component.cohesion_score;

            for dependency in &component.dependencies {
                if member_set.contains(dependency.as_str()) {
                    metrics.internal_edges += 1;
                } else {
                    metrics.external_edges += 1;
                }
            }
        }

        if metrics.member_count > 0 {
            metrics.average_maturity = total_maturity / metrics.member_count as f64;
            metrics.average_cohesion = total_cohesion / metrics.member_count as f64;
        }
        metrics.encapsulation_ratio =
            encapsulation_ratio(metrics.internal_edges, metrics.external_edges);

        metrics
    }
}

/// Fraction of edges that stay inside the module
pub fn encapsulation_ratio(internal_edges: usize, external_edges: usize) -> f64 {
    let total = internal_edges + external_edges;
    if total == 0 {
        1.0
    } else {
        internal_edges as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_of(n: usize) -> (Vec<String>, HashMap<String, Component>) {
        let mut ids = Vec::new();
        let mut components = HashMap::new();
        for i in 0..n {
            let c = Component::new(format!("c{}", i), String::new(), "core".to_string());
            ids.push(c.id.clone());
            components.insert(c.id.clone(), c);
        }
        (ids, components)
    }

    fn link(components: &mut HashMap<String, Component>, from: &str, to: &str) {
        if let Some(c) = components.get_mut(from) {
            c.add_dependency(to);
        }
        if let Some(c) = components.get_mut(to) {
            c.add_dependent(from);
        }
    }

    #[test]
    fn test_encapsulation_ratio() {
        assert_eq!(encapsulation_ratio(0, 0), 1.0);
        assert_eq!(encapsulation_ratio(3, 0), 1.0);
        assert_eq!(encapsulation_ratio(0, 2), 0.0);
        assert_eq!(encapsulation_ratio(3, 1), 0.75);
    }

    #[test]
    fn test_averages() {
        let (ids, mut components) = registry_of(2);
        components.get_mut(&ids[0]).unwrap().cohesion_score = 0.6;
        components.get_mut(&ids[1]).unwrap().cohesion_score = 1.0;
        components.get_mut(&ids[0]).unwrap().maturity_score = 0.8;
        components.get_mut(&ids[1]).unwrap().maturity_score = 1.0;

        let metrics = ModuleMetrics::calculate(&ids, &components);
        assert_eq!(metrics.member_count, 2);
        assert!((metrics.average_cohesion - 0.8).abs() < 1e-12);
        assert!((metrics.average_maturity - 0.9).abs() < 1e-12);
        assert_eq!(metrics.encapsulation_ratio, 1.0);
    }

    #[test]
    fn test_internal_and_external_edges() {
        let (ids, mut components) = registry_of(3);
        link(&mut components, &ids[0], &ids[1]);
        link(&mut components, &ids[1], &ids[0]);
        link(&mut components, &ids[1], &ids[2]);

        // Module holds 0 and 1; 2 stays outside
        let members = vec![ids[0].clone(), ids[1].clone()];
        let metrics = ModuleMetrics::calculate(&members, &components);
        assert_eq!(metrics.internal_edges, 2);
        assert_eq!(metrics.external_edges, 1);
        assert!((metrics.encapsulation_ratio - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_incoming_external_edges_not_counted() {
        let (ids, mut components) = registry_of(3);
        link(&mut components, &ids[2], &ids[0]);

        let members = vec![ids[0].clone(), ids[1].clone()];
        let metrics = ModuleMetrics::calculate(&members, &components);
        assert_eq!(metrics.external_edges, 0);
        assert_eq!(metrics.encapsulation_ratio, 1.0);
    }

    #[test]
    fn test_unknown_ids_ignored() {
        let (ids, components) = registry_of(1);
        let members = vec![ids[0].clone(), "missing".to_string()];
        let metrics = ModuleMetrics::calculate(&members, &components);
        assert_eq!(metrics.member_count, 1);
    }

    #[test]
    fn test_empty_members() {
        let metrics = ModuleMetrics::calculate(&[], &HashMap::new());
        assert_eq!(metrics.member_count, 0);
        assert_eq!(metrics.average_cohesion, 0.0);
        assert_eq!(metrics.encapsulation_ratio, 1.0);
    }
}
