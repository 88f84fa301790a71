//! Graph data structures for the HTTP API
//!
//! Converts the registry into a JSON-serializable node/edge graph: one node
//! per component, one edge per dependency, annotated with module membership.

use serde::Serialize;

use crate::component::ComponentStatus;
use crate::connectivity::connectivity;
use crate::formation::ModuleSummary;
use crate::registry::{FormationInsights, Registry};

/// Complete graph data
#[derive(Debug, Clone, Serialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub modules: Vec<ModuleSummary>,
    pub summary: FormationInsights,
}

/// A node in the dependency graph (one component)
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub category: String,
    pub status: ComponentStatus,
    pub maturity_score: f64,
    pub cohesion_score: f64,
    pub module_id: Option<String>,
    pub dependencies_out: usize,
    pub dependencies_in: usize,
}

/// A dependency edge
#[derive(Debug, Clone, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Connectivity between the two endpoints
    pub connectivity: f64,
    /// Both endpoints belong to the same module
    pub internal: bool,
}

/// Convert the registry into graph data
///
/// Nodes are ordered by category, then registration order, so the output is
/// stable between calls.
pub fn registry_to_graph(registry: &Registry) -> GraphData {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for category in registry.categories() {
        for component in registry
            .category_members(category)
            .iter()
            .filter_map(|id| registry.component(id))
        {
            let module_id = registry.module_of(&component.id).map(|m| m.id.clone());

            for target_id in &component.dependencies {
                let Some(target) = registry.component(target_id) else {
                    continue;
                };
                let internal = module_id.is_some()
                    && registry.module_of(target_id).map(|m| &m.id) == module_id.as_ref();

                edges.push(Edge {
                    id: format!("{}->{}", component.id, target_id),
                    source: component.id.clone(),
                    target: target_id.clone(),
                    connectivity: connectivity(component, target),
                    internal,
                });
            }

            nodes.push(Node {
                id: component.id.clone(),
                label: component.name.clone(),
                category: component.category.clone(),
                status: component.status,
                maturity_score: component.maturity_score,
                cohesion_score: component.cohesion_score,
                module_id,
                dependencies_out: component.dependencies.len(),
                dependencies_in: component.dependents.len(),
            });
        }
    }

    GraphData {
        nodes,
        edges,
        modules: registry.get_ready_modules(),
        summary: registry.get_formulation_insights(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let graph = registry_to_graph(&Registry::new());

        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert!(graph.modules.is_empty());
        assert_eq!(graph.summary.total_modules, 0);
    }

    #[test]
    fn test_nodes_and_edges() {
        let mut registry = Registry::new();
        let a = registry.register_component("a", "", "core").unwrap();
        let b = registry.register_component("b", "", "core").unwrap();
        registry.add_component_dependency(&a, &b).unwrap();

        let graph = registry_to_graph(&registry);
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].label, "a");
        assert_eq!(graph.nodes[0].dependencies_out, 1);
        assert_eq!(graph.nodes[1].dependencies_in, 1);

        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].source, a);
        assert_eq!(graph.edges[0].target, b);
        assert_eq!(graph.edges[0].connectivity, 0.5);
        assert!(!graph.edges[0].internal);
    }
}
