//! Greedy clustering of candidate components
//!
//! The first unprocessed candidate becomes a seed; every other unprocessed
//! candidate whose connectivity to the seed reaches the threshold joins its
//! cluster. This repeats until every candidate has been processed. Clusters
//! smaller than the minimum size are discarded.

use tracing::trace;

use crate::component::Component;
use crate::connectivity::connectivity;

/// Partition `candidates` into clusters of related components
///
/// Candidates are processed in the given order, which makes the result
/// deterministic. Each returned cluster lists the seed first, followed by the
/// members in candidate order.
pub fn cluster_by_connectivity(
    candidates: &[&Component],
    connectivity_threshold: f64,
    min_members: usize,
) -> Vec<Vec<String>> {
    let mut clusters = Vec::new();
    let mut unprocessed: Vec<&Component> = candidates.to_vec();

    while !unprocessed.is_empty() {
        let seed = unprocessed.remove(0);

        let (joined, rest): (Vec<&Component>, Vec<&Component>) = unprocessed
            .into_iter()
            .partition(|candidate| connectivity(seed, candidate) >= connectivity_threshold);
        unprocessed = rest;

        let mut cluster = Vec::with_capacity(joined.len() + 1);
        cluster.push(seed.id.clone());
        cluster.extend(joined.iter().map(|c| c.id.clone()));

        if cluster.len() >= min_members {
            clusters.push(cluster);
        } else {
            trace!(seed = %seed.name, size = cluster.len(), "discarding undersized cluster");
        }
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components(n: usize) -> Vec<Component> {
        (0..n)
            .map(|i| Component::new(format!("c{}", i), String::new(), "core".to_string()))
            .collect()
    }

    fn link(nodes: &mut [Component], from: usize, to: usize) {
        let from_id = nodes[from].id.clone();
        let to_id = nodes[to].id.clone();
        nodes[from].add_dependency(&to_id);
        nodes[to].add_dependent(&from_id);
    }

    #[test]
    fn test_empty_input() {
        assert!(cluster_by_connectivity(&[], 0.6, 2).is_empty());
    }

    #[test]
    fn test_unconnected_candidates_form_no_cluster() {
        let nodes = components(2);
        let refs: Vec<&Component> = nodes.iter().collect();
        assert!(cluster_by_connectivity(&refs, 0.6, 2).is_empty());
    }

    #[test]
    fn test_connected_pair_clusters_together() {
        let mut nodes = components(2);
        link(&mut nodes, 0, 1);
        let refs: Vec<&Component> = nodes.iter().collect();

        // A single edge scores 0.5
        assert!(cluster_by_connectivity(&refs, 0.6, 2).is_empty());
        let clusters = cluster_by_connectivity(&refs, 0.5, 2);
        assert_eq!(clusters, vec![vec![nodes[0].id.clone(), nodes[1].id.clone()]]);
    }

    #[test]
    fn test_two_separate_groups() {
        let mut nodes = components(4);
        // Mutual edges within {0, 1} and within {2, 3}
        link(&mut nodes, 0, 1);
        link(&mut nodes, 1, 0);
        link(&mut nodes, 2, 3);
        link(&mut nodes, 3, 2);
        let refs: Vec<&Component> = nodes.iter().collect();

        let clusters = cluster_by_connectivity(&refs, 0.5, 2);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0], vec![nodes[0].id.clone(), nodes[1].id.clone()]);
        assert_eq!(clusters[1], vec![nodes[2].id.clone(), nodes[3].id.clone()]);
    }

    #[test]
    fn test_members_only_need_connection_to_seed() {
        let mut nodes = components(3);
        // Star around node 0: 1 and 2 are only related through the seed
        link(&mut nodes, 0, 1);
        link(&mut nodes, 2, 0);
        let refs: Vec<&Component> = nodes.iter().collect();

        let clusters = cluster_by_connectivity(&refs, 0.5, 2);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
        assert_eq!(clusters[0][0], nodes[0].id);
    }

    #[test]
    fn test_min_members_respected() {
        let mut nodes = components(3);
        link(&mut nodes, 0, 1);
        let refs: Vec<&Component> = nodes.iter().collect();

        assert_eq!(cluster_by_connectivity(&refs, 0.5, 2).len(), 1);
        assert!(cluster_by_connectivity(&refs, 0.5, 3).is_empty());
        // With min_members = 1 the leftover singleton survives too
        assert_eq!(cluster_by_connectivity(&refs, 0.5, 1).len(), 2);
    }
}
