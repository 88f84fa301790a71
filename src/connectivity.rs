//! Connectivity between two components
//!
//! Connectivity is a 0.0 - 1.0 relatedness score derived from the dependency
//! graph:
//!
//! ```text
//! direct   = 0.5 if any edge links a and b, else 0.0
//! shared   = (|deps(a) ∩ deps(b)| + |dependents(a) ∩ dependents(b)|)
//!            / max(degree(a), degree(b), 1)
//! CONNECTIVITY = min(1.0, direct + shared * 0.5)
//! ```

use crate::component::Component;

/// Weight of a direct edge between the two components
pub const DIRECT_EDGE_WEIGHT: f64 = 0.5;

/// Weight applied to the shared-neighbour ratio
pub const SHARED_NEIGHBOR_WEIGHT: f64 = 0.5;

/// Compute the connectivity score between two components
///
/// Pure and symmetric: `connectivity(a, b) == connectivity(b, a)`.
pub fn connectivity(a: &Component, b: &Component) -> f64 {
    let direct = if a.is_linked_to(&b.id) || b.is_linked_to(&a.id) {
        DIRECT_EDGE_WEIGHT
    } else {
        0.0
    };

    let shared_deps = a.dependencies.intersection(&b.dependencies).count();
    let shared_dependents = a.dependents.intersection(&b.dependents).count();
    let denominator = a.degree().max(b.degree()).max(1);
    let shared = (shared_deps + shared_dependents) as f64 / denominator as f64;

    (direct + shared * SHARED_NEIGHBOR_WEIGHT).min(1.0)
}
