//! Bottom-up module formation
//!
//! Evaluation walks every category, picks the components that are mature
//! enough, clusters them by connectivity, and turns each cluster that meets
//! the formation criteria into a [`Module`]. Evaluation only ever appends
//! modules; existing modules are never rewritten or removed.
//!
//! ## Regrouping
//!
//! Members of a formed module are promoted to Stable, which would make them
//! candidates again on the next evaluation. By default components that already
//! belong to a module are excluded, so repeated evaluation of an unchanged
//! registry forms nothing new. Enabling `allow_regrouping` lifts that
//! exclusion, letting a later evaluation group the same components again.
//!
//! Because every promotion to Mature or Stable evaluates immediately, the
//! result depends on call order under the default policy. If cohesion is
//! already set when the members of a group are promoted one by one, the
//! first pair that qualifies forms a module and leaves the group. Promote
//! the whole group before setting cohesion, or evaluate explicitly at the
//! end, to form it as one module.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex_lite::Regex;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::cluster::cluster_by_connectivity;
use crate::component::{Component, ComponentStatus};
use crate::metrics::ModuleMetrics;
use crate::registry::Registry;

/// Descriptions of at most this many members make up a module description
const DESCRIPTION_MEMBERS: usize = 3;

/// Words dropped from a member name when deriving a module name
const FILLER_WORDS: [&str; 2] = ["function", "component"];

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// A group of related, mature components encapsulated together
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Member component ids, seed first, without duplicates
    pub members: Vec<String>,
    pub status: ComponentStatus,
    pub metrics: ModuleMetrics,
    pub created_at: DateTime<Utc>,
}

impl Module {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn average_cohesion(&self) -> f64 {
        self.metrics.average_cohesion
    }

    pub fn encapsulation_ratio(&self) -> f64 {
        self.metrics.encapsulation_ratio
    }

    pub fn contains(&self, component_id: &str) -> bool {
        self.members.iter().any(|m| m == component_id)
    }
}

/// Read-only view of a module returned by queries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub member_count: usize,
    pub average_cohesion: f64,
    pub encapsulation_ratio: f64,
    pub created_at: DateTime<Utc>,
}

impl From<&Module> for ModuleSummary {
    fn from(module: &Module) -> Self {
        Self {
            id: module.id.clone(),
            name: module.name.clone(),
            description: module.description.clone(),
            member_count: module.member_count(),
            average_cohesion: module.average_cohesion(),
            encapsulation_ratio: module.encapsulation_ratio(),
            created_at: module.created_at,
        }
    }
}

/// Derive a module name from the name of its first member
///
/// Filler words are removed, whitespace runs become underscores, and the
/// result is suffixed with `_Module`.
pub fn base_module_name(component_name: &str) -> String {
    let mut name = component_name.to_string();
    for word in FILLER_WORDS {
        name = name.replace(word, "");
    }

    let name = WHITESPACE.replace_all(name.trim(), "_");
    if name.is_empty() {
        "GenericModule_Module".to_string()
    } else {
        format!("{}_Module", name)
    }
}

impl Registry {
    /// Form modules from every cluster that meets the formation criteria
    ///
    /// Returns the ids of the modules formed by this call. Categories or
    /// clusters that fall short of the criteria are skipped silently.
    pub fn evaluate_module_formation(&mut self) -> Vec<String> {
        let mut formed = Vec::new();

        for cluster in self.candidate_clusters() {
            let metrics = ModuleMetrics::calculate(&cluster, &self.components);
            if !self.meets_criteria(&metrics) {
                debug!(
                    size = metrics.member_count,
                    average_maturity = metrics.average_maturity,
                    average_cohesion = metrics.average_cohesion,
                    "cluster does not meet formation criteria"
                );
                continue;
            }

            let module = self.build_module(cluster, metrics);
            for member in &module.members {
                if let Some(component) = self.components.get_mut(member) {
                    component.status = ComponentStatus::Stable;
                }
            }

            formed.push(module.id.clone());
            self.record_module(module);
        }

        formed
    }

    /// Whether a component may take part in clustering
    fn is_candidate(&self, component: &Component) -> bool {
        component.status.is_mature()
            && component.maturity_score >= self.criteria.maturity_threshold
            && (self.allow_regrouping || !self.membership.contains_key(&component.id))
    }

    /// Cluster the candidates of every category
    fn candidate_clusters(&self) -> Vec<Vec<String>> {
        let mut clusters = Vec::new();

        for (category, ids) in &self.categories {
            let candidates: Vec<&Component> = ids
                .iter()
                .filter_map(|id| self.components.get(id))
                .filter(|c| self.is_candidate(c))
                .collect();

            if candidates.len() < self.criteria.min_members {
                continue;
            }

            let found = cluster_by_connectivity(
                &candidates,
                self.criteria.connectivity_threshold,
                self.criteria.min_members,
            );
            debug!(
                category = %category,
                candidates = candidates.len(),
                clusters = found.len(),
                "clustered category"
            );
            clusters.extend(found);
        }

        clusters
    }

    fn meets_criteria(&self, metrics: &ModuleMetrics) -> bool {
        metrics.average_maturity >= self.criteria.maturity_threshold
            && metrics.average_cohesion >= self.criteria.cohesion_threshold
            && self.criteria.size_in_bounds(metrics.member_count)
    }

    fn build_module(&self, members: Vec<String>, metrics: ModuleMetrics) -> Module {
        let base = members
            .first()
            .and_then(|id| self.components.get(id))
            .map(|c| base_module_name(&c.name))
            .unwrap_or_else(|| format!("Module_{}", &Uuid::new_v4().simple().to_string()[..8]));

        let description = members
            .iter()
            .filter_map(|id| self.components.get(id))
            .map(|c| c.description.trim())
            .filter(|d| !d.is_empty())
            .take(DESCRIPTION_MEMBERS)
            .collect::<Vec<_>>()
            .join(". ");

        Module {
            id: Uuid::new_v4().to_string(),
            name: self.unique_module_name(base),
            description,
            members,
            status: ComponentStatus::Stable,
            metrics,
            created_at: Utc::now(),
        }
    }

    fn unique_module_name(&self, base: String) -> String {
        let taken = |name: &str| self.modules.iter().any(|m| m.name == name);
        if !taken(&base) {
            return base;
        }

        let mut suffix = 2;
        loop {
            let candidate = format!("{}_{}", base, suffix);
            if !taken(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
