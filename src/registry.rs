//! Component registry
//!
//! The registry is the sole owner of every component and module record.
//! Callers only ever hold ids. It also maintains the category index that
//! formation evaluation walks, and the component → module membership map.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::component::{Component, ComponentStatus};
use crate::config::{FormationCriteria, ModulizerConfig};
use crate::formation::{Module, ModuleSummary};

/// Category used when the caller does not supply one
pub const DEFAULT_CATEGORY: &str = "utility";

/// Errors returned by registry operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A required field was empty or missing
    #[error("{0}")]
    Validation(String),

    /// The referenced component id is not registered
    #[error("Component not found: {0}")]
    NotFound(String),
}

/// Outcome of a status update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    /// Status after the update, which may differ from the requested one
    pub status: ComponentStatus,
    pub maturity_score: f64,
    /// Whether formation evaluation ran as a consequence of this update
    pub triggered_evaluation: bool,
    /// Number of modules formed by that evaluation
    pub modules_formed: usize,
}

/// Aggregate counters describing the formation process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormationInsights {
    pub total_components: usize,
    /// Components with status Mature or Stable
    pub mature_components: usize,
    pub total_modules: usize,
    pub components_per_module_avg: f64,
    pub module_formation_rate: f64,
    pub categories_identified: Vec<String>,
}

/// In-memory registry of components and the modules formed from them
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub(crate) criteria: FormationCriteria,
    pub(crate) allow_regrouping: bool,
    pub(crate) components: HashMap<String, Component>,
    /// Category → component ids in registration order
    pub(crate) categories: BTreeMap<String, Vec<String>>,
    /// Modules in creation order
    pub(crate) modules: Vec<Module>,
    /// Component id → id of the module it was last grouped into
    pub(crate) membership: HashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry using custom formation criteria
    pub fn with_criteria(criteria: FormationCriteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    /// Create a registry from a loaded configuration
    pub fn from_config(config: &ModulizerConfig) -> Self {
        let mut registry = Self::with_criteria(config.criteria);
        registry.allow_regrouping = config.formation.allow_regrouping;
        registry
    }

    /// Allow components already grouped into a module to be clustered again
    pub fn set_allow_regrouping(&mut self, allow: bool) {
        self.allow_regrouping = allow;
    }

    pub fn allow_regrouping(&self) -> bool {
        self.allow_regrouping
    }

    pub fn criteria(&self) -> &FormationCriteria {
        &self.criteria
    }

    /// Register a new component and return its id
    ///
    /// A blank `category` falls back to [`DEFAULT_CATEGORY`].
    pub fn register_component(
        &mut self,
        name: &str,
        description: &str,
        category: &str,
    ) -> Result<String, RegistryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::Validation(
                "Component name is required for registration".to_string(),
            ));
        }

        let category = match category.trim() {
            "" => DEFAULT_CATEGORY,
            category => category,
        };

        let component = Component::new(
            name.to_string(),
            description.to_string(),
            category.to_string(),
        );
        let id = component.id.clone();

        self.categories
            .entry(component.category.clone())
            .or_default()
            .push(id.clone());
        self.components.insert(id.clone(), component);

        debug!(component_id = %id, name, category, "registered component");
        Ok(id)
    }

    /// Set a component's status and optionally boost its maturity
    ///
    /// The requested status is applied first. A positive `maturity_boost` then
    /// raises the score and, when the score crosses a threshold, replaces the
    /// status with the score-derived one. If the resulting status is Mature
    /// or Stable, formation evaluation runs immediately.
    pub fn update_component_status(
        &mut self,
        component_id: &str,
        status: ComponentStatus,
        maturity_boost: f64,
    ) -> Result<StatusUpdate, RegistryError> {
        let component = self
            .components
            .get_mut(component_id)
            .ok_or_else(|| RegistryError::NotFound(component_id.to_string()))?;

        component.status = status;
        if maturity_boost > 0.0 {
            component.boost_maturity(maturity_boost);
        }

        let resulting = component.status;
        let maturity_score = component.maturity_score;
        if resulting != status {
            debug!(
                component_id,
                requested = %status,
                resulting = %resulting,
                "maturity score overrode requested status"
            );
        }

        let triggered_evaluation = resulting.is_mature();
        let modules_formed = if triggered_evaluation {
            self.evaluate_module_formation().len()
        } else {
            0
        };

        Ok(StatusUpdate {
            status: resulting,
            maturity_score,
            triggered_evaluation,
            modules_formed,
        })
    }

    /// Record that `from_id` depends on `to_id`
    ///
    /// Both ids are checked before either component is touched.
    pub fn add_component_dependency(
        &mut self,
        from_id: &str,
        to_id: &str,
    ) -> Result<(), RegistryError> {
        for id in [from_id, to_id] {
            if !self.components.contains_key(id) {
                return Err(RegistryError::NotFound(id.to_string()));
            }
        }

        if let Some(from) = self.components.get_mut(from_id) {
            from.add_dependency(to_id);
        }
        if let Some(to) = self.components.get_mut(to_id) {
            to.add_dependent(from_id);
        }

        debug!(from = from_id, to = to_id, "added dependency");
        Ok(())
    }

    /// Set the externally computed cohesion score of a component
    pub fn set_component_cohesion(
        &mut self,
        component_id: &str,
        cohesion_score: f64,
    ) -> Result<f64, RegistryError> {
        let component = self
            .components
            .get_mut(component_id)
            .ok_or_else(|| RegistryError::NotFound(component_id.to_string()))?;

        component.set_cohesion(cohesion_score);
        Ok(component.cohesion_score)
    }

    /// Look up a component by id
    pub fn component(&self, component_id: &str) -> Option<&Component> {
        self.components.get(component_id)
    }

    /// Iterate over all components (unordered)
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Component ids of a category, in registration order
    pub fn category_members(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Known categories, sorted
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// All formed modules, in creation order
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module(&self, module_id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    /// The module a component was most recently grouped into
    pub fn module_of(&self, component_id: &str) -> Option<&Module> {
        self.membership
            .get(component_id)
            .and_then(|module_id| self.module(module_id))
    }

    /// Snapshot of every formed module
    pub fn get_ready_modules(&self) -> Vec<ModuleSummary> {
        self.modules.iter().map(ModuleSummary::from).collect()
    }

    /// Aggregate counters computed on demand
    pub fn get_formulation_insights(&self) -> FormationInsights {
        let total_components = self.components.len();
        let mature_components = self
            .components
            .values()
            .filter(|c| c.status.is_mature())
            .count();
        let total_modules = self.modules.len();

        let components_per_module_avg = if total_modules > 0 {
            total_components as f64 / total_modules as f64
        } else {
            0.0
        };
        let module_formation_rate = if total_components > 0 {
            total_modules as f64 / total_components as f64
        } else {
            0.0
        };

        FormationInsights {
            total_components,
            mature_components,
            total_modules,
            components_per_module_avg,
            module_formation_rate,
            categories_identified: self.categories.keys().cloned().collect(),
        }
    }

    pub(crate) fn record_module(&mut self, module: Module) {
        for member in &module.members {
            self.membership.insert(member.clone(), module.id.clone());
        }
        info!(
            module = %module.name,
            members = module.members.len(),
            encapsulation = module.metrics.encapsulation_ratio,
            "formed module"
        );
        self.modules.push(module);
    }
}

/// A registry shared between concurrent callers
///
/// Every operation, mutating or not, runs under a single lock, so clustering
/// never observes a half-applied update and queries never see a torn state.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the registry
    pub fn with<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Copy of the registry taken under the lock
    pub fn snapshot(&self) -> Registry {
        self.lock().clone()
    }
}
