//! Request/response surface of the module-formation skill
//!
//! A skill dispatcher hands the engine a named-field request, tagged by its
//! `operation`, and gets back a structured response carrying a `success`
//! flag plus either a payload or an `error` string. No error escapes this
//! boundary: every failure becomes a `success: false` response.
//!
//! ```json
//! {"operation": "register_component", "component_name": "session_manager",
//!  "component_description": "Manages user sessions", "component_category": "security"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::component::{Component, ComponentStatus};
use crate::formation::ModuleSummary;
use crate::registry::{
    DEFAULT_CATEGORY, FormationInsights, Registry, RegistryError, SharedRegistry,
};

/// Name the skill is registered under
pub const SKILL_NAME: &str = "constitutional-module-formation";

/// Operations understood by [`execute`]
pub const SUPPORTED_OPERATIONS: [&str; 9] = [
    "register_component",
    "update_component_status",
    "add_component_dependency",
    "set_component_cohesion",
    "get_component",
    "get_ready_modules",
    "evaluate_module_formation",
    "get_formulation_insights",
    "get_skill_info",
];

/// Errors raised while decoding a request
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Invalid request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request must be a JSON object with an 'operation' field")]
    MissingOperation,

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_status() -> String {
    ComponentStatus::Proposed.as_str().to_string()
}

/// A single operation request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Request {
    RegisterComponent {
        #[serde(default, alias = "name")]
        component_name: String,
        #[serde(default, alias = "description")]
        component_description: String,
        #[serde(default = "default_category", alias = "category")]
        component_category: String,
    },
    UpdateComponentStatus {
        #[serde(default)]
        component_id: String,
        #[serde(default = "default_status")]
        status: String,
        #[serde(default)]
        maturity_boost: f64,
    },
    AddComponentDependency {
        #[serde(default)]
        from_component_id: String,
        #[serde(default)]
        to_component_id: String,
    },
    SetComponentCohesion {
        #[serde(default)]
        component_id: String,
        cohesion_score: f64,
    },
    GetComponent {
        #[serde(default)]
        component_id: String,
    },
    EvaluateModuleFormation,
    GetReadyModules,
    GetFormulationInsights,
    GetSkillInfo,
}

impl Request {
    /// Decode a request from a JSON value
    ///
    /// The operation name is matched case-insensitively.
    pub fn from_value(mut value: Value) -> Result<Self, RequestError> {
        let operation = value
            .get("operation")
            .and_then(Value::as_str)
            .map(|op| op.trim().to_lowercase())
            .ok_or(RequestError::MissingOperation)?;

        if !SUPPORTED_OPERATIONS.contains(&operation.as_str()) {
            return Err(RequestError::UnknownOperation(operation));
        }

        if let Some(object) = value.as_object_mut() {
            object.insert("operation".to_string(), Value::String(operation));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Decode a request from JSON text
    pub fn from_json(text: &str) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Wire name of the operation
    pub fn operation(&self) -> &'static str {
        match self {
            Request::RegisterComponent { .. } => "register_component",
            Request::UpdateComponentStatus { .. } => "update_component_status",
            Request::AddComponentDependency { .. } => "add_component_dependency",
            Request::SetComponentCohesion { .. } => "set_component_cohesion",
            Request::GetComponent { .. } => "get_component",
            Request::EvaluateModuleFormation => "evaluate_module_formation",
            Request::GetReadyModules => "get_ready_modules",
            Request::GetFormulationInsights => "get_formulation_insights",
            Request::GetSkillInfo => "get_skill_info",
        }
    }
}

/// Descriptive information about the skill
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillInfo {
    pub name: String,
    pub description: String,
    pub purpose: String,
    pub operations: Vec<String>,
}

/// Describe the skill and its operations
pub fn skill_info() -> SkillInfo {
    let operations = [
        ("register_component", "Register new component for tracking"),
        ("update_component_status", "Update component maturity status"),
        ("add_component_dependency", "Establish component relationships"),
        ("set_component_cohesion", "Record externally computed cohesion"),
        ("get_component", "Inspect a single component"),
        ("get_ready_modules", "Retrieve formed modules"),
        ("evaluate_module_formation", "Trigger module formation evaluation"),
        ("get_formulation_insights", "Get process metrics"),
        ("get_skill_info", "Describe this skill"),
    ];

    SkillInfo {
        name: SKILL_NAME.to_string(),
        description: "Skill for bottom-up module formation based on mature component aggregation"
            .to_string(),
        purpose: "Gradually encapsulates mature, related components into modules as complexity grows"
            .to_string(),
        operations: operations
            .iter()
            .map(|(op, summary)| format!("{}: {}", op, summary))
            .collect(),
    }
}

/// Operation-specific part of a response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Registered {
        component_id: String,
        message: String,
    },
    StatusUpdated {
        message: String,
        triggered_evaluation: bool,
        status: ComponentStatus,
        maturity_score: f64,
        modules_formed: usize,
    },
    DependencyAdded {
        message: String,
    },
    CohesionUpdated {
        message: String,
        cohesion_score: f64,
    },
    Component {
        component: Component,
        module_id: Option<String>,
    },
    Evaluated {
        message: String,
        modules_formed: usize,
        insights: FormationInsights,
    },
    Modules {
        modules_count: usize,
        modules: Vec<ModuleSummary>,
    },
    Insights {
        insights: FormationInsights,
    },
    SkillInfo(SkillInfo),
    Failure {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        supported_operations: Option<Vec<String>>,
    },
}

/// Response returned for every request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Response {
    pub fn ok(payload: Payload) -> Self {
        Self {
            success: true,
            payload,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: Payload::Failure {
                error: error.into(),
                supported_operations: None,
            },
        }
    }

    /// Error message of a failed response
    pub fn error(&self) -> Option<&str> {
        match &self.payload {
            Payload::Failure { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<RegistryError> for Response {
    fn from(err: RegistryError) -> Self {
        Response::failure(err.to_string())
    }
}

impl From<RequestError> for Response {
    fn from(err: RequestError) -> Self {
        let supported_operations = match &err {
            RequestError::Json(_) => None,
            RequestError::MissingOperation | RequestError::UnknownOperation(_) => Some(
                SUPPORTED_OPERATIONS
                    .iter()
                    .map(|op| op.to_string())
                    .collect(),
            ),
        };

        Response {
            success: false,
            payload: Payload::Failure {
                error: err.to_string(),
                supported_operations,
            },
        }
    }
}

fn require(value: &str, message: &str) -> Result<(), RegistryError> {
    if value.trim().is_empty() {
        Err(RegistryError::Validation(message.to_string()))
    } else {
        Ok(())
    }
}

/// Execute a request against the registry
pub fn execute(registry: &mut Registry, request: Request) -> Response {
    let operation = request.operation();
    debug!(operation, "executing request");

    match dispatch(registry, request) {
        Ok(payload) => Response::ok(payload),
        Err(err) => {
            debug!(operation, error = %err, "request failed");
            Response::from(err)
        }
    }
}

/// Decode and execute a JSON request
pub fn execute_value(registry: &mut Registry, value: Value) -> Response {
    match Request::from_value(value) {
        Ok(request) => execute(registry, request),
        Err(err) => {
            warn!(error = %err, "rejected request");
            Response::from(err)
        }
    }
}

/// Decode and execute a request given as JSON text
pub fn execute_json(registry: &mut Registry, text: &str) -> Response {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => execute_value(registry, value),
        Err(err) => Response::from(RequestError::Json(err)),
    }
}

fn dispatch(registry: &mut Registry, request: Request) -> Result<Payload, RegistryError> {
    match request {
        Request::RegisterComponent {
            component_name,
            component_description,
            component_category,
        } => {
            let component_id = registry.register_component(
                &component_name,
                &component_description,
                &component_category,
            )?;
            Ok(Payload::Registered {
                component_id,
                message: format!(
                    "Component \"{}\" registered and ready for maturity tracking",
                    component_name.trim()
                ),
            })
        }

        Request::UpdateComponentStatus {
            component_id,
            status,
            maturity_boost,
        } => {
            require(&component_id, "Component ID is required to update status")?;
            let requested = status.parse().unwrap_or_else(|err| {
                warn!(error = %err, "falling back to proposed status");
                ComponentStatus::Proposed
            });

            let update =
                registry.update_component_status(&component_id, requested, maturity_boost)?;
            Ok(Payload::StatusUpdated {
                message: format!(
                    "Component {} status updated to {}",
                    component_id,
                    update.status.as_str()
                ),
                triggered_evaluation: update.triggered_evaluation,
                status: update.status,
                maturity_score: update.maturity_score,
                modules_formed: update.modules_formed,
            })
        }

        Request::AddComponentDependency {
            from_component_id,
            to_component_id,
        } => {
            require(
                &from_component_id,
                "Both from_component_id and to_component_id are required",
            )?;
            require(
                &to_component_id,
                "Both from_component_id and to_component_id are required",
            )?;

            registry.add_component_dependency(&from_component_id, &to_component_id)?;
            Ok(Payload::DependencyAdded {
                message: format!(
                    "Dependency from {} to {} added",
                    from_component_id, to_component_id
                ),
            })
        }

        Request::SetComponentCohesion {
            component_id,
            cohesion_score,
        } => {
            require(&component_id, "Component ID is required to set cohesion")?;
            let cohesion_score = registry.set_component_cohesion(&component_id, cohesion_score)?;
            Ok(Payload::CohesionUpdated {
                message: format!(
                    "Component {} cohesion set to {:.2}",
                    component_id, cohesion_score
                ),
                cohesion_score,
            })
        }

        Request::GetComponent { component_id } => {
            require(&component_id, "Component ID is required")?;
            let component = registry
                .component(&component_id)
                .cloned()
                .ok_or_else(|| RegistryError::NotFound(component_id.clone()))?;
            let module_id = registry.module_of(&component_id).map(|m| m.id.clone());
            Ok(Payload::Component {
                component,
                module_id,
            })
        }

        Request::EvaluateModuleFormation => {
            let formed = registry.evaluate_module_formation();
            let insights = registry.get_formulation_insights();
            Ok(Payload::Evaluated {
                message: format!(
                    "Module formation evaluation completed. Total modules: {}",
                    insights.total_modules
                ),
                modules_formed: formed.len(),
                insights,
            })
        }

        Request::GetReadyModules => {
            let modules = registry.get_ready_modules();
            Ok(Payload::Modules {
                modules_count: modules.len(),
                modules,
            })
        }

        Request::GetFormulationInsights => Ok(Payload::Insights {
            insights: registry.get_formulation_insights(),
        }),

        Request::GetSkillInfo => Ok(Payload::SkillInfo(skill_info())),
    }
}

impl SharedRegistry {
    /// Execute a request while holding the registry lock
    pub fn execute(&self, request: Request) -> Response {
        self.with(|registry| execute(registry, request))
    }

    /// Decode and execute a JSON request while holding the registry lock
    pub fn execute_value(&self, value: Value) -> Response {
        self.with(|registry| execute_value(registry, value))
    }
}
