//! # modulizer - Bottom-Up Module Formation Engine
//!
//! Tracks the maturity of individual components and, as they mature,
//! groups related ones into cohesive modules.
//!
//! ## Overview
//!
//! A component is registered, linked to other components by dependency
//! edges, and promoted through a status lifecycle:
//!
//! ```text
//! proposed -> in_progress -> testing -> mature -> stable
//! ```
//!
//! Whenever a component reaches Mature or Stable, formation evaluation runs.
//! Within each category the mature candidates are clustered greedily by
//! connectivity, and every cluster that satisfies the formation criteria
//! becomes a module. Members of a new module are promoted to Stable.
//!
//! ## Connectivity
//!
//! ```text
//! connectivity(a, b) = min(1, 0.5 * [direct edge] + 0.5 * shared / max(deg(a), deg(b), 1))
//! ```
//!
//! where `shared` counts common dependencies plus common dependents, and
//! `deg(x)` is the number of dependencies and dependents of `x`.
//!
//! ## Usage
//!
//! ```bash
//! # Execute a script of requests
//! modulizer run requests.json
//!
//! # Serve the request surface over HTTP
//! modulizer serve --port 3000
//! ```

pub mod cluster;
pub mod component;
pub mod config;
pub mod connectivity;
pub mod formation;
pub mod metrics;
pub mod registry;
pub mod report;
pub mod script;
pub mod skill;
pub mod web;

pub use cluster::cluster_by_connectivity;
pub use component::{Component, ComponentStatus, ParseStatusError};
pub use config::{
    ConfigError, FormationConfig, FormationCriteria, ModulizerConfig, find_config_file,
    load_config,
};
pub use connectivity::connectivity;
pub use formation::{Module, ModuleSummary, base_module_name};
pub use metrics::ModuleMetrics;
pub use registry::{
    DEFAULT_CATEGORY, FormationInsights, Registry, RegistryError, SharedRegistry, StatusUpdate,
};
pub use report::generate_summary;
pub use script::{ScriptRunner, parse_script};
pub use skill::{
    Payload, Request, RequestError, Response, SKILL_NAME, SUPPORTED_OPERATIONS, SkillInfo,
    execute, execute_json, execute_value, skill_info,
};
