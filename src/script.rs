//! Scripted request execution
//!
//! A script is a JSON array of requests, or one request per line with `//`
//! comment lines. Component ids are generated at registration, so later
//! requests may refer to a component by the name it was registered under:
//!
//! ```json
//! {"operation": "register_component", "component_name": "auth"}
//! {"operation": "register_component", "component_name": "session"}
//! {"operation": "add_component_dependency", "from_component_id": "auth", "to_component_id": "session"}
//! ```

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::registry::Registry;
use crate::skill::{Payload, Response, execute_value};

/// Request fields that hold a component id
const REFERENCE_FIELDS: [&str; 3] = ["component_id", "from_component_id", "to_component_id"];

/// Parse a JSON array of requests, falling back to one request per line
pub fn parse_script(content: &str) -> Result<Vec<Value>, serde_json::Error> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content);
    }

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .map(serde_json::from_str)
        .collect()
}

/// Runs script requests against one registry, resolving component names
#[derive(Debug, Default)]
pub struct ScriptRunner {
    registry: Registry,
    /// Registered component name → id; a later registration wins
    names: HashMap<String, String>,
    failures: usize,
}

impl ScriptRunner {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    /// Execute one request
    pub fn execute(&mut self, mut request: Value) -> Response {
        self.resolve_names(&mut request);
        let registered_name = registered_name(&request);

        let response = execute_value(&mut self.registry, request);
        match (&response.payload, registered_name) {
            (Payload::Registered { component_id, .. }, Some(name)) => {
                if self.names.insert(name.clone(), component_id.clone()).is_some() {
                    warn!(name = %name, "component name registered twice, using the latest id");
                }
            }
            _ if !response.success => self.failures += 1,
            _ => {}
        }

        response
    }

    /// Id registered under `name`, if any
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    /// Number of failed requests so far
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn into_registry(self) -> Registry {
        self.registry
    }

    fn resolve_names(&self, request: &mut Value) {
        let Some(object) = request.as_object_mut() else {
            return;
        };
        for field in REFERENCE_FIELDS {
            let Some(Value::String(reference)) = object.get_mut(field) else {
                continue;
            };
            if let Some(id) = self.names.get(reference.trim()) {
                debug!(field, name = %reference, id = %id, "resolved component name");
                *reference = id.clone();
            }
        }
    }
}

/// Trimmed component name of a registration request
fn registered_name(request: &Value) -> Option<String> {
    let operation = request.get("operation")?.as_str()?;
    if !operation.trim().eq_ignore_ascii_case("register_component") {
        return None;
    }
    request
        .get("component_name")
        .or_else(|| request.get("name"))
        .and_then(Value::as_str)
        .map(|name| name.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentStatus;
    use serde_json::json;

    fn run(runner: &mut ScriptRunner, script: &str) -> Vec<Response> {
        parse_script(script)
            .unwrap()
            .into_iter()
            .map(|request| runner.execute(request))
            .collect()
    }

    #[test]
    fn test_parse_json_array() {
        let requests = parse_script(
            r#"[
                {"operation": "get_skill_info"},
                {"operation": "get_ready_modules"}
            ]"#,
        )
        .unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1]["operation"], json!("get_ready_modules"));
    }

    #[test]
    fn test_parse_json_lines_with_comments() {
        let requests = parse_script(
            "// setup\n\
             {\"operation\": \"register_component\", \"component_name\": \"a\"}\n\
             \n\
             // query\n\
             {\"operation\": \"get_formulation_insights\"}\n",
        )
        .unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["component_name"], json!("a"));
    }

    #[test]
    fn test_parse_invalid_line() {
        assert!(parse_script("{\"operation\": \"get_skill_info\"}\n{oops").is_err());
    }

    #[test]
    fn test_names_resolve_to_registered_ids() {
        let mut runner = ScriptRunner::new(Registry::new());
        let responses = run(
            &mut runner,
            r#"
            {"operation": "register_component", "component_name": "auth"}
            {"operation": "register_component", "name": "session"}
            {"operation": "add_component_dependency", "from_component_id": "auth", "to_component_id": "session"}
            "#,
        );
        assert!(responses.iter().all(|r| r.success));

        let auth = runner.resolve("auth").unwrap();
        let session = runner.resolve("session").unwrap().to_string();
        let component = runner.registry().component(auth).unwrap();
        assert!(component.dependencies.contains(&session));
        assert_eq!(runner.failures(), 0);
    }

    #[test]
    fn test_raw_ids_and_unknown_names_pass_through() {
        let mut runner = ScriptRunner::new(Registry::new());
        run(
            &mut runner,
            r#"{"operation": "register_component", "component_name": "auth"}"#,
        );
        let id = runner.resolve("auth").unwrap().to_string();

        let response = runner.execute(json!({
            "operation": "set_component_cohesion",
            "component_id": id,
            "cohesion_score": 0.5,
        }));
        assert!(response.success);

        let response = runner.execute(json!({
            "operation": "update_component_status",
            "component_id": "ghost",
            "status": "mature",
        }));
        assert_eq!(response.error(), Some("Component not found: ghost"));
        assert_eq!(runner.failures(), 1);
    }

    #[test]
    fn test_script_forms_module() {
        let mut runner = ScriptRunner::new(Registry::new());
        let mut script = String::new();
        let names = ["auth", "session", "token"];
        for name in names {
            script.push_str(&format!(
                "{{\"operation\": \"register_component\", \"component_name\": \"{}\", \"component_category\": \"security\"}}\n",
                name
            ));
        }
        for from in names {
            for to in names.iter().filter(|to| **to != from) {
                script.push_str(&format!(
                    "{{\"operation\": \"add_component_dependency\", \"from_component_id\": \"{}\", \"to_component_id\": \"{}\"}}\n",
                    from, to
                ));
            }
        }
        for name in names {
            script.push_str(&format!(
                "{{\"operation\": \"update_component_status\", \"component_id\": \"{}\", \"status\": \"MATURE\", \"maturity_boost\": 0.9}}\n",
                name
            ));
        }
        for name in names {
            script.push_str(&format!(
                "{{\"operation\": \"set_component_cohesion\", \"component_id\": \"{}\", \"cohesion_score\": 0.8}}\n",
                name
            ));
        }
        script.push_str("{\"operation\": \"evaluate_module_formation\"}\n");

        let responses = run(&mut runner, &script);
        assert!(responses.iter().all(|r| r.success));
        assert_eq!(runner.failures(), 0);

        let registry = runner.into_registry();
        assert_eq!(registry.modules().len(), 1);
        assert_eq!(registry.modules()[0].member_count(), 3);
        assert_eq!(registry.modules()[0].name, "auth_Module");
        assert!(
            registry
                .components()
                .all(|c| c.status == ComponentStatus::Stable)
        );
    }
}
