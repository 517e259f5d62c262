//! Validation Engine
//!
//! Structural and semantic checks over a decoded Compose document.
//! Pure: no I/O, no logging, every finding becomes a diagnostic.

use serde::Serialize;

use crate::parser::{Mapping, Value};
use crate::validation::graph::{dependency_names, DependencyGraph};
use crate::validation::keys::{self, RESTART_POLICIES};
use crate::validation::ports::is_valid_port_spec;

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic message for a validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Dotted location of the offending field, e.g. `services.web.ports`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Result of validating a document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: String, path: Option<String>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            message,
            path,
        });
    }

    pub fn add_warning(&mut self, message: String, path: Option<String>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message,
            path,
        });
    }

    /// Valid iff there are no error-severity diagnostics
    pub fn is_valid(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Validate a decoded Compose document.
///
/// Diagnostics come back in rule order: document shape, top-level keys,
/// then each service in declaration order, then dependency cycles.
pub fn validate(document: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();

    let root = match document {
        Value::Mapping(root) => root,
        _ => {
            result.add_error("Document must be a mapping".to_string(), None);
            return result;
        }
    };

    for key in root.keys() {
        if !keys::is_top_level_key(key) {
            result.add_warning(
                format!("Unknown top-level key \"{}\"", key),
                Some(key.clone()),
            );
        }
    }

    if root.contains_key("version") {
        result.add_warning(
            "The top-level \"version\" key is obsolete and ignored by Compose".to_string(),
            Some("version".to_string()),
        );
    }

    let services = match root.get("services") {
        Some(services) if services.is_truthy() => services,
        _ => {
            result.add_error("Missing required services key".to_string(), None);
            return result;
        }
    };

    let services = match services {
        Value::Mapping(services) => services,
        other => {
            result.add_error(
                format!("\"services\" must be a mapping, got {}", other.kind_name()),
                Some("services".to_string()),
            );
            return result;
        }
    };

    let top_level_volumes = root.get("volumes").and_then(Value::as_mapping);

    for (name, service) in services {
        validate_service(name, service, services, top_level_volumes, &mut result);
    }

    for cycle in DependencyGraph::from_services(services).find_cycle_edges() {
        result.add_error(
            format!(
                "Circular dependency detected: \"{}\" depends on \"{}\"",
                cycle.from, cycle.to
            ),
            None,
        );
    }

    result
}

/// Per-service checks, in rule order
fn validate_service(
    name: &str,
    service: &Value,
    services: &Mapping,
    top_level_volumes: Option<&Mapping>,
    result: &mut ValidationResult,
) {
    let path = format!("services.{}", name);

    let definition = match service {
        Value::Mapping(definition) => definition,
        other => {
            result.add_error(
                format!(
                    "Service \"{}\" must be a mapping, got {}",
                    name,
                    other.kind_name()
                ),
                Some(path),
            );
            return;
        }
    };

    let has_source = |key: &str| definition.get(key).is_some_and(Value::is_truthy);
    if !has_source("image") && !has_source("build") {
        result.add_error(
            format!(
                "Service \"{}\" must have either an \"image\" or a \"build\" key",
                name
            ),
            Some(path.clone()),
        );
    }

    for key in definition.keys() {
        if !keys::is_service_key(key) {
            result.add_warning(
                format!("Unknown key \"{}\" in service \"{}\"", key, name),
                Some(format!("{}.{}", path, key)),
            );
        }
    }

    if let Some(restart) = definition.get("restart").filter(|v| !v.is_null()) {
        let policy = restart.to_display_string();
        if !keys::is_valid_restart_policy(&policy) {
            result.add_error(
                format!(
                    "Service \"{}\" has invalid restart policy \"{}\" (valid policies: {})",
                    name,
                    policy,
                    RESTART_POLICIES.join(", ")
                ),
                Some(format!("{}.restart", path)),
            );
        }
    }

    if let Some(ports) = definition.get("ports").and_then(Value::as_sequence) {
        for port in ports {
            // Long-syntax entries (mappings) are not checked here
            let spec = match port {
                Value::String(_) | Value::Number(_) => port.to_display_string(),
                _ => continue,
            };
            if !is_valid_port_spec(&spec) {
                result.add_warning(
                    format!(
                        "Service \"{}\" has an unusual port specification \"{}\"",
                        name, spec
                    ),
                    Some(format!("{}.ports", path)),
                );
            }
        }
    }

    for dependency in dependency_names(definition.get("depends_on")) {
        if !services.contains_key(&dependency) {
            result.add_error(
                format!(
                    "Service \"{}\" depends on \"{}\", which is not defined",
                    name, dependency
                ),
                Some(format!("{}.depends_on", path)),
            );
        }
        if dependency == name {
            result.add_error(
                format!("Service \"{}\" depends on itself", name),
                Some(format!("{}.depends_on", path)),
            );
        }
    }

    if let Some(environment) = definition.get("environment") {
        if !matches!(
            environment,
            Value::Null | Value::Sequence(_) | Value::Mapping(_)
        ) {
            result.add_error(
                format!(
                    "Service \"{}\" environment must be a sequence or a mapping, got {}",
                    name,
                    environment.kind_name()
                ),
                Some(format!("{}.environment", path)),
            );
        }
    }

    if let Some(volumes) = definition.get("volumes").and_then(Value::as_sequence) {
        for volume in volumes.iter().filter_map(Value::as_str) {
            if !is_named_volume(volume) {
                continue;
            }
            let declared = top_level_volumes.is_some_and(|v| v.contains_key(volume));
            if !declared {
                result.add_warning(
                    format!(
                        "Service \"{}\" uses named volume \"{}\", which is not declared in the top-level volumes",
                        name, volume
                    ),
                    Some(format!("{}.volumes", path)),
                );
            }
        }
    }
}

/// A bare name with no mount target and no path prefix
fn is_named_volume(entry: &str) -> bool {
    !entry.contains(':') && !entry.starts_with('/') && !entry.starts_with('.')
}
