//! OpenAPI document types

use crate::metadata::MetadataSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

/// HTTP verb of an operation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

/// Where a parameter is read from
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
    Body,
}

/// A single operation parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterObject {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

impl ParameterObject {
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            location,
            description: None,
            required: location == ParameterLocation::Path,
            schema: None,
        }
    }

    /// Query parameter of a primitive type (`string`, `number`, ...)
    pub fn query(name: impl Into<String>, ty: &str) -> Self {
        Self::new(name, ParameterLocation::Query).with_type(ty)
    }

    pub fn path(name: impl Into<String>, ty: &str) -> Self {
        Self::new(name, ParameterLocation::Path).with_type(ty)
    }

    pub fn header(name: impl Into<String>, ty: &str) -> Self {
        Self::new(name, ParameterLocation::Header).with_type(ty)
    }

    /// Request body described by a schema
    pub fn body(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            schema: Some(schema),
            required: true,
            ..Self::new(name, ParameterLocation::Body)
        }
    }

    pub fn with_type(mut self, ty: &str) -> Self {
        self.schema = Some(serde_json::json!({ "type": ty }));
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl MetadataSpec for ParameterObject {}

/// An operation on a path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationObject {
    #[serde(
        rename = "x-operation-name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParameterObject>>,
    #[serde(default)]
    pub responses: BTreeMap<String, serde_json::Value>,
}

/// `path -> verb -> operation`
pub type PathsObject = BTreeMap<String, BTreeMap<Verb, OperationObject>>;

/// REST description of a controller class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default)]
    pub paths: PathsObject,
}

impl ControllerSpec {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: Some(base_path.into()),
            paths: PathsObject::new(),
        }
    }
}

impl MetadataSpec for ControllerSpec {}

/// A route declared on a controller method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestEndpoint {
    pub verb: Verb,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<OperationObject>,
}

impl MetadataSpec for RestEndpoint {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoObject {
    pub title: String,
    pub version: String,
}

/// OpenAPI document served by the REST server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,
    pub info: InfoObject,
    #[serde(default)]
    pub paths: PathsObject,
}

impl OpenApiSpec {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi: "3.0.0".to_string(),
            info: InfoObject {
                title: title.into(),
                version: version.into(),
            },
            paths: PathsObject::new(),
        }
    }

    /// Add every operation of `controller`, prefixing its base path
    pub fn add_controller(&mut self, controller: &ControllerSpec) {
        let base = controller
            .base_path
            .as_deref()
            .unwrap_or("")
            .trim_end_matches('/');

        for (path, operations) in &controller.paths {
            let full = match (base.is_empty(), path.as_str()) {
                (true, path) => path.to_string(),
                (false, "/") => base.to_string(),
                (false, path) if path.starts_with('/') => format!("{base}{path}"),
                (false, path) => format!("{base}/{path}"),
            };
            let entry = self.paths.entry(full.clone()).or_default();
            for (verb, operation) in operations {
                if entry.insert(*verb, operation.clone()).is_some() {
                    tracing::warn!(
                        path = %full,
                        %verb,
                        "operation declared by more than one controller"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameter_serialization() {
        let param = ParameterObject::path("id", "string");
        assert_eq!(
            serde_json::to_value(&param).unwrap(),
            json!({"name": "id", "in": "path", "required": true, "schema": {"type": "string"}})
        );
    }

    #[test]
    fn test_verb_parsing() {
        assert_eq!("get".parse::<Verb>().unwrap(), Verb::Get);
        assert_eq!(Verb::Delete.to_string(), "delete");
    }

    #[test]
    fn test_add_controller_joins_base_path() {
        let mut controller = ControllerSpec::new("/users/");
        controller
            .paths
            .entry("/{id}".to_string())
            .or_default()
            .insert(Verb::Get, OperationObject::default());
        controller
            .paths
            .entry("/".to_string())
            .or_default()
            .insert(Verb::Post, OperationObject::default());

        let mut spec = OpenApiSpec::new("app", "1.0.0");
        spec.add_controller(&controller);
        let paths: Vec<_> = spec.paths.keys().cloned().collect();
        assert_eq!(paths, ["/users", "/users/{id}"]);
    }
}
