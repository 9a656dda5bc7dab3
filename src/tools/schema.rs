//! Typed parameter schemas for tools.
//!
//! A `ParameterSchema` is declared once per tool and used for two things:
//! advertising the tool's calling convention to the client, and validating
//! incoming arguments before the handler runs.

use rmcp::model::JsonObject;
use serde::Serialize;
use serde_json::{Value, json};

use crate::dates::parse_iso_date;
use crate::tools::ToolError;

/// Declared type of a single parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    /// An ISO `YYYY-MM-DD` date carried as a JSON string.
    Date,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
        }
    }

    /// Check whether a JSON value satisfies this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Date => value.as_str().and_then(parse_iso_date).is_some(),
        }
    }
}

/// A single named parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: ParamType,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
}

/// Ordered set of parameters accepted by a tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSchema {
    params: Vec<ParamSpec>,
}

impl ParameterSchema {
    /// A schema with no parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter.
    pub fn required(mut self, name: &str, param_type: ParamType, description: &str) -> Self {
        self.params.push(ParamSpec {
            name: name.to_string(),
            param_type,
            required: true,
            default: None,
            description: Some(description.to_string()),
        });
        self
    }

    /// Add an optional parameter with no default.
    pub fn optional(mut self, name: &str, param_type: ParamType, description: &str) -> Self {
        self.params.push(ParamSpec {
            name: name.to_string(),
            param_type,
            required: false,
            default: None,
            description: Some(description.to_string()),
        });
        self
    }

    /// Add an optional parameter that falls back to `default` when omitted.
    pub fn with_default(
        mut self,
        name: &str,
        param_type: ParamType,
        default: Value,
        description: &str,
    ) -> Self {
        self.params.push(ParamSpec {
            name: name.to_string(),
            param_type,
            required: false,
            default: Some(default),
            description: Some(description.to_string()),
        });
        self
    }

    /// Check the schema itself: names are unique and defaults match their types.
    pub fn check(&self) -> Result<(), ToolError> {
        for (i, spec) in self.params.iter().enumerate() {
            if self.params[..i].iter().any(|p| p.name == spec.name) {
                return Err(ToolError::InvalidArguments(format!(
                    "parameter `{}` is declared twice",
                    spec.name
                )));
            }
            if let Some(default) = &spec.default {
                if !spec.param_type.accepts(default) {
                    return Err(ToolError::InvalidArguments(format!(
                        "default for `{}` is not a valid {}",
                        spec.name,
                        spec.param_type.as_str()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validate `args` and fill in declared defaults.
    ///
    /// Undeclared fields pass through untouched. A `null` value counts as
    /// absent.
    pub fn validate(&self, mut args: JsonObject) -> Result<JsonObject, ToolError> {
        for spec in &self.params {
            match args.get(&spec.name) {
                Some(Value::Null) | None => {
                    args.remove(&spec.name);
                    if spec.required {
                        return Err(ToolError::InvalidArguments(format!(
                            "missing required field `{}`",
                            spec.name
                        )));
                    }
                    if let Some(default) = &spec.default {
                        args.insert(spec.name.clone(), default.clone());
                    }
                }
                Some(value) => {
                    if !spec.param_type.accepts(value) {
                        return Err(ToolError::InvalidArguments(format!(
                            "field `{}` must be a {}, got {}",
                            spec.name,
                            spec.param_type.as_str(),
                            value
                        )));
                    }
                }
            }
        }
        Ok(args)
    }

    /// Render as a JSON Schema object for MCP `list_tools`.
    pub fn to_json_schema(&self) -> JsonObject {
        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));

        let mut properties = serde_json::Map::new();
        for spec in &self.params {
            let mut prop = serde_json::Map::new();
            match spec.param_type {
                ParamType::Date => {
                    prop.insert("type".to_string(), json!("string"));
                    prop.insert("format".to_string(), json!("date"));
                }
                other => {
                    prop.insert("type".to_string(), json!(other.as_str()));
                }
            }
            if let Some(description) = &spec.description {
                prop.insert("description".to_string(), json!(description));
            }
            if let Some(default) = &spec.default {
                prop.insert("default".to_string(), default.clone());
            }
            properties.insert(spec.name.clone(), Value::Object(prop));
        }

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), json!(required));
        schema
    }

    /// Render the compact `{field: {type, required, default?}}` form.
    pub fn to_advertisement(&self) -> Value {
        let mut fields = serde_json::Map::new();
        for spec in &self.params {
            let mut field = serde_json::Map::new();
            field.insert("type".to_string(), json!(spec.param_type.as_str()));
            field.insert("required".to_string(), json!(spec.required));
            if let Some(default) = &spec.default {
                field.insert("default".to_string(), default.clone());
            }
            fields.insert(spec.name.clone(), Value::Object(field));
        }
        Value::Object(fields)
    }
}
