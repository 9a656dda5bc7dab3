//! Routes invocation requests to registered tools.

use std::sync::Arc;

use rmcp::model::JsonObject;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::tools::{ErrorKind, ToolContext, ToolError, ToolOutput, ToolRegistry};

/// A single tool invocation: tool name plus argument bag.
#[derive(Debug, Clone, Default)]
pub struct InvocationRequest {
    pub tool_name: String,
    pub arguments: JsonObject,
}

impl InvocationRequest {
    /// A request with no arguments.
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: JsonObject::new(),
        }
    }

    /// A request with the given arguments.
    pub fn with_arguments(tool_name: impl Into<String>, arguments: JsonObject) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Set a single argument.
    pub fn arg(mut self, name: &str, value: Value) -> Self {
        self.arguments.insert(name.to_string(), value);
        self
    }
}

/// Outcome of a dispatch. Always fully populated.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationResult {
    Success(ToolOutput),
    Failure { kind: ErrorKind, message: String },
}

impl InvocationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The failure kind, if this is a failure.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Render as text: the output on success, the message on failure.
    pub fn to_text(&self) -> String {
        match self {
            Self::Success(output) => output.to_text(),
            Self::Failure { message, .. } => message.clone(),
        }
    }

    /// JSON rendering used by the CLI.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Success(ToolOutput::Text(text)) => json!(text),
            Self::Success(ToolOutput::Structured(value)) => value.clone(),
            Self::Failure { kind, message } => json!({
                "kind": kind,
                "message": message,
            }),
        }
    }
}

impl From<ToolError> for InvocationResult {
    fn from(err: ToolError) -> Self {
        Self::Failure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Looks up, validates and invokes tools held by a `ToolRegistry`.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Dispatch one invocation request.
    ///
    /// Lookup and validation failures come back as structured failures and
    /// the handler never runs. Errors returned by the handler are wrapped as
    /// `HandlerError`, except for a `ToolError` which keeps its own kind.
    pub async fn dispatch(&self, request: InvocationRequest) -> InvocationResult {
        let InvocationRequest {
            tool_name,
            arguments,
        } = request;

        let handler = match self.registry.lookup(&tool_name) {
            Ok(handler) => handler,
            Err(e) => {
                warn!(tool = %tool_name, "Dispatch to unknown tool");
                return e.into();
            }
        };

        let args = match handler.parameters().validate(arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!(tool = %tool_name, "Rejected arguments: {}", e);
                return e.into();
            }
        };

        debug!(tool = %tool_name, "Invoking tool");
        let ctx = ToolContext {
            dispatcher: self.clone(),
        };

        match handler.execute(args, &ctx).await {
            Ok(output) => {
                info!(tool = %tool_name, "Tool call succeeded");
                InvocationResult::Success(output)
            }
            Err(e) => {
                let result = match e.downcast_ref::<ToolError>() {
                    Some(tool_err) => InvocationResult::from(tool_err.clone()),
                    None => InvocationResult::Failure {
                        kind: ErrorKind::HandlerError,
                        message: format!("Tool execution failed: {:#}", e),
                    },
                };
                warn!(tool = %tool_name, kind = ?result.error_kind(), "Tool call failed: {:#}", e);
                result
            }
        }
    }
}
