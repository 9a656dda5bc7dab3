//! Tool registry for the fitness tools.
//!
//! Provides a `ToolHandler` trait for implementing tools and a `ToolRegistry`
//! that owns them for the lifetime of the process.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rmcp::model::{JsonObject, Tool as McpTool};
use serde::Serialize;
use serde_json::Value;

use crate::tools::{Dispatcher, ParameterSchema, ToolError};

/// Context passed to tool handlers during execution.
#[derive(Clone)]
pub struct ToolContext {
    /// Dispatcher the current call came through, for tools that call other tools.
    pub dispatcher: Dispatcher,
}

/// Successful output of a tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Human-readable text, the common case.
    Text(String),
    /// Structured data, e.g. a list of calendar events.
    Structured(Value),
}

impl ToolOutput {
    /// Render the output as text, serializing structured values as JSON.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => value.to_string(),
        }
    }
}

/// Boxed future returned by `ToolHandler::execute`.
pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<ToolOutput>> + Send + 'a>>;

/// Trait for handling tool invocations.
///
/// Each tool implements this trait to define its schema and execution logic.
/// Arguments reaching `execute` have already been validated against
/// `parameters()` and carry declared defaults.
pub trait ToolHandler: Send + Sync {
    /// Returns the tool's name (e.g., "get_sleep_score").
    fn name(&self) -> &str;

    /// Returns the tool's human-readable title.
    fn title(&self) -> Option<&str> {
        None
    }

    /// Returns the tool's description.
    fn description(&self) -> &str;

    /// Returns the parameters this tool accepts.
    fn parameters(&self) -> &ParameterSchema;

    /// Executes the tool with the given arguments.
    fn execute(&self, args: JsonObject, ctx: &ToolContext) -> ToolFuture<'_>;

    /// Converts this handler to an `McpTool` for use in `list_tools`.
    fn to_mcp_tool(&self) -> McpTool {
        use std::borrow::Cow;

        McpTool {
            name: Cow::Owned(self.name().to_string()),
            title: self.title().map(|s| s.to_string()),
            description: Some(Cow::Owned(self.description().to_string())),
            input_schema: Arc::new(self.parameters().to_json_schema()),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: None,
        }
    }
}

/// Discovery entry for one tool: name, description and parameters verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct ToolAdvertisement {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Registry for managing tool handlers.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    handlers: BTreeMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Register a tool handler.
    ///
    /// Fails with `DuplicateTool` if the name is taken; the existing handler
    /// stays in place. Fails with `InvalidArguments` if the handler's schema
    /// is inconsistent.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) -> Result<(), ToolError> {
        let name = handler.name().to_string();
        if self.handlers.contains_key(&name) {
            return Err(ToolError::DuplicateTool(name));
        }
        handler.parameters().check()?;
        tracing::debug!(tool = %name, "Registered tool");
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Register a tool handler from a type that implements `ToolHandler`.
    pub fn register_handler<T: ToolHandler + 'static>(
        &mut self,
        handler: T,
    ) -> Result<(), ToolError> {
        self.register(Arc::new(handler))
    }

    /// Builder-style variant of `register_handler`.
    pub fn with_handler<T: ToolHandler + 'static>(mut self, handler: T) -> Result<Self, ToolError> {
        self.register_handler(handler)?;
        Ok(self)
    }

    /// Get a tool handler by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn ToolHandler>, ToolError> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// List all registered tool names.
    pub fn list_names(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Describe every registered tool for the calling client.
    pub fn list(&self) -> Vec<ToolAdvertisement> {
        self.handlers
            .values()
            .map(|handler| ToolAdvertisement {
                name: handler.name().to_string(),
                description: handler.description().to_string(),
                parameters: handler.parameters().to_advertisement(),
            })
            .collect()
    }

    /// Get all registered tools as `McpTool` instances for `list_tools`.
    pub fn list_tools(&self) -> Vec<McpTool> {
        self.handlers
            .values()
            .map(|handler| handler.to_mcp_tool())
            .collect()
    }

    /// Check if a tool with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Return the number of registered tools.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Return `true` if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
