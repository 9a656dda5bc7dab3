//! Error taxonomy shared by the registry, the dispatcher and the tools.

use std::fmt;

use serde::Serialize;

/// Category of a failed invocation, reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownTool,
    DuplicateTool,
    InvalidArguments,
    AuthRequired,
    ProviderUnavailable,
    MalformedPayload,
    HandlerError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownTool => "unknown_tool",
            Self::DuplicateTool => "duplicate_tool",
            Self::InvalidArguments => "invalid_arguments",
            Self::AuthRequired => "auth_required",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::MalformedPayload => "malformed_payload",
            Self::HandlerError => "handler_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the tool layer itself.
///
/// Provider failures never show up here; they are collapsed into an empty
/// `ProviderResponse` at the client boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// No tool with this name is registered.
    UnknownTool(String),

    /// A tool with this name is already registered.
    DuplicateTool(String),

    /// Arguments failed validation against the parameter schema.
    InvalidArguments(String),

    /// A credential is missing or expired and needs out-of-band consent.
    AuthRequired(String),

    /// The handler failed while executing.
    Handler(String),
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownTool(_) => ErrorKind::UnknownTool,
            Self::DuplicateTool(_) => ErrorKind::DuplicateTool,
            Self::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Self::AuthRequired(_) => ErrorKind::AuthRequired,
            Self::Handler(_) => ErrorKind::HandlerError,
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTool(name) => write!(f, "Unknown tool: {}", name),
            Self::DuplicateTool(name) => write!(f, "Tool already registered: {}", name),
            Self::InvalidArguments(msg) => write!(f, "Invalid arguments: {}", msg),
            Self::AuthRequired(msg) => write!(f, "Authorization required: {}", msg),
            Self::Handler(msg) => write!(f, "Tool execution failed: {}", msg),
        }
    }
}

impl std::error::Error for ToolError {}
