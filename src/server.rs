//! MCP server implementation using rmcp.
//!
//! Exposes the tool dispatcher over stdio or streamable HTTP.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::*,
    service::{RequestContext, RoleServer},
};
use tower_http::trace::TraceLayer;

use crate::tools::{
    Dispatcher, ErrorKind, InvocationRequest, InvocationResult, ToolOutput,
};

/// MCP error code used when the user must authorize access out of band.
pub const AUTH_REQUIRED_ERROR_CODE: i32 = -32001;

const INSTRUCTIONS: &str = "Fitness assistant tools: last night's sleep score, today's activity, \
     raw sleep and readiness data, current weather, calendar events, and a workout \
     recommendation brief that combines sleep and weather.";

/// MCP server that handles protocol requests and delegates to the dispatcher.
#[derive(Clone)]
pub struct McpServer {
    dispatcher: Dispatcher,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

/// Map a dispatch outcome onto the MCP result/error split.
///
/// Caller mistakes and authorization problems are protocol errors; a failed
/// handler is a tool result with `is_error` set so the model can read it.
pub fn to_call_tool_result(result: InvocationResult) -> Result<CallToolResult, McpError> {
    match result {
        InvocationResult::Success(ToolOutput::Text(text)) => Ok(CallToolResult {
            content: vec![Content::text(text)],
            structured_content: None,
            is_error: Some(false),
            meta: None,
        }),
        InvocationResult::Success(ToolOutput::Structured(value)) => {
            let text = serde_json::to_string(&value)
                .unwrap_or_else(|_| "internal serialization error".to_string());
            let structured_content = value.is_object().then_some(value);
            Ok(CallToolResult {
                content: vec![Content::text(text)],
                structured_content,
                is_error: Some(false),
                meta: None,
            })
        }
        InvocationResult::Failure { kind, message } => match kind {
            ErrorKind::UnknownTool | ErrorKind::InvalidArguments => {
                Err(McpError::invalid_params(message, None))
            }
            ErrorKind::AuthRequired => Err(McpError::new(
                ErrorCode(AUTH_REQUIRED_ERROR_CODE),
                message,
                None,
            )),
            _ => Ok(CallToolResult {
                content: vec![Content::text(message)],
                structured_content: None,
                is_error: Some(true),
                meta: None,
            }),
        },
    }
}

impl ServerHandler for McpServer {
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let result = ListToolsResult {
            tools: self.dispatcher.registry().list_tools(),
            next_cursor: None,
            ..Default::default()
        };
        std::future::ready(Ok(result))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let invocation = InvocationRequest::with_arguments(
            request.name.to_string(),
            request.arguments.unwrap_or_default(),
        );
        let dispatcher = self.dispatcher.clone();

        async move { to_call_tool_result(dispatcher.dispatch(invocation).await) }
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

/// Serve MCP over Streamable HTTP at `/mcp` on the given bind address,
/// e.g. `127.0.0.1:3943`.
pub async fn start_mcp_http(server: Arc<McpServer>, bind: &str) -> Result<()> {
    let dispatcher = server.dispatcher().clone();

    let service = StreamableHttpService::new(
        move || Ok(McpServer::new(dispatcher.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = Router::new()
        .nest_service("/mcp", service)
        .layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(bind).await?;

    tracing::info!("MCP HTTP server listening on http://{}/mcp", bind);
    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolError;
    use serde_json::json;

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_text_success() {
        let output = ToolOutput::Text("hello".into());
        let result = to_call_tool_result(InvocationResult::Success(output)).unwrap();
        assert_eq!(result.is_error, Some(false));
        assert_eq!(text_of(&result), "hello");
    }

    #[test]
    fn test_structured_array_success() {
        let value = json!([{"summary": "No Title"}]);
        let result =
            to_call_tool_result(InvocationResult::Success(ToolOutput::Structured(value))).unwrap();
        assert_eq!(result.structured_content, None);
        assert_eq!(text_of(&result), r#"[{"summary":"No Title"}]"#);
    }

    #[test]
    fn test_structured_object_success() {
        let value = json!({"sleep": [], "readiness": []});
        let result = to_call_tool_result(InvocationResult::Success(ToolOutput::Structured(
            value.clone(),
        )))
        .unwrap();
        assert_eq!(result.structured_content, Some(value));
    }

    #[test]
    fn test_caller_errors_are_invalid_params() {
        let err = to_call_tool_result(ToolError::UnknownTool("nope".into()).into()).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

        let err =
            to_call_tool_result(ToolError::InvalidArguments("bad".into()).into()).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn test_auth_required_code() {
        let err =
            to_call_tool_result(ToolError::AuthRequired("consent".into()).into()).unwrap_err();
        assert_eq!(err.code, ErrorCode(AUTH_REQUIRED_ERROR_CODE));
    }

    #[test]
    fn test_handler_error_is_tool_result() {
        let result = to_call_tool_result(InvocationResult::Failure {
            kind: ErrorKind::HandlerError,
            message: "Tool execution failed: boom".into(),
        })
        .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("boom"));
    }

    #[test]
    fn test_get_info_enables_tools() {
        let server = McpServer::new(Dispatcher::new(Arc::new(crate::ToolRegistry::new())));
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
    }
}
