pub mod config;
pub mod dates;
pub mod format;
pub mod providers;
pub mod server;
pub mod tools;

// Re-export key types and functions
pub use config::FitnessConfig;
pub use server::McpServer;
pub use tools::{
    Dispatcher, ErrorKind, InvocationRequest, InvocationResult, ToolError, ToolHandler,
    ToolOutput, ToolRegistry,
};

use std::sync::Arc;

use anyhow::Result;
use providers::{
    CalendarClient, CredentialStore, FileCredentialStore, OuraClient, WeatherClient,
    build_http_client,
};
use tools::{
    CalendarEventsHandler, OuraDataHandler, SleepScoreHandler, TodayActivityHandler,
    WeatherHandler, WorkoutRecommendationHandler,
};

/// Build the registry with every fitness tool, wired to the configured
/// providers.
pub fn build_registry(config: &FitnessConfig) -> Result<ToolRegistry> {
    let http = build_http_client(config.request_timeout())?;

    let oura = OuraClient::from_config(http.clone(), config)?;
    let weather = WeatherClient::from_config(http.clone(), config)?;
    let credentials: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::open(
        config.calendar_token_path.clone(),
        http.clone(),
    ));
    let calendar = CalendarClient::from_config(http, config, credentials)?;

    let registry = ToolRegistry::new()
        .with_handler(SleepScoreHandler::new(oura.clone()))?
        .with_handler(TodayActivityHandler::new(oura.clone()))?
        .with_handler(OuraDataHandler::new(oura))?
        .with_handler(WeatherHandler::new(
            weather,
            &config.default_city,
            &config.default_country,
        ))?
        .with_handler(CalendarEventsHandler::new(calendar))?
        .with_handler(WorkoutRecommendationHandler::new())?;

    tracing::info!(tools = registry.len(), "Tool registry ready");
    Ok(registry)
}

/// Build a dispatcher over the full tool set.
pub fn build_dispatcher(config: &FitnessConfig) -> Result<Dispatcher> {
    Ok(Dispatcher::new(Arc::new(build_registry(config)?)))
}

/// Convenience function to create a fully configured MCP server.
pub fn create_server(config: &FitnessConfig) -> Result<Arc<McpServer>> {
    Ok(Arc::new(McpServer::new(build_dispatcher(config)?)))
}
