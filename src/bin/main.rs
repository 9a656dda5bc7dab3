use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fitness_agent::{
    FitnessConfig, InvocationRequest, InvocationResult, ToolOutput, build_dispatcher,
    create_server,
};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

// rmcp imports for MCP stdio server mode
use rmcp::service::ServiceExt;
use rmcp::transport::stdio;

#[derive(Parser)]
#[command(name = "fitness-agent")]
#[command(about = "MCP tools for sleep, activity, weather, calendar and workout planning")]
struct Cli {
    /// Path to a JSON config file (defaults to $FITNESS_CONFIG or ./fitness.json)
    #[arg(long, global = true, env = "FITNESS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as an MCP stdio server (for use in mcp.json)
    McpStdio,
    /// Run as an MCP HTTP server
    McpHttp {
        /// Bind address, e.g. 0.0.0.0:3943
        #[arg(long, default_value = "127.0.0.1:3943")]
        bind: String,
    },
    /// Print the tool advertisement as JSON
    ListTools,
    /// Invoke a single tool and print the result
    Call {
        /// Tool name, e.g. get_sleep_score
        tool: String,
        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout belongs to the stdio transport.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("fitness_agent=info".parse()?)
                .add_directive("rmcp=warn".parse()?),
        )
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = FitnessConfig::load(cli.config)?;

    match cli.command {
        Commands::McpStdio => {
            info!("Starting MCP stdio server (rmcp)");

            let server = create_server(&config)?;

            // Run as an MCP stdio server. McpServer implements ServerHandler.
            let service = server
                .as_ref()
                .clone()
                .serve(stdio())
                .await
                .inspect_err(|e| tracing::error!("serving error: {:?}", e))?;

            // Block until the MCP session ends.
            service.waiting().await?;
            info!("MCP stdio server session ended");
        }
        Commands::McpHttp { bind } => {
            info!("Starting MCP HTTP server (rmcp) on {}", bind);
            let server = create_server(&config)?;
            fitness_agent::server::start_mcp_http(server, &bind).await?;
        }
        Commands::ListTools => {
            let dispatcher = build_dispatcher(&config)?;
            let tools = dispatcher.registry().list();
            println!("{}", serde_json::to_string_pretty(&tools)?);
        }
        Commands::Call { tool, args } => {
            let arguments = match serde_json::from_str::<serde_json::Value>(&args)? {
                serde_json::Value::Object(map) => map,
                other => anyhow::bail!("--args must be a JSON object, got {}", other),
            };

            info!("Calling tool '{}'", tool);
            let dispatcher = build_dispatcher(&config)?;
            let result = dispatcher
                .dispatch(InvocationRequest::with_arguments(tool, arguments))
                .await;

            match &result {
                InvocationResult::Success(ToolOutput::Text(text)) => println!("{}", text),
                other => println!("{}", serde_json::to_string_pretty(&other.to_json())?),
            }

            if !result.is_success() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
