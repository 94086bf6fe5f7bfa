//! Mead Calculator (meadcalc)
//!
//! An MCP server for gravity, ABV and fermentable planning.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use meadcalc::build_info;
use meadcalc::config;
use meadcalc::mcp::MeadCalcService;
use meadcalc::session::CalculatorSession;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("meadcalc=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let units = config::unit_preferences_from_env();
    eprintln!(
        "Unit preferences: mass {}, volume {}",
        units.mass.as_str(),
        units.volume.as_str()
    );

    // Create the meadcalc service
    let service = MeadCalcService::new(CalculatorSession::new(units));

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
