use std::io::{self, Write};
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use civic_guide::client::GuideApiClient;
use civic_guide::codec::OutputFormat;
use civic_guide::{ExplanationMode, Language};

#[derive(Parser)]
#[command(name = "civic-guide-cli")]
#[command(about = "CLI client for the civic-guide server")]
struct Cli {
    /// Server address (e.g., "http://localhost:8080")
    #[arg(short, long, default_value = "http://localhost:8080")]
    server: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "60")]
    timeout: u64,

    /// Language for generated text (e.g., "Hindi")
    #[arg(short, long, default_value = "English")]
    language: Language,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for government, healthcare, or education services
    Search {
        /// Free-text query; joined with spaces
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Explain how to use one service
    Details {
        /// Service name as returned by `search`
        service: String,

        /// Professional, Simple, or Story-based
        #[arg(short, long, default_value = "Professional")]
        mode: ExplanationMode,
    },
    /// Explain an error message, term, or code snippet
    Code {
        /// Input text; use "-" to read stdin
        input: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = GuideApiClient::new(cli.server.clone())
        .with_timeout(Duration::from_secs(cli.timeout));

    let bytes = match cli.command {
        Command::Search { query } => {
            let query = query.join(" ");
            eprintln!("Searching '{}' in {}...", query, cli.language);
            let results = client.search(&query, cli.language).await?;
            if results.is_empty() {
                eprintln!("No services found.");
            }
            cli.format.encode(&results)?
        }
        Command::Details { service, mode } => {
            eprintln!("Fetching {} guide for '{}'...", mode, service);
            let detail = client.get_details(&service, cli.language, mode).await?;
            cli.format.encode(&detail)?
        }
        Command::Code { input } => {
            let input = if input == "-" {
                io::read_to_string(io::stdin())
                    .map_err(|e| anyhow!("Failed to read from stdin: {e}"))?
            } else {
                input
            };
            let help = client.get_coding_help(&input, cli.language).await?;
            cli.format.encode(&help)?
        }
    };

    io::stdout()
        .write_all(&bytes)
        .map_err(|e| anyhow!("Failed to write output: {e}"))?;

    Ok(())
}
