//! CLI entrypoint for rendering policy violation reports as markdown.

mod config;
mod service;
mod source;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use policy_report_markdown::ReportFormat;
use service::{DeliveryOptions, RenderOptions, ReportService};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "POLICY_REPORT_LOG";

#[derive(Parser)]
#[command(
    name = "policy-report",
    version,
    about = "Render dependency policy violations as a markdown summary table"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON array of component reports as markdown
    Render {
        /// Path to the component reports JSON file, or `-` for stdin
        input: String,
        /// Headline the report as a failing policy check
        #[arg(long)]
        will_fail: bool,
        /// Table layout (transitive-guidance or upgrade-object)
        #[arg(long)]
        format: Option<ReportFormat>,
        /// Write the report to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Append to the output file instead of replacing it
        #[arg(long)]
        append: bool,
    },
    /// List supported table layouts and their headers
    Formats,
    /// Print the effective configuration as TOML
    Config,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Render {
            input,
            will_fail,
            format,
            output,
            append,
        } => {
            let service = ReportService::new()?;
            let options = RenderOptions {
                will_fail: will_fail.then_some(true),
                format,
            };
            let report = service.render_input(&input, options).await?;
            service
                .deliver(
                    &report,
                    DeliveryOptions {
                        path: output.as_deref(),
                        append: append.then_some(true),
                    },
                )
                .await?;
        }
        Commands::Formats => {
            for format in ReportFormat::ALL {
                let titles = format.header().lines().next().unwrap_or_default();
                println!("{format} ({} columns)", format.column_count());
                println!("  {titles}");
            }
        }
        Commands::Config => {
            let service = ReportService::new()?;
            println!("{}", toml::to_string_pretty(service.config())?);
        }
    }

    Ok(())
}
