use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use legiswatch_common::Config;
use legiswatch_monitor::pipeline::Monitor;
use legiswatch_monitor::report::{ReportWriter, RunSummary};
use legiswatch_monitor::stats::RunStats;

#[derive(Parser)]
#[command(name = "legiswatch", about = "Legislative monitoring and compliance alerts")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Validate configuration and exit
    CheckEnv,
    /// Search, process every bill, write the alert report and summary (default)
    Run {
        /// Directory for the JSON report and text summary
        #[arg(long)]
        reports_dir: Option<PathBuf>,
        /// Pause between upstream calls, in seconds
        #[arg(long)]
        rate_limit_secs: Option<f64>,
    },
    /// Run only the bill search and print the bills as JSON
    Search,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.json)?;

    let command = cli.command.unwrap_or(Command::Run {
        reports_dir: None,
        rate_limit_secs: None,
    });

    tokio::select! {
        result = execute(command) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Operation cancelled by user");
            Ok(())
        }
    }
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("legiswatch=info".parse()?);
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

async fn execute(command: Command) -> Result<()> {
    let mut config = Config::from_env()?;

    match command {
        Command::CheckEnv => {
            config.log_redacted();
            info!("All required environment variables are set");
        }
        Command::Search => {
            config.log_redacted();
            let monitor = Monitor::from_config(&config)?;
            let bills = monitor.search().await;
            println!("{}", serde_json::to_string_pretty(&bills)?);
        }
        Command::Run {
            reports_dir,
            rate_limit_secs,
        } => {
            if let Some(dir) = reports_dir {
                config.reports_dir = dir;
            }
            if let Some(secs) = rate_limit_secs {
                config.rate_limit_delay = Duration::try_from_secs_f64(secs)
                    .context("--rate-limit-secs must be a non-negative number")?;
            }
            config.log_redacted();

            let monitor = Monitor::from_config(&config)?;
            let outcomes = monitor.run().await?;

            let stats = RunStats::from_outcomes(&outcomes);
            info!("Run complete. {stats}");

            let writer = ReportWriter::new(&config.reports_dir);
            let paths = writer.write(&outcomes, chrono::Local::now())?;

            let summary = RunSummary::from_outcomes(&outcomes);
            info!(
                alerts = %paths.alerts.display(),
                summary = %paths.summary.display(),
                high_severity = summary.high_severity,
                medium_severity = summary.medium_severity,
                "Legislative monitoring workflow completed"
            );
        }
    }

    Ok(())
}
