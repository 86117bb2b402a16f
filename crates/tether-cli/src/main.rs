//! Tether - dependency-ordered contract deployment
//!
//! Usage:
//!   tether init                      # Write ./tether.toml
//!   tether plan --network emulator   # Show deployment order
//!   tether deploy --network emulator # Deploy all contracts

mod interactive;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tether_core::commands::{
    DeployCommand, DeployOptions, InitCommand, InitOptions, PlanCommand, PlanOptions, PlanReport,
};
use tether_core::config::ConfigScope;
use tether_core::deploy::{DeploymentReport, RunStatus, UnitStatus};
use tether_core::guard::{AcceptAll, DeclineAll, StandardContractPrompt};

use crate::interactive::TerminalPrompt;

#[derive(Parser)]
#[command(name = "tether")]
#[command(about = "Deploy interdependent contracts in dependency order", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a tether.toml with the default networks
    Init {
        /// Write the global configuration instead of ./tether.toml
        #[arg(short = 'g', long)]
        global: bool,

        /// Overwrite an existing configuration
        #[arg(long)]
        reset: bool,
    },

    /// Show the order contracts would be deployed in, without network access
    Plan {
        /// Network to plan for
        #[arg(short, long, default_value = "emulator")]
        network: String,

        /// Use existing standard contracts on mainnet instead of planning copies
        #[arg(short, long)]
        yes: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        output: OutputFormat,
    },

    /// Deploy every contract configured for a network
    Deploy {
        /// Network to deploy to
        #[arg(short, long, default_value = "emulator")]
        network: String,

        /// Update contracts that already exist with different code
        #[arg(short, long)]
        update: bool,

        /// Account paying for every transaction
        #[arg(long)]
        payer: Option<String>,

        /// Use existing standard contracts on mainnet without asking
        #[arg(short, long)]
        yes: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        output: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// Only show failures
    Quiet,
}

fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tether=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { global, reset } => run_init(global, reset),
        Commands::Plan {
            network,
            yes,
            output,
        } => run_plan(network, yes, output),
        Commands::Deploy {
            network,
            update,
            payer,
            yes,
            output,
        } => run_deploy(network, update, payer, yes, output),
    }
}

fn run_init(global: bool, reset: bool) -> Result<()> {
    let scope = if global {
        ConfigScope::Global
    } else {
        ConfigScope::Project
    };
    let options = InitOptions::default().with_scope(scope).with_reset(reset);
    let report = InitCommand::with_defaults()?.execute(&options)?;

    if report.overwritten {
        println!("✓ Reset configuration at {}", report.path.display());
    } else {
        println!("✓ Created configuration at {}", report.path.display());
    }
    println!("  Add accounts, contracts and deployments, then run 'tether deploy'.");
    Ok(())
}

fn run_plan(network: String, yes: bool, output: OutputFormat) -> Result<()> {
    let prompt: &dyn StandardContractPrompt = if yes { &AcceptAll } else { &DeclineAll };
    let report = PlanCommand::with_defaults()?.execute(&PlanOptions::new(network), prompt)?;

    match output {
        OutputFormat::Table => print_plan_table(&report),
        OutputFormat::Json => print_plan_json(&report)?,
        OutputFormat::Quiet => {}
    }
    Ok(())
}

fn print_plan_table(report: &PlanReport) {
    println!(
        "Deployment order for {} ({} contracts)",
        style(&report.network).bold(),
        report.entries.len()
    );
    println!("{}", "-".repeat(70));
    for (i, entry) in report.entries.iter().enumerate() {
        let imports = if entry.dependencies.is_empty() {
            String::new()
        } else {
            format!("  imports {}", entry.dependencies.join(", "))
        };
        println!(
            "{:>3}. {:<24} {} ({}){}",
            i + 1,
            entry.contract,
            entry.address,
            entry.account,
            style(imports).dim()
        );
    }
}

fn print_plan_json(report: &PlanReport) -> Result<()> {
    let entries: Vec<_> = report
        .entries
        .iter()
        .map(|entry| {
            serde_json::json!({
                "contract": entry.contract,
                "account": entry.account,
                "address": entry.address.to_string(),
                "dependencies": entry.dependencies,
                "has_args": entry.has_args,
            })
        })
        .collect();
    let output = serde_json::json!({
        "network": report.network,
        "plan": entries,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_deploy(
    network: String,
    update: bool,
    payer: Option<String>,
    yes: bool,
    output: OutputFormat,
) -> Result<()> {
    let mut options = DeployOptions::new(network).with_update(update);
    if let Some(payer) = payer {
        options = options.with_payer(payer);
    }

    let prompt = TerminalPrompt::new(yes);
    let report = DeployCommand::with_defaults()?.execute(&options, &prompt)?;

    match output {
        OutputFormat::Table => print_deploy_table(&report),
        OutputFormat::Json => print_deploy_json(&report)?,
        OutputFormat::Quiet => {
            for outcome in report.failures() {
                println!("{}", outcome.describe());
            }
        }
    }

    if !report.is_success() {
        tracing::error!(
            network = %report.network,
            failed = report.failed(),
            "failed to deploy all contracts"
        );
        anyhow::bail!("failed to deploy all contracts");
    }
    Ok(())
}

fn print_deploy_table(report: &DeploymentReport) {
    println!(
        "Deploying {} contracts to {}",
        report.len(),
        style(&report.network).bold()
    );
    println!("{}", "-".repeat(70));

    for outcome in &report.outcomes {
        let marker = match &outcome.status {
            UnitStatus::Deployed | UnitStatus::Updated => style("✓").green(),
            UnitStatus::SkippedNoDiff => style("•").dim(),
            UnitStatus::Failed(_) => style("✗").red(),
        };
        println!("{} {}", marker, outcome.describe());
        if let Some(tx_id) = &outcome.tx_id {
            println!("  tx {}", style(tx_id).dim());
        }
    }

    println!();
    let summary = format!(
        "{} deployed, {} updated, {} skipped, {} failed",
        report.deployed(),
        report.updates(),
        report.skipped(),
        report.failed()
    );
    match report.status() {
        RunStatus::FullySucceeded => {
            println!("{} All contracts deployed: {}", style("✓").green(), summary)
        }
        RunStatus::SucceededWithSkips => {
            println!("{} Deployment complete: {}", style("✓").green(), summary)
        }
        RunStatus::CompletedWithFailures => println!("{} {}", style("✗").red(), summary),
    }
}

fn print_deploy_json(report: &DeploymentReport) -> Result<()> {
    let outcomes: Vec<_> = report
        .outcomes
        .iter()
        .map(|outcome| {
            serde_json::json!({
                "contract": outcome.contract,
                "account": outcome.account,
                "address": outcome.address.to_string(),
                "status": outcome.status.label(),
                "stage": outcome.stage.to_string(),
                "failed_after": outcome.failed_after.map(|s| s.to_string()),
                "tx_id": outcome.tx_id.as_ref().map(|t| t.to_string()),
                "error": outcome.failure().map(|f| f.to_string()),
            })
        })
        .collect();
    let output = serde_json::json!({
        "network": report.network,
        "started_at": report.started_at.to_rfc3339(),
        "success": report.is_success(),
        "updates": report.updates(),
        "outcomes": outcomes,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
