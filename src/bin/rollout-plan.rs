//! # Rollout Plan Inspector
//!
//! Validates a platform configuration file and prints the resolved deployment
//! targets and their wave plans, including every approval gate, without
//! touching any infrastructure.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use platform_rollout::config::ConfigManager;
use platform_rollout::logging::{init_structured_logging, LogFormat};
use platform_rollout::orchestration::{validate_plan, TargetPlan, TargetResolver, WavePlanner};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "rollout-plan")]
#[command(about = "Inspect rollout targets and wave plans for a platform configuration")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file (default: config/rollout.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every wave of every target with its gates (default)
    Plan,
    /// Print resolved targets only
    Targets,
    /// Print the loaded configuration with account ids masked
    Config,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose > 0 {
        std::env::set_var(
            "RUST_LOG",
            match cli.verbose {
                1 => "info",
                2 => "debug",
                _ => "trace",
            },
        );
        init_structured_logging("development", LogFormat::Pretty);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "rollout-plan failed");
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let manager = ConfigManager::load(cli.config.as_deref()).context("invalid configuration")?;
    let config = manager.config();

    match cli.command.as_ref().unwrap_or(&Commands::Plan) {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&manager.sanitized())?);
        }
        Commands::Targets => {
            let targets = TargetResolver::from_config(config)?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&targets)?),
                OutputFormat::Table => {
                    println!("{:<28} {:<16} {:<8} {:<18}", "TARGET", "ENVIRONMENT", "PRIMARY", "MODE");
                    for target in &targets {
                        println!(
                            "{:<28} {:<16} {:<8} {:<18}",
                            target.id(),
                            target.environment,
                            target.region.is_primary,
                            config.mode_for(&target.region.name).to_string()
                        );
                    }
                }
            }
        }
        Commands::Plan => {
            let planner = WavePlanner::new(config.resource_groups.clone())?;
            let plans = TargetResolver::from_config(config)?
                .iter()
                .map(|target| {
                    let plan = planner.plan(target, config.mode_for(&target.region.name));
                    validate_plan(&plan)?;
                    Ok(plan)
                })
                .collect::<platform_rollout::Result<Vec<TargetPlan>>>()?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plans)?),
                OutputFormat::Table => print_plans(&plans),
            }
        }
    }

    Ok(())
}

fn print_plans(plans: &[TargetPlan]) {
    for plan in plans {
        println!("\n🎯 {} ({})", plan.target_id(), plan.mode);
        println!("  {:<3} {:<15} {:<36} GATES", "#", "WAVE", "GROUPS");
        for wave in &plan.waves {
            let gates = wave.manual_gate_ids();
            println!(
                "  {:<3} {:<15} {:<36} {}",
                wave.index,
                wave.name(),
                wave.group_ids().join(", "),
                if gates.is_empty() {
                    "open".to_string()
                } else {
                    gates.join(", ")
                }
            );
        }
    }
}
