//! fleetprobe CLI
//!
//! Polls a fleet of targets for their service and artefact status,
//! assembles the dependency graph and publishes the result.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use eyre::eyre;
use kameo::actor::Spawn;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use fleetprobe_api::summary::TargetSummary;
use fleetprobe_core::{
    CollectStatus, FleetStatus, ListTargets, OrchestratorActor, OrchestratorActorArgs,
    RegisterTarget,
};
use fleetprobe_publish::{BusPublisher, StateStore};

mod config;
mod factory;

use config::Config;
use factory::DefaultRunnerFactory;

#[derive(Parser)]
#[command(name = "fleetprobe")]
#[command(about = "Fleet status poller and dependency graph assembler", long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the fleet and print the assembled status
    Status {
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        /// Only poll targets carrying this tag (repeatable, any match)
        #[arg(long)]
        tag: Vec<String>,
        /// Skip state files and the notification bus
        #[arg(long)]
        no_publish: bool,
    },
    /// List configured targets
    Targets {
        /// Print targets as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Logs go to stderr so JSON output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    match cli.command {
        Commands::Status {
            json,
            tag,
            no_publish,
        } => run_status(config, json, tag, no_publish).await,
        Commands::Targets { json } => run_targets(config, json).await,
    }
}

async fn run_status(
    config: Config,
    json: bool,
    tags: Vec<String>,
    no_publish: bool,
) -> Result<()> {
    let targets: Vec<_> = config
        .target
        .into_iter()
        .filter(|t| tags.is_empty() || t.tags.iter().any(|tag| tags.contains(tag)))
        .collect();

    if targets.is_empty() {
        return Err(eyre!("no targets configured (or none match the tag filter)"));
    }

    let (event_tx, _) = broadcast::channel(1024);

    // Attach the bus forwarder before any actor emits events
    let forwarder = match (&config.publisher.bus_url, no_publish) {
        (Some(url), false) => {
            let publisher = BusPublisher::new(url)?;
            Some(publisher.spawn_forwarder(event_tx.subscribe()))
        }
        _ => None,
    };

    let orchestrator = OrchestratorActor::spawn(OrchestratorActorArgs {
        event_tx: event_tx.clone(),
        runner_factory: Arc::new(DefaultRunnerFactory::new()),
        poller: config.poller,
        probes: config.probe,
    });

    for target in targets {
        let name = target.name.clone();
        orchestrator
            .ask(RegisterTarget { config: target })
            .await
            .map_err(|e| eyre!("failed to register target {name}: {e}"))?;
    }

    let status = orchestrator
        .ask(CollectStatus)
        .await
        .map_err(|e| eyre!("status collection failed: {e}"))?;

    if !no_publish {
        let store = StateStore::new(&config.publisher.state_dir);
        store.publish(&status.pool, &status.summary()).await?;
    }

    if json {
        print_json(&status)?;
    } else {
        print_table(&status);
    }

    let failed = status.unreachable > 0;

    orchestrator.stop_gracefully().await.ok();
    drop(event_tx);
    if let Some(handle) = forwarder {
        tokio::time::timeout(Duration::from_secs(5), handle).await.ok();
    }

    if failed {
        std::process::exit(1);
    }

    Ok(())
}

async fn run_targets(config: Config, json: bool) -> Result<()> {
    let (event_tx, _) = broadcast::channel(1024);

    let orchestrator = OrchestratorActor::spawn(OrchestratorActorArgs {
        event_tx,
        runner_factory: Arc::new(DefaultRunnerFactory::new()),
        poller: config.poller,
        probes: config.probe,
    });

    for target in config.target {
        let name = target.name.clone();
        orchestrator
            .ask(RegisterTarget { config: target })
            .await
            .map_err(|e| eyre!("failed to register target {name}: {e}"))?;
    }

    let targets = orchestrator
        .ask(ListTargets)
        .await
        .map_err(|e| eyre!("failed to list targets: {e}"))?;

    if json {
        let summaries: Vec<TargetSummary> = targets
            .iter()
            .map(|t| TargetSummary {
                name: t.name.clone(),
                addr: t.addr.clone(),
                state: t.state.to_string(),
                tags: t.tags.clone(),
                last_polled: t.last_polled,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!("{:<20} {:<20} {:<12} TAGS", "NAME", "ADDR", "STATE");
        for target in &targets {
            println!(
                "{:<20} {:<20} {:<12} {}",
                target.name,
                target.addr,
                target.state.to_string(),
                target.tags.join(",")
            );
        }
    }

    orchestrator.stop_gracefully().await.ok();

    Ok(())
}

fn print_json(status: &FleetStatus) -> Result<()> {
    let value = serde_json::json!({
        "summary": status.summary(),
        "components": status.pool,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_table(status: &FleetStatus) {
    println!("{:<10} {:<50} SCORE", "STATE", "URI");
    for (uri, component) in &status.pool {
        println!(
            "{:<10} {:<50} {}",
            component.state().to_string(),
            uri.to_string(),
            component.dependency_score()
        );
    }

    let summary = status.summary();
    println!();
    println!(
        "{}/{} targets reachable, {} components",
        summary.reachable, summary.targets, summary.components
    );
}
