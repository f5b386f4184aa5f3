//! CLI command definitions for mlfq-sched.
//!
//! This module provides the command-line interface for running the
//! scheduler simulation against a command file, executing single commands,
//! and inspecting how a command file is parsed.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::SchedulerError;
use crate::executor::{BuiltinExecutor, CommandExecutor};
use crate::monitor::{self, MonitorFormat, StateMonitor};
use crate::scheduler::{PromotionTimer, Scheduler, SchedulerConfig, SchedulerStats};
use crate::submission::{self, Submission, Submitter};

/// Default command source, relative to the working directory.
const DEFAULT_COMMAND_FILE: &str = "commands.txt";

/// Multilevel stacked-queue scheduler simulator.
#[derive(Parser)]
#[command(name = "mlfq-sched")]
#[command(about = "Simulate a multilevel priority-stacked process scheduler")]
#[command(version)]
#[command(
    long_about = "mlfq-sched dispatches textual commands from foreground and background submissions\nthrough a stacked multilevel queue with periodic promotion and level splitting.\n\nExample usage:\n  mlfq-sched run commands.txt --tick-ms 200 --submit-interval-ms 500 --drain"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the scheduler against a command file.
    Run(RunArgs),

    /// Execute one command with the built-in executor, without scheduling.
    Exec(ExecArgs),

    /// Show how a command file is split into processes.
    Parse(ParseArgs),
}

/// Arguments for `mlfq-sched run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Newline-delimited command file; `;` separates sub-commands, `&` marks background.
    #[arg(default_value = DEFAULT_COMMAND_FILE)]
    pub file: PathBuf,

    /// YAML configuration file.
    #[arg(short = 'c', long, env = "MLFQ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Upper bound on the dispatcher's idle wait, in milliseconds.
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Promotion cadence in milliseconds (0 disables).
    #[arg(long)]
    pub promote_interval_ms: Option<u64>,

    /// Maximum level size before a split.
    #[arg(long)]
    pub split_threshold: Option<usize>,

    /// Dispatch turns per process.
    #[arg(long)]
    pub bursts: Option<u32>,

    /// Sleep ticks between turns.
    #[arg(long)]
    pub period: Option<u32>,

    /// Delay between submissions in milliseconds.
    #[arg(long)]
    pub submit_interval_ms: Option<u64>,

    /// Monitor cadence in milliseconds (0 disables).
    #[arg(long)]
    pub monitor_interval_ms: Option<u64>,

    /// Wait for every process to finish before stopping.
    #[arg(long)]
    pub drain: bool,

    /// Emit monitor reports as JSON lines.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `mlfq-sched exec`.
#[derive(Parser, Debug)]
pub struct ExecArgs {
    /// The command and its arguments, e.g. `gcd 12 18`.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Arguments for `mlfq-sched parse`.
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Command file to parse.
    #[arg(default_value = DEFAULT_COMMAND_FILE)]
    pub file: PathBuf,

    /// Output JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

impl RunArgs {
    /// Resolves configuration: defaults, file, environment, then flags.
    pub fn resolve_config(&self) -> anyhow::Result<SchedulerConfig> {
        let base = match &self.config {
            Some(path) => SchedulerConfig::from_yaml_file(path).map_err(|e| {
                anyhow::anyhow!("Failed to load config '{}': {}", path.display(), e)
            })?,
            None => SchedulerConfig::default(),
        };
        let mut config = base.with_env_overrides()?;

        if let Some(v) = self.tick_ms {
            config.tick_ms = v;
        }
        if let Some(v) = self.promote_interval_ms {
            config.promote_interval_ms = v;
        }
        if let Some(v) = self.split_threshold {
            config.split_threshold = v;
        }
        if let Some(v) = self.bursts {
            config.default_bursts = v;
        }
        if let Some(v) = self.period {
            config.default_period = v;
        }
        if let Some(v) = self.submit_interval_ms {
            config.submit_interval_ms = v;
        }
        if let Some(v) = self.monitor_interval_ms {
            config.monitor_interval_ms = v;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parse CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
///
/// For more control over logging initialization, use `parse_cli()` and
/// `run_with_cli()`.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_simulation(args).await?,
        Commands::Exec(args) => run_exec_command(args).await?,
        Commands::Parse(args) => run_parse_command(args)?,
    }
    Ok(())
}

// ============================================================================
// Run Command Implementation
// ============================================================================

#[derive(Debug, Serialize)]
struct RunSummary {
    submitted: usize,
    remaining: usize,
    stats: SchedulerStats,
}

/// Background tasks of one simulation run: the dispatcher, the optional
/// state monitor and the optional promotion timer.
struct Simulation {
    scheduler: Arc<Scheduler>,
    dispatcher: JoinHandle<Result<(), SchedulerError>>,
    monitor: Option<StateMonitor>,
    promotion: Option<PromotionTimer>,
    format: MonitorFormat,
}

impl Simulation {
    fn start(
        config: SchedulerConfig,
        executor: Arc<dyn CommandExecutor>,
        format: MonitorFormat,
    ) -> anyhow::Result<Self> {
        let scheduler = Arc::new(Scheduler::new(config.clone())?);
        let dispatcher = scheduler.spawn(executor);

        let monitor = config
            .monitor_interval()
            .map(|interval| StateMonitor::start(Arc::clone(&scheduler), interval, format));
        let promotion = config
            .promote_interval()
            .map(|interval| PromotionTimer::start(Arc::clone(&scheduler), interval));

        Ok(Self {
            scheduler,
            dispatcher,
            monitor,
            promotion,
            format,
        })
    }

    /// Drives `workload` until it completes or Ctrl-C arrives, then tears
    /// everything down. Teardown runs whether or not the workload failed.
    async fn drive<F>(self, workload: F) -> anyhow::Result<usize>
    where
        F: Future<Output = anyhow::Result<usize>>,
    {
        let outcome = tokio::select! {
            result = workload => result,
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, stopping scheduler");
                Ok(0)
            }
        };
        if let Err(e) = &outcome {
            error!(error = %e, "Workload failed, stopping scheduler");
        }

        let shutdown = self.shutdown().await;
        let submitted = outcome?;
        shutdown?;
        Ok(submitted)
    }

    async fn shutdown(self) -> anyhow::Result<()> {
        self.scheduler.stop();
        let dispatched = self
            .dispatcher
            .await
            .map_err(|e| anyhow::anyhow!("Dispatcher task panicked: {}", e));

        if let Some(timer) = self.promotion {
            timer.stop().await;
        }
        if let Some(monitor) = self.monitor {
            monitor.stop().await;
        }

        print!("{}", monitor::report(&self.scheduler, self.format));
        dispatched??;
        Ok(())
    }
}

async fn run_simulation(args: RunArgs) -> anyhow::Result<()> {
    let config = args.resolve_config()?;
    let format = if args.json {
        MonitorFormat::Json
    } else {
        MonitorFormat::Text
    };

    info!(file = %args.file.display(), config = ?config, "Starting scheduler");

    let executor: Arc<dyn CommandExecutor> = Arc::new(BuiltinExecutor::stdout());
    let simulation = Simulation::start(config.clone(), executor, format)?;
    let scheduler = Arc::clone(&simulation.scheduler);

    let submitter = Submitter::new(&args.file, config.submit_interval());
    let drain = args.drain;
    let workload = {
        let scheduler = Arc::clone(&scheduler);
        async move {
            let submitted = submitter.run(Arc::clone(&scheduler)).await?;
            if drain {
                scheduler.wait_until_drained().await;
            }
            Ok::<usize, anyhow::Error>(submitted)
        }
    };

    let submitted = simulation.drive(workload).await?;

    let summary = RunSummary {
        submitted,
        remaining: scheduler.live_count(),
        stats: scheduler.stats(),
    };
    info!(
        submitted = summary.submitted,
        remaining = summary.remaining,
        dispatched = summary.stats.dispatched,
        completed = summary.stats.completed,
        promotions = summary.stats.promotions,
        splits = summary.stats.splits,
        "Simulation finished"
    );
    if args.json {
        let json = serde_json::to_string(&summary)
            .map_err(|e| anyhow::anyhow!("Failed to serialize JSON output: {}", e))?;
        println!("{}", json);
    }

    Ok(())
}

// ============================================================================
// Exec / Parse Command Implementation
// ============================================================================

async fn run_exec_command(args: ExecArgs) -> anyhow::Result<()> {
    let tokens: Vec<String> = args
        .command
        .iter()
        .flat_map(|part| part.split_whitespace())
        .map(str::to_string)
        .collect();

    BuiltinExecutor::stdout().execute(&tokens).await?;
    Ok(())
}

fn run_parse_command(args: ParseArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .map_err(|e| anyhow::anyhow!("Failed to read '{}': {}", args.file.display(), e))?;
    let submissions: Vec<Submission> = submission::parse_source(&text);

    if args.json {
        let json = serde_json::to_string_pretty(&submissions)
            .map_err(|e| anyhow::anyhow!("Failed to serialize JSON output: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    for (index, s) in submissions.iter().enumerate() {
        println!("{:>4} {} {}", index, s.class.tag(), s.command);
    }
    println!("{} processes", submissions.len());
    Ok(())
}
