//! Conclave CLI - sequences LLM agents through a configurable council pipeline.
//!
//! Loads and validates the council configuration, probes the Ollama serving
//! endpoint, runs the pipeline for one operator task, and prints the final
//! decision plus elapsed time. Exits 0 on success and 1 on any fatal error.

use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{error, warn, Level};
use tracing_subscriber::FmtSubscriber;

use conclave_core::CouncilConfig;
use conclave_models::OllamaHealth;
use conclave_orchestrator::{create_agents, PipelineRunner, DEFAULT_TERMINATION_COUNT};

/// Conclave - multi-stage agent council over Ollama
#[derive(Parser, Debug)]
#[command(
    name = "conclave",
    version,
    about = "Sequence LLM agents through a configurable council pipeline"
)]
struct Args {
    /// Path to the council configuration file
    #[arg(short, long, default_value = "configs/agents_config.yaml")]
    config: PathBuf,

    /// Task for the agents; prompts on stdin when omitted
    #[arg(short, long)]
    task: Option<String>,

    /// Maximum messages emitted by a multi-agent stage
    #[arg(long, default_value_t = DEFAULT_TERMINATION_COUNT)]
    termination_count: usize,

    /// Directory for session transcripts
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Skip the readiness probe against the serving endpoint
    #[arg(long)]
    skip_health_check: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(&args.log_level);

    // Single top-level handler decides the exit code.
    if let Err(e) = run(args).await {
        error!(error = %e, "run failed");
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to initialize logging: {e}");
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = CouncilConfig::load(&args.config)?;
    config.validate()?;
    println!("{}", "Configuration validation passed".green());

    if args.skip_health_check {
        warn!("skipping readiness probe");
    } else {
        let health = OllamaHealth::new(config.llm_basic_settings.base_url.clone());
        health.ensure_ready(&config.model_names()).await?;
        println!("{}", "Model service is ready".green());
    }

    let agents = create_agents(&config);

    let task = match args.task {
        Some(task) => task,
        None => prompt_for_task()?,
    };

    let runner = PipelineRunner::new()
        .with_termination_count(args.termination_count)
        .with_log_dir(args.log_dir);
    let run = runner.run(&task, &agents, &config.pipeline).await?;

    if let Some(path) = &run.log_path {
        println!("{} {}", "Full discussion log saved to".green(), path.display());
    }
    println!("\n{}", run.final_output);
    println!("Elapsed time: {:.2} seconds", run.session.elapsed.as_secs_f64());

    Ok(())
}

fn prompt_for_task() -> anyhow::Result<String> {
    print!("Enter the task for the agents: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let task = line.trim().to_string();
    if task.is_empty() {
        anyhow::bail!("no task provided; enter a task or pass one with --task");
    }
    Ok(task)
}
