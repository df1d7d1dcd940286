use clap::Parser;
use intentline_demo::cli::{Cli, Commands};
use intentline_demo::report::{CommandReport, RunSummary};
use intentline_demo::runner::{build_processor, classify_commands, read_commands, run_commands};
use intentline_engine::{ExecutionBackend, InMemoryBackend, Scenario};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    intentline_telemetry::describe_metrics();

    match cli.command {
        Commands::Run {
            commands,
            pipeline,
            failure_rate,
            error_rate,
            latency_ms,
            seed,
            session,
        } => {
            init_logging(pipeline.verbose);

            let backend = Arc::new(match seed {
                Some(seed) => InMemoryBackend::with_seed(seed),
                None => InMemoryBackend::new(),
            });
            backend.set_custom_scenario(Scenario {
                failure_rate,
                error_rate,
                latency_ms,
            });

            let processor =
                build_processor(&pipeline, Some(backend as Arc<dyn ExecutionBackend>))?;
            let commands = read_commands(commands, std::io::stdin().lock())?;

            let reports =
                run_commands(&processor, &commands, pipeline.priority, session.as_deref()).await?;
            print_reports(&reports)?;

            let summary = RunSummary::new(commands.len(), processor.metrics_snapshot());
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Classify { commands, pipeline } => {
            init_logging(pipeline.verbose);

            let processor = build_processor(&pipeline, None)?;
            let commands = read_commands(commands, std::io::stdin().lock())?;

            let reports = classify_commands(&processor, &commands, pipeline.priority)?;
            print_reports(&reports)?;
        }
    }

    Ok(())
}

fn print_reports(reports: &[CommandReport]) -> anyhow::Result<()> {
    for report in reports {
        println!("{}", serde_json::to_string(report)?);
    }
    Ok(())
}

fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "intentline_demo=debug,intentline_engine=debug,intentline_classifiers=debug,intentline_telemetry=debug"
    } else {
        "intentline_demo=info,intentline_engine=warn,intentline_classifiers=warn,intentline_telemetry=info"
    }
}

fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_log_filter(verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
