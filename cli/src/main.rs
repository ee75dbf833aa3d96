//! CLI entrypoint for agora
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use agora_application::{
    CollectiveCoordinator, ConsultInput, ConsultationOrchestrator, ConsultationProgress,
    EventBus, EventJournal, LifecycleController, NoProgress,
};
use agora_domain::{AgentId, LifecycleState, Model, Query, RoleRegistry};
use agora_infrastructure::{
    ChannelEventBus, ConfigLoader, FileConfig, HttpLlmGateway, JsonlEventJournal,
};
use agora_presentation::{
    Cli, Command, ConsoleFormatter, ConsultArgs, OutputFormat, ProgressReporter, SimpleProgress,
    SimulateArgs,
};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(&cli);

    info!("Starting agora");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    match &cli.command {
        Command::Consult(args) => consult(&cli, &config, args).await,
        Command::Roles { query } => {
            let registry = RoleRegistry::builtin();
            let query = query.as_deref().and_then(Query::try_new);
            print!(
                "{}",
                ConsoleFormatter::format_roles(registry.roles(), query.as_ref())
            );
            Ok(())
        }
        Command::Simulate(args) => simulate(&config, args),
        Command::ShowConfig => {
            for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
                println!("{}", line);
            }
            println!();
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// Initialize logging based on verbosity level.
///
/// `RUST_LOG` takes precedence over `-v`. With `--log-dir`, logs are also
/// written to a daily rolling file; the returned guard flushes it on exit.
fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "agora.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

/// Event bus and journal shared by the lifecycle and consultation sides
fn event_plumbing(config: &FileConfig) -> (Arc<dyn EventBus>, Option<Arc<dyn EventJournal>>) {
    let bus: Arc<dyn EventBus> = Arc::new(ChannelEventBus::new());
    let journal = config
        .journal
        .resolved_path()
        .and_then(JsonlEventJournal::open)
        .map(|journal| {
            info!("Journaling events to {}", journal.path().display());
            Arc::new(journal) as Arc<dyn EventJournal>
        });
    (bus, journal)
}

fn lifecycle(
    config: &FileConfig,
    bus: Arc<dyn EventBus>,
    journal: Option<Arc<dyn EventJournal>>,
) -> Result<Arc<LifecycleController>> {
    let mut coordinator =
        CollectiveCoordinator::new(config.collective.to_collective_config()).with_event_bus(bus);
    if let Some(journal) = journal {
        coordinator = coordinator.with_journal(journal);
    }
    Ok(Arc::new(LifecycleController::new(
        config.lifecycle.to_lifecycle_config()?,
        Arc::new(coordinator),
    )))
}

async fn consult(cli: &Cli, config: &FileConfig, args: &ConsultArgs) -> Result<()> {
    let Some(query) = Query::try_new(args.query.as_str()) else {
        bail!("Query must not be empty");
    };

    // CLI flags override the configured parameters
    let mut params = config.consultation.to_params()?;
    if let Some(rounds) = args.rounds {
        params = params.with_rounds(rounds);
    }
    if let Some(secs) = args.role_timeout {
        if secs == 0 {
            bail!("--role-timeout must be positive");
        }
        params = params.with_role_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = args.budget {
        if secs == 0 {
            bail!("--budget must be positive");
        }
        params = params.with_session_budget(Duration::from_secs(secs));
    }
    if let Some(moderator) = &args.moderator {
        params = params.with_moderator(Model::new(moderator.as_str()));
    }

    let registry = RoleRegistry::builtin();
    let requested = if args.role.is_empty() {
        &config.consultation.roles
    } else {
        &args.role
    };
    let roles = if requested.is_empty() {
        registry.select(&query, params.max_roles)
    } else {
        registry.pick(requested.as_slice())?
    };

    // === Dependency Injection ===
    let (bus, journal) = event_plumbing(config);
    let gateway = Arc::new(
        HttpLlmGateway::new(
            config.gateway.endpoint.as_str(),
            config.gateway.default_model.clone(),
        )
        .with_api_key(config.gateway.api_key()),
    );
    let mut orchestrator = ConsultationOrchestrator::new(gateway)
        .with_lifecycle(lifecycle(config, bus.clone(), journal.clone())?)
        .with_event_bus(bus);
    if let Some(journal) = journal {
        orchestrator = orchestrator.with_journal(journal);
    }

    if !cli.quiet {
        let titles: Vec<&str> = roles.iter().map(|r| r.title.as_str()).collect();
        eprintln!("Question: {}", query);
        eprintln!("Roles: {}", titles.join(", "));
        eprintln!();
    }

    let progress: Box<dyn ConsultationProgress> = match (cli.quiet, args.output) {
        (true, _) => Box::new(NoProgress),
        (false, OutputFormat::Json) => Box::new(SimpleProgress),
        (false, _) => Box::new(ProgressReporter::new()),
    };

    let input = ConsultInput::new(query, roles).with_params(params);
    let consultation = orchestrator.consult_with_progress(input, progress.as_ref());
    tokio::pin!(consultation);

    // Ctrl-C compiles whatever the roles produced so far
    let report = tokio::select! {
        result = &mut consultation => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; compiling partial report");
            for session_id in orchestrator.active_sessions() {
                orchestrator.cancel_consultation(&session_id);
            }
            consultation.await?
        }
    };

    let output = match args.output {
        OutputFormat::Full => ConsoleFormatter::format(&report),
        OutputFormat::Summary => ConsoleFormatter::format_summary(&report),
        OutputFormat::Json => ConsoleFormatter::format_json(&report),
    };
    println!("{}", output);

    Ok(())
}

fn simulate(config: &FileConfig, args: &SimulateArgs) -> Result<()> {
    let states = args
        .states
        .iter()
        .map(|s| s.parse::<LifecycleState>())
        .collect::<Result<Vec<_>, _>>()?;

    let (bus, journal) = event_plumbing(config);
    let controller = lifecycle(config, bus, journal)?;
    let agent_id = AgentId::new(args.agent.as_str());

    controller.register(agent_id.clone(), &args.agent_type);
    if let Some(fracture) = args.fracture {
        controller.set_fracture(&agent_id, fracture)?;
    }
    println!("{}", ConsoleFormatter::format_agent(&controller.get_state(&agent_id)?));

    for state in states {
        match controller.transition(&agent_id, state) {
            Ok(_) => {
                let record = controller.get_state(&agent_id)?;
                if let Some(last) = record.last_transition() {
                    println!("{}", ConsoleFormatter::format_transition(last));
                }
            }
            Err(e) => println!("  rejected: {}", e),
        }
    }

    println!("{}", ConsoleFormatter::format_agent(&controller.get_state(&agent_id)?));
    Ok(())
}
