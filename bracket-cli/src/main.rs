//! Bracket CLI
//!
//! Generates single-elimination brackets for tournaments and records match
//! results against the bracket database.

mod config;
mod shutdown;

use bracket_core::bracket::MatchResult;
use bracket_core::config::{RelayConfig, RuntimeConfig};
use bracket_core::events::{BracketEventSender, bracket_event_channel};
use bracket_core::framework::DatabaseProcessor;
use bracket_core::participants::HttpParticipantSource;
use bracket_core::processors::EventRelay;
use bracket_core::store::{BracketStore, MemoryProcessor};
use bracket_core::{BracketError, BracketService};
use clap::{Parser, Subcommand};
use config::{ConfigLoader, Overrides, get_database_url};
use serde::Serialize;
use shutdown::shutdown_signal;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;
use uuid::Uuid;

/// Single-elimination bracket service
#[derive(Parser, Debug)]
#[command(name = "bracket-cli")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file [default: ./bracket-config.toml, if present]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the tournament service base URL
    #[arg(long, env = "TOURNAMENT_SERVICE_URL", global = true)]
    tournament_service_url: Option<Url>,

    /// Fix the shuffle seed for reproducible brackets
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Abort the command after this many seconds; an unfinished write is rolled back
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..), global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run database migrations
    Migrate,
    /// Generate the bracket of a tournament
    Generate {
        #[arg(long)]
        tournament: Uuid,
        /// Plan in memory and print the bracket instead of storing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the bracket of a tournament, final first
    Show {
        #[arg(long)]
        tournament: Uuid,
    },
    /// Record the result of a match and advance its winner
    Result {
        #[arg(long = "match")]
        match_id: Uuid,
        #[arg(long)]
        score_a: u32,
        #[arg(long)]
        score_b: u32,
        #[arg(long)]
        winner: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    tracing::debug!("Starting bracket-cli v{}", env!("CARGO_PKG_VERSION"));

    let timeout = Duration::from_secs(args.timeout);
    let overrides = Overrides {
        tournament_service_url: args.tournament_service_url.clone(),
        seed: args.seed,
    };
    let loader = ConfigLoader::new(args.config.as_deref(), overrides);

    match args.command {
        Command::Migrate => {
            let pool = connect().await?;
            tracing::info!("Running database migrations...");
            sqlx::migrate!("../migrations").run(&pool).await.map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
            tracing::info!("Migrations completed successfully");
            pool.close().await;
        }
        Command::Generate {
            tournament,
            dry_run: true,
        } => {
            let config = loader.load()?;
            // Dry runs never reach the relay endpoint.
            let session = Session::start(MemoryProcessor::new(), &config, RelayConfig::default())?;
            let outcome = bounded(timeout, async {
                session.service.generate_bracket(tournament).await?;
                session.service.get_bracket(tournament).await
            })
            .await;
            session.finish(outcome.is_err()).await;
            print_json(&outcome?)?;
        }
        Command::Generate {
            tournament,
            dry_run: false,
        } => {
            let config = loader.load()?;
            let pool = connect().await?;
            let session = Session::start(DatabaseProcessor::new(pool.clone()), &config, config.relay.clone())?;
            let outcome = bounded(timeout, session.service.generate_bracket(tournament)).await;
            session.finish(outcome.is_err()).await;
            pool.close().await;
            print_json(&outcome?)?;
        }
        Command::Show { tournament } => {
            let config = loader.load()?;
            let pool = connect().await?;
            let session = Session::start(DatabaseProcessor::new(pool.clone()), &config, config.relay.clone())?;
            let outcome = bounded(timeout, session.service.get_bracket(tournament)).await;
            session.finish(outcome.is_err()).await;
            pool.close().await;
            print_json(&outcome?)?;
        }
        Command::Result {
            match_id,
            score_a,
            score_b,
            winner,
        } => {
            let config = loader.load()?;
            let pool = connect().await?;
            let session = Session::start(DatabaseProcessor::new(pool.clone()), &config, config.relay.clone())?;
            let result = MatchResult {
                score_a,
                score_b,
                winner_id: winner,
            };
            let outcome = bounded(timeout, session.service.update_match_result(match_id, result)).await;
            session.finish(outcome.is_err()).await;
            pool.close().await;
            print_json(&outcome?)?;
        }
    }

    Ok(())
}

type CliService<S> = BracketService<S, HttpParticipantSource, BracketEventSender>;

/// A service plus the relay draining its events.
struct Session<S> {
    service: CliService<S>,
    relay: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl<S: BracketStore> Session<S> {
    fn start(store: S, config: &RuntimeConfig, relay_config: RelayConfig) -> anyhow::Result<Self> {
        let participants = HttpParticipantSource::new(&config.upstream)?;
        let (event_tx, event_rx) = bracket_event_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let relay = tokio::spawn(EventRelay::new(relay_config, event_rx, shutdown_rx).run());

        let service = BracketService::with_options(
            store,
            participants,
            event_tx,
            config.bracket.builder_options(),
            config.bracket.seed,
        );

        Ok(Self {
            service,
            relay,
            shutdown_tx,
        })
    }

    /// Drop the service and wait for the relay. Queued events are still
    /// delivered unless `abort` is set.
    async fn finish(self, abort: bool) {
        let Session {
            service,
            relay,
            shutdown_tx,
        } = self;
        drop(service);

        if abort {
            let _ = shutdown_tx.send(true);
        }
        if let Err(e) = relay.await {
            tracing::error!("Event relay task failed: {}", e);
        }
    }
}

/// Run `command` until it finishes, the timeout elapses or a shutdown signal
/// arrives. Dropping the command future rolls back its open transaction.
async fn bounded<T>(
    timeout: Duration,
    command: impl Future<Output = Result<T, BracketError>>,
) -> anyhow::Result<T> {
    tokio::select! {
        outcome = tokio::time::timeout(timeout, command) => match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::error!(kind = %e.kind(), error = %e, "Command failed");
                Err(e.into())
            }
            Err(_) => anyhow::bail!("command timed out after {}s", timeout.as_secs()),
        },
        signal = shutdown_signal() => {
            signal?;
            anyhow::bail!("command interrupted")
        }
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    tracing::debug!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    Ok(pool)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// Logs go to stderr so stdout carries only command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
