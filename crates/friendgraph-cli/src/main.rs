use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use friendgraph_core::{
    ConfigManager, FriendGraphConfig, FriendGraphError, FriendList, FriendProfile, UserId,
};
use friendgraph_graph::{FriendQueryEngine, GraphFixture, InMemoryEdgeStore};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "friendgraph")]
#[command(about = "FriendGraph CLI - friend counts, mutual friends and friend lists", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// JSON fixture with users and friendships
    #[arg(long, global = true, env = "FRIENDGRAPH_FIXTURE")]
    fixture: Option<PathBuf>,

    /// Explicit config file instead of .friendgraph.toml discovery
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Load friendship rows exactly as written, without adding transposes
    #[arg(long, global = true)]
    raw: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile of a friend as seen by the viewer
    Profile {
        /// Requesting user
        viewer: UserId,
        /// Friend to look up
        friend: UserId,
    },

    /// All accepted friends of the viewer
    Friends {
        /// Requesting user
        viewer: UserId,
    },

    /// Mutual friend counts between the viewer and each candidate
    Mutual {
        viewer: UserId,
        #[arg(required = true)]
        candidates: Vec<UserId>,
    },

    /// Friend counts for several users at once
    Degree {
        #[arg(required = true)]
        users: Vec<UserId>,
    },

    /// Write a default config file
    InitConfig {
        #[arg(default_value = ".friendgraph.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::from_file(path),
        None => ConfigManager::load(),
    }
    .context("Failed to load configuration")?;
    let config = manager.config().clone();

    init_tracing(&config, cli.verbose);

    match run(&cli, &config).await {
        Ok(output) => {
            print_output(&cli.output, &output)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            let code = match e.downcast_ref::<FriendGraphError>() {
                Some(err) if err.is_not_found() => 2,
                _ => 1,
            };
            std::process::exit(code);
        }
    }
}

fn init_tracing(config: &FriendGraphConfig, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "friendgraph={level},friendgraph_graph={level},friendgraph_core={level}"
        ))
    });

    let fmt_layer = match config.logging.format.as_str() {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        "compact" => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

enum Output {
    Profile(FriendProfile),
    Friends(FriendList),
    Counts { label: &'static str, counts: Vec<(UserId, u64)> },
    Message(String),
}

impl Output {
    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(match self {
            Output::Profile(p) => serde_json::to_value(p)?,
            Output::Friends(f) => serde_json::to_value(f)?,
            Output::Counts { label, counts } => serde_json::Value::Object(
                counts
                    .iter()
                    .map(|(id, n)| (id.to_string(), serde_json::json!({ *label: n })))
                    .collect(),
            ),
            Output::Message(m) => serde_json::json!({ "message": m }),
        })
    }
}

async fn run(cli: &Cli, config: &FriendGraphConfig) -> Result<Output> {
    let timeout_ms = config.query.request_timeout_ms;

    match &cli.command {
        Commands::InitConfig { path } => {
            ConfigManager::create_default_config(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok(Output::Message(format!("Wrote {}", path.display())))
        }
        Commands::Profile { viewer, friend } => {
            let engine = open_engine(cli, config)?;
            let profile = with_timeout(timeout_ms, engine.get_friend_profile(*viewer, *friend))
                .await?;
            Ok(Output::Profile(profile))
        }
        Commands::Friends { viewer } => {
            let engine = open_engine(cli, config)?;
            let list = with_timeout(timeout_ms, engine.get_all_friends(*viewer)).await?;
            Ok(Output::Friends(list))
        }
        Commands::Mutual { viewer, candidates } => {
            let engine = open_engine(cli, config)?;
            let counts =
                with_timeout(timeout_ms, engine.mutual_friend_counts(*viewer, candidates)).await?;
            Ok(Output::Counts {
                label: "mutualFriendCount",
                counts: ordered(candidates, counts),
            })
        }
        Commands::Degree { users } => {
            let engine = open_engine(cli, config)?;
            let counts = with_timeout(timeout_ms, engine.total_friend_counts(users)).await?;
            Ok(Output::Counts {
                label: "totalFriendCount",
                counts: ordered(users, counts),
            })
        }
    }
}

fn open_engine(
    cli: &Cli,
    config: &FriendGraphConfig,
) -> Result<FriendQueryEngine<InMemoryEdgeStore>> {
    Ok(FriendQueryEngine::new(Arc::new(load_store(cli, config)?)))
}

fn load_store(cli: &Cli, config: &FriendGraphConfig) -> Result<InMemoryEdgeStore> {
    let path = cli
        .fixture
        .clone()
        .or_else(|| config.store.fixture_path.clone())
        .ok_or_else(|| anyhow!("No fixture given; pass --fixture or set store.fixture_path"))?;
    let symmetrize = config.store.symmetrize && !cli.raw;

    let fixture = GraphFixture::from_path(&path)
        .with_context(|| format!("Failed to read fixture {}", path.display()))?;
    let store = InMemoryEdgeStore::new();
    let stats = fixture.load_into(&store, symmetrize);
    info!(
        "Serving {} users and {} rows (symmetrize = {})",
        stats.users, stats.edges, symmetrize
    );
    Ok(store)
}

/// Caller-side deadline around one facade call. Zero disables it.
async fn with_timeout<T, F>(timeout_ms: u64, fut: F) -> Result<T>
where
    F: Future<Output = friendgraph_core::Result<T>>,
{
    if timeout_ms == 0 {
        return Ok(fut.await?);
    }
    match tokio::time::timeout(Duration::from_millis(timeout_ms), fut).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            debug!("Request exceeded {} ms", timeout_ms);
            Err(anyhow!("Request timed out after {} ms", timeout_ms))
        }
    }
}

/// Keeps the caller's argument order, dropping repeated ids.
fn ordered(requested: &[UserId], counts: HashMap<UserId, u64>) -> Vec<(UserId, u64)> {
    let mut seen = HashSet::with_capacity(requested.len());
    requested
        .iter()
        .filter(|id| seen.insert(**id))
        .map(|id| (*id, counts.get(id).copied().unwrap_or(0)))
        .collect()
}

fn print_output(format: &OutputFormat, output: &Output) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output.to_json()?)?);
        }
        OutputFormat::Pretty => print_pretty(output),
    }
    Ok(())
}

fn print_pretty(output: &Output) {
    match output {
        Output::Profile(p) => {
            println!("{} {}", p.full_name.bold(), format!("#{}", p.id).dimmed());
            println!("  {} {}", "Phone:".cyan(), p.phone_number);
            println!("  {} {}", "Friends:".cyan(), p.total_friend_count);
            println!("  {} {}", "Mutual friends:".cyan(), p.mutual_friend_count);
        }
        Output::Friends(list) => {
            println!(
                "{} {} ({} friends)",
                list.full_name.bold(),
                format!("#{}", list.id).dimmed(),
                list.friends.len()
            );
            for item in &list.friends {
                println!(
                    "  {} {} {}  {} friends",
                    "•".green(),
                    item.entry.friend_full_name,
                    format!("#{}", item.entry.friend_user_id).dimmed(),
                    item.total_friend_count
                );
            }
        }
        Output::Counts { label, counts } => {
            for (id, n) in counts {
                println!("{} {}: {}", format!("#{}", id).bold(), label, n);
            }
        }
        Output::Message(m) => println!("{} {}", "✓".green().bold(), m),
    }
}
