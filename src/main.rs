//! Model gateway configuration core.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.json / config.yaml
//!          │
//!          ▼
//!   ┌─────────────┐   ┌──────────────┐   ┌──────────────────────┐
//!   │   loader    │──▶│  validation  │──▶│  index builder       │
//!   │ (json/yaml) │   │              │   │ (model → bindings)   │
//!   └─────────────┘   └──────────────┘   └──────────┬───────────┘
//!          ▲                                        │ atomic swap
//!          │ reload                                 ▼
//!   ┌─────────────┐                      ┌──────────────────────┐
//!   │  watcher /  │                      │   ConfigStore        │
//!   │   SIGHUP    │                      │   Arc<Snapshot>      │
//!   └─────────────┘                      └──────────┬───────────┘
//!                                                   │ per request
//!                                                   ▼
//!                                        ┌──────────────────────┐
//!                                        │  Resolver            │
//!                                        │  redirect → key auth │
//!                                        │  → namespace → LB    │
//!                                        └──────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use model_gateway::config::ConfigStore;
use model_gateway::lifecycle::startup::Gateway;
use model_gateway::observability::{logging, metrics};
use model_gateway::routing::defaults::RANDOM_MODEL;

#[derive(Parser)]
#[command(name = "model-gateway")]
#[command(about = "Configuration and model routing core for a multi-provider API gateway", long_about = None)]
struct Cli {
    /// Configuration file (.json, .yml or .yaml).
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Log level; overrides the document's log_level.
    #[arg(long)]
    log_level: Option<String>,

    /// Expose Prometheus metrics on this address.
    #[arg(long)]
    metrics_address: Option<SocketAddr>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the configuration, then exit
    Check,
    /// List routable model names, candidate counts, and serving groups
    Models,
    /// Resolve a model the way a request would
    Resolve {
        model: String,
        #[arg(short, long, default_value = "")]
        namespace: String,
        #[arg(short = 'k', long)]
        api_key: Option<String>,
    },
    /// Load, watch for changes, and hot-reload until interrupted (default)
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let log_handle = logging::init_logging(cli.log_level.as_deref().unwrap_or("info"));

    if let Some(addr) = cli.metrics_address {
        metrics::init_metrics(addr);
    }

    let store = Arc::new(ConfigStore::new());

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Check => {
            let snapshot = store.load(&cli.config).await?;
            println!(
                "ok: version {}, {} models, {} api keys, strategy {}",
                snapshot.version,
                snapshot.index.len(),
                snapshot.api_keys.len(),
                snapshot.settings.load_balancing
            );
        }
        Commands::Models => {
            let snapshot = store.load(&cli.config).await?;
            let mut rows: Vec<_> = snapshot.index.iter().collect();
            rows.sort_unstable_by_key(|(name, _)| *name);
            for (name, candidates) in rows {
                let groups: Vec<&str> = candidates.iter().map(|b| b.group.as_str()).collect();
                println!("{name}\t{}\t{}", candidates.len(), groups.join(","));
            }
        }
        Commands::Resolve {
            model,
            namespace,
            api_key,
        } => {
            store.load(&cli.config).await?;
            let resolver = store.resolver()?;

            let model = resolver.apply_global_redirect(&model).to_string();
            resolver.authorize_key(api_key.as_deref().unwrap_or(""), &model)?;

            let binding = if model == RANDOM_MODEL {
                resolver.resolve_random_binding()?
            } else {
                resolver.resolve_model(&model, &namespace)?
            };
            let upstream = binding.apply_model_rename(binding.apply_model_redirect(&model));

            let out = serde_json::json!({
                "model": model,
                "upstream_model": upstream,
                "binding_id": binding.id,
                "group": binding.group,
                "provider": binding.entry.provider,
                "server_url": binding.entry.server_url,
                "namespace": binding.namespace,
                "timeout_secs": binding.timeout().as_secs(),
                "use_proxy": resolver.should_use_proxy(&binding),
                "multi_content": resolver.is_multi_content_capable(upstream),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Watch => {
            // Without --log-level, follow the document's level across reloads.
            if let (Some(handle), None) = (log_handle, cli.log_level.as_ref()) {
                store.register_change_callback(move |snapshot| {
                    let settings = &snapshot.settings;
                    handle.set_level(logging::effective_level(settings.debug, &settings.log_level));
                });
            }
            let gateway = Gateway::start(Arc::clone(&store), &cli.config).await?;
            gateway.run_until_shutdown().await;
        }
    }

    Ok(())
}
