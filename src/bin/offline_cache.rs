use anyhow::Context;
use clap::{Parser, Subcommand};
use night_prayer::domain::ports::{CacheStorage, Network};
use night_prayer::utils::{logger, validation::Validate};
use night_prayer::{
    DiskCacheStorage, FetchOutcome, HttpNetwork, OfflineWorker, Request, WorkerConfig,
};
use std::io::Write;
use std::sync::Arc;
use url::Url;

#[derive(Parser)]
#[command(name = "offline-cache")]
#[command(about = "Keep an offline copy of the night-prayer site")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "offline-cache.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Precache the asset manifest, then activate it
    Install {
        /// Leave older caches in place until `activate` runs
        #[arg(long)]
        no_activate: bool,
    },
    /// Delete caches that belong to other versions
    Activate,
    /// Fetch a URL through the worker
    Fetch {
        url: String,

        /// Treat the request as a page navigation
        #[arg(long)]
        navigate: bool,

        /// Write the body to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List cache namespaces and their entries
    Status,
}

type Worker = OfflineWorker<HttpNetwork, DiskCacheStorage>;

async fn run(args: &Args, config: &WorkerConfig) -> night_prayer::Result<()> {
    let settings = config.settings()?;
    let network = Arc::new(HttpNetwork::from_config(config)?);
    let cache = Arc::new(DiskCacheStorage::new(config.storage_path()));

    match &args.command {
        Command::Install { no_activate } => {
            let mut worker = Worker::new(settings, network, cache);
            let count = worker.install().await?;
            println!("✅ Cached {} assets in {}", count, worker.settings().cache_name);
            if !no_activate {
                let deleted = worker.activate().await?;
                report_deleted(&deleted);
            }
        }
        Command::Activate => {
            let mut worker = Worker::from_installed(settings, network, cache).await?;
            let deleted = worker.activate().await?;
            report_deleted(&deleted);
        }
        Command::Fetch {
            url,
            navigate,
            output,
        } => {
            let url = Url::parse(url)?;
            let request = if *navigate {
                Request::navigate(url)
            } else {
                Request::get(url)
            };

            let worker = Worker::resume(settings, network.clone(), cache).await?;
            let outcome = worker.handle_fetch(&request).await?;
            let (source, response) = match outcome {
                FetchOutcome::Passthrough => ("network (not intercepted)", network.fetch(&request).await?),
                FetchOutcome::Cache(response) => ("cache", response),
                FetchOutcome::Network(response) => ("network", response),
                FetchOutcome::Fallback(response) => ("offline fallback", response),
            };
            tracing::info!("HTTP {} from {}", response.status, source);

            match output {
                Some(path) => {
                    tokio::fs::write(path, &response.body).await?;
                    eprintln!("📁 {} bytes from {} saved to {}", response.body.len(), source, path);
                }
                None => std::io::stdout().write_all(&response.body)?,
            }

            worker.wait_until_idle().await;
        }
        Command::Status => {
            let names = cache.keys().await?;
            if names.is_empty() {
                println!("No caches installed under {}", config.storage_path().display());
            }
            for name in names {
                let marker = if name == settings.cache_name { "*" } else { " " };
                let urls = cache.urls(&name).await?;
                println!("{} {} ({} entries)", marker, name, urls.len());
                for url in urls {
                    println!("    {}", url);
                }
            }
        }
    }

    Ok(())
}

fn report_deleted(deleted: &[String]) {
    if deleted.is_empty() {
        println!("✅ Activated, no stale caches found");
    } else {
        println!("✅ Activated, removed: {}", deleted.join(", "));
    }
}

fn load_config(path: &str) -> anyhow::Result<WorkerConfig> {
    let config = WorkerConfig::from_file(path)
        .with_context(|| format!("Failed to load config file '{}'", path))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in '{}'", path))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("📁 Loading configuration from: {}", args.config);
    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ {:#}", e);
            eprintln!("❌ {:#}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args, &config).await {
        tracing::error!(
            "❌ offline-cache failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.severity().exit_code());
    }

    Ok(())
}
