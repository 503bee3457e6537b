use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use mirrorstate::config::{Config, ConfigStore};
use mirrorstate::{QueryState, SyncClient};

#[derive(Parser, Debug)]
#[command(name = "mirrorstate", version, about = "Inspect and watch a JSON-over-HTTP RPC backend")]
struct Cli {
    /// Config file (default: ~/.config/mirrorstate/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long, global = true)]
    host: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the identity the backend associates with this client
    Session,
    /// Call a method once and print the outcome
    Call {
        method: String,
        /// JSON arguments
        #[arg(default_value = "{}")]
        args: String,
    },
    /// Mount a query on a method and print every state change
    Watch {
        method: String,
        /// JSON arguments
        #[arg(default_value = "{}")]
        args: String,
        /// Refetch period in seconds
        #[arg(long)]
        refresh_secs: Option<u64>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    mirrorstate::init_tracing();
    let cli = Cli::parse();

    let path = cli.config.clone().unwrap_or_else(Config::config_path);
    let store = ConfigStore::open(path).context("Failed to load configuration")?;
    if let Some(host) = &cli.host {
        store
            .override_host(host.as_str())
            .context("Invalid --host")?;
    }
    let client = SyncClient::new(store)?;

    match cli.command {
        Command::Session => show_session(&client).await,
        Command::Call { method, args } => call(&client, &method, &args).await,
        Command::Watch {
            method,
            args,
            refresh_secs,
        } => watch(&client, method, &args, refresh_secs).await,
    }
}

fn parse_args(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("Arguments are not valid JSON: {}", raw))
}

async fn show_session(client: &SyncClient) -> Result<()> {
    let session = client.session().refresh(client.api()).await?;
    match session {
        Some(session) => println!("{} (id {})", session.username, session.id),
        None => println!("anonymous"),
    }
    Ok(())
}

async fn call(client: &SyncClient, method: &str, raw: &str) -> Result<()> {
    let args = parse_args(raw)?;
    let outcome = client
        .api()
        .transport()
        .call::<Value, Value>(method, &args)
        .await?;
    match outcome {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(kind) => println!("error: {}", kind),
    }
    Ok(())
}

async fn watch(
    client: &SyncClient,
    method: String,
    raw: &str,
    refresh_secs: Option<u64>,
) -> Result<()> {
    let args = parse_args(raw)?;
    let query = client.use_query(move |api| {
        let method = method.clone();
        let args = args.clone();
        async move { api.transport().call::<Value, Value>(&method, &args).await }
    });

    print_state(&query.get());
    let _printer = query.subscribe(print_state);

    match refresh_secs.filter(|secs| *secs > 0) {
        Some(secs) => {
            let mut ticker = tokio::time::interval(Duration::from_secs(secs));
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => query.refetch(),
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        None => {
            tokio::signal::ctrl_c().await?;
        }
    }

    query.deactivate();
    Ok(())
}

fn print_state(state: &QueryState<Value>) {
    match state {
        QueryState::Loading => println!("loading"),
        QueryState::Ok(value) => println!("ok {}", value),
        QueryState::Error(kind) => println!("error {}", kind),
    }
}
