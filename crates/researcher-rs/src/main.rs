//! `researcher` command-line entry point.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use log::{debug, info};
use researcher_rs::app::{build_llm, build_orchestrator, list_history, load_config, open_store};
use researcher_rs::init_logging;
use researcher_rs::protocol::{HistoryFilter, QueryRecord};
use std::path::PathBuf;

/// Command-line options for the researcher service.
#[derive(Parser)]
#[command(name = "researcher", version, about)]
struct Cli {
    /// Optional path to a researcher.json5 config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Bind address override
        #[arg(long)]
        host: Option<String>,
        /// Port override
        #[arg(long)]
        port: Option<u16>,
    },
    /// Route one query and print the stored answer
    Ask {
        /// The question to answer
        query: String,
    },
    /// List stored queries, newest first
    History {
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Exact agent name, e.g. "News Agent"
        #[arg(long)]
        agent: Option<String>,
        /// Case-insensitive substring of the query text
        #[arg(long)]
        search: Option<String>,
    },
    /// Print aggregate statistics as JSON
    Stats,
    /// Delete every stored query
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so it can set RUST_LOG.
    let dotenv = dotenvy::dotenv();
    init_logging();
    match dotenv {
        Ok(path) => debug!("loaded environment file: {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => return Err(err).context("failed to read .env file"),
    }

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    let store = open_store(&config.store)?;

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let orchestrator = build_orchestrator(&config, build_llm(&config.llm)?, store)?;
            info!(
                "starting server (host={}, port={})",
                config.server.host, config.server.port
            );
            researcher_rs::server::serve(orchestrator, &config.server)
                .await
                .context("server failed")?;
        }
        Command::Ask { query } => {
            let orchestrator = build_orchestrator(&config, build_llm(&config.llm)?, store)?;
            let record = orchestrator.submit(&query).await?;
            print_record(&record);
        }
        Command::History {
            limit,
            offset,
            agent,
            search,
        } => {
            let limit = limit.unwrap_or(config.history.default_limit);
            let mut filter = HistoryFilter::default().with_limit(limit).with_offset(offset);
            filter.agent = agent;
            filter.search = search;
            let page = list_history(store.as_ref(), &config.history, &filter).await?;
            println!("{} matching queries", page.total);
            for record in &page.items {
                println!(
                    "[{}] {} | {} | {:.2}s | {}",
                    record.id,
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    record.agent,
                    record.execution_time,
                    record.query
                );
            }
        }
        Command::Stats => {
            let stats = store.statistics().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to clear history without --yes");
            }
            let deleted = store.clear().await?;
            println!("Cleared {deleted} queries from history");
        }
    }
    Ok(())
}

fn print_record(record: &QueryRecord) {
    println!(
        "Query {} answered by {} in {:.2}s\n",
        record.id, record.agent, record.execution_time
    );
    println!("{}", record.response);
}
