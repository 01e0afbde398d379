use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{HttpListFetcher, ListController, ListControllerConfig, ListState};
use serde_json::Value;
use shared::{domain::ListPhase, protocol::SearchFilters};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod view;

use commands::Command;
use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(about = "Browse a paginated REST collection from the terminal")]
struct Args {
    #[arg(long, default_value = "list_cli.toml")]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    resource: Option<String>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    per_page: Option<u32>,
    #[arg(long)]
    debounce_ms: Option<u64>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(v) = &self.server_url {
            settings.server_url = v.clone();
        }
        if let Some(v) = &self.resource {
            settings.resource = v.clone();
        }
        if let Some(v) = self.per_page {
            settings.per_page = Some(v);
        }
        if let Some(v) = self.debounce_ms {
            settings.debounce_ms = v;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    args.apply(&mut settings);
    info!(
        "list_cli: server={} resource={} debounce_ms={}",
        settings.server_url, settings.resource, settings.debounce_ms
    );

    let mut fetcher =
        HttpListFetcher::<SearchFilters, Value>::new(&settings.server_url, &settings.resource)
            .context("failed to configure list endpoint")?;
    if let Some(per_page) = settings.per_page {
        fetcher = fetcher.with_per_page(per_page);
    }

    let controller = ListController::new(
        Arc::new(fetcher),
        SearchFilters::with_search(args.search.clone().unwrap_or_default()),
        ListControllerConfig::with_debounce(Duration::from_millis(settings.debounce_ms)),
    );
    let renderer = tokio::spawn(render_states(controller.subscribe()));

    println!("type to search, :more, :refresh, :retry, :quit");
    controller.initialize();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let command = Command::parse(&line);
        debug!(command = command.name(), "list_cli: command");
        match command {
            Command::Quit => break,
            Command::Search(text) => controller.set_filters(SearchFilters::with_search(text)),
            Command::LoadMore => {
                if !controller.load_more() {
                    println!("nothing more to load right now");
                }
            }
            Command::Refresh => controller.refresh(),
            Command::Retry => controller.retry(),
            Command::Unknown(raw) => println!("unknown command: {raw}"),
        }
    }

    controller.teardown();
    renderer.abort();
    Ok(())
}

async fn render_states(mut rx: watch::Receiver<ListState<Value>>) {
    let mut printed = 0usize;
    let mut last_status = String::new();

    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();

        if state.phase() == ListPhase::Settled {
            // A fresh page replaces the list, so print it from the top.
            if state.items.len() < printed || state.pagination.map(|p| p.current_page) == Some(1)
            {
                printed = 0;
            }
            for (index, item) in state.items.iter().enumerate().skip(printed) {
                println!("{:>4}. {}", index + 1, view::item_label(item));
            }
            printed = state.items.len();
        }

        let status = view::status_line(&state);
        if status != last_status {
            println!("-- {status}");
            last_status = status;
        }
    }
}
