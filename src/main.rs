// Copyright 2026 Zalo Proxy Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;
use tracing::info;
use zalo_proxy::config::{Config, FetchStrategyKind};
use zalo_proxy::fetch::rendered::RenderedFetcher;
use zalo_proxy::fetch::static_http::StaticFetcher;
use zalo_proxy::fetch::FetchStrategy;
use zalo_proxy::{cache, extract, lookup, rest};

#[derive(Parser)]
#[command(
    name = "zalo-proxy",
    about = "Phone-number lookup proxy for Zalo public profiles",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the lookup proxy server (the default when no command is given)
    Serve {
        /// Listen port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Fetch strategy: "static" or "rendered" (overrides ZALO_PROXY_STRATEGY)
        #[arg(long)]
        strategy: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (port, strategy) = match cli.command {
        Some(Commands::Serve { port, strategy }) => (port, strategy),
        None => (None, None),
    };
    serve(port, strategy).await
}

async fn serve(port: Option<u16>, strategy: Option<String>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("zalo_proxy=info".parse()?),
        )
        .init();

    let mut config = Config::from_env()?;
    if let Some(p) = port {
        config.port = p;
    }
    if let Some(s) = strategy {
        config.strategy = FetchStrategyKind::parse(&s).ok_or_else(|| {
            anyhow::anyhow!("unknown strategy '{s}' (expected 'static' or 'rendered')")
        })?;
    }

    info!(
        "starting zalo-proxy v{} strategy={} ttl={}s sweep={}s",
        env!("CARGO_PKG_VERSION"),
        config.strategy.as_str(),
        config.cache_ttl.as_secs(),
        config.sweep_interval.as_secs()
    );

    let result_cache = cache::ResultCache::new(config.cache_ttl);
    let shutdown = Arc::new(Notify::new());
    let sweeper = cache::spawn_sweeper(
        result_cache.clone(),
        config.sweep_interval,
        Arc::clone(&shutdown),
    );

    let fetcher: Arc<dyn FetchStrategy> = match config.strategy {
        FetchStrategyKind::Static => Arc::new(StaticFetcher::new(
            &config.base_url,
            config.fetch_timeout_ms,
        )),
        FetchStrategyKind::Rendered => Arc::new(RenderedFetcher::new(
            &config.base_url,
            config.render_timeout_ms,
            config.settle_ms,
        )),
    };

    let extractor = extract::Extractor::with_defaults(&config);
    let service = lookup::LookupService::new(
        result_cache,
        fetcher,
        extractor,
        &config.country_prefix,
        &config.local_prefix,
    );

    let state = Arc::new(rest::AppState {
        service,
        strategy: config.strategy,
        started_at: Instant::now(),
    });

    // ctrl-c drains the server and stops the sweeper.
    let shutdown_signal = Arc::clone(&shutdown);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("received shutdown signal");
        shutdown_signal.notify_waiters();
    });

    let result = rest::start(config.port, state, Arc::clone(&shutdown)).await;

    shutdown.notify_waiters();
    let _ = sweeper.await;
    info!("zalo-proxy stopped");
    result
}
