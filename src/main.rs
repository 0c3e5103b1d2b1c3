use anyhow::Context;
use clap::Parser;
use ratgdo_exporter::client::StatusClient;
use ratgdo_exporter::collectors::ratgdo::RatgdoCollector;
use ratgdo_exporter::config::Config;
use ratgdo_exporter::server::build_router;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.json_logs);

    let client = StatusClient::new(&config.host).context("invalid ratgdo host")?;
    tracing::info!(device = client.base_url(), "polling ratgdo device on every scrape");

    let router = build_router(Arc::new(RatgdoCollector::new(client)));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", addr))?;
    tracing::info!("Exporter is listening on {}/metrics", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
