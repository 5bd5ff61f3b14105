use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use receiver::config::Config;
use receiver::databricks::DatabricksClient;
use receiver::handlers;
use receiver::scraper::{run_scrape_loop, Scraper};
use receiver::service::DatabricksService;
use receiver::spark::ProxySparkClientFactory;
use receiver::spark_service::SparkRestService;
use receiver::state::AppState;
use receiver::transport::AuthClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("receiver=info,tower_http=info")),
        )
        .init();

    let cfg = Config::parse();

    let http = reqwest::Client::builder()
        .timeout(cfg.request_timeout())
        .build()
        .context("no se pudo crear el cliente HTTP")?;

    // API del workspace
    let workspace = AuthClient::new(http.clone(), &cfg.endpoint, &cfg.token);
    let databricks = DatabricksService::new(
        DatabricksClient::new(Arc::new(workspace)),
        cfg.page_limit as usize,
    );

    // Spark a través del proxy del driver, un cliente por cluster
    let factory = ProxySparkClientFactory::new(
        http,
        &cfg.spark_endpoint,
        &cfg.org_id,
        cfg.spark_ui_port,
        &cfg.token,
    );
    let spark = SparkRestService::new(Arc::new(factory));

    let state = AppState::new();
    let scraper = Scraper::new(
        Arc::new(databricks),
        Arc::new(spark),
        cfg.max_concurrency as usize,
    );

    // scrape periódico en segundo plano
    let loop_state = state.clone();
    let every = cfg.scrape_interval();
    tokio::spawn(async move {
        run_scrape_loop(scraper, loop_state, every).await;
    });

    let app = handlers::build_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("no se pudo escuchar en {}", cfg.listen_addr))?;
    info!(
        "receiver escuchando en {} (workspace {}, cada {:?})",
        listener.local_addr()?,
        cfg.endpoint,
        every
    );

    axum::serve(listener, app).await?;
    Ok(())
}
