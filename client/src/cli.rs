use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use common::{DataPoint, JobWatermark, ScrapeReport};
use reqwest::{Client, StatusCode};
use std::env;

/// - En Docker: RECEIVER_URL=http://receiver:8080
/// - Local: default http://localhost:8080
fn receiver_base_url() -> String {
    env::var("RECEIVER_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "CLI simple para consultar el receiver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chequea que el receiver esté vivo
    Health,

    /// Muestra los data points del último scrape
    Metrics {
        /// Sólo métricas cuyo nombre empiece con este prefijo
        #[arg(long)]
        prefix: Option<String>,

        /// Sólo data points de este cluster
        #[arg(long)]
        cluster: Option<String>,
    },

    /// Lista la última marca (start_time) vista por job
    Watermarks,
}

fn matches_filters(p: &DataPoint, prefix: Option<&str>, cluster: Option<&str>) -> bool {
    let prefix_ok = prefix.map_or(true, |pre| p.name.starts_with(pre));
    let cluster_ok = cluster.map_or(true, |c| p.attr("cluster.id") == Some(c));
    prefix_ok && cluster_ok
}

fn format_point(p: &DataPoint) -> String {
    let attrs: Vec<String> = p
        .attributes
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    format!("{} {} [{}]", p.name, p.value, attrs.join(", "))
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = receiver_base_url();

    match cli.command {
        Commands::Health => {
            let url = format!("{}/health", base_url);
            let resp = client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("no se pudo contactar {url}"))?;
            println!("receiver: {}", resp.status());
        }

        Commands::Metrics { prefix, cluster } => {
            let url = format!("{}/api/v1/metrics", base_url);
            let resp = client.get(&url).send().await?;

            if resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                println!("Todavía no hay ningún scrape completo.");
                return Ok(());
            }
            if !resp.status().is_success() {
                bail!("error consultando /api/v1/metrics (status {})", resp.status());
            }

            let report: ScrapeReport = resp.json().await?;
            println!("Scrape de {}:", report.scraped_at);

            let selected: Vec<&DataPoint> = report
                .data_points
                .iter()
                .filter(|p| matches_filters(p, prefix.as_deref(), cluster.as_deref()))
                .collect();

            if selected.is_empty() {
                println!("  (sin data points)");
            }
            for p in selected {
                println!("  {}", format_point(p));
            }
        }

        Commands::Watermarks => {
            let url = format!("{}/api/v1/watermarks", base_url);
            let resp = client.get(&url).send().await?;
            if !resp.status().is_success() {
                bail!("error consultando /api/v1/watermarks (status {})", resp.status());
            }

            let marks: Vec<JobWatermark> = resp.json().await?;
            if marks.is_empty() {
                println!("No hay marcas registradas.");
            }
            for m in marks {
                println!("job {:>8}  último start_time {}", m.job_id, m.start_time);
            }
        }
    }

    Ok(())
}
