use clap::Parser;
use std::time::Duration;

/// Configuración del receiver. Todo se puede pasar por flag o por env var.
#[derive(Debug, Clone, Parser)]
#[command(name = "receiver")]
#[command(about = "Junta métricas de jobs, clusters, pipelines y Spark de un workspace de Databricks")]
pub struct Config {
    /// URL del workspace, ej: https://adb-123.11.azuredatabricks.net
    #[arg(long, env = "DATABRICKS_ENDPOINT")]
    pub endpoint: String,

    #[arg(long, env = "DATABRICKS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Org id del workspace (lo usa el proxy del driver de Spark)
    #[arg(long, env = "DATABRICKS_ORG_ID")]
    pub org_id: String,

    /// Endpoint del proxy de Spark, ej: https://westus.azuredatabricks.net
    #[arg(long, env = "SPARK_ENDPOINT")]
    pub spark_endpoint: String,

    #[arg(long, env = "SPARK_UI_PORT", default_value_t = 40001)]
    pub spark_ui_port: u16,

    /// Tamaño de página para los listados paginados
    #[arg(long, env = "PAGE_LIMIT", default_value_t = 25, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_limit: u32,

    #[arg(long, env = "SCRAPE_INTERVAL_SECS", default_value_t = 30)]
    pub scrape_interval_secs: u64,

    /// Clusters consultados en paralelo
    #[arg(long, env = "MAX_CONCURRENCY", default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_concurrency: u32,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,
}

impl Config {
    pub fn scrape_interval(&self) -> Duration {
        Duration::from_secs(self.scrape_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
