use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{Error, Result};

/// GET autenticado contra un endpoint base. No interpreta el path.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<Vec<u8>>;
}

/// Transporte real: reqwest + bearer token.
#[derive(Clone)]
pub struct AuthClient {
    http: Client,
    base_url: String,
    token: String,
}

impl AuthClient {
    pub fn new(http: Client, base_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for AuthClient {
    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|source| Error::Request {
                path: path.to_string(),
                source,
            })?;

        if !resp.status().is_success() {
            return Err(Error::Status {
                path: path.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|source| Error::Request {
            path: path.to_string(),
            source,
        })?;
        Ok(body.to_vec())
    }
}
