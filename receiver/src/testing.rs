//! Transporte en memoria para los tests: path -> cuerpo JSON o status HTTP.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::transport::Transport;

enum Canned {
    Body(Vec<u8>),
    Status(u16),
}

#[derive(Clone, Default)]
pub struct FakeTransport {
    responses: Arc<Mutex<HashMap<String, Canned>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, path: &str, body: Value) -> Self {
        let bytes = serde_json::to_vec(&body).unwrap();
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Canned::Body(bytes));
        self
    }

    pub fn with_raw(self, path: &str, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Canned::Body(body.as_bytes().to_vec()));
        self
    }

    pub fn with_status(self, path: &str, status: u16) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Canned::Status(status));
        self
    }

    /// Paths pedidos, en orden.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(path.to_string());

        match self.responses.lock().unwrap().get(path) {
            Some(Canned::Body(bytes)) => Ok(bytes.clone()),
            Some(Canned::Status(status)) => Err(Error::Status {
                path: path.to_string(),
                status: *status,
            }),
            None => Err(Error::Status {
                path: path.to_string(),
                status: 404,
            }),
        }
    }
}
