use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("GET {path} falló: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {path} devolvió status {status}")]
    Status { path: String, status: u16 },

    #[error("no se pudo decodificar {resource}: {source}")]
    Decode {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{operation}: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// Falla al traer un recurso concreto (job, cluster, pipeline, app).
    #[error("error obteniendo {what} para {key} {id}: {source}")]
    Fetch {
        what: &'static str,
        key: &'static str,
        id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("operación no soportada: {0}")]
    Unsupported(&'static str),

    #[error("tarea de scrape abortada: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("paginación sin avance: {pages} páginas vacías seguidas con has_more (offset {offset})")]
    StalledPages { offset: usize, pages: usize },

    #[error("pool de clusters cerrado: {0}")]
    PoolClosed(#[from] tokio::sync::AcquireError),
}

impl Error {
    pub fn during(self, operation: &'static str) -> Self {
        Error::Operation {
            operation,
            source: Box::new(self),
        }
    }

    pub fn fetching(self, what: &'static str, key: &'static str, id: impl ToString) -> Self {
        Error::Fetch {
            what,
            key,
            id: id.to_string(),
            source: Box::new(self),
        }
    }

    /// Error original, sin las capas de contexto.
    pub fn root(&self) -> &Error {
        match self {
            Error::Operation { source, .. } | Error::Fetch { source, .. } => source.root(),
            other => other,
        }
    }
}
