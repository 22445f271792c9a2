use thiserror::Error;

/// Everything that can stop a dashboard session.
#[derive(Debug, Error)]
pub enum DashError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("line {line}: unknown sex value {value:?}")]
    InvalidSex { line: u64, value: String },

    #[error("line {line}: product {value:?} is not in the product catalog")]
    UnknownProduct { line: u64, value: String },

    #[error("line {line}: empty product value")]
    EmptyProduct { line: u64 },

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DashError>;
