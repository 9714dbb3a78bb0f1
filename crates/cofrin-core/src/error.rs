//! Error types for Cofrin

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Response blocked by provider: {0}")]
    Blocked(String),

    #[error("Empty response from AI provider")]
    EmptyResponse,

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
