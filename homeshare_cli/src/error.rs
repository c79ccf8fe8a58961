use homeshare::error::HomeshareError;
use polars::error::PolarsError;

#[derive(thiserror::Error, Debug)]
pub enum HomeshareCliError {
    // When errors are not Send and Sync, can return a generic error
    #[error("Generic error")]
    Generic(#[from] Box<dyn std::error::Error + Send + Sync>),
    #[error("Anyhow error")]
    Anyhow(#[from] anyhow::Error),
    #[error("polars error")]
    PolarsError(#[from] PolarsError),
    #[error("homeshare error")]
    HomeshareError(#[from] HomeshareError),
    #[error("std IO error")]
    IOError(#[from] std::io::Error),
}

pub type HomeshareCliResult<T> = Result<T, HomeshareCliError>;
