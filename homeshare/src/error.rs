//! Error types.

#[derive(thiserror::Error, Debug)]
pub enum HomeshareError {
    #[error("Wrapped anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),
    #[error("Invalid input: missing or null weight field `{0}`")]
    InvalidInput(String),
    #[error("No study area with code {0} in the geography lookup")]
    LookupError(i64),
    #[error("Wrapped polars error: {0}")]
    PolarsError(#[from] polars::error::PolarsError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_anyhow() {
        let anyhow_error = anyhow!("An anyhow error");
        let homeshare_error: HomeshareError = anyhow_error.into();
        println!("{}", homeshare_error);
    }

    #[test]
    fn test_invalid_input_names_field() {
        let err = HomeshareError::InvalidInput("WGTP7".to_string());
        assert!(err.to_string().contains("WGTP7"));
    }
}
