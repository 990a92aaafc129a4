use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to build the HTTP client: {0}")]
    ClientBuild(reqwest::Error),

    #[error("The cover request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The cover request timed out after {0} ms")]
    Timeout(u128),
}
