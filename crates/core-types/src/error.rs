use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("The field '{0}' is required")]
    MissingField(&'static str),

    #[error("Invalid input for {0}: {1}")]
    InvalidInput(&'static str, String),
}
