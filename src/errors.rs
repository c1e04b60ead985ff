use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid project workspace: {0}")]
    InvalidWorkspace(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Serde YAML error: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("AWS configuration error: {0}")]
    AwsConfig(String),

    #[error("Backend operation failed: {0}")]
    Backend(String),

    #[error("Schema creation failed: {0}")]
    SchemaCreation(String),

    #[error("Exceeded wait limit after {attempts} status checks")]
    WaitTimeout { attempts: u32 },

    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
