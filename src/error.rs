use thiserror::Error;

pub type Result<T> = std::result::Result<T, GuardError>;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Input error: {0}")]
    Input(String),

    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Output error ({path}): {message}")]
    Output { path: String, message: String },

    #[error("Metrics store error: {0}")]
    Metrics(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl GuardError {
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl From<redis::RedisError> for GuardError {
    fn from(err: redis::RedisError) -> Self {
        Self::Metrics(err.to_string())
    }
}
