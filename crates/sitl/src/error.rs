use agrispray_core::parameters::ParameterError;

/// Errors raised while setting up or running the host runtime.
#[derive(Debug, thiserror::Error)]
pub enum SitlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Parameter {name}: {error}")]
    Param {
        name: String,
        error: ParameterError,
    },

    #[error("Flow log error: {0}")]
    FlowLog(#[from] serde_json::Error),
}

impl SitlError {
    pub fn param(name: impl Into<String>, error: ParameterError) -> Self {
        SitlError::Param {
            name: name.into(),
            error,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        SitlError::InvalidConfig(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, SitlError>;
