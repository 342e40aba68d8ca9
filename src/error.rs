use thiserror::Error;

#[derive(Error, Debug)]
pub enum Office2MdError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Required credential is not set: {variable}")]
    MissingCredential { variable: String },

    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Unsupported file type: {path}")]
    UnsupportedType { path: String },

    #[error("Conversion service failed: {message}")]
    Service { message: String },

    #[error("Filesystem operation failed on {path}: {source}")]
    Filesystem {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Conversion timed out after {limit:?}")]
    Timeout { limit: std::time::Duration },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

impl Office2MdError {
    pub fn filesystem<P: AsRef<std::path::Path>>(path: P, source: std::io::Error) -> Self {
        Office2MdError::Filesystem {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Office2MdError {
    fn user_message(&self) -> String {
        match self {
            Office2MdError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            Office2MdError::MissingCredential { variable } => {
                format!("{} is not set in environment variables", variable)
            }
            Office2MdError::NotFound { path } => {
                format!("File not found: {}", path)
            }
            Office2MdError::UnsupportedType { path } => {
                format!("Unsupported file type: {}", path)
            }
            Office2MdError::Service { message } => {
                format!("Conversion failed: {}", message)
            }
            Office2MdError::Filesystem { path, source } => {
                format!("Cannot write to {}: {}", path, source)
            }
            Office2MdError::Timeout { limit } => {
                format!("Conversion timed out after {:?}", limit)
            }
            Office2MdError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Office2MdError::MissingCredential { variable } => Some(format!(
                "Add {}=your_api_key to a .env file or export it in your shell.",
                variable
            )),
            Office2MdError::Config { .. } => Some(
                "Check your configuration file syntax or regenerate one with --generate-config.".to_string()
            ),
            Office2MdError::Filesystem { .. } => Some(
                "Ensure you have write permissions for the output directory.".to_string()
            ),
            Office2MdError::Service { .. } => Some(
                "Verify the converter command is installed and the API quota has not been exhausted.".to_string()
            ),
            Office2MdError::Timeout { .. } => Some(
                "Increase [service].timeout in the configuration file or remove it.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for Office2MdError {
    fn from(error: toml::de::Error) -> Self {
        Office2MdError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Office2MdError>;
