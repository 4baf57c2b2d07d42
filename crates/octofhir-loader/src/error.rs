use thiserror::Error;

/// Error types for NDJSON to Bundle conversion
#[derive(Debug, Error)]
pub enum LoaderError {
    /// A retained line of the page is not a valid JSON object.
    #[error("Error converting NDJSON file to Bundle {file_name}.")]
    Conversion {
        file_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl LoaderError {
    /// Create a new Conversion error for the given source name
    pub fn conversion(file_name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Conversion {
            file_name: file_name.into(),
            source,
        }
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn is_conversion_error(&self) -> bool {
        matches!(self, Self::Conversion { .. })
    }

    /// Source name of the file that failed to convert, if any
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Conversion { file_name, .. } => Some(file_name),
            _ => None,
        }
    }

    /// Get error category for logging/reporting
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Conversion { .. } => ErrorCategory::Conversion,
            Self::Io(_) => ErrorCategory::Io,
            Self::Configuration(_) | Self::Toml(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for reporting and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Conversion,
    Io,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conversion => write!(f, "conversion"),
            Self::Io => write!(f, "io"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;
