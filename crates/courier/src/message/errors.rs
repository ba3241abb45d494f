use thiserror::Error;

/// Errors raised while decoding envelopes or reading their parameters.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The frame is not valid JSON.
    #[error("malformed message: {message}")]
    Malformed {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The JSON does not describe a usable envelope.
    #[error("invalid message structure: {message}")]
    InvalidStructure { message: String },

    /// A required parameter is absent.
    #[error("missing parameter '{key}'")]
    MissingParameter { key: String },

    /// A parameter exists but holds the wrong kind of value.
    #[error("parameter '{key}' is not {expected}")]
    ParameterType { key: String, expected: &'static str },

    /// The frame exceeds [`super::MAX_FRAME_SIZE`].
    #[error("message too large: {size} bytes exceeds {max_size} byte limit")]
    TooLarge { size: usize, max_size: usize },

    /// Encoding an envelope failed.
    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl MessageError {
    /// Creates a malformed message error from a serde error.
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::Malformed {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed message error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Creates a missing parameter error.
    pub fn missing_parameter(key: impl Into<String>) -> Self {
        Self::MissingParameter { key: key.into() }
    }

    /// Creates a parameter type error.
    pub fn parameter_type(key: impl Into<String>, expected: &'static str) -> Self {
        Self::ParameterType {
            key: key.into(),
            expected,
        }
    }

    /// Creates a frame size error.
    pub fn too_large(size: usize, max_size: usize) -> Self {
        Self::TooLarge { size, max_size }
    }
}
