use serde::{Deserialize, Serialize};

use super::errors::MessageError;
use super::parameters::Parameters;
use super::{encode_line, trim_trailing_whitespace};

/// Outcome of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplyStatus {
    /// The handler succeeded.
    Ok,
    /// The request failed; the reply carries a message.
    Fail,
}

/// Answer to a request.
///
/// A successful reply carries parameters and no message; a failed reply
/// carries a message and no parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Reply {
    status: ReplyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameters: Option<Parameters>,
}

impl Reply {
    /// Builds a successful reply.
    #[must_use]
    pub fn ok(parameters: Parameters) -> Self {
        Self {
            status: ReplyStatus::Ok,
            message: None,
            parameters: Some(parameters),
        }
    }

    /// Builds a failed reply.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Fail,
            message: Some(message.into()),
            parameters: None,
        }
    }

    /// Parses one frame into a reply.
    ///
    /// Fields that contradict the status are dropped: an `OK` reply loses
    /// its message and a `FAIL` reply loses its parameters.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Malformed`] for empty or invalid JSON and
    /// [`MessageError::InvalidStructure`] for a `FAIL` reply without a
    /// message.
    pub fn parse(frame: &[u8]) -> Result<Self, MessageError> {
        let trimmed = trim_trailing_whitespace(frame);
        if trimmed.is_empty() {
            return Err(MessageError::malformed("empty reply"));
        }
        let reply: Self = serde_json::from_slice(trimmed).map_err(MessageError::from_json_error)?;
        match reply.status {
            ReplyStatus::Ok => Ok(Self::ok(reply.parameters.unwrap_or_default())),
            ReplyStatus::Fail => match reply.message {
                Some(message) if !message.is_empty() => Ok(Self::fail(message)),
                _ => Err(MessageError::invalid_structure("failed reply without message")),
            },
        }
    }

    /// Encodes the reply as one newline terminated frame.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Serialize`] if encoding fails.
    pub fn to_line(&self) -> Result<Vec<u8>, MessageError> {
        encode_line(self)
    }

    /// Outcome of the request.
    #[must_use]
    pub fn status(&self) -> ReplyStatus {
        self.status
    }

    /// Returns `true` for successful replies.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == ReplyStatus::Ok
    }

    /// Failure description, present only on failed replies.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Payload, present only on successful replies.
    #[must_use]
    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }

    /// Consumes the reply and returns its payload.
    #[must_use]
    pub fn into_parameters(self) -> Option<Parameters> {
        self.parameters
    }
}
