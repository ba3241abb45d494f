use serde::{Deserialize, Serialize};

use super::errors::MessageError;
use super::parameters::Parameters;
use super::reply::Reply;
use super::{encode_line, trim_trailing_whitespace};

/// A command addressed to a controller.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Request {
    /// Command name used to select a route.
    pub command: String,
    /// Command arguments.
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(skip)]
    public_key: Option<String>,
}

impl Request {
    /// Builds a request for `command`.
    #[must_use]
    pub fn new(command: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            command: command.into(),
            parameters,
            public_key: None,
        }
    }

    /// Parses one frame into a request.
    ///
    /// Trailing whitespace, including the newline delimiter, is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Malformed`] for empty or invalid JSON and
    /// [`MessageError::InvalidStructure`] when the command is blank.
    pub fn parse(frame: &[u8]) -> Result<Self, MessageError> {
        let trimmed = trim_trailing_whitespace(frame);
        if trimmed.is_empty() {
            return Err(MessageError::malformed("empty request"));
        }
        let request: Self = serde_json::from_slice(trimmed).map_err(MessageError::from_json_error)?;
        if request.command.trim().is_empty() {
            return Err(MessageError::invalid_structure("command is empty"));
        }
        Ok(request)
    }

    /// Encodes the request as one newline terminated frame.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Serialize`] if encoding fails.
    pub fn to_line(&self) -> Result<Vec<u8>, MessageError> {
        encode_line(self)
    }

    /// Public key the transport attached to this request, if any.
    #[must_use]
    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    /// Attaches the caller's public key.
    pub fn set_public_key(&mut self, key: impl Into<String>) {
        self.public_key = Some(key.into());
    }

    /// Builds a successful reply to this request.
    #[must_use]
    pub fn ok(&self, parameters: Parameters) -> Reply {
        Reply::ok(parameters)
    }

    /// Builds a failed reply to this request, naming the command.
    #[must_use]
    pub fn fail(&self, message: impl AsRef<str>) -> Reply {
        Reply::fail(format!("{}: {}", self.command, message.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_with_parameters() {
        let request = Request::parse(br#"{"command":"ping","parameters":{"n":1}}"#).expect("parse");
        assert_eq!(request.command, "ping");
        assert_eq!(request.parameters.get_u64("n").expect("n"), 1);
        assert!(request.public_key().is_none());
    }

    #[test]
    fn parameters_default_to_empty() {
        let request = Request::parse(b"{\"command\":\"ping\"}\r\n").expect("parse");
        assert!(request.parameters.is_empty());
    }

    #[test]
    fn rejects_empty_frame() {
        assert!(matches!(
            Request::parse(b"  \n"),
            Err(MessageError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            Request::parse(b"not json"),
            Err(MessageError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_blank_command() {
        assert!(matches!(
            Request::parse(br#"{"command":"  "}"#),
            Err(MessageError::InvalidStructure { .. })
        ));
    }

    #[test]
    fn public_key_stays_off_the_wire() {
        let mut request = Request::new("ping", Parameters::new());
        request.set_public_key("caller-key");
        let line = request.to_line().expect("encode");
        assert!(line.ends_with(b"\n"));
        let decoded = Request::parse(&line).expect("decode");
        assert!(decoded.public_key().is_none());
        assert_eq!(decoded.command, "ping");
    }

    #[test]
    fn fail_names_the_command() {
        let reply = Request::new("ping", Parameters::new()).fail("boom");
        assert_eq!(reply.message(), Some("ping: boom"));
    }
}
