//! Request and reply envelopes exchanged between controllers and clients.
//!
//! Both envelopes travel as one JSON document per line. The caller's public
//! key never appears on the wire; the transport attaches it out of band.

mod errors;
mod parameters;
mod reply;
mod request;

pub use errors::MessageError;
pub use parameters::Parameters;
pub use reply::{Reply, ReplyStatus};
pub use request::Request;

/// Largest frame accepted from a peer, excluding the newline delimiter.
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Trims trailing ASCII whitespace from a byte slice.
pub(crate) fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    bytes.trim_ascii_end()
}

pub(crate) fn encode_line<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, MessageError> {
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    Ok(line)
}
