use std::fmt;
use std::io::{self, BufRead, BufReader, Read};

use crate::message::MAX_FRAME_SIZE;

/// Result of one attempt to read a frame.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum FrameRead {
    /// A complete frame, newline delimiter included.
    Frame(Vec<u8>),
    /// A frame over the size limit was skipped; holds its size.
    TooLarge(usize),
    /// The read timed out before a frame completed.
    Idle,
    /// The peer closed the stream.
    Eof,
}

/// Splits a byte stream into newline delimited frames.
///
/// Partial frames survive read timeouts, so callers may poll with a short
/// timeout and retry.
pub(crate) struct FrameReader<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
    discarded: Option<usize>,
}

impl<R> fmt::Debug for FrameReader<R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FrameReader")
            .field("pending", &self.pending.len())
            .field("discarded", &self.discarded)
            .finish_non_exhaustive()
    }
}

impl<R: Read> FrameReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            pending: Vec::new(),
            discarded: None,
        }
    }

    pub(crate) fn next_frame(&mut self) -> io::Result<FrameRead> {
        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(error)
                    if matches!(
                        error.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    return Ok(FrameRead::Idle);
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            };

            if available.is_empty() {
                return Ok(self.finish());
            }

            let (chunk, complete) = match available.iter().position(|byte| *byte == b'\n') {
                Some(index) => (&available[..=index], true),
                None => (available, false),
            };
            let consumed = chunk.len();
            match self.discarded.as_mut() {
                Some(size) => *size += consumed,
                None => self.pending.extend_from_slice(chunk),
            }
            self.reader.consume(consumed);

            if self.discarded.is_none() && self.pending.len() > MAX_FRAME_SIZE + 1 {
                self.discarded = Some(self.pending.len());
                self.pending = Vec::new();
            }

            if complete {
                if let Some(size) = self.discarded.take() {
                    return Ok(FrameRead::TooLarge(size));
                }
                let frame = std::mem::take(&mut self.pending);
                if frame.len() > MAX_FRAME_SIZE + 1 {
                    return Ok(FrameRead::TooLarge(frame.len()));
                }
                return Ok(FrameRead::Frame(frame));
            }
        }
    }

    fn finish(&mut self) -> FrameRead {
        if let Some(size) = self.discarded.take() {
            return FrameRead::TooLarge(size);
        }
        if self.pending.is_empty() {
            FrameRead::Eof
        } else {
            FrameRead::Frame(std::mem::take(&mut self.pending))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn splits_frames_on_newlines() {
        let mut reader = FrameReader::new(Cursor::new(b"one\ntwo\n".to_vec()));
        assert_eq!(reader.next_frame().expect("read"), FrameRead::Frame(b"one\n".to_vec()));
        assert_eq!(reader.next_frame().expect("read"), FrameRead::Frame(b"two\n".to_vec()));
        assert_eq!(reader.next_frame().expect("read"), FrameRead::Eof);
    }

    #[test]
    fn trailing_bytes_form_a_final_frame() {
        let mut reader = FrameReader::new(Cursor::new(b"tail".to_vec()));
        assert_eq!(reader.next_frame().expect("read"), FrameRead::Frame(b"tail".to_vec()));
        assert_eq!(reader.next_frame().expect("read"), FrameRead::Eof);
    }

    #[test]
    fn oversized_frames_are_skipped() {
        let mut input = vec![b'x'; MAX_FRAME_SIZE + 10];
        input.push(b'\n');
        input.extend_from_slice(b"next\n");
        let mut reader = FrameReader::new(Cursor::new(input));
        assert_eq!(
            reader.next_frame().expect("read"),
            FrameRead::TooLarge(MAX_FRAME_SIZE + 11)
        );
        assert_eq!(reader.next_frame().expect("read"), FrameRead::Frame(b"next\n".to_vec()));
    }
}
