//! Request line framing.
//!
//! `RequestLines` splits the byte stream on `\n` and hands each line over as
//! raw bytes; turning them into text is the protocol codec's job, so a line
//! that is not UTF-8 still gets a `MalformedInput` reply. An over-long line
//! becomes a regular frame instead of a stream error: `Framed` stops yielding
//! frames after a decoder error, but an over-long line only warrants a reply.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder, Encoder};

const LINE_END: &[u8] = b"\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// One line without its terminator. A trailing `\r` is stripped.
    Line(Bytes),
    /// A line longer than the configured maximum; its bytes were discarded.
    Oversized,
}

#[derive(Debug, Clone)]
pub struct RequestLines {
    inner: AnyDelimiterCodec,
}

impl RequestLines {
    pub fn new(max_length: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(
                LINE_END.to_vec(),
                LINE_END.to_vec(),
                max_length,
            ),
        }
    }

    /// Framing for server output, where line length is not limited.
    pub fn unbounded() -> Self {
        Self {
            inner: AnyDelimiterCodec::new(LINE_END.to_vec(), LINE_END.to_vec()),
        }
    }
}

fn without_carriage_return(line: Bytes) -> Bytes {
    match line.last() {
        Some(b'\r') => line.slice(..line.len() - 1),
        _ => line,
    }
}

fn into_frame(
    decoded: Result<Option<Bytes>, AnyDelimiterCodecError>,
) -> Result<Option<Frame>, AnyDelimiterCodecError> {
    match decoded {
        Ok(line) => Ok(line.map(|l| Frame::Line(without_carriage_return(l)))),
        Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => Ok(Some(Frame::Oversized)),
        Err(e) => Err(e),
    }
}

impl Decoder for RequestLines {
    type Item = Frame;
    type Error = AnyDelimiterCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, AnyDelimiterCodecError> {
        into_frame(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, AnyDelimiterCodecError> {
        into_frame(self.inner.decode_eof(buf))
    }
}

impl<T: AsRef<str>> Encoder<T> for RequestLines {
    type Error = AnyDelimiterCodecError;

    fn encode(&mut self, line: T, buf: &mut BytesMut) -> Result<(), AnyDelimiterCodecError> {
        self.inner.encode(line, buf)
    }
}
