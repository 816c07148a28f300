//! Newline framing for socket streams
//!
//! Lines are read as raw bytes so one bad line (not UTF-8, or longer than
//! `MAX_MESSAGE_SIZE`) is reported and skipped instead of ending the stream.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::protocol::MAX_MESSAGE_SIZE;

/// One framed read from a stream
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    Line(String),
    /// A line whose bytes are not UTF-8
    NotText,
    /// A line over the size limit; the whole line was discarded
    TooLong(usize),
    Eof,
}

/// Read the next newline-terminated frame
///
/// `buf` is scratch space reused between calls.
pub async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let limit = MAX_MESSAGE_SIZE as u64 + 1;
    let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if read == 0 {
        return Ok(Frame::Eof);
    }
    if read as u64 == limit && buf.last() != Some(&b'\n') {
        let skipped = skip_line(reader).await?;
        return Ok(Frame::TooLong(read + skipped));
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    Ok(match std::str::from_utf8(buf) {
        Ok(line) => Frame::Line(line.to_string()),
        Err(_) => Frame::NotText,
    })
}

/// Discard input through the next newline, returning the bytes dropped
async fn skip_line<R>(reader: &mut R) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut skipped = 0;
    loop {
        let (used, done) = {
            let available = reader.fill_buf().await?;
            match available.iter().position(|b| *b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), available.is_empty()),
            }
        };
        reader.consume(used);
        skipped += used;
        if done {
            return Ok(skipped);
        }
    }
}
