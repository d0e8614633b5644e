use std::io::{ErrorKind, Read};

use bytes::Bytes;
use tracing::trace;

use crate::codec::{decode_header, Response, HEADER_SIZE, TERMINATOR};
use crate::error::{FrameError, Result};

/// Read single bytes until `terminator` is seen or the stream ends.
///
/// The terminator is consumed but not returned. If the stream ends first,
/// everything read so far is returned, which may be empty.
pub fn read_until<R: Read + ?Sized>(reader: &mut R, terminator: u8) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(byte) = read_byte(reader)? {
        if byte == terminator {
            break;
        }
        data.push(byte);
    }
    Ok(data)
}

/// Decode one response line.
///
/// `prefetched` holds header bytes the caller has already pulled off the
/// stream; only the remainder of the 7-byte header is read before the
/// parameter is scanned up to `\r`.
pub fn decode_response<R: Read + ?Sized>(reader: &mut R, prefetched: &[u8]) -> Result<Response> {
    let mut header = prefetched.to_vec();
    if header.len() < HEADER_SIZE {
        let missing = HEADER_SIZE - header.len();
        let read = read_up_to(reader, missing)?;
        if header.is_empty() && read.is_empty() {
            return Err(FrameError::ConnectionClosed);
        }
        header.extend_from_slice(&read);
    }

    let body = decode_header(&header)?;
    let param = read_until(reader, TERMINATOR)?;
    trace!(%body, param_len = param.len(), "decoded response");

    Ok(Response {
        body,
        param: Bytes::from(param),
    })
}

/// Read up to `len` bytes, stopping early only at end of stream.
pub fn read_up_to<R: Read + ?Sized>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let mut filled = 0usize;
    while filled < len {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    buf.truncate(filled);
    Ok(buf)
}

fn read_byte<R: Read + ?Sized>(reader: &mut R) -> Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}
