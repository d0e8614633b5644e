use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use crate::error::Result;
use crate::traits::PjlinkStream;

/// Buffered duplex over a projector stream.
///
/// Reads go through a `BufReader` on one handle and writes through a
/// `BufWriter` on a clone of it. Nothing reaches the wire until
/// [`Write::flush`] is called.
pub struct BufStream {
    reader: BufReader<PjlinkStream>,
    writer: BufWriter<PjlinkStream>,
}

impl BufStream {
    /// Split `stream` into buffered read and write halves.
    pub fn new(stream: PjlinkStream) -> Result<Self> {
        let read_half = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(stream),
        })
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &PjlinkStream {
        self.writer.get_ref()
    }

    /// Bytes already read from the socket but not yet consumed.
    pub fn buffered(&self) -> &[u8] {
        self.reader.buffer()
    }
}

impl Read for BufStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl BufRead for BufStream {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        self.reader.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.reader.consume(amt)
    }
}

impl Write for BufStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl std::fmt::Debug for BufStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufStream")
            .field("stream", self.get_ref())
            .field("buffered", &self.buffered().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::time::Duration;

    use super::*;
    use crate::tcp::TcpTransport;

    #[test]
    fn writes_are_held_until_flush() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let stream = TcpTransport::connect_addr(addr, Duration::from_secs(2)).unwrap();
        let (mut server, _) = listener.accept().unwrap();
        server
            .set_read_timeout(Some(Duration::from_millis(50)))
            .unwrap();

        let mut buffered = BufStream::new(stream).unwrap();
        buffered.write_all(b"%1POWR ?\r").unwrap();

        let mut probe = [0u8; 16];
        let err = server.read(&mut probe).unwrap_err();
        assert!(matches!(
            err.kind(),
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
        ));

        buffered.flush().unwrap();
        server.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let mut wire = [0u8; 9];
        server.read_exact(&mut wire).unwrap();
        assert_eq!(&wire, b"%1POWR ?\r");
    }

    #[test]
    fn reads_come_back_through_buffer() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let stream = TcpTransport::connect_addr(addr, Duration::from_secs(2)).unwrap();
        let (mut server, _) = listener.accept().unwrap();
        server.write_all(b"PJLINK 0\r").unwrap();

        let mut buffered = BufStream::new(stream).unwrap();
        let mut line = Vec::new();
        buffered.read_until(b'\r', &mut line).unwrap();
        assert_eq!(line, b"PJLINK 0\r");
        assert!(buffered.buffered().is_empty());
    }
}
