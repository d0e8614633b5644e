use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::Command;
use crate::error::{FrameError, Result};

/// Encode `command`, write it and flush.
pub fn write_command<W: Write + ?Sized>(writer: &mut W, command: &Command) -> Result<()> {
    let mut buf = BytesMut::with_capacity(command.wire_size());
    command.encode(&mut buf);
    write_all_flush(writer, &buf)
}

/// Write every byte of `data`, then flush (blocking).
///
/// Callers that must send several pieces as one unit concatenate them
/// first; nothing is flushed in between.
pub fn write_all_flush<W: Write + ?Sized>(writer: &mut W, data: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < data.len() {
        match writer.write(&data[offset..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }

    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::body::{INPT, POWR};

    #[test]
    fn write_single_command() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        write_command(&mut cursor, &Command::query(POWR)).unwrap();
        assert_eq!(cursor.into_inner(), b"%1POWR ?\r");
    }

    #[test]
    fn write_multiple_commands() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        write_command(&mut cursor, &Command::query(POWR)).unwrap();
        write_command(&mut cursor, &Command::new(INPT, &b"31"[..]).unwrap()).unwrap();
        assert_eq!(cursor.into_inner(), b"%1POWR ?\r%1INPT 31\r");
    }

    #[test]
    fn flush_propagates() {
        let mut sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);

        write_all_flush(&mut sink, b"x").unwrap();

        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(sink.data, b"x");
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let mut sink = InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        };

        write_all_flush(&mut sink, b"retry").unwrap();
        assert_eq!(sink.data, b"retry");
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let err = write_all_flush(&mut ZeroWriter, b"x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
