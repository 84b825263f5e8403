use std::io::{self, BufRead};

/// Byte offset range of a line in the input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    pub start: u64,
    pub len: u64,
}

impl ByteSpan {
    /// Offset one past the last byte of the span
    pub fn end(&self) -> u64 {
        self.start + self.len
    }
}

/// Reads an input stream strictly in newline-terminated units.
///
/// Each line is returned as raw bytes including its terminator, so arbitrary
/// binary-safe content round-trips exactly. A final line without a trailing
/// newline is still a complete line. No decoding, no validation.
pub struct LineScanner<R> {
    reader: R,
    offset: u64,
}

impl<R: BufRead> LineScanner<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    /// Read the next line into `buf` (cleared first), returning its byte
    /// offset span in the input, or `None` at end of stream.
    pub fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<Option<ByteSpan>> {
        buf.clear();
        let n = self.reader.read_until(b'\n', buf)?;
        if n == 0 {
            return Ok(None);
        }
        let span = ByteSpan {
            start: self.offset,
            len: n as u64,
        };
        self.offset += n as u64;
        Ok(Some(span))
    }
}
