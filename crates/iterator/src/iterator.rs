// Copyright (C) 2022 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This library provides a BytesLines iterator for the logkeys project.
//!
//! The goals of this iterator are:
//!
//! - Work with Read object, such as file decompressors.
//! - Keep the line terminator, so that the last field of a line is seen as it is in the file.
//! - Constant memory usage by using zero copy [Bytes] slices.
//!
//! Here is an example usage:
//!
//! ```rust
//! use logkeys_iterator::BytesLines;
//! // Create a test in-memory reader.
//! let reader = std::io::Cursor::new("first\nsecond\r\nlast");
//!
//! // Creates the iterator and unwrap error for assert_eq!.
//! let mut lines_iter = BytesLines::new(reader).map(|l| l.unwrap());
//! assert_eq!(lines_iter.next(), Some(("first\n".into(), 1)));
//! assert_eq!(lines_iter.next(), Some(("second\r\n".into(), 2)));
//! assert_eq!(lines_iter.next(), Some(("last".into(), 3)));
//! assert_eq!(lines_iter.next(), None);
//! ```
//!
//! You can zero-copy convert a [Bytes] to [&str] using: `std::str::from_utf8(&bytes[..])`.

use bytes::{Bytes, BytesMut};
use std::io::{ErrorKind, Read, Result};

/// The BytesLines struct holds a single buffer to store the read data and it yields immutable memory slice.
///
// Here is the main sequence diagram:
//
//     ⭩- the buffer starts here.
// A: [                          ]          < the buffer is empty, we read a chunk.
// B: [aaaaaaaaaaaa\nbbbbb\nccccc]          < there is a line separator.
// C:  ╰------------⮡ next slice, the separator included
// B: [              bbbbb\nccccc]
// C:                ╰-----⮡ next slice
// E: [                     ccccc]          < the line is incomplete, `scanned` remembers where to resume.
// G: [ccccc                           ]    < we read another chunk after the left-overs.
// B: [ccccccc\ndddddddddddddd\neeeeeee]
// ...
// H: [eeeeeeeee                       ]    < we reach the end of file, the left-over is the last slice.
pub struct BytesLines<R: Read> {
    reader: R,
    buf: BytesMut,
    // How much of the buffer is known to not contain a separator.
    scanned: usize,
    eof: bool,
    line_count: usize,
    chunk_size: usize,
}

/// Logline is a tuple (content with its terminator, line number).
pub type LogLine = (Bytes, usize);

impl<R: Read> Iterator for BytesLines<R> {
    type Item = Result<LogLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Step B: the buffer contains a complete line.
            if let Some(pos) = self.find_next_line() {
                return Some(Ok(self.split_line(pos + 1)));
            }
            // Step H: the last line does not have a terminator.
            if self.eof {
                return match self.buf.len() {
                    0 => None,
                    len => Some(Ok(self.split_line(len))),
                };
            }
            // Step G: we need more data.
            if let Err(e) = self.read_chunk() {
                return Some(Err(e));
            }
        }
    }
}

impl<R: Read> BytesLines<R> {
    /// Creates a new BytesLines.
    pub fn new(reader: R) -> BytesLines<R> {
        BytesLines::with_chunk_size(reader, 8192)
    }

    /// Creates a new BytesLines with a custom read size.
    pub fn with_chunk_size(reader: R, chunk_size: usize) -> BytesLines<R> {
        BytesLines {
            reader,
            chunk_size: chunk_size.max(1),
            buf: BytesMut::with_capacity(chunk_size),
            scanned: 0,
            eof: false,
            line_count: 0,
        }
    }

    /// The number of lines returned so far.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    fn split_line(&mut self, len: usize) -> LogLine {
        // Step C: split_to() creates a new zero copy reference to the buffer.
        self.scanned = 0;
        self.line_count += 1;
        (self.buf.split_to(len).freeze(), self.line_count)
    }

    fn find_next_line(&mut self) -> Option<usize> {
        let found = self.buf[self.scanned..]
            .iter()
            .position(|c| *c == b'\n')
            .map(|pos| pos + self.scanned);
        if found.is_none() {
            self.scanned = self.buf.len();
        }
        found
    }

    fn read_chunk(&mut self) -> Result<()> {
        let pos = self.buf.len();
        // resize() reclaims the space of the slices already returned when possible.
        self.buf.resize(pos + self.chunk_size, 0);
        match self.reader.read(&mut self.buf[pos..]) {
            Ok(n) => {
                self.buf.truncate(pos + n);
                self.eof = n == 0;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {
                self.buf.truncate(pos);
                Ok(())
            }
            Err(e) => {
                self.buf.truncate(pos);
                Err(e)
            }
        }
    }
}

#[test]
fn test_iterator() {
    let get_lines = |reader| -> Vec<LogLine> {
        let lines: Result<Vec<LogLine>> = BytesLines::new(std::io::Cursor::new(reader)).collect();
        lines.unwrap()
    };

    let lines = get_lines("first\nsecond\n\nfourth\\nsub4");
    assert_eq!(
        lines,
        vec![
            ("first\n".into(), 1),
            ("second\n".into(), 2),
            ("\n".into(), 3),
            ("fourth\\nsub4".into(), 4),
        ]
    );

    let lines = get_lines("first\n");
    assert_eq!(lines, vec![("first\n".into(), 1)]);

    assert!(get_lines("").is_empty());
}

#[test]
fn test_small_chunks() {
    let data = "a,b,1.5\nlonger line that spans many chunks\nc\n";
    let lines = BytesLines::with_chunk_size(std::io::Cursor::new(data), 3)
        .map(|l| l.unwrap().0)
        .collect::<Vec<_>>();
    assert_eq!(
        lines,
        vec![
            Bytes::from("a,b,1.5\n"),
            Bytes::from("longer line that spans many chunks\n"),
            Bytes::from("c\n"),
        ]
    );
}

#[test]
fn test_read_error() {
    struct Failing;
    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> Result<usize> {
            Err(std::io::Error::new(ErrorKind::Other, "boom"))
        }
    }
    let mut lines = BytesLines::new(Failing);
    assert!(matches!(lines.next(), Some(Err(_))));
}
