// Copyright (C) 2023 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module provides an iterator of the keywords of a log file.

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use crate::config::Profile;
use crate::reader::DecompressReader;
use crate::Error;
use logkeys_iterator::BytesLines;
use logkeys_normalizer::{normalize, Keyword};

/// Read lines and normalize them with a profile.
pub struct KeywordReader<'a, R: Read> {
    lines: BytesLines<R>,
    /// The name used in error messages
    origin: &'a Path,
    profile: &'a Profile,
    column: usize,
    /// Total bytes count
    pub byte_count: usize,
}

/// Each keyword comes with its line number.
impl<R: Read> Iterator for KeywordReader<'_, R> {
    type Item = Result<(Keyword, usize), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.next().map(|line| {
            let (bytes, pos) = line.map_err(|e| Error::io(self.origin, e))?;
            self.byte_count += bytes.len();
            let line = self.decode(&bytes, pos)?;
            let keyword = normalize(&line, &self.profile.file_type, self.column, &self.profile.rules)?;
            Ok((keyword, pos))
        })
    }
}

impl<'a> KeywordReader<'a, DecompressReader> {
    /// Open a file, `.gz` files are decompressed.
    pub fn open(
        path: &'a Path,
        profile: &'a Profile,
        column: usize,
    ) -> Result<KeywordReader<'a, DecompressReader>, Error> {
        let reader = crate::reader::from_path(path).map_err(|e| Error::io(path, e))?;
        Ok(KeywordReader::new(reader, path, profile, column))
    }
}

impl<'a, R: Read> KeywordReader<'a, R> {
    /// Use a `column` different from the profile one, e.g. to read the matched output.
    pub fn new(read: R, origin: &'a Path, profile: &'a Profile, column: usize) -> Self {
        KeywordReader {
            lines: BytesLines::new(read),
            origin,
            profile,
            column,
            byte_count: 0,
        }
    }

    /// Total lines count
    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    // Windows and old Mac line endings are read as a single new line.
    fn decode<'b>(&self, bytes: &'b [u8], pos: usize) -> Result<Cow<'b, str>, Error> {
        let line = std::str::from_utf8(bytes).map_err(|_| Error::Decode {
            path: self.origin.to_path_buf(),
            line: pos,
        })?;
        let trimmed = line
            .strip_suffix("\r\n")
            .or_else(|| line.strip_suffix('\r'));
        Ok(match trimmed {
            Some(line) => Cow::Owned(format!("{}\n", line)),
            None => Cow::Borrowed(line),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(data: &'static [u8], column: usize) -> Vec<Result<(Keyword, usize), Error>> {
        let profile = Profile::default();
        let path = Path::new("test.log");
        KeywordReader::new(std::io::Cursor::new(data), path, &profile, column).collect()
    }

    fn keywords(data: &'static [u8], column: usize) -> Vec<String> {
        read(data, column)
            .into_iter()
            .map(|r| r.unwrap().0.into())
            .collect()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            keywords(b"a,b,1.5\na,b,2.0\nshort\na,b,last", 3),
            vec!["x\n", "x\n", "\n", "last\n"]
        );
        assert_eq!(keywords(b"a,b,c\r\nd,e\r\n", 2), vec!["b\n", "e\n"]);
        assert_eq!(keywords(b"a,foo\r\nb,last\r", 2), vec!["foo\n", "last\n"]);
        assert_eq!(keywords(b"", 1), Vec::<String>::new());
    }

    #[test]
    fn test_line_numbers() {
        let positions = read(b"a\nb\nc", 1)
            .into_iter()
            .map(|r| r.unwrap().1)
            .collect::<Vec<_>>();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_error() {
        let results = read(b"ok\n\xff\xfe\n", 1);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::Decode { line: 2, .. })));
    }

    #[test]
    fn test_counters() {
        let profile = Profile::default();
        let mut reader = KeywordReader::new(
            std::io::Cursor::new("a\nbc\n"),
            Path::new("test.log"),
            &profile,
            1,
        );
        assert_eq!(reader.by_ref().count(), 2);
        assert_eq!(reader.line_count(), 2);
        assert_eq!(reader.byte_count, 5);
    }
}
