//! Line sources with transparent gzip decompression.
//!
//! The first bytes of every input are peeked; a gzip signature (`1F 8B`)
//! switches the source to streaming multi-member decompression, anything
//! else is read as plain text.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::error::WeaveError;

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// A lazy, non-restartable sequence of lines read from one input.
///
/// Line terminators (`\n`, `\r\n`) are stripped and invalid UTF-8 is
/// replaced lossily. The underlying handle is released when the source is
/// dropped.
pub struct Source {
    path: PathBuf,
    reader: Box<dyn BufRead>,
    compressed: bool,
    buf: Vec<u8>,
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("path", &self.path)
            .field("compressed", &self.compressed)
            .finish_non_exhaustive()
    }
}

impl Source {
    /// Open `path`, detecting gzip compression from its first two bytes.
    pub fn open(path: &Path) -> Result<Self, WeaveError> {
        let file = File::open(path).map_err(|source| WeaveError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(path, file)
    }

    /// Wrap an arbitrary reader; `path` is used for labels and errors.
    pub fn from_reader<R: Read + 'static>(
        path: impl AsRef<Path>,
        reader: R,
    ) -> Result<Self, WeaveError> {
        let path = path.as_ref().to_path_buf();
        let mut buffered = BufReader::new(reader);
        let head = buffered.fill_buf().map_err(|source| WeaveError::Open {
            path: path.clone(),
            source,
        })?;
        let compressed = head.starts_with(&GZIP_MAGIC);

        let reader: Box<dyn BufRead> = if compressed {
            Box::new(BufReader::new(MultiGzDecoder::new(buffered)))
        } else {
            Box::new(buffered)
        };

        Ok(Self {
            path,
            reader,
            compressed,
            buf: Vec::with_capacity(256),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the input was detected as gzip.
    pub const fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Read the next line, or `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<String>, WeaveError> {
        self.buf.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| {
                if self.compressed {
                    WeaveError::Decompress {
                        path: self.path.clone(),
                        source,
                    }
                } else {
                    WeaveError::Io(source)
                }
            })?;
        if n == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

impl Iterator for Source {
    type Item = Result<String, WeaveError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
