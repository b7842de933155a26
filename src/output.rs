//! Output management module
//!
//! Writes variants as newline-delimited lines to a file or stdout.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Default buffer size for the output sink (1MB)
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Line writer that keeps track of what went through it
pub struct VariantWriter<W: Write> {
    inner: W,
    lines_written: u64,
    bytes_written: u64,
}

impl<W: Write> VariantWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            lines_written: 0,
            bytes_written: 0,
        }
    }

    /// Write one variant followed by a newline
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.lines_written += 1;
        self.bytes_written += line.len() as u64 + 1;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Open the output sink: a truncated file if `path` is given, stdout
/// otherwise. Both are buffered.
pub fn open_sink(path: Option<&Path>, buffer_size: usize) -> io::Result<Box<dyn Write + Send>> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                ensure_output_dir(parent)?;
            }

            let file: File = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?;

            Ok(Box::new(BufWriter::with_capacity(buffer_size, file)))
        }
        None => Ok(Box::new(BufWriter::with_capacity(buffer_size, io::stdout()))),
    }
}

/// Ensure output directory exists
pub fn ensure_output_dir(path: &Path) -> io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_variant_writer() {
        let mut writer = VariantWriter::new(Vec::new());
        writer.write_line("otto").unwrap();
        writer.write_line("OTTO!").unwrap();
        writer.flush().unwrap();

        assert_eq!(writer.lines_written(), 2);
        assert_eq!(writer.bytes_written(), 11);
        assert_eq!(writer.into_inner(), b"otto\nOTTO!\n");
    }

    #[test]
    fn test_open_sink_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("names.txt");

        {
            let mut sink = open_sink(Some(path.as_path()), 1024).unwrap();
            sink.write_all(b"anna\n").unwrap();
            sink.flush().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "anna\n");
    }

    #[test]
    fn test_open_sink_truncates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("names.txt");
        std::fs::write(&path, "stale content\n").unwrap();

        {
            let mut sink = open_sink(Some(path.as_path()), 1024).unwrap();
            sink.write_all(b"fritz\n").unwrap();
        }

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fritz\n");
    }
}
