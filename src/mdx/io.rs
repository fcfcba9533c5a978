use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor as IoCursor, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::mdx::Result;


/// Line-oriented input consumed by the file loader.
pub trait TextInput {
	/// Read the next line into `line` without its terminator.
	///
	/// Returns false at end of input.
	fn read_line(&mut self, line: &mut Vec<u8>) -> Result<bool>;

	/// Seek back to the first line.
	fn rewind(&mut self) -> Result<()>;

	/// One-based number of the line read last; 0 before the first read.
	fn line_number(&self) -> usize;

	/// Path of the backing file, when there is one.
	fn file_path(&self) -> Option<&Path> {
		None
	}
}

/// Text sink used by the file saver.
pub trait TextOutput {
	/// Write `text` and return the number of bytes written.
	fn write(&mut self, text: &str) -> Result<usize>;

	/// Push buffered text to the underlying stream.
	fn flush(&mut self) -> Result<()> {
		Ok(())
	}
}

/// [`TextInput`] over any seekable buffered reader.
pub struct LineReader<R> {
	inner: R,
	line_number: usize,
	path: Option<PathBuf>,
}

impl<R: BufRead + Seek> LineReader<R> {
	/// Wrap a reader positioned anywhere; loading rewinds it.
	pub fn new(inner: R) -> Self {
		Self {
			inner,
			line_number: 0,
			path: None,
		}
	}

	/// Attach the path reported by [`TextInput::file_path`].
	pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.path = Some(path.into());
		self
	}
}

impl LineReader<BufReader<File>> {
	/// Open a file for line reading.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let file = File::open(path)?;
		Ok(Self::new(BufReader::new(file)).with_path(path))
	}
}

impl<'a> LineReader<IoCursor<&'a [u8]>> {
	/// Read lines from an in-memory buffer.
	pub fn from_bytes(bytes: &'a [u8]) -> Self {
		Self::new(IoCursor::new(bytes))
	}
}

impl<R: BufRead + Seek> TextInput for LineReader<R> {
	fn read_line(&mut self, line: &mut Vec<u8>) -> Result<bool> {
		line.clear();
		if self.inner.read_until(b'\n', line)? == 0 {
			return Ok(false);
		}

		if line.last() == Some(&b'\n') {
			line.pop();
		}
		if line.last() == Some(&b'\r') {
			line.pop();
		}
		self.line_number += 1;
		Ok(true)
	}

	fn rewind(&mut self) -> Result<()> {
		self.inner.seek(SeekFrom::Start(0))?;
		self.line_number = 0;
		Ok(())
	}

	fn line_number(&self) -> usize {
		self.line_number
	}

	fn file_path(&self) -> Option<&Path> {
		self.path.as_deref()
	}
}

/// [`TextOutput`] over any writer.
pub struct TextWriter<W: Write> {
	inner: W,
}

impl<W: Write> TextWriter<W> {
	/// Wrap a writer.
	pub fn new(inner: W) -> Self {
		Self { inner }
	}

	/// Unwrap the writer.
	pub fn into_inner(self) -> W {
		self.inner
	}
}

impl TextWriter<BufWriter<File>> {
	/// Create or truncate a file for writing.
	pub fn create(path: impl AsRef<Path>) -> Result<Self> {
		Ok(Self::new(BufWriter::new(File::create(path)?)))
	}
}

impl<W: Write> TextOutput for TextWriter<W> {
	fn write(&mut self, text: &str) -> Result<usize> {
		self.inner.write_all(text.as_bytes())?;
		Ok(text.len())
	}

	fn flush(&mut self) -> Result<()> {
		self.inner.flush()?;
		Ok(())
	}
}

impl TextOutput for String {
	fn write(&mut self, text: &str) -> Result<usize> {
		self.push_str(text);
		Ok(text.len())
	}
}
