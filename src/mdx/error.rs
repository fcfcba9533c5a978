use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, MdxError>;

/// Errors produced while decoding or encoding MDX text.
#[derive(Debug, Error)]
pub enum MdxError {
	/// Underlying stream failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// A structural delimiter was required but not found.
	#[error("missing {expected:?}")]
	MissingDelimiter {
		/// Delimiter that was expected.
		expected: char,
	},
	/// A structural delimiter appeared where it is not allowed.
	#[error("unexpected {found:?}")]
	UnexpectedCharacter {
		/// Character that was found.
		found: char,
	},
	/// A scalar term could not be decoded.
	#[error("{detail}")]
	MalformedTerm {
		/// Short description such as `bad int`.
		detail: &'static str,
	},
	/// A numeric term does not fit the target type.
	#[error("{kind} out of range")]
	NumericOverflow {
		/// Name of the target numeric kind.
		kind: &'static str,
	},
	/// A non-negative field received a negative value.
	#[error("illegal negative")]
	IllegalNegative,
	/// Decoding one field failed.
	#[error("bad field {field}")]
	BadField {
		/// Token name of the failing field.
		field: String,
		/// Underlying failure.
		#[source]
		source: Box<MdxError>,
	},
	/// Decoding one list item failed.
	#[error("bad array item {index}")]
	BadArrayItem {
		/// Zero-based position of the failing item.
		index: usize,
		/// Underlying failure.
		#[source]
		source: Box<MdxError>,
	},
	/// End of input reached inside a section.
	#[error("unterminated section {section}")]
	UnterminatedSection {
		/// Name of the open section.
		section: String,
	},
	/// A section header line is not valid text.
	#[error("bad section name")]
	BadSectionName,
	/// A load or save callback rejected a record.
	#[error("{message}")]
	Callback {
		/// Message supplied by the callback.
		message: String,
	},
	/// A load callback asked to stop reading; not a failure.
	#[error("interrupted by callback")]
	Interrupt,
}

impl MdxError {
	/// Build a callback rejection with a message.
	pub fn callback(message: impl Into<String>) -> Self {
		Self::Callback { message: message.into() }
	}

	/// Wrap this error with the field it occurred in.
	pub fn in_field(self, field: impl Into<String>) -> Self {
		Self::BadField {
			field: field.into(),
			source: Box::new(self),
		}
	}

	/// Wrap this error with the list position it occurred at.
	pub fn in_item(self, index: usize) -> Self {
		Self::BadArrayItem {
			index,
			source: Box::new(self),
		}
	}

	/// Render this error and every wrapped cause as `outer: inner: root`.
	pub fn chain(&self) -> String {
		let mut out = self.to_string();
		let mut cause = std::error::Error::source(self);
		while let Some(err) = cause {
			out.push_str(": ");
			out.push_str(&err.to_string());
			cause = err.source();
		}
		out
	}

	/// Return the innermost error of a wrapped chain.
	pub fn root(&self) -> &MdxError {
		match self {
			Self::BadField { source, .. } | Self::BadArrayItem { source, .. } => source.root(),
			other => other,
		}
	}
}

/// Failure report for a whole-file load or save.
#[derive(Debug, Error)]
pub enum FileError {
	/// Parsing stopped at a malformed line.
	#[error("failed to parse PGE-X file (line {line_number}): {}", chain_text(.source))]
	Load {
		/// One-based number of the failing line.
		line_number: usize,
		/// Raw text of the failing line.
		line: String,
		/// Underlying failure.
		#[source]
		source: MdxError,
	},
	/// Writing stopped on an error.
	#[error("failed to save PGE-X file: {}", chain_text(.source))]
	Save {
		/// Underlying failure.
		#[source]
		source: MdxError,
	},
}

impl FileError {
	/// Return the engine error that caused this report.
	pub fn engine_error(&self) -> &MdxError {
		match self {
			Self::Load { source, .. } | Self::Save { source } => source,
		}
	}

	/// Return the failing line number for load failures.
	pub fn line_number(&self) -> Option<usize> {
		match self {
			Self::Load { line_number, .. } => Some(*line_number),
			Self::Save { .. } => None,
		}
	}
}

fn chain_text(err: &MdxError) -> String {
	err.chain()
}
