use std::path::{Path, PathBuf};

use pgex::formats::{Document, FileKind, LoadOptions};
use pgex::mdx::{FileError, LineReader, MdxError};
use thiserror::Error;

/// Result alias of the command-line front end.
pub type Result<T> = std::result::Result<T, CliError>;

/// Failures reported by a command.
#[derive(Debug, Error)]
pub enum CliError {
	/// The file kind could not be derived from the path.
	#[error("cannot tell the file kind of {path}; pass --kind")]
	UnknownKind {
		/// Offending path.
		path: PathBuf,
	},
	/// Opening or writing a file failed.
	#[error("{path}: {source}")]
	Open {
		/// File being opened.
		path: PathBuf,
		/// Underlying failure.
		#[source]
		source: MdxError,
	},
	/// Parsing or saving failed.
	#[error(transparent)]
	File(#[from] FileError),
	/// JSON rendering failed.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// `check` found a malformed file; details were already printed.
	#[error("check failed")]
	CheckFailed,
}

/// File kind selectable with `--kind`.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum KindArg {
	/// `.lvlx` level.
	Level,
	/// `.wldx` world map.
	World,
	/// `.savx` game save.
	Gamesave,
	/// `.meta` editor bookmarks.
	Meta,
}

impl From<KindArg> for FileKind {
	fn from(kind: KindArg) -> Self {
		match kind {
			KindArg::Level => Self::Level,
			KindArg::World => Self::World,
			KindArg::Gamesave => Self::Gamesave,
			KindArg::Meta => Self::Meta,
		}
	}
}

/// Pick the explicit kind, falling back to the file extension.
pub(crate) fn resolve_kind(path: &Path, kind: Option<KindArg>) -> Result<FileKind> {
	match kind {
		Some(kind) => Ok(kind.into()),
		None => FileKind::from_path(path).ok_or_else(|| CliError::UnknownKind { path: path.to_owned() }),
	}
}

/// Open `path` and read it as a document.
pub(crate) fn load_document(path: &Path, kind: FileKind, options: &LoadOptions) -> Result<Document> {
	let mut input = LineReader::open(path).map_err(|source| CliError::Open {
		path: path.to_owned(),
		source,
	})?;
	log::debug!("reading {} as {:?}", path.display(), kind);
	Ok(Document::read(kind, &mut input, options)?)
}

/// Render a file kind the way `info` prints it.
pub(crate) fn kind_label(kind: FileKind) -> &'static str {
	match kind {
		FileKind::Level => "level",
		FileKind::World => "world",
		FileKind::Gamesave => "gamesave",
		FileKind::Meta => "meta",
	}
}
