use std::path::PathBuf;

use pgex::formats::LoadOptions;

use crate::cmd::util::{CliError, KindArg, Result, load_document, resolve_kind};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long, value_enum)]
	pub kind: Option<KindArg>,
}

/// Load the file and print `ok`, or the failing line and cause.
pub fn run(args: Args) -> Result<()> {
	let Args { path, kind } = args;

	let kind = resolve_kind(&path, kind)?;
	match load_document(&path, kind, &LoadOptions::default()) {
		Ok(_) => {
			println!("{}: ok", path.display());
			Ok(())
		}
		Err(CliError::File(err)) => {
			println!("{}: failed", path.display());
			if let pgex::mdx::FileError::Load { line_number, line, .. } = &err {
				println!("line_number: {line_number}");
				println!("line: {line}");
			}
			println!("cause: {}", err.engine_error().chain());
			Err(CliError::CheckFailed)
		}
		Err(other) => Err(other),
	}
}
