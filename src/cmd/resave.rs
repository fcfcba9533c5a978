use std::path::PathBuf;

use pgex::formats::LoadOptions;
use pgex::mdx::TextWriter;

use crate::cmd::util::{CliError, KindArg, Result, kind_label, load_document, resolve_kind};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long, short)]
	pub output: PathBuf,
	#[arg(long, value_enum)]
	pub kind: Option<KindArg>,
}

/// Load a file and write it back through the engine.
///
/// Unknown sections and fields are dropped and default values omitted.
pub fn run(args: Args) -> Result<()> {
	let Args { path, output, kind } = args;

	let kind = resolve_kind(&path, kind)?;
	let doc = load_document(&path, kind, &LoadOptions::default())?;

	let mut writer = TextWriter::create(&output).map_err(|source| CliError::Open {
		path: output.clone(),
		source,
	})?;
	doc.write(&mut writer)?;

	println!("path: {}", path.display());
	println!("kind: {}", kind_label(kind));
	println!("output: {}", output.display());
	Ok(())
}
