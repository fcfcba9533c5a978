use std::path::PathBuf;

use pgex::formats::LoadOptions;

use crate::cmd::util::{KindArg, Result, load_document, resolve_kind};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long, value_enum)]
	pub kind: Option<KindArg>,
	#[arg(long = "header-only")]
	pub header_only: bool,
}

/// Print the loaded document as pretty JSON.
pub fn run(args: Args) -> Result<()> {
	let Args { path, kind, header_only } = args;

	let kind = resolve_kind(&path, kind)?;
	let doc = load_document(&path, kind, &LoadOptions { header_only })?;
	println!("{}", serde_json::to_string_pretty(&doc)?);
	Ok(())
}
