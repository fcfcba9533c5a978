use std::collections::BTreeMap;
use std::path::PathBuf;

use pgex::formats::{FileKind, LoadOptions};
use serde::Serialize;

use crate::cmd::util::{KindArg, Result, kind_label, load_document, resolve_kind};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long, value_enum)]
	pub kind: Option<KindArg>,
	#[arg(long = "header-only")]
	pub header_only: bool,
	#[arg(long)]
	pub json: bool,
}

#[derive(Serialize)]
struct InfoReport<'a> {
	path: String,
	kind: FileKind,
	header_only: bool,
	title: Option<&'a str>,
	config_pack_id: &'a str,
	counts: BTreeMap<&'static str, usize>,
}

/// Print file kind, header fields and per-section record counts.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		kind,
		header_only,
		json,
	} = args;

	let kind = resolve_kind(&path, kind)?;
	let doc = load_document(&path, kind, &LoadOptions { header_only })?;
	let meta = doc.format_meta();

	if json {
		let report = InfoReport {
			path: path.display().to_string(),
			kind,
			header_only,
			title: doc.title(),
			config_pack_id: &meta.config_pack_id,
			counts: doc.section_counts().into_iter().collect(),
		};
		println!("{}", serde_json::to_string_pretty(&report)?);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("kind: {}", kind_label(kind));
	println!("header_only: {header_only}");
	if let Some(title) = doc.title() {
		println!("title: {title}");
	}
	if !meta.config_pack_id.is_empty() {
		println!("config_pack_id: {}", meta.config_pack_id);
	}
	println!("sections:");
	for (name, count) in doc.section_counts() {
		println!("  {name}: {count}");
	}

	Ok(())
}
