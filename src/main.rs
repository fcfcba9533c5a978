#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "pgex", about = "PGE-X level, world and game-save file tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print file kind, header and per-section record counts.
	Info(cmd::info::Args),
	/// Load a file and report whether it parses.
	Check(cmd::check::Args),
	/// Print the loaded file as JSON.
	Dump(cmd::dump::Args),
	/// Load a file and write it back in normalized form.
	Resave(cmd::resave::Args),
}

fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> cmd::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Check(args) => cmd::check::run(args),
		Commands::Dump(args) => cmd::dump::run(args),
		Commands::Resave(args) => cmd::resave::run(args),
	}
}
