use std::fs;
use std::io::Write;
use std::path::PathBuf;
use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use log::{debug, LevelFilter};
use walkdir::WalkDir;
use jcod::decoder::{Decoder, DecoderOptions};
use jcod::tokens::Grammar;

/// Disassembles class files into `JCOD` source, printed to stdout.
#[derive(Debug, Parser)]
#[command(name = "jdec", version)]
struct Cli {
	/// Print the offsets of members, attributes and constant pool entries.
	#[arg(short = 'g')]
	positions: bool,

	/// Trace every read.
	#[arg(short = 'v', action = ArgAction::Count)]
	verbose: u8,

	/// Class files, or directories to search for them.
	#[arg(required = true)]
	inputs: Vec<PathBuf>,
}

/// The class files to decode, directories are searched recursively.
fn class_files(inputs: &[PathBuf], errors: &mut usize) -> Vec<PathBuf> {
	let mut files = Vec::new();
	for input in inputs {
		if !input.is_dir() {
			files.push(input.clone());
			continue;
		}

		for entry in WalkDir::new(input).sort_by_file_name() {
			match entry {
				Ok(entry) if entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == "class") => {
					files.push(entry.into_path());
				},
				Ok(_) => {},
				Err(e) => {
					eprintln!("couldn't search {input:?}: {e}");
					*errors += 1;
				},
			}
		}
	}
	files
}

fn main() -> Result<()> {
	let cli = Cli::parse_from(jcodtools::normalize_args(std::env::args()));
	let level = if cli.verbose > 0 { LevelFilter::Trace } else { LevelFilter::Warn };
	jcodtools::init_logging(level)?;
	debug!("{cli:?}");

	let grammar = Grammar::new();
	let decoder = Decoder::new(&grammar, DecoderOptions { print_positions: cli.positions });

	let mut errors = 0;
	let mut warnings = 0;
	let files = class_files(&cli.inputs, &mut errors);

	let mut stdout = std::io::stdout().lock();
	for file in &files {
		let data = match fs::read(file).with_context(|| anyhow!("couldn't read {file:?}")) {
			Ok(data) => data,
			Err(e) => {
				eprintln!("{e:#}");
				errors += 1;
				continue;
			},
		};

		let decoded = decoder.decode(&file.display().to_string(), &data);
		stdout.write_all(decoded.text.as_bytes()).context("couldn't write to stdout")?;
		stdout.write_all(b"\n").context("couldn't write to stdout")?;

		for message in &decoded.messages {
			eprintln!("{message}");
		}
		errors += decoded.errors;
		warnings += decoded.warnings;
	}
	stdout.flush().context("couldn't write to stdout")?;

	if errors > 0 || warnings > 0 {
		eprintln!("{}", jcodtools::summary(errors, warnings));
	}
	Ok(())
}
