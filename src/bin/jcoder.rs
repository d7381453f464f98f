use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use log::{debug, info};
use jcod::encoder::{CompiledUnit, Encoder, EncoderOptions};
use jcod::source::SourceFile;
use jcod::tokens::Grammar;

/// Compiles `JCOD` sources into class files.
#[derive(Debug, Parser)]
#[command(name = "jcoder", version)]
struct Cli {
	/// Be verbose, give twice for even more output.
	#[arg(short = 'v', action = ArgAction::Count)]
	verbose: u8,

	/// Don't write any class files.
	#[arg(long = "nowrite")]
	no_write: bool,

	/// Write class files even if their source has errors.
	#[arg(long = "ignore")]
	ignore: bool,

	/// The directory to write the class files into.
	#[arg(short = 'd', value_name = "DIR", default_value = ".")]
	output: PathBuf,

	/// Defines a macro, used as `&NAME` in the sources.
	#[arg(short = 'D', value_name = "NAME=VALUE", value_parser = jcodtools::parse_macro)]
	macros: Vec<(String, String)>,

	#[arg(required = true)]
	files: Vec<PathBuf>,
}

fn write_unit(dir: &Path, unit: &CompiledUnit) -> Result<()> {
	let path = dir.join(&unit.file_name);
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).with_context(|| anyhow!("couldn't create directory {parent:?}"))?;
	}
	fs::write(&path, &unit.bytes).with_context(|| anyhow!("couldn't write {path:?}"))?;
	info!("wrote {path:?}, {} bytes", unit.bytes.len());
	Ok(())
}

fn main() -> Result<()> {
	let cli = Cli::parse_from(jcodtools::normalize_args(std::env::args()));
	jcodtools::init_logging(jcodtools::verbosity(cli.verbose))?;
	debug!("{cli:?}");

	let grammar = Grammar::new();
	let options = EncoderOptions {
		ignore_errors: cli.ignore,
		macros: cli.macros.iter().cloned().collect(),
	};
	let encoder = Encoder::new(&grammar, options);

	let mut errors = 0;
	let mut warnings = 0;
	for file in &cli.files {
		let text = match fs::read_to_string(file).with_context(|| anyhow!("couldn't read {file:?}")) {
			Ok(text) => text,
			Err(e) => {
				eprintln!("{e:#}");
				errors += 1;
				continue;
			},
		};

		let encoded = encoder.encode(SourceFile::new(file.display().to_string(), text));
		for message in &encoded.messages {
			eprintln!("{message}");
		}
		errors += encoded.errors;
		warnings += encoded.warnings;

		if cli.no_write {
			continue;
		}
		for unit in &encoded.units {
			if let Err(e) = write_unit(&cli.output, unit) {
				eprintln!("{e:#}");
				errors += 1;
			}
		}
	}

	if errors > 0 || warnings > 0 {
		eprintln!("{}", jcodtools::summary(errors, warnings));
	}
	if errors > 0 && !cli.ignore {
		std::process::exit(1);
	}
	Ok(())
}
