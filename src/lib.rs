//! The parts shared by the `jcoder` and `jdec` command line tools.
use anyhow::{anyhow, bail, Context, Result};
use log::LevelFilter;

/// Options that are traditionally written with a single dash.
pub const SINGLE_DASH_OPTIONS: &[&str] = &["-nowrite", "-ignore", "-version"];

/// Rewrites the single dash spellings of long options into the double dash ones clap understands.
pub fn normalize_args(args: impl IntoIterator<Item=String>) -> Vec<String> {
	args.into_iter()
		.map(|arg| {
			if SINGLE_DASH_OPTIONS.contains(&arg.as_str()) {
				format!("-{arg}")
			} else {
				arg
			}
		})
		.collect()
}

/// The log level for the number of times `-v` was given.
pub fn verbosity(count: u8) -> LevelFilter {
	match count {
		0 => LevelFilter::Warn,
		1 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	}
}

/// Sets up logging to stderr.
pub fn init_logging(level: LevelFilter) -> Result<()> {
	fern::Dispatch::new()
		.format(|out, message, record| {
			out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
		})
		.level(level)
		.chain(std::io::stderr())
		.apply()
		.context("couldn't set up logging")
}

/// Parses a macro definition of the form `NAME=VALUE`.
pub fn parse_macro(definition: &str) -> Result<(String, String)> {
	let (name, value) = definition.split_once('=')
		.with_context(|| anyhow!("macro definition {definition:?} is missing the '='"))?;
	if name.is_empty() {
		bail!("macro definition {definition:?} has no name");
	}
	Ok((name.to_owned(), value.to_owned()))
}

/// The line printed after a batch of files.
pub fn summary(errors: usize, warnings: usize) -> String {
	format!("{errors} error(s), {warnings} warning(s)")
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use log::LevelFilter;
	use pretty_assertions::assert_eq;
	use crate::{normalize_args, parse_macro, summary, verbosity};

	#[test]
	fn single_dash_options() {
		let args = ["jcoder", "-nowrite", "-ignore", "-d", "out", "-version", "--ignore", "-v", "A.jcod"]
			.map(String::from);

		assert_eq!(normalize_args(args), vec![
			"jcoder", "--nowrite", "--ignore", "-d", "out", "--version", "--ignore", "-v", "A.jcod",
		]);
	}

	#[test]
	fn macro_definitions() -> Result<()> {
		assert_eq!(parse_macro("VERSION=3;45")?, ("VERSION".to_owned(), "3;45".to_owned()));
		assert_eq!(parse_macro("EMPTY=")?, ("EMPTY".to_owned(), String::new()));
		assert!(parse_macro("VERSION").is_err());
		assert!(parse_macro("=1").is_err());
		Ok(())
	}

	#[test]
	fn levels_and_summary() {
		assert_eq!(verbosity(0), LevelFilter::Warn);
		assert_eq!(verbosity(1), LevelFilter::Debug);
		assert_eq!(verbosity(5), LevelFilter::Trace);
		assert_eq!(summary(1, 2), "1 error(s), 2 warning(s)");
	}
}
