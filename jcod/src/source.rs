//! Positions in source text and the collection of diagnostics.
use std::fmt::{Display, Formatter};

const LINE_SHIFT: u32 = 32;
const OFFSET_MASK: u64 = (1 << LINE_SHIFT) - 1;

/// A position in the source text.
///
/// The line is stored in the high bits and the offset in the line in the low bits, so positions
/// order like the integers they are. Both are 1-based, a line of `0` means "no position".
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos(u64);

impl Pos {
	pub fn new(line: u32, offset: u32) -> Pos {
		Pos(((line as u64) << LINE_SHIFT) | offset as u64)
	}

	pub fn line(self) -> u32 {
		(self.0 >> LINE_SHIFT) as u32
	}

	pub fn offset(self) -> u32 {
		(self.0 & OFFSET_MASK) as u32
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
	Warning,
	Error,
}

impl Display for Severity {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Severity::Warning => f.write_str("warning"),
			Severity::Error => f.write_str("error"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
	pub pos: Pos,
	pub severity: Severity,
	pub message: String,
}

/// A source text together with the diagnostics reported against it.
///
/// Diagnostics are collected and only rendered on [`SourceFile::flush`], which prints the offending line
/// with a caret under the column.
#[derive(Debug, Clone)]
pub struct SourceFile {
	name: String,
	text: String,
	pending: Vec<Diagnostic>,
	errors: usize,
	warnings: usize,
}

impl SourceFile {
	pub fn new(name: impl Into<String>, text: impl Into<String>) -> SourceFile {
		SourceFile {
			name: name.into(),
			text: text.into(),
			pending: Vec::new(),
			errors: 0,
			warnings: 0,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn error(&mut self, pos: Pos, message: impl Into<String>) {
		self.errors += 1;
		self.pending.push(Diagnostic { pos, severity: Severity::Error, message: message.into() });
	}

	pub fn warning(&mut self, pos: Pos, message: impl Into<String>) {
		self.warnings += 1;
		self.pending.push(Diagnostic { pos, severity: Severity::Warning, message: message.into() });
	}

	/// The number of errors reported so far, including flushed ones.
	pub fn error_count(&self) -> usize {
		self.errors
	}

	/// The number of warnings reported so far, including flushed ones.
	pub fn warning_count(&self) -> usize {
		self.warnings
	}

	/// The diagnostics not yet flushed.
	pub fn pending(&self) -> &[Diagnostic] {
		&self.pending
	}

	/// Renders all pending diagnostics in position order and clears them.
	///
	/// The counters are not reset.
	pub fn flush(&mut self) -> Vec<String> {
		let mut pending = std::mem::take(&mut self.pending);
		pending.sort_by_key(|diagnostic| diagnostic.pos);

		pending.iter()
			.map(|diagnostic| self.render(diagnostic))
			.collect()
	}

	fn render(&self, diagnostic: &Diagnostic) -> String {
		let Diagnostic { pos, severity, message } = diagnostic;
		if pos.line() == 0 {
			return format!("{}: {severity}: {message}", self.name);
		}

		let line_number = pos.line();
		let column = pos.offset();
		let mut rendered = format!("{}:{line_number}:{column}: {severity}: {message}", self.name);

		if let Some(line) = self.text.lines().nth(line_number as usize - 1) {
			// keep tabs so the caret lines up with the text above it
			let caret_prefix: String = line.chars()
				.take(column.saturating_sub(1) as usize)
				.map(|c| if c == '\t' { '\t' } else { ' ' })
				.collect();

			rendered.push('\n');
			rendered.push_str(line);
			rendered.push('\n');
			rendered.push_str(&caret_prefix);
			rendered.push('^');
		}

		rendered
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::source::{Pos, SourceFile};

	#[test]
	fn pos_packing() {
		let pos = Pos::new(12, 34);
		assert_eq!(pos.line(), 12);
		assert_eq!(pos.offset(), 34);

		assert!(Pos::new(1, 500) < Pos::new(2, 1));
		assert!(Pos::new(3, 1) < Pos::new(3, 2));
	}

	#[test]
	fn flush_renders_caret() {
		let mut source = SourceFile::new("Test.jcod", "class Test {\n\t0x12 oops;\n}");
		source.error(Pos::new(2, 7), "unexpected identifier");

		let messages = source.flush();
		assert_eq!(messages, vec![
			"Test.jcod:2:7: error: unexpected identifier\n\t0x12 oops;\n\t     ^".to_owned(),
		]);
		assert!(source.pending().is_empty());
		assert_eq!(source.error_count(), 1);
	}

	#[test]
	fn flush_orders_by_position() {
		let mut source = SourceFile::new("a", "x\ny\n");
		source.warning(Pos::new(2, 1), "second");
		source.error(Pos::new(1, 1), "first");

		let messages = source.flush();
		assert_eq!(messages, vec![
			"a:1:1: error: first\nx\n^".to_owned(),
			"a:2:1: warning: second\ny\n^".to_owned(),
		]);
		assert_eq!(source.warning_count(), 1);
	}
}
