use std::fmt::Write;

/// The number of bytes per line of a hex dump.
const HEX_LINE_BYTES: usize = 16;

/// Collects indented output lines.
#[derive(Debug)]
pub(crate) struct Printer {
	out: String,
	indent: usize,
	/// Whether comments carry offsets into the class file.
	positions: bool,
}

impl Printer {
	pub(crate) fn new(positions: bool, indent: usize) -> Printer {
		Printer { out: String::new(), indent, positions }
	}

	pub(crate) fn line(&mut self, text: impl AsRef<str>) {
		for _ in 0..self.indent {
			self.out.push('\t');
		}
		self.out.push_str(text.as_ref());
		self.out.push('\n');
	}

	/// Prints a line ending in an opening brace and indents the following ones.
	pub(crate) fn open(&mut self, text: impl AsRef<str>) {
		self.line(text);
		self.indent += 1;
	}

	pub(crate) fn close(&mut self) {
		self.close_with("");
	}

	pub(crate) fn close_with(&mut self, comment: &str) {
		self.indent = self.indent.saturating_sub(1);
		self.line(format!("}}{comment}"));
	}

	/// Closes everything opened with [`Printer::open`].
	pub(crate) fn close_all(&mut self, base: usize) {
		while self.indent > base {
			self.close();
		}
	}

	/// A line comment, with the offset if positions are enabled.
	///
	/// This is empty if there's nothing to say.
	pub(crate) fn comment(&self, text: &str, offset: Option<usize>) -> String {
		let position = match offset {
			Some(offset) if self.positions => format!("@{offset:#06x}"),
			_ => String::new(),
		};
		match (text.is_empty(), position.is_empty()) {
			(true, true) => String::new(),
			(false, true) => format!(" // {text}"),
			(true, false) => format!(" // {position}"),
			(false, false) => format!(" // {text} {position}"),
		}
	}

	/// Prints bytes as hex literals, one line per 16 bytes.
	pub(crate) fn hex_lines(&mut self, bytes: &[u8]) {
		for chunk in bytes.chunks(HEX_LINE_BYTES) {
			self.line(format!("{};", hex(chunk)));
		}
	}

	pub(crate) fn finish(self) -> String {
		self.out
	}
}

/// Formats bytes as a single hex literal, which encodes back to exactly these bytes.
pub(crate) fn hex(bytes: &[u8]) -> String {
	let mut s = String::with_capacity(2 + 2 * bytes.len());
	s.push_str("0x");
	for byte in bytes {
		let _ = write!(s, "{byte:02X}");
	}
	s
}

/// Formats bytes as hex literals on one line.
pub(crate) fn hex_inline(bytes: &[u8]) -> String {
	bytes.chunks(HEX_LINE_BYTES)
		.map(|chunk| format!("{};", hex(chunk)))
		.collect::<Vec<_>>()
		.join(" ")
}

/// Formats a `u4`, adding the suffix if it doesn't fit into the default width.
pub(crate) fn u4(value: u32) -> String {
	if value > u16::MAX as u32 {
		format!("{value}i")
	} else {
		value.to_string()
	}
}

/// Escapes text for a string literal.
pub(crate) fn escape(text: &str) -> String {
	let mut s = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'"' => s.push_str("\\\""),
			'\\' => s.push_str("\\\\"),
			'\n' => s.push_str("\\n"),
			'\r' => s.push_str("\\r"),
			'\t' => s.push_str("\\t"),
			'\u{c}' => s.push_str("\\f"),
			'\u{8}' => s.push_str("\\b"),
			c if c.is_control() && (c as u32) <= 0xFF => {
				let _ = write!(s, "\\{:03o}", c as u32);
			},
			c => s.push(c),
		}
	}
	s
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::decoder::printer::{escape, hex, hex_inline, u4, Printer};

	#[test]
	fn indentation() {
		let mut printer = Printer::new(false, 0);
		printer.open("class A {");
		printer.open("[1] {");
		printer.line("#1;");
		printer.close_all(0);

		assert_eq!(printer.finish(), "class A {\n\t[1] {\n\t\t#1;\n\t}\n}\n");
	}

	#[test]
	fn comments() {
		let printer = Printer::new(true, 0);
		assert_eq!(printer.comment("access", Some(0x1A)), " // access @0x001a");
		assert_eq!(printer.comment("", None), "");

		let printer = Printer::new(false, 0);
		assert_eq!(printer.comment("access", Some(0x1A)), " // access");
		assert_eq!(printer.comment("", Some(3)), "");
	}

	#[test]
	fn formatting() {
		assert_eq!(hex(&[0, 0x1F, 0xAB]), "0x001FAB");
		assert_eq!(hex_inline(&[1; 17]), "0x01010101010101010101010101010101; 0x01;");
		assert_eq!(u4(65535), "65535");
		assert_eq!(u4(65536), "65536i");
		assert_eq!(escape("a\"b\\c\n\0\u{7f}é"), "a\\\"b\\\\c\\n\\000\\177é");
	}
}
