//! The lexer for `JCOD` source text.
use std::collections::HashMap;
use crate::jstring;
use crate::source::{Pos, SourceFile};
use crate::tokens::{Grammar, TokenKind};

/// How often macros may expand into further macros before any source character is read again.
const MAX_MACRO_EXPANSIONS: usize = 64;

/// The value a token carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Value {
	#[default]
	None,
	/// A number, to be written with `width` bytes.
	Number { value: u64, width: usize },
	/// The text of strings, identifiers and keywords.
	Text(String),
	/// Already encoded bytes, for `'...'` literals and long hex literals.
	Bytes(Vec<u8>),
}

/// A token as produced by the [`Scanner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanned {
	pub kind: TokenKind,
	pub pos: Pos,
	pub value: Value,
}

impl Scanned {
	pub fn number(&self) -> Option<(u64, usize)> {
		match self.value {
			Value::Number { value, width } => Some((value, width)),
			_ => None,
		}
	}

	pub fn text(&self) -> Option<&str> {
		match &self.value {
			Value::Text(text) => Some(text),
			_ => None,
		}
	}
}

pub(crate) fn is_ident_start(c: char) -> bool {
	c.is_alphabetic() || c == '_' || c == '$'
}

pub(crate) fn is_ident_part(c: char) -> bool {
	c.is_alphanumeric() || c == '_' || c == '$'
}

fn width_mask(width: usize) -> u64 {
	if width >= 8 {
		u64::MAX
	} else {
		(1 << (8 * width)) - 1
	}
}

/// Splits a token stream out of a [`SourceFile`].
///
/// The scanner always holds the current token in [`Scanner::token`]; [`Scanner::advance`] moves on to the next one.
/// Problems are reported to the source file, the scanner itself never fails.
pub struct Scanner<'a> {
	grammar: &'a Grammar,
	macros: &'a HashMap<String, String>,
	source: SourceFile,
	chars: Vec<char>,
	index: usize,
	/// Line and offset of `chars[index]`.
	line: u32,
	offset: u32,
	/// Pending characters of expanded macros, the next one last.
	expansion: Vec<char>,
	expansion_pos: Pos,
	expansions: usize,
	ch: Option<char>,
	ch_pos: Pos,
	token: Scanned,
	doc_comment: Option<String>,
}

impl<'a> Scanner<'a> {
	pub fn new(grammar: &'a Grammar, source: SourceFile, macros: &'a HashMap<String, String>) -> Scanner<'a> {
		let chars = source.text().chars().collect();
		let mut scanner = Scanner {
			grammar,
			macros,
			source,
			chars,
			index: 0,
			line: 1,
			offset: 1,
			expansion: Vec::new(),
			expansion_pos: Pos::default(),
			expansions: 0,
			ch: None,
			ch_pos: Pos::default(),
			token: Scanned { kind: TokenKind::Eof, pos: Pos::default(), value: Value::None },
			doc_comment: None,
		};
		scanner.read_char();
		scanner.advance();
		scanner
	}

	pub fn grammar(&self) -> &'a Grammar {
		self.grammar
	}

	/// The current token.
	pub fn token(&self) -> &Scanned {
		&self.token
	}

	pub fn source_mut(&mut self) -> &mut SourceFile {
		&mut self.source
	}

	pub fn into_source(self) -> SourceFile {
		self.source
	}

	/// The text of the last `/** ... */` comment seen.
	pub fn doc_comment(&self) -> Option<&str> {
		self.doc_comment.as_deref()
	}

	/// Moves on to the next token.
	pub fn advance(&mut self) {
		self.token = self.scan();
	}

	/// Scans everything that is left, including the trailing [`TokenKind::Eof`].
	pub fn scan_all(mut self) -> (Vec<Scanned>, SourceFile) {
		let mut tokens = Vec::new();
		loop {
			let token = self.token.clone();
			let eof = token.kind == TokenKind::Eof;
			tokens.push(token);
			if eof {
				return (tokens, self.source);
			}
			self.advance();
		}
	}

	fn read_char(&mut self) {
		if let Some(c) = self.expansion.pop() {
			self.ch = Some(c);
			self.ch_pos = self.expansion_pos;
			return;
		}

		self.ch_pos = Pos::new(self.line, self.offset);
		self.ch = self.chars.get(self.index).copied();
		if let Some(c) = self.ch {
			// only source text ends a chain of expansions, reaching the end doesn't
			self.expansions = 0;
			self.index += 1;
			if c == '\n' {
				self.line += 1;
				self.offset = 1;
			} else {
				self.offset += 1;
			}
		}
	}

	fn make(&self, kind: TokenKind, pos: Pos, value: Value) -> Scanned {
		Scanned { kind, pos, value }
	}

	fn error(&mut self, pos: Pos, message: impl Into<String>) -> Scanned {
		self.source.error(pos, message);
		self.make(TokenKind::Error, pos, Value::None)
	}

	fn scan(&mut self) -> Scanned {
		loop {
			let pos = self.ch_pos;
			let Some(c) = self.ch else {
				return self.make(TokenKind::Eof, pos, Value::None);
			};

			let punctuation = match c {
				'{' => Some(TokenKind::LBrace),
				'}' => Some(TokenKind::RBrace),
				'[' => Some(TokenKind::LBracket),
				']' => Some(TokenKind::RBracket),
				'(' => Some(TokenKind::LParen),
				')' => Some(TokenKind::RParen),
				',' => Some(TokenKind::Comma),
				';' => Some(TokenKind::Semicolon),
				_ => None,
			};
			if let Some(kind) = punctuation {
				self.read_char();
				return self.make(kind, pos, Value::None);
			}

			match c {
				c if c.is_whitespace() => self.read_char(),
				'/' => {
					self.read_char();
					match self.ch {
						Some('/') => self.skip_line_comment(),
						Some('*') => self.skip_block_comment(pos),
						_ => return self.error(pos, "unexpected character '/'"),
					}
				},
				'&' => {
					self.read_char();
					if let Err(message) = self.expand_macro(pos) {
						return self.error(pos, message);
					}
				},
				'"' => {
					self.read_char();
					let text = self.scan_quoted('"', pos, "string");
					return self.make(TokenKind::String, pos, Value::Text(text));
				},
				'\'' => {
					self.read_char();
					let text = self.scan_quoted('\'', pos, "character array");
					return self.make(TokenKind::Chars, pos, Value::Bytes(jstring::to_modified_utf8(&text)));
				},
				'#' => {
					self.read_char();
					return self.scan_cp_index(pos);
				},
				'-' => {
					self.read_char();
					if !self.ch.is_some_and(|c| c.is_ascii_digit()) {
						return self.error(pos, "expected a number after '-'");
					}
					return self.scan_number(pos, true);
				},
				'0'..='9' => return self.scan_number(pos, false),
				c if is_ident_start(c) => return self.scan_ident(pos),
				c => {
					self.read_char();
					return self.error(pos, format!("unexpected character {c:?}"));
				},
			}
		}
	}

	fn skip_line_comment(&mut self) {
		while self.ch.is_some_and(|c| c != '\n') {
			self.read_char();
		}
	}

	/// Skips a `/* ... */` comment, the current character is the `*` after the `/`.
	fn skip_block_comment(&mut self, pos: Pos) {
		self.read_char();
		let is_doc = self.ch == Some('*');

		let mut text = String::new();
		loop {
			match self.ch {
				None => {
					self.source.error(pos, "unterminated comment");
					return;
				},
				Some('*') => {
					self.read_char();
					if self.ch == Some('/') {
						self.read_char();
						break;
					}
					text.push('*');
				},
				Some(c) => {
					text.push(c);
					self.read_char();
				},
			}
		}

		// `/**/` is an empty comment, not a doc comment
		if is_doc && !text.is_empty() {
			let doc = text.strip_prefix('*').unwrap_or(&text);
			self.doc_comment = Some(doc.trim().to_owned());
		}
	}

	/// Expands `&NAME`, the `&` was already read.
	fn expand_macro(&mut self, pos: Pos) -> Result<(), String> {
		let mut name = String::new();
		while let Some(c) = self.ch.filter(|&c| is_ident_part(c)) {
			name.push(c);
			self.read_char();
		}

		if name.is_empty() {
			return Err("expected a macro name after '&'".to_owned());
		}
		let Some(text) = self.macros.get(&name) else {
			return Err(format!("undefined macro {name}"));
		};

		self.expansions += 1;
		if self.expansions > MAX_MACRO_EXPANSIONS {
			return Err(format!("macro {name} expands into itself"));
		}

		// the character after the name must come after the expanded text
		if let Some(c) = self.ch {
			self.expansion.push(c);
		}
		self.expansion.extend(text.chars().rev());
		self.expansion_pos = pos;
		self.read_char();
		Ok(())
	}

	/// Scans the rest of a quoted literal, after the opening quote.
	fn scan_quoted(&mut self, quote: char, pos: Pos, what: &str) -> String {
		let mut text = String::new();
		loop {
			match self.ch {
				None | Some('\n') => {
					self.source.error(pos, format!("unterminated {what}"));
					return text;
				},
				Some(c) if c == quote => {
					self.read_char();
					return text;
				},
				Some('\\') => {
					let escape_pos = self.ch_pos;
					self.read_char();
					if let Some(c) = self.scan_escape(escape_pos) {
						text.push(c);
					}
				},
				Some(c) => {
					text.push(c);
					self.read_char();
				},
			}
		}
	}

	/// Scans the part of an escape sequence after the backslash.
	fn scan_escape(&mut self, pos: Pos) -> Option<char> {
		let c = self.ch?;

		let simple = match c {
			'r' => Some('\r'),
			'n' => Some('\n'),
			'f' => Some('\u{c}'),
			'b' => Some('\u{8}'),
			't' => Some('\t'),
			'\\' => Some('\\'),
			'"' => Some('"'),
			'\'' => Some('\''),
			_ => None,
		};
		if let Some(simple) = simple {
			self.read_char();
			return Some(simple);
		}

		if let Some(first) = c.to_digit(8) {
			let mut value = first;
			self.read_char();
			for _ in 1..3 {
				let Some(digit) = self.ch.and_then(|c| c.to_digit(8)) else { break };
				value = value * 8 + digit;
				self.read_char();
			}

			if value > 0xFF {
				self.source.error(pos, format!("octal escape \\{value:o} is larger than \\377"));
				return None;
			}
			return char::from_u32(value);
		}

		// `\n` is not valid here, the caller ends the literal on it
		if c == '\n' {
			return None;
		}

		self.source.error(pos, format!("invalid escape sequence \\{c}"));
		self.read_char();
		Some(c)
	}

	fn scan_cp_index(&mut self, pos: Pos) -> Scanned {
		if !self.ch.is_some_and(|c| c.is_ascii_digit()) {
			return self.error(pos, "expected a constant pool index after '#'");
		}

		let number = self.scan_number(pos, false);
		match number.number() {
			Some((value, _)) if value <= 0xFFFF => self.make(TokenKind::CpIndex, pos, Value::Number { value, width: 2 }),
			Some((value, _)) => {
				self.source.error(pos, format!("constant pool index #{value} is larger than 65535"));
				self.make(TokenKind::CpIndex, pos, Value::Number { value: 0, width: 2 })
			},
			None => self.error(pos, "malformed constant pool index"),
		}
	}

	/// Scans a decimal or hex number, the current character is the first digit.
	fn scan_number(&mut self, pos: Pos, negative: bool) -> Scanned {
		let mut digits = String::new();
		let mut hex = false;

		if self.ch == Some('0') {
			self.read_char();
			if matches!(self.ch, Some('x' | 'X')) {
				hex = true;
				self.read_char();
			} else {
				digits.push('0');
			}
		}

		let is_digit = if hex { char::is_ascii_hexdigit } else { char::is_ascii_digit };
		while let Some(c) = self.ch.filter(is_digit) {
			digits.push(c);
			self.read_char();
		}

		// `b` is a hex digit, so hex numbers can't use that suffix
		let suffix = self.ch
			.map(|c| c.to_ascii_lowercase())
			.and_then(|c| match c {
				'b' if !hex => Some(1),
				's' => Some(2),
				'i' => Some(4),
				'l' => Some(8),
				_ => None,
			});
		if suffix.is_some() {
			self.read_char();
		}

		let width = suffix.unwrap_or(if hex { digits.len().div_ceil(2).clamp(1, 8) } else { 2 });
		let zero = Value::Number { value: 0, width };

		if self.ch.is_some_and(|c| is_ident_part(c) || c == '.') || digits.is_empty() {
			while self.ch.is_some_and(|c| is_ident_part(c) || c == '.') {
				self.read_char();
			}
			self.source.error(pos, "malformed number");
			return self.make(TokenKind::Number, pos, zero);
		}

		if hex && !negative && suffix.is_none() && digits.len() > 16 {
			let padded = if digits.len() % 2 == 1 { format!("0{digits}") } else { digits };
			let bytes = padded.as_bytes()
				.chunks(2)
				.map(|pair| {
					let pair = std::str::from_utf8(pair).unwrap_or("00");
					u8::from_str_radix(pair, 16).unwrap_or(0)
				})
				.collect();
			return self.make(TokenKind::HexBytes, pos, Value::Bytes(bytes));
		}

		let radix = if hex { 16 } else { 10 };
		let Ok(parsed) = u64::from_str_radix(&digits, radix) else {
			self.source.error(pos, "number too large");
			return self.make(TokenKind::Number, pos, zero);
		};

		let value = if negative {
			let limit = 1u64 << (8 * width - 1);
			(parsed <= limit).then(|| parsed.wrapping_neg() & width_mask(width))
		} else {
			(parsed <= width_mask(width)).then_some(parsed)
		};

		match value {
			Some(value) => self.make(TokenKind::Number, pos, Value::Number { value, width }),
			None => {
				let sign = if negative { "-" } else { "" };
				let prefix = if hex { "0x" } else { "" };
				self.source.error(pos, format!("number {sign}{prefix}{digits} does not fit into {width} byte(s)"));
				self.make(TokenKind::Number, pos, zero)
			},
		}
	}

	fn scan_ident(&mut self, pos: Pos) -> Scanned {
		let mut text = String::new();
		let mut compound = false;
		while let Some(c) = self.ch {
			if matches!(c, '/' | '.' | '-') {
				compound = true;
			} else if !is_ident_part(c) {
				break;
			}
			text.push(c);
			self.read_char();
		}

		if compound {
			return self.make(TokenKind::Compound, pos, Value::Text(text));
		}
		if let Some(kind) = self.grammar.keyword(&text) {
			return self.make(kind, pos, Value::Text(text));
		}
		if let Some(tag) = self.grammar.const_tag(&text) {
			return self.make(TokenKind::Number, pos, Value::Number { value: tag as u64, width: 1 });
		}
		self.make(TokenKind::Ident, pos, Value::Text(text))
	}
}

#[cfg(test)]
mod testing {
	use std::collections::HashMap;
	use pretty_assertions::assert_eq;
	use crate::scanner::{Scanner, Value};
	use crate::source::SourceFile;
	use crate::tokens::{Grammar, TokenKind};

	fn scan_with(text: &str, macros: &HashMap<String, String>) -> (Vec<(TokenKind, Value)>, usize) {
		let grammar = Grammar::new();
		let scanner = Scanner::new(&grammar, SourceFile::new("test", text), macros);
		let (tokens, source) = scanner.scan_all();
		let tokens = tokens.into_iter().map(|t| (t.kind, t.value)).collect();
		(tokens, source.error_count())
	}

	fn scan(text: &str) -> (Vec<(TokenKind, Value)>, usize) {
		scan_with(text, &HashMap::new())
	}

	fn num(value: u64, width: usize) -> (TokenKind, Value) {
		(TokenKind::Number, Value::Number { value, width })
	}

	const EOF: (TokenKind, Value) = (TokenKind::Eof, Value::None);

	#[test]
	fn numbers_and_widths() {
		assert_eq!(scan("52 7b 7s 7i 7l 0x2A 0x0021 0xCAFEBABE 0x12s -1 -1b"), (vec![
			num(52, 2),
			num(7, 1),
			num(7, 2),
			num(7, 4),
			num(7, 8),
			num(0x2A, 1),
			num(0x21, 2),
			num(0xCAFE_BABE, 4),
			num(0x12, 2),
			num(0xFFFF, 2),
			num(0xFF, 1),
			EOF,
		], 0));
	}

	#[test]
	fn long_hex_becomes_bytes() {
		assert_eq!(scan("0x000102030405060708"), (vec![
			(TokenKind::HexBytes, Value::Bytes(vec![0, 1, 2, 3, 4, 5, 6, 7, 8])),
			EOF,
		], 0));
	}

	#[test]
	fn overflow_is_reported_and_zeroed() {
		assert_eq!(scan("300b 65536 -129b 5"), (vec![num(0, 1), num(0, 2), num(0, 1), num(5, 2), EOF], 3));
	}

	#[test]
	fn malformed_number() {
		assert_eq!(scan("12ab ;"), (vec![num(0, 2), (TokenKind::Semicolon, Value::None), EOF], 1));
	}

	#[test]
	fn cp_index() {
		assert_eq!(scan("#12 #0x10 #70000"), (vec![
			(TokenKind::CpIndex, Value::Number { value: 12, width: 2 }),
			(TokenKind::CpIndex, Value::Number { value: 16, width: 2 }),
			(TokenKind::CpIndex, Value::Number { value: 0, width: 2 }),
			EOF,
		], 1));
	}

	#[test]
	fn strings_and_escapes() {
		assert_eq!(scan(r#""a\tb\"\\\101\0" "x""#), (vec![
			(TokenKind::String, Value::Text("a\tb\"\\A\0".to_owned())),
			(TokenKind::String, Value::Text("x".to_owned())),
			EOF,
		], 0));
	}

	#[test]
	fn unterminated_string_keeps_partial_text() {
		assert_eq!(scan("\"abc\n;"), (vec![
			(TokenKind::String, Value::Text("abc".to_owned())),
			(TokenKind::Semicolon, Value::None),
			EOF,
		], 1));
		assert_eq!(scan("\"abc"), (vec![(TokenKind::String, Value::Text("abc".to_owned())), EOF], 1));
	}

	#[test]
	fn octal_escape_too_large() {
		assert_eq!(scan(r#""\777""#), (vec![(TokenKind::String, Value::Text(String::new())), EOF], 1));
	}

	#[test]
	fn char_arrays_use_modified_utf8() {
		assert_eq!(scan("'a\\0\u{e9}\u{20ac}'"), (vec![
			(TokenKind::Chars, Value::Bytes(vec![b'a', 0xC0, 0x80, 0xC3, 0xA9, 0xE2, 0x82, 0xAC])),
			EOF,
		], 0));
	}

	#[test]
	fn identifiers_keywords_and_tags() {
		assert_eq!(scan("class Foo java/lang/Object module-info Method Utf8 Attr bytes"), (vec![
			(TokenKind::Class, Value::Text("class".to_owned())),
			(TokenKind::Ident, Value::Text("Foo".to_owned())),
			(TokenKind::Compound, Value::Text("java/lang/Object".to_owned())),
			(TokenKind::Compound, Value::Text("module-info".to_owned())),
			num(10, 1),
			num(1, 1),
			(TokenKind::Attr, Value::Text("Attr".to_owned())),
			(TokenKind::Bytes, Value::Text("bytes".to_owned())),
			EOF,
		], 0));
	}

	#[test]
	fn comments() {
		let grammar = Grammar::new();
		let macros = HashMap::new();
		let text = "// line\n/* block */ 1 /** the doc */ 2 /**/";
		let mut scanner = Scanner::new(&grammar, SourceFile::new("test", text), &macros);

		assert_eq!(scanner.token().number(), Some((1, 2)));
		scanner.advance();
		assert_eq!(scanner.token().number(), Some((2, 2)));
		assert_eq!(scanner.doc_comment(), Some("the doc"));
		scanner.advance();
		assert_eq!(scanner.token().kind, TokenKind::Eof);
	}

	#[test]
	fn macro_expands_like_inline_text() {
		let macros = HashMap::from([("VERSION".to_owned(), "3;45".to_owned())]);

		assert_eq!(scan_with("&VERSION", &macros), scan("3;45"));
		assert_eq!(scan_with("1 &VERSION;", &macros), scan("1 3;45;"));
	}

	#[test]
	fn undefined_macro() {
		assert_eq!(scan("&NOPE 1"), (vec![(TokenKind::Error, Value::None), num(1, 2), EOF], 1));
	}

	#[test]
	fn recursive_macro_stops() {
		let macros = HashMap::from([("LOOP".to_owned(), "&LOOP".to_owned())]);

		let (tokens, errors) = scan_with("&LOOP", &macros);
		assert_eq!(tokens, vec![(TokenKind::Error, Value::None), EOF]);
		assert_eq!(errors, 1);

		let (tokens, errors) = scan_with("&LOOP ", &macros);
		assert_eq!(tokens, vec![(TokenKind::Error, Value::None), EOF]);
		assert_eq!(errors, 1);
	}

	#[test]
	fn mutually_recursive_macros_stop() {
		let macros = HashMap::from([
			("PING".to_owned(), "&PONG".to_owned()),
			("PONG".to_owned(), "&PING".to_owned()),
		]);

		let (tokens, errors) = scan_with("1b; &PING", &macros);
		assert_eq!(tokens[tokens.len() - 2..].to_vec(), vec![(TokenKind::Error, Value::None), EOF]);
		assert_eq!(errors, 1);
	}

	#[test]
	fn positions_are_line_and_offset() {
		let grammar = Grammar::new();
		let macros = HashMap::new();
		let scanner = Scanner::new(&grammar, SourceFile::new("test", "a\n  b"), &macros);
		let (tokens, _) = scanner.scan_all();

		assert_eq!((tokens[0].pos.line(), tokens[0].pos.offset()), (1, 1));
		assert_eq!((tokens[1].pos.line(), tokens[1].pos.offset()), (2, 3));
	}
}
