//! Compiles `JCOD` source into class files.
//!
//! The encoder writes bytes while it parses, there is no intermediate tree. Counts and lengths that are
//! left out in the source get reserved and are backpatched once the element is complete.
//!
//! ```text
//! file      := unit*
//! unit      := ("class" | "interface" | "module") name [STRING] struct
//!            | "file" STRING struct
//! struct    := "{" element* "}"
//! element   := struct
//!            | "[" [NUMBER] "]" [b | s | z] struct
//!            | "Bytes" "[" [NUMBER] "]" [b | s | i | z] struct
//!            | "Attr" "(" CPX ["," NUMBER] ")" struct
//!            | NUMBER | CPX | STRING | CHARS | HEXBYTES | "class" | ";"
//! ```
use std::collections::HashMap;
use log::{debug, info, trace};
use crate::buffer::ByteBuffer;
use crate::encoder::context::{FrameKind, ParseContext};
use crate::jstring;
use crate::scanner::{Scanned, Scanner, Value};
use crate::source::{Pos, SourceFile};
use crate::tokens::{pool, Grammar, TokenKind};

pub mod context;

/// The width of the count of arrays, if none is given.
const DEFAULT_ARRAY_WIDTH: usize = 2;
/// The width of the count of `Bytes` blocks, if none is given.
const DEFAULT_BYTES_WIDTH: usize = 4;
const ATTRIBUTE_LENGTH_WIDTH: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct EncoderOptions {
	/// Also produce output for units with errors.
	pub ignore_errors: bool,
	/// The macros available as `&NAME`.
	pub macros: HashMap<String, String>,
}

/// The output of one compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUnit {
	/// The file name, relative to the output directory.
	pub file_name: String,
	pub bytes: Vec<u8>,
	pub had_errors: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Encoded {
	pub units: Vec<CompiledUnit>,
	/// The rendered diagnostics, in the order the units were compiled.
	pub messages: Vec<String>,
	pub errors: usize,
	pub warnings: usize,
}

pub struct Encoder<'a> {
	grammar: &'a Grammar,
	options: EncoderOptions,
}

impl<'a> Encoder<'a> {
	pub fn new(grammar: &'a Grammar, options: EncoderOptions) -> Encoder<'a> {
		Encoder { grammar, options }
	}

	/// Compiles all units of a source file.
	pub fn encode(&self, source: SourceFile) -> Encoded {
		debug!("encoding {:?}", source.name());
		let scanner = Scanner::new(self.grammar, source, &self.options.macros);
		let mut parser = Parser::new(scanner);

		let mut units = Vec::new();
		let mut messages = Vec::new();

		loop {
			let token = parser.token().clone();
			if token.kind == TokenKind::Eof {
				break;
			}

			if !token.kind.starts_unit() {
				let _ = parser.unexpected::<()>(&token, "class, interface, module or file");
				parser.recover();
				messages.extend(parser.scanner.source_mut().flush());
				continue;
			}

			let errors_before = parser.scanner.source_mut().error_count();
			let result = parser.unit();
			if result.is_err() {
				parser.recover();
			}
			let had_errors = parser.scanner.source_mut().error_count() > errors_before;

			let bytes = std::mem::take(&mut parser.buffer).into_vec();
			match parser.unit_name.take() {
				Some(file_name) if !had_errors || self.options.ignore_errors => {
					debug!("compiled {file_name:?}, {} bytes", bytes.len());
					units.push(CompiledUnit { file_name, bytes, had_errors });
				},
				Some(file_name) => info!("not writing {file_name:?} because of errors"),
				None => {},
			}

			messages.extend(parser.scanner.source_mut().flush());
		}

		let source = parser.scanner.into_source();
		Encoded {
			units,
			messages,
			errors: source.error_count(),
			warnings: source.warning_count(),
		}
	}
}

/// Marks that parsing the current unit failed.
///
/// The diagnostic is already reported when this is returned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Recover;

type Parse<T> = std::result::Result<T, Recover>;

/// Counts the items of a struct.
///
/// An item ends at a `;` or is a composite element. A `;` directly after a composite doesn't count as
/// another item, but a lone `;` does.
#[derive(Debug, Default)]
struct Items {
	count: usize,
	pending: bool,
	after_composite: bool,
}

impl Items {
	fn value(&mut self) {
		self.pending = true;
		self.after_composite = false;
	}

	fn composite(&mut self) {
		self.count += 1;
		self.pending = false;
		self.after_composite = true;
	}

	fn semicolon(&mut self) {
		if self.pending || !self.after_composite {
			self.count += 1;
		}
		self.pending = false;
		self.after_composite = false;
	}

	fn finish(self) -> usize {
		self.count + self.pending as usize
	}
}

/// A count or length written before the element it describes.
#[derive(Debug)]
struct Reserved {
	pos: Pos,
	what: &'static str,
	declared: Option<(Pos, u64)>,
	offset: usize,
	/// `0` if nothing was written.
	width: usize,
}

fn width_mask(width: usize) -> u64 {
	if width >= 8 {
		u64::MAX
	} else {
		(1 << (8 * width)) - 1
	}
}

struct Parser<'a> {
	scanner: Scanner<'a>,
	buffer: ByteBuffer,
	context: ParseContext,
	unit_name: Option<String>,
	/// The number of braces open in the current unit.
	depth: usize,
}

impl<'a> Parser<'a> {
	fn new(scanner: Scanner<'a>) -> Parser<'a> {
		Parser {
			scanner,
			buffer: ByteBuffer::new(),
			context: ParseContext::new(),
			unit_name: None,
			depth: 0,
		}
	}

	fn token(&self) -> &Scanned {
		self.scanner.token()
	}

	fn advance(&mut self) {
		self.scanner.advance();
	}

	fn located(&self, message: String) -> String {
		match self.context.describe() {
			Some(location) => format!("{message} {location}"),
			None => message,
		}
	}

	fn error(&mut self, pos: Pos, message: impl Into<String>) {
		let message = self.located(message.into());
		self.scanner.source_mut().error(pos, message);
	}

	fn warning(&mut self, pos: Pos, message: impl Into<String>) {
		let message = self.located(message.into());
		self.scanner.source_mut().warning(pos, message);
	}

	/// Reports `token` as unexpected, unless the scanner already reported it.
	fn unexpected<T>(&mut self, token: &Scanned, expected: &str) -> Parse<T> {
		if token.kind != TokenKind::Error {
			let got = self.scanner.grammar().token(token.kind).name;
			self.error(token.pos, format!("expected {expected}, got {got}"));
		}
		Err(Recover)
	}

	fn expect(&mut self, kind: TokenKind) -> Parse<Scanned> {
		let token = self.token().clone();
		if token.kind == kind {
			self.advance();
			Ok(token)
		} else {
			let expected = self.scanner.grammar().token(kind).name;
			self.unexpected(&token, expected)
		}
	}

	/// Skips tokens until the current unit is left behind.
	///
	/// This stops before a keyword that starts a new unit, and after the brace closing the unit.
	/// Keywords within `()` and `[]` groups are skipped, a `}` ends any group still open.
	fn recover(&mut self) {
		let mut depth = self.depth;
		let mut groups = 0usize;
		loop {
			match self.token().kind {
				TokenKind::Eof => break,
				TokenKind::Interface | TokenKind::Module | TokenKind::File if groups == 0 => break,
				TokenKind::Class if depth <= 1 && groups == 0 => break,
				TokenKind::LParen | TokenKind::LBracket => groups += 1,
				TokenKind::RParen | TokenKind::RBracket => groups = groups.saturating_sub(1),
				TokenKind::LBrace => depth += 1,
				TokenKind::RBrace if depth <= 1 => {
					self.advance();
					break;
				},
				TokenKind::RBrace => depth -= 1,
				_ => {},
			}
			if self.token().kind == TokenKind::RBrace {
				groups = 0;
			}
			self.advance();
		}
		self.depth = 0;
	}

	fn unit(&mut self) -> Parse<()> {
		self.buffer = ByteBuffer::new();
		self.context = ParseContext::new();
		self.unit_name = None;
		self.depth = 0;

		let keyword = self.token().kind;
		self.advance();

		let file_name = if keyword == TokenKind::File {
			let token = self.expect(TokenKind::String)?;
			token.text().unwrap_or_default().to_owned()
		} else {
			let token = self.token().clone();
			let name = match (token.kind, &token.value) {
				(TokenKind::Ident | TokenKind::Compound, Value::Text(name)) => name.clone(),
				_ => return self.unexpected(&token, "a class name"),
			};
			self.advance();

			if self.token().kind == TokenKind::String {
				let name = self.token().text().unwrap_or_default().to_owned();
				self.advance();
				name
			} else {
				format!("{name}.class")
			}
		};
		debug!("compiling unit {file_name:?}");
		self.unit_name = Some(file_name);

		self.context.enter_unit();
		self.structure()?;
		self.context.leave();
		Ok(())
	}

	/// Parses `{ element* }` and returns the number of items in it.
	fn structure(&mut self) -> Parse<usize> {
		self.expect(TokenKind::LBrace)?;
		self.depth += 1;

		let mut items = Items::default();
		loop {
			let token = self.token().clone();
			match token.kind {
				TokenKind::RBrace => {
					self.advance();
					break;
				},
				TokenKind::Semicolon => {
					items.semicolon();
					self.advance();
				},
				TokenKind::Eof => return self.unexpected(&token, "'}'"),
				_ => {
					if self.element()? {
						items.composite();
					} else {
						items.value();
					}
				},
			}
		}

		self.depth -= 1;
		Ok(items.finish())
	}

	/// Parses one element and returns whether it was a composite one.
	fn element(&mut self) -> Parse<bool> {
		let token = self.token().clone();
		match (token.kind, &token.value) {
			(TokenKind::LBrace, _) => {
				self.context.enter_struct();
				self.structure()?;
				self.context.leave();
				Ok(true)
			},
			(TokenKind::LBracket, _) => {
				self.array()?;
				Ok(true)
			},
			(TokenKind::Bytes, _) => {
				self.bytes()?;
				Ok(true)
			},
			(TokenKind::Attr, _) => {
				self.attribute()?;
				Ok(true)
			},
			(TokenKind::Number | TokenKind::CpIndex, &Value::Number { value, width }) => {
				self.buffer.append(value, width);
				self.advance();
				Ok(false)
			},
			(TokenKind::String, Value::Text(text)) => {
				let bytes = jstring::to_modified_utf8(text);
				if bytes.len() > u16::MAX as usize {
					self.error(token.pos, format!("string of {} bytes is too long, at most 65535 are allowed", bytes.len()));
				}
				self.buffer.append(bytes.len() as u64, 2);
				self.buffer.write_slice(&bytes);
				self.advance();
				Ok(false)
			},
			(TokenKind::Chars | TokenKind::HexBytes, Value::Bytes(bytes)) => {
				self.buffer.write_slice(bytes);
				self.advance();
				Ok(false)
			},
			(TokenKind::Class, _) => {
				self.buffer.write(pool::CLASS);
				self.advance();
				Ok(false)
			},
			_ => self.unexpected(&token, "a value, '{', '[', Attr or Bytes"),
		}
	}

	/// Parses an optional count in brackets, the `[` is the current token.
	fn declared_count(&mut self) -> Parse<Option<(Pos, u64)>> {
		self.expect(TokenKind::LBracket)?;
		let token = self.token().clone();
		let declared = match token.number() {
			Some((value, _)) if token.kind == TokenKind::Number => {
				self.advance();
				Some((token.pos, value))
			},
			_ => None,
		};
		self.expect(TokenKind::RBracket)?;
		Ok(declared)
	}

	/// Parses the optional width suffix after `]`.
	///
	/// `z` means that no count is written at all and is returned as `0`.
	fn count_width(&mut self, allowed: &[(&str, usize)], default: usize) -> Parse<usize> {
		let token = self.token().clone();
		let Some(text) = token.text().filter(|_| token.kind == TokenKind::Ident) else {
			return Ok(default);
		};

		match allowed.iter().find(|(name, _)| *name == text) {
			Some(&(_, width)) => {
				self.advance();
				Ok(width)
			},
			None => {
				let names: Vec<_> = allowed.iter().map(|(name, _)| *name).collect();
				self.error(token.pos, format!("invalid count width {text:?}, expected one of {}", names.join(", ")));
				Err(Recover)
			},
		}
	}

	/// Reserves space for a count or length, writing the declared value if there is one.
	fn reserve(&mut self, pos: Pos, declared: Option<(Pos, u64)>, width: usize, what: &'static str) -> Reserved {
		let offset = self.buffer.size();
		if width > 0 {
			let value = match declared {
				Some((pos, value)) if value > width_mask(width) => {
					self.error(pos, format!("{what} {value} doesn't fit into {width} byte(s)"));
					0
				},
				Some((_, value)) => value,
				None => 0,
			};
			self.buffer.append(value, width);
		}
		Reserved { pos, what, declared, offset, width }
	}

	/// Compares the actual count or length with the declared one, or backpatches it if none was declared.
	///
	/// Differences are warned about and the declared value is kept.
	fn reconcile(&mut self, reserved: Reserved, actual: usize, kind: FrameKind) {
		let Reserved { pos, what, declared, offset, width } = reserved;
		match declared {
			None if width == 0 => {},
			None if actual as u64 > width_mask(width) => {
				self.error(pos, format!("{what} {actual} doesn't fit into {width} byte(s)"));
			},
			None => {
				trace!("backpatching {what} {actual} at offset {offset}");
				if let Err(e) = self.buffer.write_at(offset, actual as u64, width) {
					self.error(pos, format!("{e:#}"));
				}
			},
			Some((_, declared)) if declared == actual as u64 => {},
			// the constant pool count is one more than the number of entries, when the unused slot 0 is left out
			Some((_, declared)) if kind == FrameKind::ConstantPool && declared == actual as u64 + 1 => {},
			Some((declared_pos, declared)) => {
				self.warning(declared_pos, format!("{what} is declared as {declared} but is {actual}"));
			},
		}
	}

	fn array(&mut self) -> Parse<()> {
		let pos = self.token().pos;
		let declared = self.declared_count()?;
		let width = self.count_width(&[("b", 1), ("s", 2), ("z", 0)], DEFAULT_ARRAY_WIDTH)?;

		let kind = self.context.enter_array();
		let reserved = self.reserve(pos, declared, width, "array count");
		let actual = self.structure()?;
		self.reconcile(reserved, actual, kind);
		self.context.leave();
		Ok(())
	}

	fn bytes(&mut self) -> Parse<()> {
		let pos = self.token().pos;
		self.advance();
		let declared = self.declared_count()?;
		let width = self.count_width(&[("b", 1), ("s", 2), ("i", 4), ("z", 0)], DEFAULT_BYTES_WIDTH)?;

		let reserved = self.reserve(pos, declared, width, "byte count");
		let start = self.buffer.size();
		self.context.enter_struct();
		self.structure()?;
		self.context.leave();

		let actual = self.buffer.size() - start;
		self.reconcile(reserved, actual, FrameKind::Plain);
		Ok(())
	}

	fn attribute(&mut self) -> Parse<()> {
		let pos = self.token().pos;
		self.advance();
		self.expect(TokenKind::LParen)?;

		let token = self.token().clone();
		match token.number() {
			Some((value, _)) if value <= u16::MAX as u64 => {
				self.buffer.append(value, 2);
				self.advance();
			},
			Some((value, _)) => {
				self.error(token.pos, format!("attribute name index {value} is larger than 65535"));
				self.buffer.append(0, 2);
				self.advance();
			},
			None => return self.unexpected(&token, "the attribute name index"),
		}

		let declared = if self.token().kind == TokenKind::Comma {
			self.advance();
			let token = self.token().clone();
			match token.number() {
				Some((value, _)) => {
					self.advance();
					Some((token.pos, value))
				},
				None => return self.unexpected(&token, "the attribute length"),
			}
		} else {
			None
		};
		self.expect(TokenKind::RParen)?;

		self.context.enter_attribute();
		let reserved = self.reserve(pos, declared, ATTRIBUTE_LENGTH_WIDTH, "attribute length");
		let start = self.buffer.size();
		self.structure()?;

		let actual = self.buffer.size() - start;
		self.reconcile(reserved, actual, FrameKind::Attribute);
		self.context.leave();
		Ok(())
	}
}
