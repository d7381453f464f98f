//! Disassembles class files into `JCOD` source.
//!
//! The output encodes back to the exact input bytes: every value carries its width, every array its count
//! and every attribute its length. When the class file can't be read any further, the rest of it is printed
//! as a `Bytes` block, so that even then nothing is lost.
use std::fmt::Display;
use std::path::Path;
use anyhow::{bail, Error, Result};
use log::{debug, trace};
use crate::decoder::printer::Printer;
use crate::decoder::reader::ClassReader;
use crate::jstring;
use crate::model::class_constants::{flags, MAGIC};
use crate::model::{Attribute, ClassUnit, ConstantPool, ConstantPoolEntry, DynamicKind, Member, RefKind};
use crate::scanner::{is_ident_part, is_ident_start};
use crate::source::Severity;
use crate::tokens::{pool, Grammar};

mod attribute;
mod printer;
mod reader;

#[derive(Debug, Clone, Default)]
pub struct DecoderOptions {
	/// Add the offset of members, attributes and constant pool entries as comments.
	pub print_positions: bool,
}

#[derive(Debug, Clone)]
pub struct Decoded {
	pub text: String,
	/// The class file, if it was read without errors.
	pub unit: Option<ClassUnit>,
	pub messages: Vec<String>,
	pub errors: usize,
	pub warnings: usize,
}

pub struct Decoder<'a> {
	grammar: &'a Grammar,
	options: DecoderOptions,
}

impl<'a> Decoder<'a> {
	pub fn new(grammar: &'a Grammar, options: DecoderOptions) -> Decoder<'a> {
		Decoder { grammar, options }
	}

	/// Decodes a class file, `file_name` is used in messages.
	pub fn decode(&self, file_name: &str, data: &[u8]) -> Decoded {
		debug!("decoding {file_name:?}, {} bytes", data.len());
		let mut state = DecodeState::new(self.grammar, data, file_name, &self.options);

		let unit = match state.class() {
			Ok(unit) => Some(unit),
			Err(e) => {
				state.abort(&e);
				None
			},
		};

		let pool = unit.as_ref().map_or(&state.pool, |unit| &unit.constant_pool);
		let header = header(self.grammar, pool, state.this_class, state.access_flags, file_name);

		let DecodeState { out, report, .. } = state;
		let Report { messages, errors, warnings, .. } = report;
		debug!("decoded {file_name:?} with {errors} error(s) and {warnings} warning(s)");

		Decoded {
			text: format!("{header} {{\n{}}}\n", out.finish()),
			unit: unit.filter(|_| errors == 0),
			messages,
			errors,
			warnings,
		}
	}
}

/// The diagnostics of decoding one file.
#[derive(Debug)]
pub(crate) struct Report {
	file_name: String,
	messages: Vec<String>,
	pub(crate) errors: usize,
	pub(crate) warnings: usize,
}

impl Report {
	pub(crate) fn new(file_name: impl Into<String>) -> Report {
		Report { file_name: file_name.into(), messages: Vec::new(), errors: 0, warnings: 0 }
	}

	fn push(&mut self, severity: Severity, offset: usize, message: impl Display) {
		self.messages.push(format!("{}: {severity}: {message} (at offset {offset:#x})", self.file_name));
	}

	pub(crate) fn error(&mut self, offset: usize, message: impl Display) {
		self.errors += 1;
		self.push(Severity::Error, offset, message);
	}

	pub(crate) fn warning(&mut self, offset: usize, message: impl Display) {
		self.warnings += 1;
		self.push(Severity::Warning, offset, message);
	}
}

/// The indentation of everything inside the unit.
const BODY_INDENT: usize = 1;

struct DecodeState<'a, 'd> {
	grammar: &'a Grammar,
	reader: ClassReader<'d>,
	out: Printer,
	report: Report,
	/// The offset of the first byte not yet printed.
	mark: usize,
	pool: ConstantPool,
	this_class: Option<u16>,
	access_flags: Option<u16>,
}

impl<'a, 'd> DecodeState<'a, 'd> {
	fn new(grammar: &'a Grammar, data: &'d [u8], file_name: &str, options: &DecoderOptions) -> DecodeState<'a, 'd> {
		DecodeState {
			grammar,
			reader: ClassReader::new(data),
			out: Printer::new(options.print_positions, BODY_INDENT),
			report: Report::new(file_name),
			mark: 0,
			pool: ConstantPool::new(),
			this_class: None,
			access_flags: None,
		}
	}

	/// Everything up to the current position is printed.
	fn printed(&mut self) {
		self.mark = self.reader.pos();
	}

	fn class(&mut self) -> Result<ClassUnit> {
		let magic = self.reader.read_u32()?;
		let minor_version = self.reader.read_u16()?;
		let major_version = self.reader.read_u16()?;
		if magic != MAGIC {
			self.report.error(0, format!("wrong magic {magic:#010x}, expected {MAGIC:#010x}"));
		}
		self.out.line(format!("0x{magic:08X}; // magic"));
		self.out.line(format!("{minor_version}; // minor version"));
		self.out.line(format!("{major_version}; // major version"));
		self.printed();

		self.constant_pool()?;

		let access_flags = self.reader.read_u16()?;
		self.out.line(format!("0x{access_flags:04X}; // access"));
		self.access_flags = Some(access_flags);
		self.printed();

		let this_class = self.reader.read_u16()?;
		self.out.line(format!("#{this_class}; // this_cpx"));
		self.this_class = Some(this_class);
		self.printed();

		let super_class = self.reader.read_u16()?;
		self.out.line(format!("#{super_class}; // super_cpx"));
		self.printed();

		let interfaces = self.interfaces()?;
		let fields = self.members("Fields", "Field")?;
		let methods = self.members("Methods", "Method")?;

		let start = self.reader.pos();
		let count = self.reader.read_u16()?;
		self.printed();
		let attributes = self.attributes(count, start)?;

		if self.reader.remaining() > 0 {
			let extra = self.reader.remaining();
			self.report.error(self.reader.pos(), format!("{extra} bytes after the end of the class"));
			self.dump_rest("bytes after the end of the class");
		}

		Ok(ClassUnit {
			magic,
			minor_version,
			major_version,
			constant_pool: std::mem::take(&mut self.pool),
			access_flags,
			this_class,
			super_class,
			interfaces,
			fields,
			methods,
			attributes,
		})
	}

	fn constant_pool(&mut self) -> Result<()> {
		let start = self.reader.pos();
		let count = self.reader.read_u16()? as usize;
		self.out.open(format!("[{count}] {{{}", self.out.comment("Constant Pool", Some(start))));
		self.printed();

		if count == 0 {
			self.report.error(start, "the constant pool count is 0, but it includes the unused entry #0");
		} else {
			self.out.line("; // first element is empty");
		}

		let mut index = 1;
		while index < count {
			let offset = self.reader.pos();
			let entry = self.entry(index)?;
			trace!("constant pool entry #{index}: {entry:?}");

			let (text, note) = self.entry_text(&entry);
			let label = match note {
				Some(note) => format!("#{index} {note}"),
				None => format!("#{index}"),
			};
			self.out.line(format!("{text};{}", self.out.comment(&label, Some(offset))));

			let wide = entry.is_wide();
			self.pool.push(entry);
			index += 1;
			if wide {
				if index < count {
					self.out.line(format!(";{}", self.out.comment(&format!("#{index}"), None)));
				} else {
					self.report.error(offset, format!("entry #{} takes two slots, but the constant pool only has {count}", index - 1));
				}
				index += 1;
			}
			self.printed();
		}

		self.out.close_with(" // end Constant Pool");
		Ok(())
	}

	fn entry(&mut self, index: usize) -> Result<ConstantPoolEntry> {
		let r = &mut self.reader;
		Ok(match r.read_u8()? {
			pool::UTF8 => {
				let length = r.read_u16_as_usize()?;
				ConstantPoolEntry::Utf8(r.take(length)?.to_vec())
			},
			pool::INTEGER => ConstantPoolEntry::Integer(r.read_u32()?),
			pool::FLOAT => ConstantPoolEntry::Float(r.read_u32()?),
			pool::LONG => ConstantPoolEntry::Long(r.read_u64()?),
			pool::DOUBLE => ConstantPoolEntry::Double(r.read_u64()?),
			pool::CLASS => ConstantPoolEntry::Class { name_index: r.read_u16()? },
			pool::STRING => ConstantPoolEntry::String { string_index: r.read_u16()? },
			tag @ (pool::FIELD_REF | pool::METHOD_REF | pool::INTERFACE_METHOD_REF) => ConstantPoolEntry::Reference {
				kind: match tag {
					pool::FIELD_REF => RefKind::Field,
					pool::METHOD_REF => RefKind::Method,
					_ => RefKind::InterfaceMethod,
				},
				class_index: r.read_u16()?,
				name_and_type_index: r.read_u16()?,
			},
			pool::NAME_AND_TYPE => ConstantPoolEntry::NameAndType {
				name_index: r.read_u16()?,
				descriptor_index: r.read_u16()?,
			},
			pool::METHOD_HANDLE => ConstantPoolEntry::MethodHandle {
				reference_kind: r.read_u8()?,
				reference_index: r.read_u16()?,
			},
			pool::METHOD_TYPE => ConstantPoolEntry::MethodType { descriptor_index: r.read_u16()? },
			tag @ (pool::DYNAMIC | pool::INVOKE_DYNAMIC) => ConstantPoolEntry::Dynamic {
				kind: if tag == pool::DYNAMIC { DynamicKind::Constant } else { DynamicKind::Invoke },
				bootstrap_method_attr_index: r.read_u16()?,
				name_and_type_index: r.read_u16()?,
			},
			pool::MODULE => ConstantPoolEntry::Module { name_index: r.read_u16()? },
			pool::PACKAGE => ConstantPoolEntry::Package { name_index: r.read_u16()? },
			tag => bail!("unknown constant pool tag {tag} at index #{index}"),
		})
	}

	/// The source of an entry, and a note on its value.
	fn entry_text(&self, entry: &ConstantPoolEntry) -> (String, Option<String>) {
		let name = self.grammar.const_type(entry.tag()).map_or("?", |c| c.name);
		match entry {
			ConstantPoolEntry::Utf8(bytes) => match jstring::to_printable_string(bytes) {
				Some(text) => (format!("{name} \"{}\"", printer::escape(&text)), None),
				None => (format!("{name} Bytes[{}]s {{ {} }}", bytes.len(), printer::hex_inline(bytes)), None),
			},
			ConstantPoolEntry::Integer(value) => (format!("{name} 0x{value:08X}"), Some((*value as i32).to_string())),
			ConstantPoolEntry::Float(bits) => (format!("{name} 0x{bits:08X}"), Some(format!("{:?}f", f32::from_bits(*bits)))),
			ConstantPoolEntry::Long(value) => (format!("{name} 0x{value:016X}"), Some(format!("{}l", *value as i64))),
			ConstantPoolEntry::Double(bits) => (format!("{name} 0x{bits:016X}"), Some(format!("{:?}d", f64::from_bits(*bits)))),
			ConstantPoolEntry::Class { name_index } => (format!("{name} #{name_index}"), None),
			ConstantPoolEntry::String { string_index } => (format!("{name} #{string_index}"), None),
			ConstantPoolEntry::Reference { class_index, name_and_type_index, .. } => {
				(format!("{name} #{class_index} #{name_and_type_index}"), None)
			},
			ConstantPoolEntry::NameAndType { name_index, descriptor_index } => {
				(format!("{name} #{name_index} #{descriptor_index}"), None)
			},
			ConstantPoolEntry::MethodHandle { reference_kind, reference_index } => {
				(format!("{name} {reference_kind}b #{reference_index}"), None)
			},
			ConstantPoolEntry::MethodType { descriptor_index } => (format!("{name} #{descriptor_index}"), None),
			ConstantPoolEntry::Dynamic { bootstrap_method_attr_index, name_and_type_index, .. } => {
				(format!("{name} {bootstrap_method_attr_index} #{name_and_type_index}"), None)
			},
			ConstantPoolEntry::Module { name_index } | ConstantPoolEntry::Package { name_index } => {
				(format!("{name} #{name_index}"), None)
			},
		}
	}

	fn interfaces(&mut self) -> Result<Vec<u16>> {
		let start = self.reader.pos();
		let count = self.reader.read_u16()?;
		self.out.open(format!("[{count}] {{{}", self.out.comment("Interfaces", Some(start))));
		self.printed();

		let mut interfaces = Vec::new();
		for _ in 0..count {
			let index = self.reader.read_u16()?;
			let name = self.pool.class_name(index).map(|name| printer::escape(&name));
			self.out.line(format!("#{index};{}", self.out.comment(name.as_deref().unwrap_or_default(), None)));
			self.printed();
			interfaces.push(index);
		}

		self.out.close_with(" // end Interfaces");
		Ok(interfaces)
	}

	fn members(&mut self, label: &str, member: &str) -> Result<Vec<Member>> {
		let start = self.reader.pos();
		let count = self.reader.read_u16()?;
		self.out.open(format!("[{count}] {{{}", self.out.comment(label, Some(start))));
		self.printed();

		let mut members = Vec::new();
		for i in 1..=count {
			let offset = self.reader.pos();
			let access_flags = self.reader.read_u16()?;
			let name_index = self.reader.read_u16()?;
			let descriptor_index = self.reader.read_u16()?;
			let attributes_start = self.reader.pos();
			let attribute_count = self.reader.read_u16()?;

			let name = self.pool.utf8_text(name_index).map(|name| printer::escape(&name));
			let descriptor = self.pool.utf8_text(descriptor_index).map(|descriptor| printer::escape(&descriptor));

			self.out.open(format!("{{{}", self.out.comment(&format!("{member} #{i}"), Some(offset))));
			self.out.line(format!("0x{access_flags:04X}; // access"));
			self.out.line(format!("#{name_index};{}", self.out.comment(name.as_deref().unwrap_or_default(), None)));
			self.out.line(format!("#{descriptor_index};{}", self.out.comment(descriptor.as_deref().unwrap_or_default(), None)));
			self.printed();

			let attributes = self.attributes(attribute_count, attributes_start)?;
			self.out.close_with(&format!(" // {member}"));

			members.push(Member { access_flags, name_index, descriptor_index, attributes });
		}

		self.out.close_with(&format!(" // end {label}"));
		Ok(members)
	}

	fn attributes(&mut self, count: u16, start: usize) -> Result<Vec<Attribute>> {
		self.out.open(format!("[{count}] {{{}", self.out.comment("Attributes", Some(start))));

		let mut attributes = Vec::new();
		for _ in 0..count {
			let offset = self.reader.pos();
			let (attribute, length) = attribute::read_attribute(&mut self.reader, &self.pool, &mut self.report)?;
			attribute::print_attribute(&mut self.out, &self.pool, &attribute, Some(length), Some(offset));
			self.printed();
			attributes.push(attribute);
		}

		self.out.close_with(" // Attributes");
		Ok(attributes)
	}

	/// Reports a failure to read any further and prints the rest of the file as bytes.
	fn abort(&mut self, error: &Error) {
		self.report.error(self.reader.pos(), format!("{error:#}"));
		self.out.close_all(BODY_INDENT);
		self.dump_rest("couldn't decode the rest of the file");
	}

	fn dump_rest(&mut self, comment: &str) {
		let rest = self.reader.rest_from(self.mark);
		self.out.open(format!("Bytes[{}]z {{ // {comment}, from offset {:#x}", rest.len(), self.mark));
		self.out.hex_lines(rest);
		self.out.close();
		self.mark += rest.len();
	}
}

/// Whether the encoder reads `name` back as the name of a unit.
fn is_unit_name(grammar: &Grammar, name: &str) -> bool {
	let compound = name.contains(['/', '.', '-']);
	name.starts_with(is_ident_start)
		&& name.chars().all(|c| is_ident_part(c) || matches!(c, '/' | '.' | '-'))
		&& (compound || (grammar.keyword(name).is_none() && grammar.const_tag(name).is_none()))
}

fn header(grammar: &Grammar, pool: &ConstantPool, this_class: Option<u16>, access_flags: Option<u16>, file_name: &str) -> String {
	let keyword = match access_flags {
		Some(access) if access & flags::ACC_MODULE != 0 => "module",
		Some(access) if access & flags::ACC_INTERFACE != 0 => "interface",
		_ => "class",
	};

	match this_class.and_then(|index| pool.class_name(index)) {
		Some(name) if is_unit_name(grammar, &name) => format!("{keyword} {name}"),
		Some(name) => format!("file \"{}.class\"", printer::escape(&name)),
		None => {
			let base_name = Path::new(file_name).file_name().and_then(|name| name.to_str()).unwrap_or(file_name);
			format!("file \"{}\"", printer::escape(base_name))
		},
	}
}
