//! A typed representation of a class file, as far as the decoder understands it.
//!
//! Everything refers to the constant pool by index only, nothing here is resolved or checked.
//! A decoded [`ClassUnit`] writes back to exactly the bytes it was read from, see [`ClassUnit::to_bytes`].

pub mod class_constants;
mod annotation;
mod attribute;
mod frame;
mod write;

pub use annotation::*;
pub use attribute::*;
pub use frame::*;

use crate::jstring;
use crate::tokens::pool;

/// The kind of a `CONSTANT_Fieldref`, `CONSTANT_Methodref` or `CONSTANT_InterfaceMethodref`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RefKind {
	Field,
	Method,
	InterfaceMethod,
}

/// The kind of a `CONSTANT_Dynamic` or `CONSTANT_InvokeDynamic`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DynamicKind {
	Constant,
	Invoke,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantPoolEntry {
	/// The raw modified UTF-8 bytes.
	Utf8(Vec<u8>),
	Integer(u32),
	/// The IEEE 754 bits.
	Float(u32),
	Long(u64),
	/// The IEEE 754 bits.
	Double(u64),
	Class { name_index: u16 },
	String { string_index: u16 },
	Reference { kind: RefKind, class_index: u16, name_and_type_index: u16 },
	NameAndType { name_index: u16, descriptor_index: u16 },
	MethodHandle { reference_kind: u8, reference_index: u16 },
	MethodType { descriptor_index: u16 },
	Dynamic { kind: DynamicKind, bootstrap_method_attr_index: u16, name_and_type_index: u16 },
	Module { name_index: u16 },
	Package { name_index: u16 },
}

impl ConstantPoolEntry {
	pub fn tag(&self) -> u8 {
		match self {
			ConstantPoolEntry::Utf8(_) => pool::UTF8,
			ConstantPoolEntry::Integer(_) => pool::INTEGER,
			ConstantPoolEntry::Float(_) => pool::FLOAT,
			ConstantPoolEntry::Long(_) => pool::LONG,
			ConstantPoolEntry::Double(_) => pool::DOUBLE,
			ConstantPoolEntry::Class { .. } => pool::CLASS,
			ConstantPoolEntry::String { .. } => pool::STRING,
			ConstantPoolEntry::Reference { kind: RefKind::Field, .. } => pool::FIELD_REF,
			ConstantPoolEntry::Reference { kind: RefKind::Method, .. } => pool::METHOD_REF,
			ConstantPoolEntry::Reference { kind: RefKind::InterfaceMethod, .. } => pool::INTERFACE_METHOD_REF,
			ConstantPoolEntry::NameAndType { .. } => pool::NAME_AND_TYPE,
			ConstantPoolEntry::MethodHandle { .. } => pool::METHOD_HANDLE,
			ConstantPoolEntry::MethodType { .. } => pool::METHOD_TYPE,
			ConstantPoolEntry::Dynamic { kind: DynamicKind::Constant, .. } => pool::DYNAMIC,
			ConstantPoolEntry::Dynamic { kind: DynamicKind::Invoke, .. } => pool::INVOKE_DYNAMIC,
			ConstantPoolEntry::Module { .. } => pool::MODULE,
			ConstantPoolEntry::Package { .. } => pool::PACKAGE,
		}
	}

	/// Whether this entry takes up two slots of the constant pool.
	pub fn is_wide(&self) -> bool {
		matches!(self, ConstantPoolEntry::Long(_) | ConstantPoolEntry::Double(_))
	}
}

/// The constant pool, indexed like in the class file.
///
/// Slot `0` is always empty, as is the slot after each `Long` and `Double`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantPool {
	entries: Vec<Option<ConstantPoolEntry>>,
}

impl ConstantPool {
	pub fn new() -> ConstantPool {
		ConstantPool { entries: vec![None] }
	}

	/// Adds an entry, returning its index.
	pub fn push(&mut self, entry: ConstantPoolEntry) -> usize {
		let index = self.entries.len();
		let wide = entry.is_wide();
		self.entries.push(Some(entry));
		if wide {
			self.entries.push(None);
		}
		index
	}

	/// The `constant_pool_count` of the class file: one more than the highest slot.
	pub fn count(&self) -> usize {
		self.entries.len()
	}

	pub fn get(&self, index: u16) -> Option<&ConstantPoolEntry> {
		self.entries.get(index as usize)?.as_ref()
	}

	/// The slots in order, starting with slot `1`.
	pub fn slots(&self) -> impl Iterator<Item=(usize, Option<&ConstantPoolEntry>)> {
		self.entries.iter().enumerate().skip(1).map(|(index, entry)| (index, entry.as_ref()))
	}

	pub fn utf8(&self, index: u16) -> Option<&[u8]> {
		match self.get(index)? {
			ConstantPoolEntry::Utf8(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// The text of a `CONSTANT_Utf8` entry, if it can be represented as a rust string.
	pub fn utf8_text(&self, index: u16) -> Option<String> {
		jstring::to_printable_string(self.utf8(index)?)
	}

	/// The name of the class a `CONSTANT_Class` entry refers to.
	pub fn class_name(&self, index: u16) -> Option<String> {
		match self.get(index)? {
			ConstantPoolEntry::Class { name_index } => self.utf8_text(*name_index),
			_ => None,
		}
	}
}

impl Default for ConstantPool {
	fn default() -> Self {
		ConstantPool::new()
	}
}

/// A field or a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
	pub access_flags: u16,
	pub name_index: u16,
	pub descriptor_index: u16,
	pub attributes: Vec<Attribute>,
}

/// A whole class file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassUnit {
	pub magic: u32,
	pub minor_version: u16,
	pub major_version: u16,
	pub constant_pool: ConstantPool,
	pub access_flags: u16,
	pub this_class: u16,
	pub super_class: u16,
	pub interfaces: Vec<u16>,
	pub fields: Vec<Member>,
	pub methods: Vec<Member>,
	pub attributes: Vec<Attribute>,
}

impl ClassUnit {
	pub fn name(&self) -> Option<String> {
		self.constant_pool.class_name(self.this_class)
	}
}
