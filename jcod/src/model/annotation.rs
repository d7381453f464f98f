#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
	pub type_index: u16,
	pub pairs: Vec<ElementValuePair>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementValuePair {
	pub name_index: u16,
	pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
	/// One of the tags `B C D F I J S Z s`, with the index of the constant.
	Const { tag: u8, index: u16 },
	Enum { type_name_index: u16, const_name_index: u16 },
	Class { index: u16 },
	Annotation(Annotation),
	Array(Vec<ElementValue>),
}

impl ElementValue {
	pub fn tag(&self) -> u8 {
		match self {
			ElementValue::Const { tag, .. } => *tag,
			ElementValue::Enum { .. } => b'e',
			ElementValue::Class { .. } => b'c',
			ElementValue::Annotation(_) => b'@',
			ElementValue::Array(_) => b'[',
		}
	}

	pub fn is_const_tag(tag: u8) -> bool {
		matches!(tag, b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's')
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
	pub target_type: u8,
	pub target_info: TargetInfo,
	pub type_path: Vec<TypePathEntry>,
	pub annotation: Annotation,
}

/// The `target_info` union of a type annotation, its shape is given by the `target_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetInfo {
	/// `0x00`, `0x01`
	TypeParameter { index: u8 },
	/// `0x10`, an index of `65535` means the super class.
	Supertype { index: u16 },
	/// `0x11`, `0x12`
	TypeParameterBound { type_parameter_index: u8, bound_index: u8 },
	/// `0x13` to `0x15`
	Empty,
	/// `0x16`
	FormalParameter { index: u8 },
	/// `0x17`
	Throws { index: u16 },
	/// `0x40`, `0x41`
	LocalVariable(Vec<LocalVariableTarget>),
	/// `0x42`
	Catch { exception_table_index: u16 },
	/// `0x43` to `0x46`
	Offset { offset: u16 },
	/// `0x47` to `0x4B`
	TypeArgument { offset: u16, type_argument_index: u8 },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LocalVariableTarget {
	pub start_pc: u16,
	pub length: u16,
	pub index: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TypePathEntry {
	pub kind: u8,
	pub argument_index: u8,
}
