use crate::model::{Annotation, ElementValue, StackMapFrame, TypeAnnotation};

/// An attribute of a class, field, method, code body or record component.
///
/// The length is not stored, it's computed when writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub name_index: u16,
	pub body: AttributeBody,
	/// Bytes after the end of the body that still belong to the attribute.
	pub trailing: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeBody {
	ConstantValue { index: u16 },
	Code(Code),
	StackMapTable(Vec<StackMapFrame>),
	Exceptions(Vec<u16>),
	InnerClasses(Vec<InnerClass>),
	EnclosingMethod { class_index: u16, method_index: u16 },
	Synthetic,
	Signature { index: u16 },
	SourceFile { index: u16 },
	SourceDebugExtension(Vec<u8>),
	LineNumberTable(Vec<LineNumber>),
	LocalVariableTable(Vec<LocalVariable>),
	LocalVariableTypeTable(Vec<LocalVariable>),
	Deprecated,
	RuntimeVisibleAnnotations(Vec<Annotation>),
	RuntimeInvisibleAnnotations(Vec<Annotation>),
	/// The annotations of each parameter.
	RuntimeVisibleParameterAnnotations(Vec<Vec<Annotation>>),
	RuntimeInvisibleParameterAnnotations(Vec<Vec<Annotation>>),
	RuntimeVisibleTypeAnnotations(Vec<TypeAnnotation>),
	RuntimeInvisibleTypeAnnotations(Vec<TypeAnnotation>),
	AnnotationDefault(ElementValue),
	BootstrapMethods(Vec<BootstrapMethod>),
	MethodParameters(Vec<MethodParameter>),
	Module(Module),
	ModulePackages(Vec<u16>),
	ModuleMainClass { index: u16 },
	NestHost { index: u16 },
	NestMembers(Vec<u16>),
	Record(Vec<RecordComponent>),
	PermittedSubclasses(Vec<u16>),
	/// An attribute with an unknown name, or one whose body couldn't be read.
	Raw(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
	pub max_stack: u16,
	pub max_locals: u16,
	pub code: Vec<u8>,
	pub exception_table: Vec<ExceptionHandler>,
	pub attributes: Vec<Attribute>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExceptionHandler {
	pub start_pc: u16,
	pub end_pc: u16,
	pub handler_pc: u16,
	pub catch_type: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InnerClass {
	pub inner_class_index: u16,
	pub outer_class_index: u16,
	pub inner_name_index: u16,
	pub access_flags: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineNumber {
	pub start_pc: u16,
	pub line_number: u16,
}

/// An entry of a `LocalVariableTable` or a `LocalVariableTypeTable`.
///
/// For the latter `descriptor_index` points to the signature.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LocalVariable {
	pub start_pc: u16,
	pub length: u16,
	pub name_index: u16,
	pub descriptor_index: u16,
	pub index: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethod {
	pub method_ref: u16,
	pub arguments: Vec<u16>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MethodParameter {
	pub name_index: u16,
	pub access_flags: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
	pub name_index: u16,
	pub flags: u16,
	pub version_index: u16,
	pub requires: Vec<ModuleRequires>,
	pub exports: Vec<ModulePackage>,
	pub opens: Vec<ModulePackage>,
	pub uses: Vec<u16>,
	pub provides: Vec<ModuleProvides>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ModuleRequires {
	pub index: u16,
	pub flags: u16,
	pub version_index: u16,
}

/// An `exports` or `opens` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePackage {
	pub index: u16,
	pub flags: u16,
	pub to: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleProvides {
	pub index: u16,
	pub with: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordComponent {
	pub name_index: u16,
	pub descriptor_index: u16,
	pub attributes: Vec<Attribute>,
}
