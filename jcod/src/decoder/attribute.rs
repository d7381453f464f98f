//! Reading and printing of attributes.
//!
//! An attribute is read completely before anything of it is printed. Its body is read within the range
//! given by its length: a body that needs more is kept as raw bytes, bytes the body doesn't use are kept as well.
use anyhow::{bail, Result};
use crate::decoder::printer::{self, Printer};
use crate::decoder::reader::ClassReader;
use crate::decoder::Report;
use crate::model::class_constants::{attribute, frame, type_annotation, verification};
use crate::model::{Annotation, Attribute, AttributeBody, BootstrapMethod, Code, ConstantPool, ElementValue, ElementValuePair,
	ExceptionHandler, InnerClass, LineNumber, LocalVariable, LocalVariableTarget, MethodParameter, Module, ModulePackage,
	ModuleProvides, ModuleRequires, RecordComponent, StackMapFrame, TargetInfo, TypeAnnotation, TypePathEntry, VerificationType};

/// How deep annotations and element values may nest.
const MAX_NESTING: usize = 64;

/// Reads an attribute of a class or member.
///
/// Returns the attribute together with its declared length, which differs from the actual one if the attribute
/// reaches past the end of the data.
pub(crate) fn read_attribute(reader: &mut ClassReader, pool: &ConstantPool, report: &mut Report) -> Result<(Attribute, u32)> {
	let start = reader.pos();
	let name_index = reader.read_u16()?;
	let length = reader.read_u32()?;
	let name = pool.utf8_text(name_index);
	let label = name.clone().unwrap_or_else(|| format!("#{name_index}"));

	if let Some(available) = reader.enter(length as usize) {
		if reader.depth() > 1 {
			// inside another attribute, that one gets kept as raw bytes instead
			reader.leave();
			bail!("attribute {label} at {start:#x} declares {length} bytes, but only {available} are left in the enclosing attribute");
		}
		report.error(start, format!("attribute {label} declares {length} bytes, but only {available} are left"));
	}

	let body_start = reader.pos();
	let body = match read_body(reader, pool, report, name.as_deref().unwrap_or_default()) {
		Ok(body) => body,
		Err(e) => {
			report.warning(body_start, format!("couldn't read attribute {label} within its {length} bytes, keeping it as bytes: {e:#}"));
			reader.seek(body_start);
			AttributeBody::Raw(reader.take(reader.remaining())?.to_vec())
		},
	};

	let trailing = reader.range_rest().to_vec();
	if !trailing.is_empty() {
		report.warning(reader.pos(), format!("{} bytes left over in attribute {label}", trailing.len()));
	}
	reader.leave();

	Ok((Attribute { name_index, body, trailing }, length))
}

fn read_nested_attributes(reader: &mut ClassReader, pool: &ConstantPool, report: &mut Report) -> Result<Vec<Attribute>> {
	reader.read_vec(
		ClassReader::read_u16_as_usize,
		|r| read_attribute(r, pool, report).map(|(attribute, _)| attribute),
	)
}

fn read_body(reader: &mut ClassReader, pool: &ConstantPool, report: &mut Report, name: &str) -> Result<AttributeBody> {
	Ok(match name {
		name if name == attribute::CONSTANT_VALUE => AttributeBody::ConstantValue { index: reader.read_u16()? },
		name if name == attribute::CODE => AttributeBody::Code(read_code(reader, pool, report)?),
		name if name == attribute::STACK_MAP_TABLE => {
			AttributeBody::StackMapTable(reader.read_vec(ClassReader::read_u16_as_usize, read_frame)?)
		},
		name if name == attribute::EXCEPTIONS => AttributeBody::Exceptions(reader.read_u16_vec()?),
		name if name == attribute::INNER_CLASSES => {
			AttributeBody::InnerClasses(reader.read_vec(ClassReader::read_u16_as_usize, |r| Ok(InnerClass {
				inner_class_index: r.read_u16()?,
				outer_class_index: r.read_u16()?,
				inner_name_index: r.read_u16()?,
				access_flags: r.read_u16()?,
			}))?)
		},
		name if name == attribute::ENCLOSING_METHOD => AttributeBody::EnclosingMethod {
			class_index: reader.read_u16()?,
			method_index: reader.read_u16()?,
		},
		name if name == attribute::SYNTHETIC => AttributeBody::Synthetic,
		name if name == attribute::SIGNATURE => AttributeBody::Signature { index: reader.read_u16()? },
		name if name == attribute::SOURCE_FILE => AttributeBody::SourceFile { index: reader.read_u16()? },
		name if name == attribute::SOURCE_DEBUG_EXTENSION => {
			AttributeBody::SourceDebugExtension(reader.take(reader.remaining())?.to_vec())
		},
		name if name == attribute::LINE_NUMBER_TABLE => {
			AttributeBody::LineNumberTable(reader.read_vec(ClassReader::read_u16_as_usize, |r| Ok(LineNumber {
				start_pc: r.read_u16()?,
				line_number: r.read_u16()?,
			}))?)
		},
		name if name == attribute::LOCAL_VARIABLE_TABLE => AttributeBody::LocalVariableTable(read_local_variables(reader)?),
		name if name == attribute::LOCAL_VARIABLE_TYPE_TABLE => AttributeBody::LocalVariableTypeTable(read_local_variables(reader)?),
		name if name == attribute::DEPRECATED => AttributeBody::Deprecated,
		name if name == attribute::RUNTIME_VISIBLE_ANNOTATIONS => AttributeBody::RuntimeVisibleAnnotations(read_annotations(reader)?),
		name if name == attribute::RUNTIME_INVISIBLE_ANNOTATIONS => AttributeBody::RuntimeInvisibleAnnotations(read_annotations(reader)?),
		name if name == attribute::RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS => {
			AttributeBody::RuntimeVisibleParameterAnnotations(reader.read_vec(ClassReader::read_u8_as_usize, read_annotations)?)
		},
		name if name == attribute::RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS => {
			AttributeBody::RuntimeInvisibleParameterAnnotations(reader.read_vec(ClassReader::read_u8_as_usize, read_annotations)?)
		},
		name if name == attribute::RUNTIME_VISIBLE_TYPE_ANNOTATIONS => {
			AttributeBody::RuntimeVisibleTypeAnnotations(reader.read_vec(ClassReader::read_u16_as_usize, read_type_annotation)?)
		},
		name if name == attribute::RUNTIME_INVISIBLE_TYPE_ANNOTATIONS => {
			AttributeBody::RuntimeInvisibleTypeAnnotations(reader.read_vec(ClassReader::read_u16_as_usize, read_type_annotation)?)
		},
		name if name == attribute::ANNOTATION_DEFAULT => AttributeBody::AnnotationDefault(read_element_value(reader, 0)?),
		name if name == attribute::BOOTSTRAP_METHODS => {
			AttributeBody::BootstrapMethods(reader.read_vec(ClassReader::read_u16_as_usize, |r| Ok(BootstrapMethod {
				method_ref: r.read_u16()?,
				arguments: r.read_u16_vec()?,
			}))?)
		},
		name if name == attribute::METHOD_PARAMETERS => {
			AttributeBody::MethodParameters(reader.read_vec(ClassReader::read_u8_as_usize, |r| Ok(MethodParameter {
				name_index: r.read_u16()?,
				access_flags: r.read_u16()?,
			}))?)
		},
		name if name == attribute::MODULE => AttributeBody::Module(read_module(reader)?),
		name if name == attribute::MODULE_PACKAGES => AttributeBody::ModulePackages(reader.read_u16_vec()?),
		name if name == attribute::MODULE_MAIN_CLASS => AttributeBody::ModuleMainClass { index: reader.read_u16()? },
		name if name == attribute::NEST_HOST => AttributeBody::NestHost { index: reader.read_u16()? },
		name if name == attribute::NEST_MEMBERS => AttributeBody::NestMembers(reader.read_u16_vec()?),
		name if name == attribute::RECORD => {
			AttributeBody::Record(reader.read_vec(ClassReader::read_u16_as_usize, |r| Ok(RecordComponent {
				name_index: r.read_u16()?,
				descriptor_index: r.read_u16()?,
				attributes: read_nested_attributes(r, pool, report)?,
			}))?)
		},
		name if name == attribute::PERMITTED_SUBCLASSES => AttributeBody::PermittedSubclasses(reader.read_u16_vec()?),
		_ => AttributeBody::Raw(reader.take(reader.remaining())?.to_vec()),
	})
}

fn read_code(reader: &mut ClassReader, pool: &ConstantPool, report: &mut Report) -> Result<Code> {
	let max_stack = reader.read_u16()?;
	let max_locals = reader.read_u16()?;
	let code_length = reader.read_u32()?;
	let code = reader.take(code_length as usize)?.to_vec();

	let exception_table = reader.read_vec(ClassReader::read_u16_as_usize, |r| Ok(ExceptionHandler {
		start_pc: r.read_u16()?,
		end_pc: r.read_u16()?,
		handler_pc: r.read_u16()?,
		catch_type: r.read_u16()?,
	}))?;
	let attributes = read_nested_attributes(reader, pool, report)?;

	Ok(Code { max_stack, max_locals, code, exception_table, attributes })
}

fn read_local_variables(reader: &mut ClassReader) -> Result<Vec<LocalVariable>> {
	reader.read_vec(ClassReader::read_u16_as_usize, |r| Ok(LocalVariable {
		start_pc: r.read_u16()?,
		length: r.read_u16()?,
		name_index: r.read_u16()?,
		descriptor_index: r.read_u16()?,
		index: r.read_u16()?,
	}))
}

fn read_frame(reader: &mut ClassReader) -> Result<StackMapFrame> {
	let frame_type = reader.read_u8()?;
	Ok(match frame_type {
		0..=frame::SAME_MAX => StackMapFrame::Same { frame_type },
		frame::SAME_LOCALS_1_STACK_ITEM_MIN..=frame::SAME_LOCALS_1_STACK_ITEM_MAX => {
			StackMapFrame::SameLocals1StackItem { frame_type, stack: read_verification_type(reader)? }
		},
		frame::SAME_LOCALS_1_STACK_ITEM_EXTENDED => StackMapFrame::SameLocals1StackItemExtended {
			offset_delta: reader.read_u16()?,
			stack: read_verification_type(reader)?,
		},
		frame::CHOP_MIN..=frame::CHOP_MAX => StackMapFrame::Chop { frame_type, offset_delta: reader.read_u16()? },
		frame::SAME_FRAME_EXTENDED => StackMapFrame::SameExtended { offset_delta: reader.read_u16()? },
		frame::APPEND_MIN..=frame::APPEND_MAX => {
			let offset_delta = reader.read_u16()?;
			let locals = (0..frame_type - frame::SAME_FRAME_EXTENDED)
				.map(|_| read_verification_type(reader))
				.collect::<Result<_>>()?;
			StackMapFrame::Append { offset_delta, locals }
		},
		frame::FULL_FRAME => StackMapFrame::Full {
			offset_delta: reader.read_u16()?,
			locals: reader.read_vec(ClassReader::read_u16_as_usize, read_verification_type)?,
			stack: reader.read_vec(ClassReader::read_u16_as_usize, read_verification_type)?,
		},
		_ => bail!("reserved stack map frame type {frame_type}"),
	})
}

fn read_verification_type(reader: &mut ClassReader) -> Result<VerificationType> {
	Ok(match reader.read_u8()? {
		verification::TOP => VerificationType::Top,
		verification::INTEGER => VerificationType::Integer,
		verification::FLOAT => VerificationType::Float,
		verification::DOUBLE => VerificationType::Double,
		verification::LONG => VerificationType::Long,
		verification::NULL => VerificationType::Null,
		verification::UNINITIALIZED_THIS => VerificationType::UninitializedThis,
		verification::OBJECT => VerificationType::Object { index: reader.read_u16()? },
		verification::UNINITIALIZED => VerificationType::UninitializedNew { offset: reader.read_u16()? },
		tag => bail!("unknown verification type tag {tag}"),
	})
}

fn read_annotations(reader: &mut ClassReader) -> Result<Vec<Annotation>> {
	reader.read_vec(ClassReader::read_u16_as_usize, |r| read_annotation(r, 0))
}

fn read_annotation(reader: &mut ClassReader, depth: usize) -> Result<Annotation> {
	let type_index = reader.read_u16()?;
	let pairs = reader.read_vec(ClassReader::read_u16_as_usize, |r| Ok(ElementValuePair {
		name_index: r.read_u16()?,
		value: read_element_value(r, depth)?,
	}))?;
	Ok(Annotation { type_index, pairs })
}

fn read_element_value(reader: &mut ClassReader, depth: usize) -> Result<ElementValue> {
	if depth > MAX_NESTING {
		bail!("element values nested deeper than {MAX_NESTING} levels");
	}

	Ok(match reader.read_u8()? {
		tag if ElementValue::is_const_tag(tag) => ElementValue::Const { tag, index: reader.read_u16()? },
		b'e' => ElementValue::Enum {
			type_name_index: reader.read_u16()?,
			const_name_index: reader.read_u16()?,
		},
		b'c' => ElementValue::Class { index: reader.read_u16()? },
		b'@' => ElementValue::Annotation(read_annotation(reader, depth + 1)?),
		b'[' => ElementValue::Array(reader.read_vec(ClassReader::read_u16_as_usize, |r| read_element_value(r, depth + 1))?),
		tag => bail!("unknown element value tag {tag:?}"),
	})
}

fn read_type_annotation(reader: &mut ClassReader) -> Result<TypeAnnotation> {
	let target_type = reader.read_u8()?;
	let target_info = match target_type {
		type_annotation::CLASS_TYPE_PARAMETER | type_annotation::METHOD_TYPE_PARAMETER => {
			TargetInfo::TypeParameter { index: reader.read_u8()? }
		},
		type_annotation::CLASS_EXTENDS => TargetInfo::Supertype { index: reader.read_u16()? },
		type_annotation::CLASS_TYPE_PARAMETER_BOUND | type_annotation::METHOD_TYPE_PARAMETER_BOUND => {
			TargetInfo::TypeParameterBound {
				type_parameter_index: reader.read_u8()?,
				bound_index: reader.read_u8()?,
			}
		},
		type_annotation::FIELD | type_annotation::METHOD_RETURN | type_annotation::METHOD_RECEIVER => TargetInfo::Empty,
		type_annotation::METHOD_FORMAL_PARAMETER => TargetInfo::FormalParameter { index: reader.read_u8()? },
		type_annotation::THROWS => TargetInfo::Throws { index: reader.read_u16()? },
		type_annotation::LOCAL_VARIABLE | type_annotation::RESOURCE_VARIABLE => {
			TargetInfo::LocalVariable(reader.read_vec(ClassReader::read_u16_as_usize, |r| Ok(LocalVariableTarget {
				start_pc: r.read_u16()?,
				length: r.read_u16()?,
				index: r.read_u16()?,
			}))?)
		},
		type_annotation::EXCEPTION_PARAMETER => TargetInfo::Catch { exception_table_index: reader.read_u16()? },
		type_annotation::INSTANCEOF
		| type_annotation::NEW
		| type_annotation::CONSTRUCTOR_REFERENCE
		| type_annotation::METHOD_REFERENCE => TargetInfo::Offset { offset: reader.read_u16()? },
		type_annotation::CAST..=type_annotation::METHOD_REFERENCE_TYPE_ARGUMENT => TargetInfo::TypeArgument {
			offset: reader.read_u16()?,
			type_argument_index: reader.read_u8()?,
		},
		tag => bail!("unknown type annotation target type {tag:#04x}"),
	};

	let type_path = reader.read_vec(ClassReader::read_u8_as_usize, |r| Ok(TypePathEntry {
		kind: r.read_u8()?,
		argument_index: r.read_u8()?,
	}))?;
	let annotation = read_annotation(reader, 0)?;

	Ok(TypeAnnotation { target_type, target_info, type_path, annotation })
}

fn read_module_packages(reader: &mut ClassReader) -> Result<Vec<ModulePackage>> {
	reader.read_vec(ClassReader::read_u16_as_usize, |r| Ok(ModulePackage {
		index: r.read_u16()?,
		flags: r.read_u16()?,
		to: r.read_u16_vec()?,
	}))
}

fn read_module(reader: &mut ClassReader) -> Result<Module> {
	Ok(Module {
		name_index: reader.read_u16()?,
		flags: reader.read_u16()?,
		version_index: reader.read_u16()?,
		requires: reader.read_vec(ClassReader::read_u16_as_usize, |r| Ok(ModuleRequires {
			index: r.read_u16()?,
			flags: r.read_u16()?,
			version_index: r.read_u16()?,
		}))?,
		exports: read_module_packages(reader)?,
		opens: read_module_packages(reader)?,
		uses: reader.read_u16_vec()?,
		provides: reader.read_vec(ClassReader::read_u16_as_usize, |r| Ok(ModuleProvides {
			index: r.read_u16()?,
			with: r.read_u16_vec()?,
		}))?,
	})
}

/// Prints an attribute.
///
/// If given, `declared_length` is printed instead of the actual length, so that a wrong length is kept.
pub(crate) fn print_attribute(out: &mut Printer, pool: &ConstantPool, attribute: &Attribute, declared_length: Option<u32>, offset: Option<usize>) {
	let name = pool.utf8_text(attribute.name_index);
	let label = name.as_deref().map_or_else(|| "unknown attribute name".to_owned(), printer::escape);

	let head = match declared_length.map_or_else(|| attribute.length(), Ok) {
		Ok(length) => format!("Attr(#{}, {})", attribute.name_index, printer::u4(length)),
		Err(_) => format!("Attr(#{})", attribute.name_index),
	};
	out.open(format!("{head} {{{}", out.comment(&label, offset)));

	print_body(out, pool, &attribute.body);

	if !attribute.trailing.is_empty() {
		out.line("// bytes left over");
		out.hex_lines(&attribute.trailing);
	}
	out.close_with(&format!(" // end {label}"));
}

pub(crate) fn print_attributes(out: &mut Printer, pool: &ConstantPool, attributes: &[Attribute]) {
	out.open(format!("[{}] {{ // Attributes", attributes.len()));
	for attribute in attributes {
		print_attribute(out, pool, attribute, None, None);
	}
	out.close_with(" // Attributes");
}

fn print_indices(out: &mut Printer, indices: &[u16], comment: &str) {
	out.open(format!("[{}] {{ // {comment}", indices.len()));
	for index in indices {
		out.line(format!("#{index};"));
	}
	out.close();
}

fn inline_indices(indices: &[u16]) -> String {
	let items: Vec<_> = indices.iter().map(|index| format!("#{index};")).collect();
	format!("[{}] {{ {} }}", indices.len(), items.join(" "))
}

fn print_body(out: &mut Printer, pool: &ConstantPool, body: &AttributeBody) {
	match body {
		AttributeBody::ConstantValue { index }
		| AttributeBody::Signature { index }
		| AttributeBody::SourceFile { index }
		| AttributeBody::ModuleMainClass { index }
		| AttributeBody::NestHost { index } => {
			let text = pool.utf8_text(*index).or_else(|| pool.class_name(*index)).map(|text| printer::escape(&text));
			out.line(format!("#{index};{}", out.comment(text.as_deref().unwrap_or_default(), None)));
		},
		AttributeBody::Code(code) => print_code(out, pool, code),
		AttributeBody::StackMapTable(frames) => {
			out.open(format!("[{}] {{ // frames", frames.len()));
			for frame in frames {
				out.line(frame_text(frame));
			}
			out.close();
		},
		AttributeBody::Exceptions(indices) => print_indices(out, indices, "exceptions"),
		AttributeBody::ModulePackages(indices) => print_indices(out, indices, "packages"),
		AttributeBody::NestMembers(indices) => print_indices(out, indices, "nest members"),
		AttributeBody::PermittedSubclasses(indices) => print_indices(out, indices, "permitted subclasses"),
		AttributeBody::InnerClasses(classes) => {
			out.open(format!("[{}] {{ // inner classes", classes.len()));
			for class in classes {
				out.line(format!("#{} #{} #{} 0x{:04X};",
					class.inner_class_index, class.outer_class_index, class.inner_name_index, class.access_flags));
			}
			out.close();
		},
		AttributeBody::EnclosingMethod { class_index, method_index } => {
			out.line(format!("#{class_index}; // class"));
			out.line(format!("#{method_index}; // method"));
		},
		AttributeBody::Synthetic | AttributeBody::Deprecated => {},
		AttributeBody::SourceDebugExtension(bytes) | AttributeBody::Raw(bytes) => out.hex_lines(bytes),
		AttributeBody::LineNumberTable(lines) => {
			out.open(format!("[{}] {{ // line numbers", lines.len()));
			for line in lines {
				out.line(format!("{} {};", line.start_pc, line.line_number));
			}
			out.close();
		},
		AttributeBody::LocalVariableTable(variables) | AttributeBody::LocalVariableTypeTable(variables) => {
			out.open(format!("[{}] {{ // local variables", variables.len()));
			for v in variables {
				out.line(format!("{} {} #{} #{} {};", v.start_pc, v.length, v.name_index, v.descriptor_index, v.index));
			}
			out.close();
		},
		AttributeBody::RuntimeVisibleAnnotations(annotations)
		| AttributeBody::RuntimeInvisibleAnnotations(annotations) => print_annotations(out, annotations),
		AttributeBody::RuntimeVisibleParameterAnnotations(parameters)
		| AttributeBody::RuntimeInvisibleParameterAnnotations(parameters) => {
			out.open(format!("[{}]b {{ // parameters", parameters.len()));
			for annotations in parameters {
				print_annotations(out, annotations);
			}
			out.close();
		},
		AttributeBody::RuntimeVisibleTypeAnnotations(annotations)
		| AttributeBody::RuntimeInvisibleTypeAnnotations(annotations) => {
			out.open(format!("[{}] {{ // type annotations", annotations.len()));
			for annotation in annotations {
				print_type_annotation(out, annotation);
			}
			out.close();
		},
		AttributeBody::AnnotationDefault(value) => print_element_value(out, value),
		AttributeBody::BootstrapMethods(methods) => {
			out.open(format!("[{}] {{ // bootstrap methods", methods.len()));
			for method in methods {
				out.line(format!("{{ #{}; {} }}", method.method_ref, inline_indices(&method.arguments)));
			}
			out.close();
		},
		AttributeBody::MethodParameters(parameters) => {
			out.open(format!("[{}]b {{ // parameters", parameters.len()));
			for parameter in parameters {
				out.line(format!("#{} 0x{:04X};", parameter.name_index, parameter.access_flags));
			}
			out.close();
		},
		AttributeBody::Module(module) => print_module(out, module),
		AttributeBody::Record(components) => {
			out.open(format!("[{}] {{ // components", components.len()));
			for component in components {
				out.open("{ // component");
				out.line(format!("#{}; // name", component.name_index));
				out.line(format!("#{}; // descriptor", component.descriptor_index));
				print_attributes(out, pool, &component.attributes);
				out.close();
			}
			out.close();
		},
	}
}

fn print_code(out: &mut Printer, pool: &ConstantPool, code: &Code) {
	out.line(format!("{}; // max_stack", code.max_stack));
	out.line(format!("{}; // max_locals", code.max_locals));

	out.open(format!("Bytes[{}] {{", printer::u4(code.code.len() as u32)));
	out.hex_lines(&code.code);
	out.close();

	out.open(format!("[{}] {{ // Traps", code.exception_table.len()));
	for handler in &code.exception_table {
		out.line(format!("{} {} {} #{};", handler.start_pc, handler.end_pc, handler.handler_pc, handler.catch_type));
	}
	out.close_with(" // end Traps");

	print_attributes(out, pool, &code.attributes);
}

fn verification_type_text(verification_type: &VerificationType) -> String {
	let tag = verification_type.tag();
	match verification_type {
		VerificationType::Object { index } => format!("{tag}b #{index};"),
		VerificationType::UninitializedNew { offset } => format!("{tag}b {offset};"),
		_ => format!("{tag}b;"),
	}
}

fn verification_types_text(types: &[VerificationType]) -> String {
	types.iter().map(verification_type_text).collect::<Vec<_>>().join(" ")
}

fn frame_text(frame: &StackMapFrame) -> String {
	let frame_type = frame.frame_type();
	match frame {
		StackMapFrame::Same { .. } => format!("{{ {frame_type}b; }} // same"),
		StackMapFrame::SameLocals1StackItem { stack, .. } => {
			format!("{{ {frame_type}b; {} }} // same_locals_1_stack_item", verification_type_text(stack))
		},
		StackMapFrame::SameLocals1StackItemExtended { offset_delta, stack } => {
			format!("{{ {frame_type}b; {offset_delta}; {} }} // same_locals_1_stack_item_extended", verification_type_text(stack))
		},
		StackMapFrame::Chop { offset_delta, .. } => format!("{{ {frame_type}b; {offset_delta}; }} // chop"),
		StackMapFrame::SameExtended { offset_delta } => format!("{{ {frame_type}b; {offset_delta}; }} // same_extended"),
		StackMapFrame::Append { offset_delta, locals } => {
			format!("{{ {frame_type}b; {offset_delta}; {} }} // append", verification_types_text(locals))
		},
		StackMapFrame::Full { offset_delta, locals, stack } => format!(
			"{{ {frame_type}b; {offset_delta}; [{}] {{ {} }} [{}] {{ {} }} }} // full",
			locals.len(), verification_types_text(locals), stack.len(), verification_types_text(stack),
		),
	}
}

fn print_annotations(out: &mut Printer, annotations: &[Annotation]) {
	out.open(format!("[{}] {{ // annotations", annotations.len()));
	for annotation in annotations {
		out.open("{ // annotation");
		print_annotation_body(out, annotation);
		out.close();
	}
	out.close();
}

fn print_annotation_body(out: &mut Printer, annotation: &Annotation) {
	out.line(format!("#{}; // type", annotation.type_index));
	out.open(format!("[{}] {{ // element value pairs", annotation.pairs.len()));
	for pair in &annotation.pairs {
		out.open("{");
		out.line(format!("#{}; // name", pair.name_index));
		print_element_value(out, &pair.value);
		out.close();
	}
	out.close();
}

fn print_element_value(out: &mut Printer, value: &ElementValue) {
	match value {
		ElementValue::Const { tag, index } => out.line(format!("{{ '{}' #{index}; }}", *tag as char)),
		ElementValue::Enum { type_name_index, const_name_index } => {
			out.line(format!("{{ 'e' #{type_name_index} #{const_name_index}; }}"));
		},
		ElementValue::Class { index } => out.line(format!("{{ 'c' #{index}; }}")),
		ElementValue::Annotation(annotation) => {
			out.open("{ '@'");
			out.open("{ // annotation");
			print_annotation_body(out, annotation);
			out.close();
			out.close();
		},
		ElementValue::Array(values) => {
			out.open("{ '['");
			out.open(format!("[{}] {{", values.len()));
			for value in values {
				print_element_value(out, value);
			}
			out.close();
			out.close();
		},
	}
}

fn print_type_annotation(out: &mut Printer, annotation: &TypeAnnotation) {
	out.open("{ // type annotation");
	out.line(format!("{}; // target_type", printer::hex(&[annotation.target_type])));

	match &annotation.target_info {
		TargetInfo::TypeParameter { index } => out.line(format!("{index}b; // type parameter")),
		TargetInfo::Supertype { index } => out.line(format!("{index}; // supertype")),
		TargetInfo::TypeParameterBound { type_parameter_index, bound_index } => {
			out.line(format!("{type_parameter_index}b {bound_index}b; // type parameter bound"));
		},
		TargetInfo::Empty => {},
		TargetInfo::FormalParameter { index } => out.line(format!("{index}b; // formal parameter")),
		TargetInfo::Throws { index } => out.line(format!("{index}; // throws")),
		TargetInfo::LocalVariable(table) => {
			out.open(format!("[{}] {{ // local variables", table.len()));
			for target in table {
				out.line(format!("{} {} {};", target.start_pc, target.length, target.index));
			}
			out.close();
		},
		TargetInfo::Catch { exception_table_index } => out.line(format!("{exception_table_index}; // catch")),
		TargetInfo::Offset { offset } => out.line(format!("{offset}; // offset")),
		TargetInfo::TypeArgument { offset, type_argument_index } => {
			out.line(format!("{offset} {type_argument_index}b; // type argument"));
		},
	}

	out.open(format!("[{}]b {{ // type path", annotation.type_path.len()));
	for entry in &annotation.type_path {
		out.line(format!("{}b {}b;", entry.kind, entry.argument_index));
	}
	out.close();

	print_annotation_body(out, &annotation.annotation);
	out.close();
}

fn print_module(out: &mut Printer, module: &Module) {
	out.line(format!("#{}; // name", module.name_index));
	out.line(format!("0x{:04X}; // flags", module.flags));
	out.line(format!("#{}; // version", module.version_index));

	out.open(format!("[{}] {{ // requires", module.requires.len()));
	for requires in &module.requires {
		out.line(format!("#{} 0x{:04X} #{};", requires.index, requires.flags, requires.version_index));
	}
	out.close();

	for (packages, comment) in [(&module.exports, "exports"), (&module.opens, "opens")] {
		out.open(format!("[{}] {{ // {comment}", packages.len()));
		for package in packages {
			out.line(format!("{{ #{} 0x{:04X}; {} }}", package.index, package.flags, inline_indices(&package.to)));
		}
		out.close();
	}

	print_indices(out, &module.uses, "uses");

	out.open(format!("[{}] {{ // provides", module.provides.len()));
	for provides in &module.provides {
		out.line(format!("{{ #{}; {} }}", provides.index, inline_indices(&provides.with)));
	}
	out.close();
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use crate::decoder::attribute::{frame_text, read_attribute};
	use crate::decoder::reader::ClassReader;
	use crate::decoder::Report;
	use crate::model::{AttributeBody, ConstantPool, ConstantPoolEntry, StackMapFrame, VerificationType};

	fn pool_with(name: &str) -> ConstantPool {
		let mut pool = ConstantPool::new();
		pool.push(ConstantPoolEntry::Utf8(name.as_bytes().to_vec()));
		pool
	}

	#[test]
	fn left_over_bytes_are_kept() -> Result<()> {
		let pool = pool_with("SourceFile");
		let data = [0, 1, 0, 0, 0, 4, 0, 9, 0xAA, 0xBB, 0x42];
		let mut reader = ClassReader::new(&data);
		let mut report = Report::new("test");

		let (attribute, length) = read_attribute(&mut reader, &pool, &mut report)?;
		assert_eq!(length, 4);
		assert_eq!(attribute.body, AttributeBody::SourceFile { index: 9 });
		assert_eq!(attribute.trailing, vec![0xAA, 0xBB]);
		assert_eq!(report.warnings, 1);
		assert_eq!(reader.pos(), 10);
		Ok(())
	}

	#[test]
	fn over_read_falls_back_to_raw() -> Result<()> {
		let pool = pool_with("EnclosingMethod");
		let data = [0, 1, 0, 0, 0, 3, 1, 2, 3, 0x42];
		let mut reader = ClassReader::new(&data);
		let mut report = Report::new("test");

		let (attribute, _) = read_attribute(&mut reader, &pool, &mut report)?;
		assert_eq!(attribute.body, AttributeBody::Raw(vec![1, 2, 3]));
		assert_eq!(report.warnings, 1);
		// the next read starts after the range
		assert_eq!(reader.read_u8()?, 0x42);
		Ok(())
	}

	#[test]
	fn clamped_to_the_end_of_data() -> Result<()> {
		let pool = pool_with("Custom");
		let data = [0, 1, 0, 0, 0, 9, 1, 2];
		let mut reader = ClassReader::new(&data);
		let mut report = Report::new("test");

		let (attribute, length) = read_attribute(&mut reader, &pool, &mut report)?;
		assert_eq!(length, 9);
		assert_eq!(attribute.body, AttributeBody::Raw(vec![1, 2]));
		assert_eq!(report.errors, 1);
		Ok(())
	}

	#[test]
	fn frame_texts() {
		assert_eq!(frame_text(&StackMapFrame::Same { frame_type: 3 }), "{ 3b; } // same");
		assert_eq!(
			frame_text(&StackMapFrame::Append { offset_delta: 10, locals: vec![VerificationType::Integer, VerificationType::Object { index: 5 }] }),
			"{ 253b; 10; 1b; 7b #5; } // append",
		);
		assert_eq!(
			frame_text(&StackMapFrame::Full { offset_delta: 10, locals: vec![VerificationType::Top], stack: Vec::new() }),
			"{ 255b; 10; [1] { 0b; } [0] {  } } // full",
		);
	}
}
