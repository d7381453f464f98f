use anyhow::{anyhow, bail, Context, Result};
use crate::buffer::ByteBuffer;
use crate::model::{Annotation, Attribute, AttributeBody, ClassUnit, Code, ConstantPool, ConstantPoolEntry, ElementValue,
	Member, StackMapFrame, TargetInfo, TypeAnnotation, VerificationType};

impl ClassUnit {
	/// Writes the class file.
	///
	/// Fails only if some list is too long for its count.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		let mut buffer = ByteBuffer::new();
		write_class(&mut buffer, self)?;
		Ok(buffer.into_vec())
	}
}

impl Attribute {
	/// Writes the attribute including its name index and length.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		let mut buffer = ByteBuffer::new();
		write_attribute(&mut buffer, self)?;
		Ok(buffer.into_vec())
	}

	/// The `attribute_length`, the number of bytes after the name index and length.
	pub fn length(&self) -> Result<u32> {
		let mut buffer = ByteBuffer::new();
		write_body(&mut buffer, &self.body)?;
		let length = buffer.size() + self.trailing.len();
		u32::try_from(length).with_context(|| anyhow!("attribute with name #{} is too large", self.name_index))
	}
}

fn u1(buffer: &mut ByteBuffer, value: u8) {
	buffer.append(value as u64, 1);
}

fn u2(buffer: &mut ByteBuffer, value: u16) {
	buffer.append(value as u64, 2);
}

fn u4(buffer: &mut ByteBuffer, value: u32) {
	buffer.append(value as u64, 4);
}

fn write_count(buffer: &mut ByteBuffer, count: usize, width: usize) -> Result<()> {
	let max = (1u64 << (8 * width)) - 1;
	if count as u64 > max {
		bail!("count {count} doesn't fit into {width} byte(s)");
	}
	buffer.append(count as u64, width);
	Ok(())
}

fn write_list<T>(buffer: &mut ByteBuffer, list: &[T], width: usize, mut write: impl FnMut(&mut ByteBuffer, &T) -> Result<()>) -> Result<()> {
	write_count(buffer, list.len(), width)?;
	for element in list {
		write(buffer, element)?;
	}
	Ok(())
}

fn write_indices(buffer: &mut ByteBuffer, indices: &[u16]) -> Result<()> {
	write_list(buffer, indices, 2, |b, &index| {
		u2(b, index);
		Ok(())
	})
}

fn write_class(buffer: &mut ByteBuffer, class: &ClassUnit) -> Result<()> {
	u4(buffer, class.magic);
	u2(buffer, class.minor_version);
	u2(buffer, class.major_version);

	write_constant_pool(buffer, &class.constant_pool).context("failed to write the constant pool")?;

	u2(buffer, class.access_flags);
	u2(buffer, class.this_class);
	u2(buffer, class.super_class);
	write_indices(buffer, &class.interfaces).context("failed to write the interfaces")?;

	write_list(buffer, &class.fields, 2, write_member).context("failed to write the fields")?;
	write_list(buffer, &class.methods, 2, write_member).context("failed to write the methods")?;
	write_attributes(buffer, &class.attributes).context("failed to write the class attributes")
}

fn write_constant_pool(buffer: &mut ByteBuffer, pool: &ConstantPool) -> Result<()> {
	write_count(buffer, pool.count(), 2)?;

	for (index, entry) in pool.slots() {
		let Some(entry) = entry else { continue };

		u1(buffer, entry.tag());
		match entry {
			ConstantPoolEntry::Utf8(bytes) => {
				write_count(buffer, bytes.len(), 2).with_context(|| anyhow!("utf8 entry #{index} is too long"))?;
				buffer.write_slice(bytes);
			},
			ConstantPoolEntry::Integer(bits) | ConstantPoolEntry::Float(bits) => u4(buffer, *bits),
			ConstantPoolEntry::Long(bits) | ConstantPoolEntry::Double(bits) => buffer.append(*bits, 8),
			ConstantPoolEntry::Class { name_index: index }
			| ConstantPoolEntry::String { string_index: index }
			| ConstantPoolEntry::MethodType { descriptor_index: index }
			| ConstantPoolEntry::Module { name_index: index }
			| ConstantPoolEntry::Package { name_index: index } => u2(buffer, *index),
			ConstantPoolEntry::Reference { class_index: first, name_and_type_index: second, .. }
			| ConstantPoolEntry::NameAndType { name_index: first, descriptor_index: second }
			| ConstantPoolEntry::Dynamic { bootstrap_method_attr_index: first, name_and_type_index: second, .. } => {
				u2(buffer, *first);
				u2(buffer, *second);
			},
			ConstantPoolEntry::MethodHandle { reference_kind, reference_index } => {
				u1(buffer, *reference_kind);
				u2(buffer, *reference_index);
			},
		}
	}
	Ok(())
}

fn write_member(buffer: &mut ByteBuffer, member: &Member) -> Result<()> {
	u2(buffer, member.access_flags);
	u2(buffer, member.name_index);
	u2(buffer, member.descriptor_index);
	write_attributes(buffer, &member.attributes)
}

fn write_attributes(buffer: &mut ByteBuffer, attributes: &[Attribute]) -> Result<()> {
	write_list(buffer, attributes, 2, write_attribute)
}

fn write_attribute(buffer: &mut ByteBuffer, attribute: &Attribute) -> Result<()> {
	u2(buffer, attribute.name_index);
	let length_offset = buffer.size();
	u4(buffer, 0);

	write_body(buffer, &attribute.body)
		.with_context(|| anyhow!("failed to write attribute with name #{}", attribute.name_index))?;
	buffer.write_slice(&attribute.trailing);

	let length = buffer.size() - length_offset - 4;
	if length > u32::MAX as usize {
		bail!("attribute with name #{} is too large", attribute.name_index);
	}
	buffer.write_at(length_offset, length as u64, 4)
}

fn write_body(buffer: &mut ByteBuffer, body: &AttributeBody) -> Result<()> {
	match body {
		AttributeBody::ConstantValue { index }
		| AttributeBody::Signature { index }
		| AttributeBody::SourceFile { index }
		| AttributeBody::ModuleMainClass { index }
		| AttributeBody::NestHost { index } => u2(buffer, *index),
		AttributeBody::Code(code) => write_code(buffer, code)?,
		AttributeBody::StackMapTable(frames) => write_list(buffer, frames, 2, write_frame)?,
		AttributeBody::Exceptions(indices)
		| AttributeBody::ModulePackages(indices)
		| AttributeBody::NestMembers(indices)
		| AttributeBody::PermittedSubclasses(indices) => write_indices(buffer, indices)?,
		AttributeBody::InnerClasses(classes) => write_list(buffer, classes, 2, |b, class| {
			u2(b, class.inner_class_index);
			u2(b, class.outer_class_index);
			u2(b, class.inner_name_index);
			u2(b, class.access_flags);
			Ok(())
		})?,
		AttributeBody::EnclosingMethod { class_index, method_index } => {
			u2(buffer, *class_index);
			u2(buffer, *method_index);
		},
		AttributeBody::Synthetic | AttributeBody::Deprecated => {},
		AttributeBody::SourceDebugExtension(bytes) | AttributeBody::Raw(bytes) => buffer.write_slice(bytes),
		AttributeBody::LineNumberTable(lines) => write_list(buffer, lines, 2, |b, line| {
			u2(b, line.start_pc);
			u2(b, line.line_number);
			Ok(())
		})?,
		AttributeBody::LocalVariableTable(variables) | AttributeBody::LocalVariableTypeTable(variables) => {
			write_list(buffer, variables, 2, |b, variable| {
				u2(b, variable.start_pc);
				u2(b, variable.length);
				u2(b, variable.name_index);
				u2(b, variable.descriptor_index);
				u2(b, variable.index);
				Ok(())
			})?
		},
		AttributeBody::RuntimeVisibleAnnotations(annotations)
		| AttributeBody::RuntimeInvisibleAnnotations(annotations) => write_list(buffer, annotations, 2, write_annotation)?,
		AttributeBody::RuntimeVisibleParameterAnnotations(parameters)
		| AttributeBody::RuntimeInvisibleParameterAnnotations(parameters) => {
			write_list(buffer, parameters, 1, |b, annotations| write_list(b, annotations, 2, write_annotation))?
		},
		AttributeBody::RuntimeVisibleTypeAnnotations(annotations)
		| AttributeBody::RuntimeInvisibleTypeAnnotations(annotations) => write_list(buffer, annotations, 2, write_type_annotation)?,
		AttributeBody::AnnotationDefault(value) => write_element_value(buffer, value)?,
		AttributeBody::BootstrapMethods(methods) => write_list(buffer, methods, 2, |b, method| {
			u2(b, method.method_ref);
			write_indices(b, &method.arguments)
		})?,
		AttributeBody::MethodParameters(parameters) => write_list(buffer, parameters, 1, |b, parameter| {
			u2(b, parameter.name_index);
			u2(b, parameter.access_flags);
			Ok(())
		})?,
		AttributeBody::Module(module) => {
			u2(buffer, module.name_index);
			u2(buffer, module.flags);
			u2(buffer, module.version_index);
			write_list(buffer, &module.requires, 2, |b, requires| {
				u2(b, requires.index);
				u2(b, requires.flags);
				u2(b, requires.version_index);
				Ok(())
			})?;
			for packages in [&module.exports, &module.opens] {
				write_list(buffer, packages, 2, |b, package| {
					u2(b, package.index);
					u2(b, package.flags);
					write_indices(b, &package.to)
				})?;
			}
			write_indices(buffer, &module.uses)?;
			write_list(buffer, &module.provides, 2, |b, provides| {
				u2(b, provides.index);
				write_indices(b, &provides.with)
			})?;
		},
		AttributeBody::Record(components) => write_list(buffer, components, 2, |b, component| {
			u2(b, component.name_index);
			u2(b, component.descriptor_index);
			write_attributes(b, &component.attributes)
		})?,
	}
	Ok(())
}

fn write_code(buffer: &mut ByteBuffer, code: &Code) -> Result<()> {
	u2(buffer, code.max_stack);
	u2(buffer, code.max_locals);
	write_count(buffer, code.code.len(), 4).context("code is too long")?;
	buffer.write_slice(&code.code);
	write_list(buffer, &code.exception_table, 2, |b, handler| {
		u2(b, handler.start_pc);
		u2(b, handler.end_pc);
		u2(b, handler.handler_pc);
		u2(b, handler.catch_type);
		Ok(())
	})?;
	write_attributes(buffer, &code.attributes)
}

fn write_frame(buffer: &mut ByteBuffer, frame: &StackMapFrame) -> Result<()> {
	u1(buffer, frame.frame_type());
	match frame {
		StackMapFrame::Same { .. } => {},
		StackMapFrame::SameLocals1StackItem { stack, .. } => write_verification_type(buffer, stack),
		StackMapFrame::SameLocals1StackItemExtended { offset_delta, stack } => {
			u2(buffer, *offset_delta);
			write_verification_type(buffer, stack);
		},
		StackMapFrame::Chop { offset_delta, .. } | StackMapFrame::SameExtended { offset_delta } => u2(buffer, *offset_delta),
		StackMapFrame::Append { offset_delta, locals } => {
			if !(1..=3).contains(&locals.len()) {
				bail!("append frame with {} locals, expected one to three", locals.len());
			}
			u2(buffer, *offset_delta);
			for local in locals {
				write_verification_type(buffer, local);
			}
		},
		StackMapFrame::Full { offset_delta, locals, stack } => {
			u2(buffer, *offset_delta);
			for types in [locals, stack] {
				write_list(buffer, types, 2, |b, t| {
					write_verification_type(b, t);
					Ok(())
				})?;
			}
		},
	}
	Ok(())
}

fn write_verification_type(buffer: &mut ByteBuffer, verification_type: &VerificationType) {
	u1(buffer, verification_type.tag());
	match verification_type {
		VerificationType::Object { index: value } | VerificationType::UninitializedNew { offset: value } => u2(buffer, *value),
		_ => {},
	}
}

fn write_annotation(buffer: &mut ByteBuffer, annotation: &Annotation) -> Result<()> {
	u2(buffer, annotation.type_index);
	write_list(buffer, &annotation.pairs, 2, |b, pair| {
		u2(b, pair.name_index);
		write_element_value(b, &pair.value)
	})
}

fn write_element_value(buffer: &mut ByteBuffer, value: &ElementValue) -> Result<()> {
	u1(buffer, value.tag());
	match value {
		ElementValue::Const { index, .. } | ElementValue::Class { index } => u2(buffer, *index),
		ElementValue::Enum { type_name_index, const_name_index } => {
			u2(buffer, *type_name_index);
			u2(buffer, *const_name_index);
		},
		ElementValue::Annotation(annotation) => write_annotation(buffer, annotation)?,
		ElementValue::Array(values) => write_list(buffer, values, 2, write_element_value)?,
	}
	Ok(())
}

fn write_type_annotation(buffer: &mut ByteBuffer, annotation: &TypeAnnotation) -> Result<()> {
	u1(buffer, annotation.target_type);
	match &annotation.target_info {
		TargetInfo::TypeParameter { index } | TargetInfo::FormalParameter { index } => u1(buffer, *index),
		TargetInfo::Supertype { index } | TargetInfo::Throws { index } => u2(buffer, *index),
		TargetInfo::TypeParameterBound { type_parameter_index, bound_index } => {
			u1(buffer, *type_parameter_index);
			u1(buffer, *bound_index);
		},
		TargetInfo::Empty => {},
		TargetInfo::LocalVariable(table) => write_list(buffer, table, 2, |b, target| {
			u2(b, target.start_pc);
			u2(b, target.length);
			u2(b, target.index);
			Ok(())
		})?,
		TargetInfo::Catch { exception_table_index } => u2(buffer, *exception_table_index),
		TargetInfo::Offset { offset } => u2(buffer, *offset),
		TargetInfo::TypeArgument { offset, type_argument_index } => {
			u2(buffer, *offset);
			u1(buffer, *type_argument_index);
		},
	}
	write_list(buffer, &annotation.type_path, 1, |b, entry| {
		u1(b, entry.kind);
		u1(b, entry.argument_index);
		Ok(())
	})?;
	write_annotation(buffer, &annotation.annotation)
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use crate::model::{Attribute, AttributeBody, StackMapFrame, VerificationType};

	#[test]
	fn attribute_length_is_computed() -> Result<()> {
		let attribute = Attribute {
			name_index: 3,
			body: AttributeBody::Exceptions(vec![7, 8]),
			trailing: vec![0xAA],
		};

		assert_eq!(attribute.to_bytes()?, vec![0, 3, 0, 0, 0, 7, 0, 2, 0, 7, 0, 8, 0xAA]);
		Ok(())
	}

	#[test]
	fn frames() -> Result<()> {
		let attribute = Attribute {
			name_index: 1,
			body: AttributeBody::StackMapTable(vec![
				StackMapFrame::Append { offset_delta: 10, locals: vec![VerificationType::Integer, VerificationType::Object { index: 5 }] },
				StackMapFrame::Chop { frame_type: 249, offset_delta: 2 },
			]),
			trailing: Vec::new(),
		};

		assert_eq!(attribute.to_bytes()?, vec![
			0, 1, 0, 0, 0, 12,
			0, 2,
			253, 0, 10, 1, 7, 0, 5,
			249, 0, 2,
		]);
		Ok(())
	}

	#[test]
	fn append_frame_needs_locals() {
		let attribute = Attribute {
			name_index: 1,
			body: AttributeBody::StackMapTable(vec![StackMapFrame::Append { offset_delta: 0, locals: Vec::new() }]),
			trailing: Vec::new(),
		};
		assert!(attribute.to_bytes().is_err());
	}
}
