use anyhow::{anyhow, Result};
use pretty_assertions::assert_eq;
use jcod::decoder::{Decoded, Decoder, DecoderOptions};
use jcod::encoder::{Encoded, Encoder, EncoderOptions};
use jcod::model::{Annotation, AttributeBody, BootstrapMethod, ConstantPoolEntry, DynamicKind, ElementValue, ElementValuePair, InnerClass,
	LineNumber, LocalVariable, MethodParameter, RefKind, StackMapFrame, TargetInfo, VerificationType};
use jcod::source::SourceFile;
use jcod::tokens::Grammar;

fn encode(name: &str, text: &str) -> Encoded {
	let grammar = Grammar::new();
	Encoder::new(&grammar, EncoderOptions::default()).encode(SourceFile::new(name, text))
}

fn encode_one(text: &str) -> Result<Vec<u8>> {
	let mut encoded = encode("test.jcod", text);
	if encoded.units.len() != 1 {
		return Err(anyhow!("expected one unit, got {}: {:?}", encoded.units.len(), encoded.messages));
	}
	Ok(encoded.units.remove(0).bytes)
}

fn decode(data: &[u8]) -> Decoded {
	let grammar = Grammar::new();
	Decoder::new(&grammar, DecoderOptions::default()).decode("Test.class", data)
}

#[test]
fn everything_round_trips() -> Result<()> {
	let encoded = encode("everything.jcod", include_str!("everything.jcod"));
	assert_eq!((encoded.errors, encoded.warnings), (0, 0), "{:?}", encoded.messages);
	assert_eq!(encoded.units[0].file_name, "Everything.class");
	let data = &encoded.units[0].bytes;

	let decoded = decode(data);
	assert_eq!((decoded.errors, decoded.warnings), (0, 0), "{:?}", decoded.messages);
	assert!(decoded.text.starts_with("class Everything {\n"), "{}", decoded.text);

	let unit = decoded.unit.as_ref().ok_or_else(|| anyhow!("no unit"))?;
	assert_eq!(&unit.to_bytes()?, data);

	let again = encode("Everything.jcod", &decoded.text);
	assert_eq!((again.errors, again.warnings), (0, 0), "{:?}\n{}", again.messages, decoded.text);
	assert_eq!(&again.units[0].bytes, data);
	Ok(())
}

#[test]
fn constant_pool_tags() -> Result<()> {
	let data = encode_one(include_str!("everything.jcod"))?;
	let unit = decode(&data).unit.ok_or_else(|| anyhow!("no unit"))?;
	let pool = &unit.constant_pool;

	assert_eq!(pool.count(), 35);
	assert_eq!(pool.get(5), Some(&ConstantPoolEntry::Integer(42)));
	assert_eq!(pool.get(6), Some(&ConstantPoolEntry::Float(1.5f32.to_bits())));
	assert_eq!(pool.get(7), Some(&ConstantPoolEntry::Long(7)));
	// the slots after long and double are unusable
	assert_eq!(pool.get(8), None);
	assert_eq!(pool.get(9), Some(&ConstantPoolEntry::Double(1.5f64.to_bits())));
	assert_eq!(pool.get(10), None);
	assert_eq!(pool.get(11), Some(&ConstantPoolEntry::String { string_index: 1 }));
	assert_eq!(pool.get(12), Some(&ConstantPoolEntry::Reference { kind: RefKind::Field, class_index: 2, name_and_type_index: 13 }));
	assert_eq!(pool.get(16), Some(&ConstantPoolEntry::Reference { kind: RefKind::Method, class_index: 4, name_and_type_index: 17 }));
	assert_eq!(pool.get(20), Some(&ConstantPoolEntry::Reference { kind: RefKind::InterfaceMethod, class_index: 4, name_and_type_index: 17 }));
	assert_eq!(pool.get(21), Some(&ConstantPoolEntry::MethodHandle { reference_kind: 5, reference_index: 16 }));
	assert_eq!(pool.get(22), Some(&ConstantPoolEntry::MethodType { descriptor_index: 19 }));
	assert_eq!(pool.get(23), Some(&ConstantPoolEntry::Dynamic { kind: DynamicKind::Constant, bootstrap_method_attr_index: 0, name_and_type_index: 13 }));
	assert_eq!(pool.get(24), Some(&ConstantPoolEntry::Dynamic { kind: DynamicKind::Invoke, bootstrap_method_attr_index: 0, name_and_type_index: 17 }));
	assert_eq!(pool.get(25), Some(&ConstantPoolEntry::Module { name_index: 14 }));
	assert_eq!(pool.get(26), Some(&ConstantPoolEntry::Package { name_index: 14 }));
	assert_eq!(pool.utf8_text(33).as_deref(), Some("Everything.java"));
	Ok(())
}

#[test]
fn stack_map_frames() -> Result<()> {
	let data = encode_one(include_str!("everything.jcod"))?;
	let unit = decode(&data).unit.ok_or_else(|| anyhow!("no unit"))?;

	let AttributeBody::Code(code) = &unit.methods[0].attributes[0].body else {
		return Err(anyhow!("expected a code attribute, got {:?}", unit.methods[0].attributes[0]));
	};
	assert_eq!(code.code, vec![0x2A, 0xB7, 0x00, 0x10, 0xB1]);

	let AttributeBody::StackMapTable(frames) = &code.attributes[0].body else {
		return Err(anyhow!("expected a stack map table, got {:?}", code.attributes[0]));
	};
	assert_eq!(frames, &vec![
		StackMapFrame::Same { frame_type: 3 },
		StackMapFrame::SameLocals1StackItem { frame_type: 64, stack: VerificationType::Integer },
		StackMapFrame::SameLocals1StackItemExtended { offset_delta: 10, stack: VerificationType::Object { index: 2 } },
		StackMapFrame::Chop { frame_type: 249, offset_delta: 10 },
		StackMapFrame::SameExtended { offset_delta: 10 },
		StackMapFrame::Append { offset_delta: 10, locals: vec![VerificationType::Integer, VerificationType::Object { index: 2 }] },
		StackMapFrame::Full {
			offset_delta: 10,
			locals: vec![VerificationType::UninitializedThis],
			stack: vec![VerificationType::UninitializedNew { offset: 1 }, VerificationType::Null],
		},
	]);
	Ok(())
}

#[test]
fn type_annotations() -> Result<()> {
	let data = encode_one(include_str!("everything.jcod"))?;
	let unit = decode(&data).unit.ok_or_else(|| anyhow!("no unit"))?;

	let AttributeBody::RuntimeVisibleTypeAnnotations(annotations) = &unit.attributes[2].body else {
		return Err(anyhow!("expected type annotations, got {:?}", unit.attributes[2]));
	};
	let targets: Vec<_> = annotations.iter().map(|annotation| &annotation.target_info).collect();
	assert_eq!(targets, vec![
		&TargetInfo::Supertype { index: 65535 },
		&TargetInfo::TypeParameter { index: 0 },
		&TargetInfo::TypeParameterBound { type_parameter_index: 0, bound_index: 1 },
		&TargetInfo::LocalVariable(vec![jcod::model::LocalVariableTarget { start_pc: 0, length: 5, index: 1 }]),
	]);
	assert_eq!(annotations[1].type_path.len(), 1);
	assert_eq!(annotations[2].annotation.pairs[0].value, ElementValue::Const { tag: b'I', index: 5 });

	let ElementValue::Array(values) = &annotations[3].annotation.pairs[0].value else {
		return Err(anyhow!("expected an array, got {:?}", annotations[3].annotation.pairs[0].value));
	};
	assert_eq!(values[1], ElementValue::Enum { type_name_index: 3, const_name_index: 14 });
	Ok(())
}

#[test]
fn nested_attribute_past_its_parent() -> Result<()> {
	let data = encode_one("class C {
		0xCAFEBABE; 0; 52;
		[] { ; Utf8 \"C\"; class #1; Utf8 \"Code\"; Utf8 \"SourceFile\"; Utf8 \"C.java\"; }
		0x0021; #2; #0; [] {} [] {}
		[] { { 0x0001; #1; #1; [] {
			Attr(#3) { 1; 1; Bytes[] { 0xB1; } [] {} [] { Attr(#4, 100) { #5; } } }
			Attr(#4) { #5; }
		} } }
		[] {}
	}")?;

	let decoded = decode(&data);
	assert_eq!((decoded.errors, decoded.warnings), (0, 1), "{:?}", decoded.messages);

	let unit = decoded.unit.as_ref().ok_or_else(|| anyhow!("no unit"))?;
	let attributes = &unit.methods[0].attributes;
	assert!(matches!(attributes[0].body, AttributeBody::Raw(_)), "{:?}", attributes[0]);
	// reading goes on after the range of the broken attribute
	assert_eq!(attributes[1].body, AttributeBody::SourceFile { index: 5 });

	assert_eq!(unit.to_bytes()?, data);
	assert_eq!(encode_one(&decoded.text)?, data);
	Ok(())
}

#[test]
fn bytes_left_over() -> Result<()> {
	let data = encode_one("class C {
		0xCAFEBABE; 0; 52;
		[] { ; Utf8 \"C\"; class #1; Utf8 \"SourceFile\"; }
		0x0021; #2; #0; [] {} [] {} [] {}
		[] { Attr(#3, 4) { #1; 0xBEEF; } }
	}")?;

	let decoded = decode(&data);
	assert_eq!((decoded.errors, decoded.warnings), (0, 1), "{:?}", decoded.messages);
	assert!(decoded.messages[0].contains("2 bytes left over"), "{:?}", decoded.messages);

	let unit = decoded.unit.as_ref().ok_or_else(|| anyhow!("no unit"))?;
	assert_eq!(unit.attributes[0].body, AttributeBody::SourceFile { index: 1 });
	assert_eq!(unit.attributes[0].trailing, vec![0xBE, 0xEF]);

	assert_eq!(unit.to_bytes()?, data);
	assert_eq!(encode_one(&decoded.text)?, data);
	Ok(())
}

#[test]
fn attribute_past_the_end_of_the_file() -> Result<()> {
	// the declared length is kept, with a warning
	let encoded = encode("C.jcod", "class C {
		0xCAFEBABE; 0; 52;
		[] { ; Utf8 \"C\"; class #1; Utf8 \"SourceFile\"; }
		0x0021; #2; #0; [] {} [] {} [] {}
		[] { Attr(#3, 10) { #1; } }
	}");
	assert_eq!((encoded.errors, encoded.warnings), (0, 1));
	let data = &encoded.units[0].bytes;

	let decoded = decode(data);
	assert_eq!(decoded.errors, 1, "{:?}", decoded.messages);
	assert!(decoded.unit.is_none());
	assert!(decoded.text.contains("Attr(#3, 10) {"), "{}", decoded.text);

	let again = encode("C.jcod", &decoded.text);
	assert_eq!(&again.units[0].bytes, data);
	Ok(())
}

#[test]
fn module_attributes() -> Result<()> {
	let data = encode_one("module module-info {
		0xCAFEBABE; 0; 53;
		[] {
			; Utf8 \"module-info\"; class #1; Utf8 \"Module\"; Utf8 \"a.b\";
			Module #4; Utf8 \"a/b\"; Package #6; Utf8 \"ModulePackages\";
		}
		0x8000; #2; #0; [] {} [] {} [] {}
		[] {
			Attr(#3) {
				#5; 0x0020; #0;
				[] { #5 0x8000 #0; }
				[] { { #7 0x0000; [] { #5; } } }
				[] { }
				[] { #2; }
				[] { { #2; [] { #2; } } }
			}
			Attr(#8) { [] { #7; } }
		}
	}")?;

	let decoded = decode(&data);
	assert_eq!((decoded.errors, decoded.warnings), (0, 0), "{:?}", decoded.messages);
	assert!(decoded.text.starts_with("module module-info {\n"), "{}", decoded.text);

	let unit = decoded.unit.as_ref().ok_or_else(|| anyhow!("no unit"))?;
	let AttributeBody::Module(module) = &unit.attributes[0].body else {
		return Err(anyhow!("expected a module attribute, got {:?}", unit.attributes[0]));
	};
	assert_eq!(module.requires[0].flags, 0x8000);
	assert_eq!(module.exports[0].to, vec![5]);
	assert_eq!(module.uses, vec![2]);
	assert_eq!(module.provides[0].with, vec![2]);
	assert_eq!(unit.attributes[1].body, AttributeBody::ModulePackages(vec![7]));

	assert_eq!(encode_one(&decoded.text)?, data);
	Ok(())
}

#[test]
fn broken_file_does_not_affect_the_next() -> Result<()> {
	let broken = encode_one("file \"Broken.class\" { 0xCAFEBABE; 0; 52; [2] { ; 42b; } }")?;
	let fine = encode_one("class Fine {
		0xCAFEBABE; 0; 52; [3] { ; Utf8 \"Fine\"; class #1; } 0x0021; #2; #0; [0] {} [] {} [] {} [] {}
	}")?;

	let grammar = Grammar::new();
	let decoder = Decoder::new(&grammar, DecoderOptions::default());

	let first = decoder.decode("Broken.class", &broken);
	assert_eq!(first.errors, 1);
	assert_eq!(encode_one(&first.text)?, broken);

	let second = decoder.decode("Fine.class", &fine);
	assert_eq!((second.errors, second.warnings), (0, 0));
	assert!(second.unit.is_some());
	Ok(())
}

#[test]
fn catalogue_round_trips() -> Result<()> {
	let encoded = encode("catalogue.jcod", include_str!("catalogue.jcod"));
	assert_eq!((encoded.errors, encoded.warnings), (0, 0), "{:?}", encoded.messages);
	let data = &encoded.units[0].bytes;

	let decoded = decode(data);
	assert_eq!((decoded.errors, decoded.warnings), (0, 0), "{:?}", decoded.messages);
	assert!(decoded.text.starts_with("class Catalogue {\n"), "{}", decoded.text);

	let unit = decoded.unit.as_ref().ok_or_else(|| anyhow!("no unit"))?;
	// every attribute has a typed body
	let raw = unit.attributes.iter()
		.chain(unit.methods.iter().flat_map(|method| &method.attributes))
		.find(|attribute| matches!(attribute.body, AttributeBody::Raw(_)));
	assert_eq!(raw, None);

	let again = encode("Catalogue.jcod", &decoded.text);
	assert_eq!((again.errors, again.warnings), (0, 0), "{:?}\n{}", again.messages, decoded.text);
	assert_eq!(&again.units[0].bytes, data);
	Ok(())
}

#[test]
fn class_attributes() -> Result<()> {
	let data = encode_one(include_str!("catalogue.jcod"))?;
	let unit = decode(&data).unit.ok_or_else(|| anyhow!("no unit"))?;
	let bodies: Vec<_> = unit.attributes.iter().map(|attribute| &attribute.body).collect();

	assert_eq!(bodies[0], &AttributeBody::InnerClasses(vec![
		InnerClass { inner_class_index: 6, outer_class_index: 2, inner_name_index: 7, access_flags: 0x0009 },
	]));
	assert_eq!(bodies[1], &AttributeBody::EnclosingMethod { class_index: 2, method_index: 10 });
	assert_eq!(bodies[2], &AttributeBody::Signature { index: 3 });
	assert_eq!(bodies[3], &AttributeBody::SourceDebugExtension(b"SMAP".to_vec()));
	assert_eq!(bodies[4], &AttributeBody::BootstrapMethods(vec![BootstrapMethod { method_ref: 12, arguments: vec![16] }]));
	assert_eq!(bodies[5], &AttributeBody::NestHost { index: 4 });
	assert_eq!(bodies[6], &AttributeBody::NestMembers(vec![6]));
	assert_eq!(bodies[7], &AttributeBody::PermittedSubclasses(vec![6]));

	let AttributeBody::Record(components) = bodies[8] else {
		return Err(anyhow!("expected a record, got {:?}", bodies[8]));
	};
	assert_eq!((components[0].name_index, components[0].descriptor_index), (19, 15));
	assert_eq!(components[0].attributes[0].body, AttributeBody::Signature { index: 15 });

	assert_eq!(bodies[9], &AttributeBody::RuntimeInvisibleAnnotations(vec![Annotation {
		type_index: 13,
		pairs: vec![
			ElementValuePair { name_index: 14, value: ElementValue::Class { index: 15 } },
			ElementValuePair { name_index: 14, value: ElementValue::Enum { type_name_index: 13, const_name_index: 14 } },
		],
	}]));
	Ok(())
}

#[test]
fn method_attributes() -> Result<()> {
	let data = encode_one(include_str!("catalogue.jcod"))?;
	let unit = decode(&data).unit.ok_or_else(|| anyhow!("no unit"))?;
	let run: Vec<_> = unit.methods[0].attributes.iter().map(|attribute| &attribute.body).collect();

	let AttributeBody::Code(code) = run[0] else {
		return Err(anyhow!("expected a code attribute, got {:?}", run[0]));
	};
	assert_eq!(code.exception_table[0].catch_type, 18);
	assert_eq!(code.attributes[0].body, AttributeBody::LineNumberTable(vec![LineNumber { start_pc: 0, line_number: 10 }]));
	let variable = LocalVariable { start_pc: 0, length: 1, name_index: 19, descriptor_index: 15, index: 1 };
	assert_eq!(code.attributes[1].body, AttributeBody::LocalVariableTable(vec![variable]));
	assert_eq!(code.attributes[2].body, AttributeBody::LocalVariableTypeTable(vec![variable]));

	assert_eq!(run[1], &AttributeBody::Exceptions(vec![18]));
	assert_eq!(run[2], &AttributeBody::RuntimeVisibleParameterAnnotations(vec![
		vec![Annotation { type_index: 13, pairs: vec![] }],
	]));
	assert_eq!(run[3], &AttributeBody::RuntimeInvisibleParameterAnnotations(vec![vec![]]));
	assert_eq!(run[4], &AttributeBody::MethodParameters(vec![MethodParameter { name_index: 19, access_flags: 0x0010 }]));
	assert_eq!(run[5], &AttributeBody::Signature { index: 9 });
	assert_eq!(run[6], &AttributeBody::Deprecated);
	assert_eq!(run[7], &AttributeBody::Synthetic);

	// the nested annotation of an annotation default
	let value = &unit.methods[1].attributes[0].body;
	assert_eq!(value, &AttributeBody::AnnotationDefault(ElementValue::Annotation(Annotation {
		type_index: 13,
		pairs: vec![ElementValuePair { name_index: 14, value: ElementValue::Const { tag: b'I', index: 16 } }],
	})));
	Ok(())
}

#[test]
fn remaining_type_annotation_targets() -> Result<()> {
	let data = encode_one(include_str!("catalogue.jcod"))?;
	let unit = decode(&data).unit.ok_or_else(|| anyhow!("no unit"))?;
	let run = &unit.methods[0].attributes;

	let AttributeBody::RuntimeInvisibleTypeAnnotations(annotations) = &run[8].body else {
		return Err(anyhow!("expected type annotations, got {:?}", run[8]));
	};
	let targets: Vec<_> = annotations.iter().map(|annotation| &annotation.target_info).collect();
	assert_eq!(targets, vec![
		&TargetInfo::Empty,
		&TargetInfo::FormalParameter { index: 0 },
		&TargetInfo::Throws { index: 0 },
	]);

	let AttributeBody::Code(code) = &run[0].body else {
		return Err(anyhow!("expected a code attribute, got {:?}", run[0]));
	};
	let AttributeBody::RuntimeInvisibleTypeAnnotations(annotations) = &code.attributes[3].body else {
		return Err(anyhow!("expected type annotations, got {:?}", code.attributes[3]));
	};
	let targets: Vec<_> = annotations.iter().map(|annotation| (annotation.target_type, &annotation.target_info)).collect();
	assert_eq!(targets, vec![
		(0x42, &TargetInfo::Catch { exception_table_index: 0 }),
		(0x43, &TargetInfo::Offset { offset: 0 }),
		(0x47, &TargetInfo::TypeArgument { offset: 0, type_argument_index: 1 }),
	]);
	Ok(())
}

#[test]
fn empty_constant_pool() -> Result<()> {
	let data = encode_one("class A { 0xCAFEBABE; 0; 52; [1] { ; } 0x0001; #0; #0; [] { } [] { } [] { } [] { } }")?;
	assert_eq!(data, vec![
		0xCA, 0xFE, 0xBA, 0xBE,
		0, 0, 0, 52,
		0, 1,
		0, 1,
		0, 0, 0, 0,
		0, 0, 0, 0, 0, 0, 0, 0,
	]);

	let decoded = decode(&data);
	assert_eq!((decoded.errors, decoded.warnings), (0, 0), "{:?}", decoded.messages);
	assert_eq!(decoded.unit.as_ref().map(|unit| unit.constant_pool.count()), Some(1));
	assert_eq!(encode_one(&decoded.text)?, data);
	Ok(())
}
