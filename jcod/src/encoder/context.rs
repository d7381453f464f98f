//! Where in a class the encoder currently is.
//!
//! The context has no influence on the bytes written. It names the element a message is about
//! and tells whether an array is the constant pool.

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameKind {
	Class,
	ConstantPool,
	Interfaces,
	Fields,
	Field,
	Methods,
	Method,
	Attribute,
	/// Anything not classified further.
	Plain,
}

#[derive(Debug, Clone)]
struct Frame {
	kind: FrameKind,
	/// The 1-based number of this frame among its siblings of the same kind.
	index: usize,
	arrays: usize,
	members: usize,
	attributes: usize,
}

impl Frame {
	fn new(kind: FrameKind, index: usize) -> Frame {
		Frame { kind, index, arrays: 0, members: 0, attributes: 0 }
	}
}

#[derive(Debug, Clone, Default)]
pub struct ParseContext {
	frames: Vec<Frame>,
}

impl ParseContext {
	pub fn new() -> ParseContext {
		ParseContext::default()
	}

	pub fn enter_unit(&mut self) {
		self.frames.push(Frame::new(FrameKind::Class, 1));
	}

	/// Enters an array, classified by its position among the arrays of the class.
	pub fn enter_array(&mut self) -> FrameKind {
		let kind = match self.frames.last_mut() {
			Some(parent) if parent.kind == FrameKind::Class => {
				parent.arrays += 1;
				match parent.arrays {
					1 => FrameKind::ConstantPool,
					2 => FrameKind::Interfaces,
					3 => FrameKind::Fields,
					4 => FrameKind::Methods,
					_ => FrameKind::Plain,
				}
			},
			_ => FrameKind::Plain,
		};
		self.frames.push(Frame::new(kind, 1));
		kind
	}

	/// Enters a `{ ... }` element, which is a field or method if it's directly inside of the fields or methods.
	pub fn enter_struct(&mut self) -> FrameKind {
		let (kind, index) = match self.frames.last_mut() {
			Some(parent) if matches!(parent.kind, FrameKind::Fields | FrameKind::Methods) => {
				parent.members += 1;
				let kind = if parent.kind == FrameKind::Fields { FrameKind::Field } else { FrameKind::Method };
				(kind, parent.members)
			},
			_ => (FrameKind::Plain, 1),
		};
		self.frames.push(Frame::new(kind, index));
		kind
	}

	pub fn enter_attribute(&mut self) {
		let index = match self.frames.last_mut() {
			Some(parent) => {
				parent.attributes += 1;
				parent.attributes
			},
			None => 1,
		};
		self.frames.push(Frame::new(FrameKind::Attribute, index));
	}

	pub fn leave(&mut self) {
		self.frames.pop();
	}

	/// Describes the current location like `in attribute #1 of method #2`, or returns nothing at the top level of a class.
	pub fn describe(&self) -> Option<String> {
		let mut parts = Vec::new();
		for frame in self.frames.iter().rev() {
			let part = match frame.kind {
				FrameKind::Attribute => format!("attribute #{}", frame.index),
				FrameKind::Field => format!("field #{}", frame.index),
				FrameKind::Method => format!("method #{}", frame.index),
				FrameKind::ConstantPool => "the constant pool".to_owned(),
				FrameKind::Interfaces => "the interfaces".to_owned(),
				// a member already names what it's in
				FrameKind::Fields if parts.is_empty() => "the fields".to_owned(),
				FrameKind::Methods if parts.is_empty() => "the methods".to_owned(),
				_ => continue,
			};
			parts.push(part);
		}

		(!parts.is_empty()).then(|| format!("in {}", parts.join(" of ")))
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::encoder::context::{FrameKind, ParseContext};

	#[test]
	fn arrays_are_classified_by_order() {
		let mut context = ParseContext::new();
		context.enter_unit();

		let mut kinds = Vec::new();
		for _ in 0..5 {
			kinds.push(context.enter_array());
			context.leave();
		}

		assert_eq!(kinds, vec![
			FrameKind::ConstantPool,
			FrameKind::Interfaces,
			FrameKind::Fields,
			FrameKind::Methods,
			FrameKind::Plain,
		]);
	}

	#[test]
	fn describe_method_attribute() {
		let mut context = ParseContext::new();
		context.enter_unit();
		assert_eq!(context.describe(), None);

		for _ in 0..3 {
			context.enter_array();
			context.leave();
		}
		assert_eq!(context.enter_array(), FrameKind::Methods);
		assert_eq!(context.describe().as_deref(), Some("in the methods"));

		context.enter_struct();
		context.leave();
		assert_eq!(context.enter_struct(), FrameKind::Method);
		assert_eq!(context.describe().as_deref(), Some("in method #2"));

		context.enter_array();
		context.enter_attribute();
		assert_eq!(context.describe().as_deref(), Some("in attribute #1 of method #2"));
	}

	#[test]
	fn nested_structs_are_plain() {
		let mut context = ParseContext::new();
		context.enter_unit();
		assert_eq!(context.enter_array(), FrameKind::ConstantPool);
		assert_eq!(context.enter_struct(), FrameKind::Plain);
		assert_eq!(context.describe().as_deref(), Some("in the constant pool"));
	}
}
