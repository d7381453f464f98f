use crate::model::class_constants::{frame, verification};

/// An entry of the `StackMapTable` attribute.
///
/// Variants that encode the offset delta in their leading byte keep that byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackMapFrame {
	/// Frame type `0..=63`.
	Same { frame_type: u8 },
	/// Frame type `64..=127`.
	SameLocals1StackItem { frame_type: u8, stack: VerificationType },
	SameLocals1StackItemExtended { offset_delta: u16, stack: VerificationType },
	/// Frame type `248..=250`, chopping `251 - frame_type` locals.
	Chop { frame_type: u8, offset_delta: u16 },
	SameExtended { offset_delta: u16 },
	/// Appends one to three locals, the frame type is `251 + locals.len()`.
	Append { offset_delta: u16, locals: Vec<VerificationType> },
	Full { offset_delta: u16, locals: Vec<VerificationType>, stack: Vec<VerificationType> },
}

impl StackMapFrame {
	pub fn frame_type(&self) -> u8 {
		match self {
			StackMapFrame::Same { frame_type } => *frame_type,
			StackMapFrame::SameLocals1StackItem { frame_type, .. } => *frame_type,
			StackMapFrame::SameLocals1StackItemExtended { .. } => frame::SAME_LOCALS_1_STACK_ITEM_EXTENDED,
			StackMapFrame::Chop { frame_type, .. } => *frame_type,
			StackMapFrame::SameExtended { .. } => frame::SAME_FRAME_EXTENDED,
			StackMapFrame::Append { locals, .. } => frame::SAME_FRAME_EXTENDED + locals.len() as u8,
			StackMapFrame::Full { .. } => frame::FULL_FRAME,
		}
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VerificationType {
	Top,
	Integer,
	Float,
	Double,
	Long,
	Null,
	UninitializedThis,
	Object { index: u16 },
	/// The offset of the `new` instruction that created the object.
	UninitializedNew { offset: u16 },
}

impl VerificationType {
	pub fn tag(self) -> u8 {
		match self {
			VerificationType::Top => verification::TOP,
			VerificationType::Integer => verification::INTEGER,
			VerificationType::Float => verification::FLOAT,
			VerificationType::Double => verification::DOUBLE,
			VerificationType::Long => verification::LONG,
			VerificationType::Null => verification::NULL,
			VerificationType::UninitializedThis => verification::UNINITIALIZED_THIS,
			VerificationType::Object { .. } => verification::OBJECT,
			VerificationType::UninitializedNew { .. } => verification::UNINITIALIZED,
		}
	}
}
