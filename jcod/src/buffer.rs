//! The byte sink used while writing a single class file.
use anyhow::{bail, Result};

/// The capacity a [`ByteBuffer`] starts with, unless configured otherwise.
const INITIAL_CAPACITY: usize = 256;

/// A growable byte buffer that supports overwriting fields reserved earlier.
///
/// All multi-byte values are written in big-endian byte order, as everything in a class file is.
///
/// Once written, bytes are only changed again by [`ByteBuffer::write_at`], which exists to backpatch a
/// length or count that was reserved before its value was known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
	data: Vec<u8>,
	/// If set, the capacity grows by this amount instead of doubling.
	increment: Option<usize>,
}

impl ByteBuffer {
	pub fn new() -> ByteBuffer {
		ByteBuffer {
			data: Vec::with_capacity(INITIAL_CAPACITY),
			increment: None,
		}
	}

	/// Creates a buffer whose capacity grows by a fixed `increment` instead of doubling.
	pub fn with_increment(increment: usize) -> ByteBuffer {
		ByteBuffer {
			data: Vec::with_capacity(increment.max(1)),
			increment: Some(increment.max(1)),
		}
	}

	/// The number of bytes written so far.
	pub fn size(&self) -> usize {
		self.data.len()
	}

	pub fn as_slice(&self) -> &[u8] {
		&self.data
	}

	pub fn into_vec(self) -> Vec<u8> {
		self.data
	}

	fn grow_for(&mut self, additional: usize) {
		let needed = self.data.len() + additional;
		let capacity = self.data.capacity();
		if needed <= capacity {
			return;
		}

		let new_capacity = match self.increment {
			Some(increment) => needed.max(capacity + increment),
			None => needed.max(capacity * 2).max(INITIAL_CAPACITY),
		};
		self.data.reserve_exact(new_capacity - self.data.len());
	}

	pub fn write(&mut self, byte: u8) {
		self.grow_for(1);
		self.data.push(byte);
	}

	pub fn write_slice(&mut self, bytes: &[u8]) {
		self.grow_for(bytes.len());
		self.data.extend_from_slice(bytes);
	}

	/// Appends the lowest `width` bytes of `value`, most significant byte first.
	///
	/// `width` must be in `1..=8`.
	pub fn append(&mut self, value: u64, width: usize) {
		debug_assert!((1..=8).contains(&width), "invalid width {width}");
		let width = width.clamp(1, 8);

		self.write_slice(&value.to_be_bytes()[8 - width..]);
	}

	/// Overwrites the `width` bytes at `offset` with the lowest `width` bytes of `value`.
	///
	/// The bytes must have been written before, this never grows the buffer.
	pub fn write_at(&mut self, offset: usize, value: u64, width: usize) -> Result<()> {
		if !(1..=8).contains(&width) {
			bail!("invalid width {width} for backpatching at offset {offset}");
		}
		let Some(field) = self.data.get_mut(offset..offset + width) else {
			bail!("cannot backpatch {width} bytes at offset {offset}: only {} bytes were written", self.data.len());
		};

		field.copy_from_slice(&value.to_be_bytes()[8 - width..]);
		Ok(())
	}
}
