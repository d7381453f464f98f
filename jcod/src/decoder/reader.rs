use anyhow::{bail, Context, Result};
use log::trace;

/// A cursor over the bytes of a class file, bounded by a stack of ranges.
///
/// [`ClassReader::enter`] limits reading to the next `n` bytes, [`ClassReader::leave`] puts the cursor at the
/// end of that range and restores the outer bound. Reads never go past the current bound.
#[derive(Debug)]
pub(crate) struct ClassReader<'d> {
	data: &'d [u8],
	pos: usize,
	end: usize,
	/// The saved outer bounds.
	ranges: Vec<usize>,
}

impl<'d> ClassReader<'d> {
	pub(crate) fn new(data: &'d [u8]) -> ClassReader<'d> {
		ClassReader { data, pos: 0, end: data.len(), ranges: Vec::new() }
	}

	pub(crate) fn pos(&self) -> usize {
		self.pos
	}

	/// The number of ranges entered.
	pub(crate) fn depth(&self) -> usize {
		self.ranges.len()
	}

	/// The bytes left in the current range.
	pub(crate) fn remaining(&self) -> usize {
		self.end - self.pos
	}

	/// Moves the cursor within the current range.
	pub(crate) fn seek(&mut self, pos: usize) {
		self.pos = pos.min(self.end);
	}

	pub(crate) fn take(&mut self, n: usize) -> Result<&'d [u8]> {
		if n > self.remaining() {
			bail!("couldn't read {n} bytes at offset {:#x}, only {} are left", self.pos, self.remaining());
		}
		let bytes = &self.data[self.pos..self.pos + n];
		self.pos += n;
		Ok(bytes)
	}

	fn read_n<const N: usize>(&mut self) -> Result<[u8; N]> {
		let mut array = [0; N];
		array.copy_from_slice(self.take(N)?);
		Ok(array)
	}

	pub(crate) fn read_u8(&mut self) -> Result<u8> {
		Ok(u8::from_be_bytes(self.read_n().context("couldn't read u8, perhaps the data's end is reached?")?))
	}

	pub(crate) fn read_u16(&mut self) -> Result<u16> {
		Ok(u16::from_be_bytes(self.read_n().context("couldn't read u16, perhaps the data's end is reached?")?))
	}

	pub(crate) fn read_u32(&mut self) -> Result<u32> {
		Ok(u32::from_be_bytes(self.read_n().context("couldn't read u32, perhaps the data's end is reached?")?))
	}

	pub(crate) fn read_u64(&mut self) -> Result<u64> {
		Ok(u64::from_be_bytes(self.read_n().context("couldn't read u64, perhaps the data's end is reached?")?))
	}

	pub(crate) fn read_u8_as_usize(&mut self) -> Result<usize> {
		Ok(self.read_u8()? as usize)
	}

	pub(crate) fn read_u16_as_usize(&mut self) -> Result<usize> {
		Ok(self.read_u16()? as usize)
	}

	pub(crate) fn read_vec<T, S, E>(&mut self, get_size: S, mut get_element: E) -> Result<Vec<T>>
		where
			S: FnOnce(&mut Self) -> Result<usize>,
			E: FnMut(&mut Self) -> Result<T>,
	{
		let size = get_size(self)?;
		// the size comes from the data, don't trust it for allocating
		let mut vec = Vec::with_capacity(size.min(self.remaining()));
		for _ in 0..size {
			vec.push(get_element(self)?);
		}
		Ok(vec)
	}

	pub(crate) fn read_u16_vec(&mut self) -> Result<Vec<u16>> {
		self.read_vec(Self::read_u16_as_usize, Self::read_u16)
	}

	/// Limits reading to the next `length` bytes.
	///
	/// If fewer bytes are left, the range is clamped and the number of available bytes is returned.
	pub(crate) fn enter(&mut self, length: usize) -> Option<usize> {
		let available = self.remaining();
		let clamped = length.min(available);
		trace!("entering range {:#x}..{:#x}", self.pos, self.pos + clamped);

		self.ranges.push(self.end);
		self.end = self.pos + clamped;
		(length > available).then_some(available)
	}

	/// Skips the rest of the current range and restores the outer one, returning the number of bytes skipped.
	pub(crate) fn leave(&mut self) -> usize {
		let skipped = self.remaining();
		trace!("leaving range at {:#x}, skipping {skipped} bytes", self.end);

		self.pos = self.end;
		self.end = self.ranges.pop().unwrap_or(self.data.len());
		skipped
	}

	/// The rest of the current range, without moving the cursor.
	pub(crate) fn range_rest(&self) -> &'d [u8] {
		&self.data[self.pos..self.end]
	}

	/// Everything from `pos` to the end of the data, ignoring all ranges.
	pub(crate) fn rest_from(&self, pos: usize) -> &'d [u8] {
		&self.data[pos.min(self.data.len())..]
	}
}
