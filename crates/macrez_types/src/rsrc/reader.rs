//! Cursor-based reader over a borrowed byte range.
//!
//! Every resource format in this crate is big-endian, so the unsuffixed
//! readers decode big-endian values. The `_le` variants exist for the two
//! documented exceptions: the MacBinary header CRC and the DC-Data index.
//!
//! Readers are views; they never copy or mutate the underlying buffer.

use crate::rsrc::error::ReadError;

/// Bounds-checked cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
	data: &'a [u8],
	offset: usize,
}

macro_rules! be_reader {
	($name:ident, $peek:ident, $ty:ty) => {
		/// Reads a big-endian value and advances the cursor.
		pub fn $name(&mut self) -> Result<$ty, ReadError> {
			let bytes = self.read_array::<{ size_of::<$ty>() }>(stringify!($name))?;
			Ok(<$ty>::from_be_bytes(bytes))
		}

		/// Reads a big-endian value at an absolute offset without moving the cursor.
		pub fn $peek(&self, offset: usize) -> Result<$ty, ReadError> {
			let bytes = self.peek_array::<{ size_of::<$ty>() }>(offset, stringify!($peek))?;
			Ok(<$ty>::from_be_bytes(bytes))
		}
	};
}

macro_rules! le_reader {
	($name:ident, $ty:ty) => {
		/// Reads a little-endian value and advances the cursor.
		pub fn $name(&mut self) -> Result<$ty, ReadError> {
			let bytes = self.read_array::<{ size_of::<$ty>() }>(stringify!($name))?;
			Ok(<$ty>::from_le_bytes(bytes))
		}
	};
}

impl<'a> ByteReader<'a> {
	/// Creates a reader over the whole slice with the cursor at zero.
	pub fn new(data: &'a [u8]) -> Self {
		Self {
			data,
			offset: 0,
		}
	}

	/// Total length of the readable range.
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Whether the underlying range is empty.
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Current cursor position.
	pub fn position(&self) -> usize {
		self.offset
	}

	/// Bytes left between the cursor and the end of the range.
	pub fn remaining(&self) -> usize {
		self.data.len().saturating_sub(self.offset)
	}

	/// Whether the cursor has reached the end of the range.
	pub fn is_eof(&self) -> bool {
		self.offset >= self.data.len()
	}

	/// Moves the cursor to an absolute offset. Seeking to `len()` is allowed
	/// (it leaves the reader at EOF); seeking past it is an error.
	pub fn seek(&mut self, offset: usize) -> Result<(), ReadError> {
		if offset > self.data.len() {
			return Err(ReadError::OutOfRange {
				offset,
				len: 0,
				bound: self.data.len(),
				context: "seek",
			});
		}
		self.offset = offset;
		Ok(())
	}

	/// Advances the cursor by `n` bytes.
	pub fn skip(&mut self, n: usize) -> Result<(), ReadError> {
		self.check(self.offset, n, "skip")?;
		self.offset += n;
		Ok(())
	}

	/// Returns a borrowed subslice of `n` bytes and advances the cursor.
	pub fn read(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
		self.check(self.offset, n, "read")?;
		let slice = &self.data[self.offset..self.offset + n];
		self.offset += n;
		Ok(slice)
	}

	/// Returns a borrowed subslice at an absolute offset, without advancing.
	pub fn peek(&self, offset: usize, n: usize) -> Result<&'a [u8], ReadError> {
		self.check(offset, n, "peek")?;
		Ok(&self.data[offset..offset + n])
	}

	/// Returns a new reader over `[offset, offset + len)` of the same buffer.
	pub fn sub(&self, offset: usize, len: usize) -> Result<ByteReader<'a>, ReadError> {
		self.check(offset, len, "sub")?;
		Ok(ByteReader::new(&self.data[offset..offset + len]))
	}

	/// Returns a new reader from `offset` to the end of the buffer.
	pub fn sub_to_end(&self, offset: usize) -> Result<ByteReader<'a>, ReadError> {
		self.check(offset, 0, "sub_to_end")?;
		Ok(ByteReader::new(&self.data[offset..]))
	}

	/// Remaining bytes from the cursor to the end, without advancing.
	pub fn rest(&self) -> &'a [u8] {
		&self.data[self.offset.min(self.data.len())..]
	}

	/// Reads a single byte.
	pub fn u8(&mut self) -> Result<u8, ReadError> {
		let bytes = self.read_array::<1>("u8")?;
		Ok(bytes[0])
	}

	/// Reads a single signed byte.
	pub fn i8(&mut self) -> Result<i8, ReadError> {
		Ok(self.u8()? as i8)
	}

	/// Reads a byte at an absolute offset without advancing.
	pub fn peek_u8(&self, offset: usize) -> Result<u8, ReadError> {
		let bytes = self.peek_array::<1>(offset, "peek_u8")?;
		Ok(bytes[0])
	}

	be_reader!(u16, peek_u16, u16);
	be_reader!(i16, peek_i16, i16);
	be_reader!(u32, peek_u32, u32);
	be_reader!(i32, peek_i32, i32);
	be_reader!(u64, peek_u64, u64);

	le_reader!(u16_le, u16);
	le_reader!(u32_le, u32);
	le_reader!(i16_le, i16);

	/// Reads a length-prefixed Pascal string (raw bytes, not yet decoded
	/// from Mac-Roman).
	pub fn pstring(&mut self) -> Result<&'a [u8], ReadError> {
		let len = self.u8()? as usize;
		self.read(len)
	}

	fn check(&self, offset: usize, len: usize, context: &'static str) -> Result<(), ReadError> {
		if offset.checked_add(len).is_none_or(|end| end > self.data.len()) {
			return Err(ReadError::OutOfRange {
				offset,
				len,
				bound: self.data.len(),
				context,
			});
		}
		Ok(())
	}

	fn read_array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N], ReadError> {
		let bytes = self.peek_array::<N>(self.offset, context)?;
		self.offset += N;
		Ok(bytes)
	}

	fn peek_array<const N: usize>(
		&self,
		offset: usize,
		context: &'static str,
	) -> Result<[u8; N], ReadError> {
		self.check(offset, N, context)?;
		let mut bytes = [0u8; N];
		bytes.copy_from_slice(&self.data[offset..offset + N]);
		Ok(bytes)
	}
}
