//! PackBits run-length codec.
//!
//! Apple's byte-oriented RLE: a signed header byte `n` prefixes each run.
//! `0..=127` means `n + 1` literal bytes follow; `129..=255` means the next
//! byte repeats `257 - n` times; `128` is a no-op. The same scheme applied to
//! 16-bit words ([`unpack_words`]) carries the high-color scanlines of
//! QuickDraw pixmaps (pack type 3).

use crate::rsrc::{error::ImageError, reader::ByteReader};

/// Decodes PackBits data, consuming from `r` until exactly `expected_len`
/// output bytes are produced.
pub fn unpack(r: &mut ByteReader<'_>, expected_len: usize) -> Result<Vec<u8>, ImageError> {
	let mut out = Vec::with_capacity(expected_len);
	while out.len() < expected_len {
		let header = r.u8()?;
		match header {
			0x80 => {} // no-op
			0x81..=0xFF => {
				let count = 257 - usize::from(header);
				let value = r.u8()?;
				out.resize(out.len() + count, value);
			}
			_ => {
				let count = usize::from(header) + 1;
				out.extend_from_slice(r.read(count)?);
			}
		}
	}
	if out.len() != expected_len {
		return Err(ImageError::MalformedResource {
			kind: "packbits overrun",
			context: format!("run produced {} bytes, row holds {expected_len}", out.len()),
		});
	}
	Ok(out)
}

/// Decodes a whole PackBits buffer of known output size.
pub fn unpack_all(data: &[u8], expected_len: usize) -> Result<Vec<u8>, ImageError> {
	unpack(&mut ByteReader::new(data), expected_len)
}

/// Decodes word-oriented PackBits (QuickDraw pack type 3): runs repeat
/// big-endian 16-bit words instead of bytes. Output length is in bytes and
/// must be even.
pub fn unpack_words(r: &mut ByteReader<'_>, expected_len: usize) -> Result<Vec<u8>, ImageError> {
	let mut out = Vec::with_capacity(expected_len);
	while out.len() < expected_len {
		let header = r.u8()?;
		match header {
			0x80 => {}
			0x81..=0xFF => {
				let count = 257 - usize::from(header);
				let word = r.read(2)?;
				for _ in 0..count {
					out.extend_from_slice(word);
				}
			}
			_ => {
				let count = (usize::from(header) + 1) * 2;
				out.extend_from_slice(r.read(count)?);
			}
		}
	}
	if out.len() != expected_len {
		return Err(ImageError::MalformedResource {
			kind: "packbits overrun",
			context: format!("run produced {} bytes, row holds {expected_len}", out.len()),
		});
	}
	Ok(out)
}

/// The canonical PackBits encoder: literals for non-repeating stretches,
/// runs for three or more equal bytes. [`unpack_all`] inverts it on any
/// input.
pub fn pack(data: &[u8]) -> Vec<u8> {
	let mut out = Vec::new();
	let mut i = 0;
	while i < data.len() {
		// Measure the run starting here
		let mut run = 1;
		while i + run < data.len() && data[i + run] == data[i] && run < 128 {
			run += 1;
		}
		if run >= 3 {
			out.push((257 - run) as u8);
			out.push(data[i]);
			i += run;
			continue;
		}

		// Collect a literal stretch up to the next worthwhile run
		let literal_start = i;
		let mut literal_len = 0;
		while i < data.len() && literal_len < 128 {
			let mut next_run = 1;
			while i + next_run < data.len() && data[i + next_run] == data[i] && next_run < 128 {
				next_run += 1;
			}
			if next_run >= 3 {
				break;
			}
			i += next_run;
			literal_len += next_run;
		}
		let literal_len = literal_len.min(128);
		out.push((literal_len - 1) as u8);
		out.extend_from_slice(&data[literal_start..literal_start + literal_len]);
	}
	out
}
