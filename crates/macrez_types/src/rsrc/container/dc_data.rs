//! DC-Data index parsing.
//!
//! The one little-endian container: a header of `{reserved, count,
//! reserved[2]}` followed by `count` entries of `{offset, size, type, id}`.

use crate::rsrc::{Resource, ResourceSet, TypeTag, error::ContainerError, reader::ByteReader};

/// Parses a DC-Data index.
pub fn parse(data: &[u8]) -> Result<ResourceSet, ContainerError> {
	let mut r = ByteReader::new(data);

	let _reserved1 = r.u32_le()?;
	let count = r.u16_le()?;
	let _reserved2 = r.u16_le()?;
	let _reserved3 = r.u16_le()?;

	let mut set = ResourceSet::new();
	for _ in 0..count {
		let offset = r.u32_le()? as usize;
		let size = r.u32_le()? as usize;
		// The type tag is stored as four label bytes; reading it little-endian
		// would reverse the label.
		let type_tag = TypeTag(r.u32()?);
		let id = r.i16_le()?;

		let body = r.peek(offset, size)?;
		set.add(Resource::new(type_tag, id, body.to_vec()));
	}

	Ok(set)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rsrc::tags;

	#[test]
	fn test_parse_entries() {
		let body_a = b"hello";
		let body_b = b"\x00\x01";
		let header_size = 10 + 2 * 14;
		let mut out = Vec::new();
		out.extend_from_slice(&0u32.to_le_bytes());
		out.extend_from_slice(&2u16.to_le_bytes());
		out.extend_from_slice(&[0u8; 4]);
		out.extend_from_slice(&(header_size as u32).to_le_bytes());
		out.extend_from_slice(&(body_a.len() as u32).to_le_bytes());
		out.extend_from_slice(&tags::STR.0.to_be_bytes());
		out.extend_from_slice(&128i16.to_le_bytes());
		out.extend_from_slice(&((header_size + body_a.len()) as u32).to_le_bytes());
		out.extend_from_slice(&(body_b.len() as u32).to_le_bytes());
		out.extend_from_slice(&tags::PICT.0.to_be_bytes());
		out.extend_from_slice(&(-3i16).to_le_bytes());
		out.extend_from_slice(body_a);
		out.extend_from_slice(body_b);

		let set = parse(&out).unwrap();
		assert_eq!(set.len(), 2);
		assert_eq!(set.peek(tags::STR, 128).unwrap().data, body_a);
		assert_eq!(set.peek(tags::PICT, -3).unwrap().data, body_b);
	}

	#[test]
	fn test_out_of_range_entry_fails() {
		let mut out = Vec::new();
		out.extend_from_slice(&0u32.to_le_bytes());
		out.extend_from_slice(&1u16.to_le_bytes());
		out.extend_from_slice(&[0u8; 4]);
		out.extend_from_slice(&1000u32.to_le_bytes());
		out.extend_from_slice(&4u32.to_le_bytes());
		out.extend_from_slice(&tags::STR.0.to_be_bytes());
		out.extend_from_slice(&1i16.to_le_bytes());
		assert!(parse(&out).is_err());
	}
}
