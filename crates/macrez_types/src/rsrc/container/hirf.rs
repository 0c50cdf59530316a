//! HIRF archive parsing.
//!
//! An `IREZ` file is a flat linked list: each entry declares the offset of
//! the one after it, then `{type, id, name length, name, size, data}`. The
//! final entry's next pointer is at or past the end of the file.

use crate::rsrc::{
	Resource, ResourceSet, TypeTag,
	error::ContainerError,
	reader::ByteReader,
	text::decode_mac_roman,
};

const MAGIC: u32 = 0x4952_455A; // 'IREZ'
const SUPPORTED_VERSION: u32 = 1;

/// Whether the stream starts with the HIRF magic.
pub fn sniff(data: &[u8]) -> bool {
	ByteReader::new(data).peek_u32(0).is_ok_and(|magic| magic == MAGIC)
}

/// Parses a HIRF archive.
pub fn parse(data: &[u8]) -> Result<ResourceSet, ContainerError> {
	let mut r = ByteReader::new(data);

	let magic = r.u32()?;
	if magic != MAGIC {
		return Err(ContainerError::BadSignature {
			expected: MAGIC,
			found: magic,
			offset: 0,
		});
	}
	let version = r.u32()?;
	if version != SUPPORTED_VERSION {
		return Err(ContainerError::UnsupportedVersion {
			format: "HIRF",
			version,
		});
	}
	let _num_resources = r.u32()?;

	let mut set = ResourceSet::new();
	while !r.is_eof() {
		let next_offset = r.u32()? as usize;
		let type_tag = TypeTag(r.u32()?);
		let id = r.u32()? as i16;
		let name = decode_mac_roman(r.pstring()?);
		let size = r.u32()? as usize;
		let body = r.read(size)?;

		set.add(Resource::with_metadata(type_tag, id, 0, name, body.to_vec()));

		if next_offset >= data.len() {
			break;
		}
		r.seek(next_offset)?;
	}

	Ok(set)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rsrc::tags;

	fn build_archive(entries: &[(TypeTag, i16, &str, &[u8])]) -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(&MAGIC.to_be_bytes());
		out.extend_from_slice(&SUPPORTED_VERSION.to_be_bytes());
		out.extend_from_slice(&(entries.len() as u32).to_be_bytes());
		for (i, (tag, id, name, body)) in entries.iter().enumerate() {
			let entry_size = 4 + 4 + 4 + 1 + name.len() + 4 + body.len();
			let next = if i + 1 == entries.len() {
				u32::MAX
			} else {
				(out.len() + entry_size) as u32
			};
			out.extend_from_slice(&next.to_be_bytes());
			out.extend_from_slice(&tag.0.to_be_bytes());
			out.extend_from_slice(&(*id as u32).to_be_bytes());
			out.push(name.len() as u8);
			out.extend_from_slice(name.as_bytes());
			out.extend_from_slice(&(body.len() as u32).to_be_bytes());
			out.extend_from_slice(body);
		}
		out
	}

	#[test]
	fn test_parse_linked_entries() {
		let archive = build_archive(&[
			(tags::STR, 128, "first", b"abc"),
			(tags::PICT, 1000, "", b"\x01\x02"),
		]);
		let set = parse(&archive).unwrap();
		assert_eq!(set.len(), 2);
		assert_eq!(set.peek(tags::STR, 128).unwrap().name, "first");
		assert_eq!(set.peek(tags::PICT, 1000).unwrap().data, vec![1, 2]);
	}

	#[test]
	fn test_wrong_version_rejected() {
		let mut archive = build_archive(&[(tags::STR, 1, "", b"x")]);
		archive[7] = 2;
		assert!(matches!(
			parse(&archive),
			Err(ContainerError::UnsupportedVersion { .. })
		));
	}

	#[test]
	fn test_sniff() {
		assert!(sniff(b"IREZ\x00\x00\x00\x01"));
		assert!(!sniff(b"MHWK"));
	}
}
