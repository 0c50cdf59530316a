//! Classic resource fork parsing and serialization.
//!
//! The canonical layout from Inside Macintosh:
//!
//! | Offset | Size | Field                  |
//! |--------|------|------------------------|
//! | 0x00   | 4    | resource data offset   |
//! | 0x04   | 4    | resource map offset    |
//! | 0x08   | 4    | resource data size     |
//! | 0x0C   | 4    | resource map size      |
//!
//! The data segment is a sequence of `u32`-length-prefixed bodies. The map
//! holds a type list (`count - 1`, then `{type, count - 1, ref list offset}`
//! entries), per-type reference lists (`{id, name offset, attributes in the
//! high byte of a 32-bit word whose low 24 bits are the body offset,
//! reserved}`), and a name list of Pascal strings. A name offset of `0xFFFF`
//! means the resource is unnamed.

use crate::rsrc::{
	Resource, ResourceSet,
	error::ContainerError,
	reader::ByteReader,
	text::{decode_mac_roman, encode_mac_roman},
};

/// Offset of the resource data segment in a serialized fork.
const DATA_SEGMENT_OFFSET: u32 = 0x100;

/// Size of the resource map header: 16 reserved bytes, reserved handle,
/// reserved file ref num, attributes, type list offset, name list offset.
const MAP_HEADER_SIZE: usize = 28;

/// Name-offset value marking an unnamed resource.
const NO_NAME: u16 = 0xFFFF;

/// Parses a resource fork. An empty input is a valid fork with no contents.
pub fn parse(data: &[u8]) -> Result<ResourceSet, ContainerError> {
	let mut set = ResourceSet::new();
	if data.is_empty() {
		return Ok(set);
	}

	let r = ByteReader::new(data);
	let data_offset = r.peek_u32(0)? as usize;
	let map_offset = r.peek_u32(4)? as usize;

	// Map header: 16 reserved bytes, u32 reserved handle, u16 reserved file
	// ref num, u16 attributes, then the two list offsets.
	let type_list_rel = r.peek_u16(map_offset + 24)? as usize;
	let name_list_rel = r.peek_u16(map_offset + 26)? as usize;

	// Overflow is fine here: a stored count of 0xFFFF really does mean the
	// list is empty.
	let type_list_offset = map_offset + type_list_rel;
	let num_types = r.peek_u16(type_list_offset)?.wrapping_add(1);

	for type_index in 0..num_types as usize {
		let entry_offset = type_list_offset + 2 + type_index * 8;
		let type_tag = crate::rsrc::TypeTag(r.peek_u32(entry_offset)?);
		let count_minus_one = r.peek_u16(entry_offset + 4)? as usize;
		let ref_list_rel = r.peek_u16(entry_offset + 6)? as usize;

		let ref_list_base = type_list_offset + ref_list_rel;
		for ref_index in 0..=count_minus_one {
			let ref_offset = ref_list_base + ref_index * 12;
			let id = r.peek_i16(ref_offset)?;
			let name_rel = r.peek_u16(ref_offset + 2)?;
			let attrs_and_offset = r.peek_u32(ref_offset + 4)?;

			let name = if name_rel == NO_NAME {
				String::new()
			} else {
				let name_offset = map_offset + name_list_rel + name_rel as usize;
				let name_len = r.peek_u8(name_offset)? as usize;
				decode_mac_roman(r.peek(name_offset + 1, name_len)?)
			};

			let attributes = (attrs_and_offset >> 24) as u8;
			let body_offset = data_offset + (attrs_and_offset & 0x00FF_FFFF) as usize;
			let body_size = r.peek_u32(body_offset)? as usize;
			let body = r.peek(body_offset + 4, body_size)?;

			set.add(Resource::with_metadata(
				type_tag,
				id,
				u16::from(attributes),
				name,
				body.to_vec(),
			));
		}
	}

	Ok(set)
}

/// Serializes a resource set back into the canonical fork layout.
///
/// The data segment starts at offset 0x100; resources are laid out in set
/// order (type, then id ascending), which is also the order the type list
/// and reference lists are written in.
pub fn serialize(set: &ResourceSet) -> Vec<u8> {
	// Data segment
	let mut data_segment = Vec::new();
	let mut body_offsets = Vec::new();
	for res in set.iter() {
		body_offsets.push(data_segment.len() as u32);
		data_segment.extend_from_slice(&(res.data.len() as u32).to_be_bytes());
		data_segment.extend_from_slice(&res.data);
	}

	// Name list
	let mut name_list = Vec::new();
	let mut name_offsets = Vec::new();
	for res in set.iter() {
		if res.name.is_empty() {
			name_offsets.push(NO_NAME);
		} else {
			name_offsets.push(name_list.len() as u16);
			let raw = encode_mac_roman(&res.name);
			name_list.push(raw.len().min(0xFF) as u8);
			name_list.extend_from_slice(&raw[..raw.len().min(0xFF)]);
		}
	}

	// Group consecutive resources by type (the set iterates in key order, so
	// every type forms one contiguous run).
	let mut type_runs: Vec<(crate::rsrc::TypeTag, usize, usize)> = Vec::new();
	for (index, res) in set.iter().enumerate() {
		match type_runs.last_mut() {
			Some((tag, _, count)) if *tag == res.type_tag => *count += 1,
			_ => type_runs.push((res.type_tag, index, 1)),
		}
	}

	let type_list_size = 2 + type_runs.len() * 8;
	let ref_lists_size = set.len() * 12;

	// Type list + reference lists
	let mut type_list = Vec::with_capacity(type_list_size + ref_lists_size);
	type_list.extend_from_slice(&(type_runs.len() as u16).wrapping_sub(1).to_be_bytes());
	let mut ref_list_offset = type_list_size;
	for (tag, _, count) in &type_runs {
		type_list.extend_from_slice(&tag.0.to_be_bytes());
		type_list.extend_from_slice(&((*count as u16) - 1).to_be_bytes());
		type_list.extend_from_slice(&(ref_list_offset as u16).to_be_bytes());
		ref_list_offset += count * 12;
	}
	for (index, res) in set.iter().enumerate() {
		type_list.extend_from_slice(&res.id.to_be_bytes());
		type_list.extend_from_slice(&name_offsets[index].to_be_bytes());
		let attrs_and_offset =
			(u32::from(res.flags as u8) << 24) | (body_offsets[index] & 0x00FF_FFFF);
		type_list.extend_from_slice(&attrs_and_offset.to_be_bytes());
		type_list.extend_from_slice(&0u32.to_be_bytes());
	}

	// Map: header + type list + ref lists + name list
	let map_size = MAP_HEADER_SIZE + type_list.len() + name_list.len();
	let map_offset = DATA_SEGMENT_OFFSET + data_segment.len() as u32;

	let mut out = Vec::with_capacity(map_offset as usize + map_size);
	out.extend_from_slice(&DATA_SEGMENT_OFFSET.to_be_bytes());
	out.extend_from_slice(&map_offset.to_be_bytes());
	out.extend_from_slice(&(data_segment.len() as u32).to_be_bytes());
	out.extend_from_slice(&(map_size as u32).to_be_bytes());
	out.resize(DATA_SEGMENT_OFFSET as usize, 0);
	out.extend_from_slice(&data_segment);

	// Map header
	out.extend_from_slice(&[0u8; 16]); // reserved
	out.extend_from_slice(&0u32.to_be_bytes()); // reserved handle
	out.extend_from_slice(&0u16.to_be_bytes()); // reserved file ref num
	out.extend_from_slice(&0u16.to_be_bytes()); // attributes
	out.extend_from_slice(&(MAP_HEADER_SIZE as u16).to_be_bytes()); // type list offset
	out.extend_from_slice(&((MAP_HEADER_SIZE + type_list.len()) as u16).to_be_bytes()); // name list offset
	out.extend_from_slice(&type_list);
	out.extend_from_slice(&name_list);

	out
}
