//! CBag archive parsing.
//!
//! A big-endian count followed by fixed-size entries of `{type, id,
//! reserved, data offset, data size, name length, name[63]}`.

use crate::rsrc::{
	Resource, ResourceSet, TypeTag,
	error::ContainerError,
	reader::ByteReader,
	text::decode_mac_roman,
};

const NAME_FIELD_SIZE: usize = 0x3F;

/// Parses a CBag archive.
pub fn parse(data: &[u8]) -> Result<ResourceSet, ContainerError> {
	let mut r = ByteReader::new(data);
	let count = r.u32()?;

	let mut set = ResourceSet::new();
	for _ in 0..count {
		let type_tag = TypeTag(r.u32()?);
		let id = r.i16()?;
		let _reserved = r.u16()?;
		let data_offset = r.u32()? as usize;
		let data_size = r.u32()? as usize;
		let name_length = (r.u8()? as usize).min(NAME_FIELD_SIZE);
		let name_field = r.read(NAME_FIELD_SIZE)?;
		let name = decode_mac_roman(&name_field[..name_length]);

		let body = r.peek(data_offset, data_size)?;
		set.add(Resource::with_metadata(type_tag, id, 0, name, body.to_vec()));
	}

	Ok(set)
}
