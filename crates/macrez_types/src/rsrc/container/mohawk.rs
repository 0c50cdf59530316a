//! Mohawk archive parsing.
//!
//! Layout:
//!
//! | Field | Description |
//! |---|---|
//! | `MHWK` magic, remaining size | file header |
//! | `RSRC` magic, version, file size | resource header |
//! | resource dir | type table `{type, resource table offset, name table offset}` |
//! | file table | `{data offset, 24-bit size, flags}` entries, 1-indexed |
//!
//! Each type's resource table maps ids to file-table indices; each file-table
//! entry points at a data block whose 12-byte header declares the body size.

use crate::rsrc::{Resource, ResourceSet, TypeTag, error::ContainerError, reader::ByteReader};

const MAGIC: u32 = 0x4D48_574B; // 'MHWK'
const RESOURCE_MAGIC: u32 = 0x5253_5243; // 'RSRC'

/// Whether the stream starts with the Mohawk magic.
pub fn sniff(data: &[u8]) -> bool {
	ByteReader::new(data).peek_u32(0).is_ok_and(|magic| magic == MAGIC)
}

/// Parses a Mohawk archive.
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
	let _remaining_file_size = r.u32()?;
	let resource_magic = r.u32()?;
	if resource_magic != RESOURCE_MAGIC {
		return Err(ContainerError::BadSignature {
			expected: RESOURCE_MAGIC,
			found: resource_magic,
			offset: 8,
		});
	}
	let _version = r.u16()?;
	let _unused = r.u16()?;
	let _file_size = r.u32()?;
	let dir_offset = r.u32()? as usize;
	let file_table_rel = r.u16()? as usize;
	let _file_table_size = r.u16()?;

	// Type table at the directory base: name list offset, count, entries.
	let type_count = r.peek_u16(dir_offset + 2)? as usize;

	// File table: u32 count, then 12-byte entries.
	let file_table_offset = dir_offset + file_table_rel;
	let file_count = r.peek_u32(file_table_offset)? as usize;

	let file_entry = |index: usize| -> Result<(usize, usize), ContainerError> {
		let offset = file_table_offset + 4 + index * 12;
		let data_offset = r.peek_u32(offset)? as usize;
		let size_low = r.peek_u16(offset + 4)? as usize;
		let size_high = r.peek_u8(offset + 6)? as usize;
		Ok((data_offset, size_low | (size_high << 16)))
	};

	let mut set = ResourceSet::new();
	for type_index in 0..type_count {
		let entry_offset = dir_offset + 4 + type_index * 8;
		let type_tag = TypeTag(r.peek_u32(entry_offset)?);
		let res_table_rel = r.peek_u16(entry_offset + 4)? as usize;

		let res_table_offset = dir_offset + res_table_rel;
		let res_count = r.peek_u16(res_table_offset)? as usize;
		for res_index in 0..res_count {
			let res_offset = res_table_offset + 2 + res_index * 4;
			let id = r.peek_u16(res_offset)? as i16;
			let file_index = r.peek_u16(res_offset + 2)? as usize;
			if file_index < 1 || file_index > file_count {
				return Err(ContainerError::Malformed {
					kind: "file table reference out of range",
					context: format!("{type_tag} id {id} references file entry {file_index}"),
				});
			}

			let (data_offset, _declared) = file_entry(file_index - 1)?;
			// The data block's own header declares the body size; the body
			// starts 12 bytes in and is 4 bytes shorter than declared.
			let block_size = r.peek_u32(data_offset + 4)? as usize;
			if block_size < 4 {
				return Err(ContainerError::Malformed {
					kind: "data block too short",
					context: format!("{type_tag} id {id} block size {block_size}"),
				});
			}
			let body = r.peek(data_offset + 12, block_size - 4)?;
			set.add(Resource::new(type_tag, id, body.to_vec()));
		}
	}

	Ok(set)
}
