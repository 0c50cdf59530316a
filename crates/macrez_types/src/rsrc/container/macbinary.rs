//! MacBinary v1/v2/v3 parsing.
//!
//! A 0x80-byte header followed by the data fork and the resource fork, each
//! aligned to an 0x80-byte boundary. Version detection:
//!
//! - v3: the v2 checks pass and the signature field reads `mBIN`
//! - v2: the legacy version byte is zero and the header CRC matches
//! - v1: the zero flag is zero and a strict list of must-be-zero fields is
//!   actually zero
//!
//! The CRC is CRC-16/CCITT (polynomial 0x1021, initial value 0, no
//! reflection, no final XOR) over the first 0x7C header bytes, with the bit
//! loop written out the way the historical implementations did it.

use crate::rsrc::{
	ResourceSet,
	container::resource_fork,
	error::ContainerError,
	reader::ByteReader,
	text::decode_mac_roman,
};

const HEADER_SIZE: usize = 0x80;
const MACBINARY3_SIGNATURE: u32 = 0x6D42_494E; // 'mBIN'
const CHECKSUM_OFFSET: usize = 0x7C;
const MAX_FORK_SIZE: u32 = 0x0080_0000;

/// CRC-16/CCITT as used by the MacBinary header checksum.
pub fn crc16(data: &[u8]) -> u16 {
	let mut crc: u16 = 0;
	for &byte in data {
		let mut ch = u16::from(byte) << 8;
		for _ in 0..8 {
			if (ch ^ crc) & 0x8000 != 0 {
				crc = (crc << 1) ^ 0x1021;
			} else {
				crc <<= 1;
			}
			ch <<= 1;
		}
	}
	crc
}

/// A decoded MacBinary file.
#[derive(Debug)]
pub struct DecodedMacBinary {
	/// Original file name
	pub file_name: String,
	/// Finder file type
	pub file_type: u32,
	/// Finder creator
	pub creator: u32,
	/// Data fork bytes
	pub data_fork: Vec<u8>,
	/// Parsed resource fork
	pub resource_fork: ResourceSet,
}

/// Whether the stream passes the MacBinary header checks (any version).
pub fn sniff(data: &[u8]) -> bool {
	header_version(data).is_some()
}

fn header_version(data: &[u8]) -> Option<u8> {
	if data.len() < HEADER_SIZE {
		return None;
	}
	let r = ByteReader::new(data);
	let legacy_version = r.peek_u8(0).ok()?;
	let filename_length = r.peek_u8(1).ok()?;
	let zero_flag = r.peek_u8(0x52).ok()?;
	let data_fork_bytes = r.peek_u32(0x53).ok()?;
	let resource_fork_bytes = r.peek_u32(0x57).ok()?;
	if zero_flag != 0
		|| filename_length > 0x3F
		|| data_fork_bytes >= MAX_FORK_SIZE
		|| resource_fork_bytes >= MAX_FORK_SIZE
	{
		return None;
	}

	let checksum = r.peek_u16(CHECKSUM_OFFSET).ok()?;
	let crc_ok = checksum == crc16(&data[..CHECKSUM_OFFSET]);
	if legacy_version == 0 && crc_ok {
		let signature = r.peek_u32(0x66).ok()?;
		return Some(if signature == MACBINARY3_SIGNATURE { 3 } else { 2 });
	}

	// v1: every field later versions added must be zero
	let v1_zero_ranges: &[(usize, usize)] = &[
		(0x65, 1), // low Finder flags
		(0x66, 4), // v3 signature
		(0x6A, 1), // file name script
		(0x6B, 1), // extended Finder flags
		(0x6C, 8), // unused
		(0x74, 4), // total files length
		(0x78, 2), // secondary header length
		(0x7A, 1), // upload program version
		(0x7B, 1), // minimum MacBinary version
		(0x7C, 2), // checksum
	];
	for &(offset, len) in v1_zero_ranges {
		if data[offset..offset + len].iter().any(|&b| b != 0) {
			return None;
		}
	}
	Some(1)
}

/// Parses a MacBinary file and its embedded resource fork.
pub fn parse(data: &[u8]) -> Result<DecodedMacBinary, ContainerError> {
	let Some(_version) = header_version(data) else {
		return Err(ContainerError::Malformed {
			kind: "not MacBinary",
			context: "header failed v1, v2 and v3 validation".to_string(),
		});
	};
	let r = ByteReader::new(data);

	let filename_length = r.peek_u8(1)? as usize;
	let file_name = decode_mac_roman(r.peek(2, filename_length)?);
	let file_type = r.peek_u32(0x41)?;
	let creator = r.peek_u32(0x45)?;
	let data_fork_bytes = r.peek_u32(0x53)? as usize;
	let resource_fork_bytes = r.peek_u32(0x57)? as usize;
	let extra_header_bytes = r.peek_u16(0x78)? as usize;

	// Data blocks always start on an 0x80-byte boundary
	let data_fork_offset = (HEADER_SIZE + extra_header_bytes + 0x7F) & !0x7F;
	let resource_fork_offset = (data_fork_offset + data_fork_bytes + 0x7F) & !0x7F;

	let data_fork = r.peek(data_fork_offset, data_fork_bytes)?;
	let resource_fork_data = r.peek(resource_fork_offset, resource_fork_bytes)?;

	Ok(DecodedMacBinary {
		file_name,
		file_type,
		creator,
		data_fork: data_fork.to_vec(),
		resource_fork: resource_fork::parse(resource_fork_data)?,
	})
}
