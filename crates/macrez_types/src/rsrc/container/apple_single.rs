//! AppleSingle / AppleDouble parsing and serialization.
//!
//! Both formats share a header (`0x00051600` for AppleSingle, `0x00051607`
//! for AppleDouble, version 1.0 or 2.0) followed by an entry table. Entry
//! type 2 is a resource fork and is parsed recursively; the other fourteen
//! entry kinds are carried through as raw bytes.

use crate::rsrc::{ResourceSet, container::resource_fork, error::ContainerError, reader::ByteReader};

const APPLESINGLE_MAGIC: u32 = 0x0005_1600;
const APPLEDOUBLE_MAGIC: u32 = 0x0005_1607;
const VERSION_1: u32 = 0x0001_0000;
const VERSION_2: u32 = 0x0002_0000;

/// Entry kinds defined by the AppleSingle specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum EntryKind {
	DataFork = 1,
	ResourceFork = 2,
	FileName = 3,
	Comment = 4,
	BwIcon = 5,
	ColorIcon = 6,
	FileInfo = 7,
	Dates = 8,
	FinderInfo = 9,
	MacFileInfo = 10,
	ProdosFileInfo = 11,
	MsdosFileInfo = 12,
	AfpShortName = 13,
	AfpFileInfo = 14,
	AfpDirectoryId = 15,
}

impl EntryKind {
	fn from_u32(value: u32) -> Option<Self> {
		(1..=15).contains(&value).then(|| {
			// Enum discriminants are exactly 1..=15
			match value {
				1 => EntryKind::DataFork,
				2 => EntryKind::ResourceFork,
				3 => EntryKind::FileName,
				4 => EntryKind::Comment,
				5 => EntryKind::BwIcon,
				6 => EntryKind::ColorIcon,
				7 => EntryKind::FileInfo,
				8 => EntryKind::Dates,
				9 => EntryKind::FinderInfo,
				10 => EntryKind::MacFileInfo,
				11 => EntryKind::ProdosFileInfo,
				12 => EntryKind::MsdosFileInfo,
				13 => EntryKind::AfpShortName,
				14 => EntryKind::AfpFileInfo,
				_ => EntryKind::AfpDirectoryId,
			}
		})
	}
}

/// A decoded AppleSingle / AppleDouble file.
#[derive(Debug, Default)]
pub struct DecodedAppleSingle {
	/// Parsed resource fork (empty set when the entry is absent)
	pub resource_fork: ResourceSet,
	/// Data fork bytes
	pub data_fork: Vec<u8>,
	/// Original file name bytes
	pub file_name: Vec<u8>,
	/// Remaining entries, unparsed, in table order
	pub other_entries: Vec<(EntryKind, Vec<u8>)>,
}

/// Whether the stream starts with an AppleSingle/AppleDouble header.
pub fn sniff(data: &[u8]) -> bool {
	let r = ByteReader::new(data);
	let (Ok(magic), Ok(version)) = (r.peek_u32(0), r.peek_u32(4)) else {
		return false;
	};
	(magic == APPLESINGLE_MAGIC || magic == APPLEDOUBLE_MAGIC)
		&& (version == VERSION_1 || version == VERSION_2)
}

/// Parses an AppleSingle or AppleDouble file.
pub fn parse(data: &[u8]) -> Result<DecodedAppleSingle, ContainerError> {
	let mut r = ByteReader::new(data);

	let magic = r.u32()?;
	if magic != APPLESINGLE_MAGIC && magic != APPLEDOUBLE_MAGIC {
		return Err(ContainerError::BadSignature {
			expected: APPLESINGLE_MAGIC,
			found: magic,
			offset: 0,
		});
	}
	let version = r.u32()?;
	if version != VERSION_1 && version != VERSION_2 {
		return Err(ContainerError::UnsupportedVersion {
			format: "AppleSingle/AppleDouble",
			version,
		});
	}
	r.skip(0x10)?; // home filesystem, unused in version 2
	let num_entries = r.u16()?;

	let mut ret = DecodedAppleSingle::default();
	for _ in 0..num_entries {
		let kind_raw = r.u32()?;
		let offset = r.u32()? as usize;
		let size = r.u32()? as usize;
		let body = r.peek(offset, size)?;

		match EntryKind::from_u32(kind_raw) {
			Some(EntryKind::DataFork) => ret.data_fork = body.to_vec(),
			Some(EntryKind::ResourceFork) => {
				ret.resource_fork = resource_fork::parse(body)?;
			}
			Some(EntryKind::FileName) => ret.file_name = body.to_vec(),
			Some(kind) => ret.other_entries.push((kind, body.to_vec())),
			None => {
				return Err(ContainerError::Malformed {
					kind: "unknown entry type",
					context: format!("entry type {kind_raw}"),
				});
			}
		}
	}
	Ok(ret)
}

impl DecodedAppleSingle {
	/// Serializes back to AppleSingle (version 2.0) layout. Empty entries
	/// are omitted, matching the usual writer behavior.
	pub fn serialize(&self) -> Vec<u8> {
		let rf_data = if self.resource_fork.is_empty() {
			Vec::new()
		} else {
			resource_fork::serialize(&self.resource_fork)
		};

		let mut entries: Vec<(u32, &[u8])> = Vec::new();
		if !self.data_fork.is_empty() {
			entries.push((EntryKind::DataFork as u32, &self.data_fork));
		}
		if !rf_data.is_empty() {
			entries.push((EntryKind::ResourceFork as u32, &rf_data));
		}
		if !self.file_name.is_empty() {
			entries.push((EntryKind::FileName as u32, &self.file_name));
		}
		for (kind, body) in &self.other_entries {
			if !body.is_empty() {
				entries.push((*kind as u32, body));
			}
		}

		let header_size = 0x1A + entries.len() * 12;
		let mut out = Vec::with_capacity(header_size);
		out.extend_from_slice(&APPLESINGLE_MAGIC.to_be_bytes());
		out.extend_from_slice(&VERSION_2.to_be_bytes());
		out.extend_from_slice(&[0u8; 0x10]);
		out.extend_from_slice(&(entries.len() as u16).to_be_bytes());

		let mut offset = header_size;
		for (kind, body) in &entries {
			out.extend_from_slice(&kind.to_be_bytes());
			out.extend_from_slice(&(offset as u32).to_be_bytes());
			out.extend_from_slice(&(body.len() as u32).to_be_bytes());
			offset += body.len();
		}
		for (_, body) in &entries {
			out.extend_from_slice(body);
		}
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rsrc::{Resource, tags};

	#[test]
	fn test_roundtrip_with_resource_fork() {
		let mut fork = ResourceSet::new();
		fork.add(Resource::with_metadata(
			tags::STR,
			128,
			0,
			"Hello".to_string(),
			b"\x05Hello".to_vec(),
		));
		let decoded = DecodedAppleSingle {
			resource_fork: fork,
			data_fork: b"data".to_vec(),
			file_name: b"My File".to_vec(),
			other_entries: vec![(EntryKind::Comment, b"note".to_vec())],
		};

		let bytes = decoded.serialize();
		assert!(sniff(&bytes));
		let parsed = parse(&bytes).unwrap();
		assert_eq!(parsed.data_fork, b"data");
		assert_eq!(parsed.file_name, b"My File");
		assert_eq!(parsed.other_entries, vec![(EntryKind::Comment, b"note".to_vec())]);
		let res = parsed.resource_fork.peek(tags::STR, 128).unwrap();
		assert_eq!(res.name, "Hello");
		assert_eq!(res.data, b"\x05Hello");
	}

	#[test]
	fn test_appledouble_magic_accepted() {
		let mut bytes = DecodedAppleSingle::default().serialize();
		bytes[3] = 0x07;
		assert!(sniff(&bytes));
		assert!(parse(&bytes).is_ok());
	}

	#[test]
	fn test_bad_version_rejected() {
		let mut bytes = DecodedAppleSingle::default().serialize();
		bytes[5] = 0x03;
		assert!(!sniff(&bytes));
		assert!(matches!(
			parse(&bytes),
			Err(ContainerError::UnsupportedVersion { .. })
		));
	}
}
