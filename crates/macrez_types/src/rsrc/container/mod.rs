//! Container-format parsers.
//!
//! Each parser reads a container byte stream and emits a
//! [`ResourceSet`](crate::rsrc::ResourceSet). Parsers fail on the first
//! non-trivial mismatch (signature, version, bound) and never skip bytes
//! silently; recovery is the caller's concern.

pub mod apple_single;
pub mod cbag;
pub mod dc_data;
pub mod directory;
pub mod hirf;
pub mod macbinary;
pub mod mohawk;
pub mod resource_fork;

use crate::rsrc::{ResourceSet, error::ContainerError};

/// The container formats this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
	/// Classic resource fork (Inside Macintosh layout)
	ResourceFork,
	/// Mohawk archive (`MHWK`/`RSRC`)
	Mohawk,
	/// HIRF archive (`IREZ`)
	Hirf,
	/// DC-Data index (little-endian)
	DcData,
	/// CBag archive
	CBag,
	/// AppleSingle / AppleDouble wrapper
	AppleSingle,
	/// MacBinary v1/v2/v3 wrapper
	MacBinary,
	/// `TYPE/ID[_NAME].bin` directory tree on disk
	Directory,
}

impl std::fmt::Display for IndexFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			IndexFormat::ResourceFork => "resource fork",
			IndexFormat::Mohawk => "Mohawk",
			IndexFormat::Hirf => "HIRF",
			IndexFormat::DcData => "DC-Data",
			IndexFormat::CBag => "CBag",
			IndexFormat::AppleSingle => "AppleSingle/AppleDouble",
			IndexFormat::MacBinary => "MacBinary",
			IndexFormat::Directory => "directory",
		};
		write!(f, "{name}")
	}
}

/// Guesses the container format of a byte stream from its magic bytes.
///
/// Formats without a signature (resource fork, DC-Data, CBag) cannot be
/// sniffed and are not returned here; [`parse_auto`] falls back to trying
/// them in order.
pub fn sniff_format(data: &[u8]) -> Option<IndexFormat> {
	if apple_single::sniff(data) {
		Some(IndexFormat::AppleSingle)
	} else if mohawk::sniff(data) {
		Some(IndexFormat::Mohawk)
	} else if hirf::sniff(data) {
		Some(IndexFormat::Hirf)
	} else if macbinary::sniff(data) {
		Some(IndexFormat::MacBinary)
	} else {
		None
	}
}

/// Parses a container byte stream, choosing the format by magic sniffing.
///
/// Signature-less formats are tried in a fixed order after the sniffable
/// ones: resource fork, then DC-Data, then CBag.
pub fn parse_auto(data: &[u8]) -> Result<ResourceSet, ContainerError> {
	if let Some(format) = sniff_format(data) {
		return parse_as(data, format);
	}
	if let Ok(set) = resource_fork::parse(data) {
		return Ok(set);
	}
	if let Ok(set) = dc_data::parse(data) {
		return Ok(set);
	}
	if let Ok(set) = cbag::parse(data) {
		return Ok(set);
	}
	Err(ContainerError::UnknownFormat)
}

/// Parses a container byte stream as a specific format.
pub fn parse_as(data: &[u8], format: IndexFormat) -> Result<ResourceSet, ContainerError> {
	match format {
		IndexFormat::ResourceFork => resource_fork::parse(data),
		IndexFormat::Mohawk => mohawk::parse(data),
		IndexFormat::Hirf => hirf::parse(data),
		IndexFormat::DcData => dc_data::parse(data),
		IndexFormat::CBag => cbag::parse(data),
		IndexFormat::AppleSingle => Ok(apple_single::parse(data)?.resource_fork),
		IndexFormat::MacBinary => Ok(macbinary::parse(data)?.resource_fork),
		IndexFormat::Directory => Err(ContainerError::Malformed {
			kind: "not a byte stream",
			context: "directory containers are loaded with container::directory::load".to_string(),
		}),
	}
}
