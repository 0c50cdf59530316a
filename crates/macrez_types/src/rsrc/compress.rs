//! Compressed-resource detection and decompressor dispatch.
//!
//! A compressed resource body starts with a fixed header:
//!
//! | Offset | Size | Field               | Description                         |
//! |--------|------|---------------------|-------------------------------------|
//! | 0x00   | 4    | `magic`             | 0xA89F6572, big-endian              |
//! | 0x04   | 2    | `header_size`       | usually 0x12                        |
//! | 0x06   | 1    | `header_version`    | 8 (`dcmp`) or 9 (`ncmp`)            |
//! | 0x07   | 1    | `attributes`        |                                     |
//! | 0x08   | 4    | `decompressed_size` |                                     |
//! | 0x0C   | 6    | version-specific    | see [`HeaderTail`]                  |
//!
//! Decompressor ids 0 through 3 select the system decompressors that shipped
//! with classic Mac OS; any other id names a `dcmp`/`ncmp` resource that must
//! be present in the same [`ResourceSet`]. Either way the decompressor is a
//! 68K code resource, and running it is the job of an external
//! [`CodeExecutor`] (a CPU emulator); this module only parses headers,
//! resolves decompressor bytes, applies the per-call dispatch flags, and
//! validates the output size.

use log::{log_enabled, trace, warn};

use crate::rsrc::{
	Resource, ResourceSet, TypeTag,
	error::DecompressError,
	reader::ByteReader,
	tags,
};

/// Magic constant at the start of every compressed resource body.
pub const COMPRESSED_MAGIC: u32 = 0xA89F_6572;

/// Highest decompressor id that names a system decompressor instead of a
/// `dcmp`/`ncmp` resource.
pub const MAX_SYSTEM_DECOMPRESSOR_ID: i16 = 3;

/// Dispatch flags. These are effect switches only; they do not alter the
/// data model.
pub mod dispatch_flags {
	/// Never attempt decompression; return the raw body.
	pub const DISABLED: u64 = 1 << 0;
	/// Log each dispatch decision at trace level.
	pub const VERBOSE: u64 = 1 << 1;
	/// Do not use `dcmp` resources from the input set.
	pub const SKIP_CUSTOM_DCMP: u64 = 1 << 2;
	/// Do not use `ncmp` resources from the input set.
	pub const SKIP_CUSTOM_NCMP: u64 = 1 << 3;
	/// Do not use the system `dcmp` decompressors.
	pub const SKIP_SYSTEM_DCMP: u64 = 1 << 4;
	/// Do not use the system `ncmp` decompressors.
	pub const SKIP_SYSTEM_NCMP: u64 = 1 << 5;
	/// Only use a decompressor loaded from the input set, never a system one.
	pub const SKIP_INTERNAL: u64 = 1 << 6;
}

/// Version-specific tail of the compressed-resource header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderTail {
	/// Header version 8: references a `dcmp` decompressor.
	V8 {
		/// Fraction of the output buffer usable as working space
		working_buffer_fractional_size: u8,
		/// Extra bytes the decompressor may write past the declared size
		output_extra_bytes: u8,
		/// Decompressor id (`dcmp`)
		dcmp_id: i16,
	},
	/// Header version 9: references an `ncmp` decompressor.
	V9 {
		/// Decompressor id (`ncmp`)
		ncmp_id: i16,
		/// Extra bytes the decompressor may write past the declared size
		output_extra_bytes: u16,
	},
}

/// Parsed compressed-resource header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedHeader {
	/// Declared header size in bytes
	pub header_size: u16,
	/// Header version (8 or 9)
	pub header_version: u8,
	/// Attribute byte
	pub attributes: u8,
	/// Size of the body after decompression
	pub decompressed_size: u32,
	/// Version-specific fields
	pub tail: HeaderTail,
}

impl CompressedHeader {
	/// Parses the header from the start of a compressed resource body.
	pub fn parse(data: &[u8]) -> Result<Self, DecompressError> {
		let mut r = ByteReader::new(data);
		let magic = r.u32()?;
		if magic != COMPRESSED_MAGIC {
			return Err(DecompressError::DecompressionFailed {
				reason: format!("bad compressed-resource magic {magic:08X}"),
			});
		}
		let header_size = r.u16()?;
		let header_version = r.u8()?;
		let attributes = r.u8()?;
		let decompressed_size = r.u32()?;
		let tail = match header_version {
			8 => {
				let working_buffer_fractional_size = r.u8()?;
				let output_extra_bytes = r.u8()?;
				let dcmp_id = r.i16()?;
				let _unused = r.u16()?;
				HeaderTail::V8 {
					working_buffer_fractional_size,
					output_extra_bytes,
					dcmp_id,
				}
			}
			9 => {
				let ncmp_id = r.i16()?;
				let output_extra_bytes = r.u16()?;
				let _script_code = r.u8()?;
				let _font_class = r.u8()?;
				HeaderTail::V9 {
					ncmp_id,
					output_extra_bytes,
				}
			}
			other => {
				return Err(DecompressError::DecompressionFailed {
					reason: format!("unknown compressed-resource header version {other}"),
				});
			}
		};
		Ok(Self {
			header_size,
			header_version,
			attributes,
			decompressed_size,
			tail,
		})
	}

	/// Id of the decompressor this header references.
	pub fn decompressor_id(&self) -> i16 {
		match self.tail {
			HeaderTail::V8 {
				dcmp_id, ..
			} => dcmp_id,
			HeaderTail::V9 {
				ncmp_id, ..
			} => ncmp_id,
		}
	}

	/// Resource type of the referenced decompressor (`dcmp` or `ncmp`).
	pub fn decompressor_type(&self) -> TypeTag {
		match self.tail {
			HeaderTail::V8 {
				..
			} => tags::DCMP,
			HeaderTail::V9 {
				..
			} => tags::NCMP,
		}
	}
}

/// The decompressor code selected for a dispatch.
#[derive(Debug, Clone, Copy)]
pub enum DecompressorCode<'a> {
	/// One of the four decompressors built into classic Mac OS. The executor
	/// is expected to carry its own copies of these.
	System {
		/// `dcmp` or `ncmp`
		kind: TypeTag,
		/// System decompressor index (0 through 3)
		id: i16,
	},
	/// A decompressor loaded from the input set.
	Resource {
		/// `dcmp` or `ncmp`
		kind: TypeTag,
		/// Decompressor resource id
		id: i16,
		/// Raw decompressor resource body
		code: &'a [u8],
	},
}

/// A single decompression request handed to a [`CodeExecutor`].
#[derive(Debug)]
pub struct DecompressRequest<'a> {
	/// Parsed compressed-resource header
	pub header: CompressedHeader,
	/// The decompressor to run
	pub code: DecompressorCode<'a>,
	/// Compressed payload (the body after the header)
	pub input: &'a [u8],
}

/// External collaborator that runs 68K/PPC decompressor code over a guest
/// memory arena. CPU emulation is out of scope for this crate; implementors
/// live elsewhere and are injected per [`ResourceSet`].
pub trait CodeExecutor {
	/// Runs the decompressor and returns exactly
	/// `request.header.decompressed_size` bytes.
	fn run_decompressor(&mut self, request: &DecompressRequest<'_>)
	-> Result<Vec<u8>, DecompressError>;
}

/// Whether a resource carries the compressed flag and a plausible
/// compressed-resource header.
pub fn is_compressed(res: &Resource) -> bool {
	if res.flags & crate::rsrc::flags::COMPRESSED == 0 {
		return false;
	}
	ByteReader::new(&res.data).peek_u32(0).is_ok_and(|magic| magic == COMPRESSED_MAGIC)
}

/// Decompresses a compressed resource body, resolving the decompressor from
/// `set` when the header names a custom one.
///
/// This is the dispatch half of the pipeline; the actual execution happens in
/// `executor`. On success the returned buffer's length equals the header's
/// declared decompressed size.
pub fn decompress<'a>(
	set: &ResourceSet,
	res_type: TypeTag,
	res_id: i16,
	data: &[u8],
	dispatch: u64,
	executor: Option<&mut (dyn CodeExecutor + 'a)>,
) -> Result<Vec<u8>, DecompressError> {
	let header = CompressedHeader::parse(data)?;
	let verbose = dispatch & dispatch_flags::VERBOSE != 0;
	if verbose || log_enabled!(log::Level::Trace) {
		trace!(
			"decompressing {} id {}: header version {}, decompressor id {}, output size {}",
			res_type,
			res_id,
			header.header_version,
			header.decompressor_id(),
			header.decompressed_size
		);
	}

	let kind = header.decompressor_type();
	let id = header.decompressor_id();
	let is_system = (0..=MAX_SYSTEM_DECOMPRESSOR_ID).contains(&id);

	let skip_custom = match kind {
		t if t == tags::DCMP => dispatch & dispatch_flags::SKIP_CUSTOM_DCMP != 0,
		_ => dispatch & dispatch_flags::SKIP_CUSTOM_NCMP != 0,
	};
	let skip_system = match kind {
		t if t == tags::DCMP => dispatch & dispatch_flags::SKIP_SYSTEM_DCMP != 0,
		_ => dispatch & dispatch_flags::SKIP_SYSTEM_NCMP != 0,
	} || dispatch & dispatch_flags::SKIP_INTERNAL != 0;

	// A custom decompressor with the right id takes precedence over the
	// system one, matching the classic Resource Manager search order.
	let code = if !skip_custom && set.exists(kind, id) {
		let dcmp_res = set.peek(kind, id).ok_or(DecompressError::MissingDecompressor {
			kind: if kind == tags::DCMP { "dcmp" } else { "ncmp" },
			id,
		})?;
		DecompressorCode::Resource {
			kind,
			id,
			code: &dcmp_res.data,
		}
	} else if is_system && !skip_system {
		DecompressorCode::System {
			kind,
			id,
		}
	} else {
		return Err(DecompressError::MissingDecompressor {
			kind: if kind == tags::DCMP { "dcmp" } else { "ncmp" },
			id,
		});
	};

	let Some(executor) = executor else {
		return Err(DecompressError::NoExecutor {
			kind: if kind == tags::DCMP { "dcmp" } else { "ncmp" },
			id,
		});
	};

	let payload_start = (header.header_size.max(0x12) as usize).min(data.len());
	let input = &data[payload_start..];
	let request = DecompressRequest {
		header,
		code,
		input,
	};
	let output = executor.run_decompressor(&request)?;
	if output.len() != header.decompressed_size as usize {
		warn!(
			"decompressor for {res_type} id {res_id} produced {} bytes, header declares {}",
			output.len(),
			header.decompressed_size
		);
		return Err(DecompressError::SizeMismatch {
			expected: header.decompressed_size as usize,
			actual: output.len(),
		});
	}
	Ok(output)
}
