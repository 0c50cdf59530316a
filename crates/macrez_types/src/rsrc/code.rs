//! 68K and PowerPC executable-resource decoders.
//!
//! These decoders stop at the envelope: headers, jump tables, entry labels
//! and section tables are parsed, the machine code itself is handed to the
//! caller (typically a CPU-emulator collaborator) as raw bytes.

use serde::Serialize;

use crate::rsrc::{TypeTag, error::CodeError, reader::ByteReader, text::decode_mac_roman};

/// One jump-table entry from `CODE` 0. Unused slots stay as zero entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JumpTableEntry {
	/// Referenced `CODE` resource id (zero in an unused slot)
	pub code_resource_id: i16,
	/// Offset from the end of that resource's header
	pub offset: u16,
}

/// Decoded `CODE` 0: the jump-table root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedCode0 {
	/// Size of the application globals above A5
	pub above_a5_size: u32,
	/// Size of the application globals below A5
	pub below_a5_size: u32,
	/// Jump-table entries in stored order
	pub jump_table: Vec<JumpTableEntry>,
}

/// Decodes `CODE` id 0.
pub fn decode_code_0(data: &[u8]) -> Result<DecodedCode0, CodeError> {
	let mut r = ByteReader::new(data);
	let above_a5_size = r.u32()?;
	let below_a5_size = r.u32()?;
	let jump_table_size = r.u32()? as usize;
	let _jump_table_offset = r.u32()?;

	if jump_table_size % 8 != 0 {
		return Err(CodeError::MalformedResource {
			kind: "jump table size not a multiple of 8",
			context: format!("{jump_table_size} bytes"),
		});
	}

	let mut jump_table = Vec::with_capacity(jump_table_size / 8);
	for _ in 0..jump_table_size / 8 {
		// Each used entry is `offset, PUSH #id, TRAP _LoadSeg`
		let offset = r.u16()?;
		let push_opcode = r.u16()?;
		let id = r.i16()?;
		let trap_opcode = r.u16()?;
		if push_opcode == 0 && id == 0 && trap_opcode == 0 && offset == 0 {
			jump_table.push(JumpTableEntry {
				code_resource_id: 0,
				offset: 0,
			});
			continue;
		}
		if push_opcode != 0x3F3C || trap_opcode != 0xA9F0 {
			return Err(CodeError::MalformedResource {
				kind: "unexpected jump table instructions",
				context: format!("push {push_opcode:04X}, trap {trap_opcode:04X}"),
			});
		}
		jump_table.push(JumpTableEntry {
			code_resource_id: id,
			offset,
		});
	}
	Ok(DecodedCode0 {
		above_a5_size,
		below_a5_size,
		jump_table,
	})
}

/// Decoded `CODE` with id > 0: near- or far-model header plus code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedCode {
	/// First entry offset; negative for far-model resources
	pub entry_offset: i32,
	/// Far-model fields, absent for near-model resources
	pub far_header: Option<FarModelHeader>,
	/// Raw machine code
	pub code: Vec<u8>,
}

/// The 32-byte far-model `CODE` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FarModelHeader {
	/// A5 offset of the near-model entries
	pub near_entry_start_a5_offset: u32,
	/// Number of near-model entries
	pub near_entry_count: u32,
	/// A5 offset of the far-model entries
	pub far_entry_start_a5_offset: u32,
	/// Number of far-model entries
	pub far_entry_count: u32,
	/// Offset of the A5 relocation data
	pub a5_relocation_data_offset: u32,
	/// Assumed A5 value
	pub a5: u32,
	/// Offset of the PC relocation data
	pub pc_relocation_data_offset: u32,
	/// Assumed load address
	pub load_address: u32,
}

/// Decodes a `CODE` resource with id > 0.
pub fn decode_code(data: &[u8]) -> Result<DecodedCode, CodeError> {
	let mut r = ByteReader::new(data);
	let first_word = r.peek_i16(0)?;

	if first_word >= 0 {
		// Near model: 4-byte header
		let entry_offset = i32::from(r.i16()?);
		let _unused = r.u16()?;
		return Ok(DecodedCode {
			entry_offset,
			far_header: None,
			code: r.rest().to_vec(),
		});
	}

	// Far model: the first word is 0xFFFF and the header is 32 bytes
	let entry_offset = i32::from(r.i16()?);
	let _unused = r.u16()?;
	let far_header = FarModelHeader {
		near_entry_start_a5_offset: r.u32()?,
		near_entry_count: r.u32()?,
		far_entry_start_a5_offset: r.u32()?,
		far_entry_count: r.u32()?,
		a5_relocation_data_offset: r.u32()?,
		a5: r.u32()?,
		pc_relocation_data_offset: r.u32()?,
		load_address: r.u32()?,
	};
	Ok(DecodedCode {
		entry_offset,
		far_header: Some(far_header),
		code: r.rest().to_vec(),
	})
}

/// Decoded `DRVR` device driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedDriver {
	/// Driver flag word
	pub flags: u16,
	/// Periodic-task delay in ticks
	pub delay: u16,
	/// Desk-accessory event mask
	pub event_mask: u16,
	/// Desk-accessory menu id
	pub menu_id: i16,
	/// Entry label offsets; -1 means the entry point is absent
	pub open_label: i32,
	/// See `open_label`
	pub prime_label: i32,
	/// See `open_label`
	pub control_label: i32,
	/// See `open_label`
	pub status_label: i32,
	/// See `open_label`
	pub close_label: i32,
	/// Driver name
	pub name: String,
	/// Raw machine code
	pub code: Vec<u8>,
}

/// `DRVR` flag bits.
pub mod driver_flags {
	/// Driver responds to Read calls
	pub const ENABLE_READ: u16 = 0x0100;
	/// Driver responds to Write calls
	pub const ENABLE_WRITE: u16 = 0x0200;
	/// Driver responds to Control calls
	pub const ENABLE_CONTROL: u16 = 0x0400;
	/// Driver responds to Status calls
	pub const ENABLE_STATUS: u16 = 0x0800;
	/// Driver wants a goodbye call before heap reinit
	pub const NEED_GOODBYE: u16 = 0x1000;
	/// Driver needs periodic time
	pub const NEED_TIME: u16 = 0x2000;
	/// Driver must be locked in memory
	pub const NEED_LOCK: u16 = 0x4000;
}

/// Decodes a `DRVR` resource.
pub fn decode_drvr(data: &[u8]) -> Result<DecodedDriver, CodeError> {
	let mut r = ByteReader::new(data);
	let flags = r.u16()?;
	let delay = r.u16()?;
	let event_mask = r.u16()?;
	let menu_id = r.i16()?;
	let open_offset = r.u16()?;
	let prime_offset = r.u16()?;
	let control_offset = r.u16()?;
	let status_offset = r.u16()?;
	let close_offset = r.u16()?;
	let name = decode_mac_roman(r.pstring()?);

	// Code starts at the next even offset after the name
	if r.position() % 2 != 0 {
		r.skip(1)?;
	}
	let code_start = r.position();
	let code = r.rest().to_vec();

	let label = |offset: u16| -> i32 {
		if offset == 0 || (offset as usize) < code_start {
			-1
		} else {
			i32::from(offset) - code_start as i32
		}
	};

	Ok(DecodedDriver {
		flags,
		delay,
		event_mask,
		menu_id,
		open_label: label(open_offset),
		prime_label: label(prime_offset),
		control_label: label(control_offset),
		status_label: label(status_offset),
		close_label: label(close_offset),
		name,
		code,
	})
}

/// Decoded `dcmp` decompressor resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedDecompressor {
	/// Offset of the init entry point within the code
	pub init_label: i32,
	/// Offset of the decompress entry point within the code
	pub decompress_label: i32,
	/// Offset of the exit entry point within the code
	pub exit_label: i32,
	/// PC bias to apply when relocating
	pub pc_offset: u32,
	/// Raw machine code
	pub code: Vec<u8>,
}

/// Decodes a `dcmp` resource: three entry-point words, then code.
pub fn decode_dcmp(data: &[u8]) -> Result<DecodedDecompressor, CodeError> {
	let mut r = ByteReader::new(data);
	let init = r.u16()?;
	let decompress = r.u16()?;
	let exit = r.u16()?;
	let pc_offset = r.position() as u32;
	let code = r.rest().to_vec();

	let label = |offset: u16| -> i32 {
		if (offset as usize) < pc_offset as usize || offset as usize > data.len() {
			-1
		} else {
			i32::from(offset) - pc_offset as i32
		}
	};
	Ok(DecodedDecompressor {
		init_label: label(init),
		decompress_label: label(decompress),
		exit_label: label(exit),
		pc_offset,
		code,
	})
}

/// PEFF container signature tags.
const PEFF_TAG1: u32 = u32::from_be_bytes(*b"Joy!");
const PEFF_TAG2: u32 = u32::from_be_bytes(*b"peff");

/// Section kinds defined by the PEFF specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum PeffSectionKind {
	Code = 0,
	UnpackedData = 1,
	PatternInitializedData = 2,
	Constant = 3,
	Loader = 4,
	Debug = 5,
	ExecutableData = 6,
	Exception = 7,
	Traceback = 8,
}

impl PeffSectionKind {
	fn from_u8(value: u8) -> Option<Self> {
		match value {
			0 => Some(Self::Code),
			1 => Some(Self::UnpackedData),
			2 => Some(Self::PatternInitializedData),
			3 => Some(Self::Constant),
			4 => Some(Self::Loader),
			5 => Some(Self::Debug),
			6 => Some(Self::ExecutableData),
			7 => Some(Self::Exception),
			8 => Some(Self::Traceback),
			_ => None,
		}
	}
}

/// One PEFF section: header fields plus the raw container bytes it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeffSection {
	/// Offset of the section name in the loader string table (-1 = unnamed)
	pub name_offset: i32,
	/// Preferred load address
	pub default_address: u32,
	/// Total size in memory
	pub total_size: u32,
	/// Initialized size in memory
	pub unpacked_size: u32,
	/// Size in the container
	pub packed_size: u32,
	/// Section kind
	pub kind: PeffSectionKind,
	/// Sharing level
	pub share_kind: u8,
	/// Log2 alignment
	pub alignment: u8,
	/// Raw section bytes from the container
	pub data: Vec<u8>,
}

/// A decoded PEFF (PowerPC preferred executable format) container envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedPeff {
	/// Architecture tag (`pwpc` or `m68k`)
	pub architecture: TypeTag,
	/// Container format version
	pub format_version: u32,
	/// Creation date (Mac epoch seconds)
	pub date_stamp: u32,
	/// Old definition version
	pub old_def_version: u32,
	/// Old implementation version
	pub old_imp_version: u32,
	/// Current version
	pub current_version: u32,
	/// Sections in container order
	pub sections: Vec<PeffSection>,
}

/// Decodes a PEFF container.
pub fn decode_peff(data: &[u8]) -> Result<DecodedPeff, CodeError> {
	let mut r = ByteReader::new(data);
	let tag1 = r.u32()?;
	if tag1 != PEFF_TAG1 {
		return Err(CodeError::BadSignature {
			expected: PEFF_TAG1,
			found: tag1,
			offset: 0,
		});
	}
	let tag2 = r.u32()?;
	if tag2 != PEFF_TAG2 {
		return Err(CodeError::BadSignature {
			expected: PEFF_TAG2,
			found: tag2,
			offset: 4,
		});
	}
	let architecture = TypeTag(r.u32()?);
	let format_version = r.u32()?;
	if format_version != 1 {
		return Err(CodeError::UnsupportedVersion {
			format: "PEFF",
			version: format_version,
		});
	}
	let date_stamp = r.u32()?;
	let old_def_version = r.u32()?;
	let old_imp_version = r.u32()?;
	let current_version = r.u32()?;
	let section_count = r.u16()?;
	let _instantiated_section_count = r.u16()?;
	let _reserved = r.u32()?;

	let mut sections = Vec::with_capacity(section_count as usize);
	for index in 0..section_count {
		let name_offset = r.i32()?;
		let default_address = r.u32()?;
		let total_size = r.u32()?;
		let unpacked_size = r.u32()?;
		let packed_size = r.u32()?;
		let container_offset = r.u32()? as usize;
		let kind_raw = r.u8()?;
		let share_kind = r.u8()?;
		let alignment = r.u8()?;
		let _reserved = r.u8()?;

		let kind = PeffSectionKind::from_u8(kind_raw).ok_or(CodeError::MalformedResource {
			kind: "unknown PEFF section kind",
			context: format!("section {index}: kind {kind_raw}"),
		})?;
		let section_data = r.peek(container_offset, packed_size as usize)?;
		sections.push(PeffSection {
			name_offset,
			default_address,
			total_size,
			unpacked_size,
			packed_size,
			kind,
			share_kind,
			alignment,
			data: section_data.to_vec(),
		});
	}
	Ok(DecodedPeff {
		architecture,
		format_version,
		date_stamp,
		old_def_version,
		old_imp_version,
		current_version,
		sections,
	})
}

/// A PEFF prefixed by an opaque driver header (`expt` and `nsrd`
/// resources).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPeffDriver {
	/// The opaque header preceding the container
	pub header: Vec<u8>,
	/// The embedded PEFF
	pub peff: DecodedPeff,
}

/// Decodes an `expt`/`nsrd` resource by scanning for the embedded PEFF.
pub fn decode_peff_driver(data: &[u8]) -> Result<DecodedPeffDriver, CodeError> {
	let needle = PEFF_TAG1.to_be_bytes();
	let start = data
		.windows(4)
		.position(|w| w == needle)
		.ok_or(CodeError::MalformedResource {
			kind: "no embedded PEFF",
			context: "Joy! tag not found".to_string(),
		})?;
	Ok(DecodedPeffDriver {
		header: data[..start].to_vec(),
		peff: decode_peff(&data[start..])?,
	})
}
