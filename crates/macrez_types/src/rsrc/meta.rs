//! Application metadata resources: `SIZE`, `vers`, `cfrg`, `ROv#`.

use serde::Serialize;

use crate::rsrc::{TypeTag, error::CodeError, reader::ByteReader, text::decode_mac_roman};

/// Decoded `SIZE` resource: thirteen Process Manager flags plus the two
/// partition sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct DecodedSize {
	pub save_screen: bool,
	pub accept_suspend_events: bool,
	pub disable_option: bool,
	pub can_background: bool,
	pub activate_on_fg_switch: bool,
	pub only_background: bool,
	pub get_front_clicks: bool,
	pub accept_died_events: bool,
	pub clean_addressing: bool,
	pub high_level_event_aware: bool,
	pub local_and_remote_high_level_events: bool,
	pub stationery_aware: bool,
	pub use_text_edit_services: bool,
	/// Preferred partition size in bytes
	pub size: u32,
	/// Minimum partition size in bytes
	pub min_size: u32,
}

/// Decodes a `SIZE` resource.
pub fn decode_size(data: &[u8]) -> Result<DecodedSize, CodeError> {
	let mut r = ByteReader::new(data);
	let flags = r.u16()?;
	let size = r.u32()?;
	let min_size = r.u32()?;
	let bit = |n: u16| flags & (1 << n) != 0;
	Ok(DecodedSize {
		save_screen: bit(15),
		accept_suspend_events: bit(14),
		disable_option: bit(13),
		can_background: bit(12),
		activate_on_fg_switch: bit(11),
		only_background: bit(10),
		get_front_clicks: bit(9),
		accept_died_events: bit(8),
		clean_addressing: bit(7),
		high_level_event_aware: bit(6),
		local_and_remote_high_level_events: bit(5),
		stationery_aware: bit(4),
		use_text_edit_services: bit(3),
		size,
		min_size,
	})
}

/// Decoded `vers` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedVersion {
	/// Major version (binary-coded decimal)
	pub major_version: u8,
	/// Minor and bugfix version nibbles
	pub minor_version: u8,
	/// Development stage byte (0x20 dev, 0x40 alpha, 0x60 beta, 0x80 final)
	pub development_stage: u8,
	/// Prerelease revision level
	pub prerelease_version_level: u8,
	/// Localization region code
	pub region_code: u16,
	/// Short version string
	pub version_number: String,
	/// Long version string / get-info message
	pub version_message: String,
}

/// Decodes a `vers` resource.
pub fn decode_vers(data: &[u8]) -> Result<DecodedVersion, CodeError> {
	let mut r = ByteReader::new(data);
	let major_version = r.u8()?;
	let minor_version = r.u8()?;
	let development_stage = r.u8()?;
	let prerelease_version_level = r.u8()?;
	let region_code = r.u16()?;
	let version_number = decode_mac_roman(r.pstring()?);
	let version_message = decode_mac_roman(r.pstring()?);
	Ok(DecodedVersion {
		major_version,
		minor_version,
		development_stage,
		prerelease_version_level,
		region_code,
		version_number,
		version_message,
	})
}

/// Code-fragment usage declared by a `cfrg` member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum FragmentUsage {
	ImportLibrary,
	Application,
	DropInAddition,
	StubLibrary,
	WeakStubLibrary,
}

/// Where a `cfrg` member's container lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum FragmentLocation {
	Memory,
	DataFork,
	Resource,
	ByteStream,
	NamedFragment,
}

/// One `cfrg` member entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeFragmentEntry {
	/// Architecture tag (`pwpc`, `m68k`)
	pub architecture: TypeTag,
	/// Update level
	pub update_level: u8,
	/// Current fragment version
	pub current_version: u32,
	/// Oldest compatible definition version
	pub old_def_version: u32,
	/// Application stack size
	pub app_stack_size: u32,
	/// Application library subdirectory id / library flags
	pub app_subdir_id: u16,
	/// Declared usage
	pub usage: FragmentUsage,
	/// Container location
	pub location: FragmentLocation,
	/// Container offset
	pub offset: u32,
	/// Container length (zero = the whole space)
	pub length: u32,
	/// Fragment name
	pub name: String,
}

/// Decodes a `cfrg` resource into its member list.
pub fn decode_cfrg(data: &[u8]) -> Result<Vec<CodeFragmentEntry>, CodeError> {
	let mut r = ByteReader::new(data);
	let _reserved_a = r.u32()?;
	let _reserved_b = r.u32()?;
	let _reserved_c = r.u16()?;
	let version = r.u16()?;
	if version != 1 {
		return Err(CodeError::UnsupportedVersion {
			format: "cfrg",
			version: u32::from(version),
		});
	}
	r.skip(16)?; // four reserved longs
	let _reserved_h = r.u16()?;
	let member_count = r.u16()?;

	let mut entries = Vec::with_capacity(member_count as usize);
	for index in 0..member_count {
		let member_start = r.position();
		let architecture = TypeTag(r.u32()?);
		let _reserved = r.u16()?;
		let _reserved = r.u8()?;
		let update_level = r.u8()?;
		let current_version = r.u32()?;
		let old_def_version = r.u32()?;
		let app_stack_size = r.u32()?;
		let app_subdir_id = r.u16()?;
		let usage_raw = r.u8()?;
		let where_raw = r.u8()?;
		let offset = r.u32()?;
		let length = r.u32()?;
		let _space_id = r.u32()?;
		let _fork_instance = r.u16()?;
		let member_size = r.u16()? as usize;
		let name = decode_mac_roman(r.pstring()?);

		let usage = match usage_raw {
			0 => FragmentUsage::ImportLibrary,
			1 => FragmentUsage::Application,
			2 => FragmentUsage::DropInAddition,
			3 => FragmentUsage::StubLibrary,
			4 => FragmentUsage::WeakStubLibrary,
			other => {
				return Err(CodeError::MalformedResource {
					kind: "unknown fragment usage",
					context: format!("member {index}: usage {other}"),
				});
			}
		};
		let location = match where_raw {
			0 => FragmentLocation::Memory,
			1 => FragmentLocation::DataFork,
			2 => FragmentLocation::Resource,
			3 => FragmentLocation::ByteStream,
			4 => FragmentLocation::NamedFragment,
			other => {
				return Err(CodeError::MalformedResource {
					kind: "unknown fragment location",
					context: format!("member {index}: where {other}"),
				});
			}
		};

		// Members are padded out to their declared size
		if member_size < r.position() - member_start {
			return Err(CodeError::MalformedResource {
				kind: "member size too small",
				context: format!("member {index}: {member_size} bytes"),
			});
		}
		r.seek(member_start + member_size)?;

		entries.push(CodeFragmentEntry {
			architecture,
			update_level,
			current_version,
			old_def_version,
			app_stack_size,
			app_subdir_id,
			usage,
			location,
			offset,
			length,
			name,
		});
	}
	Ok(entries)
}

/// One ROM override entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RomOverride {
	/// Overridden resource type
	pub type_tag: TypeTag,
	/// Overridden resource id
	pub id: i16,
}

/// Decoded `ROv#` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedRomOverrides {
	/// ROM version this override list applies to
	pub rom_version: u16,
	/// Overridden resources
	pub overrides: Vec<RomOverride>,
}

/// Decodes a `ROv#` resource.
pub fn decode_rovn(data: &[u8]) -> Result<DecodedRomOverrides, CodeError> {
	let mut r = ByteReader::new(data);
	let rom_version = r.u16()?;
	let count = r.u16()? as usize;
	let mut overrides = Vec::with_capacity(count);
	for _ in 0..count {
		overrides.push(RomOverride {
			type_tag: TypeTag(r.u32()?),
			id: r.i16()?,
		});
	}
	Ok(DecodedRomOverrides {
		rom_version,
		overrides,
	})
}

/// Human-readable name for a `vers` region code.
pub fn name_for_region_code(code: u16) -> Option<&'static str> {
	Some(match code {
		0 => "United States",
		1 => "France",
		2 => "Great Britain",
		3 => "Germany",
		4 => "Italy",
		5 => "Netherlands",
		6 => "Belgium/Luxembourg (French)",
		7 => "Sweden",
		9 => "Denmark",
		10 => "Portugal",
		11 => "French Canada",
		12 => "Norway",
		13 => "Israel",
		14 => "Japan",
		15 => "Australia",
		16 => "Arabia",
		17 => "Finland",
		18 => "Switzerland (French)",
		19 => "Switzerland (German)",
		20 => "Greece",
		21 => "Iceland",
		24 => "Turkey",
		25 => "Yugoslavia",
		33 => "India",
		34 => "Pakistan",
		41 => "Lithuania",
		42 => "Poland",
		43 => "Hungary",
		44 => "Estonia",
		45 => "Latvia",
		46 => "Lapland",
		47 => "Faeroe Islands",
		48 => "Iran",
		49 => "Russia",
		50 => "Ireland",
		51 => "Korea",
		52 => "China",
		53 => "Taiwan",
		54 => "Thailand",
		_ => return None,
	})
}

/// Human-readable name for a classic Font Manager font id.
pub fn name_for_font_id(font_id: u16) -> Option<&'static str> {
	Some(match font_id {
		0 => "Chicago",
		1 => "(application font)",
		2 => "New York",
		3 => "Geneva",
		4 => "Monaco",
		5 => "Venice",
		6 => "London",
		7 => "Athens",
		8 => "San Francisco",
		9 => "Toronto",
		11 => "Cairo",
		12 => "Los Angeles",
		13 => "Zapf Dingbats",
		14 => "Bookman",
		16 => "Palatino",
		18 => "Zapf Chancery",
		20 => "Times",
		21 => "Helvetica",
		22 => "Courier",
		23 => "Symbol",
		24 => "Taliesin",
		_ => return None,
	})
}
