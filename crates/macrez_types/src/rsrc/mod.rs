//! Resource container and decoder support.
//!
//! The pipeline: a byte stream goes through one of the [`container`] parsers
//! (chosen by magic sniffing) and becomes a [`ResourceSet`] of raw typed
//! resources. Individual resources are then handed to the per-type decoders
//! ([`image`], [`font`], [`text`], [`code`], [`sound`], [`meta`],
//! [`template`]), which are pure functions over bytes plus an optional
//! set-backed context for cross-resource dependencies (cluts, masks).

pub mod code;
pub mod compress;
pub mod container;
pub mod error;
pub mod font;
pub mod image;
pub mod meta;
pub mod reader;
pub mod set;
pub mod sound;
pub mod template;
pub mod text;

use std::fmt;

use serde::Serialize;

pub use set::{Resource, ResourceSet};

/// A 32-bit resource type tag: four packed bytes read as an ordered
/// four-character label (`'PICT'`, `'STR '`, ...).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeTag(pub u32);

impl TypeTag {
	/// Builds a tag from its four label bytes.
	pub const fn new(bytes: [u8; 4]) -> Self {
		Self(u32::from_be_bytes(bytes))
	}

	/// The four label bytes in stream order.
	pub const fn bytes(self) -> [u8; 4] {
		self.0.to_be_bytes()
	}

	/// The label with non-printable bytes replaced, for display purposes.
	pub fn to_display_string(self) -> String {
		self.bytes()
			.iter()
			.map(|&b| {
				if (0x20..0x7F).contains(&b) {
					b as char
				} else {
					'.'
				}
			})
			.collect()
	}
}

impl fmt::Display for TypeTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_display_string())
	}
}

impl fmt::Debug for TypeTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TypeTag({:08X} '{}')", self.0, self.to_display_string())
	}
}

impl Serialize for TypeTag {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_display_string())
	}
}

impl From<u32> for TypeTag {
	fn from(value: u32) -> Self {
		Self(value)
	}
}

impl From<[u8; 4]> for TypeTag {
	fn from(value: [u8; 4]) -> Self {
		Self::new(value)
	}
}

/// Well-known resource type tags.
pub mod tags {
	use super::TypeTag;

	macro_rules! tag {
		($name:ident, $value:literal) => {
			/// Type tag constant.
			pub const $name: TypeTag = TypeTag::new(*$value);
		};
	}

	tag!(ACTB, b"actb");
	tag!(CCTB, b"cctb");
	tag!(CFRG, b"cfrg");
	tag!(CICN, b"cicn");
	tag!(CLUT, b"clut");
	tag!(CMID, b"cmid");
	tag!(CODE, b"CODE");
	tag!(CRSR, b"crsr");
	tag!(CSND, b"csnd");
	tag!(CURS, b"CURS");
	tag!(DCMP, b"dcmp");
	tag!(DCTB, b"dctb");
	tag!(DRVR, b"DRVR");
	tag!(ECMI, b"ecmi");
	tag!(EMID, b"emid");
	tag!(ESND_LOWER, b"esnd");
	tag!(ESND_UPPER, b"ESnd");
	tag!(EXPT, b"expt");
	tag!(FCTB, b"fctb");
	tag!(FINF, b"finf");
	tag!(FONT, b"FONT");
	tag!(ICL4, b"icl4");
	tag!(ICL8, b"icl8");
	tag!(ICMN, b"icm#");
	tag!(ICM4, b"icm4");
	tag!(ICM8, b"icm8");
	tag!(ICNN, b"ICN#");
	tag!(ICON, b"ICON");
	tag!(ICSN, b"ics#");
	tag!(ICS4, b"ics4");
	tag!(ICS8, b"ics8");
	tag!(INST, b"INST");
	tag!(KCSN, b"kcs#");
	tag!(KCS4, b"kcs4");
	tag!(KCS8, b"kcs8");
	tag!(NCMP, b"ncmp");
	tag!(NFNT, b"NFNT");
	tag!(NSRD, b"nsrd");
	tag!(PAT, b"PAT ");
	tag!(PATN, b"PAT#");
	tag!(PICT, b"PICT");
	tag!(PLTT, b"pltt");
	tag!(PPAT, b"ppat");
	tag!(PPTN, b"ppt#");
	tag!(ROVN, b"ROv#");
	tag!(SICN, b"SICN");
	tag!(SIZE, b"SIZE");
	tag!(SMSD, b"SMSD");
	tag!(SND, b"snd ");
	tag!(SONG, b"SONG");
	tag!(STR, b"STR ");
	tag!(STRN, b"STR#");
	tag!(STYL, b"styl");
	tag!(TEXT, b"TEXT");
	tag!(TMPL, b"TMPL");
	tag!(TUNE, b"Tune");
	tag!(VERS, b"vers");
	tag!(WCTB, b"wctb");
}

/// Resource attribute flags.
///
/// The low byte carries the classic Mac OS resource attributes as stored in
/// the container. The high byte is synthesized by this crate to track the
/// lazy-decompression state of each resource.
pub mod flags {
	/// Resource lives in the system heap.
	pub const SYSTEM_HEAP: u16 = 0x0040;
	/// Resource may be purged from memory.
	pub const PURGEABLE: u16 = 0x0020;
	/// Resource may not be moved by the memory manager.
	pub const LOCKED: u16 = 0x0010;
	/// Resource may not be modified.
	pub const PROTECTED: u16 = 0x0008;
	/// Resource is loaded when its file is opened.
	pub const PRELOAD: u16 = 0x0004;
	/// Resource has been modified in memory (only meaningful while loaded).
	pub const DIRTY: u16 = 0x0002;
	/// Resource body is compressed.
	pub const COMPRESSED: u16 = 0x0001;

	/// Synthesized: the body was decompressed in place.
	pub const DECOMPRESSED: u16 = 0x0100;
	/// Synthesized: decompression was attempted and failed.
	pub const DECOMPRESSION_FAILED: u16 = 0x0200;
}
