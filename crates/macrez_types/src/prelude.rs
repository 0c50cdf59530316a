//! Prelude module for `macrez_types`.
//!
//! This module provides a convenient way to import commonly used types,
//! traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use macrez_types::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("archive.bin")?;
//! let set = parse_auto(&bytes)?;
//! println!("{} resources", set.len());
//! # Ok(())
//! # }
//! ```

#[doc(inline)]
pub use crate::rsrc::{
	Resource,
	ResourceSet,
	TypeTag,

	// Container entry points
	container::{IndexFormat, parse_auto, sniff_format},

	// Frequent decoder outputs
	font::{DecodedFont, Glyph as FontGlyph, renderer::BitmapFontRenderer},
	image::{
		Image, PixelFormat,
		palette::{Color, ColorTableEntry},
	},
	tags,
	text::decode_mac_roman,
};

#[doc(inline)]
pub use crate::mem::MemoryArena;
