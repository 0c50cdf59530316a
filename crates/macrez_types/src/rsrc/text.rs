//! Text, string-list and style resources.
//!
//! All classic text resources are Mac-Roman; bytes at or above 0x80 map
//! through the `MACINTOSH` table and everything below passes through. A
//! `STR ` resource is one Pascal string plus whatever trailing bytes the
//! application stashed after it; `STR#` is a counted sequence of Pascal
//! strings; `TEXT` is raw bytes; `styl` is the style-run table that pairs
//! with a `TEXT` resource of the same id.

use encoding_rs::MACINTOSH;
use serde::Serialize;

use crate::rsrc::{
	error::TextError,
	image::palette::Color,
	reader::ByteReader,
};

/// Decodes Mac-Roman bytes to a Unicode string.
pub fn decode_mac_roman(data: &[u8]) -> String {
	let (text, _, _) = MACINTOSH.decode(data);
	text.into_owned()
}

/// Encodes a Unicode string back to Mac-Roman. Characters outside the
/// repertoire become numeric references, matching the encoder's standard
/// unmappable handling.
pub fn encode_mac_roman(text: &str) -> Vec<u8> {
	let (bytes, _, _) = MACINTOSH.encode(text);
	bytes.into_owned()
}

/// A decoded `STR ` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedString {
	/// The Pascal string, decoded from Mac-Roman
	pub string: String,
	/// Raw bytes following the string, if any
	pub after_data: Vec<u8>,
}

/// Decodes a `STR ` resource: one Pascal string plus trailing bytes.
pub fn decode_str(data: &[u8]) -> Result<DecodedString, TextError> {
	let mut r = ByteReader::new(data);
	let string = decode_mac_roman(r.pstring()?);
	Ok(DecodedString {
		string,
		after_data: r.rest().to_vec(),
	})
}

/// A decoded `STR#` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedStringSequence {
	/// The strings, in stored order
	pub strings: Vec<String>,
	/// Raw bytes following the last string, if any
	pub after_data: Vec<u8>,
}

/// Decodes a `STR#` resource: a 16-bit count of Pascal strings.
pub fn decode_strn(data: &[u8]) -> Result<DecodedStringSequence, TextError> {
	let mut r = ByteReader::new(data);
	let count = r.u16()? as usize;
	let mut strings = Vec::with_capacity(count);
	for _ in 0..count {
		strings.push(decode_mac_roman(r.pstring()?));
	}
	Ok(DecodedStringSequence {
		strings,
		after_data: r.rest().to_vec(),
	})
}

/// Decodes a `TEXT` resource: raw Mac-Roman bytes.
pub fn decode_text(data: &[u8]) -> String {
	decode_mac_roman(data)
}

/// Style flag bits used in `styl` runs.
pub mod style_flags {
	/// Bold face
	pub const BOLD: u8 = 0x01;
	/// Italic face
	pub const ITALIC: u8 = 0x02;
	/// Underlined
	pub const UNDERLINE: u8 = 0x04;
	/// Outlined
	pub const OUTLINE: u8 = 0x08;
	/// Shadowed
	pub const SHADOW: u8 = 0x10;
	/// Condensed spacing
	pub const CONDENSED: u8 = 0x20;
	/// Extended spacing
	pub const EXTENDED: u8 = 0x40;
}

/// One style run from a `styl` resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleRun {
	/// First text offset this run applies to
	pub start_offset: u32,
	/// Line height in pixels
	pub line_height: u16,
	/// Font ascent in pixels
	pub font_ascent: u16,
	/// Font family id
	pub font_id: u16,
	/// Style flag bits (see [`style_flags`])
	pub style_flags: u8,
	/// Point size
	pub font_size: u16,
	/// Text color
	pub color: Color,
}

/// Unicode text paired with its style-run table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledText {
	/// The decoded text
	pub text: String,
	/// Style runs, in ascending start-offset order. Offsets index the
	/// original Mac-Roman bytes.
	pub runs: Vec<StyleRun>,
}

/// Decodes a `styl` resource into its run table.
pub fn decode_styl(data: &[u8]) -> Result<Vec<StyleRun>, TextError> {
	let mut r = ByteReader::new(data);
	let count = r.u16()? as usize;
	let mut runs = Vec::with_capacity(count);
	for _ in 0..count {
		let start_offset = r.u32()?;
		let line_height = r.u16()?;
		let font_ascent = r.u16()?;
		let font_id = r.u16()?;
		let style = r.u8()?;
		let _pad = r.u8()?;
		let font_size = r.u16()?;
		let red = r.u16()?;
		let green = r.u16()?;
		let blue = r.u16()?;
		runs.push(StyleRun {
			start_offset,
			line_height,
			font_ascent,
			font_id,
			style_flags: style,
			font_size,
			color: Color::rgb(red, green, blue),
		});
	}
	Ok(runs)
}

/// Pairs a `TEXT` body with its `styl` run table.
pub fn decode_styled_text(text_data: &[u8], styl_data: &[u8]) -> Result<StyledText, TextError> {
	let runs = decode_styl(styl_data)?;
	for run in &runs {
		if run.start_offset as usize > text_data.len() {
			return Err(TextError::MalformedResource {
				kind: "style run past end of text",
				context: format!(
					"run starts at {}, text is {} bytes",
					run.start_offset,
					text_data.len()
				),
			});
		}
	}
	Ok(StyledText {
		text: decode_mac_roman(text_data),
		runs,
	})
}
