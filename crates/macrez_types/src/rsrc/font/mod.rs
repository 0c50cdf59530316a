//! `FONT`/`NFNT` bitmap font strikes.
//!
//! Strike layout:
//!
//! | Field | Description |
//! |---|---|
//! | header (26 bytes) | font type, char range, metrics, table offsets |
//! | glyph bitmap | one long row group: `rowWords * 16` bits wide, `fRectHeight` tall, every glyph side by side |
//! | location table | `last - first + 3` 16-bit bit offsets into the strike |
//! | offset/width table | same length: signed pen offset in the high byte, advance width in the low byte, `0xFFFF` = missing |
//!
//! Two historical quirks matter: the `nDescent` field, when negative, is
//! really the high word of a 32-bit offset/width-table location; and the
//! table location counts 16-bit words from its own field position, not
//! bytes from the start of the resource. Color strikes (fontType bit 0x80)
//! use 2, 4 or 8 bits per strike pixel and append a color table after the
//! glyph tables.

pub mod renderer;

use crate::rsrc::{
	error::FontError,
	image::{
		Image,
		palette::{self, ColorTableEntry, parse_color_table},
	},
	reader::ByteReader,
};

mod font_type_flags {
	pub const HAS_IMAGE_HEIGHT_TABLE: u16 = 0x0001;
	pub const HAS_GLYPH_WIDTH_TABLE: u16 = 0x0002;
	pub const BIT_DEPTH_SHIFT: u16 = 2;
	pub const BIT_DEPTH_MASK: u16 = 0x000C;
	pub const IS_DYNAMIC: u16 = 0x0010;
	pub const HAS_NON_BLACK_COLORS: u16 = 0x0020;
	pub const HAS_COLOR_TABLE: u16 = 0x0080;
	pub const FIXED_WIDTH: u16 = 0x2000;
}

/// Byte offset of the offset/width table location field within the strike.
const OW_TABLE_FIELD_OFFSET: usize = 16;

/// Metrics and strike placement for one encoded character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
	/// Character code (-1 for the missing glyph)
	pub ch: i32,
	/// Leftmost strike column of this glyph's bitmap
	pub bitmap_offset: u16,
	/// Width of the glyph's strike slice in pixels
	pub bitmap_width: u16,
	/// Signed pen offset applied before drawing
	pub pen_offset: i8,
	/// Pen advance after drawing (may differ from the bitmap width)
	pub advance: u8,
}

/// A decoded font strike.
#[derive(Debug, Clone)]
pub struct DecodedFont {
	/// Bits per strike pixel: 1, 2, 4 or 8
	pub source_bit_depth: u8,
	/// Color table for color strikes (empty for monochrome)
	pub color_table: Vec<ColorTableEntry>,
	/// Glyph widths vary at runtime
	pub is_dynamic: bool,
	/// Strike colors other than black are meaningful
	pub has_non_black_colors: bool,
	/// All glyphs advance by the same width
	pub fixed_width: bool,
	/// First encoded character
	pub first_char: u16,
	/// Last encoded character
	pub last_char: u16,
	/// Widest glyph advance
	pub max_width: u16,
	/// Most negative pen offset
	pub max_kerning: i16,
	/// Glyph rect width
	pub rect_width: u16,
	/// Glyph rect height (strike height)
	pub rect_height: u16,
	/// Pixels above the baseline
	pub max_ascent: i16,
	/// Pixels below the baseline
	pub max_descent: i16,
	/// Extra pixels between lines
	pub leading: i16,
	/// The shared strike bitmap: all glyphs concatenated horizontally.
	/// Stored paletted; a zero pixel is background, anything else is ink.
	pub full_bitmap: Image,
	/// Record used for characters outside the font
	pub missing_glyph: Glyph,
	glyphs: Vec<Option<Glyph>>,
}

impl DecodedFont {
	/// The glyph for a character, falling back to the missing-glyph record
	/// for anything the font does not encode.
	pub fn glyph_for_char(&self, ch: char) -> &Glyph {
		let code = ch as u32;
		if code < u32::from(self.first_char) || code > u32::from(self.last_char) {
			return &self.missing_glyph;
		}
		self.glyphs[(code - u32::from(self.first_char)) as usize]
			.as_ref()
			.unwrap_or(&self.missing_glyph)
	}

	/// Whether the strike pixel at `(x, y)` is ink.
	pub fn strike_pixel(&self, x: usize, y: usize) -> bool {
		if x >= self.full_bitmap.width() || y >= self.full_bitmap.height() {
			return false;
		}
		self.full_bitmap.pixels()[y * self.full_bitmap.width() + x] != 0
	}

	/// Extracts one glyph's slice of the strike as an image.
	pub fn glyph_image(&self, glyph: &Glyph) -> Image {
		let width = glyph.bitmap_width as usize;
		let height = self.full_bitmap.height();
		let strike_width = self.full_bitmap.width();
		let mut indices = vec![0u8; width * height];
		for y in 0..height {
			for x in 0..width {
				let sx = glyph.bitmap_offset as usize + x;
				if sx < strike_width {
					indices[y * width + x] = self.full_bitmap.pixels()[y * strike_width + sx];
				}
			}
		}
		let palette = self
			.full_bitmap
			.palette()
			.map(<[ColorTableEntry]>::to_vec)
			.unwrap_or_default();
		Image::new_paletted(width, height, indices, palette)
			.unwrap_or_else(|_| Image::new(0, 0, crate::rsrc::image::PixelFormat::Paletted8))
	}
}

/// Decodes a `FONT` or `NFNT` strike.
pub fn decode_font(data: &[u8]) -> Result<DecodedFont, FontError> {
	let mut r = ByteReader::new(data);

	let font_type = r.u16()?;
	let first_char = r.u16()?;
	let last_char = r.u16()?;
	let max_width = r.u16()?;
	let max_kerning = r.i16()?;
	let neg_descent = r.i16()?;
	let rect_width = r.u16()?;
	let rect_height = r.u16()?;
	let ow_table_offset_low = r.u16()?;
	let max_ascent = r.i16()?;
	let max_descent = r.i16()?;
	let leading = r.i16()?;
	let row_words = r.u16()?;

	if last_char < first_char {
		return Err(FontError::MalformedResource {
			kind: "inverted character range",
			context: format!("first {first_char:#X}, last {last_char:#X}"),
		});
	}

	let bit_depth =
		1u8 << ((font_type & font_type_flags::BIT_DEPTH_MASK) >> font_type_flags::BIT_DEPTH_SHIFT);

	// When nDescent is negative it carries the high word of the 32-bit
	// offset/width table location.
	let ow_table_offset_words = if neg_descent < 0 {
		((neg_descent as u16 as u32) << 16) | u32::from(ow_table_offset_low)
	} else {
		u32::from(ow_table_offset_low)
	};
	// The location counts words from the field's own position
	let ow_table_pos = OW_TABLE_FIELD_OFFSET + ow_table_offset_words as usize * 2;

	// Strike bitmap: rowWords * 16 bits per row, rect_height rows
	let row_bytes = row_words as usize * 2;
	let strike_rows = r.read(row_bytes * rect_height as usize)?;
	let strike_width_px = (row_words as usize * 16) / bit_depth as usize;

	let mut indices = vec![0u8; strike_width_px * rect_height as usize];
	let per_byte = 8 / bit_depth as usize;
	for y in 0..rect_height as usize {
		for x in 0..strike_width_px {
			let byte = strike_rows[y * row_bytes + x / per_byte];
			let shift = 8 - bit_depth as usize - (x % per_byte) * bit_depth as usize;
			indices[y * strike_width_px + x] =
				(byte >> shift) & ((1u16 << bit_depth) - 1) as u8;
		}
	}

	// Location table follows the bitmap; entry count covers the encoded
	// range, the missing glyph, and a final sentinel.
	let entry_count = last_char as usize - first_char as usize + 3;
	let mut locations = Vec::with_capacity(entry_count);
	for _ in 0..entry_count {
		locations.push(r.u16()?);
	}

	// Offset/width table at its declared position
	let mut ow_reader = ByteReader::new(data);
	ow_reader.seek(ow_table_pos).map_err(|_| FontError::MalformedResource {
		kind: "offset/width table out of range",
		context: format!("table location {ow_table_pos:#X}"),
	})?;
	let mut ow_entries = Vec::with_capacity(entry_count);
	for _ in 0..entry_count {
		ow_entries.push(ow_reader.u16()?);
	}

	let color_table = if font_type & font_type_flags::HAS_COLOR_TABLE != 0 {
		let ct_pos = ow_table_pos + entry_count * 2;
		let mut ct_reader = ByteReader::new(data);
		ct_reader.seek(ct_pos)?;
		parse_color_table(&mut ct_reader).map_err(|_| FontError::MalformedResource {
			kind: "bad strike color table",
			context: format!("table at {ct_pos:#X}"),
		})?
	} else {
		Vec::new()
	};

	let strike_palette = if color_table.is_empty() {
		palette::default_clut_for_depth(bit_depth).map_err(|_| FontError::MalformedResource {
			kind: "impossible strike depth",
			context: format!("{bit_depth} bits per pixel"),
		})?
	} else {
		color_table.clone()
	};
	let full_bitmap =
		Image::new_paletted(strike_width_px, rect_height as usize, indices, strike_palette)
			.map_err(|_| FontError::MalformedResource {
				kind: "strike size mismatch",
				context: String::new(),
			})?;

	let glyph_at = |index: usize, ch: i32| -> Option<Glyph> {
		let ow = ow_entries[index];
		if ow == 0xFFFF {
			return None;
		}
		let start = locations[index];
		let end = locations[index + 1];
		if end < start || end as usize > strike_width_px {
			// A slice outside the strike can never be drawn; treat the
			// character as missing rather than hand out bad bounds.
			return None;
		}
		Some(Glyph {
			ch,
			bitmap_offset: start,
			bitmap_width: end - start,
			pen_offset: (ow >> 8) as u8 as i8,
			advance: (ow & 0xFF) as u8,
		})
	};

	let missing_index = last_char as usize - first_char as usize + 1;
	let missing_glyph = glyph_at(missing_index, -1).ok_or(FontError::MalformedResource {
		kind: "missing glyph absent",
		context: "offset/width table ends in 0xFFFF".to_string(),
	})?;

	let glyphs = (0..=(last_char - first_char) as usize)
		.map(|i| glyph_at(i, i32::from(first_char) + i as i32))
		.collect();

	Ok(DecodedFont {
		source_bit_depth: bit_depth,
		color_table,
		is_dynamic: font_type & font_type_flags::IS_DYNAMIC != 0,
		has_non_black_colors: font_type & font_type_flags::HAS_NON_BLACK_COLORS != 0,
		fixed_width: font_type & font_type_flags::FIXED_WIDTH != 0,
		first_char,
		last_char,
		max_width,
		max_kerning,
		rect_width,
		rect_height,
		max_ascent,
		max_descent,
		leading,
		full_bitmap,
		missing_glyph,
		glyphs,
	})
}

/// One `finf` (font information) entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct FontInfo {
	/// Referenced font family id
	pub font_id: u16,
	/// Style flag bits (bold, italic, ...)
	pub style_flags: u16,
	/// Point size
	pub size: u16,
}

/// Decodes a `finf` resource.
pub fn decode_finf(data: &[u8]) -> Result<Vec<FontInfo>, FontError> {
	let mut r = ByteReader::new(data);
	let count = r.u16()? as usize;
	let mut entries = Vec::with_capacity(count);
	for _ in 0..count {
		entries.push(FontInfo {
			font_id: r.u16()?,
			style_flags: r.u16()?,
			size: r.u16()?,
		});
	}
	Ok(entries)
}
