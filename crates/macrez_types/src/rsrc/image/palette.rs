//! Color and palette resources.
//!
//! QuickDraw colors are 16 bits per channel. A `clut` resource is a header
//! (`ctSeed`, `ctFlags`, `ctSize`) followed by `ctSize + 1` entries of
//! `{pixel value, R, G, B}`; the window/control/menu color-table variants
//! (`actb`, `cctb`, `dctb`, `fctb`, `wctb`) share the layout and are decoded
//! identically. A `pltt` resource is a Palette Manager record: an entry
//! count padded to one entry slot, then `{R, G, B, usage, tolerance, flags,
//! private}` entries.

use serde::Serialize;

use crate::rsrc::{error::ImageError, reader::ByteReader};

/// A 16-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
	/// Red component
	pub r: u16,
	/// Green component
	pub g: u16,
	/// Blue component
	pub b: u16,
	/// Alpha component
	pub a: u16,
}

impl Color {
	/// Creates a fully opaque color from 16-bit channels.
	pub const fn rgb(r: u16, g: u16, b: u16) -> Self {
		Self {
			r,
			g,
			b,
			a: 0xFFFF,
		}
	}

	/// Creates a fully opaque color from 8-bit channels, widening each to
	/// 16 bits.
	pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
		Self::rgb(r as u16 * 0x0101, g as u16 * 0x0101, b as u16 * 0x0101)
	}

	/// Creates an opaque 16-bit gray.
	pub const fn gray(value: u16) -> Self {
		Self::rgb(value, value, value)
	}

	/// Transparent black.
	pub const fn transparent() -> Self {
		Self {
			r: 0,
			g: 0,
			b: 0,
			a: 0,
		}
	}

	/// Packs the color as 8-bit 0xRRGGBBAA.
	pub const fn to_rgba32(self) -> u32 {
		let r = (self.r >> 8) as u32;
		let g = (self.g >> 8) as u32;
		let b = (self.b >> 8) as u32;
		let a = (self.a >> 8) as u32;
		(r << 24) | (g << 16) | (b << 8) | a
	}
}

impl Default for Color {
	fn default() -> Self {
		Self::transparent()
	}
}

impl std::fmt::Display for Color {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "RGBA({:04X}, {:04X}, {:04X}, {:04X})", self.r, self.g, self.b, self.a)
	}
}

/// One color-table entry: the stored slot number plus the color. The slot is
/// observable metadata; lookups always go by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorTableEntry {
	/// Pixel value this entry was declared for
	pub slot: u16,
	/// The color
	pub color: Color,
}

/// Decodes a `clut` (or `actb`/`cctb`/`dctb`/`fctb`/`wctb`) resource.
///
/// The emitted palette always has `ctSize + 1` entries, in stored order.
pub fn decode_clut(data: &[u8]) -> Result<Vec<ColorTableEntry>, ImageError> {
	let mut r = ByteReader::new(data);
	let entries = parse_color_table(&mut r)?;
	Ok(entries)
}

/// Parses an inline color table at the reader's cursor (shared with the
/// PixMap and cicn decoders).
pub fn parse_color_table(
	r: &mut ByteReader<'_>,
) -> Result<Vec<ColorTableEntry>, ImageError> {
	let _ct_seed = r.u32()?;
	let _ct_flags = r.u16()?;
	let ct_size = r.i16()?;
	if ct_size < -1 {
		return Err(ImageError::MalformedResource {
			kind: "negative color table size",
			context: format!("ctSize {ct_size}"),
		});
	}
	let count = (i32::from(ct_size) + 1) as usize;
	let mut entries = Vec::with_capacity(count);
	for _ in 0..count {
		let slot = r.u16()?;
		let red = r.u16()?;
		let green = r.u16()?;
		let blue = r.u16()?;
		entries.push(ColorTableEntry {
			slot,
			color: Color::rgb(red, green, blue),
		});
	}
	Ok(entries)
}

/// Decodes a `pltt` resource into its ordered colors.
pub fn decode_pltt(data: &[u8]) -> Result<Vec<Color>, ImageError> {
	let mut r = ByteReader::new(data);
	let count = r.u16()? as usize;
	// The header record is padded out to one 16-byte entry slot
	r.skip(14)?;

	let mut colors = Vec::with_capacity(count);
	for _ in 0..count {
		let red = r.u16()?;
		let green = r.u16()?;
		let blue = r.u16()?;
		let _usage = r.u16()?;
		let _tolerance = r.u16()?;
		let _flags = r.u16()?;
		let _private = r.u32()?;
		colors.push(Color::rgb(red, green, blue));
	}
	Ok(colors)
}

/// Looks up a pixel value in a color table, falling back to position when no
/// entry declares that slot.
pub fn color_for_value(table: &[ColorTableEntry], value: usize) -> Color {
	table
		.iter()
		.find(|e| e.slot as usize == value)
		.or_else(|| table.get(value))
		.map_or(Color::transparent(), |e| e.color)
}

fn entry(slot: usize, r: u8, g: u8, b: u8) -> ColorTableEntry {
	ColorTableEntry {
		slot: slot as u16,
		color: Color::from_rgb8(r, g, b),
	}
}

/// The standard 1-bit palette: white, black.
pub fn default_clut_1bit() -> Vec<ColorTableEntry> {
	vec![entry(0, 0xFF, 0xFF, 0xFF), entry(1, 0x00, 0x00, 0x00)]
}

/// The standard 2-bit palette: white, two grays, black.
pub fn default_clut_2bit() -> Vec<ColorTableEntry> {
	vec![
		entry(0, 0xFF, 0xFF, 0xFF),
		entry(1, 0xAC, 0xAC, 0xAC),
		entry(2, 0x55, 0x55, 0x55),
		entry(3, 0x00, 0x00, 0x00),
	]
}

/// The classic 16-color system palette.
pub fn default_clut_4bit() -> Vec<ColorTableEntry> {
	const COLORS: [(u8, u8, u8); 16] = [
		(0xFF, 0xFF, 0xFF), // white
		(0xFC, 0xF3, 0x05), // yellow
		(0xFF, 0x64, 0x02), // orange
		(0xDD, 0x08, 0x06), // red
		(0xF2, 0x08, 0x84), // magenta
		(0x46, 0x00, 0xA5), // purple
		(0x00, 0x00, 0xD4), // blue
		(0x02, 0xAB, 0xEA), // cyan
		(0x1F, 0xB7, 0x14), // green
		(0x00, 0x64, 0x11), // dark green
		(0x56, 0x2C, 0x05), // brown
		(0x90, 0x71, 0x3A), // tan
		(0xC0, 0xC0, 0xC0), // light gray
		(0x80, 0x80, 0x80), // medium gray
		(0x40, 0x40, 0x40), // dark gray
		(0x00, 0x00, 0x00), // black
	];
	COLORS.iter().enumerate().map(|(i, &(r, g, b))| entry(i, r, g, b)).collect()
}

/// The standard 256-color system palette: a 6x6x6 color cube in the first
/// 215 slots, then 10-step red, green, blue and gray ramps, then black.
pub fn default_clut_8bit() -> Vec<ColorTableEntry> {
	const RAMP: [u8; 10] = [0xEE, 0xDD, 0xBB, 0xAA, 0x88, 0x77, 0x55, 0x44, 0x22, 0x11];
	let mut entries = Vec::with_capacity(256);
	for i in 0..215 {
		let r = 0xFF - 0x33 * (i / 36) as u8;
		let g = 0xFF - 0x33 * ((i / 6) % 6) as u8;
		let b = 0xFF - 0x33 * (i % 6) as u8;
		entries.push(entry(i, r, g, b));
	}
	for (i, &v) in RAMP.iter().enumerate() {
		entries.push(entry(215 + i, v, 0, 0));
	}
	for (i, &v) in RAMP.iter().enumerate() {
		entries.push(entry(225 + i, 0, v, 0));
	}
	for (i, &v) in RAMP.iter().enumerate() {
		entries.push(entry(235 + i, 0, 0, v));
	}
	for (i, &v) in RAMP.iter().enumerate() {
		entries.push(entry(245 + i, v, v, v));
	}
	entries.push(entry(255, 0, 0, 0));
	entries
}

/// The default palette for a given source bit depth.
pub fn default_clut_for_depth(depth: u8) -> Result<Vec<ColorTableEntry>, ImageError> {
	match depth {
		1 => Ok(default_clut_1bit()),
		2 => Ok(default_clut_2bit()),
		4 => Ok(default_clut_4bit()),
		8 => Ok(default_clut_8bit()),
		other => Err(ImageError::MalformedResource {
			kind: "impossible indexed depth",
			context: format!("{other} bits per pixel"),
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn clut_bytes(entries: &[(u16, u16, u16, u16)]) -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(&0u32.to_be_bytes()); // ctSeed
		out.extend_from_slice(&0u16.to_be_bytes()); // ctFlags
		out.extend_from_slice(&((entries.len() as i16) - 1).to_be_bytes());
		for &(slot, r, g, b) in entries {
			out.extend_from_slice(&slot.to_be_bytes());
			out.extend_from_slice(&r.to_be_bytes());
			out.extend_from_slice(&g.to_be_bytes());
			out.extend_from_slice(&b.to_be_bytes());
		}
		out
	}

	#[test]
	fn test_decode_clut_emits_ctsize_plus_one() {
		let data = clut_bytes(&[(0, 0xFFFF, 0, 0), (1, 0, 0xFFFF, 0), (5, 0, 0, 0xFFFF)]);
		let table = decode_clut(&data).unwrap();
		assert_eq!(table.len(), 3);
		assert_eq!(table[0].color, Color::rgb(0xFFFF, 0, 0));
		assert_eq!(table[2].slot, 5);
	}

	#[test]
	fn test_decode_clut_truncated_fails() {
		let data = clut_bytes(&[(0, 1, 2, 3)]);
		assert!(decode_clut(&data[..data.len() - 2]).is_err());
	}

	#[test]
	fn test_decode_pltt() {
		let mut data = Vec::new();
		data.extend_from_slice(&2u16.to_be_bytes());
		data.extend_from_slice(&[0u8; 14]);
		for (r, g, b) in [(0xFFFFu16, 0u16, 0u16), (0, 0, 0xFFFF)] {
			data.extend_from_slice(&r.to_be_bytes());
			data.extend_from_slice(&g.to_be_bytes());
			data.extend_from_slice(&b.to_be_bytes());
			data.extend_from_slice(&[0u8; 10]);
		}
		let colors = decode_pltt(&data).unwrap();
		assert_eq!(colors, vec![Color::rgb(0xFFFF, 0, 0), Color::rgb(0, 0, 0xFFFF)]);
	}

	#[test]
	fn test_default_8bit_palette_shape() {
		let table = default_clut_8bit();
		assert_eq!(table.len(), 256);
		assert_eq!(table[0].color, Color::from_rgb8(0xFF, 0xFF, 0xFF));
		assert_eq!(table[215].color, Color::from_rgb8(0xEE, 0, 0));
		assert_eq!(table[255].color, Color::from_rgb8(0, 0, 0));
		// the cube's last entry before the ramps
		assert_eq!(table[214].color, Color::from_rgb8(0, 0, 0x33));
	}

	#[test]
	fn test_color_for_value_prefers_slot() {
		let table = vec![
			ColorTableEntry {
				slot: 7,
				color: Color::rgb(1, 1, 1),
			},
			ColorTableEntry {
				slot: 0,
				color: Color::rgb(2, 2, 2),
			},
		];
		assert_eq!(color_for_value(&table, 7), Color::rgb(1, 1, 1));
		assert_eq!(color_for_value(&table, 1), Color::rgb(2, 2, 2)); // positional fallback
		assert_eq!(color_for_value(&table, 9), Color::transparent());
	}

	#[test]
	fn test_to_rgba32() {
		assert_eq!(Color::from_rgb8(0x12, 0x34, 0x56).to_rgba32(), 0x1234_56FF);
	}
}
