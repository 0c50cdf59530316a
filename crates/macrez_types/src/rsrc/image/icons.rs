//! Icon, cursor and pattern decoders.
//!
//! The monochrome family (`ICON`, `ICN#`, `icm#`, `ics#`, `kcs#`) stores one
//! bit per pixel, MSB-left, with the `#` variants carrying a same-size mask
//! after the image. The indexed family (`icl4/8`, `icm4/8`, `ics4/8`,
//! `kcs4/8`) indexes the standard 16- or 256-color system palette and
//! borrows its transparency mask from the companion `#` resource with the
//! same id. `cicn`, `crsr` and `ppat` are self-contained records with an
//! inline PixMap and color table; handle-valued fields inside them hold
//! offsets relative to the resource start.

use crate::rsrc::{
	ResourceSet, TypeTag,
	error::ImageError,
	reader::ByteReader,
	tags,
};

use super::{
	Image, PixelFormat, palette,
	pixmap::{PixMap, expand_monochrome, expand_monochrome_masked},
};

#[cfg(test)]
use super::pixmap;

/// A decoded `cicn`: the color image plus its monochrome fallback.
#[derive(Debug, Clone)]
pub struct DecodedColorIcon {
	/// Color image with the mask applied
	pub image: Image,
	/// Black-and-white fallback bitmap
	pub bitmap: Image,
}

/// A decoded `CURS` cursor.
#[derive(Debug, Clone)]
pub struct DecodedCursor {
	/// 16x16 masked bitmap
	pub bitmap: Image,
	/// Hotspot x
	pub hotspot_x: u16,
	/// Hotspot y
	pub hotspot_y: u16,
}

/// A decoded `crsr` color cursor.
#[derive(Debug, Clone)]
pub struct DecodedColorCursor {
	/// Color image with the mask applied
	pub image: Image,
	/// Monochrome fallback with the mask applied
	pub bitmap: Image,
	/// Hotspot x
	pub hotspot_x: u16,
	/// Hotspot y
	pub hotspot_y: u16,
}

/// A decoded `ppat`: the color pattern plus its monochrome fallback.
#[derive(Debug, Clone)]
pub struct DecodedPattern {
	/// Color pattern tile
	pub pattern: Image,
	/// 8x8 monochrome fallback
	pub monochrome: Image,
}

fn check_len(data: &[u8], expected: usize, kind: &'static str) -> Result<(), ImageError> {
	if data.len() < expected {
		return Err(ImageError::MalformedResource {
			kind,
			context: format!("need {expected} bytes, have {}", data.len()),
		});
	}
	Ok(())
}

/// Decodes a maskless monochrome icon (`ICON`: 32x32).
pub fn decode_icon(data: &[u8]) -> Result<Image, ImageError> {
	check_len(data, 128, "ICON too short")?;
	Ok(expand_monochrome(data, 4, 32, 32))
}

/// Decodes a bitmap/mask pair (`ICN#` 32x32, `icm#` 16x12, `ics#`/`kcs#`
/// 16x16). The mask makes uncovered pixels transparent.
pub fn decode_icon_pair(data: &[u8], width: usize, height: usize) -> Result<Image, ImageError> {
	let row_bytes = width / 8;
	let plane = row_bytes * height;
	check_len(data, plane * 2, "icon/mask pair too short")?;
	Ok(expand_monochrome_masked(&data[..plane], &data[plane..plane * 2], row_bytes, width, height))
}

/// Decodes an indexed icon (`icl4/8`, `icm4/8`, `ics4/8`, `kcs4/8`).
///
/// `mask_pair` is the body of the companion `#` resource; when present its
/// second plane supplies transparency, and a pair too short for the declared
/// dimensions is malformed. Without a mask the icon is fully opaque.
pub fn decode_indexed_icon(
	data: &[u8],
	mask_pair: Option<&[u8]>,
	width: usize,
	height: usize,
	depth: u8,
) -> Result<Image, ImageError> {
	let per_byte = 8 / depth as usize;
	let row_bytes = width / per_byte;
	check_len(data, row_bytes * height, "indexed icon too short")?;
	let clut = palette::default_clut_for_depth(depth)?;

	let mask_row_bytes = width / 8;
	let mask_plane = mask_row_bytes * height;
	let mask = match mask_pair {
		Some(pair) => {
			if pair.len() < mask_plane * 2 {
				return Err(ImageError::MalformedResource {
					kind: "mask dimensions differ",
					context: format!(
						"mask pair holds {} bytes, {width}x{height} needs {}",
						pair.len(),
						mask_plane * 2
					),
				});
			}
			Some(&pair[mask_plane..mask_plane * 2])
		}
		None => None,
	};

	let mut image = Image::new(width, height, PixelFormat::Rgba8888);
	for y in 0..height {
		for x in 0..width {
			let byte = data[y * row_bytes + x / per_byte];
			let shift = 8 - depth as usize - (x % per_byte) * depth as usize;
			let value = (byte >> shift) as usize & ((1 << depth) - 1);
			let opaque = match mask {
				Some(mask_rows) => {
					(mask_rows[y * mask_row_bytes + x / 8] >> (7 - (x % 8))) & 1 != 0
				}
				None => true,
			};
			let rgba = if opaque {
				palette::color_for_value(&clut, value).to_rgba32()
			} else {
				0
			};
			image.put_rgba(x, y, rgba);
		}
	}
	Ok(image)
}

/// Decodes a `SICN` list: any number of packed 16x16 monochrome icons.
pub fn decode_sicn(data: &[u8]) -> Result<Vec<Image>, ImageError> {
	if data.len() % 32 != 0 {
		return Err(ImageError::MalformedResource {
			kind: "SICN size not a multiple of 32",
			context: format!("{} bytes", data.len()),
		});
	}
	Ok(data.chunks_exact(32).map(|chunk| expand_monochrome(chunk, 2, 16, 16)).collect())
}

/// Decodes a `PAT ` resource: one 8x8 monochrome pattern.
pub fn decode_pat(data: &[u8]) -> Result<Image, ImageError> {
	check_len(data, 8, "PAT too short")?;
	Ok(expand_monochrome(data, 1, 8, 8))
}

/// Decodes a `PAT#` resource: a counted list of 8x8 patterns.
pub fn decode_patn(data: &[u8]) -> Result<Vec<Image>, ImageError> {
	let mut r = ByteReader::new(data);
	let count = r.u16()? as usize;
	let mut patterns = Vec::with_capacity(count);
	for _ in 0..count {
		patterns.push(expand_monochrome(r.read(8)?, 1, 8, 8));
	}
	Ok(patterns)
}

/// Decodes a `CURS` cursor: 16x16 bitmap, mask, hotspot.
pub fn decode_curs(data: &[u8]) -> Result<DecodedCursor, ImageError> {
	check_len(data, 68, "CURS too short")?;
	let bitmap = expand_monochrome_masked(&data[..32], &data[32..64], 2, 16, 16);
	let mut r = ByteReader::new(&data[64..]);
	let hotspot_y = r.u16()?;
	let hotspot_x = r.u16()?;
	Ok(DecodedCursor {
		bitmap,
		hotspot_x,
		hotspot_y,
	})
}

/// Decodes a `cicn` color icon.
pub fn decode_cicn(data: &[u8]) -> Result<DecodedColorIcon, ImageError> {
	let mut r = ByteReader::new(data);

	let pm = PixMap::parse(&mut r, true)?;
	// mask BitMap: base addr, rowBytes, bounds
	let _mask_base = r.u32()?;
	let mask_row_bytes = r.u16()? as usize;
	let mask_bounds = super::Rect::parse(&mut r)?;
	// monochrome BitMap
	let _bmap_base = r.u32()?;
	let bmap_row_bytes = r.u16()? as usize;
	let bmap_bounds = super::Rect::parse(&mut r)?;
	let _icon_data = r.u32()?;

	if mask_bounds.width() != pm.width() || mask_bounds.height() != pm.height() {
		return Err(ImageError::MalformedResource {
			kind: "mask dimensions differ",
			context: format!(
				"mask {}x{}, image {}x{}",
				mask_bounds.width(),
				mask_bounds.height(),
				pm.width(),
				pm.height()
			),
		});
	}

	let mask_rows = r.read(mask_row_bytes * mask_bounds.height())?.to_vec();
	let bmap_rows = r.read(bmap_row_bytes * bmap_bounds.height())?.to_vec();
	let clut = palette::parse_color_table(&mut r)?;

	// cicn pixel data is stored raw, regardless of the packType field
	let pixel_rows = r.read(pm.row_bytes as usize * pm.height())?;
	let color = pm.expand(pixel_rows, Some(&clut))?;

	let mut image = color.clone();
	for y in 0..pm.height() {
		for x in 0..pm.width() {
			let opaque = (mask_rows[y * mask_row_bytes + x / 8] >> (7 - (x % 8))) & 1 != 0;
			if !opaque {
				image.put_rgba(x, y, 0);
			}
		}
	}

	let bitmap = expand_monochrome_masked(
		&bmap_rows,
		&mask_rows,
		bmap_row_bytes,
		bmap_bounds.width(),
		bmap_bounds.height(),
	);

	Ok(DecodedColorIcon {
		image,
		bitmap,
	})
}

/// Decodes a `crsr` color cursor.
pub fn decode_crsr(data: &[u8]) -> Result<DecodedColorCursor, ImageError> {
	let mut r = ByteReader::new(data);

	let _crsr_type = r.u16()?;
	let map_offset = r.u32()? as usize;
	let data_offset = r.u32()? as usize;
	let _expanded_data = r.u32()?;
	let _expanded_depth = r.u16()?;
	let _unused = r.u32()?;
	let one_bit_data = r.read(32)?.to_vec();
	let mask_data = r.read(32)?.to_vec();
	let hotspot_y = r.u16()?;
	let hotspot_x = r.u16()?;
	let _x_table = r.u32()?;
	let _crsr_id = r.u32()?;

	let mut pm_reader = r.sub_to_end(map_offset)?;
	let pm = PixMap::parse(&mut pm_reader, true)?;
	let clut_offset = pm.pm_table as usize;
	let clut = palette::parse_color_table(&mut r.sub_to_end(clut_offset)?)?;

	let pixel_rows = r.peek(data_offset, pm.row_bytes as usize * pm.height())?;
	let color = pm.expand(pixel_rows, Some(&clut))?;

	let mut image = color;
	for y in 0..pm.height().min(16) {
		for x in 0..pm.width().min(16) {
			let opaque = (mask_data[y * 2 + x / 8] >> (7 - (x % 8))) & 1 != 0;
			if !opaque {
				image.put_rgba(x, y, 0);
			}
		}
	}

	let bitmap = expand_monochrome_masked(&one_bit_data, &mask_data, 2, 16, 16);
	Ok(DecodedColorCursor {
		image,
		bitmap,
		hotspot_x,
		hotspot_y,
	})
}

/// Decodes a `ppat` pixel pattern.
pub fn decode_ppat(data: &[u8]) -> Result<DecodedPattern, ImageError> {
	let mut r = ByteReader::new(data);

	let pat_type = r.u16()?;
	let map_offset = r.u32()? as usize;
	let data_offset = r.u32()? as usize;
	let _expanded_data = r.u32()?;
	let _expanded_valid = r.u16()?;
	let _expanded_map = r.u32()?;
	let mono_bits = r.read(8)?;
	let monochrome = expand_monochrome(mono_bits, 1, 8, 8);

	// Type 0 is an old-style pattern with no pixel map behind it
	if pat_type == 0 || map_offset == 0 {
		return Ok(DecodedPattern {
			pattern: monochrome.clone(),
			monochrome,
		});
	}

	let mut pm_reader = r.sub_to_end(map_offset)?;
	let pm = PixMap::parse(&mut pm_reader, true)?;
	let clut = if pm.pixel_size <= 8 {
		Some(palette::parse_color_table(&mut r.sub_to_end(pm.pm_table as usize)?)?)
	} else {
		None
	};
	let pixel_rows = r.peek(data_offset, pm.row_bytes as usize * pm.height())?;
	let pattern = pm.expand(pixel_rows, clut.as_deref())?;

	Ok(DecodedPattern {
		pattern,
		monochrome,
	})
}

/// Decodes a `ppt#` resource: a counted list of offsets to embedded `ppat`
/// records.
pub fn decode_pptn(data: &[u8]) -> Result<Vec<DecodedPattern>, ImageError> {
	let mut r = ByteReader::new(data);
	let count = r.u16()? as usize;
	let mut offsets = Vec::with_capacity(count);
	for _ in 0..count {
		offsets.push(r.u32()? as usize);
	}

	let mut patterns = Vec::with_capacity(count);
	for (i, &offset) in offsets.iter().enumerate() {
		let end = offsets.get(i + 1).copied().unwrap_or(data.len());
		if offset > end || end > data.len() {
			return Err(ImageError::MalformedResource {
				kind: "pattern list offsets out of order",
				context: format!("entry {i}: {offset}..{end}"),
			});
		}
		patterns.push(decode_ppat(&data[offset..end])?);
	}
	Ok(patterns)
}

/// Geometry and palette depth for each indexed/monochrome icon type.
fn icon_geometry(type_tag: TypeTag) -> Option<(usize, usize, u8, Option<TypeTag>)> {
	// (width, height, depth, companion mask type)
	match type_tag {
		t if t == tags::ICON => Some((32, 32, 1, None)),
		t if t == tags::ICNN => Some((32, 32, 1, None)),
		t if t == tags::ICMN => Some((16, 12, 1, None)),
		t if t == tags::ICSN || t == tags::KCSN => Some((16, 16, 1, None)),
		t if t == tags::ICL4 => Some((32, 32, 4, Some(tags::ICNN))),
		t if t == tags::ICL8 => Some((32, 32, 8, Some(tags::ICNN))),
		t if t == tags::ICM4 => Some((16, 12, 4, Some(tags::ICMN))),
		t if t == tags::ICM8 => Some((16, 12, 8, Some(tags::ICMN))),
		t if t == tags::ICS4 => Some((16, 16, 4, Some(tags::ICSN))),
		t if t == tags::ICS8 => Some((16, 16, 8, Some(tags::ICSN))),
		t if t == tags::KCS4 => Some((16, 16, 4, Some(tags::KCSN))),
		t if t == tags::KCS8 => Some((16, 16, 8, Some(tags::KCSN))),
		_ => None,
	}
}

/// Decodes any icon-family resource out of a set, resolving the companion
/// mask resource for the indexed types.
pub fn decode_icon_from_set(
	set: &mut ResourceSet,
	type_tag: TypeTag,
	id: i16,
) -> Result<Image, ImageError> {
	let Some((width, height, depth, mask_type)) = icon_geometry(type_tag) else {
		return Err(ImageError::MalformedResource {
			kind: "not an icon type",
			context: type_tag.to_string(),
		});
	};

	let data = set
		.get(type_tag, id, 0)
		.ok_or(ImageError::MissingDependency {
			dep_type: type_tag,
			dep_id: id,
			consumer_type: type_tag,
			consumer_id: id,
		})?
		.data
		.clone();

	if depth == 1 {
		return if type_tag == tags::ICON {
			decode_icon(&data)
		} else {
			decode_icon_pair(&data, width, height)
		};
	}

	let mask = match mask_type {
		Some(t) if set.exists(t, id) => set.get(t, id, 0).map(|res| res.data.clone()),
		_ => None,
	};
	decode_indexed_icon(&data, mask.as_deref(), width, height, depth)
}
