//! QuickDraw PICT interpreter.
//!
//! A PICT is a recording of QuickDraw calls: a 10-byte header (picture size,
//! frame rect), then a stream of opcodes. Version 1 pictures use byte
//! opcodes; version 2 pictures open with `0x0011 0x02FF`, a 26-byte
//! `HeaderOp`, and word opcodes aligned to even offsets.
//!
//! The interpreter keeps a per-invocation QuickDraw state (pen, colors,
//! patterns, clip) and rasterizes into an RGBA canvas the size of the frame
//! rect. Opcodes it does not draw are consumed exactly; unknown opcodes are
//! skipped by the byte counts QuickDraw reserved for them, and anything
//! outside those ranges fails with
//! [`UnsupportedPictOpcode`](ImageError::UnsupportedPictOpcode).
//!
//! QuickTime-compressed pictures and `ph0t`/`ph00` long comments carry an
//! already-encoded image (usually JPEG); those bytes are surfaced unchanged
//! through the `embedded_*` side channel instead of being rasterized.

use log::trace;

use crate::rsrc::{TypeTag, error::ImageError, reader::ByteReader};

use super::{
	Image, PixelFormat, Rect, packbits,
	palette::{Color, ColorTableEntry, parse_color_table},
	pixmap::{BitMap, PixMap, ROW_BYTES_PIXMAP_FLAG},
};

/// Result of decoding a PICT resource: a rasterized canvas and, when the
/// picture wraps an already-encoded image, the pass-through payload.
#[derive(Debug, Clone)]
pub struct DecodedPict {
	/// Rasterized picture (frame-rect sized; untouched when the picture is
	/// a pure embedded-image wrapper)
	pub image: Image,
	/// Format tag of the embedded payload (`jpeg`, `ph0t`, ...)
	pub embedded_format: Option<TypeTag>,
	/// Embedded payload bytes, forwarded unchanged
	pub embedded_data: Vec<u8>,
}

const WHITE: u32 = 0xFFFF_FFFF;
const BLACK_PATTERN: [u8; 8] = [0xFF; 8];
const WHITE_PATTERN: [u8; 8] = [0x00; 8];

struct QuickDrawState {
	frame: Rect,
	origin_x: i32,
	origin_y: i32,
	pen: (i16, i16),
	pen_size: (i16, i16),
	pen_mode: u16,
	text_font: u16,
	text_face: u8,
	text_size: u16,
	text_mode: u16,
	fg: Color,
	bg: Color,
	clip: Rect,
	pen_pattern: [u8; 8],
	fill_pattern: [u8; 8],
	background_pattern: [u8; 8],
	last_rect: Rect,
	last_rrect: Rect,
	last_oval: Rect,
	last_arc: (Rect, i16, i16),
	drew_something: bool,
	embedded: Option<(TypeTag, Vec<u8>)>,
}

impl QuickDrawState {
	fn new(frame: Rect) -> Self {
		Self {
			frame,
			origin_x: 0,
			origin_y: 0,
			pen: (0, 0),
			pen_size: (1, 1),
			pen_mode: 0,
			text_font: 0,
			text_face: 0,
			text_size: 0,
			text_mode: 0,
			fg: Color::from_rgb8(0, 0, 0),
			bg: Color::from_rgb8(0xFF, 0xFF, 0xFF),
			clip: frame,
			pen_pattern: BLACK_PATTERN,
			fill_pattern: BLACK_PATTERN,
			background_pattern: WHITE_PATTERN,
			last_rect: Rect::default(),
			last_rrect: Rect::default(),
			last_oval: Rect::default(),
			last_arc: (Rect::default(), 0, 0),
			drew_something: false,
			embedded: None,
		}
	}

	/// Maps an absolute picture coordinate to canvas coordinates.
	fn canvas_x(&self, x: i32) -> i32 {
		x - i32::from(self.frame.left) - self.origin_x
	}

	fn canvas_y(&self, y: i32) -> i32 {
		y - i32::from(self.frame.top) - self.origin_y
	}
}

enum OpOutcome {
	Continue,
	Done,
}

/// Decodes a PICT resource body.
pub fn decode_pict(data: &[u8]) -> Result<DecodedPict, ImageError> {
	let mut r = ByteReader::new(data);
	let _picture_size = r.u16()?; // 16-bit size field; wraps for large pictures
	let frame = Rect::parse(&mut r)?;

	// Version detection: v1 pictures follow the header with the byte
	// sequence 11 01, v2 with 00 11 02 FF.
	let version = match r.peek_u16(r.position())? {
		0x1101 => {
			r.skip(2)?;
			1u8
		}
		0x0011 => {
			r.skip(2)?;
			let version_word = r.u16()?;
			if version_word != 0x02FF {
				return Err(ImageError::MalformedResource {
					kind: "bad PICT version",
					context: format!("version word {version_word:04X}"),
				});
			}
			2
		}
		other => {
			return Err(ImageError::MalformedResource {
				kind: "bad PICT version",
				context: format!("first opcode {other:04X}"),
			});
		}
	};

	let mut state = QuickDrawState::new(frame);
	let mut image = Image::new_rgba_filled(frame.width(), frame.height(), WHITE);

	loop {
		if version == 2 && r.position() % 2 != 0 {
			r.skip(1)?;
		}
		if r.is_eof() {
			// EOF after a legal draw is a terminal transition, not an error
			if state.drew_something || state.embedded.is_some() {
				break;
			}
			return Err(ImageError::MalformedResource {
				kind: "PICT ended before drawing",
				context: "no EndOfPicture opcode".to_string(),
			});
		}
		let opcode_offset = r.position();
		let opcode = if version == 1 {
			u16::from(r.u8()?)
		} else {
			r.u16()?
		};
		match run_opcode(&mut state, &mut image, &mut r, opcode, opcode_offset, version)? {
			OpOutcome::Continue => {}
			OpOutcome::Done => break,
		}
	}

	let (embedded_format, embedded_data) = match state.embedded {
		Some((tag, bytes)) => (Some(tag), bytes),
		None => (None, Vec::new()),
	};
	Ok(DecodedPict {
		image,
		embedded_format,
		embedded_data,
	})
}

fn run_opcode(
	state: &mut QuickDrawState,
	image: &mut Image,
	r: &mut ByteReader<'_>,
	opcode: u16,
	opcode_offset: usize,
	version: u8,
) -> Result<OpOutcome, ImageError> {
	match opcode {
		0x0000 => {} // NOP
		0x0001 => {
			// Clip: a region whose first rect becomes the clip rect
			let (rect, _) = read_region(r)?;
			state.clip = rect;
		}
		0x0002 => state.background_pattern = read_pattern(r)?,
		0x0003 => state.text_font = r.u16()?,
		0x0004 => state.text_face = r.u8()?,
		0x0005 => state.text_mode = r.u16()?,
		0x0006 => r.skip(4)?, // SpExtra
		0x0007 => {
			state.pen_size = (r.i16()?, r.i16()?);
		}
		0x0008 => state.pen_mode = r.u16()?,
		0x0009 => state.pen_pattern = read_pattern(r)?,
		0x000A => state.fill_pattern = read_pattern(r)?,
		0x000B => r.skip(4)?, // OvSize
		0x000C => {
			// Origin: dh, dv offsets accumulate
			state.origin_x += i32::from(r.i16()?);
			state.origin_y += i32::from(r.i16()?);
		}
		0x000D => state.text_size = r.u16()?,
		0x000E => state.fg = old_color(r.u32()?),
		0x000F => state.bg = old_color(r.u32()?),
		0x0010 => r.skip(8)?, // TxRatio
		0x0011 => {
			let _version = r.u8()?;
		}
		0x0012 | 0x0013 | 0x0014 => read_pix_pattern(state, r, opcode)?,
		0x0015 => r.skip(2)?, // PnLocHFrac
		0x0016 => r.skip(2)?, // ChExtra
		0x001A => state.fg = read_rgb(r)?,
		0x001B => state.bg = read_rgb(r)?,
		0x001C => {} // HiliteMode
		0x001D => r.skip(6)?, // HiliteColor
		0x001E => {} // DefHilite
		0x001F => r.skip(6)?, // OpColor
		0x0020 => {
			let y0 = r.i16()?;
			let x0 = r.i16()?;
			let y1 = r.i16()?;
			let x1 = r.i16()?;
			draw_line(state, image, x0, y0, x1, y1);
			state.pen = (x1, y1);
		}
		0x0021 => {
			let (x0, y0) = state.pen;
			let y1 = r.i16()?;
			let x1 = r.i16()?;
			draw_line(state, image, x0, y0, x1, y1);
			state.pen = (x1, y1);
		}
		0x0022 => {
			let y0 = r.i16()?;
			let x0 = r.i16()?;
			let dh = r.i8()?;
			let dv = r.i8()?;
			let (x1, y1) = (x0.saturating_add(i16::from(dh)), y0.saturating_add(i16::from(dv)));
			draw_line(state, image, x0, y0, x1, y1);
			state.pen = (x1, y1);
		}
		0x0023 => {
			let (x0, y0) = state.pen;
			let dh = r.i8()?;
			let dv = r.i8()?;
			let (x1, y1) = (x0.saturating_add(i16::from(dh)), y0.saturating_add(i16::from(dv)));
			draw_line(state, image, x0, y0, x1, y1);
			state.pen = (x1, y1);
		}
		// Text: consumed but not rasterized; the pen tracks positions
		0x0028 => {
			let y = r.i16()?;
			let x = r.i16()?;
			state.pen = (x, y);
			let _text = r.pstring()?;
		}
		0x0029 => {
			let dh = r.u8()?;
			state.pen.0 += i16::from(dh);
			let _text = r.pstring()?;
		}
		0x002A => {
			let dv = r.u8()?;
			state.pen.1 += i16::from(dv);
			let _text = r.pstring()?;
		}
		0x002B => {
			let dh = r.u8()?;
			let dv = r.u8()?;
			state.pen.0 += i16::from(dh);
			state.pen.1 += i16::from(dv);
			let _text = r.pstring()?;
		}
		// Rect family
		0x0030..=0x0037 => {
			let rect = Rect::parse(r)?;
			state.last_rect = rect;
			draw_rect_verb(state, image, rect, opcode & 0x07);
		}
		0x0038..=0x003F => {
			let rect = state.last_rect;
			draw_rect_verb(state, image, rect, opcode & 0x07);
		}
		// Round rect family (rasterized as plain rects)
		0x0040..=0x0047 => {
			let rect = Rect::parse(r)?;
			state.last_rrect = rect;
			draw_rect_verb(state, image, rect, opcode & 0x07);
		}
		0x0048..=0x004F => {
			let rect = state.last_rrect;
			draw_rect_verb(state, image, rect, opcode & 0x07);
		}
		// Oval family
		0x0050..=0x0057 => {
			let rect = Rect::parse(r)?;
			state.last_oval = rect;
			draw_oval_verb(state, image, rect, opcode & 0x07);
		}
		0x0058..=0x005F => {
			let rect = state.last_oval;
			draw_oval_verb(state, image, rect, opcode & 0x07);
		}
		// Arc family: consumed, not rasterized
		0x0060..=0x0067 => {
			let rect = Rect::parse(r)?;
			let start = r.i16()?;
			let angle = r.i16()?;
			state.last_arc = (rect, start, angle);
		}
		0x0068..=0x006F => {
			r.skip(4)?; // start + angle against the remembered rect
		}
		// Polygon family: fill the bounding box
		0x0070..=0x0077 => {
			let rect = read_poly(r)?;
			draw_rect_verb(state, image, rect, opcode & 0x07);
		}
		0x0078..=0x007F => {}
		// Region family: fill the region's bounding rect
		0x0080..=0x0087 => {
			let (rect, _) = read_region(r)?;
			draw_rect_verb(state, image, rect, opcode & 0x07);
		}
		0x0088..=0x008F => {}
		0x0090 | 0x0091 | 0x0098 | 0x0099 => {
			op_bits(state, image, r, opcode)?;
		}
		0x009A | 0x009B => {
			op_direct_bits(state, image, r, opcode)?;
		}
		0x00A0 => r.skip(2)?, // ShortComment
		0x00A1 => op_long_comment(state, r)?,
		0x00FF => return Ok(OpOutcome::Done),
		0x0C00 => {
			// HeaderOp: version, reserved, fixed-point resolution, source
			// rect, reserved
			r.skip(24)?;
		}
		0x8200 | 0x8201 => {
			op_quicktime(state, r, opcode)?;
			if state.embedded.is_some() {
				return Ok(OpOutcome::Done);
			}
		}
		other => {
			let skipped = skip_unknown(r, other, version)?;
			if !skipped {
				return Err(ImageError::UnsupportedPictOpcode {
					opcode: other,
					offset: opcode_offset,
				});
			}
			trace!("skipped reserved PICT opcode {other:04X} at {opcode_offset}");
		}
	}
	Ok(OpOutcome::Continue)
}

/// Skips an unknown opcode using the byte counts QuickDraw reserved for
/// future expansion. Returns false when the opcode is outside every skip
/// range.
fn skip_unknown(r: &mut ByteReader<'_>, opcode: u16, version: u8) -> Result<bool, ImageError> {
	if version == 1 {
		// Version 1 has no reserved ranges; its opcode space was full
		return Ok(false);
	}
	match opcode {
		0x0017..=0x0019 => {}
		0x0024..=0x0027 | 0x002C..=0x002F | 0x0092..=0x0097 | 0x00A2..=0x00AF => {
			let len = r.u16()? as usize;
			r.skip(len)?;
		}
		0x00B0..=0x00CF | 0x8000..=0x80FF => {}
		0x00D0..=0x00FE | 0x8100..=0xFFFF => {
			let len = r.u32()? as usize;
			r.skip(len)?;
		}
		0x0100..=0x7FFF => {
			r.skip(((opcode >> 8) as usize) * 2)?;
		}
		_ => return Ok(false),
	}
	Ok(true)
}

fn read_pattern(r: &mut ByteReader<'_>) -> Result<[u8; 8], ImageError> {
	let bytes = r.read(8)?;
	let mut pattern = [0u8; 8];
	pattern.copy_from_slice(bytes);
	Ok(pattern)
}

fn read_rgb(r: &mut ByteReader<'_>) -> Result<Color, ImageError> {
	Ok(Color::rgb(r.u16()?, r.u16()?, r.u16()?))
}

/// Classic 8-color planar color values used by the old FgCol/BkCol opcodes.
fn old_color(value: u32) -> Color {
	match value {
		33 => Color::from_rgb8(0x00, 0x00, 0x00), // black
		30 => Color::from_rgb8(0xFF, 0xFF, 0xFF), // white
		205 => Color::from_rgb8(0xDD, 0x08, 0x06), // red
		341 => Color::from_rgb8(0x1F, 0xB7, 0x14), // green
		409 => Color::from_rgb8(0x00, 0x00, 0xD4), // blue
		273 => Color::from_rgb8(0x02, 0xAB, 0xEA), // cyan
		137 => Color::from_rgb8(0xF2, 0x08, 0x84), // magenta
		69 => Color::from_rgb8(0xFC, 0xF3, 0x05), // yellow
		_ => Color::from_rgb8(0x00, 0x00, 0x00),
	}
}

/// Reads a QuickDraw region: 16-bit size (including the 10-byte header),
/// bounding rect, then scanline data this decoder does not rasterize.
fn read_region(r: &mut ByteReader<'_>) -> Result<(Rect, usize), ImageError> {
	let size = r.u16()? as usize;
	if size < 10 {
		return Err(ImageError::MalformedResource {
			kind: "region too small",
			context: format!("declared size {size}"),
		});
	}
	let rect = Rect::parse(r)?;
	r.skip(size - 10)?;
	Ok((rect, size))
}

/// Reads a polygon record and returns its bounding box.
fn read_poly(r: &mut ByteReader<'_>) -> Result<Rect, ImageError> {
	let size = r.u16()? as usize;
	if size < 10 {
		return Err(ImageError::MalformedResource {
			kind: "polygon too small",
			context: format!("declared size {size}"),
		});
	}
	let rect = Rect::parse(r)?;
	r.skip(size - 10)?;
	Ok(rect)
}

/// Pixel patterns (BkPixPat/PnPixPat/FillPixPat). Type 2 is an RGB dither;
/// type 1 embeds a full pixmap. Only the 8x8 monochrome fallback feeds the
/// rasterizer here.
fn read_pix_pattern(
	state: &mut QuickDrawState,
	r: &mut ByteReader<'_>,
	opcode: u16,
) -> Result<(), ImageError> {
	let pat_type = r.u16()?;
	let pattern = read_pattern(r)?;
	match pat_type {
		1 => {
			// Full pixel pattern: pixmap record, color table, pixel data
			let pm = PixMap::parse(r, false)?;
			let _clut = parse_color_table(r)?;
			let _rows = pm.read_pixel_data(r)?;
		}
		2 => {
			let _rgb = read_rgb(r)?;
		}
		other => {
			return Err(ImageError::MalformedResource {
				kind: "unknown pixel pattern type",
				context: format!("type {other}"),
			});
		}
	}
	match opcode {
		0x0012 => state.background_pattern = pattern,
		0x0013 => state.pen_pattern = pattern,
		_ => state.fill_pattern = pattern,
	}
	Ok(())
}

fn pattern_bit(pattern: &[u8; 8], x: i32, y: i32) -> bool {
	let row = pattern[(y.rem_euclid(8)) as usize];
	(row >> (7 - x.rem_euclid(8))) & 1 != 0
}

/// Fills a rect (pattern bits pick foreground vs background), honoring the
/// clip rect.
fn fill_rect_pattern(
	state: &mut QuickDrawState,
	image: &mut Image,
	rect: Rect,
	pattern: [u8; 8],
	fg: Color,
	bg: Color,
) {
	state.drew_something = true;
	for y in rect.top..rect.bottom {
		for x in rect.left..rect.right {
			if !state.clip.contains(i32::from(x), i32::from(y)) {
				continue;
			}
			let cx = state.canvas_x(i32::from(x));
			let cy = state.canvas_y(i32::from(y));
			if !image.check(i64::from(cx), i64::from(cy)) {
				continue;
			}
			let color = if pattern_bit(&pattern, i32::from(x), i32::from(y)) {
				fg
			} else {
				bg
			};
			image.put_rgba(cx as usize, cy as usize, color.to_rgba32());
		}
	}
}

fn draw_rect_verb(state: &mut QuickDrawState, image: &mut Image, rect: Rect, verb: u16) {
	match verb {
		0 => frame_rect(state, image, rect),
		1 => fill_rect_pattern(state, image, rect, state.pen_pattern, state.fg, state.bg),
		2 => {
			let bg = state.bg;
			fill_rect_pattern(state, image, rect, WHITE_PATTERN, bg, bg);
		}
		3 => invert_rect(state, image, rect),
		4 => fill_rect_pattern(state, image, rect, state.fill_pattern, state.fg, state.bg),
		_ => {} // reserved verbs draw nothing
	}
}

fn draw_oval_verb(state: &mut QuickDrawState, image: &mut Image, rect: Rect, verb: u16) {
	if !matches!(verb, 1 | 2 | 4) {
		// Framed / inverted ovals are not rasterized
		return;
	}
	let (pattern, fg, bg) = match verb {
		1 => (state.pen_pattern, state.fg, state.bg),
		2 => (WHITE_PATTERN, state.bg, state.bg),
		_ => (state.fill_pattern, state.fg, state.bg),
	};
	state.drew_something = true;
	let rx = rect.width() as f64 / 2.0;
	let ry = rect.height() as f64 / 2.0;
	if rx == 0.0 || ry == 0.0 {
		return;
	}
	let cx0 = f64::from(rect.left) + rx;
	let cy0 = f64::from(rect.top) + ry;
	for y in rect.top..rect.bottom {
		for x in rect.left..rect.right {
			let nx = (f64::from(x) + 0.5 - cx0) / rx;
			let ny = (f64::from(y) + 0.5 - cy0) / ry;
			if nx * nx + ny * ny > 1.0 {
				continue;
			}
			if !state.clip.contains(i32::from(x), i32::from(y)) {
				continue;
			}
			let px = state.canvas_x(i32::from(x));
			let py = state.canvas_y(i32::from(y));
			if image.check(i64::from(px), i64::from(py)) {
				let color = if pattern_bit(&pattern, i32::from(x), i32::from(y)) {
					fg
				} else {
					bg
				};
				image.put_rgba(px as usize, py as usize, color.to_rgba32());
			}
		}
	}
}

fn frame_rect(state: &mut QuickDrawState, image: &mut Image, rect: Rect) {
	let (pw, ph) = (state.pen_size.0.max(1), state.pen_size.1.max(1));
	let edges = [
		Rect {
			top: rect.top,
			left: rect.left,
			bottom: rect.top + ph,
			right: rect.right,
		},
		Rect {
			top: rect.bottom - ph,
			left: rect.left,
			bottom: rect.bottom,
			right: rect.right,
		},
		Rect {
			top: rect.top,
			left: rect.left,
			bottom: rect.bottom,
			right: rect.left + pw,
		},
		Rect {
			top: rect.top,
			left: rect.right - pw,
			bottom: rect.bottom,
			right: rect.right,
		},
	];
	for edge in edges {
		fill_rect_pattern(state, image, edge, state.pen_pattern, state.fg, state.bg);
	}
}

fn invert_rect(state: &mut QuickDrawState, image: &mut Image, rect: Rect) {
	state.drew_something = true;
	for y in rect.top..rect.bottom {
		for x in rect.left..rect.right {
			if !state.clip.contains(i32::from(x), i32::from(y)) {
				continue;
			}
			let cx = state.canvas_x(i32::from(x));
			let cy = state.canvas_y(i32::from(y));
			if image.check(i64::from(cx), i64::from(cy)) {
				let rgba = image.get_rgba(cx as usize, cy as usize);
				image.put_rgba(cx as usize, cy as usize, !rgba | 0xFF);
			}
		}
	}
}

fn draw_line(state: &mut QuickDrawState, image: &mut Image, x0: i16, y0: i16, x1: i16, y1: i16) {
	state.drew_something = true;
	let color = state.fg.to_rgba32();
	let (mut x, mut y) = (i32::from(x0), i32::from(y0));
	let (tx, ty) = (i32::from(x1), i32::from(y1));
	let dx = (tx - x).abs();
	let dy = -(ty - y).abs();
	let sx = if x < tx { 1 } else { -1 };
	let sy = if y < ty { 1 } else { -1 };
	let mut err = dx + dy;
	loop {
		if state.clip.contains(x, y) {
			let cx = state.canvas_x(x);
			let cy = state.canvas_y(y);
			if image.check(i64::from(cx), i64::from(cy)) {
				image.put_rgba(cx as usize, cy as usize, color);
			}
		}
		if x == tx && y == ty {
			break;
		}
		let e2 = 2 * err;
		if e2 >= dy {
			err += dy;
			x += sx;
		}
		if e2 <= dx {
			err += dx;
			y += sy;
		}
	}
}

/// BitsRect / BitsRgn / PackBitsRect / PackBitsRgn: an indirect-color blit
/// with an inline bitmap or pixmap (pixmaps carry a color table).
fn op_bits(
	state: &mut QuickDrawState,
	image: &mut Image,
	r: &mut ByteReader<'_>,
	opcode: u16,
) -> Result<(), ImageError> {
	let packed = matches!(opcode, 0x0098 | 0x0099);
	let with_region = matches!(opcode, 0x0091 | 0x0099);

	let row_bytes_raw = r.u16()?;
	if row_bytes_raw & ROW_BYTES_PIXMAP_FLAG != 0 {
		let pm = PixMap::parse_after_row_bytes(r, row_bytes_raw)?;
		let clut = parse_color_table(r)?;
		let src_rect = Rect::parse(&mut *r)?;
		let dst_rect = Rect::parse(&mut *r)?;
		let _mode = r.u16()?;
		if with_region {
			read_region(r)?;
		}
		let rows = if packed {
			pm.read_pixel_data(r)?
		} else {
			r.read(pm.row_bytes as usize * pm.height())?.to_vec()
		};
		let source = pm.expand(&rows, Some(&clut))?;
		blit(state, image, &source, pm.bounds, src_rect, dst_rect);
	} else {
		let bm = BitMap::parse_after_row_bytes(r, row_bytes_raw)?;
		let src_rect = Rect::parse(&mut *r)?;
		let dst_rect = Rect::parse(&mut *r)?;
		let _mode = r.u16()?;
		if with_region {
			read_region(r)?;
		}
		let row_len = bm.row_bytes as usize;
		let height = bm.bounds.height();
		let rows = if packed && row_len >= 8 {
			let mut out = Vec::with_capacity(row_len * height);
			for _ in 0..height {
				let packed_len = if row_len > 250 {
					r.u16()? as usize
				} else {
					r.u8()? as usize
				};
				let mut row_reader = r.sub(r.position(), packed_len)?;
				r.skip(packed_len)?;
				out.extend_from_slice(&packbits::unpack(&mut row_reader, row_len)?);
			}
			out
		} else {
			r.read(row_len * height)?.to_vec()
		};

		// 1-bit blits paint set bits in the foreground color over the
		// background color
		let mut source =
			Image::new(bm.bounds.width(), bm.bounds.height(), PixelFormat::Rgba8888);
		let clut = [
			ColorTableEntry {
				slot: 0,
				color: state.bg,
			},
			ColorTableEntry {
				slot: 1,
				color: state.fg,
			},
		];
		for y in 0..bm.bounds.height() {
			for x in 0..bm.bounds.width() {
				let bit = (rows[y * row_len + x / 8] >> (7 - (x % 8))) & 1;
				source.put_rgba(x, y, clut[bit as usize].color.to_rgba32());
			}
		}
		blit(state, image, &source, bm.bounds, src_rect, dst_rect);
	}
	Ok(())
}

/// DirectBitsRect / DirectBitsRgn: a direct-color pixmap blit with no color
/// table.
fn op_direct_bits(
	state: &mut QuickDrawState,
	image: &mut Image,
	r: &mut ByteReader<'_>,
	opcode: u16,
) -> Result<(), ImageError> {
	let with_region = opcode == 0x009B;
	let pm = PixMap::parse(r, true)?;
	let src_rect = Rect::parse(&mut *r)?;
	let dst_rect = Rect::parse(&mut *r)?;
	let _mode = r.u16()?;
	if with_region {
		read_region(r)?;
	}
	let rows = pm.read_pixel_data(r)?;
	let source = pm.expand(&rows, None)?;
	blit(state, image, &source, pm.bounds, src_rect, dst_rect);
	Ok(())
}

/// Copies a decoded source into the canvas: `src_rect` selects pixels in the
/// source's bounds coordinates, `dst_rect` places them in picture
/// coordinates. Scaling blits copy the overlapping size unscaled.
fn blit(
	state: &mut QuickDrawState,
	image: &mut Image,
	source: &Image,
	bounds: Rect,
	src_rect: Rect,
	dst_rect: Rect,
) {
	state.drew_something = true;
	let copy_w = src_rect.width().min(dst_rect.width());
	let copy_h = src_rect.height().min(dst_rect.height());
	for dy in 0..copy_h {
		for dx in 0..copy_w {
			let sx = i32::from(src_rect.left) - i32::from(bounds.left) + dx as i32;
			let sy = i32::from(src_rect.top) - i32::from(bounds.top) + dy as i32;
			if sx < 0 || sy < 0 || sx as usize >= source.width() || sy as usize >= source.height()
			{
				continue;
			}
			let px = i32::from(dst_rect.left) + dx as i32;
			let py = i32::from(dst_rect.top) + dy as i32;
			if !state.clip.contains(px, py) {
				continue;
			}
			let cx = state.canvas_x(px);
			let cy = state.canvas_y(py);
			if image.check(i64::from(cx), i64::from(cy)) {
				image.put_rgba(cx as usize, cy as usize, source.get_rgba(sx as usize, sy as usize));
			}
		}
	}
}

/// LongComment: application payloads. `ph0t`/`ph00` comments carry an
/// alternate JPEG of the whole picture.
fn op_long_comment(state: &mut QuickDrawState, r: &mut ByteReader<'_>) -> Result<(), ImageError> {
	let _kind = r.u16()?;
	let size = r.u16()? as usize;
	let payload = r.read(size)?;
	if payload.len() >= 8 {
		let tag = TypeTag::new([payload[0], payload[1], payload[2], payload[3]]);
		if tag == TypeTag::new(*b"ph0t") || tag == TypeTag::new(*b"ph00") {
			state.embedded = Some((tag, payload[8..].to_vec()));
		}
	}
	Ok(())
}

/// CompressedQuickTime / UncompressedQuickTime: extract the embedded image
/// (JPEG or another QuickTime codec payload) unchanged.
fn op_quicktime(
	state: &mut QuickDrawState,
	r: &mut ByteReader<'_>,
	opcode: u16,
) -> Result<(), ImageError> {
	let payload_size = r.u32()? as usize;
	let payload_start = r.position();
	let mut p = r.sub(payload_start, payload_size)?;
	r.skip(payload_size)?;

	let _version = p.u16()?;
	p.skip(36)?; // transform matrix
	let matte_size = p.u32()? as usize;
	p.skip(8)?; // matte rect
	let _mode = p.u16()?;
	p.skip(8)?; // src rect
	let _accuracy = p.u32()?;
	let mask_size = p.u32()? as usize;
	p.skip(matte_size)?;
	p.skip(mask_size)?;

	if opcode == 0x8201 {
		// The uncompressed variant carries only matte data; drawing
		// continues with ordinary opcodes.
		return Ok(());
	}

	// ImageDescription: size, codec type, 28 bytes of codec metadata,
	// resolutions, data size, frame count, name, depth, clut id
	let idesc_start = p.position();
	let idesc_size = p.u32()? as usize;
	let codec = TypeTag(p.u32()?);
	p.skip(28)?;
	let _h_res = p.u32()?;
	let _v_res = p.u32()?;
	let data_size = p.u32()? as usize;
	if idesc_size < 86 {
		return Err(ImageError::MalformedResource {
			kind: "image description too small",
			context: format!("{idesc_size} bytes"),
		});
	}
	let data = p.peek(idesc_start + idesc_size, data_size)?;
	state.embedded = Some((codec, data.to_vec()));
	Ok(())
}
