//! Font strike decoding and text rendering scenarios.

use macrez_rs::rsrc::font::{
	decode_font,
	renderer::{BitmapFontRenderer, HorizontalAlignment},
};
use macrez_rs::rsrc::image::Image;

/// Builds a strike covering the printable ASCII range with per-character
/// advances chosen by `advance_for`. Every glyph's strike slice is fully
/// inked and pen offsets are zero. With `overhang` the strike slices are one
/// pixel narrower than the advance (the usual inter-glyph gap); without it
/// they match exactly.
fn build_font(advance_for: &dyn Fn(u8) -> u8, overhang: bool) -> Vec<u8> {
	const FIRST: u8 = 0x20;
	const LAST: u8 = 0x7A;

	// locations: cumulative slice widths, missing glyph 4 px, sentinel
	let mut locations = Vec::new();
	let mut x = 0u16;
	for code in FIRST..=LAST {
		locations.push(x);
		let advance = u16::from(advance_for(code));
		x += if overhang { advance - 1 } else { advance };
	}
	locations.push(x); // missing glyph start
	x += 4;
	locations.push(x); // sentinel

	let strike_width = x as usize;
	let row_words = strike_width.div_ceil(16) as u16;
	let rect_height = 4u16;

	let mut out = Vec::new();
	out.extend_from_slice(&0x9000u16.to_be_bytes()); // font type, 1-bit
	out.extend_from_slice(&u16::from(FIRST).to_be_bytes());
	out.extend_from_slice(&u16::from(LAST).to_be_bytes());
	out.extend_from_slice(&16u16.to_be_bytes()); // max width
	out.extend_from_slice(&0i16.to_be_bytes()); // max kerning
	out.extend_from_slice(&0i16.to_be_bytes()); // nDescent
	out.extend_from_slice(&16u16.to_be_bytes()); // rect width
	out.extend_from_slice(&rect_height.to_be_bytes());
	// offset/width table location, in words from its own field at offset 16
	let bitmap_bytes = usize::from(row_words) * 2 * usize::from(rect_height);
	let loc_table_bytes = locations.len() * 2;
	let ow_words = ((26 - 16) + bitmap_bytes + loc_table_bytes) / 2;
	out.extend_from_slice(&(ow_words as u16).to_be_bytes());
	out.extend_from_slice(&3i16.to_be_bytes()); // ascent
	out.extend_from_slice(&1i16.to_be_bytes()); // descent
	out.extend_from_slice(&1i16.to_be_bytes()); // leading
	out.extend_from_slice(&row_words.to_be_bytes());

	// strike: every pixel inked
	out.resize(out.len() + bitmap_bytes, 0xFF);

	for loc in &locations {
		out.extend_from_slice(&loc.to_be_bytes());
	}
	for code in FIRST..=LAST {
		// offset 0 in the high byte, advance in the low byte
		out.extend_from_slice(&u16::from(advance_for(code)).to_be_bytes());
	}
	out.extend_from_slice(&0x0004u16.to_be_bytes()); // missing glyph
	out.extend_from_slice(&0xFFFFu16.to_be_bytes()); // sentinel
	out
}

#[test]
fn glyph_box_renders_black_on_white() {
	// Glyph 'A': 5-px strike slice, advance 6, pen offset 0
	let data = build_font(&|code| if code == b'A' { 6 } else { 4 }, true);
	let font = decode_font(&data).unwrap();
	let glyph = font.glyph_for_char('A');
	assert_eq!(glyph.bitmap_width, 5);
	assert_eq!(glyph.advance, 6);
	assert_eq!(glyph.pen_offset, 0);

	let renderer = BitmapFontRenderer::new(&font);
	let mut image = Image::new_rgba_filled(10, 6, 0xFFFF_FFFF);
	renderer.render_text(&mut image, "A", 0, 0, 10, 6, 0x0000_00FF, HorizontalAlignment::Left);

	for y in 0..6usize {
		for x in 0..10usize {
			let inside = x < glyph.bitmap_width as usize && y < font.rect_height as usize;
			let expected = if inside { 0x0000_00FF } else { 0xFFFF_FFFF };
			assert_eq!(image.get_rgba(x, y), expected, "pixel ({x},{y})");
		}
	}
}

#[test]
fn wrap_breaks_after_hyphen() {
	// The hyphenated prefix is wide, the rest narrow, so wrapping at the
	// width of "multi-" yields exactly two lines
	let data = build_font(
		&|code| {
			if b"multi-".contains(&code) {
				10
			} else {
				4
			}
		},
		true,
	);
	let font = decode_font(&data).unwrap();
	let renderer = BitmapFontRenderer::new(&font);

	let (prefix_width, _) = renderer.measure("multi-");
	assert_eq!(prefix_width, 60);

	let wrapped = renderer.wrap_to_pixel_width("multi-word example", prefix_width).unwrap();
	assert_eq!(wrapped, "multi-\nword example");
}

#[test]
fn wrapped_lines_never_exceed_target() {
	let data = build_font(&|_| 7, true);
	let font = decode_font(&data).unwrap();
	let renderer = BitmapFontRenderer::new(&font);

	let text = "the quick brown fox jumps over the lazy dog";
	for width in [21usize, 35, 70, 140] {
		let wrapped = renderer.wrap_to_pixel_width(text, width).unwrap();
		for line in wrapped.split('\n') {
			assert!(
				renderer.measure(line).0 <= width,
				"width {width}: line {line:?} measures {}",
				renderer.measure(line).0
			);
		}
	}
}

#[test]
fn measure_bounds_rendered_pixels() {
	// With slices exactly as wide as their advances, measure() matches the
	// bounding box of the rendered pixels; the leading after the final line
	// is not counted
	let data = build_font(&|_| 5, false);
	let font = decode_font(&data).unwrap();
	let renderer = BitmapFontRenderer::new(&font);

	let text = "ab\ncde";
	let (w, h) = renderer.measure(text);
	assert_eq!(w, 15);
	assert_eq!(h, 9); // 4 + 1 leading + 4

	let mut image = Image::new(32, 32, macrez_rs::rsrc::image::PixelFormat::Rgba8888);
	renderer.render_text(
		&mut image,
		text,
		0,
		0,
		32,
		32,
		0xFF00_00FF,
		HorizontalAlignment::Left,
	);
	let mut max_x = 0usize;
	let mut max_y = 0usize;
	for y in 0..32 {
		for x in 0..32 {
			if image.get_rgba(x, y) != 0 {
				max_x = max_x.max(x + 1);
				max_y = max_y.max(y + 1);
			}
		}
	}
	assert_eq!(max_x, w);
	assert_eq!(max_y, h);
}

#[test]
fn center_alignment_is_symmetric() {
	let data = build_font(&|_| 4, false);
	let font = decode_font(&data).unwrap();
	let renderer = BitmapFontRenderer::new(&font);

	let mut image = Image::new(20, 4, macrez_rs::rsrc::image::PixelFormat::Rgba8888);
	renderer.render_text(
		&mut image,
		"ab",
		0,
		0,
		20,
		4,
		0xFFFF_FFFF,
		HorizontalAlignment::Center,
	);
	// 8 px of glyphs centered in 20 px: columns 6..14 inked
	assert_eq!(image.get_rgba(5, 0), 0);
	assert_ne!(image.get_rgba(6, 0), 0);
	assert_ne!(image.get_rgba(13, 0), 0);
	assert_eq!(image.get_rgba(14, 0), 0);
}
