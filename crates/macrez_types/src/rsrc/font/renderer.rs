//! Text rendering over a decoded bitmap font.
//!
//! The renderer is stateless: it borrows a [`DecodedFont`] and walks glyph
//! strikes pixel by pixel. Lines advance by `rect_height + leading`; the
//! trailing leading of the final line is not counted in measurements.

use crate::rsrc::{error::FontError, image::Image};

use super::{DecodedFont, Glyph};

/// Horizontal alignment for [`BitmapFontRenderer::render_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlignment {
	/// x offsets are relative to the left edge
	#[default]
	Left,
	/// x offsets are relative to the vertical midline
	Center,
	/// x offsets are negative, relative to the right edge
	Right,
}

/// Replaces classic Mac CR line endings with LF, in place of the decoded
/// text.
pub fn replace_cr_with_lf(text: &str) -> String {
	text.replace('\r', "\n")
}

/// Stateless renderer over a decoded font.
#[derive(Debug, Clone, Copy)]
pub struct BitmapFontRenderer<'a> {
	font: &'a DecodedFont,
}

impl<'a> BitmapFontRenderer<'a> {
	/// Creates a renderer for a font.
	pub fn new(font: &'a DecodedFont) -> Self {
		Self {
			font,
		}
	}

	/// The underlying font.
	pub fn font(&self) -> &DecodedFont {
		self.font
	}

	fn line_height(&self) -> usize {
		self.font.rect_height as usize + self.font.leading.max(0) as usize
	}

	/// Computes the pixel dimensions needed to render `text` as-is (explicit
	/// newlines only). The height counts the leading between lines but not
	/// after the last one.
	pub fn measure(&self, text: &str) -> (usize, usize) {
		if text.is_empty() {
			return (0, 0);
		}
		let mut max_width = 0usize;
		let mut line_width = 0usize;
		let mut num_lines = 1usize;
		for ch in text.chars() {
			if ch == '\n' {
				max_width = max_width.max(line_width);
				line_width = 0;
				num_lines += 1;
			} else {
				line_width += self.font.glyph_for_char(ch).advance as usize;
			}
		}
		max_width = max_width.max(line_width);
		let height = num_lines * self.line_height() - self.font.leading.max(0) as usize;
		(max_width, height)
	}

	/// Wraps text to fit within `max_width` pixels. Wrapping happens at
	/// spaces and immediately after hyphens; a word with no wrap point is
	/// broken mid-word. Explicit newlines are preserved. Fails with
	/// [`FontError::WidthTooSmall`] when a single glyph is wider than the
	/// target.
	pub fn wrap_to_pixel_width(&self, text: &str, max_width: usize) -> Result<String, FontError> {
		let chars: Vec<char> = text.chars().collect();
		let mut ret = String::new();
		let mut line_width_px = 0usize;
		let mut line_start = 0usize;
		let mut last_valid_wrap = 0usize;

		let commit = |ret: &mut String, from: usize, to: usize| {
			ret.extend(&chars[from..to]);
		};

		for offset in 0..chars.len() {
			let ch = chars[offset];

			// A space is a valid wrap point; so is the position right after
			// a hyphen.
			if ch == ' ' || (offset > 0 && chars[offset - 1] == '-') {
				last_valid_wrap = offset;
			}

			if ch == '\n' {
				commit(&mut ret, line_start, offset + 1);
				line_width_px = 0;
				line_start = offset + 1;
				last_valid_wrap = line_start;
				continue;
			}

			let glyph = self.font.glyph_for_char(ch);
			line_width_px += glyph.advance as usize;
			if line_width_px <= max_width {
				continue;
			}

			if line_start == offset {
				// Not even one glyph fits on an empty line
				return Err(FontError::WidthTooSmall {
					max_width,
					glyph: ch,
					glyph_width: glyph.advance as usize,
				});
			} else if last_valid_wrap > line_start && last_valid_wrap <= offset {
				// Wrap at the last space/hyphen; a space is replaced by the
				// newline, a hyphen stays
				commit(&mut ret, line_start, last_valid_wrap);
				ret.push('\n');
				line_start = last_valid_wrap + usize::from(chars[last_valid_wrap] == ' ');
				line_width_px =
					chars[line_start..=offset].iter().map(|&c| self.advance(c)).sum();
			} else {
				// No wrap point in this line; break the word here
				commit(&mut ret, line_start, offset);
				ret.push('\n');
				line_start = offset;
				last_valid_wrap = offset;
				line_width_px = glyph.advance as usize;
				if line_width_px > max_width {
					return Err(FontError::WidthTooSmall {
						max_width,
						glyph: ch,
						glyph_width: line_width_px,
					});
				}
			}
		}
		if line_start < chars.len() {
			commit(&mut ret, line_start, chars.len());
		}
		Ok(ret)
	}

	fn advance(&self, ch: char) -> usize {
		self.font.glyph_for_char(ch).advance as usize
	}

	/// Calls `write(x, y)` for every ink pixel of one glyph placed at
	/// `(x, y)`; returns the advance.
	fn render_glyph<F: FnMut(i64, i64)>(&self, glyph: &Glyph, x: i64, y: i64, write: &mut F) -> i64 {
		for py in 0..self.font.rect_height as i64 {
			for px in 0..glyph.bitmap_width as i64 {
				if self.font.strike_pixel((glyph.bitmap_offset as i64 + px) as usize, py as usize)
				{
					write(x + i64::from(glyph.pen_offset) + px, y + py);
				}
			}
		}
		i64::from(glyph.advance)
	}

	/// Calls `write(x, y)` for every ink pixel of `text`. With
	/// [`HorizontalAlignment::Left`] x starts at zero and grows; with
	/// `Right` x is negative relative to the right edge; with `Center` x is
	/// relative to each line's midline.
	pub fn render_text_custom<F: FnMut(i64, i64)>(
		&self,
		text: &str,
		align: HorizontalAlignment,
		write: &mut F,
	) {
		let line_height = self.line_height() as i64;
		let mut y = 0i64;
		for line in text.split('\n') {
			let (line_w, _) = self.measure(line);
			let mut x = match align {
				HorizontalAlignment::Left => 0i64,
				HorizontalAlignment::Center => -((line_w / 2) as i64),
				HorizontalAlignment::Right => -(line_w as i64),
			};
			for ch in line.chars() {
				let glyph = self.font.glyph_for_char(ch);
				x += self.render_glyph(glyph, x, y, write);
			}
			y += line_height;
		}
	}

	/// Renders `text` into `image`, clipped to the rectangle
	/// `[x1, x2) x [y1, y2)`. The alignment picks which edge the x
	/// coordinates grow from. The color is packed 0xRRGGBBAA.
	pub fn render_text(
		&self,
		image: &mut Image,
		text: &str,
		x1: i64,
		y1: i64,
		x2: i64,
		y2: i64,
		color: u32,
		align: HorizontalAlignment,
	) {
		let x_base = match align {
			HorizontalAlignment::Left => x1,
			HorizontalAlignment::Center => (x1 + x2) / 2,
			HorizontalAlignment::Right => x2,
		};
		self.render_text_custom(text, align, &mut |px, py| {
			let x = px + x_base;
			let y = py + y1;
			if x >= x1 && x < x2 && y >= y1 && y < y2 && image.check(x, y) {
				image.put_rgba(x as usize, y as usize, color);
			}
		});
	}

	/// Wraps `text` to `width` pixels and renders it into a fresh image.
	/// A zero `height` sizes the image to the wrapped text.
	pub fn wrap_and_render(
		&self,
		text: &str,
		width: usize,
		height: usize,
		color: u32,
		align: HorizontalAlignment,
	) -> Result<Image, FontError> {
		let wrapped = self.wrap_to_pixel_width(text, width)?;
		let (_, measured_h) = self.measure(&wrapped);
		let height = if height == 0 { measured_h } else { height };
		let mut image = Image::new(width, height, crate::rsrc::image::PixelFormat::Rgba8888);
		self.render_text(&mut image, &wrapped, 0, 0, width as i64, height as i64, color, align);
		Ok(image)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rsrc::font::{decode_font, test_font};

	// The test strike: 'A' advance 6 (5 px solid block), 'B' advance 4
	// (1 px column, pen offset 1), missing glyph advance 2, rect height 4,
	// leading 1.

	#[test]
	fn test_measure_single_line() {
		let font = decode_font(&test_font::build()).unwrap();
		let renderer = BitmapFontRenderer::new(&font);
		assert_eq!(renderer.measure(""), (0, 0));
		assert_eq!(renderer.measure("A"), (6, 4));
		assert_eq!(renderer.measure("AB"), (10, 4));
	}

	#[test]
	fn test_measure_multi_line_counts_inner_leading_only() {
		let font = decode_font(&test_font::build()).unwrap();
		let renderer = BitmapFontRenderer::new(&font);
		// two lines: 2 * 4 px of glyphs + 1 px leading between them
		assert_eq!(renderer.measure("A\nAB"), (10, 9));
	}

	#[test]
	fn test_render_single_glyph() {
		let font = decode_font(&test_font::build()).unwrap();
		let renderer = BitmapFontRenderer::new(&font);
		let mut image = Image::new_rgba_filled(8, 6, 0xFFFF_FFFF);
		renderer.render_text(
			&mut image,
			"A",
			0,
			0,
			8,
			6,
			0x0000_00FF,
			HorizontalAlignment::Left,
		);
		// the glyph box is black...
		for y in 0..4 {
			for x in 0..5 {
				assert_eq!(image.get_rgba(x, y), 0x0000_00FF, "({x},{y})");
			}
		}
		// ...and everything else stays white
		assert_eq!(image.get_rgba(5, 0), 0xFFFF_FFFF);
		assert_eq!(image.get_rgba(0, 4), 0xFFFF_FFFF);
	}

	#[test]
	fn test_render_applies_pen_offset() {
		let font = decode_font(&test_font::build()).unwrap();
		let renderer = BitmapFontRenderer::new(&font);
		let mut image = Image::new_rgba_filled(8, 4, 0xFFFF_FFFF);
		// B inks only its first strike column, drawn at pen offset 1
		renderer.render_text(
			&mut image,
			"B",
			0,
			0,
			8,
			4,
			0x0000_00FF,
			HorizontalAlignment::Left,
		);
		assert_eq!(image.get_rgba(0, 0), 0xFFFF_FFFF);
		assert_eq!(image.get_rgba(1, 0), 0x0000_00FF);
	}

	#[test]
	fn test_render_clips_to_rect() {
		let font = decode_font(&test_font::build()).unwrap();
		let renderer = BitmapFontRenderer::new(&font);
		let mut image = Image::new_rgba_filled(8, 4, 0xFFFF_FFFF);
		renderer.render_text(
			&mut image,
			"A",
			0,
			0,
			3,
			2,
			0x0000_00FF,
			HorizontalAlignment::Left,
		);
		assert_eq!(image.get_rgba(2, 1), 0x0000_00FF);
		assert_eq!(image.get_rgba(3, 1), 0xFFFF_FFFF);
		assert_eq!(image.get_rgba(0, 2), 0xFFFF_FFFF);
	}

	#[test]
	fn test_right_alignment_renders_from_right_edge() {
		let font = decode_font(&test_font::build()).unwrap();
		let renderer = BitmapFontRenderer::new(&font);
		let mut image = Image::new_rgba_filled(10, 4, 0xFFFF_FFFF);
		renderer.render_text(
			&mut image,
			"A",
			0,
			0,
			10,
			4,
			0x0000_00FF,
			HorizontalAlignment::Right,
		);
		// advance 6 from the right edge puts the 5-px block at x = 4..9
		assert_eq!(image.get_rgba(4, 0), 0x0000_00FF);
		assert_eq!(image.get_rgba(8, 0), 0x0000_00FF);
		assert_eq!(image.get_rgba(9, 0), 0xFFFF_FFFF);
	}

	#[test]
	fn test_wrap_at_space() {
		let font = decode_font(&test_font::build()).unwrap();
		let renderer = BitmapFontRenderer::new(&font);
		// "AA AA" with width for exactly two glyphs
		let wrapped = renderer.wrap_to_pixel_width("AA AA", 12).unwrap();
		assert_eq!(wrapped, "AA\nAA");
	}

	#[test]
	fn test_wrap_after_hyphen() {
		let font = decode_font(&test_font::build()).unwrap();
		let renderer = BitmapFontRenderer::new(&font);
		// hyphen is the missing glyph (advance 2); "AA-" is 14 px
		let wrapped = renderer.wrap_to_pixel_width("AA-AA B", 14).unwrap();
		assert_eq!(wrapped, "AA-\nAA\nB");
	}

	#[test]
	fn test_wrap_breaks_long_word() {
		let font = decode_font(&test_font::build()).unwrap();
		let renderer = BitmapFontRenderer::new(&font);
		let wrapped = renderer.wrap_to_pixel_width("AAAA", 12).unwrap();
		assert_eq!(wrapped, "AA\nAA");
	}

	#[test]
	fn test_wrap_preserves_explicit_newlines() {
		let font = decode_font(&test_font::build()).unwrap();
		let renderer = BitmapFontRenderer::new(&font);
		let wrapped = renderer.wrap_to_pixel_width("A\nA", 20).unwrap();
		assert_eq!(wrapped, "A\nA");
	}

	#[test]
	fn test_wrap_width_too_small() {
		let font = decode_font(&test_font::build()).unwrap();
		let renderer = BitmapFontRenderer::new(&font);
		assert!(matches!(
			renderer.wrap_to_pixel_width("A", 5),
			Err(FontError::WidthTooSmall {
				max_width: 5,
				glyph: 'A',
				..
			})
		));
	}

	#[test]
	fn test_wrapped_lines_fit_width() {
		// Property: every wrapped line measures at most the target width
		let font = decode_font(&test_font::build()).unwrap();
		let renderer = BitmapFontRenderer::new(&font);
		let wrapped = renderer.wrap_to_pixel_width("AB AB ABAB A B A", 13).unwrap();
		for line in wrapped.split('\n') {
			assert!(renderer.measure(line).0 <= 13, "line {line:?} too wide");
		}
	}

	#[test]
	fn test_wrap_and_render_auto_height() {
		let font = decode_font(&test_font::build()).unwrap();
		let renderer = BitmapFontRenderer::new(&font);
		let image = renderer
			.wrap_and_render("AA AA", 12, 0, 0x0000_00FF, HorizontalAlignment::Left)
			.unwrap();
		assert_eq!(image.width(), 12);
		assert_eq!(image.height(), 9); // two 4-px lines + 1 px leading
	}

	#[test]
	fn test_replace_cr_with_lf() {
		assert_eq!(replace_cr_with_lf("a\rb\nc"), "a\nb\nc");
	}
}
