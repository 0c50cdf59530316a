//! Benchmark helper utilities for `macrez-rs`.
//!
//! Provides synthetic container and image fixtures so the decoding
//! benchmarks run without any real game assets checked in.

/// Generates PackBits data that decodes to `len` bytes, alternating runs
/// and literal stretches to exercise both decoder paths.
pub fn generate_packbits_data(len: usize) -> Vec<u8> {
	let mut plain = Vec::with_capacity(len);
	let mut value = 0u8;
	while plain.len() < len {
		// a run...
		let run_len = 3 + (plain.len() % 60);
		for _ in 0..run_len.min(len - plain.len()) {
			plain.push(value);
		}
		// ...then a literal stretch
		for i in 0..16usize {
			if plain.len() >= len {
				break;
			}
			plain.push(value.wrapping_add(i as u8).wrapping_mul(31));
		}
		value = value.wrapping_add(1);
	}
	macrez_types::rsrc::image::packbits::pack(&plain)
}

/// Generates a v2 PICT that fills `size` x `size` pixels with pattern
/// rectangles and blits one packed 8-bit pixmap, roughly matching the
/// opcode mix of an icon-heavy picture.
pub fn generate_test_pict(size: i16) -> Vec<u8> {
	let mut body = Vec::new();

	// a few pattern fills
	for step in 0..4i16 {
		body.extend_from_slice(&0x0009u16.to_be_bytes()); // PnPat
		body.extend_from_slice(&[0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x55]);
		body.extend_from_slice(&0x0031u16.to_be_bytes()); // paintRect
		for v in [step * 4, step * 4, size, size] {
			body.extend_from_slice(&v.to_be_bytes());
		}
	}

	// one PackBitsRect with an inline grayscale color table
	let width = size as usize;
	let row_bytes = width.max(8);
	body.extend_from_slice(&0x0098u16.to_be_bytes());
	body.extend_from_slice(
		&((row_bytes as u16) | macrez_types::rsrc::image::pixmap::ROW_BYTES_PIXMAP_FLAG)
			.to_be_bytes(),
	);
	for v in [0i16, 0, size, size] {
		body.extend_from_slice(&v.to_be_bytes());
	}
	body.extend_from_slice(&0u16.to_be_bytes()); // pmVersion
	body.extend_from_slice(&0u16.to_be_bytes()); // packType default
	body.extend_from_slice(&0u32.to_be_bytes());
	body.extend_from_slice(&0x0048_0000u32.to_be_bytes());
	body.extend_from_slice(&0x0048_0000u32.to_be_bytes());
	body.extend_from_slice(&0u16.to_be_bytes());
	body.extend_from_slice(&8u16.to_be_bytes()); // pixelSize
	body.extend_from_slice(&1u16.to_be_bytes());
	body.extend_from_slice(&8u16.to_be_bytes());
	body.extend_from_slice(&[0u8; 12]);
	// 256-entry grayscale clut
	body.extend_from_slice(&0u32.to_be_bytes());
	body.extend_from_slice(&0u16.to_be_bytes());
	body.extend_from_slice(&255i16.to_be_bytes());
	for i in 0..=255u16 {
		body.extend_from_slice(&i.to_be_bytes());
		for _ in 0..3 {
			body.extend_from_slice(&(i << 8).to_be_bytes());
		}
	}
	for v in [0i16, 0, size, size] {
		body.extend_from_slice(&v.to_be_bytes());
	}
	for v in [0i16, 0, size, size] {
		body.extend_from_slice(&v.to_be_bytes());
	}
	body.extend_from_slice(&0u16.to_be_bytes());
	for y in 0..size as usize {
		let row: Vec<u8> = (0..row_bytes).map(|x| ((x * 7 + y * 13) & 0xFF) as u8).collect();
		let packed = macrez_types::rsrc::image::packbits::pack(&row);
		if row_bytes > 250 {
			body.extend_from_slice(&(packed.len() as u16).to_be_bytes());
		} else {
			body.push(packed.len() as u8);
		}
		body.extend_from_slice(&packed);
	}

	let mut out = Vec::new();
	out.extend_from_slice(&0u16.to_be_bytes());
	for v in [0i16, 0, size, size] {
		out.extend_from_slice(&v.to_be_bytes());
	}
	out.extend_from_slice(&0x0011u16.to_be_bytes());
	out.extend_from_slice(&0x02FFu16.to_be_bytes());
	out.extend_from_slice(&0x0C00u16.to_be_bytes());
	out.extend_from_slice(&[0u8; 24]);
	out.extend_from_slice(&body);
	out.extend_from_slice(&0x00FFu16.to_be_bytes());
	out
}

/// Common benchmark sizes.
pub mod sizes {
	/// Small icon-sized picture
	pub const ICON: i16 = 32;
	/// Window-sized picture
	pub const WINDOW: i16 = 256;
	/// Full-screen picture
	pub const SCREEN: i16 = 512;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_generated_packbits_roundtrips() {
		let packed = generate_packbits_data(4096);
		let out =
			macrez_types::rsrc::image::packbits::unpack_all(&packed, 4096).unwrap();
		assert_eq!(out.len(), 4096);
	}

	#[test]
	fn test_generated_pict_decodes() {
		let pict = generate_test_pict(sizes::ICON);
		let decoded = macrez_types::rsrc::image::pict::decode_pict(&pict).unwrap();
		assert_eq!(decoded.image.width(), 32);
	}
}
