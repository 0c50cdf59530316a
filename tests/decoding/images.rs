//! Image decoding scenarios: PackBits, PICT and the icon family.

use macrez_rs::rsrc::image::{packbits, pict, pixmap};
use macrez_rs::rsrc::{Resource, ResourceSet, image::icons, tags};

#[test]
fn packbits_mixed_runs() {
	// repeat 'A' x3, literal "AAAA", no-op, repeat 'B' x3
	let data = b"\xFE\x41\x03AAAA\x80\xFE\x42";
	let out = packbits::unpack_all(data, 10).unwrap();
	assert_eq!(out, b"AAAAAAABBB");
}

#[test]
fn packbits_encoder_decoder_inverse() {
	let rows: &[&[u8]] = &[
		b"\x00\x00\x00\x00\x00\x00\x00\x00",
		b"deadbeefdeadbeef",
		&[0xABu8; 4096],
		&(0..=255u8).collect::<Vec<u8>>(),
	];
	for row in rows {
		let packed = packbits::pack(row);
		assert_eq!(&packbits::unpack_all(&packed, row.len()).unwrap(), row);
	}
}

/// Builds a v2 PICT wrapping a single DirectBitsRect of a 4x4 24-bit image
/// whose rows are red, green, blue, white columns.
fn direct_bits_pict() -> Vec<u8> {
	let mut body = Vec::new();
	body.extend_from_slice(&0x009Au16.to_be_bytes());
	body.extend_from_slice(&0x0000_00FFu32.to_be_bytes()); // base addr
	body.extend_from_slice(&(16u16 | pixmap::ROW_BYTES_PIXMAP_FLAG).to_be_bytes());
	for v in [0i16, 0, 4, 4] {
		body.extend_from_slice(&v.to_be_bytes()); // bounds
	}
	body.extend_from_slice(&0u16.to_be_bytes()); // pmVersion
	body.extend_from_slice(&2u16.to_be_bytes()); // packType 2: raw 24-bit
	body.extend_from_slice(&0u32.to_be_bytes()); // packSize
	body.extend_from_slice(&0x0048_0000u32.to_be_bytes()); // hRes
	body.extend_from_slice(&0x0048_0000u32.to_be_bytes()); // vRes
	body.extend_from_slice(&16u16.to_be_bytes()); // pixelType: direct
	body.extend_from_slice(&32u16.to_be_bytes()); // pixelSize
	body.extend_from_slice(&3u16.to_be_bytes()); // cmpCount
	body.extend_from_slice(&8u16.to_be_bytes()); // cmpSize
	body.extend_from_slice(&[0u8; 12]); // planeBytes, pmTable, pmReserved
	for v in [0i16, 0, 4, 4] {
		body.extend_from_slice(&v.to_be_bytes()); // src rect
	}
	for v in [0i16, 0, 4, 4] {
		body.extend_from_slice(&v.to_be_bytes()); // dst rect
	}
	body.extend_from_slice(&0u16.to_be_bytes()); // mode
	for _ in 0..4 {
		body.extend_from_slice(&[0xFF, 0x00, 0x00]);
		body.extend_from_slice(&[0x00, 0xFF, 0x00]);
		body.extend_from_slice(&[0x00, 0x00, 0xFF]);
		body.extend_from_slice(&[0xFF, 0xFF, 0xFF]);
	}

	let mut out = Vec::new();
	out.extend_from_slice(&0u16.to_be_bytes()); // picture size (ignored)
	for v in [0i16, 0, 4, 4] {
		out.extend_from_slice(&v.to_be_bytes()); // frame
	}
	out.extend_from_slice(&0x0011u16.to_be_bytes());
	out.extend_from_slice(&0x02FFu16.to_be_bytes());
	out.extend_from_slice(&0x0C00u16.to_be_bytes());
	out.extend_from_slice(&[0u8; 24]);
	out.extend_from_slice(&body);
	out.extend_from_slice(&0x00FFu16.to_be_bytes());
	out
}

#[test]
fn pict_v2_direct_bits_square() {
	let decoded = pict::decode_pict(&direct_bits_pict()).unwrap();
	assert_eq!(decoded.image.width(), 4);
	assert_eq!(decoded.image.height(), 4);
	assert!(decoded.embedded_format.is_none());
	for y in 0..4 {
		assert_eq!(decoded.image.get_rgba(0, y), 0xFF00_00FF, "red column, row {y}");
		assert_eq!(decoded.image.get_rgba(1, y), 0x00FF_00FF, "green column, row {y}");
		assert_eq!(decoded.image.get_rgba(2, y), 0x0000_FFFF, "blue column, row {y}");
		assert_eq!(decoded.image.get_rgba(3, y), 0xFFFF_FFFF, "white column, row {y}");
	}
}

#[test]
fn pict_decoded_through_resource_set() {
	let mut set = ResourceSet::new();
	set.add(Resource::new(tags::PICT, 128, direct_bits_pict()));
	let res = set.get(tags::PICT, 128, 0).unwrap();
	let decoded = pict::decode_pict(&res.data).unwrap();
	assert_eq!(decoded.image.get_rgba(3, 3), 0xFFFF_FFFF);
}

#[test]
fn indexed_icon_with_companion_mask() {
	// icl8 128 paired with ICN# 128: mask hides the right half
	let mut set = ResourceSet::new();
	set.add(Resource::new(tags::ICL8, 128, vec![0xFFu8; 1024])); // all black
	let mut pair = vec![0u8; 128]; // image plane (unused by icl8)
	for _row in 0..32 {
		pair.extend_from_slice(&[0xFF, 0xFF, 0x00, 0x00]); // mask: left half
	}
	set.add(Resource::new(tags::ICNN, 128, pair));

	let image = icons::decode_icon_from_set(&mut set, tags::ICL8, 128).unwrap();
	assert_eq!(image.get_rgba(0, 0), 0x0000_00FF);
	assert_eq!(image.get_rgba(15, 31), 0x0000_00FF);
	assert_eq!(image.get_rgba(16, 0), 0x0000_0000);
	assert_eq!(image.get_rgba(31, 31), 0x0000_0000);
}

#[test]
fn indexed_icon_without_mask_is_opaque() {
	let mut set = ResourceSet::new();
	set.add(Resource::new(tags::ICS4, 200, vec![0x00u8; 128])); // all white
	let image = icons::decode_icon_from_set(&mut set, tags::ICS4, 200).unwrap();
	assert_eq!(image.width(), 16);
	assert_eq!(image.get_rgba(8, 8), 0xFFFF_FFFF);
}

#[test]
fn clut_emits_declared_entry_count() {
	// Property: decoded palette length is always ctSize + 1
	use macrez_rs::rsrc::image::palette;
	for count in [1usize, 2, 16, 256] {
		let mut data = Vec::new();
		data.extend_from_slice(&0u32.to_be_bytes());
		data.extend_from_slice(&0u16.to_be_bytes());
		data.extend_from_slice(&((count as i16) - 1).to_be_bytes());
		for slot in 0..count {
			data.extend_from_slice(&(slot as u16).to_be_bytes());
			data.extend_from_slice(&0x8000u16.to_be_bytes());
			data.extend_from_slice(&0x8000u16.to_be_bytes());
			data.extend_from_slice(&0x8000u16.to_be_bytes());
		}
		assert_eq!(palette::decode_clut(&data).unwrap().len(), count);
	}
}
