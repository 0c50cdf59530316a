//! Container extraction scenarios, built from hand-assembled byte streams so
//! the parsers are checked against the documented layouts rather than our own
//! serializer.

use macrez_rs::rsrc::{Resource, ResourceSet, container, tags};

/// Builds a minimal single-resource fork by hand: one `STR ` id 128 named
/// "Hello" with the body `\x00\x05Hello`.
fn hand_built_fork() -> Vec<u8> {
	let body = b"\x00\x05Hello";
	let data_offset = 16u32;
	let data_size = 4 + body.len() as u32;
	let map_offset = data_offset + data_size;

	let mut out = Vec::new();
	out.extend_from_slice(&data_offset.to_be_bytes());
	out.extend_from_slice(&map_offset.to_be_bytes());
	out.extend_from_slice(&data_size.to_be_bytes());
	// map: 28-byte header + type list (2 + 8) + one reference (12) + name
	let map_size = 28 + 10 + 12 + 6u32;
	out.extend_from_slice(&map_size.to_be_bytes());

	// data segment
	out.extend_from_slice(&(body.len() as u32).to_be_bytes());
	out.extend_from_slice(body);

	// map header
	out.extend_from_slice(&[0u8; 16]);
	out.extend_from_slice(&0u32.to_be_bytes());
	out.extend_from_slice(&0u16.to_be_bytes());
	out.extend_from_slice(&0u16.to_be_bytes());
	out.extend_from_slice(&28u16.to_be_bytes()); // type list offset
	out.extend_from_slice(&50u16.to_be_bytes()); // name list offset

	// type list: one type
	out.extend_from_slice(&0u16.to_be_bytes()); // count - 1
	out.extend_from_slice(b"STR ");
	out.extend_from_slice(&0u16.to_be_bytes()); // count - 1 for this type
	out.extend_from_slice(&10u16.to_be_bytes()); // ref list offset from type list

	// reference list: id 128, named, attrs 0, body at data segment start
	out.extend_from_slice(&128i16.to_be_bytes());
	out.extend_from_slice(&0u16.to_be_bytes()); // name offset 0
	out.extend_from_slice(&0u32.to_be_bytes()); // attrs + body offset
	out.extend_from_slice(&0u32.to_be_bytes()); // reserved

	// name list
	out.push(5);
	out.extend_from_slice(b"Hello");
	out
}

fn assert_hello_set(set: &ResourceSet) {
	assert_eq!(set.len(), 1);
	let res = set.peek(tags::STR, 128).expect("STR 128 present");
	assert_eq!(res.name, "Hello");
	assert_eq!(res.data, b"\x00\x05Hello");
	assert_eq!(res.flags, 0);
}

#[test]
fn resource_fork_single_str() {
	let fork = hand_built_fork();
	let set = container::resource_fork::parse(&fork).unwrap();
	assert_hello_set(&set);
}

#[test]
fn resource_fork_via_auto_sniff() {
	let set = container::parse_auto(&hand_built_fork()).unwrap();
	assert_hello_set(&set);
}

#[test]
fn appledouble_resource_fork_extraction() {
	let fork = hand_built_fork();
	let mut file = Vec::new();
	file.extend_from_slice(&0x0005_1607u32.to_be_bytes());
	file.extend_from_slice(&0x0002_0000u32.to_be_bytes());
	file.extend_from_slice(&[0u8; 16]);
	file.extend_from_slice(&1u16.to_be_bytes());
	// one entry: resource fork right after the entry table
	let offset = (file.len() + 12) as u32;
	file.extend_from_slice(&2u32.to_be_bytes());
	file.extend_from_slice(&offset.to_be_bytes());
	file.extend_from_slice(&(fork.len() as u32).to_be_bytes());
	file.extend_from_slice(&fork);

	assert_eq!(container::sniff_format(&file), Some(container::IndexFormat::AppleSingle));
	let set = container::parse_auto(&file).unwrap();
	assert_hello_set(&set);
}

#[test]
fn serializer_roundtrip_reproduces_set() {
	// Reconstructed-serializer property: serialize then parse gives back an
	// identical set, including order, names, flags and bodies
	let mut set = ResourceSet::new();
	set.add(Resource::with_metadata(
		tags::STR,
		128,
		0,
		"Hello".to_string(),
		b"\x00\x05Hello".to_vec(),
	));
	set.add(Resource::new(tags::PICT, -400, vec![0xAB; 1000]));
	set.add(Resource::with_metadata(
		tags::CLUT,
		8,
		macrez_rs::rsrc::flags::PRELOAD,
		"Colors".to_string(),
		vec![],
	));

	let bytes = container::resource_fork::serialize(&set);
	let parsed = container::resource_fork::parse(&bytes).unwrap();
	assert_eq!(parsed.all(), set.all());
	for (type_tag, id) in set.all() {
		assert_eq!(parsed.peek(type_tag, id), set.peek(type_tag, id));
	}

	// ...and a second generation is byte-identical
	assert_eq!(container::resource_fork::serialize(&parsed), bytes);
}

#[test]
fn macbinary_wrapped_fork() {
	let fork = hand_built_fork();
	let mut header = vec![0u8; 0x80];
	header[1] = 5;
	header[2..7].copy_from_slice(b"Hello");
	header[0x41..0x45].copy_from_slice(b"APPL");
	header[0x45..0x49].copy_from_slice(b"test");
	header[0x57..0x5B].copy_from_slice(&(fork.len() as u32).to_be_bytes());
	let crc = container::macbinary::crc16(&header[..0x7C]);
	header[0x7C..0x7E].copy_from_slice(&crc.to_be_bytes());

	let mut file = header;
	file.extend_from_slice(&fork);

	let decoded = container::macbinary::parse(&file).unwrap();
	assert_eq!(decoded.file_name, "Hello");
	assert_hello_set(&decoded.resource_fork);
}

#[test]
fn declared_sizes_match_parsed_bodies() {
	// Property: for every resource, the parsed body length equals the size
	// declared in the container stream
	let mut set = ResourceSet::new();
	for id in 0..25i16 {
		set.add(Resource::new(tags::TEXT, id, vec![0x5A; (id as usize) * 31]));
	}
	let bytes = container::resource_fork::serialize(&set);
	let parsed = container::resource_fork::parse(&bytes).unwrap();
	for id in 0..25i16 {
		assert_eq!(parsed.peek(tags::TEXT, id).unwrap().data.len(), (id as usize) * 31);
	}
}
