//! Directory-on-disk containers.
//!
//! The on-disk layout mirrors what `rezdump` writes: a directory whose
//! first-level children are directories named after resource types, each
//! containing files named `ID.bin` or `ID_Name.bin`. Bytes that are not
//! filename-safe ASCII are escaped as `%XX` in both type and name
//! components.

use std::path::Path;

use crate::rsrc::{
	Resource, ResourceSet, TypeTag,
	error::ContainerError,
	text::{decode_mac_roman, encode_mac_roman},
};

/// Escapes raw Mac-Roman bytes for use as a filename component.
pub fn escape_filename(raw: &[u8]) -> String {
	let mut out = String::new();
	for &b in raw {
		let safe = b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_' | b' ' | b'!');
		if safe && b != b'%' {
			out.push(b as char);
		} else {
			out.push_str(&format!("%{b:02X}"));
		}
	}
	out
}

/// Reverses [`escape_filename`]. Invalid escapes pass through unchanged.
pub fn unescape_filename(escaped: &str) -> Vec<u8> {
	let bytes = escaped.as_bytes();
	let mut out = Vec::with_capacity(bytes.len());
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'%'
			&& i + 2 < bytes.len()
			&& let Ok(digits) = std::str::from_utf8(&bytes[i + 1..i + 3])
			&& let Ok(value) = u8::from_str_radix(digits, 16)
		{
			out.push(value);
			i += 3;
		} else {
			out.push(bytes[i]);
			i += 1;
		}
	}
	out
}

/// The filename (without directory) a resource is stored under.
pub fn filename_for_resource(res: &Resource) -> String {
	if res.name.is_empty() {
		format!("{}.bin", res.id)
	} else {
		format!("{}_{}.bin", res.id, escape_filename(&encode_mac_roman(&res.name)))
	}
}

fn type_for_dir_name(name: &str) -> Result<TypeTag, ContainerError> {
	let raw = unescape_filename(name);
	if raw.is_empty() || raw.len() > 4 {
		return Err(ContainerError::Malformed {
			kind: "invalid type directory name",
			context: name.to_string(),
		});
	}
	let mut bytes = [b' '; 4];
	bytes[..raw.len()].copy_from_slice(&raw);
	Ok(TypeTag::new(bytes))
}

/// Loads a resource set from a `TYPE/ID[_NAME].bin` directory tree.
pub fn load(dir_path: &Path) -> Result<ResourceSet, ContainerError> {
	let mut set = ResourceSet::new();

	for type_entry in std::fs::read_dir(dir_path)? {
		let type_entry = type_entry?;
		if !type_entry.file_type()?.is_dir() {
			continue;
		}
		let type_name = type_entry.file_name().to_string_lossy().into_owned();
		let type_tag = type_for_dir_name(&type_name)?;

		for res_entry in std::fs::read_dir(type_entry.path())? {
			let res_entry = res_entry?;
			if !res_entry.file_type()?.is_file() {
				continue;
			}
			let file_name = res_entry.file_name().to_string_lossy().into_owned();
			let Some(stem) = file_name.strip_suffix(".bin") else {
				continue;
			};

			let digits_len = stem
				.char_indices()
				.take_while(|(i, c)| c.is_ascii_digit() || (*i == 0 && *c == '-'))
				.count();
			let id: i32 = stem[..digits_len].parse().map_err(|_| ContainerError::Malformed {
				kind: "invalid resource filename",
				context: format!("{type_name}/{file_name}"),
			})?;
			if !(-0x8000..=0x7FFF).contains(&id) {
				return Err(ContainerError::Malformed {
					kind: "resource id out of range",
					context: format!("{type_name}/{file_name}"),
				});
			}

			let name = match stem[digits_len..].strip_prefix('_') {
				Some(escaped) => decode_mac_roman(&unescape_filename(escaped)),
				None if stem.len() == digits_len => String::new(),
				None => {
					return Err(ContainerError::Malformed {
						kind: "invalid resource filename",
						context: format!("{type_name}/{file_name} (missing separator)"),
					});
				}
			};

			let data = std::fs::read(res_entry.path())?;
			set.add(Resource::with_metadata(type_tag, id as i16, 0, name, data));
		}
	}

	Ok(set)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rsrc::tags;

	#[test]
	fn test_escape_roundtrip() {
		let raw: Vec<u8> = vec![b'H', b'i', b'/', 0xB5, b'%', b'_'];
		let escaped = escape_filename(&raw);
		assert_eq!(escaped, "Hi%2F%B5%25_");
		assert_eq!(unescape_filename(&escaped), raw);
	}

	#[test]
	fn test_filename_for_resource() {
		let unnamed = Resource::new(tags::PICT, 128, vec![]);
		assert_eq!(filename_for_resource(&unnamed), "128.bin");

		let named =
			Resource::with_metadata(tags::PICT, -7, 0, "Main/Title".to_string(), vec![]);
		assert_eq!(filename_for_resource(&named), "-7_Main%2FTitle.bin");
	}

	#[test]
	fn test_type_dir_name_padding() {
		assert_eq!(type_for_dir_name("snd").unwrap(), TypeTag::new(*b"snd "));
		assert_eq!(type_for_dir_name("PICT").unwrap(), tags::PICT);
		assert!(type_for_dir_name("TOOLONG").is_err());
	}

	#[test]
	fn test_load_tree() {
		let dir = std::env::temp_dir().join(format!("macrez_dir_test_{}", std::process::id()));
		let pict_dir = dir.join("PICT");
		std::fs::create_dir_all(&pict_dir).unwrap();
		std::fs::write(pict_dir.join("128.bin"), [1, 2, 3]).unwrap();
		std::fs::write(pict_dir.join("129_Splash.bin"), [4]).unwrap();

		let set = load(&dir).unwrap();
		assert_eq!(set.peek(tags::PICT, 128).unwrap().data, vec![1, 2, 3]);
		let named = set.peek(tags::PICT, 129).unwrap();
		assert_eq!(named.name, "Splash");
		assert_eq!(named.data, vec![4]);

		std::fs::remove_dir_all(&dir).unwrap();
	}
}
