//! In-memory indexed collection of raw resources.
//!
//! A [`ResourceSet`] owns every resource body parsed out of a container.
//! Decoders borrow bodies from the set; the only mutations after construction
//! are [`ResourceSet::add`] and the lazy decompression write-back performed by
//! [`ResourceSet::get`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::warn;

use crate::rsrc::{
	TypeTag,
	compress::{self, CodeExecutor, dispatch_flags},
	flags,
};

/// A raw resource record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
	/// Resource type tag
	pub type_tag: TypeTag,
	/// Resource id
	pub id: i16,
	/// Attribute flags; see [`crate::rsrc::flags`]
	pub flags: u16,
	/// Resource name, already decoded from Mac-Roman (may be empty)
	pub name: String,
	/// Resource body. Once the set has decompressed a compressed resource,
	/// this holds the decompressed bytes.
	pub data: Vec<u8>,
}

impl Resource {
	/// Creates an unnamed resource with no attribute flags.
	pub fn new(type_tag: TypeTag, id: i16, data: Vec<u8>) -> Self {
		Self {
			type_tag,
			id,
			flags: 0,
			name: String::new(),
			data,
		}
	}

	/// Creates a resource with explicit flags and name.
	pub fn with_metadata(
		type_tag: TypeTag,
		id: i16,
		flags: u16,
		name: String,
		data: Vec<u8>,
	) -> Self {
		Self {
			type_tag,
			id,
			flags,
			name,
			data,
		}
	}

	/// Whether this resource still needs a decompression attempt before its
	/// body is usable.
	pub fn needs_decompression(&self) -> bool {
		self.flags & flags::COMPRESSED != 0
			&& self.flags & (flags::DECOMPRESSED | flags::DECOMPRESSION_FAILED) == 0
	}
}

/// Typed, id-keyed resource collection with a secondary name index.
pub struct ResourceSet {
	resources: BTreeMap<(TypeTag, i16), Resource>,
	// name -> keys, in insertion order; lookups take the first entry
	name_index: HashMap<String, Vec<(TypeTag, i16)>>,
	executor: Option<Box<dyn CodeExecutor>>,
}

impl ResourceSet {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self {
			resources: BTreeMap::new(),
			name_index: HashMap::new(),
			executor: None,
		}
	}

	/// Number of resources in the set.
	pub fn len(&self) -> usize {
		self.resources.len()
	}

	/// Whether the set contains no resources.
	pub fn is_empty(&self) -> bool {
		self.resources.is_empty()
	}

	/// Installs the code executor used to run `dcmp`/`ncmp` decompressors.
	pub fn set_executor(&mut self, executor: Box<dyn CodeExecutor>) {
		self.executor = Some(executor);
	}

	/// Inserts a resource. A resource with the same `(type, id)` key is
	/// replaced and the name index is updated to match.
	pub fn add(&mut self, res: Resource) {
		let key = (res.type_tag, res.id);
		if let Some(old) = self.resources.get(&key)
			&& !old.name.is_empty()
			&& old.name != res.name
			&& let Some(keys) = self.name_index.get_mut(&old.name)
		{
			keys.retain(|k| *k != key);
		}
		if !res.name.is_empty() {
			let keys = self.name_index.entry(res.name.clone()).or_default();
			if !keys.contains(&key) {
				keys.push(key);
			}
		}
		self.resources.insert(key, res);
	}

	/// Whether a resource with this key exists.
	pub fn exists(&self, type_tag: TypeTag, id: i16) -> bool {
		self.resources.contains_key(&(type_tag, id))
	}

	/// Whether a resource of this type with this name exists.
	pub fn exists_named(&self, type_tag: TypeTag, name: &str) -> bool {
		self.key_for_name(type_tag, name).is_some()
	}

	/// Borrows a resource without attempting decompression.
	pub fn peek(&self, type_tag: TypeTag, id: i16) -> Option<&Resource> {
		self.resources.get(&(type_tag, id))
	}

	/// Borrows a resource, lazily decompressing it first if it carries the
	/// compressed flag. Decompression happens at most once per resource: the
	/// outcome is recorded in the synthesized flag bits and later calls skip
	/// the attempt.
	pub fn get(&mut self, type_tag: TypeTag, id: i16, dispatch: u64) -> Option<&Resource> {
		self.materialize((type_tag, id), dispatch);
		self.resources.get(&(type_tag, id))
	}

	/// Like [`ResourceSet::get`], but looks the resource up by name. When
	/// several resources of this type share the name, the first inserted one
	/// wins.
	pub fn get_named(&mut self, type_tag: TypeTag, name: &str, dispatch: u64) -> Option<&Resource> {
		let key = self.key_for_name(type_tag, name)?;
		self.materialize(key, dispatch);
		self.resources.get(&key)
	}

	/// All ids of the given type, ascending.
	pub fn all_of_type(&self, type_tag: TypeTag) -> Vec<i16> {
		self.resources
			.range((type_tag, i16::MIN)..=(type_tag, i16::MAX))
			.map(|((_, id), _)| *id)
			.collect()
	}

	/// All `(type, id)` keys, in lexicographic order.
	pub fn all(&self) -> Vec<(TypeTag, i16)> {
		self.resources.keys().copied().collect()
	}

	/// Iterates over all resources in key order.
	pub fn iter(&self) -> impl Iterator<Item = &Resource> {
		self.resources.values()
	}

	/// Finds which of `types` (tried in order) contains a resource with this
	/// id. Used by decoders that may consult several resource families.
	pub fn find_by_id(&self, id: i16, types: &[TypeTag]) -> Option<TypeTag> {
		types.iter().copied().find(|&t| self.exists(t, id))
	}

	fn key_for_name(&self, type_tag: TypeTag, name: &str) -> Option<(TypeTag, i16)> {
		self.name_index.get(name)?.iter().copied().find(|(t, _)| *t == type_tag)
	}

	fn materialize(&mut self, key: (TypeTag, i16), dispatch: u64) {
		if dispatch & dispatch_flags::DISABLED != 0 {
			return;
		}
		let needs = self.resources.get(&key).is_some_and(Resource::needs_decompression);
		if !needs {
			return;
		}

		// The body is cloned so the set stays borrowable for dcmp lookup
		// while the executor runs.
		let data = self.resources.get(&key).map(|r| r.data.clone()).unwrap_or_default();
		let mut executor = self.executor.take();
		let result =
			compress::decompress(self, key.0, key.1, &data, dispatch, executor.as_deref_mut());
		self.executor = executor;

		let Some(res) = self.resources.get_mut(&key) else {
			return;
		};
		match result {
			Ok(decompressed) => {
				res.data = decompressed;
				res.flags |= flags::DECOMPRESSED;
			}
			Err(err) => {
				warn!("decompression of {} id {} failed: {err}", key.0, key.1);
				res.flags |= flags::DECOMPRESSION_FAILED;
			}
		}
	}
}

impl Default for ResourceSet {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for ResourceSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResourceSet")
			.field("resources", &self.resources)
			.field("has_executor", &self.executor.is_some())
			.finish()
	}
}

impl Extend<Resource> for ResourceSet {
	fn extend<T: IntoIterator<Item = Resource>>(&mut self, iter: T) {
		for res in iter {
			self.add(res);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rsrc::tags;

	fn named(type_tag: TypeTag, id: i16, name: &str) -> Resource {
		Resource::with_metadata(type_tag, id, 0, name.to_string(), vec![id as u8])
	}

	#[test]
	fn test_add_and_get() {
		let mut set = ResourceSet::new();
		set.add(Resource::new(tags::STR, 128, b"hi".to_vec()));
		let res = set.get(tags::STR, 128, 0).unwrap();
		assert_eq!(res.data, b"hi");
		assert!(set.get(tags::STR, 129, 0).is_none());
	}

	#[test]
	fn test_duplicate_key_overwrites() {
		let mut set = ResourceSet::new();
		set.add(named(tags::STR, 128, "first"));
		set.add(named(tags::STR, 128, "second"));
		assert_eq!(set.len(), 1);
		assert!(!set.exists_named(tags::STR, "first"));
		assert!(set.exists_named(tags::STR, "second"));
	}

	#[test]
	fn test_name_lookup_first_in_insertion_order() {
		let mut set = ResourceSet::new();
		set.add(named(tags::STR, 300, "dup"));
		set.add(named(tags::STR, 100, "dup"));
		// 300 was inserted first, so it wins despite the higher id
		assert_eq!(set.get_named(tags::STR, "dup", 0).unwrap().id, 300);
	}

	#[test]
	fn test_iteration_order_is_type_then_id() {
		let mut set = ResourceSet::new();
		set.add(Resource::new(tags::STR, 5, vec![]));
		set.add(Resource::new(tags::PICT, 700, vec![]));
		set.add(Resource::new(tags::STR, -2, vec![]));
		assert_eq!(
			set.all(),
			vec![(tags::PICT, 700), (tags::STR, -2), (tags::STR, 5)]
		);
		assert_eq!(set.all_of_type(tags::STR), vec![-2, 5]);
	}

	#[test]
	fn test_find_by_id_priority_order() {
		let mut set = ResourceSet::new();
		set.add(Resource::new(tags::ICL8, 128, vec![]));
		set.add(Resource::new(tags::ICL4, 128, vec![]));
		assert_eq!(
			set.find_by_id(128, &[tags::ICL4, tags::ICL8]),
			Some(tags::ICL4)
		);
		assert_eq!(set.find_by_id(129, &[tags::ICL4, tags::ICL8]), None);
	}

	#[test]
	fn test_compressed_without_executor_flags_failure_once() {
		let mut set = ResourceSet::new();
		let mut body = Vec::new();
		body.extend_from_slice(&crate::rsrc::compress::COMPRESSED_MAGIC.to_be_bytes());
		body.extend_from_slice(&0x12u16.to_be_bytes());
		body.push(8);
		body.push(1);
		body.extend_from_slice(&16u32.to_be_bytes());
		body.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
		set.add(Resource::with_metadata(
			tags::STR,
			128,
			flags::COMPRESSED,
			String::new(),
			body,
		));

		let res = set.get(tags::STR, 128, 0).unwrap();
		assert_ne!(res.flags & flags::DECOMPRESSION_FAILED, 0);
		// A second access must not clear or change the outcome
		let res = set.get(tags::STR, 128, 0).unwrap();
		assert_ne!(res.flags & flags::DECOMPRESSION_FAILED, 0);
		assert_eq!(res.flags & flags::DECOMPRESSED, 0);
	}
}
