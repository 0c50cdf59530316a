//! Error types for resource parsing and decoding.

use thiserror::Error;

/// Errors raised by [`crate::rsrc::reader::ByteReader`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
	/// A read reached past the end of the reader's range
	#[error("out of range: {context}: {len} bytes at offset {offset} (bound {bound})")]
	OutOfRange {
		/// Offset the read started at
		offset: usize,
		/// Number of bytes requested
		len: usize,
		/// Total length of the readable range
		bound: usize,
		/// What was being read
		context: &'static str,
	},
}

/// Errors that can occur while parsing a resource container.
#[derive(Debug, Error)]
pub enum ContainerError {
	/// A magic-byte check failed
	#[error("bad signature at offset {offset}: expected {expected:08X}, found {found:08X}")]
	BadSignature {
		/// Expected magic value
		expected: u32,
		/// Value actually present
		found: u32,
		/// Offset of the check
		offset: usize,
	},

	/// Container or sub-format version is not recognized
	#[error("unsupported {format} version {version:#X}")]
	UnsupportedVersion {
		/// Container format name
		format: &'static str,
		/// Version found in the stream
		version: u32,
	},

	/// A structural field is inconsistent with the rest of the stream
	#[error("malformed container ({kind}): {context}")]
	Malformed {
		/// Short tag for the inconsistency
		kind: &'static str,
		/// Where / what
		context: String,
	},

	/// None of the known container formats matched the input
	#[error("input does not match any known container format")]
	UnknownFormat,

	/// Truncated or out-of-range read
	#[error(transparent)]
	Read(#[from] ReadError),

	/// IO error (directory containers only)
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

/// Errors raised by the compressed-resource pipeline.
#[derive(Debug, Error)]
pub enum DecompressError {
	/// The referenced decompressor resource does not exist in the set
	#[error("missing decompressor: {kind} id {id}")]
	MissingDecompressor {
		/// `dcmp` or `ncmp`
		kind: &'static str,
		/// Decompressor resource id
		id: i16,
	},

	/// No code executor was provided, so the decompressor cannot run
	#[error("no code executor available to run decompressor {kind} id {id}")]
	NoExecutor {
		/// `dcmp` or `ncmp`
		kind: &'static str,
		/// Decompressor resource id
		id: i16,
	},

	/// Decompression ran but produced the wrong amount of data
	#[error("decompressed size mismatch: header declares {expected} bytes, produced {actual}")]
	SizeMismatch {
		/// Size from the compressed-resource header
		expected: usize,
		/// Size actually produced
		actual: usize,
	},

	/// Catch-all for executor faults and malformed compressed streams
	#[error("decompression failed: {reason}")]
	DecompressionFailed {
		/// Human-readable failure description
		reason: String,
	},

	/// Truncated compressed-resource header
	#[error(transparent)]
	Read(#[from] ReadError),
}

/// Errors produced by the image decoders.
#[derive(Debug, Error)]
pub enum ImageError {
	/// PICT opcode outside both the implemented set and the QuickDraw skip table
	#[error("unsupported PICT opcode {opcode:04X} at offset {offset}")]
	UnsupportedPictOpcode {
		/// The opcode value
		opcode: u16,
		/// Offset of the opcode within the resource
		offset: usize,
	},

	/// A resource this decode depends on (clut, mask) is absent
	#[error(
		"missing dependency: {dep_type} id {dep_id} required by {consumer_type} id {consumer_id}"
	)]
	MissingDependency {
		/// Type tag of the absent resource
		dep_type: crate::rsrc::TypeTag,
		/// Id of the absent resource
		dep_id: i16,
		/// Type tag of the resource being decoded
		consumer_type: crate::rsrc::TypeTag,
		/// Id of the resource being decoded
		consumer_id: i16,
	},

	/// Internal inconsistency (impossible pixel size, negative bounds, ...)
	#[error("malformed resource ({kind}): {context}")]
	MalformedResource {
		/// Short tag for the inconsistency
		kind: &'static str,
		/// Where / what
		context: String,
	},

	/// Truncated record
	#[error(transparent)]
	Read(#[from] ReadError),
}

/// Errors produced by the FONT/NFNT decoder and the text renderer.
#[derive(Debug, Error)]
pub enum FontError {
	/// The strike header describes a bitmap the data cannot contain
	#[error("malformed font ({kind}): {context}")]
	MalformedResource {
		/// Short tag for the inconsistency
		kind: &'static str,
		/// Where / what
		context: String,
	},

	/// A wrap target narrower than a single glyph
	#[error("wrap width {max_width} px is too small for glyph {glyph:?} ({glyph_width} px)")]
	WidthTooSmall {
		/// Requested maximum line width
		max_width: usize,
		/// Character that did not fit
		glyph: char,
		/// Advance width of that character
		glyph_width: usize,
	},

	/// Truncated strike
	#[error(transparent)]
	Read(#[from] ReadError),
}

/// Errors produced by the text and style decoders.
#[derive(Debug, Error)]
pub enum TextError {
	/// Structure disagrees with its own counts/lengths
	#[error("malformed text resource ({kind}): {context}")]
	MalformedResource {
		/// Short tag for the inconsistency
		kind: &'static str,
		/// Where / what
		context: String,
	},

	/// Truncated record
	#[error(transparent)]
	Read(#[from] ReadError),
}

/// Errors produced by the executable-resource decoders.
#[derive(Debug, Error)]
pub enum CodeError {
	/// A magic-byte check failed
	#[error("bad signature at offset {offset}: expected {expected:08X}, found {found:08X}")]
	BadSignature {
		/// Expected magic value
		expected: u32,
		/// Value actually present
		found: u32,
		/// Offset of the check
		offset: usize,
	},

	/// Format version not recognized
	#[error("unsupported {format} version {version:#X}")]
	UnsupportedVersion {
		/// Format name
		format: &'static str,
		/// Version found
		version: u32,
	},

	/// Structure disagrees with its own counts/lengths
	#[error("malformed code resource ({kind}): {context}")]
	MalformedResource {
		/// Short tag for the inconsistency
		kind: &'static str,
		/// Where / what
		context: String,
	},

	/// Truncated record
	#[error(transparent)]
	Read(#[from] ReadError),
}

/// Errors produced by the sound and MIDI decoders.
#[derive(Debug, Error)]
pub enum SoundError {
	/// Structure disagrees with its own counts/lengths
	#[error("malformed sound resource ({kind}): {context}")]
	MalformedResource {
		/// Short tag for the inconsistency
		kind: &'static str,
		/// Where / what
		context: String,
	},

	/// The `snd ` format field is neither 1 nor 2
	#[error("unsupported snd format {format}")]
	UnsupportedFormat {
		/// Format word from the resource
		format: u16,
	},

	/// Compression scheme that cannot be decoded natively
	#[error("unsupported sound compression {tag}")]
	UnsupportedCompression {
		/// Four-char compression tag
		tag: crate::rsrc::TypeTag,
	},

	/// WAV serialization error
	#[error(transparent)]
	Wav(#[from] hound::Error),

	/// Truncated record
	#[error(transparent)]
	Read(#[from] ReadError),
}

/// Errors produced by the TMPL interpreter.
#[derive(Debug, Error)]
pub enum TemplateError {
	/// A TMPL field type tag is outside the known set
	#[error("unknown template field type {tag} for label {label:?}")]
	UnknownFieldType {
		/// The four-char field type
		tag: crate::rsrc::TypeTag,
		/// Label of the field
		label: String,
	},

	/// A list opened without a matching terminator, or vice versa
	#[error("malformed template ({kind}): {context}")]
	MalformedTemplate {
		/// Short tag for the inconsistency
		kind: &'static str,
		/// Where / what
		context: String,
	},

	/// Truncated template or target resource
	#[error(transparent)]
	Read(#[from] ReadError),
}

/// Errors raised by the guest memory arena.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
	/// Address range is not backed by any allocated region
	#[error("guest address {addr:08X} ({size} bytes) is not mapped")]
	Unmapped {
		/// Guest address
		addr: u32,
		/// Access size in bytes
		size: usize,
	},

	/// An allocation cannot be satisfied
	#[error("cannot allocate {size} bytes (requested address {at_addr:08X})")]
	AllocationFailed {
		/// Requested size
		size: usize,
		/// Requested fixed address (zero when unconstrained)
		at_addr: u32,
	},

	/// `free` of an address that is not the start of an allocated region
	#[error("guest address {addr:08X} is not an allocated region")]
	NotAllocated {
		/// Guest address
		addr: u32,
	},

	/// Snapshot blob is truncated or has an unknown version
	#[error("bad arena snapshot: {context}")]
	BadSnapshot {
		/// What went wrong
		context: &'static str,
	},

	/// A host pointer was not inside any backing page group
	#[error("host address is not within any arena")]
	HostAddressUnmapped,
}
