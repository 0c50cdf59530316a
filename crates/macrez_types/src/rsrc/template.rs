//! `TMPL` resource templates.
//!
//! A template is a sequence of `{label, four-char field type}` pairs that
//! describes the layout of another resource. [`parse_tmpl`] builds the field
//! list (with list fields nested) and [`disassemble`] runs it against a
//! resource body, producing a printable value tree.

use std::fmt;

use crate::rsrc::{TypeTag, error::TemplateError, reader::ByteReader, text::decode_mac_roman};

/// String padding behavior for `ESTR`/`OSTR`/`ECST`/`OCST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pad {
	/// No padding
	None,
	/// Total field length padded to even
	Even,
	/// Total field length padded to odd
	Odd,
}

/// The closed set of template field kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateEntryKind {
	/// `DVDR`: divider, no data
	Void,
	/// `DBYT`/`DWRD`/`DLNG` (signed decimal) and `HBYT`/`HWRD`/`HLNG` (hex)
	Integer {
		/// Field width in bytes (1, 2 or 4)
		width: u8,
		/// Render as hex rather than signed decimal
		hex: bool,
	},
	/// `CHAR`: one character
	Char,
	/// `TNAM`: a four-char type tag
	TypeName,
	/// `AWRD`/`ALNG`: align the cursor to 2 or 4 bytes
	Alignment(u8),
	/// `FBYT`/`FWRD`/`FLNG`: skip zero fill
	ZeroFill(u8),
	/// `HEXD`: hex dump through the end of the resource
	EofHexDump,
	/// `FIXD`: 16.16 fixed point
	FixedPoint,
	/// `PNT `: two 16-bit coordinates
	Point,
	/// `Hxxx`: fixed-width hex dump (width in the tag)
	HexString(usize),
	/// `PSTR`/`WSTR`/`LSTR`/`ESTR`/`OSTR`: length-prefixed string
	PString {
		/// Width of the length prefix (1, 2 or 4)
		len_width: u8,
		/// Total-length padding
		pad: Pad,
	},
	/// `CSTR`/`ECST`/`OCST`: zero-terminated string
	CString(Pad),
	/// `P0xx`: fixed-size Pascal string (data size in the tag)
	FixedPString(usize),
	/// `Cxxx`: fixed-size zero-terminated string
	FixedCString(usize),
	/// `BOOL`: two bytes
	Bool,
	/// `BBIT`: eight one-bit flags
	Bitfield,
	/// `RECT`: four 16-bit fields
	Rect,
	/// `COLR`: three 16-bit channels
	Color,
	/// `LSTZ`..`LSTE`: repeat until a zero byte
	ListZeroByte(Vec<TemplateEntry>),
	/// `ZCNT`+`LSTC`..`LSTE`: count word stores entries minus one
	ListZeroCount(Vec<TemplateEntry>),
	/// `OCNT`+`LSTC`..`LSTE`: count word stores the entry count
	ListOneCount(Vec<TemplateEntry>),
	/// `LSTB`..`LSTE`: repeat until the end of the resource
	ListEof(Vec<TemplateEntry>),
}

/// One template field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
	/// Field label from the template
	pub name: String,
	/// Field kind
	pub kind: TemplateEntryKind,
}

fn hex_width(tag: &[u8; 4], skip: usize) -> Option<usize> {
	let digits = std::str::from_utf8(&tag[skip..]).ok()?;
	usize::from_str_radix(digits, 16).ok()
}

/// Parses a `TMPL` resource into its field list.
pub fn parse_tmpl(data: &[u8]) -> Result<Vec<TemplateEntry>, TemplateError> {
	let mut r = ByteReader::new(data);

	// Stack of open lists: (label, list kind tag, collected entries)
	let mut stack: Vec<(String, [u8; 4], Vec<TemplateEntry>)> = Vec::new();
	let mut top: Vec<TemplateEntry> = Vec::new();
	let mut pending_count_kind: Option<[u8; 4]> = None;

	while !r.is_eof() {
		let name = decode_mac_roman(r.pstring()?);
		let mut tag = [0u8; 4];
		tag.copy_from_slice(r.read(4)?);

		let kind = match &tag {
			b"DVDR" => TemplateEntryKind::Void,
			b"DBYT" => TemplateEntryKind::Integer {
				width: 1,
				hex: false,
			},
			b"DWRD" => TemplateEntryKind::Integer {
				width: 2,
				hex: false,
			},
			b"DLNG" => TemplateEntryKind::Integer {
				width: 4,
				hex: false,
			},
			b"HBYT" => TemplateEntryKind::Integer {
				width: 1,
				hex: true,
			},
			b"HWRD" => TemplateEntryKind::Integer {
				width: 2,
				hex: true,
			},
			b"HLNG" => TemplateEntryKind::Integer {
				width: 4,
				hex: true,
			},
			b"CHAR" => TemplateEntryKind::Char,
			b"TNAM" => TemplateEntryKind::TypeName,
			b"AWRD" => TemplateEntryKind::Alignment(2),
			b"ALNG" => TemplateEntryKind::Alignment(4),
			b"FBYT" => TemplateEntryKind::ZeroFill(1),
			b"FWRD" => TemplateEntryKind::ZeroFill(2),
			b"FLNG" => TemplateEntryKind::ZeroFill(4),
			b"HEXD" => TemplateEntryKind::EofHexDump,
			b"FIXD" => TemplateEntryKind::FixedPoint,
			b"PNT " => TemplateEntryKind::Point,
			b"PSTR" => TemplateEntryKind::PString {
				len_width: 1,
				pad: Pad::None,
			},
			b"WSTR" => TemplateEntryKind::PString {
				len_width: 2,
				pad: Pad::None,
			},
			b"LSTR" => TemplateEntryKind::PString {
				len_width: 4,
				pad: Pad::None,
			},
			b"ESTR" => TemplateEntryKind::PString {
				len_width: 1,
				pad: Pad::Even,
			},
			b"OSTR" => TemplateEntryKind::PString {
				len_width: 1,
				pad: Pad::Odd,
			},
			b"CSTR" => TemplateEntryKind::CString(Pad::None),
			b"ECST" => TemplateEntryKind::CString(Pad::Even),
			b"OCST" => TemplateEntryKind::CString(Pad::Odd),
			b"BOOL" => TemplateEntryKind::Bool,
			b"BBIT" => TemplateEntryKind::Bitfield,
			b"RECT" => TemplateEntryKind::Rect,
			b"COLR" => TemplateEntryKind::Color,
			b"ZCNT" | b"OCNT" => {
				pending_count_kind = Some(tag);
				continue;
			}
			b"LSTZ" | b"LSTB" | b"LSTC" => {
				if tag == *b"LSTC" && pending_count_kind.is_none() {
					return Err(TemplateError::MalformedTemplate {
						kind: "LSTC without a preceding count",
						context: name,
					});
				}
				let list_tag = if tag == *b"LSTC" {
					pending_count_kind.take().unwrap_or(*b"OCNT")
				} else {
					tag
				};
				stack.push((name, list_tag, std::mem::take(&mut top)));
				continue;
			}
			b"LSTE" => {
				let Some((list_name, list_tag, parent)) = stack.pop() else {
					return Err(TemplateError::MalformedTemplate {
						kind: "LSTE without an open list",
						context: name,
					});
				};
				let collected = std::mem::replace(&mut top, parent);
				let kind = match &list_tag {
					b"LSTZ" => TemplateEntryKind::ListZeroByte(collected),
					b"LSTB" => TemplateEntryKind::ListEof(collected),
					b"ZCNT" => TemplateEntryKind::ListZeroCount(collected),
					_ => TemplateEntryKind::ListOneCount(collected),
				};
				top.push(TemplateEntry {
					name: list_name,
					kind,
				});
				continue;
			}
			_ if tag[0] == b'H' => {
				let width = hex_width(&tag, 1).ok_or(TemplateError::UnknownFieldType {
					tag: TypeTag::new(tag),
					label: name.clone(),
				})?;
				TemplateEntryKind::HexString(width)
			}
			_ if tag[0] == b'P' && tag[1] == b'0' => {
				let width = hex_width(&tag, 2).ok_or(TemplateError::UnknownFieldType {
					tag: TypeTag::new(tag),
					label: name.clone(),
				})?;
				TemplateEntryKind::FixedPString(width)
			}
			_ if tag[0] == b'C' => {
				let width = hex_width(&tag, 1).ok_or(TemplateError::UnknownFieldType {
					tag: TypeTag::new(tag),
					label: name.clone(),
				})?;
				TemplateEntryKind::FixedCString(width)
			}
			_ => {
				return Err(TemplateError::UnknownFieldType {
					tag: TypeTag::new(tag),
					label: name,
				});
			}
		};
		top.push(TemplateEntry {
			name,
			kind,
		});
	}

	if let Some((list_name, _, _)) = stack.pop() {
		return Err(TemplateError::MalformedTemplate {
			kind: "unterminated list",
			context: list_name,
		});
	}
	Ok(top)
}

/// A decoded value produced by running a template over a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
	/// No data (dividers, alignment, zero fill)
	Void,
	/// Signed integer (decimal display)
	Integer(i64),
	/// Unsigned integer (hex display)
	Hex(u64),
	/// Decoded text
	String(String),
	/// Raw bytes
	Bytes(Vec<u8>),
	/// Boolean field
	Bool(bool),
	/// Four-char type tag
	TypeName(TypeTag),
	/// 16.16 fixed point
	Fixed(f64),
	/// 2D point
	Point {
		/// x coordinate
		x: i16,
		/// y coordinate
		y: i16,
	},
	/// Rectangle
	Rect {
		/// Top edge
		top: i16,
		/// Left edge
		left: i16,
		/// Bottom edge
		bottom: i16,
		/// Right edge
		right: i16,
	},
	/// RGB color
	Color {
		/// Red channel
		r: u16,
		/// Green channel
		g: u16,
		/// Blue channel
		b: u16,
	},
	/// Eight bitfield flags, MSB first
	Bits([bool; 8]),
	/// Repeated group of fields
	List(Vec<Vec<(String, TemplateValue)>>),
}

impl TemplateValue {
	fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
		match self {
			TemplateValue::Void => write!(f, "-"),
			TemplateValue::Integer(v) => write!(f, "{v}"),
			TemplateValue::Hex(v) => write!(f, "0x{v:X}"),
			TemplateValue::String(s) => write!(f, "{s:?}"),
			TemplateValue::Bytes(b) => {
				write!(f, "<")?;
				for byte in b {
					write!(f, "{byte:02X}")?;
				}
				write!(f, ">")
			}
			TemplateValue::Bool(v) => write!(f, "{v}"),
			TemplateValue::TypeName(tag) => write!(f, "'{tag}'"),
			TemplateValue::Fixed(v) => write!(f, "{v}"),
			TemplateValue::Point {
				x,
				y,
			} => write!(f, "({x}, {y})"),
			TemplateValue::Rect {
				top,
				left,
				bottom,
				right,
			} => write!(f, "[{top}, {left}, {bottom}, {right}]"),
			TemplateValue::Color {
				r,
				g,
				b,
			} => write!(f, "rgb({r:04X}, {g:04X}, {b:04X})"),
			TemplateValue::Bits(bits) => {
				for bit in bits {
					write!(f, "{}", u8::from(*bit))?;
				}
				Ok(())
			}
			TemplateValue::List(items) => {
				for (index, fields) in items.iter().enumerate() {
					writeln!(f)?;
					write!(f, "{:indent$}[{index}]", "", indent = indent * 2)?;
					for (name, value) in fields {
						writeln!(f)?;
						write!(f, "{:indent$}{name}: ", "", indent = (indent + 1) * 2)?;
						value.write_indented(f, indent + 2)?;
					}
				}
				Ok(())
			}
		}
	}
}

/// A disassembled resource: labeled values in template order.
#[derive(Debug, Clone, PartialEq)]
pub struct Disassembled {
	/// `(label, value)` pairs
	pub fields: Vec<(String, TemplateValue)>,
}

impl fmt::Display for Disassembled {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (name, value) in &self.fields {
			write!(f, "{name}: ")?;
			value.write_indented(f, 1)?;
			writeln!(f)?;
		}
		Ok(())
	}
}

/// Runs a template against a resource body.
pub fn disassemble(data: &[u8], tmpl: &[TemplateEntry]) -> Result<Disassembled, TemplateError> {
	let mut r = ByteReader::new(data);
	let fields = run_entries(&mut r, tmpl)?;
	Ok(Disassembled {
		fields,
	})
}

fn run_entries(
	r: &mut ByteReader<'_>,
	entries: &[TemplateEntry],
) -> Result<Vec<(String, TemplateValue)>, TemplateError> {
	let mut out = Vec::with_capacity(entries.len());
	for entry in entries {
		let value = run_entry(r, entry)?;
		out.push((entry.name.clone(), value));
	}
	Ok(out)
}

fn read_int(r: &mut ByteReader<'_>, width: u8) -> Result<i64, TemplateError> {
	Ok(match width {
		1 => i64::from(r.i8()?),
		2 => i64::from(r.i16()?),
		_ => i64::from(r.i32()?),
	})
}

fn read_uint(r: &mut ByteReader<'_>, width: u8) -> Result<u64, TemplateError> {
	Ok(match width {
		1 => u64::from(r.u8()?),
		2 => u64::from(r.u16()?),
		_ => u64::from(r.u32()?),
	})
}

fn read_pad(r: &mut ByteReader<'_>, consumed: usize, pad: Pad) -> Result<(), TemplateError> {
	let needs_pad = match pad {
		Pad::None => false,
		Pad::Even => consumed % 2 == 1,
		Pad::Odd => consumed % 2 == 0,
	};
	if needs_pad && !r.is_eof() {
		r.skip(1)?;
	}
	Ok(())
}

fn run_entry(
	r: &mut ByteReader<'_>,
	entry: &TemplateEntry,
) -> Result<TemplateValue, TemplateError> {
	Ok(match &entry.kind {
		TemplateEntryKind::Void => TemplateValue::Void,
		TemplateEntryKind::Integer {
			width,
			hex: false,
		} => TemplateValue::Integer(read_int(r, *width)?),
		TemplateEntryKind::Integer {
			width,
			hex: true,
		} => TemplateValue::Hex(read_uint(r, *width)?),
		TemplateEntryKind::Char => {
			TemplateValue::String(decode_mac_roman(r.read(1)?))
		}
		TemplateEntryKind::TypeName => TemplateValue::TypeName(TypeTag(r.u32()?)),
		TemplateEntryKind::Alignment(width) => {
			let misalign = r.position() % *width as usize;
			if misalign != 0 {
				r.skip(*width as usize - misalign)?;
			}
			TemplateValue::Void
		}
		TemplateEntryKind::ZeroFill(width) => {
			r.skip(*width as usize)?;
			TemplateValue::Void
		}
		TemplateEntryKind::EofHexDump => {
			let rest = r.rest().to_vec();
			r.seek(r.len()).map_err(TemplateError::Read)?;
			TemplateValue::Bytes(rest)
		}
		TemplateEntryKind::FixedPoint => {
			let raw = r.i32()?;
			TemplateValue::Fixed(f64::from(raw) / 65536.0)
		}
		TemplateEntryKind::Point => {
			let x = r.i16()?;
			let y = r.i16()?;
			TemplateValue::Point {
				x,
				y,
			}
		}
		TemplateEntryKind::HexString(width) => TemplateValue::Bytes(r.read(*width)?.to_vec()),
		TemplateEntryKind::PString {
			len_width,
			pad,
		} => {
			let len = read_uint(r, *len_width)? as usize;
			let text = decode_mac_roman(r.read(len)?);
			read_pad(r, *len_width as usize + len, *pad)?;
			TemplateValue::String(text)
		}
		TemplateEntryKind::CString(pad) => {
			let mut bytes = Vec::new();
			loop {
				let b = r.u8()?;
				if b == 0 {
					break;
				}
				bytes.push(b);
			}
			read_pad(r, bytes.len() + 1, *pad)?;
			TemplateValue::String(decode_mac_roman(&bytes))
		}
		TemplateEntryKind::FixedPString(width) => {
			let len = (r.u8()? as usize).min(*width);
			let field = r.read(*width)?;
			TemplateValue::String(decode_mac_roman(&field[..len]))
		}
		TemplateEntryKind::FixedCString(width) => {
			let field = r.read(*width)?;
			let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
			TemplateValue::String(decode_mac_roman(&field[..end]))
		}
		TemplateEntryKind::Bool => {
			let value = r.u16()?;
			TemplateValue::Bool(value != 0)
		}
		TemplateEntryKind::Bitfield => {
			let byte = r.u8()?;
			let mut bits = [false; 8];
			for (i, bit) in bits.iter_mut().enumerate() {
				*bit = (byte >> (7 - i)) & 1 != 0;
			}
			TemplateValue::Bits(bits)
		}
		TemplateEntryKind::Rect => {
			let top = r.i16()?;
			let left = r.i16()?;
			let bottom = r.i16()?;
			let right = r.i16()?;
			TemplateValue::Rect {
				top,
				left,
				bottom,
				right,
			}
		}
		TemplateEntryKind::Color => {
			let red = r.u16()?;
			let green = r.u16()?;
			let blue = r.u16()?;
			TemplateValue::Color {
				r: red,
				g: green,
				b: blue,
			}
		}
		TemplateEntryKind::ListZeroByte(entries) => {
			let mut items = Vec::new();
			loop {
				if r.peek_u8(r.position())? == 0 {
					r.skip(1)?;
					break;
				}
				items.push(run_entries(r, entries)?);
			}
			TemplateValue::List(items)
		}
		TemplateEntryKind::ListZeroCount(entries) => {
			// The stored count is one less than the entry count; 0xFFFF
			// wraps to an empty list.
			let count = r.u16()?.wrapping_add(1) as usize;
			let mut items = Vec::with_capacity(count.min(0x1000));
			for _ in 0..count {
				items.push(run_entries(r, entries)?);
			}
			TemplateValue::List(items)
		}
		TemplateEntryKind::ListOneCount(entries) => {
			let count = r.u16()? as usize;
			let mut items = Vec::with_capacity(count.min(0x1000));
			for _ in 0..count {
				items.push(run_entries(r, entries)?);
			}
			TemplateValue::List(items)
		}
		TemplateEntryKind::ListEof(entries) => {
			let mut items = Vec::new();
			while !r.is_eof() {
				items.push(run_entries(r, entries)?);
			}
			TemplateValue::List(items)
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tmpl_field(label: &str, tag: &[u8; 4]) -> Vec<u8> {
		let mut out = vec![label.len() as u8];
		out.extend_from_slice(label.as_bytes());
		out.extend_from_slice(tag);
		out
	}

	#[test]
	fn test_parse_simple_template() {
		let mut data = Vec::new();
		data.extend_from_slice(&tmpl_field("Count", b"DWRD"));
		data.extend_from_slice(&tmpl_field("Name", b"PSTR"));
		data.extend_from_slice(&tmpl_field("Flags", b"HBYT"));
		let tmpl = parse_tmpl(&data).unwrap();
		assert_eq!(tmpl.len(), 3);
		assert_eq!(tmpl[0].name, "Count");
		assert_eq!(
			tmpl[2].kind,
			TemplateEntryKind::Integer {
				width: 1,
				hex: true
			}
		);
	}

	#[test]
	fn test_parse_unknown_type_rejected() {
		let data = tmpl_field("X", b"QQQQ");
		assert!(matches!(
			parse_tmpl(&data),
			Err(TemplateError::UnknownFieldType { .. })
		));
	}

	#[test]
	fn test_parse_hex_width_tags() {
		let tmpl = parse_tmpl(&tmpl_field("Blob", b"H010")).unwrap();
		assert_eq!(tmpl[0].kind, TemplateEntryKind::HexString(0x10));
		let tmpl = parse_tmpl(&tmpl_field("Str", b"P040")).unwrap();
		assert_eq!(tmpl[0].kind, TemplateEntryKind::FixedPString(0x40));
		let tmpl = parse_tmpl(&tmpl_field("CStr", b"C020")).unwrap();
		assert_eq!(tmpl[0].kind, TemplateEntryKind::FixedCString(0x20));
	}

	#[test]
	fn test_disassemble_integers_and_strings() {
		let mut tmpl_data = Vec::new();
		tmpl_data.extend_from_slice(&tmpl_field("Id", b"DWRD"));
		tmpl_data.extend_from_slice(&tmpl_field("Name", b"PSTR"));
		tmpl_data.extend_from_slice(&tmpl_field("Magic", b"TNAM"));
		let tmpl = parse_tmpl(&tmpl_data).unwrap();

		let mut body = Vec::new();
		body.extend_from_slice(&(-2i16).to_be_bytes());
		body.push(2);
		body.extend_from_slice(b"hi");
		body.extend_from_slice(b"PICT");
		let dis = disassemble(&body, &tmpl).unwrap();
		assert_eq!(dis.fields[0].1, TemplateValue::Integer(-2));
		assert_eq!(dis.fields[1].1, TemplateValue::String("hi".to_string()));
		assert_eq!(
			dis.fields[2].1,
			TemplateValue::TypeName(TypeTag::new(*b"PICT"))
		);
	}

	#[test]
	fn test_disassemble_counted_list() {
		let mut tmpl_data = Vec::new();
		tmpl_data.extend_from_slice(&tmpl_field("Count", b"OCNT"));
		tmpl_data.extend_from_slice(&tmpl_field("Items", b"LSTC"));
		tmpl_data.extend_from_slice(&tmpl_field("Value", b"DBYT"));
		tmpl_data.extend_from_slice(&tmpl_field("", b"LSTE"));
		let tmpl = parse_tmpl(&tmpl_data).unwrap();
		assert_eq!(tmpl.len(), 1);

		let body = [0x00, 0x03, 0x01, 0x02, 0x03];
		let dis = disassemble(&body, &tmpl).unwrap();
		let TemplateValue::List(items) = &dis.fields[0].1 else {
			panic!("expected a list");
		};
		assert_eq!(items.len(), 3);
		assert_eq!(items[2][0].1, TemplateValue::Integer(3));
	}

	#[test]
	fn test_disassemble_eof_list() {
		let mut tmpl_data = Vec::new();
		tmpl_data.extend_from_slice(&tmpl_field("Pairs", b"LSTB"));
		tmpl_data.extend_from_slice(&tmpl_field("A", b"DBYT"));
		tmpl_data.extend_from_slice(&tmpl_field("B", b"DBYT"));
		tmpl_data.extend_from_slice(&tmpl_field("", b"LSTE"));
		let tmpl = parse_tmpl(&tmpl_data).unwrap();

		let body = [1, 2, 3, 4];
		let dis = disassemble(&body, &tmpl).unwrap();
		let TemplateValue::List(items) = &dis.fields[0].1 else {
			panic!("expected a list");
		};
		assert_eq!(items.len(), 2);
		assert_eq!(items[1][1].1, TemplateValue::Integer(4));
	}

	#[test]
	fn test_disassemble_rect_color_bool() {
		let mut tmpl_data = Vec::new();
		tmpl_data.extend_from_slice(&tmpl_field("Bounds", b"RECT"));
		tmpl_data.extend_from_slice(&tmpl_field("Tint", b"COLR"));
		tmpl_data.extend_from_slice(&tmpl_field("On", b"BOOL"));
		tmpl_data.extend_from_slice(&tmpl_field("Bits", b"BBIT"));
		let tmpl = parse_tmpl(&tmpl_data).unwrap();

		let mut body = Vec::new();
		for v in [0i16, 1, 2, 3] {
			body.extend_from_slice(&v.to_be_bytes());
		}
		for v in [0x1111u16, 0x2222, 0x3333] {
			body.extend_from_slice(&v.to_be_bytes());
		}
		body.extend_from_slice(&0x0100u16.to_be_bytes());
		body.push(0b1010_0000);
		let dis = disassemble(&body, &tmpl).unwrap();
		assert_eq!(
			dis.fields[0].1,
			TemplateValue::Rect {
				top: 0,
				left: 1,
				bottom: 2,
				right: 3
			}
		);
		assert_eq!(dis.fields[2].1, TemplateValue::Bool(true));
		let TemplateValue::Bits(bits) = dis.fields[3].1 else {
			panic!("expected bits");
		};
		assert!(bits[0] && bits[2]);
		assert!(!bits[1]);
	}

	#[test]
	fn test_unterminated_list_rejected() {
		let mut tmpl_data = Vec::new();
		tmpl_data.extend_from_slice(&tmpl_field("Items", b"LSTB"));
		tmpl_data.extend_from_slice(&tmpl_field("V", b"DBYT"));
		assert!(matches!(
			parse_tmpl(&tmpl_data),
			Err(TemplateError::MalformedTemplate { .. })
		));
	}

	#[test]
	fn test_display_renders_nested() {
		let mut tmpl_data = Vec::new();
		tmpl_data.extend_from_slice(&tmpl_field("Id", b"DBYT"));
		let tmpl = parse_tmpl(&tmpl_data).unwrap();
		let dis = disassemble(&[7], &tmpl).unwrap();
		assert_eq!(dis.to_string(), "Id: 7\n");
	}
}
