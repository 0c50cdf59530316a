//! This crate provides the resource decoding engine for the `macrez-rs`
//! project: container parsers and per-type decoders for Classic Mac OS
//! resource data.
//!
//! # Containers
//!
//! - **Resource fork**: the canonical typed resource database from Inside
//!   Macintosh (plus a serializer for round-trips)
//! - **`AppleSingle`/`AppleDouble`**, **`MacBinary`** v1–v3: file wrappers that
//!   embed a resource fork
//! - **Mohawk**, **HIRF**, **DC-Data**, **`CBag`**: archive formats used by
//!   specific application families
//! - **Directory**: a `TYPE/ID[_NAME].bin` tree on disk
//!
//! # Decoders
//!
//! QuickDraw `PICT`, the icon/cursor/pattern family, `clut`-style palettes,
//! `FONT`/`NFNT` bitmap fonts plus a text renderer, string and style
//! resources, 68K/PPC code resources, `TMPL` templates, and the `snd `
//! family.
//!
//! # Examples
//!
//! ```no_run
//! use macrez_types::rsrc::{container, tags};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("Game Data.rsrc")?;
//! let mut set = container::parse_auto(&bytes)?;
//! for id in set.all_of_type(tags::PICT) {
//!     let res = set.get(tags::PICT, id, 0).unwrap();
//!     println!("PICT {id}: {} bytes", res.data.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod mem;
pub mod rsrc;

/// `use macrez_types::prelude::*;` to import commonly used items.
pub mod prelude;
