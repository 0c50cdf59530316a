#![allow(clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `macrez-rs` is a read-only archaeology toolkit for Classic Mac OS
//! software: it parses resource-bearing containers (resource forks,
//! `MacBinary`, `AppleSingle`/`AppleDouble`, Mohawk, HIRF and friends) and
//! decodes the typed resources inside them into modern forms: RGBA images,
//! palettes, bitmap fonts, Unicode text, PCM audio and structured metadata.
//!
//! The decoding engine lives in [`macrez_types`]; this crate re-exports it
//! and ships the `rezdump` and `rezrender` command-line tools.

pub use macrez_types::*;
