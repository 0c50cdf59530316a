//! End-to-end decoding scenarios for `macrez-rs`.

mod containers;
mod fonts;
mod images;
