//! Web font decoding and OCR-friendly glyph rasterization.
//!
//! This crate turns a WOFF2, WOFF or plain sfnt font into its character map
//! and renders each code point to a small black-on-white bitmap suited for
//! single-character OCR.
//!
//! # Example
//!
//! ```no_run
//! use font_raster::{Canvas, FontFile, GlyphRasterizer, encode_png};
//!
//! let font = FontFile::open("font.woff2").unwrap();
//! let rasterizer = GlyphRasterizer::new(&font, Canvas::DEFAULT).unwrap();
//! for entry in font.cmap_entries().unwrap() {
//!     let image = rasterizer.render(entry.code_point).unwrap();
//!     let png = encode_png(&image).unwrap();
//!     println!("{} -> {} bytes", entry.glyph_name, png.len());
//! }
//! ```

mod error;
mod font;
mod render;
pub mod sizing;

pub use error::{Error, Result};
pub use font::{CmapEntry, Container, FontFile, decode_container};
pub use image::GrayImage;
pub use render::{GlyphRasterizer, binarize, encode_png, sharpen};
pub use sizing::{Canvas, fit_font_size};
