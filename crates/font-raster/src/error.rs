//! Error types for font loading and glyph rendering.

use std::{io, path::PathBuf, result};

use read_fonts::ReadError;

/// Errors that can occur while loading fonts or rendering glyphs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read font file '{path}': {source}")]
    ReadFont { path: PathBuf, source: io::Error },

    #[error("font file '{0}' does not exist")]
    NotFound(PathBuf),

    #[error("failed to decompress {format} container: {message}")]
    Decompress { format: &'static str, message: String },

    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("failed to draw outline for glyph {glyph_id} at size {size}: {message}")]
    Draw { glyph_id: u32, size: f32, message: String },

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

pub type Result<T> = result::Result<T, Error>;
