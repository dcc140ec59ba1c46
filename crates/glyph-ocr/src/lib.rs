//! Single-glyph OCR adapter.
//!
//! A [`Recognizer`] turns one PNG-encoded glyph bitmap into its best-guess
//! text. [`classify_or_empty`] wraps any recognizer so callers never see an
//! error: failures are logged and reported as empty text.

mod tesseract;

use std::{io, result};

use log::warn;

pub use tesseract::{DEFAULT_BINARY, DEFAULT_LANGUAGE, TesseractOcr};

/// Errors raised by OCR engines.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to start OCR engine '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    #[error("OCR engine I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("OCR engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("OCR engine produced non UTF-8 output")]
    InvalidOutput,
}

pub type Result<T> = result::Result<T, Error>;

/// Something that can read the character in a glyph bitmap.
pub trait Recognizer {
    /// Recognize the text in a PNG image. An empty string means nothing was read.
    fn recognize(&self, png: &[u8]) -> Result<String>;
}

impl<R: Recognizer + ?Sized> Recognizer for &R {
    fn recognize(&self, png: &[u8]) -> Result<String> {
        (**self).recognize(png)
    }
}

/// Run `recognizer`, mapping any failure to empty text.
///
/// Returns the text and whether recognition succeeded.
pub fn classify_or_empty(recognizer: &(impl Recognizer + ?Sized), png: &[u8]) -> (String, bool) {
    match recognizer.recognize(png) {
        Ok(text) => (text, true),
        Err(e) => {
            warn!("OCR failed: {e}");
            (String::new(), false)
        }
    }
}

/// Strip all whitespace, including the form feed Tesseract appends.
pub fn normalize_text(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}
