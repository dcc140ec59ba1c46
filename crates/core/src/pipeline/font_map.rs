//! Glyph to text extraction for obfuscated web fonts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use font_raster::{Canvas, CmapEntry, FontFile, GlyphRasterizer, encode_png};
use glyph_ocr::{Recognizer, classify_or_empty};
use indexmap::IndexMap;
use log::{info, warn};
use serde::Serialize;

use crate::{
    config::{CANVAS_SIZE, DEFAULT_FONT, IMAGE_DIR_SUFFIX, PROGRESS_INTERVAL},
    io::ImageStore,
};

/// What one glyph was recognized as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlyphRecord {
    #[serde(skip)]
    pub glyph_name: String,
    pub text: String,
    pub unicode: String,
    pub code_point: u32,
    pub hex: String,
    pub image_file: Option<String>,
}

impl GlyphRecord {
    pub fn new(
        glyph_name: &str,
        code_point: u32,
        text: String,
        image_file: Option<String>,
    ) -> Self {
        Self {
            glyph_name: glyph_name.to_string(),
            text,
            unicode: format!("U+{code_point:04X}"),
            code_point,
            hex: format!("{code_point:04x}"),
            image_file,
        }
    }
}

/// Records keyed by glyph name, in character map order.
pub type FontMap = IndexMap<String, GlyphRecord>;

/// Produces PNG bitmaps for code points.
pub trait GlyphRenderer {
    fn render_png(&self, code_point: u32) -> Result<Vec<u8>>;
}

impl GlyphRenderer for GlyphRasterizer<'_> {
    fn render_png(&self, code_point: u32) -> Result<Vec<u8>> {
        let image = self.render(code_point)?;
        Ok(encode_png(&image)?)
    }
}

/// Counters for one extraction run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub total: usize,
    pub processed: usize,
    /// Glyphs that were rendered, saved (when requested) and recognized.
    pub successful: usize,
}

impl ExtractStats {
    pub fn failed(&self) -> usize {
        self.processed - self.successful
    }
}

#[derive(Debug, Default)]
pub struct Extraction {
    pub map: FontMap,
    pub stats: ExtractStats,
}

/// Settings for [`decode_font`].
#[derive(Debug, Clone)]
pub struct FontMapOptions {
    pub font: PathBuf,
    /// Where glyph images go; `None` disables saving.
    pub image_dir: Option<PathBuf>,
    pub canvas: Canvas,
}

impl Default for FontMapOptions {
    fn default() -> Self {
        let font = PathBuf::from(DEFAULT_FONT);
        Self {
            image_dir: Some(default_image_dir(&font)),
            font,
            canvas: Canvas::new(CANVAS_SIZE, CANVAS_SIZE),
        }
    }
}

/// `<font dir>/<font stem>_images`.
pub fn default_image_dir(font: &Path) -> PathBuf {
    let stem = font.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let dir = font.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{stem}{IMAGE_DIR_SUFFIX}"))
}

/// Render, optionally save, and recognize every character map entry.
///
/// Every entry yields a record; failures leave the text empty and are not
/// counted as successful. Entries sharing a glyph name collapse into one
/// record holding the last code point.
pub fn extract_font_map(
    entries: &[CmapEntry],
    renderer: &impl GlyphRenderer,
    recognizer: &impl Recognizer,
    images: Option<&ImageStore>,
) -> Extraction {
    let mut extraction = Extraction {
        map: FontMap::with_capacity(entries.len()),
        stats: ExtractStats { total: entries.len(), ..Default::default() },
    };

    for entry in entries {
        let (record, ok) = process_entry(entry, renderer, recognizer, images);
        extraction.map.insert(entry.glyph_name.clone(), record);

        let stats = &mut extraction.stats;
        stats.processed += 1;
        if ok {
            stats.successful += 1;
        }
        if stats.processed % PROGRESS_INTERVAL == 0 || stats.processed == stats.total {
            println!(
                "Progress: {}/{} glyphs, {} recognized",
                stats.processed, stats.total, stats.successful
            );
        }
    }

    extraction
}

fn process_entry(
    entry: &CmapEntry,
    renderer: &impl GlyphRenderer,
    recognizer: &impl Recognizer,
    images: Option<&ImageStore>,
) -> (GlyphRecord, bool) {
    let CmapEntry { code_point, ref glyph_name, .. } = *entry;

    let png = match renderer.render_png(code_point) {
        Ok(png) => png,
        Err(e) => {
            warn!("Failed to render {glyph_name} (U+{code_point:04X}): {e:#}");
            return (GlyphRecord::new(glyph_name, code_point, String::new(), None), false);
        }
    };

    let mut saved = true;
    let image_file = images.and_then(|store| {
        store
            .save(&png, glyph_name, code_point)
            .inspect_err(|e| {
                warn!("Failed to save image for {glyph_name} (U+{code_point:04X}): {e:#}");
                saved = false;
            })
            .ok()
    });

    let (text, recognized) = classify_or_empty(recognizer, &png);
    (GlyphRecord::new(glyph_name, code_point, text, image_file), recognized && saved)
}

/// Load a font and map each of its glyphs to recognized text.
///
/// An empty character map yields an empty extraction rather than an error.
pub fn decode_font(options: &FontMapOptions, recognizer: &impl Recognizer) -> Result<Extraction> {
    println!("Processing font: {}", options.font.display());

    let font = FontFile::open(&options.font)
        .with_context(|| format!("Failed to load font: {}", options.font.display()))?;
    let entries = font.cmap_entries().context("Failed to read character map")?;

    if entries.is_empty() {
        println!("No character map found in font");
        return Ok(Extraction::default());
    }
    println!("Found {} characters", entries.len());

    let images = options.image_dir.as_ref().map(ImageStore::new);
    if let Some(store) = &images {
        println!("Glyph images will be saved to: {}", store.dir().display());
    }

    let rasterizer = GlyphRasterizer::new(&font, options.canvas)?;
    info!("canvas {}x{}", options.canvas.width, options.canvas.height);

    let extraction = extract_font_map(&entries, &rasterizer, recognizer, images.as_ref());
    println!(
        "Done: {}/{} glyphs recognized",
        extraction.stats.successful, extraction.stats.total
    );
    Ok(extraction)
}
