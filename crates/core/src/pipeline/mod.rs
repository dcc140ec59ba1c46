//! End-to-end workflows.

pub mod font_map;
pub mod install;

pub use font_map::{
    ExtractStats, Extraction, FontMap, FontMapOptions, GlyphRecord, GlyphRenderer, decode_font,
    default_image_dir, extract_font_map,
};
pub use install::{InstallOutcome, InstallRequest, Installer};
